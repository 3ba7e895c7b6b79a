//! This module contains the node builder.
//!
//! Every node kind is built by the same [`NodeBuilder`], tagged with the
//! [`NodeKind`] it will produce. A builder created with [`NodeBuilder::new`]
//! is *plain*: it accepts any identity, checks nothing but node-kind nesting,
//! and a child added twice under the same identity replaces the earlier one.
//! A builder created from a schema node (`container_for`, `map_entry_for`,
//! ...) is *schema-aware*: the schema fixes its identity and every child or
//! value it accepts is checked against the schema.
//!
//! ```
//! use yang_normalized::builder::{leaf_node, NodeBuilder};
//! use yang_normalized::node::NodeKind;
//! use yang_normalized::path::{PathArgument, QName};
//!
//! let q = QName::new("urn:example", "system");
//! let node = NodeBuilder::new(NodeKind::Container)
//!     .with_identifier(PathArgument::Node(q.clone()))?
//!     .with_child(leaf_node(q.with_local("hostname"), "router-1"))?
//!     .build()?;
//! assert_eq!(node.len(), 1);
//! # Ok::<(), yang_normalized::util::TreeError>(())
//! ```

use std::sync::Arc;

use indexmap::IndexMap;

use crate::intern::LeafSetEntryInterner;
use crate::node::{NodeKind, NormalizedNode};
use crate::path::{PathArgument, Predicates, QName};
use crate::schema::{
    AnySchema, AugmentationSchema, ChoiceSchema, ContainerSchema, DataSchemaNode,
    LeafListSchema, LeafSchema, ListSchema,
};
use crate::util::{mismatch, structural, TreeResult};
use crate::validate::{check_key_leaves, key_predicates, SchemaValidator};
use crate::value::Value;

#[derive(Debug)]
enum Body {
    Value(Option<Value>),
    Children(IndexMap<PathArgument, NormalizedNode>),
    Entries(Vec<NormalizedNode>),
}

impl Body {
    fn for_kind(kind: NodeKind, size_hint: Option<usize>) -> Body {
        let capacity = size_hint.unwrap_or(0);
        if kind.is_scalar() {
            Body::Value(None)
        } else if kind == NodeKind::UnkeyedList {
            Body::Entries(Vec::with_capacity(capacity))
        } else {
            Body::Children(IndexMap::with_capacity(capacity))
        }
    }
}

/// Accumulates the identity and content of one node, then builds it.
#[derive(Debug)]
pub struct NodeBuilder {
    kind: NodeKind,
    identifier: Option<PathArgument>,
    body: Body,
    validator: Option<SchemaValidator>,
    interner: Option<Arc<LeafSetEntryInterner>>,
}

impl NodeBuilder {
    /// Create a plain builder.
    pub fn new(kind: NodeKind) -> NodeBuilder {
        NodeBuilder::sized(kind, None)
    }

    /// Create a plain builder, pre-allocating for `size_hint` children.
    pub fn sized(kind: NodeKind, size_hint: Option<usize>) -> NodeBuilder {
        NodeBuilder {
            kind,
            identifier: None,
            body: Body::for_kind(kind, size_hint),
            validator: None,
            interner: None,
        }
    }

    fn with_schema(kind: NodeKind, validator: SchemaValidator) -> NodeBuilder {
        let mut builder = NodeBuilder::new(kind);
        builder.identifier = validator.identifier();
        builder.validator = Some(validator);
        builder
    }

    /// Create a plain builder holding a copy of an existing node's identity
    /// and content.
    pub fn from_node(node: &NormalizedNode) -> NodeBuilder {
        let kind = node.kind();
        let body = match Body::for_kind(kind, Some(node.len())) {
            Body::Value(_) => Body::Value(node.value().cloned()),
            Body::Entries(mut entries) => {
                entries.extend(node.children().cloned());
                Body::Entries(entries)
            }
            Body::Children(mut children) => {
                children.extend(node.children().map(|c| (c.identifier().clone(), c.clone())));
                Body::Children(children)
            }
        };
        NodeBuilder {
            kind,
            identifier: Some(node.identifier().clone()),
            body,
            validator: None,
            interner: None,
        }
    }

    /// Create a schema-aware builder for any schema node.
    ///
    /// Lists produce a map (or unkeyed list) builder, leaf-lists a leaf set
    /// builder.
    pub fn for_schema(schema: &DataSchemaNode) -> NodeBuilder {
        match schema {
            DataSchemaNode::Container(c) => NodeBuilder::container_for(c),
            DataSchemaNode::List(l) if l.keys().is_empty() => NodeBuilder::unkeyed_list_for(l),
            DataSchemaNode::List(l) => NodeBuilder::map_for(l),
            DataSchemaNode::Leaf(l) => NodeBuilder::leaf_for(l),
            DataSchemaNode::LeafList(l) => NodeBuilder::leaf_set_for(l),
            DataSchemaNode::Choice(c) => NodeBuilder::choice_for(c),
            DataSchemaNode::AnyData(a) => NodeBuilder::anydata_for(a),
            DataSchemaNode::AnyXml(a) => NodeBuilder::anyxml_for(a),
        }
    }

    /// A container builder checked against `schema`.
    pub fn container_for(schema: &Arc<ContainerSchema>) -> NodeBuilder {
        NodeBuilder::with_schema(
            NodeKind::Container,
            SchemaValidator::DataContainer(schema.qname().clone(), schema.clone()),
        )
    }

    /// A choice builder checked against `schema`.
    pub fn choice_for(schema: &Arc<ChoiceSchema>) -> NodeBuilder {
        NodeBuilder::with_schema(
            NodeKind::Choice,
            SchemaValidator::Choice {
                schema: schema.clone(),
                case: None,
            },
        )
    }

    /// An augmentation builder checked against `schema`.
    pub fn augmentation_for(schema: &Arc<AugmentationSchema>) -> NodeBuilder {
        NodeBuilder::with_schema(
            NodeKind::Augmentation,
            SchemaValidator::Augmentation(schema.clone()),
        )
    }

    /// A map builder; ordered if the list is `ordered-by user`.
    pub fn map_for(schema: &Arc<ListSchema>) -> NodeBuilder {
        let kind = if schema.is_user_ordered() {
            NodeKind::OrderedMap
        } else {
            NodeKind::Map
        };
        NodeBuilder::with_schema(kind, SchemaValidator::List(schema.qname().clone()))
    }

    /// A map entry builder. The entry's key predicates are read from its key
    /// leaves when it is built.
    pub fn map_entry_for(schema: &Arc<ListSchema>) -> NodeBuilder {
        NodeBuilder::with_schema(NodeKind::MapEntry, SchemaValidator::MapEntry(schema.clone()))
    }

    /// An unkeyed list builder checked against `schema`.
    pub fn unkeyed_list_for(schema: &Arc<ListSchema>) -> NodeBuilder {
        NodeBuilder::with_schema(
            NodeKind::UnkeyedList,
            SchemaValidator::List(schema.qname().clone()),
        )
    }

    /// An unkeyed list entry builder checked against `schema`.
    pub fn unkeyed_list_entry_for(schema: &Arc<ListSchema>) -> NodeBuilder {
        NodeBuilder::with_schema(
            NodeKind::UnkeyedListEntry,
            SchemaValidator::DataContainer(schema.qname().clone(), schema.clone()),
        )
    }

    /// A leaf set builder; ordered if the leaf-list is `ordered-by user`.
    ///
    /// Entries are interned if the leaf-list has an interner.
    pub fn leaf_set_for(schema: &Arc<LeafListSchema>) -> NodeBuilder {
        let kind = if schema.is_user_ordered() {
            NodeKind::OrderedLeafSet
        } else {
            NodeKind::LeafSet
        };
        let mut builder = NodeBuilder::with_schema(kind, SchemaValidator::LeafSet(schema.clone()));
        builder.interner = schema.interner().cloned();
        builder
    }

    /// A leaf set entry builder. The entry's identity is taken from its value.
    pub fn leaf_set_entry_for(schema: &Arc<LeafListSchema>) -> NodeBuilder {
        NodeBuilder::with_schema(
            NodeKind::LeafSetEntry,
            SchemaValidator::LeafSetEntry(schema.clone()),
        )
    }

    /// A leaf builder checked against `schema`.
    pub fn leaf_for(schema: &Arc<LeafSchema>) -> NodeBuilder {
        NodeBuilder::with_schema(NodeKind::Leaf, SchemaValidator::Leaf(schema.clone()))
    }

    /// An anydata builder for `schema`.
    pub fn anydata_for(schema: &Arc<AnySchema>) -> NodeBuilder {
        NodeBuilder::with_schema(NodeKind::AnyData, SchemaValidator::Any(schema.qname().clone()))
    }

    /// An anyxml builder for `schema`.
    pub fn anyxml_for(schema: &Arc<AnySchema>) -> NodeBuilder {
        NodeBuilder::with_schema(NodeKind::AnyXml, SchemaValidator::Any(schema.qname().clone()))
    }

    /// The kind of node this builder produces.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The identity set so far, if any.
    pub fn identifier(&self) -> Option<&PathArgument> {
        self.identifier.as_ref()
    }

    /// `true` if this builder checks its content against a schema.
    pub fn is_schema_aware(&self) -> bool {
        self.validator.is_some()
    }

    /// The schema validator, if this builder is schema-aware.
    pub fn validator(&self) -> Option<&SchemaValidator> {
        self.validator.as_ref()
    }

    /// Use an interner for leaf-set entries added to this builder.
    pub fn set_interner(&mut self, interner: Arc<LeafSetEntryInterner>) {
        self.interner = Some(interner);
    }

    /// Set the node's identity.
    ///
    /// Fails on a schema-aware builder, where the schema fixes the identity.
    pub fn set_identifier(&mut self, identifier: PathArgument) -> TreeResult<()> {
        if self.validator.is_some() {
            return structural(format!(
                "cannot override the identity of a schema-aware {} builder",
                self.kind
            ));
        }
        if !self.kind.accepts_identifier(&identifier) {
            return Err(mismatch(
                format!("identifier for {}", self.kind),
                identifier.variant_name(),
            ));
        }
        self.identifier = Some(identifier);
        Ok(())
    }

    /// By-value form of [`set_identifier`](Self::set_identifier).
    pub fn with_identifier(mut self, identifier: PathArgument) -> TreeResult<Self> {
        self.set_identifier(identifier)?;
        Ok(self)
    }

    /// Add one child.
    ///
    /// On a plain builder, a child with the identity of an earlier child
    /// replaces it.
    pub fn add_child(&mut self, child: NormalizedNode) -> TreeResult<()> {
        if !self.kind.accepts_child(child.kind()) {
            return structural(format!("{} cannot hold {}", self.kind, child.kind()));
        }
        if let Some(validator) = &mut self.validator {
            validator.check_child(&child)?;
        }
        let child = match &self.interner {
            Some(interner) => interner.intern(child),
            None => child,
        };
        match &mut self.body {
            Body::Children(children) => {
                children.insert(child.identifier().clone(), child);
            }
            Body::Entries(entries) => entries.push(child),
            Body::Value(_) => return structural(format!("{} has no children", self.kind)),
        }
        Ok(())
    }

    /// By-value form of [`add_child`](Self::add_child).
    pub fn with_child(mut self, child: NormalizedNode) -> TreeResult<Self> {
        self.add_child(child)?;
        Ok(self)
    }

    /// Remove the child with the given identity, if present.
    pub fn remove_child(&mut self, identifier: &PathArgument) -> Option<NormalizedNode> {
        match &mut self.body {
            Body::Children(children) => children.shift_remove(identifier),
            Body::Entries(entries) => {
                let pos = entries.iter().position(|e| e.identifier() == identifier)?;
                Some(entries.remove(pos))
            }
            Body::Value(_) => None,
        }
    }

    /// Set the value of a leaf, leaf-set entry, anydata or anyxml node.
    pub fn set_value(&mut self, value: Value) -> TreeResult<()> {
        if let Some(validator) = &self.validator {
            validator.check_value(&value)?;
        }
        match &mut self.body {
            Body::Value(slot) => {
                *slot = Some(value);
                Ok(())
            }
            _ => structural(format!("{} cannot hold a value", self.kind)),
        }
    }

    /// By-value form of [`set_value`](Self::set_value).
    pub fn with_value<V: Into<Value>>(mut self, value: V) -> TreeResult<Self> {
        self.set_value(value.into())?;
        Ok(self)
    }

    /// Merge the content of an existing node into this builder: its value,
    /// or each of its children.
    pub fn splice(&mut self, node: &NormalizedNode) -> TreeResult<()> {
        if let Some(value) = node.value() {
            return self.set_value(value.clone());
        }
        for child in node.children() {
            self.add_child(child.clone())?;
        }
        Ok(())
    }

    /// The number of children added so far.
    pub fn len(&self) -> usize {
        match &self.body {
            Body::Children(children) => children.len(),
            Body::Entries(entries) => entries.len(),
            Body::Value(_) => 0,
        }
    }

    /// True if no children have been added.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build the node.
    ///
    /// A map entry's key leaves must agree with its key predicates. A
    /// leaf-set entry's value must agree with its identity.
    pub fn build(self) -> TreeResult<NormalizedNode> {
        let NodeBuilder {
            kind,
            identifier,
            body,
            validator,
            ..
        } = self;

        match body {
            Body::Value(value) => {
                let value = match (value, &identifier) {
                    (Some(v), _) => v,
                    (None, Some(PathArgument::NodeWithValue(_, v))) => v.clone(),
                    (None, _) => return structural(format!("{} built without a value", kind)),
                };
                let identifier = match (identifier, &validator) {
                    (Some(id), _) => id,
                    (None, Some(SchemaValidator::LeafSetEntry(ll))) => {
                        PathArgument::NodeWithValue(ll.qname().clone(), value.clone())
                    }
                    (None, _) => return structural(format!("{} built without an identity", kind)),
                };
                if let PathArgument::NodeWithValue(_, expected) = &identifier {
                    if *expected != value {
                        return Err(mismatch(expected.to_string(), value.to_string()));
                    }
                }
                Ok(NormalizedNode::from_value(kind, identifier, value))
            }
            Body::Children(children) => {
                let identifier = match (identifier, &validator) {
                    (Some(id), _) => id,
                    (None, Some(SchemaValidator::MapEntry(list))) => {
                        let predicates = key_predicates(list, &children)?;
                        PathArgument::NodeWithPredicates(list.qname().clone(), predicates)
                    }
                    (None, _) => return structural(format!("{} built without an identity", kind)),
                };
                if kind == NodeKind::MapEntry {
                    check_key_leaves(&identifier, &children)?;
                }
                Ok(NormalizedNode::from_children(kind, identifier, children))
            }
            Body::Entries(entries) => match identifier {
                Some(id) => Ok(NormalizedNode::from_entries(id, entries)),
                None => structural(format!("{} built without an identity", kind)),
            },
        }
    }
}

/// Create a leaf.
pub fn leaf_node<V: Into<Value>>(name: QName, value: V) -> NormalizedNode {
    NormalizedNode::from_value(NodeKind::Leaf, PathArgument::Node(name), value.into())
}

/// Create a leaf-set entry; its identity carries the value.
pub fn leaf_set_entry<V: Into<Value>>(name: QName, value: V) -> NormalizedNode {
    let value = value.into();
    NormalizedNode::from_value(
        NodeKind::LeafSetEntry,
        PathArgument::NodeWithValue(name, value.clone()),
        value,
    )
}

/// Create a map entry with a single key, holding just its key leaf.
pub fn map_entry<V: Into<Value>>(name: QName, key: QName, value: V) -> NormalizedNode {
    let value = value.into();
    let leaf = leaf_node(key.clone(), value.clone());
    let mut children = IndexMap::new();
    children.insert(leaf.identifier().clone(), leaf);
    NormalizedNode::from_children(
        NodeKind::MapEntry,
        PathArgument::NodeWithPredicates(name, Predicates::single(key, value)),
        children,
    )
}

/// Create an empty container.
pub fn container_node(name: QName) -> NormalizedNode {
    NormalizedNode::from_children(NodeKind::Container, PathArgument::Node(name), IndexMap::new())
}

/// Create a plain map builder with its identity already set.
pub fn map_node_builder(name: QName) -> NodeBuilder {
    NodeBuilder {
        identifier: Some(PathArgument::Node(name)),
        ..NodeBuilder::new(NodeKind::Map)
    }
}

#[cfg(test)]
use crate::util::ErrorMatch;

#[cfg(test)]
fn q(local: &str) -> QName {
    QName::new("urn:example:builder", local)
}

#[test]
fn test_last_write_wins() {
    let node = NodeBuilder::new(NodeKind::Container)
        .with_identifier(PathArgument::Node(q("c")))
        .unwrap()
        .with_child(leaf_node(q("a"), 1u8))
        .unwrap()
        .with_child(leaf_node(q("a"), 2u8))
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(node.len(), 1);
    assert_eq!(node.child_by_name(&q("a")).unwrap().value(), Some(&Value::from(2u8)));
}

#[test]
fn test_illegal_nesting() {
    let mut b = NodeBuilder::new(NodeKind::Container);
    b.add_child(map_entry(q("l"), q("k"), 1u8)).err_structural();

    let mut b = NodeBuilder::new(NodeKind::Leaf);
    b.add_child(leaf_node(q("a"), 1u8)).err_structural();

    let mut b = NodeBuilder::new(NodeKind::Container);
    b.set_value(Value::from(1u8)).err_structural();
}

#[test]
fn test_wrong_identifier_variant() {
    NodeBuilder::new(NodeKind::MapEntry)
        .with_identifier(PathArgument::Node(q("l")))
        .err_mismatch();
    NodeBuilder::new(NodeKind::Leaf)
        .with_identifier(PathArgument::with_value(q("l"), 1u8))
        .err_mismatch();
}

#[test]
fn test_build_without_identity() {
    NodeBuilder::new(NodeKind::Container).build().err_structural();
    NodeBuilder::new(NodeKind::Leaf)
        .with_value(1u8)
        .unwrap()
        .build()
        .err_structural();
}

#[test]
fn test_leaf_set_entry_value_must_match_identity() {
    let entry = NodeBuilder::new(NodeKind::LeafSetEntry)
        .with_identifier(PathArgument::with_value(q("ll"), "a"))
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(entry.value(), Some(&Value::from("a")));

    NodeBuilder::new(NodeKind::LeafSetEntry)
        .with_identifier(PathArgument::with_value(q("ll"), "a"))
        .unwrap()
        .with_value("b")
        .unwrap()
        .build()
        .err_mismatch();
}

#[test]
fn test_map_entry_key_leaves() {
    let id = PathArgument::with_key(q("l"), q("k"), 1u8);

    let entry = NodeBuilder::new(NodeKind::MapEntry)
        .with_identifier(id.clone())
        .unwrap()
        .with_child(leaf_node(q("k"), 1u8))
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(entry, map_entry(q("l"), q("k"), 1u8));

    NodeBuilder::new(NodeKind::MapEntry)
        .with_identifier(id.clone())
        .unwrap()
        .with_child(leaf_node(q("k"), 2u8))
        .unwrap()
        .build()
        .err_mismatch();

    NodeBuilder::new(NodeKind::MapEntry)
        .with_identifier(id)
        .unwrap()
        .with_child(leaf_node(q("other"), 2u8))
        .unwrap()
        .build()
        .err_argument();
}

#[test]
fn test_copy_and_edit() {
    let original = NodeBuilder::new(NodeKind::Container)
        .with_identifier(PathArgument::Node(q("c")))
        .unwrap()
        .with_child(leaf_node(q("a"), 1u8))
        .unwrap()
        .with_child(leaf_node(q("b"), 2u8))
        .unwrap()
        .build()
        .unwrap();

    let mut edit = NodeBuilder::from_node(&original);
    assert!(edit.remove_child(&PathArgument::Node(q("a"))).is_some());
    assert!(edit.remove_child(&PathArgument::Node(q("a"))).is_none());
    let edited = edit.build().unwrap();

    assert_eq!(original.len(), 2);
    assert_eq!(edited.len(), 1);
    assert!(edited.child_by_name(&q("b")).is_some());
}

#[test]
fn test_map_builder_shortcut() {
    let map = map_node_builder(q("l"))
        .with_child(map_entry(q("l"), q("k"), 1u8))
        .unwrap()
        .with_child(map_entry(q("l"), q("k"), 2u8))
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(map.kind(), NodeKind::Map);
    assert_eq!(map.len(), 2);
    assert!(container_node(q("c")).is_empty());
}
