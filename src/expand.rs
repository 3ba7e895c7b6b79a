//! This module expands an instance identifier into a skeleton tree.
//!
//! Given a path from the root, [`InstanceIdExpander`] builds the smallest
//! tree holding every node along the path, optionally with a terminal node
//! spliced in at the end. It synthesizes the wrapper nodes that don't appear
//! in a path of their own: the map around a list entry, the leaf set around a
//! leaf-set entry, the choice around the children of its cases and the
//! augmentation around augmented children.
//!
//! ```
//! use std::sync::Arc;
//! use yang_normalized::expand::InstanceIdExpander;
//! use yang_normalized::node::NodeKind;
//! use yang_normalized::path::{InstanceIdentifier, PathArgument, QName};
//! use yang_normalized::schema::{ContainerSchema, LeafSchema, ListSchema};
//! use yang_normalized::context::SchemaContext;
//! use yang_normalized::types::ScalarType;
//!
//! let q = QName::new("urn:example", "top");
//! let item = ListSchema::new(q.with_local("item"), vec![q.with_local("id")])
//!     .with_child(LeafSchema::new(q.with_local("id"), ScalarType::uint8()));
//! let ctx = SchemaContext::new(vec![ContainerSchema::new(q.clone()).with_child(item)]);
//! let expander = InstanceIdExpander::new(Arc::new(ctx));
//!
//! let path = InstanceIdentifier::root()
//!     .child(q.clone())
//!     .child(PathArgument::with_key(q.with_local("item"), q.with_local("id"), 5u8));
//! let tree = expander.from_instance_id(&path, None)?;
//!
//! let map = tree.child_by_name(&q.with_local("item")).unwrap();
//! assert_eq!(map.kind(), NodeKind::Map);
//! assert_eq!(map.len(), 1);
//! # Ok::<(), yang_normalized::util::TreeError>(())
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use log::trace;
use parking_lot::RwLock;

use crate::builder::{leaf_node, NodeBuilder};
use crate::context::{DataNodeContainer, SchemaContext};
use crate::node::{NodeKind, NormalizedNode};
use crate::normalize::canonical_predicates;
use crate::path::{InstanceIdentifier, PathArgument, QName};
use crate::schema::{AugmentationSchema, ChoiceSchema, DataSchemaNode, LeafListSchema, ListSchema};
use crate::util::{argument, mismatch, TreeError, TreeResult};

// What a strategy builds, and where its children come from.
#[derive(Debug)]
enum Shape {
    Container(Arc<dyn DataNodeContainer>),
    Augmentation(Arc<AugmentationSchema>),
    Choice(Arc<ChoiceSchema>),
    Map(Arc<ListSchema>),
    MapEntry(Arc<ListSchema>),
    UnkeyedList(Arc<ListSchema>),
    UnkeyedListEntry(Arc<ListSchema>),
    LeafSet(Arc<LeafListSchema>),
    LeafSetEntry,
    Leaf,
    AnyData,
    AnyXml,
}

/// How to build one level of an expanded path.
///
/// There is one strategy per schema node, created on first use and cached by
/// its parent.
#[derive(Debug)]
struct ExpansionStrategy {
    identifier: PathArgument,
    shape: Shape,
    children: RwLock<HashMap<PathArgument, Arc<ExpansionStrategy>>>,
}

impl ExpansionStrategy {
    fn new(identifier: PathArgument, shape: Shape) -> Arc<ExpansionStrategy> {
        Arc::new(ExpansionStrategy {
            identifier,
            shape,
            children: RwLock::new(HashMap::new()),
        })
    }

    fn from_schema(schema: &DataSchemaNode) -> Arc<ExpansionStrategy> {
        let id = PathArgument::Node(schema.qname().clone());
        let shape = match schema {
            DataSchemaNode::Container(c) => Shape::Container(c.clone()),
            DataSchemaNode::List(l) if l.keys().is_empty() => Shape::UnkeyedList(l.clone()),
            DataSchemaNode::List(l) => Shape::Map(l.clone()),
            DataSchemaNode::LeafList(l) => Shape::LeafSet(l.clone()),
            DataSchemaNode::Choice(c) => Shape::Choice(c.clone()),
            DataSchemaNode::Leaf(_) => Shape::Leaf,
            DataSchemaNode::AnyData(_) => Shape::AnyData,
            DataSchemaNode::AnyXml(_) => Shape::AnyXml,
        };
        ExpansionStrategy::new(id, shape)
    }

    fn kind(&self) -> NodeKind {
        match &self.shape {
            Shape::Container(_) => NodeKind::Container,
            Shape::Augmentation(_) => NodeKind::Augmentation,
            Shape::Choice(_) => NodeKind::Choice,
            Shape::Map(l) if l.is_user_ordered() => NodeKind::OrderedMap,
            Shape::Map(_) => NodeKind::Map,
            Shape::MapEntry(_) => NodeKind::MapEntry,
            Shape::UnkeyedList(_) => NodeKind::UnkeyedList,
            Shape::UnkeyedListEntry(_) => NodeKind::UnkeyedListEntry,
            Shape::LeafSet(l) if l.is_user_ordered() => NodeKind::OrderedLeafSet,
            Shape::LeafSet(_) => NodeKind::LeafSet,
            Shape::LeafSetEntry => NodeKind::LeafSetEntry,
            Shape::Leaf => NodeKind::Leaf,
            Shape::AnyData => NodeKind::AnyData,
            Shape::AnyXml => NodeKind::AnyXml,
        }
    }

    // Mixins don't need a path segment of their own.
    fn is_mixin(&self) -> bool {
        self.kind().is_mixin()
    }

    // Children are cached by name; every entry of a list shares one strategy.
    fn cache_key(arg: &PathArgument) -> PathArgument {
        match arg {
            PathArgument::AugmentationId(_) => arg.clone(),
            other => match other.node_type() {
                Some(name) => PathArgument::Node(name.clone()),
                None => other.clone(),
            },
        }
    }

    fn child(&self, arg: &PathArgument) -> TreeResult<Arc<ExpansionStrategy>> {
        let key = ExpansionStrategy::cache_key(arg);
        if let Some(found) = self.children.read().get(&key) {
            return Ok(found.clone());
        }

        trace!("no cached strategy for {} under {}", key, self.identifier);
        let computed = self.resolve_child(arg)?;
        let mut cache = self.children.write();
        // Every child name of an augmentation shares the augmentation's
        // strategy, which is also cached under its own identifier.
        let computed = match computed.shape {
            Shape::Augmentation(_) => cache
                .entry(computed.identifier.clone())
                .or_insert(computed)
                .clone(),
            _ => computed,
        };
        Ok(cache.entry(key).or_insert(computed).clone())
    }

    fn resolve_child(&self, arg: &PathArgument) -> TreeResult<Arc<ExpansionStrategy>> {
        let not_allowed = || TreeError::UnknownChild {
            child: arg.to_string(),
            parent: self.identifier.to_string(),
        };
        match &self.shape {
            Shape::Container(c) => from_container(c.as_ref(), arg).ok_or_else(not_allowed),
            Shape::Augmentation(a) => from_container(a.as_ref(), arg).ok_or_else(not_allowed),
            Shape::MapEntry(l) | Shape::UnkeyedListEntry(l) => {
                from_container(l.as_ref(), arg).ok_or_else(not_allowed)
            }
            Shape::Choice(choice) => choice
                .cases()
                .iter()
                .find_map(|case| from_container(case.as_ref(), arg))
                .ok_or_else(not_allowed),
            Shape::Map(list) if arg.node_type() == Some(list.qname()) => {
                Ok(ExpansionStrategy::new(
                    PathArgument::Node(list.qname().clone()),
                    Shape::MapEntry(list.clone()),
                ))
            }
            Shape::UnkeyedList(list) if arg.node_type() == Some(list.qname()) => {
                Ok(ExpansionStrategy::new(
                    PathArgument::Node(list.qname().clone()),
                    Shape::UnkeyedListEntry(list.clone()),
                ))
            }
            Shape::LeafSet(ll) if arg.node_type() == Some(ll.qname()) => Ok(
                ExpansionStrategy::new(PathArgument::Node(ll.qname().clone()), Shape::LeafSetEntry),
            ),
            _ => Err(not_allowed()),
        }
    }

    fn builder(&self, arg: &PathArgument) -> TreeResult<NodeBuilder> {
        let mut builder = NodeBuilder::new(self.kind());
        match &self.shape {
            Shape::MapEntry(list) => {
                let (name, predicates) = match arg {
                    PathArgument::NodeWithPredicates(name, p) => (name, p),
                    other => {
                        return Err(mismatch(
                            format!("entry of list {}", list.qname()),
                            other.to_string(),
                        ))
                    }
                };
                let predicates = canonical_predicates(list.keys(), predicates);
                for (key, value) in predicates.iter() {
                    builder.add_child(leaf_node(key.clone(), value.clone()))?;
                }
                builder.set_identifier(PathArgument::NodeWithPredicates(name.clone(), predicates))?;
            }
            Shape::LeafSetEntry | Shape::Augmentation(_) => {
                builder.set_identifier(arg.clone())?;
                if let PathArgument::NodeWithValue(_, value) = arg {
                    builder.set_value(value.clone())?;
                }
            }
            _ if self.is_mixin() => builder.set_identifier(self.identifier.clone())?,
            _ => builder.set_identifier(PathArgument::Node(self.name(arg)?.clone()))?,
        }
        Ok(builder)
    }

    // The name a non-mixin level is built with; it has to match the schema.
    fn name<'p>(&self, arg: &'p PathArgument) -> TreeResult<&'p QName> {
        let expected = self.identifier.node_type();
        match arg.node_type() {
            Some(name) if expected.map_or(true, |e| e == name) => Ok(name),
            _ => Err(mismatch(self.identifier.to_string(), arg.to_string())),
        }
    }

    // Build this level for `first`, then the rest of the path below it.
    fn create(
        &self,
        first: &PathArgument,
        rest: &[PathArgument],
        last: Option<&NormalizedNode>,
    ) -> TreeResult<NormalizedNode> {
        // A mixin reached through one of its children's segments builds its
        // wrapper and passes the same segment down.
        if self.is_mixin() && *first != self.identifier {
            let mut builder = NodeBuilder::new(self.kind());
            builder.set_identifier(self.identifier.clone())?;
            let child = self.child(first)?;
            builder.add_child(child.create(first, rest, last)?)?;
            return builder.build();
        }

        if self.kind().is_scalar() {
            if let Some(next) = rest.first() {
                return argument(format!(
                    "{} has no children, cannot expand {}",
                    self.identifier, next
                ));
            }
            // Leaf-set entries carry their value in their identity.
            if last.is_none() && self.kind() != NodeKind::LeafSetEntry {
                return argument(format!("{} needs a terminal value", first));
            }
        }

        let mut builder = self.builder(first)?;
        match rest.split_first() {
            Some((next, rest)) => {
                let child = self.child(next)?;
                builder.add_child(child.create(next, rest, last)?)?;
            }
            None => {
                if let Some(last) = last {
                    splice_terminal(&mut builder, first, last)?;
                }
            }
        }
        builder.build()
    }
}

// The strategy for the child of `container` holding data named by `arg`.
// Augmented children are reached through their augmentation.
fn from_container(
    container: &dyn DataNodeContainer,
    arg: &PathArgument,
) -> Option<Arc<ExpansionStrategy>> {
    let name = match arg {
        PathArgument::AugmentationId(id) => id.iter().next()?,
        other => other.node_type()?,
    };
    let schema = container.find_child(name)?;
    match container.augmentation_for(schema.qname()) {
        Some(aug) => Some(ExpansionStrategy::new(
            aug.identifier(),
            Shape::Augmentation(aug.clone()),
        )),
        None => Some(ExpansionStrategy::from_schema(schema)),
    }
}

// A terminal with this level's identity is merged into it; anything else
// becomes its child.
fn splice_terminal(
    builder: &mut NodeBuilder,
    arg: &PathArgument,
    last: &NormalizedNode,
) -> TreeResult<()> {
    if last.identifier() == arg || builder.identifier() == Some(last.identifier()) {
        if last.kind() != builder.kind() {
            return Err(mismatch(
                format!("{} {}", builder.kind(), arg),
                format!("{} {}", last.kind(), last.identifier()),
            ));
        }
        builder.splice(last)
    } else if builder.kind().is_scalar() {
        Err(mismatch(
            format!("value for {}", arg),
            format!("{} {}", last.kind(), last.identifier()),
        ))
    } else {
        builder.add_child(last.clone())
    }
}

/// Expands instance identifiers against one schema.
///
/// Strategies are cached for the lifetime of the expander, so keep one
/// around per schema context. The cache is safe to share between threads.
#[derive(Debug)]
pub struct InstanceIdExpander {
    context: Arc<SchemaContext>,
    root: Arc<ExpansionStrategy>,
}

impl InstanceIdExpander {
    /// Create an expander with an empty strategy cache.
    pub fn new(context: Arc<SchemaContext>) -> InstanceIdExpander {
        let root = ExpansionStrategy::new(
            PathArgument::Node(SchemaContext::root_name()),
            Shape::Container(context.root().clone()),
        );
        InstanceIdExpander { context, root }
    }

    /// The schema paths are expanded against.
    pub fn context(&self) -> &Arc<SchemaContext> {
        &self.context
    }

    /// Build the tree holding every node along `path`.
    ///
    /// The result is rooted at the first segment of the path (or is the
    /// schema root, for an empty path). If `last` is given, it ends up at the
    /// end of the path: merged into the last node if it has the last
    /// segment's identity, or added as a child of it otherwise.
    pub fn from_instance_id(
        &self,
        path: &InstanceIdentifier,
        last: Option<&NormalizedNode>,
    ) -> TreeResult<NormalizedNode> {
        match path.path_arguments().split_first() {
            None => {
                let root_id = self.root.identifier.clone();
                self.root.create(&root_id, &[], last)
            }
            Some((first, rest)) => {
                let top = self.root.child(first).map_err(|_| {
                    TreeError::Argument(format!("{} is not a top-level schema node", first))
                })?;
                top.create(first, rest, last)
            }
        }
    }
}

#[test]
fn test_cache_keys() {
    let q = QName::new("urn:example:expand", "l");
    let k = q.with_local("k");
    assert_eq!(
        ExpansionStrategy::cache_key(&PathArgument::with_key(q.clone(), k.clone(), 1u8)),
        PathArgument::Node(q.clone())
    );
    assert_eq!(
        ExpansionStrategy::cache_key(&PathArgument::with_value(q.clone(), 1u8)),
        PathArgument::Node(q.clone())
    );
    let aug = PathArgument::augmentation(vec![q, k]);
    assert_eq!(ExpansionStrategy::cache_key(&aug), aug);
}

#[test]
fn test_shared_augmentation_strategy() {
    use crate::schema::{ContainerSchema, LeafSchema};
    use crate::types::ScalarType;

    let q = QName::new("urn:example:expand", "top");
    let a = QName::new("urn:example:expand-aug", "a");
    let b = a.with_local("b");
    let aug = AugmentationSchema::new()
        .with_child(LeafSchema::new(a.clone(), ScalarType::Boolean))
        .with_child(LeafSchema::new(b.clone(), ScalarType::Boolean));
    let top = ContainerSchema::new(q.clone()).augment(aug);
    let ctx = Arc::new(SchemaContext::new(vec![top]));
    let expander = InstanceIdExpander::new(ctx);

    let top = expander.root.child(&PathArgument::Node(q)).unwrap();
    let via_a = top.child(&PathArgument::Node(a.clone())).unwrap();
    let via_b = top.child(&PathArgument::Node(b.clone())).unwrap();
    let via_id = top.child(&PathArgument::augmentation(vec![a, b])).unwrap();
    assert!(Arc::ptr_eq(&via_a, &via_b));
    assert!(Arc::ptr_eq(&via_a, &via_id));
    assert_eq!(top.children.read().len(), 3);
}
