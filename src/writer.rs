//! This module walks built trees and re-emits them as node events.
//!
//! [`NormalizedNodeWriter`] emits a tree in its own order.
//! [`SchemaOrderedWriter`] emits it in the order the schema declares
//! children, which is what encoders with an order-sensitive wire format
//! need. Either one can feed an
//! [`ImmutableNodeWriter`](crate::stream::ImmutableNodeWriter) to copy a tree.

use indexmap::IndexMap;
use log::debug;

use crate::context::{DataNodeContainer, SchemaContext};
use crate::node::{NodeKind, NormalizedNode};
use crate::path::{PathArgument, QName};
use crate::schema::{ChoiceSchema, DataSchemaNode, ListSchema};
use crate::stream::NodeStreamWriter;
use crate::util::{structural, TreeResult};

fn could_not_serialize<T>(node: &NormalizedNode) -> TreeResult<T> {
    structural(format!(
        "could not serialize {} {}",
        node.kind(),
        node.identifier()
    ))
}

fn write_scalar<W>(writer: &mut W, node: &NormalizedNode) -> TreeResult<()>
where
    W: NodeStreamWriter + ?Sized,
{
    let value = match node.value() {
        Some(value) => value.clone(),
        None => return could_not_serialize(node),
    };
    writer.start_node(node.kind(), node.identifier().clone(), None)?;
    writer.scalar_value(value)?;
    writer.end_node()
}

/// Emits a tree in its own child order.
pub struct NormalizedNodeWriter<'w, W: NodeStreamWriter + ?Sized> {
    writer: &'w mut W,
    order_key_leaves: bool,
}

impl<'w, W: NodeStreamWriter + ?Sized> NormalizedNodeWriter<'w, W> {
    /// Create a walker emitting into `writer`.
    pub fn new(writer: &'w mut W) -> Self {
        NormalizedNodeWriter {
            writer,
            order_key_leaves: true,
        }
    }

    /// Emit map entry key leaves before the other children, in predicate
    /// order. On by default.
    pub fn order_key_leaves(mut self, order: bool) -> Self {
        self.order_key_leaves = order;
        self
    }

    /// Emit `node` and everything below it.
    pub fn write(&mut self, node: &NormalizedNode) -> TreeResult<()> {
        if node.kind().is_scalar() {
            return write_scalar(&mut *self.writer, node);
        }

        self.writer
            .start_node(node.kind(), node.identifier().clone(), Some(node.len()))?;
        if node.kind() == NodeKind::MapEntry && self.order_key_leaves {
            self.write_entry_children(node)?;
        } else {
            for child in node.children() {
                self.write(child)?;
            }
        }
        self.writer.end_node()
    }

    fn write_entry_children(&mut self, entry: &NormalizedNode) -> TreeResult<()> {
        let predicates = match entry.identifier().predicates() {
            Some(p) => p,
            None => return could_not_serialize(entry),
        };
        for key in predicates.keys() {
            match entry.child_by_name(key) {
                Some(leaf) => self.write(leaf)?,
                None => debug!("map entry {} has no key leaf {}", entry.identifier(), key),
            }
        }
        for child in entry.children() {
            let is_key = match child.identifier() {
                PathArgument::Node(name) => predicates.contains_key(name),
                _ => false,
            };
            if !is_key {
                self.write(child)?;
            }
        }
        Ok(())
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> TreeResult<()> {
        self.writer.flush()
    }
}

// A child found while grouping, and the augmentation node it sat in.
#[derive(Clone, Copy)]
struct Grouped<'n> {
    node: &'n NormalizedNode,
    via: Option<&'n NormalizedNode>,
}

type Groups<'n> = IndexMap<QName, Vec<Grouped<'n>>>;

// Group children by name. Augmentation nodes are flattened: their children
// join the group of their own name.
fn group_children(node: &NormalizedNode) -> Groups<'_> {
    fn walk<'n>(node: &'n NormalizedNode, via: Option<&'n NormalizedNode>, groups: &mut Groups<'n>) {
        for child in node.children() {
            match child.node_type() {
                Some(name) => groups
                    .entry(name.clone())
                    .or_default()
                    .push(Grouped { node: child, via }),
                None => walk(child, via.or(Some(child)), groups),
            }
        }
    }

    let mut groups = Groups::new();
    walk(node, None, &mut groups);
    groups
}

/// Emits a tree with children in schema declaration order.
///
/// Map entries always start with their key leaves, in declared key order.
/// Children that arrived inside an augmentation node are emitted inside an
/// augmentation node again. A child the schema doesn't declare is an error.
pub struct SchemaOrderedWriter<'a, W: NodeStreamWriter + ?Sized> {
    writer: &'a mut W,
    context: &'a SchemaContext,
}

impl<'a, W: NodeStreamWriter + ?Sized> SchemaOrderedWriter<'a, W> {
    /// Create a walker emitting into `writer`, ordered by `context`.
    pub fn new(writer: &'a mut W, context: &'a SchemaContext) -> Self {
        SchemaOrderedWriter { writer, context }
    }

    /// Emit a top-level node, or a whole tree rooted at the schema root.
    pub fn write(&mut self, node: &NormalizedNode) -> TreeResult<()> {
        let context = self.context;
        let name = match node.node_type() {
            Some(name) => name,
            None => return could_not_serialize(node),
        };
        if node.kind() == NodeKind::Container && *name == SchemaContext::root_name() {
            self.writer
                .start_node(node.kind(), node.identifier().clone(), Some(node.len()))?;
            self.write_children(node, context, &[])?;
            return self.writer.end_node();
        }
        match context.data_child(name) {
            Some(schema) => self.write_with_schema(node, schema),
            None => could_not_serialize(node),
        }
    }

    /// Emit `node`, which `schema` describes.
    pub fn write_with_schema(
        &mut self,
        node: &NormalizedNode,
        schema: &DataSchemaNode,
    ) -> TreeResult<()> {
        self.writer.next_schema_node(schema);
        let kind = node.kind();

        if kind.is_scalar() {
            let fits = schema.admits(kind)
                || (kind == NodeKind::LeafSetEntry && schema.as_leaf_list().is_some());
            if !fits {
                return could_not_serialize(node);
            }
            return write_scalar(&mut *self.writer, node);
        }

        match kind {
            NodeKind::Container => match schema {
                DataSchemaNode::Container(c) => {
                    self.writer
                        .start_node(kind, node.identifier().clone(), Some(node.len()))?;
                    self.write_children(node, c.as_ref(), &[])?;
                    self.writer.end_node()
                }
                _ => could_not_serialize(node),
            },
            NodeKind::Choice => match schema {
                DataSchemaNode::Choice(c) => {
                    self.writer
                        .start_node(kind, node.identifier().clone(), Some(node.len()))?;
                    self.write_choice(node, c)?;
                    self.writer.end_node()
                }
                _ => could_not_serialize(node),
            },
            NodeKind::Map | NodeKind::OrderedMap | NodeKind::UnkeyedList => {
                let list = match schema {
                    DataSchemaNode::List(l) if schema.admits(kind) => l,
                    _ => return could_not_serialize(node),
                };
                self.writer
                    .start_node(kind, node.identifier().clone(), Some(node.len()))?;
                for entry in node.children() {
                    self.write_entry(entry, list)?;
                }
                self.writer.end_node()
            }
            NodeKind::MapEntry | NodeKind::UnkeyedListEntry => match schema {
                DataSchemaNode::List(l) => self.write_entry(node, l),
                _ => could_not_serialize(node),
            },
            NodeKind::LeafSet | NodeKind::OrderedLeafSet => {
                if !schema.admits(kind) {
                    return could_not_serialize(node);
                }
                self.writer
                    .start_node(kind, node.identifier().clone(), Some(node.len()))?;
                for entry in node.children() {
                    write_scalar(&mut *self.writer, entry)?;
                }
                self.writer.end_node()
            }
            _ => could_not_serialize(node),
        }
    }

    fn write_entry(&mut self, entry: &NormalizedNode, list: &ListSchema) -> TreeResult<()> {
        let keyed = !list.keys().is_empty();
        let expected = if keyed {
            NodeKind::MapEntry
        } else {
            NodeKind::UnkeyedListEntry
        };
        if entry.kind() != expected {
            return could_not_serialize(entry);
        }
        self.writer
            .start_node(entry.kind(), entry.identifier().clone(), Some(entry.len()))?;
        self.write_children(entry, list, list.keys())?;
        self.writer.end_node()
    }

    fn write_choice(&mut self, node: &NormalizedNode, choice: &ChoiceSchema) -> TreeResult<()> {
        let mut groups = group_children(node);
        for case in choice.cases() {
            self.write_declared(&mut groups, case.as_ref(), &[])?;
        }
        match groups.values().flatten().next() {
            Some(left) => could_not_serialize(left.node),
            None => Ok(()),
        }
    }

    fn write_children(
        &mut self,
        node: &NormalizedNode,
        container: &dyn DataNodeContainer,
        keys: &[QName],
    ) -> TreeResult<()> {
        let mut groups = group_children(node);
        self.write_declared(&mut groups, container, keys)?;
        if let Some(left) = groups.values().flatten().next() {
            return could_not_serialize(left.node);
        }
        self.write_empty_augmentations(node, container)
    }

    // Augmentation nodes without children have no group to be reached
    // through, so they go after everything else.
    fn write_empty_augmentations(
        &mut self,
        node: &NormalizedNode,
        container: &dyn DataNodeContainer,
    ) -> TreeResult<()> {
        let empty = node
            .children()
            .filter(|c| c.kind() == NodeKind::Augmentation && c.is_empty());
        for aug_node in empty {
            let known = match aug_node.identifier() {
                PathArgument::AugmentationId(id) => container.augmentation_by_id(id).is_some(),
                _ => false,
            };
            if !known {
                return could_not_serialize(aug_node);
            }
            self.writer
                .start_node(NodeKind::Augmentation, aug_node.identifier().clone(), Some(0))?;
            self.writer.end_node()?;
        }
        Ok(())
    }

    // Emit every grouped node `container` declares, in declaration order
    // with `keys` first, removing them from `groups`.
    fn write_declared<'n>(
        &mut self,
        groups: &mut Groups<'n>,
        container: &dyn DataNodeContainer,
        keys: &[QName],
    ) -> TreeResult<()> {
        let declared = keys
            .iter()
            .filter_map(|k| container.data_child(k))
            .chain(
                container
                    .child_nodes()
                    .iter()
                    .filter(|c| !keys.contains(c.qname())),
            );

        for schema in declared {
            let name = schema.qname();
            let via = groups
                .get(name)
                .and_then(|entries| entries.iter().find_map(|e| e.via));
            if let Some(aug) = via {
                self.write_augmentation(aug, groups, container)?;
            }
            if let Some(entries) = groups.shift_remove(name) {
                for entry in entries {
                    self.write_with_schema(entry.node, schema)?;
                }
            }
        }
        Ok(())
    }

    // Emit one augmentation node with all of its grouped children.
    fn write_augmentation<'n>(
        &mut self,
        aug_node: &'n NormalizedNode,
        groups: &mut Groups<'n>,
        container: &dyn DataNodeContainer,
    ) -> TreeResult<()> {
        let aug = match aug_node.identifier() {
            PathArgument::AugmentationId(id) => container.augmentation_by_id(id),
            _ => None,
        };
        let aug = match aug {
            Some(aug) => aug,
            None => return could_not_serialize(aug_node),
        };

        self.writer.start_node(
            NodeKind::Augmentation,
            aug_node.identifier().clone(),
            Some(aug_node.len()),
        )?;
        for schema in aug.child_nodes() {
            let name = schema.qname();
            let taken = match groups.get_mut(name) {
                Some(entries) => std::mem::take(entries),
                None => continue,
            };
            let (mine, rest): (Vec<_>, Vec<_>) = taken
                .into_iter()
                .partition(|e| e.via.map_or(false, |v| v.ptr_eq(aug_node)));
            if rest.is_empty() {
                groups.shift_remove(name);
            } else {
                groups.insert(name.clone(), rest);
            }
            for entry in mine {
                self.write_with_schema(entry.node, schema)?;
            }
        }
        self.writer.end_node()
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> TreeResult<()> {
        self.writer.flush()
    }
}
