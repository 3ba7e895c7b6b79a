//! This module defines the immutable normalized node tree.
//!
//! A [`NormalizedNode`] is a cheap-to-clone handle on a shared, immutable
//! node. Nodes are only created by [`NodeBuilder::build`], by the
//! constructors in [`builder`](crate::builder) and by path expansion; there
//! is no way to change one afterwards.
//!
//! [`NodeBuilder::build`]: crate::builder::NodeBuilder::build

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use strum_macros::{Display, IntoStaticStr};

use crate::path::{PathArgument, QName};
use crate::value::Value;

/// The kind of a normalized node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[allow(missing_docs)]
pub enum NodeKind {
    Leaf,
    LeafSetEntry,
    Container,
    Choice,
    Augmentation,
    MapEntry,
    UnkeyedListEntry,
    Map,
    OrderedMap,
    LeafSet,
    OrderedLeafSet,
    UnkeyedList,
    AnyData,
    AnyXml,
}

impl NodeKind {
    /// `true` for kinds that carry a single value instead of children.
    pub fn is_scalar(self) -> bool {
        use NodeKind::*;
        matches!(self, Leaf | LeafSetEntry | AnyData | AnyXml)
    }

    /// `true` for kinds whose children are arbitrary data nodes.
    pub fn is_data_container(self) -> bool {
        use NodeKind::*;
        matches!(
            self,
            Container | Choice | Augmentation | MapEntry | UnkeyedListEntry
        )
    }

    /// `true` for the wrapper kinds that don't correspond to a segment of an
    /// instance identifier of their own.
    pub fn is_mixin(self) -> bool {
        use NodeKind::*;
        matches!(
            self,
            Choice | Augmentation | Map | OrderedMap | LeafSet | OrderedLeafSet | UnkeyedList
        )
    }

    /// `true` if a node of this kind may directly hold a node of kind `child`.
    pub fn accepts_child(self, child: NodeKind) -> bool {
        use NodeKind::*;
        match self {
            Container | Choice | MapEntry | UnkeyedListEntry => is_data_child(child),
            // Augmentations never nest.
            Augmentation => child != Augmentation && is_data_child(child),
            Map | OrderedMap => child == MapEntry,
            LeafSet | OrderedLeafSet => child == LeafSetEntry,
            UnkeyedList => child == UnkeyedListEntry,
            Leaf | LeafSetEntry | AnyData | AnyXml => false,
        }
    }

    /// `true` if `id` is the right identifier variant for this kind.
    pub fn accepts_identifier(self, id: &PathArgument) -> bool {
        use NodeKind::*;
        match (self, id) {
            (MapEntry, PathArgument::NodeWithPredicates(..)) => true,
            (LeafSetEntry, PathArgument::NodeWithValue(..)) => true,
            (Augmentation, PathArgument::AugmentationId(_)) => true,
            (MapEntry, _) | (LeafSetEntry, _) | (Augmentation, _) => false,
            (_, PathArgument::Node(_)) => true,
            _ => false,
        }
    }
}

// Kinds that may appear among the children of a data container.
fn is_data_child(kind: NodeKind) -> bool {
    use NodeKind::*;
    matches!(
        kind,
        Leaf | LeafSet
            | OrderedLeafSet
            | Container
            | UnkeyedList
            | Map
            | OrderedMap
            | Choice
            | Augmentation
            | AnyData
            | AnyXml
    )
}

/// A node carrying a single value: leaf, leaf-set entry, anydata or anyxml.
#[derive(Debug, PartialEq, Eq)]
pub struct ValueNode {
    pub(crate) identifier: PathArgument,
    pub(crate) value: Value,
}

impl ValueNode {
    /// The identity of this node.
    pub fn identifier(&self) -> &PathArgument {
        &self.identifier
    }

    /// The scalar this node holds.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// A node whose children are keyed by their identity.
#[derive(Debug)]
pub struct CompositeNode {
    pub(crate) identifier: PathArgument,
    pub(crate) children: IndexMap<PathArgument, NormalizedNode>,
}

impl CompositeNode {
    /// The identity of this node.
    pub fn identifier(&self) -> &PathArgument {
        &self.identifier
    }
}

/// An unkeyed list: entries in order, all sharing one identity.
#[derive(Debug, PartialEq)]
pub struct UnkeyedListNode {
    pub(crate) identifier: PathArgument,
    pub(crate) entries: Vec<NormalizedNode>,
}

impl UnkeyedListNode {
    /// The identity of this node.
    pub fn identifier(&self) -> &PathArgument {
        &self.identifier
    }
}

/// An immutable node of a normalized data tree.
///
/// Cloning a `NormalizedNode` shares the underlying node.
#[derive(Clone)]
#[allow(missing_docs)]
pub enum NormalizedNode {
    Leaf(Arc<ValueNode>),
    LeafSetEntry(Arc<ValueNode>),
    AnyData(Arc<ValueNode>),
    AnyXml(Arc<ValueNode>),
    Container(Arc<CompositeNode>),
    Choice(Arc<CompositeNode>),
    Augmentation(Arc<CompositeNode>),
    MapEntry(Arc<CompositeNode>),
    UnkeyedListEntry(Arc<CompositeNode>),
    Map(Arc<CompositeNode>),
    OrderedMap(Arc<CompositeNode>),
    LeafSet(Arc<CompositeNode>),
    OrderedLeafSet(Arc<CompositeNode>),
    UnkeyedList(Arc<UnkeyedListNode>),
}

/// An iterator over a node's children.
pub enum Children<'a> {
    #[allow(missing_docs)]
    None,
    #[allow(missing_docs)]
    Keyed(indexmap::map::Values<'a, PathArgument, NormalizedNode>),
    #[allow(missing_docs)]
    Ordered(std::slice::Iter<'a, NormalizedNode>),
}

impl<'a> Iterator for Children<'a> {
    type Item = &'a NormalizedNode;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Children::None => None,
            Children::Keyed(iter) => iter.next(),
            Children::Ordered(iter) => iter.next(),
        }
    }
}

impl NormalizedNode {
    pub(crate) fn from_value(kind: NodeKind, identifier: PathArgument, value: Value) -> Self {
        let node = Arc::new(ValueNode { identifier, value });
        match kind {
            NodeKind::LeafSetEntry => NormalizedNode::LeafSetEntry(node),
            NodeKind::AnyData => NormalizedNode::AnyData(node),
            NodeKind::AnyXml => NormalizedNode::AnyXml(node),
            _ => NormalizedNode::Leaf(node),
        }
    }

    // `kind` must be one of the composite kinds other than UnkeyedList.
    pub(crate) fn from_children(
        kind: NodeKind,
        identifier: PathArgument,
        children: IndexMap<PathArgument, NormalizedNode>,
    ) -> Self {
        let node = Arc::new(CompositeNode {
            identifier,
            children,
        });
        match kind {
            NodeKind::Choice => NormalizedNode::Choice(node),
            NodeKind::Augmentation => NormalizedNode::Augmentation(node),
            NodeKind::MapEntry => NormalizedNode::MapEntry(node),
            NodeKind::UnkeyedListEntry => NormalizedNode::UnkeyedListEntry(node),
            NodeKind::Map => NormalizedNode::Map(node),
            NodeKind::OrderedMap => NormalizedNode::OrderedMap(node),
            NodeKind::LeafSet => NormalizedNode::LeafSet(node),
            NodeKind::OrderedLeafSet => NormalizedNode::OrderedLeafSet(node),
            _ => NormalizedNode::Container(node),
        }
    }

    pub(crate) fn from_entries(identifier: PathArgument, entries: Vec<NormalizedNode>) -> Self {
        NormalizedNode::UnkeyedList(Arc::new(UnkeyedListNode {
            identifier,
            entries,
        }))
    }

    /// Which kind of node this is.
    pub fn kind(&self) -> NodeKind {
        match self {
            NormalizedNode::Leaf(_) => NodeKind::Leaf,
            NormalizedNode::LeafSetEntry(_) => NodeKind::LeafSetEntry,
            NormalizedNode::AnyData(_) => NodeKind::AnyData,
            NormalizedNode::AnyXml(_) => NodeKind::AnyXml,
            NormalizedNode::Container(_) => NodeKind::Container,
            NormalizedNode::Choice(_) => NodeKind::Choice,
            NormalizedNode::Augmentation(_) => NodeKind::Augmentation,
            NormalizedNode::MapEntry(_) => NodeKind::MapEntry,
            NormalizedNode::UnkeyedListEntry(_) => NodeKind::UnkeyedListEntry,
            NormalizedNode::Map(_) => NodeKind::Map,
            NormalizedNode::OrderedMap(_) => NodeKind::OrderedMap,
            NormalizedNode::LeafSet(_) => NodeKind::LeafSet,
            NormalizedNode::OrderedLeafSet(_) => NodeKind::OrderedLeafSet,
            NormalizedNode::UnkeyedList(_) => NodeKind::UnkeyedList,
        }
    }

    /// This node's identity among its siblings.
    pub fn identifier(&self) -> &PathArgument {
        match self {
            NormalizedNode::Leaf(n)
            | NormalizedNode::LeafSetEntry(n)
            | NormalizedNode::AnyData(n)
            | NormalizedNode::AnyXml(n) => &n.identifier,
            NormalizedNode::UnkeyedList(n) => &n.identifier,
            NormalizedNode::Container(n)
            | NormalizedNode::Choice(n)
            | NormalizedNode::Augmentation(n)
            | NormalizedNode::MapEntry(n)
            | NormalizedNode::UnkeyedListEntry(n)
            | NormalizedNode::Map(n)
            | NormalizedNode::OrderedMap(n)
            | NormalizedNode::LeafSet(n)
            | NormalizedNode::OrderedLeafSet(n) => &n.identifier,
        }
    }

    /// The node's qualified name; augmentation nodes don't have one.
    pub fn node_type(&self) -> Option<&QName> {
        self.identifier().node_type()
    }

    /// The value of a leaf, leaf-set entry, anydata or anyxml node.
    pub fn value(&self) -> Option<&Value> {
        self.value_node().map(|n| &n.value)
    }

    pub(crate) fn value_node(&self) -> Option<&Arc<ValueNode>> {
        match self {
            NormalizedNode::Leaf(n)
            | NormalizedNode::LeafSetEntry(n)
            | NormalizedNode::AnyData(n)
            | NormalizedNode::AnyXml(n) => Some(n),
            _ => None,
        }
    }

    fn composite(&self) -> Option<&CompositeNode> {
        match self {
            NormalizedNode::Container(n)
            | NormalizedNode::Choice(n)
            | NormalizedNode::Augmentation(n)
            | NormalizedNode::MapEntry(n)
            | NormalizedNode::UnkeyedListEntry(n)
            | NormalizedNode::Map(n)
            | NormalizedNode::OrderedMap(n)
            | NormalizedNode::LeafSet(n)
            | NormalizedNode::OrderedLeafSet(n) => Some(n),
            _ => None,
        }
    }

    /// Iterate over the children, in insertion order.
    ///
    /// Value nodes have no children.
    pub fn children(&self) -> Children<'_> {
        if let NormalizedNode::UnkeyedList(n) = self {
            return Children::Ordered(n.entries.iter());
        }
        match self.composite() {
            Some(n) => Children::Keyed(n.children.values()),
            None => Children::None,
        }
    }

    /// Look up a child by its identity.
    ///
    /// Unkeyed list entries all share one identity; the first is returned.
    pub fn child(&self, id: &PathArgument) -> Option<&NormalizedNode> {
        if let NormalizedNode::UnkeyedList(n) = self {
            return n.entries.iter().find(|e| e.identifier() == id);
        }
        self.composite().and_then(|n| n.children.get(id))
    }

    /// Shortcut for looking up a child by name.
    pub fn child_by_name(&self, name: &QName) -> Option<&NormalizedNode> {
        self.child(&PathArgument::Node(name.clone()))
    }

    /// The number of children.
    pub fn len(&self) -> usize {
        match self {
            NormalizedNode::UnkeyedList(n) => n.entries.len(),
            _ => self.composite().map_or(0, |n| n.children.len()),
        }
    }

    /// `true` if the node has no children.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` if both handles point at the same node.
    pub fn ptr_eq(&self, other: &NormalizedNode) -> bool {
        if let (Some(a), Some(b)) = (self.value_node(), other.value_node()) {
            return Arc::ptr_eq(a, b);
        }
        if let (NormalizedNode::UnkeyedList(a), NormalizedNode::UnkeyedList(b)) = (self, other) {
            return Arc::ptr_eq(a, b);
        }
        match (self.composite(), other.composite()) {
            (Some(a), Some(b)) => std::ptr::eq(a, b),
            _ => false,
        }
    }

    fn is_ordered(&self) -> bool {
        matches!(
            self,
            NormalizedNode::OrderedMap(_) | NormalizedNode::OrderedLeafSet(_)
        )
    }
}

// Trees compare structurally. Children of unordered kinds compare as a set;
// ordered maps, ordered leaf sets and unkeyed lists compare in order.
impl PartialEq for NormalizedNode {
    fn eq(&self, other: &NormalizedNode) -> bool {
        if self.kind() != other.kind() || self.identifier() != other.identifier() {
            return false;
        }
        if let (Some(a), Some(b)) = (self.value_node(), other.value_node()) {
            return a.value == b.value;
        }
        if let (NormalizedNode::UnkeyedList(a), NormalizedNode::UnkeyedList(b)) = (self, other) {
            return a.entries == b.entries;
        }
        match (self.composite(), other.composite()) {
            (Some(a), Some(b)) if self.is_ordered() => a.children.iter().eq(b.children.iter()),
            (Some(a), Some(b)) => a.children == b.children,
            _ => false,
        }
    }
}

impl fmt::Debug for NormalizedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind: &'static str = self.kind().into();
        match self.value() {
            Some(v) => write!(f, "{}({}={:?})", kind, self.identifier(), v),
            None => f
                .debug_struct(kind)
                .field("id", &format_args!("{}", self.identifier()))
                .field("children", &self.children().collect::<Vec<_>>())
                .finish(),
        }
    }
}

#[test]
fn test_kind_nesting_rules() {
    use NodeKind::*;

    assert!(Container.accepts_child(Leaf));
    assert!(Container.accepts_child(Augmentation));
    assert!(!Augmentation.accepts_child(Augmentation));
    assert!(!Container.accepts_child(MapEntry));
    assert!(Map.accepts_child(MapEntry));
    assert!(!Map.accepts_child(Container));
    assert!(!Leaf.accepts_child(Leaf));
    assert!(LeafSet.accepts_child(LeafSetEntry));
    assert!(UnkeyedList.accepts_child(UnkeyedListEntry));
    assert!(!UnkeyedList.accepts_child(MapEntry));

    let q = QName::new("urn:example", "x");
    assert!(Container.accepts_identifier(&PathArgument::Node(q.clone())));
    assert!(!MapEntry.accepts_identifier(&PathArgument::Node(q.clone())));
    assert!(LeafSetEntry.accepts_identifier(&PathArgument::with_value(q.clone(), 1u8)));
    assert!(!Leaf.accepts_identifier(&PathArgument::with_value(q, 1u8)));

    let name: &'static str = OrderedLeafSet.into();
    assert_eq!(name, "OrderedLeafSet");
    assert_eq!(MapEntry.to_string(), "MapEntry");
}
