//! This module contains the in-memory schema model.
//!
//! A schema is a tree of [`DataSchemaNode`]s describing which data may
//! appear where. Schema nodes are built bottom-up with by-value builder
//! methods and are immutable once they're wrapped in a `DataSchemaNode`.
//!
//! ```
//! use yang_normalized::path::QName;
//! use yang_normalized::schema::{ContainerSchema, LeafSchema, ListSchema};
//! use yang_normalized::types::ScalarType;
//!
//! let q = QName::new("urn:example:inventory", "inventory");
//! let item = ListSchema::new(q.with_local("item"), vec![q.with_local("id")])
//!     .with_child(LeafSchema::new(q.with_local("id"), ScalarType::uint32()))
//!     .with_child(LeafSchema::new(q.with_local("label"), ScalarType::String));
//! let top = ContainerSchema::new(q).with_child(item);
//! assert_eq!(top.child_names().count(), 1);
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::context::DataNodeContainer;
use crate::intern::LeafSetEntryInterner;
use crate::node::NodeKind;
use crate::path::{PathArgument, QName};
use crate::types::ScalarType;

/// One node of the schema tree.
#[derive(Clone, Debug)]
#[allow(missing_docs)]
pub enum DataSchemaNode {
    Container(Arc<ContainerSchema>),
    /// A keyed or unkeyed list.
    List(Arc<ListSchema>),
    Leaf(Arc<LeafSchema>),
    LeafList(Arc<LeafListSchema>),
    Choice(Arc<ChoiceSchema>),
    AnyData(Arc<AnySchema>),
    AnyXml(Arc<AnySchema>),
}

impl DataSchemaNode {
    /// Shortcut for creating an `anydata` schema node.
    pub fn anydata(qname: QName) -> DataSchemaNode {
        DataSchemaNode::AnyData(Arc::new(AnySchema { qname }))
    }

    /// Shortcut for creating an `anyxml` schema node.
    pub fn anyxml(qname: QName) -> DataSchemaNode {
        DataSchemaNode::AnyXml(Arc::new(AnySchema { qname }))
    }

    /// The name of this schema node.
    pub fn qname(&self) -> &QName {
        match self {
            DataSchemaNode::Container(c) => &c.qname,
            DataSchemaNode::List(l) => &l.qname,
            DataSchemaNode::Leaf(l) => &l.qname,
            DataSchemaNode::LeafList(l) => &l.qname,
            DataSchemaNode::Choice(c) => &c.qname,
            DataSchemaNode::AnyData(a) => &a.qname,
            DataSchemaNode::AnyXml(a) => &a.qname,
        }
    }

    /// The schema statement this node comes from, for messages.
    pub fn statement(&self) -> &'static str {
        match self {
            DataSchemaNode::Container(_) => "container",
            DataSchemaNode::List(_) => "list",
            DataSchemaNode::Leaf(_) => "leaf",
            DataSchemaNode::LeafList(_) => "leaf-list",
            DataSchemaNode::Choice(_) => "choice",
            DataSchemaNode::AnyData(_) => "anydata",
            DataSchemaNode::AnyXml(_) => "anyxml",
        }
    }

    /// `true` if data described by this node is wrapped in a node with no
    /// instance-identifier segment of its own.
    pub fn is_mixin(&self) -> bool {
        matches!(
            self,
            DataSchemaNode::List(_) | DataSchemaNode::LeafList(_) | DataSchemaNode::Choice(_)
        )
    }

    /// `true` if a data node of `kind` can be an instance of this schema node.
    pub fn admits(&self, kind: NodeKind) -> bool {
        use NodeKind::*;
        match self {
            DataSchemaNode::Container(_) => kind == Container,
            DataSchemaNode::List(l) if l.keys.is_empty() => kind == UnkeyedList,
            DataSchemaNode::List(_) => matches!(kind, Map | OrderedMap),
            DataSchemaNode::Leaf(_) => kind == Leaf,
            DataSchemaNode::LeafList(_) => matches!(kind, LeafSet | OrderedLeafSet),
            DataSchemaNode::Choice(_) => kind == Choice,
            DataSchemaNode::AnyData(_) => kind == AnyData,
            DataSchemaNode::AnyXml(_) => kind == AnyXml,
        }
    }

    /// The container view of a container or list, for child lookups.
    pub fn data_container(&self) -> Option<Arc<dyn DataNodeContainer>> {
        match self {
            DataSchemaNode::Container(c) => Some(c.clone() as Arc<dyn DataNodeContainer>),
            DataSchemaNode::List(l) => Some(l.clone() as Arc<dyn DataNodeContainer>),
            _ => None,
        }
    }

    /// The container, if this is one.
    pub fn as_container(&self) -> Option<&Arc<ContainerSchema>> {
        match self {
            DataSchemaNode::Container(c) => Some(c),
            _ => None,
        }
    }

    /// The list, if this is one.
    pub fn as_list(&self) -> Option<&Arc<ListSchema>> {
        match self {
            DataSchemaNode::List(l) => Some(l),
            _ => None,
        }
    }

    /// The leaf, if this is one.
    pub fn as_leaf(&self) -> Option<&Arc<LeafSchema>> {
        match self {
            DataSchemaNode::Leaf(l) => Some(l),
            _ => None,
        }
    }

    /// The leaf-list, if this is one.
    pub fn as_leaf_list(&self) -> Option<&Arc<LeafListSchema>> {
        match self {
            DataSchemaNode::LeafList(l) => Some(l),
            _ => None,
        }
    }

    /// The choice, if this is one.
    pub fn as_choice(&self) -> Option<&Arc<ChoiceSchema>> {
        match self {
            DataSchemaNode::Choice(c) => Some(c),
            _ => None,
        }
    }
}

// Children of a container, list, case or augmentation, plus the
// augmentations that contributed some of them.
#[derive(Clone, Debug, Default)]
struct Body {
    children: Vec<DataSchemaNode>,
    augmentations: Vec<Arc<AugmentationSchema>>,
}

impl Body {
    fn push(&mut self, child: DataSchemaNode) {
        self.children.push(child);
    }

    // Augmented children are listed with the target's own children, after
    // them, so declaration order puts each augmentation's children together.
    fn augment(&mut self, aug: AugmentationSchema) {
        self.children.extend(aug.body.children.iter().cloned());
        self.augmentations.push(Arc::new(aug));
    }
}

/// A `container` statement.
#[derive(Debug)]
pub struct ContainerSchema {
    qname: QName,
    body: Body,
}

impl ContainerSchema {
    /// A container with no children.
    pub fn new(qname: QName) -> ContainerSchema {
        ContainerSchema {
            qname,
            body: Body::default(),
        }
    }

    /// Declare a child node.
    pub fn with_child<N: Into<DataSchemaNode>>(mut self, child: N) -> Self {
        self.body.push(child.into());
        self
    }

    /// Apply an augmentation to this container.
    pub fn augment(mut self, aug: AugmentationSchema) -> Self {
        self.body.augment(aug);
        self
    }

    /// The name of this container.
    pub fn qname(&self) -> &QName {
        &self.qname
    }
}

/// A `list` statement.
///
/// A list with keys is instantiated as a map of entries; a list without keys
/// as an unkeyed list.
#[derive(Debug)]
pub struct ListSchema {
    qname: QName,
    keys: Vec<QName>,
    user_ordered: bool,
    body: Body,
}

impl ListSchema {
    /// Create a list with the given keys, in declaration order.
    pub fn new(qname: QName, keys: Vec<QName>) -> ListSchema {
        ListSchema {
            qname,
            keys,
            user_ordered: false,
            body: Body::default(),
        }
    }

    /// Declare a child node.
    pub fn with_child<N: Into<DataSchemaNode>>(mut self, child: N) -> Self {
        self.body.push(child.into());
        self
    }

    /// Apply an augmentation to this list.
    pub fn augment(mut self, aug: AugmentationSchema) -> Self {
        self.body.augment(aug);
        self
    }

    /// Set `ordered-by user`.
    pub fn user_ordered(mut self, user_ordered: bool) -> Self {
        self.user_ordered = user_ordered;
        self
    }

    /// The name of this list.
    pub fn qname(&self) -> &QName {
        &self.qname
    }

    /// Key leaf names, in declaration order.
    pub fn keys(&self) -> &[QName] {
        &self.keys
    }

    /// True for `ordered-by user` lists.
    pub fn is_user_ordered(&self) -> bool {
        self.user_ordered
    }
}

/// A `leaf` statement.
#[derive(Debug)]
pub struct LeafSchema {
    qname: QName,
    ty: ScalarType,
}

impl LeafSchema {
    /// A leaf of type `ty`.
    pub fn new(qname: QName, ty: ScalarType) -> LeafSchema {
        LeafSchema { qname, ty }
    }

    /// The name of this leaf.
    pub fn qname(&self) -> &QName {
        &self.qname
    }

    /// The declared type.
    pub fn scalar_type(&self) -> &ScalarType {
        &self.ty
    }
}

/// A `leaf-list` statement.
///
/// Each leaf-list schema node may carry an interner shared by every leaf set
/// built against it.
#[derive(Debug)]
pub struct LeafListSchema {
    qname: QName,
    ty: ScalarType,
    user_ordered: bool,
    interner: Option<Arc<LeafSetEntryInterner>>,
}

impl LeafListSchema {
    /// Create a leaf-list; interning follows
    /// [`ScalarType::interned_by_default`].
    pub fn new(qname: QName, ty: ScalarType) -> LeafListSchema {
        let interner = if ty.interned_by_default() {
            Some(Arc::new(LeafSetEntryInterner::new()))
        } else {
            None
        };
        LeafListSchema {
            qname,
            ty,
            user_ordered: false,
            interner,
        }
    }

    /// Set `ordered-by user`.
    pub fn user_ordered(mut self, user_ordered: bool) -> Self {
        self.user_ordered = user_ordered;
        self
    }

    /// Turn entry interning on or off.
    pub fn interned(mut self, interned: bool) -> Self {
        self.interner = match (interned, self.interner.take()) {
            (false, _) => None,
            (true, Some(existing)) => Some(existing),
            (true, None) => Some(Arc::new(LeafSetEntryInterner::new())),
        };
        self
    }

    /// The name of this leaf-list.
    pub fn qname(&self) -> &QName {
        &self.qname
    }

    /// The declared type of each entry.
    pub fn scalar_type(&self) -> &ScalarType {
        &self.ty
    }

    /// True for `ordered-by user` leaf-lists.
    pub fn is_user_ordered(&self) -> bool {
        self.user_ordered
    }

    /// The interner shared by entries of this leaf-list, if interning is on.
    pub fn interner(&self) -> Option<&Arc<LeafSetEntryInterner>> {
        self.interner.as_ref()
    }
}

/// A `choice` statement and its cases.
#[derive(Debug)]
pub struct ChoiceSchema {
    qname: QName,
    cases: Vec<Arc<CaseSchema>>,
}

impl ChoiceSchema {
    /// A choice with no cases.
    pub fn new(qname: QName) -> ChoiceSchema {
        ChoiceSchema {
            qname,
            cases: Vec::new(),
        }
    }

    /// Declare a case.
    pub fn with_case(mut self, case: CaseSchema) -> Self {
        self.cases.push(Arc::new(case));
        self
    }

    /// The name of this choice.
    pub fn qname(&self) -> &QName {
        &self.qname
    }

    /// Cases, in declaration order.
    pub fn cases(&self) -> &[Arc<CaseSchema>] {
        &self.cases
    }

    /// The case that declares a data node named `name`.
    ///
    /// Nested choices are searched too, so a name from a case of a choice
    /// inside this one resolves to the outer case that holds that choice.
    pub fn find_case(&self, name: &QName) -> Option<&Arc<CaseSchema>> {
        self.cases.iter().find(|case| case.find_child(name).is_some())
    }

    /// The case that an augmentation with these child names applies to.
    pub fn case_for_augmentation(&self, id: &BTreeSet<QName>) -> Option<&Arc<CaseSchema>> {
        self.cases
            .iter()
            .find(|case| case.augmentation_by_id(id).is_some())
    }
}

/// One `case` of a choice.
#[derive(Debug)]
pub struct CaseSchema {
    qname: QName,
    body: Body,
}

impl CaseSchema {
    /// A case with no children.
    pub fn new(qname: QName) -> CaseSchema {
        CaseSchema {
            qname,
            body: Body::default(),
        }
    }

    /// Declare a child node.
    pub fn with_child<N: Into<DataSchemaNode>>(mut self, child: N) -> Self {
        self.body.push(child.into());
        self
    }

    /// Apply an augmentation to this case.
    pub fn augment(mut self, aug: AugmentationSchema) -> Self {
        self.body.augment(aug);
        self
    }

    /// The name of this case.
    pub fn qname(&self) -> &QName {
        &self.qname
    }
}

/// An `anydata` or `anyxml` statement.
#[derive(Debug)]
pub struct AnySchema {
    qname: QName,
}

impl AnySchema {
    /// The name of this node.
    pub fn qname(&self) -> &QName {
        &self.qname
    }
}

/// The children one `augment` statement adds to a target node.
#[derive(Debug, Default)]
pub struct AugmentationSchema {
    body: Body,
}

impl AugmentationSchema {
    /// An augmentation with no children.
    pub fn new() -> AugmentationSchema {
        AugmentationSchema::default()
    }

    /// Declare a child node.
    pub fn with_child<N: Into<DataSchemaNode>>(mut self, child: N) -> Self {
        self.body.push(child.into());
        self
    }

    /// Names of the directly contributed children.
    pub fn child_names(&self) -> BTreeSet<QName> {
        self.body.children.iter().map(|c| c.qname().clone()).collect()
    }

    /// The identity of data nodes wrapping this augmentation's children.
    pub fn identifier(&self) -> PathArgument {
        PathArgument::AugmentationId(self.child_names())
    }
}

macro_rules! data_node_container {
    ($($t:ty),*) => {
        $(
            impl DataNodeContainer for $t {
                fn describe(&self) -> String {
                    self.qname.to_string()
                }

                fn child_nodes(&self) -> &[DataSchemaNode] {
                    &self.body.children
                }

                fn augmentations(&self) -> &[Arc<AugmentationSchema>] {
                    &self.body.augmentations
                }
            }
        )*
    };
}

data_node_container!(ContainerSchema, ListSchema, CaseSchema);

impl DataNodeContainer for AugmentationSchema {
    fn describe(&self) -> String {
        self.identifier().to_string()
    }

    fn child_nodes(&self) -> &[DataSchemaNode] {
        &self.body.children
    }

    fn augmentations(&self) -> &[Arc<AugmentationSchema>] {
        &[]
    }
}

impl ContainerSchema {
    /// Names of declared children, in declaration order.
    pub fn child_names(&self) -> impl Iterator<Item = &QName> {
        self.body.children.iter().map(DataSchemaNode::qname)
    }
}

macro_rules! into_schema_node {
    ($($t:ident => $variant:ident),*) => {
        $(
            impl From<$t> for DataSchemaNode {
                fn from(schema: $t) -> DataSchemaNode {
                    DataSchemaNode::$variant(Arc::new(schema))
                }
            }

            impl From<Arc<$t>> for DataSchemaNode {
                fn from(schema: Arc<$t>) -> DataSchemaNode {
                    DataSchemaNode::$variant(schema)
                }
            }
        )*
    };
}

into_schema_node!(
    ContainerSchema => Container,
    ListSchema => List,
    LeafSchema => Leaf,
    LeafListSchema => LeafList,
    ChoiceSchema => Choice
);

#[test]
fn test_augmented_children_are_data_children() {
    let q = QName::new("urn:example:base", "top");
    let aug_q = QName::new("urn:example:aug", "extra");
    let top = ContainerSchema::new(q.clone())
        .with_child(LeafSchema::new(q.with_local("name"), ScalarType::String))
        .augment(
            AugmentationSchema::new()
                .with_child(LeafSchema::new(aug_q.clone(), ScalarType::Boolean)),
        );

    assert!(top.data_child(&aug_q).is_some());
    let aug = top.augmentation_for(&aug_q).unwrap();
    assert_eq!(aug.identifier(), PathArgument::augmentation(vec![aug_q.clone()]));
    assert!(top.augmentation_for(&q.with_local("name")).is_none());
    assert!(top.augmentation_by_id(&aug.child_names()).is_some());
}

#[test]
fn test_choice_lookup() {
    let q = QName::new("urn:example:base", "shape");
    let inner = ChoiceSchema::new(q.with_local("inner")).with_case(
        CaseSchema::new(q.with_local("deep"))
            .with_child(LeafSchema::new(q.with_local("deep-leaf"), ScalarType::String)),
    );
    let choice = ChoiceSchema::new(q.clone())
        .with_case(
            CaseSchema::new(q.with_local("circle"))
                .with_child(LeafSchema::new(q.with_local("radius"), ScalarType::uint32())),
        )
        .with_case(CaseSchema::new(q.with_local("nested")).with_child(inner));

    let case = choice.find_case(&q.with_local("radius")).unwrap();
    assert_eq!(case.qname(), &q.with_local("circle"));
    let case = choice.find_case(&q.with_local("deep-leaf")).unwrap();
    assert_eq!(case.qname(), &q.with_local("nested"));
    assert!(choice.find_case(&q.with_local("missing")).is_none());
}

#[test]
fn test_leaf_list_interning_defaults() {
    let q = QName::new("urn:example:base", "flags");
    assert!(LeafListSchema::new(q.clone(), ScalarType::Boolean)
        .interner()
        .is_some());
    assert!(LeafListSchema::new(q.clone(), ScalarType::String)
        .interner()
        .is_none());
    assert!(LeafListSchema::new(q.clone(), ScalarType::String)
        .interned(true)
        .interner()
        .is_some());
    assert!(LeafListSchema::new(q, ScalarType::Boolean)
        .interned(false)
        .interner()
        .is_none());
}
