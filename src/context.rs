//! This module defines the schema lookup trait and the schema root.
//!
//! A [`DataNodeContainer`] is anything that declares data children: a
//! container, a list, a choice case, an augmentation or the schema root.
//! Builders, path expansion and the schema-order writer only ever ask
//! questions of this trait, so they never need to know which statement they
//! are looking at.
//!

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::path::QName;
use crate::schema::{AugmentationSchema, ContainerSchema, DataSchemaNode};

/// Read-only lookups on a schema node with data children.
pub trait DataNodeContainer: Send + Sync + fmt::Debug {
    /// A name for this node, for error messages.
    fn describe(&self) -> String;

    /// Declared children, in declaration order.
    ///
    /// Children contributed by augmentations are included.
    fn child_nodes(&self) -> &[DataSchemaNode];

    /// Augmentations applied to this node.
    fn augmentations(&self) -> &[Arc<AugmentationSchema>];

    /// Look up a direct child by name.
    fn data_child(&self, name: &QName) -> Option<&DataSchemaNode> {
        self.child_nodes().iter().find(|c| c.qname() == name)
    }

    /// Look up the direct child that holds data named `name`.
    ///
    /// This is the child itself, or the choice whose cases (at any depth)
    /// declare it.
    fn find_child(&self, name: &QName) -> Option<&DataSchemaNode> {
        self.data_child(name).or_else(|| {
            self.child_nodes().iter().find(|c| match c {
                DataSchemaNode::Choice(choice) => choice.find_case(name).is_some(),
                _ => false,
            })
        })
    }

    /// The augmentation that contributed the child holding `name`.
    fn augmentation_for(&self, name: &QName) -> Option<&Arc<AugmentationSchema>> {
        self.augmentations()
            .iter()
            .find(|aug| aug.find_child(name).is_some())
    }

    /// The augmentation whose children are exactly `id`.
    fn augmentation_by_id(&self, id: &BTreeSet<QName>) -> Option<&Arc<AugmentationSchema>> {
        self.augmentations()
            .iter()
            .find(|aug| aug.child_names() == *id)
    }
}

/// The root of a schema: every top-level data node of every module.
#[derive(Clone, Debug)]
pub struct SchemaContext {
    root: Arc<ContainerSchema>,
}

impl SchemaContext {
    /// The name of the synthetic root container.
    pub fn root_name() -> QName {
        QName::new("urn:ietf:params:xml:ns:netconf:base:1.0", "data")
    }

    /// Create a schema context from its top-level data nodes.
    pub fn new<I, N>(children: I) -> SchemaContext
    where
        I: IntoIterator<Item = N>,
        N: Into<DataSchemaNode>,
    {
        let root = children
            .into_iter()
            .fold(ContainerSchema::new(Self::root_name()), |root, child| {
                root.with_child(child)
            });
        SchemaContext {
            root: Arc::new(root),
        }
    }

    /// The synthetic root container.
    pub fn root(&self) -> &Arc<ContainerSchema> {
        &self.root
    }

    /// The root as a schema node, for walking a whole data tree.
    pub fn as_schema_node(&self) -> DataSchemaNode {
        DataSchemaNode::Container(self.root.clone())
    }
}

impl DataNodeContainer for SchemaContext {
    fn describe(&self) -> String {
        self.root.describe()
    }

    fn child_nodes(&self) -> &[DataSchemaNode] {
        self.root.child_nodes()
    }

    fn augmentations(&self) -> &[Arc<AugmentationSchema>] {
        self.root.augmentations()
    }
}

#[test]
fn test_find_child_through_choice() {
    use crate::schema::{CaseSchema, ChoiceSchema, LeafSchema};
    use crate::types::ScalarType;

    let q = QName::new("urn:example:ctx", "top");
    let ctx = SchemaContext::new(vec![
        DataSchemaNode::from(LeafSchema::new(q.with_local("plain"), ScalarType::String)),
        DataSchemaNode::from(
            ChoiceSchema::new(q.with_local("transport")).with_case(
                CaseSchema::new(q.with_local("tcp"))
                    .with_child(LeafSchema::new(q.with_local("port"), ScalarType::uint16())),
            ),
        ),
    ]);

    assert!(ctx.data_child(&q.with_local("port")).is_none());
    let found = ctx.find_child(&q.with_local("port")).unwrap();
    assert_eq!(found.qname(), &q.with_local("transport"));
    assert_eq!(
        ctx.find_child(&q.with_local("plain")).map(DataSchemaNode::statement),
        Some("leaf")
    );
    assert!(ctx.find_child(&q.with_local("nope")).is_none());
}
