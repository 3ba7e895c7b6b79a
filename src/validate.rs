//! This module contains the schema checks applied by schema-aware builders.
//!
//! A [`SchemaValidator`] is attached to a [`NodeBuilder`] when the builder is
//! created from a schema node. It fixes the node's identity and checks every
//! child or value the builder accepts. Plain builders carry no validator and
//! check nothing beyond node-kind nesting.
//!
//! [`NodeBuilder`]: crate::builder::NodeBuilder

use std::sync::Arc;

use indexmap::IndexMap;

use crate::context::DataNodeContainer;
use crate::node::{NodeKind, NormalizedNode};
use crate::path::{PathArgument, Predicates, QName};
use crate::schema::{
    AugmentationSchema, CaseSchema, ChoiceSchema, DataSchemaNode, LeafListSchema, LeafSchema,
    ListSchema,
};
use crate::util::{argument, mismatch, structural, TreeError, TreeResult};
use crate::value::Value;

/// The schema node a builder validates against.
#[derive(Clone, Debug)]
pub enum SchemaValidator {
    /// A container, or an entry of an unkeyed list.
    DataContainer(QName, Arc<dyn DataNodeContainer>),
    /// A choice. The case is fixed by the first child.
    Choice {
        #[allow(missing_docs)]
        schema: Arc<ChoiceSchema>,
        #[allow(missing_docs)]
        case: Option<Arc<CaseSchema>>,
    },
    /// The wrapper around one augmentation's children.
    Augmentation(Arc<AugmentationSchema>),
    /// An entry of a keyed list. Its identity is derived from its key leaves.
    MapEntry(Arc<ListSchema>),
    /// A map or unkeyed list: every entry must carry the list's name.
    List(QName),
    /// A leaf set: entries must carry the leaf-list's name and type.
    LeafSet(Arc<LeafListSchema>),
    #[allow(missing_docs)]
    Leaf(Arc<LeafSchema>),
    /// A leaf-set entry. Its identity is derived from its value.
    LeafSetEntry(Arc<LeafListSchema>),
    /// Anydata or anyxml; the payload is opaque.
    Any(QName),
}

impl SchemaValidator {
    /// The identity the schema assigns, if it doesn't depend on content.
    pub fn identifier(&self) -> Option<PathArgument> {
        match self {
            SchemaValidator::DataContainer(name, _)
            | SchemaValidator::List(name)
            | SchemaValidator::Any(name) => Some(PathArgument::Node(name.clone())),
            SchemaValidator::Choice { schema, .. } => {
                Some(PathArgument::Node(schema.qname().clone()))
            }
            SchemaValidator::Augmentation(aug) => Some(aug.identifier()),
            SchemaValidator::LeafSet(ll) => Some(PathArgument::Node(ll.qname().clone())),
            SchemaValidator::Leaf(leaf) => Some(PathArgument::Node(leaf.qname().clone())),
            SchemaValidator::MapEntry(_) | SchemaValidator::LeafSetEntry(_) => None,
        }
    }

    /// Check a child before it is added.
    ///
    /// Node-kind nesting has already been checked by the builder.
    pub fn check_child(&mut self, child: &NormalizedNode) -> TreeResult<()> {
        match self {
            SchemaValidator::DataContainer(_, container) => {
                check_data_child(container.as_ref(), child)
            }
            SchemaValidator::MapEntry(list) => check_data_child(list.as_ref(), child),
            SchemaValidator::Augmentation(aug) => {
                if child.kind() == NodeKind::Augmentation {
                    return structural("augmentations cannot be nested");
                }
                check_data_child(aug.as_ref(), child)
            }
            SchemaValidator::Choice { schema, case } => {
                let found = case_of(schema, child)?;
                check_data_child(found.as_ref(), child)?;
                match case {
                    Some(fixed) if !Arc::ptr_eq(fixed, &found) => Err(mismatch(
                        format!("child of case {}", fixed.qname()),
                        format!("{} from case {}", child.identifier(), found.qname()),
                    )),
                    Some(_) => Ok(()),
                    None => {
                        *case = Some(found);
                        Ok(())
                    }
                }
            }
            SchemaValidator::List(name) => check_name(name, child),
            SchemaValidator::LeafSet(ll) => {
                check_name(ll.qname(), child)?;
                match child.value() {
                    Some(v) => ll.scalar_type().check(v),
                    None => Ok(()),
                }
            }
            SchemaValidator::Leaf(_) | SchemaValidator::LeafSetEntry(_) | SchemaValidator::Any(_) => {
                structural(format!("{} has no children", child.identifier()))
            }
        }
    }

    /// Check a value before it is set.
    pub fn check_value(&self, value: &Value) -> TreeResult<()> {
        match self {
            SchemaValidator::Leaf(leaf) => leaf.scalar_type().check(value),
            SchemaValidator::LeafSetEntry(ll) => ll.scalar_type().check(value),
            _ => Ok(()),
        }
    }

    /// The case a choice builder has committed to, if any.
    pub fn selected_case(&self) -> Option<&Arc<CaseSchema>> {
        match self {
            SchemaValidator::Choice { case, .. } => case.as_ref(),
            _ => None,
        }
    }
}

fn unknown_child(child: &NormalizedNode, parent: &dyn DataNodeContainer) -> TreeError {
    TreeError::UnknownChild {
        child: child.identifier().to_string(),
        parent: parent.describe(),
    }
}

fn check_data_child(container: &dyn DataNodeContainer, child: &NormalizedNode) -> TreeResult<()> {
    let name = match child.identifier() {
        PathArgument::AugmentationId(id) => {
            return match container.augmentation_by_id(id) {
                Some(_) => Ok(()),
                None => Err(unknown_child(child, container)),
            };
        }
        other => other.node_type(),
    };
    let schema = name
        .and_then(|n| container.data_child(n))
        .ok_or_else(|| unknown_child(child, container))?;
    if schema.admits(child.kind()) {
        match (schema, child.value()) {
            (DataSchemaNode::Leaf(leaf), Some(value)) => leaf.scalar_type().check(value),
            _ => Ok(()),
        }
    } else {
        Err(mismatch(
            format!("{} {}", schema.statement(), schema.qname()),
            format!("{} {}", child.kind(), child.identifier()),
        ))
    }
}

fn check_name(expected: &QName, child: &NormalizedNode) -> TreeResult<()> {
    match child.node_type() {
        Some(name) if name == expected => Ok(()),
        _ => Err(mismatch(expected.to_string(), child.identifier().to_string())),
    }
}

fn case_of(choice: &ChoiceSchema, child: &NormalizedNode) -> TreeResult<Arc<CaseSchema>> {
    let found = match child.identifier() {
        PathArgument::AugmentationId(id) => choice.case_for_augmentation(id),
        other => other.node_type().and_then(|name| choice.find_case(name)),
    };
    found.cloned().ok_or_else(|| TreeError::UnknownChild {
        child: child.identifier().to_string(),
        parent: choice.qname().to_string(),
    })
}

/// Read a list entry's key values from its key leaves, in key order.
pub(crate) fn key_predicates(
    list: &ListSchema,
    children: &IndexMap<PathArgument, NormalizedNode>,
) -> TreeResult<Predicates> {
    let mut predicates = Predicates::new();
    for key in list.keys() {
        let leaf = children.get(&PathArgument::Node(key.clone()));
        match leaf.and_then(NormalizedNode::value) {
            Some(value) => predicates.insert(key.clone(), value.clone()),
            None => {
                return argument(format!(
                    "entry of list {} is missing key leaf {}",
                    list.qname(),
                    key
                ))
            }
        }
    }
    Ok(predicates)
}

/// Check that a map entry's key leaves agree with its identity.
pub(crate) fn check_key_leaves(
    identifier: &PathArgument,
    children: &IndexMap<PathArgument, NormalizedNode>,
) -> TreeResult<()> {
    let predicates = match identifier.predicates() {
        Some(p) => p,
        None => return Ok(()),
    };
    for (key, expected) in predicates.iter() {
        match children.get(&PathArgument::Node(key.clone())) {
            Some(leaf) => match leaf.value() {
                Some(actual) if actual == expected => (),
                Some(actual) => {
                    return Err(mismatch(
                        format!("{}={}", key, expected),
                        format!("{}={}", key, actual),
                    ))
                }
                None => {
                    return Err(mismatch(
                        format!("leaf {}", key),
                        format!("{} {}", leaf.kind(), key),
                    ))
                }
            },
            None => {
                return argument(format!("{} is missing key leaf {}", identifier, key));
            }
        }
    }
    Ok(())
}
