//! `yang-normalized` is a library for building, streaming and walking
//! immutable YANG data trees in their normalized form.
//!
//! A normalized tree has one node per piece of YANG data, plus synthetic
//! *mixin* nodes for the constructs that don't get a path segment of their
//! own: the map around the entries of a keyed list, the leaf set around the
//! entries of a leaf-list, the choice around the children of its selected
//! case and the augmentation around children contributed by another module.
//!
//! # Implementation Details
//!
//! - Every node kind is built by one [`NodeBuilder`], tagged with a
//!   [`NodeKind`](crate::node::NodeKind). Builders created from a schema node
//!   check everything added to them against that schema.
//!
//! - Trees can be built from a stream of events. Decoders drive the
//!   [`NodeStreamWriter`] trait; [`ImmutableNodeWriter`] turns the events into
//!   a tree with a stack of builders.
//!
//! - [`InstanceIdExpander`] turns an instance identifier into the smallest
//!   tree holding every node along it, synthesizing the mixin nodes the path
//!   doesn't mention. Expansion strategies are cached per schema node and may
//!   be shared between threads.
//!
//! - [`SchemaOrderedWriter`] walks a tree and emits events with children in
//!   schema declaration order, for encoders that care about order.
//!
//! - Schema lookups go through the
//!   [`DataNodeContainer`](crate::context::DataNodeContainer) trait, so the
//!   code that builds and walks trees never inspects schema statements
//!   directly.
//!
//! # Examples
//!
//! Build a list entry with a schema-aware builder; its key predicates come
//! from its key leaves:
//!
//! ```
//! use std::sync::Arc;
//! use yang_normalized::builder::leaf_node;
//! use yang_normalized::path::{PathArgument, QName};
//! use yang_normalized::schema::{LeafSchema, ListSchema};
//! use yang_normalized::types::ScalarType;
//! use yang_normalized::NodeBuilder;
//!
//! let q = QName::new("urn:example:interfaces", "interface");
//! let list = Arc::new(
//!     ListSchema::new(q.clone(), vec![q.with_local("name")])
//!         .with_child(LeafSchema::new(q.with_local("name"), ScalarType::String))
//!         .with_child(LeafSchema::new(q.with_local("mtu"), ScalarType::uint16())),
//! );
//!
//! let entry = NodeBuilder::map_entry_for(&list)
//!     .with_child(leaf_node(q.with_local("name"), "eth0"))?
//!     .with_child(leaf_node(q.with_local("mtu"), 1500u16))?
//!     .build()?;
//! assert_eq!(
//!     entry.identifier(),
//!     &PathArgument::with_key(q.clone(), q.with_local("name"), "eth0")
//! );
//!
//! // Values are checked against the declared type.
//! assert!(NodeBuilder::map_entry_for(&list)
//!     .with_child(leaf_node(q.with_local("mtu"), 100_000u32))
//!     .is_err());
//! # Ok::<(), yang_normalized::TreeError>(())
//! ```
//!
//! Stream a tree back out in schema order:
//!
//! ```
//! use yang_normalized::builder::leaf_node;
//! use yang_normalized::context::SchemaContext;
//! use yang_normalized::node::NodeKind;
//! use yang_normalized::path::{PathArgument, QName};
//! use yang_normalized::schema::{ContainerSchema, LeafSchema};
//! use yang_normalized::stream::ResultSink;
//! use yang_normalized::types::ScalarType;
//! use yang_normalized::{ImmutableNodeWriter, NodeBuilder, SchemaOrderedWriter};
//!
//! let q = QName::new("urn:example:system", "system");
//! let ctx = SchemaContext::new(vec![ContainerSchema::new(q.clone())
//!     .with_child(LeafSchema::new(q.with_local("hostname"), ScalarType::String))
//!     .with_child(LeafSchema::new(q.with_local("location"), ScalarType::String))]);
//!
//! let system = NodeBuilder::new(NodeKind::Container)
//!     .with_identifier(PathArgument::Node(q.clone()))?
//!     .with_child(leaf_node(q.with_local("location"), "rack 4"))?
//!     .with_child(leaf_node(q.with_local("hostname"), "router-1"))?
//!     .build()?;
//!
//! let sink = ResultSink::new();
//! let mut engine = ImmutableNodeWriter::new(&sink);
//! SchemaOrderedWriter::new(&mut engine, &ctx).write(&system)?;
//!
//! let copy = sink.get().unwrap();
//! assert_eq!(copy, &system);
//! let names: Vec<_> = copy.children().map(|c| c.identifier().to_string()).collect();
//! assert_eq!(names[0], q.with_local("hostname").to_string());
//! # Ok::<(), yang_normalized::TreeError>(())
//! ```
//!

#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![warn(clippy::cast_possible_truncation)]

pub mod builder;
pub mod context;
pub mod expand;
pub mod intern;
pub mod node;
pub mod normalize;
pub mod path;
pub mod schema;
pub mod stream;
pub mod types;
pub mod util;
pub mod validate;
pub mod value;
pub mod writer;

#[doc(inline)]
pub use builder::NodeBuilder;
#[doc(inline)]
pub use context::SchemaContext;
#[doc(inline)]
pub use expand::InstanceIdExpander;
#[doc(inline)]
pub use node::NormalizedNode;
#[doc(inline)]
pub use stream::{ImmutableNodeWriter, NodeStreamWriter, ReusableNodeWriter, ResultSink};
#[doc(inline)]
pub use util::{TreeError, TreeResult};
#[doc(inline)]
pub use writer::{NormalizedNodeWriter, SchemaOrderedWriter};

#[cfg(feature = "serde_json")]
pub mod json;
#[cfg(feature = "serde_json")]
#[doc(inline)]
pub use json::value_from_json;
