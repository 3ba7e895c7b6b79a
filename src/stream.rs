//! This module contains the streaming protocol and the engine that turns a
//! stream of events into an immutable tree.
//!
//! A producer (a wire-format decoder, or one of the walkers in
//! [`writer`](crate::writer)) calls `start_*`, [`scalar_value`] and
//! [`end_node`] on a [`NodeStreamWriter`]. [`ImmutableNodeWriter`] keeps one
//! [`NodeBuilder`] per open node on a stack; closing a node builds it and
//! hands it to its parent, and closing the outermost node delivers it to a
//! [`ResultSink`].
//!
//! ```
//! use yang_normalized::path::QName;
//! use yang_normalized::stream::{ImmutableNodeWriter, NodeStreamWriter, ResultSink};
//!
//! let q = QName::new("urn:example", "system");
//! let sink = ResultSink::new();
//! let mut writer = ImmutableNodeWriter::new(&sink);
//! writer.start_container(q.clone(), None)?;
//! writer.start_leaf(q.with_local("hostname"))?;
//! writer.scalar_value("router-1".into())?;
//! writer.end_node()?;
//! writer.end_node()?;
//!
//! assert_eq!(sink.get().map(|n| n.len()), Some(1));
//! # Ok::<(), yang_normalized::util::TreeError>(())
//! ```
//!
//! [`scalar_value`]: NodeStreamWriter::scalar_value
//! [`end_node`]: NodeStreamWriter::end_node

use std::cell::OnceCell;
use std::collections::BTreeSet;

use log::trace;

use crate::builder::NodeBuilder;
use crate::node::{NodeKind, NormalizedNode};
use crate::path::{PathArgument, Predicates, QName};
use crate::schema::DataSchemaNode;
use crate::util::{structural, TreeError, TreeResult};
use crate::value::Value;

/// A receiver of node events.
///
/// Every `start_*` call opens a node, which stays open until the matching
/// [`end_node`](Self::end_node). Scalar nodes receive their value with
/// [`scalar_value`](Self::scalar_value) while open.
///
/// Size hints are advisory: they may be used to pre-allocate, and are never
/// checked.
pub trait NodeStreamWriter {
    /// Open a node of any kind.
    fn start_node(
        &mut self,
        kind: NodeKind,
        identifier: PathArgument,
        size_hint: Option<usize>,
    ) -> TreeResult<()>;

    /// Set the value of the open scalar node.
    fn scalar_value(&mut self, value: Value) -> TreeResult<()>;

    /// Close the most recently opened node.
    fn end_node(&mut self) -> TreeResult<()>;

    /// Tell the receiver which schema node describes the next node to be
    /// opened. Receivers are free to ignore this.
    fn next_schema_node(&mut self, _schema: &DataSchemaNode) {}

    /// Push buffered events downstream. Does nothing by default.
    fn flush(&mut self) -> TreeResult<()> {
        Ok(())
    }

    /// Finish the session. Does nothing by default.
    fn close(&mut self) -> TreeResult<()> {
        Ok(())
    }

    /// Start a leaf.
    fn start_leaf(&mut self, name: QName) -> TreeResult<()> {
        self.start_node(NodeKind::Leaf, PathArgument::Node(name), None)
    }

    /// Start a leaf set.
    fn start_leaf_set(&mut self, name: QName, size_hint: Option<usize>) -> TreeResult<()> {
        self.start_node(NodeKind::LeafSet, PathArgument::Node(name), size_hint)
    }

    /// Start an `ordered-by user` leaf set.
    fn start_ordered_leaf_set(&mut self, name: QName, size_hint: Option<usize>) -> TreeResult<()> {
        self.start_node(NodeKind::OrderedLeafSet, PathArgument::Node(name), size_hint)
    }

    /// Open a leaf-set entry; its value still has to be sent with
    /// [`scalar_value`](Self::scalar_value).
    fn start_leaf_set_entry(&mut self, name: QName, value: Value) -> TreeResult<()> {
        self.start_node(
            NodeKind::LeafSetEntry,
            PathArgument::NodeWithValue(name, value),
            None,
        )
    }

    /// Start a container.
    fn start_container(&mut self, name: QName, size_hint: Option<usize>) -> TreeResult<()> {
        self.start_node(NodeKind::Container, PathArgument::Node(name), size_hint)
    }

    /// Start an unkeyed list.
    fn start_unkeyed_list(&mut self, name: QName, size_hint: Option<usize>) -> TreeResult<()> {
        self.start_node(NodeKind::UnkeyedList, PathArgument::Node(name), size_hint)
    }

    /// Start an entry of an unkeyed list.
    fn start_unkeyed_list_item(&mut self, name: QName, size_hint: Option<usize>) -> TreeResult<()> {
        self.start_node(NodeKind::UnkeyedListEntry, PathArgument::Node(name), size_hint)
    }

    /// Start a map.
    fn start_map(&mut self, name: QName, size_hint: Option<usize>) -> TreeResult<()> {
        self.start_node(NodeKind::Map, PathArgument::Node(name), size_hint)
    }

    /// Start an `ordered-by user` map.
    fn start_ordered_map(&mut self, name: QName, size_hint: Option<usize>) -> TreeResult<()> {
        self.start_node(NodeKind::OrderedMap, PathArgument::Node(name), size_hint)
    }

    /// Start a map entry with its key predicates.
    fn start_map_entry(
        &mut self,
        name: QName,
        predicates: Predicates,
        size_hint: Option<usize>,
    ) -> TreeResult<()> {
        self.start_node(
            NodeKind::MapEntry,
            PathArgument::NodeWithPredicates(name, predicates),
            size_hint,
        )
    }

    /// Start a choice.
    fn start_choice(&mut self, name: QName, size_hint: Option<usize>) -> TreeResult<()> {
        self.start_node(NodeKind::Choice, PathArgument::Node(name), size_hint)
    }

    /// Start an augmentation holding `children`.
    fn start_augmentation(&mut self, children: BTreeSet<QName>) -> TreeResult<()> {
        self.start_node(
            NodeKind::Augmentation,
            PathArgument::AugmentationId(children),
            None,
        )
    }

    /// Start an anydata node.
    fn start_anydata(&mut self, name: QName) -> TreeResult<()> {
        self.start_node(NodeKind::AnyData, PathArgument::Node(name), None)
    }

    /// Start an anyxml node.
    fn start_anyxml(&mut self, name: QName) -> TreeResult<()> {
        self.start_node(NodeKind::AnyXml, PathArgument::Node(name), None)
    }
}

/// A single-assignment cell receiving the tree a writer produces.
#[derive(Debug, Default)]
pub struct ResultSink {
    result: OnceCell<NormalizedNode>,
}

impl ResultSink {
    /// Create an empty sink.
    pub fn new() -> ResultSink {
        ResultSink::default()
    }

    /// Store the result. Fails if a result is already stored.
    pub fn set(&self, node: NormalizedNode) -> TreeResult<()> {
        self.result.set(node).map_err(|_| TreeError::AlreadySet)
    }

    /// The stored result, if any.
    pub fn get(&self) -> Option<&NormalizedNode> {
        self.result.get()
    }

    /// True once a result is stored.
    pub fn is_set(&self) -> bool {
        self.result.get().is_some()
    }

    /// Remove and return the result, leaving the sink empty.
    pub fn take(&mut self) -> Option<NormalizedNode> {
        self.result.take()
    }
}

/// Where an [`ImmutableNodeWriter`] is in its session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriterState {
    /// Nothing opened yet.
    Idle,
    /// At least one node is open.
    Building,
    /// A top-level node has been delivered and nothing is open.
    Done,
}

// Where finished top-level nodes go.
#[derive(Debug)]
enum Target<'a> {
    Sink(&'a ResultSink),
    Owned(ResultSink),
    Builder(NodeBuilder),
}

/// The stack-based engine building immutable trees from node events.
#[derive(Debug)]
pub struct ImmutableNodeWriter<'a> {
    stack: Vec<NodeBuilder>,
    target: Target<'a>,
    state: WriterState,
    delivered: bool,
    schema_hint: Option<DataSchemaNode>,
}

impl<'a> ImmutableNodeWriter<'a> {
    /// Create a writer delivering its result to `sink`.
    pub fn new(sink: &'a ResultSink) -> ImmutableNodeWriter<'a> {
        ImmutableNodeWriter::with_target(Target::Sink(sink))
    }

    fn with_target(target: Target<'a>) -> ImmutableNodeWriter<'a> {
        ImmutableNodeWriter {
            stack: Vec::new(),
            target,
            state: WriterState::Idle,
            delivered: false,
            schema_hint: None,
        }
    }

    /// Where the session is.
    pub fn state(&self) -> WriterState {
        self.state
    }

    /// The number of open nodes.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn parent_kind(&self) -> Option<NodeKind> {
        match (self.stack.last(), &self.target) {
            (Some(top), _) => Some(top.kind()),
            (None, Target::Builder(builder)) => Some(builder.kind()),
            (None, _) => None,
        }
    }

    fn deliver(&mut self, node: NormalizedNode) -> TreeResult<()> {
        match &mut self.target {
            Target::Sink(sink) => sink.set(node)?,
            Target::Owned(sink) => sink.set(node)?,
            Target::Builder(builder) => builder.add_child(node)?,
        }
        self.delivered = true;
        Ok(())
    }

    // The state follows the stack, whether or not the last event succeeded.
    fn settle(&mut self) {
        self.state = if !self.stack.is_empty() {
            WriterState::Building
        } else if self.delivered {
            WriterState::Done
        } else {
            WriterState::Idle
        };
    }
}

impl ImmutableNodeWriter<'static> {
    /// Create a writer adding every top-level node it builds as a child of
    /// `builder`.
    pub fn for_builder(builder: NodeBuilder) -> ImmutableNodeWriter<'static> {
        ImmutableNodeWriter::with_target(Target::Builder(builder))
    }

    /// Build and return the node of a writer created by
    /// [`for_builder`](Self::for_builder).
    pub fn finish(self) -> TreeResult<NormalizedNode> {
        if !self.stack.is_empty() {
            return structural(format!("finish with {} nodes still open", self.stack.len()));
        }
        match self.target {
            Target::Builder(builder) => builder.build(),
            _ => structural("finish on a writer without a target builder"),
        }
    }
}

impl NodeStreamWriter for ImmutableNodeWriter<'_> {
    fn start_node(
        &mut self,
        kind: NodeKind,
        identifier: PathArgument,
        size_hint: Option<usize>,
    ) -> TreeResult<()> {
        let hint = self.schema_hint.take();
        if let Some(parent) = self.parent_kind() {
            if !parent.accepts_child(kind) {
                return structural(format!(
                    "{} {} cannot start inside {}",
                    kind, identifier, parent
                ));
            }
        }

        let mut builder = NodeBuilder::sized(kind, size_hint);
        builder.set_identifier(identifier)?;
        if let Some(DataSchemaNode::LeafList(leaf_list)) = &hint {
            if matches!(kind, NodeKind::LeafSet | NodeKind::OrderedLeafSet) {
                if let Some(interner) = leaf_list.interner() {
                    builder.set_interner(interner.clone());
                }
            }
        }

        trace!("push {} at depth {}", kind, self.stack.len());
        self.stack.push(builder);
        self.state = WriterState::Building;
        Ok(())
    }

    fn scalar_value(&mut self, value: Value) -> TreeResult<()> {
        match self.stack.last_mut() {
            Some(top) if top.kind().is_scalar() => top.set_value(value),
            Some(top) => structural(format!("{} cannot hold a scalar value", top.kind())),
            None => structural("scalar value with no open node"),
        }
    }

    fn end_node(&mut self) -> TreeResult<()> {
        self.schema_hint = None;
        let builder = match self.stack.pop() {
            Some(builder) => builder,
            None => return structural("end_node with no open node"),
        };
        trace!("pop {} at depth {}", builder.kind(), self.stack.len());

        let result = builder.build().and_then(|node| match self.stack.last_mut() {
            Some(parent) => parent.add_child(node),
            None => self.deliver(node),
        });
        self.settle();
        result
    }

    fn next_schema_node(&mut self, schema: &DataSchemaNode) {
        self.schema_hint = Some(schema.clone());
    }
}

/// An engine owning its result, which can run any number of sessions.
///
/// Take the result with [`take_result`](Self::take_result) and call
/// [`reset`](Self::reset) between sessions.
#[derive(Debug)]
pub struct ReusableNodeWriter {
    inner: ImmutableNodeWriter<'static>,
}

impl Default for ReusableNodeWriter {
    fn default() -> Self {
        ReusableNodeWriter::new()
    }
}

impl ReusableNodeWriter {
    /// Create an idle writer.
    pub fn new() -> ReusableNodeWriter {
        ReusableNodeWriter {
            inner: ImmutableNodeWriter::with_target(Target::Owned(ResultSink::new())),
        }
    }

    /// Where the current session is.
    pub fn state(&self) -> WriterState {
        self.inner.state
    }

    /// The result of the current session, if one has been delivered.
    pub fn result(&self) -> Option<&NormalizedNode> {
        match &self.inner.target {
            Target::Owned(sink) => sink.get(),
            _ => None,
        }
    }

    /// Remove and return the result of the current session.
    pub fn take_result(&mut self) -> Option<NormalizedNode> {
        match &mut self.inner.target {
            Target::Owned(sink) => sink.take(),
            _ => None,
        }
    }

    /// Clear the result and prepare for a new session.
    ///
    /// Fails while a node is open.
    pub fn reset(&mut self) -> TreeResult<()> {
        if !self.inner.stack.is_empty() {
            return structural("reset while nodes are still open");
        }
        self.take_result();
        self.inner.schema_hint = None;
        self.inner.delivered = false;
        self.inner.state = WriterState::Idle;
        Ok(())
    }
}

impl NodeStreamWriter for ReusableNodeWriter {
    fn start_node(
        &mut self,
        kind: NodeKind,
        identifier: PathArgument,
        size_hint: Option<usize>,
    ) -> TreeResult<()> {
        self.inner.start_node(kind, identifier, size_hint)
    }

    fn scalar_value(&mut self, value: Value) -> TreeResult<()> {
        self.inner.scalar_value(value)
    }

    fn end_node(&mut self) -> TreeResult<()> {
        self.inner.end_node()
    }

    fn next_schema_node(&mut self, schema: &DataSchemaNode) {
        self.inner.next_schema_node(schema)
    }
}

#[cfg(test)]
use crate::util::ErrorMatch;

#[test]
fn test_leaf_under_leaf() {
    let q = QName::new("urn:example:stream", "a");
    let sink = ResultSink::new();
    let mut writer = ImmutableNodeWriter::new(&sink);
    writer.start_leaf(q.clone()).unwrap();
    writer.start_leaf(q.with_local("b")).err_structural();
    writer.start_map_entry(q, Predicates::new(), None).err_structural();
}

#[test]
fn test_scalar_value_rules() {
    let q = QName::new("urn:example:stream", "a");
    let sink = ResultSink::new();
    let mut writer = ImmutableNodeWriter::new(&sink);
    writer.scalar_value(Value::from(1u8)).err_structural();
    writer.start_container(q, None).unwrap();
    writer.scalar_value(Value::from(1u8)).err_structural();
}

#[test]
fn test_state_transitions() {
    let q = QName::new("urn:example:stream", "a");
    let sink = ResultSink::new();
    let mut writer = ImmutableNodeWriter::new(&sink);
    assert_eq!(writer.state(), WriterState::Idle);
    writer.start_container(q, None).unwrap();
    assert_eq!(writer.state(), WriterState::Building);
    assert_eq!(writer.depth(), 1);
    writer.end_node().unwrap();
    assert_eq!(writer.state(), WriterState::Done);
    assert!(sink.is_set());
}
