mod common;

use common::{aug_q, baz, q};
use yang_normalized::builder::{leaf_node, leaf_set_entry, map_entry, map_node_builder};
use yang_normalized::context::SchemaContext;
use yang_normalized::node::NodeKind;
use yang_normalized::path::PathArgument;
use yang_normalized::util::{ErrorMatch, TreeResult};
use yang_normalized::value::Value;
use yang_normalized::{
    ImmutableNodeWriter, NodeBuilder, NodeStreamWriter, NormalizedNode, NormalizedNodeWriter,
    ResultSink, SchemaOrderedWriter,
};

// Records events as text, e.g. "start Leaf x", "value 1", "end".
#[derive(Default)]
struct Recorder {
    events: Vec<String>,
}

impl Recorder {
    fn started(&self, kind: NodeKind) -> Vec<String> {
        let prefix = format!("start {} ", kind);
        self.events
            .iter()
            .filter_map(|e| e.strip_prefix(&prefix))
            .map(String::from)
            .collect()
    }
}

impl NodeStreamWriter for Recorder {
    fn start_node(
        &mut self,
        kind: NodeKind,
        identifier: PathArgument,
        _size_hint: Option<usize>,
    ) -> TreeResult<()> {
        let name = identifier
            .node_type()
            .map(|q| q.local_name().to_string())
            .unwrap_or_else(|| "augmentation".to_string());
        self.events.push(format!("start {} {}", kind, name));
        Ok(())
    }

    fn scalar_value(&mut self, value: Value) -> TreeResult<()> {
        self.events.push(format!("value {}", value));
        Ok(())
    }

    fn end_node(&mut self) -> TreeResult<()> {
        self.events.push("end".to_string());
        Ok(())
    }
}

fn container(local: &str, children: Vec<NormalizedNode>) -> NormalizedNode {
    container_with(PathArgument::Node(q(local)), NodeKind::Container, children)
}

fn container_with(id: PathArgument, kind: NodeKind, children: Vec<NormalizedNode>) -> NormalizedNode {
    let mut b = NodeBuilder::new(kind).with_identifier(id).unwrap();
    for child in children {
        b.add_child(child).unwrap();
    }
    b.build().unwrap()
}

// An entry of `item` with its key leaf added last.
fn item(id: u8, label: &str) -> NormalizedNode {
    container_with(
        PathArgument::with_key(q("item"), q("id"), id),
        NodeKind::MapEntry,
        vec![leaf_node(q("label"), label), leaf_node(q("id"), id)],
    )
}

// A `top` holding one of everything, children in no particular order.
fn rich_top() -> NormalizedNode {
    let items = map_node_builder(q("item"))
        .with_child(item(2, "two"))
        .unwrap()
        .with_child(item(1, "one"))
        .unwrap()
        .build()
        .unwrap();
    let tags = container_with(
        PathArgument::Node(q("tag")),
        NodeKind::LeafSet,
        vec![leaf_set_entry(q("tag"), "red"), leaf_set_entry(q("tag"), "blue")],
    );
    let transport = container_with(
        PathArgument::Node(q("transport")),
        NodeKind::Choice,
        vec![leaf_node(q("nodelay"), true), leaf_node(q("port"), 8080u16)],
    );
    let log_line = |text: &str| {
        container_with(
            PathArgument::Node(q("log")),
            NodeKind::UnkeyedListEntry,
            vec![leaf_node(q("line"), text)],
        )
    };
    let log = container_with(
        PathArgument::Node(q("log")),
        NodeKind::UnkeyedList,
        vec![log_line("boot"), log_line("ready")],
    );
    let aug = container_with(
        PathArgument::augmentation(vec![aug_q("extra"), aug_q("more")]),
        NodeKind::Augmentation,
        vec![
            container_with(
                PathArgument::Node(aug_q("more")),
                NodeKind::Container,
                vec![leaf_node(aug_q("note"), "hi")],
            ),
            leaf_node(aug_q("extra"), false),
        ],
    );
    let order = container(
        "order",
        vec![
            leaf_node(q("z"), "3"),
            leaf_node(q("x"), "1"),
            leaf_node(q("y"), "2"),
        ],
    );

    container(
        "top",
        vec![aug, order, log, transport, tags, items, leaf_node(q("name"), "edge")],
    )
}

fn copy_in_schema_order(ctx: &SchemaContext, node: &NormalizedNode) -> TreeResult<NormalizedNode> {
    let sink = ResultSink::new();
    let mut engine = ImmutableNodeWriter::new(&sink);
    SchemaOrderedWriter::new(&mut engine, ctx).write(node)?;
    let copy = sink.get().cloned();
    Ok(copy.unwrap())
}

#[test]
fn schema_order_reemission() {
    let ctx = baz();
    let order = container(
        "order",
        vec![
            leaf_node(q("z"), "3"),
            leaf_node(q("x"), "1"),
            leaf_node(q("y"), "2"),
        ],
    );
    let top = container("top", vec![order]);

    let mut rec = Recorder::default();
    SchemaOrderedWriter::new(&mut rec, &ctx).write(&top).unwrap();
    assert_eq!(rec.started(NodeKind::Leaf), vec!["x", "y", "z"]);
    assert_eq!(
        rec.events,
        vec![
            "start Container top",
            "start Container order",
            "start Leaf x",
            "value 1",
            "end",
            "start Leaf y",
            "value 2",
            "end",
            "start Leaf z",
            "value 3",
            "end",
            "end",
            "end",
        ]
    );
}

#[test]
fn schema_order_round_trip() {
    let ctx = baz();
    let top = rich_top();
    let copy = copy_in_schema_order(&ctx, &top).unwrap();
    assert_eq!(copy, top);

    // Declaration order, with the augmentation after the top's own children.
    let order: Vec<_> = copy
        .children()
        .map(|c| {
            c.node_type()
                .map(|q| q.local_name().to_string())
                .unwrap_or_else(|| "augmentation".to_string())
        })
        .collect();
    assert_eq!(
        order,
        vec!["name", "item", "tag", "transport", "order", "log", "augmentation"]
    );
}

#[test]
fn whole_tree_from_the_root() {
    let ctx = baz();
    let root = container_with(
        PathArgument::Node(SchemaContext::root_name()),
        NodeKind::Container,
        vec![
            container("A", vec![leaf_node(q("B"), 42i32)]),
            rich_top(),
        ],
    );
    let copy = copy_in_schema_order(&ctx, &root).unwrap();
    assert_eq!(copy, root);
    assert_eq!(
        copy.children().next().and_then(|c| c.node_type()),
        Some(&q("top"))
    );
}

#[test]
fn augmentation_is_reopened() {
    let ctx = baz();
    let mut rec = Recorder::default();
    SchemaOrderedWriter::new(&mut rec, &ctx)
        .write(&rich_top())
        .unwrap();

    let augs = rec.started(NodeKind::Augmentation);
    assert_eq!(augs.len(), 1);
    // Augmentation children come in the augmentation's own order.
    let start = rec
        .events
        .iter()
        .position(|e| e == "start Augmentation augmentation")
        .unwrap();
    assert_eq!(rec.events[start + 1], "start Leaf extra");
    assert_eq!(rec.events[start + 4], "start Container more");
}

#[test]
fn empty_augmentation_round_trip() {
    let ctx = baz();
    let aug = container_with(
        PathArgument::augmentation(vec![aug_q("extra"), aug_q("more")]),
        NodeKind::Augmentation,
        vec![],
    );
    let top = container("top", vec![leaf_node(q("name"), "edge"), aug]);
    let copy = copy_in_schema_order(&ctx, &top).unwrap();
    assert_eq!(copy.len(), 2);
    assert_eq!(copy, top);

    // An empty augmentation the schema doesn't know.
    let stray = container_with(
        PathArgument::augmentation(vec![aug_q("nope")]),
        NodeKind::Augmentation,
        vec![],
    );
    let top = container("top", vec![stray]);
    let mut rec = Recorder::default();
    SchemaOrderedWriter::new(&mut rec, &ctx)
        .write(&top)
        .err_structural();
}

#[test]
fn key_leaves_first() {
    let ctx = baz();
    let top = container(
        "top",
        vec![map_node_builder(q("item"))
            .with_child(item(3, "three"))
            .unwrap()
            .build()
            .unwrap()],
    );

    let mut rec = Recorder::default();
    SchemaOrderedWriter::new(&mut rec, &ctx).write(&top).unwrap();
    assert_eq!(rec.started(NodeKind::Leaf), vec!["id", "label"]);

    let mut rec = Recorder::default();
    NormalizedNodeWriter::new(&mut rec).write(&top).unwrap();
    assert_eq!(rec.started(NodeKind::Leaf), vec!["id", "label"]);

    let mut rec = Recorder::default();
    NormalizedNodeWriter::new(&mut rec)
        .order_key_leaves(false)
        .write(&top)
        .unwrap();
    assert_eq!(rec.started(NodeKind::Leaf), vec!["label", "id"]);
}

#[test]
fn unknown_nodes_cannot_be_serialized() {
    let ctx = baz();
    let mut rec = Recorder::default();

    let top = container("top", vec![leaf_node(q("bogus"), 1u8)]);
    SchemaOrderedWriter::new(&mut rec, &ctx)
        .write(&top)
        .err_structural();

    let stray = container("stray", vec![]);
    SchemaOrderedWriter::new(&mut rec, &ctx)
        .write(&stray)
        .err_structural();

    // `item` is a list, not a container.
    let top = container("top", vec![container("item", vec![])]);
    SchemaOrderedWriter::new(&mut rec, &ctx)
        .write(&top)
        .err_structural();
}

#[test]
fn native_order_round_trip() {
    // The native walker needs no schema, so anything goes.
    let tree = container(
        "anything",
        vec![
            leaf_node(q("b"), 2u8),
            leaf_node(q("a"), 1u8),
            map_node_builder(q("l"))
                .with_child(map_entry(q("l"), q("k"), "x"))
                .unwrap()
                .build()
                .unwrap(),
        ],
    );

    let sink = ResultSink::new();
    let mut engine = ImmutableNodeWriter::new(&sink);
    let mut walker = NormalizedNodeWriter::new(&mut engine);
    walker.write(&tree).unwrap();
    walker.flush().unwrap();
    assert_eq!(sink.get(), Some(&tree));

    let mut rec = Recorder::default();
    NormalizedNodeWriter::new(&mut rec).write(&tree).unwrap();
    assert_eq!(rec.started(NodeKind::Leaf), vec!["b", "a", "k"]);
}
