use ntest::timeout;
use yang_normalized::builder::leaf_node;
use yang_normalized::node::NodeKind;
use yang_normalized::path::{PathArgument, QName};
use yang_normalized::{
    ImmutableNodeWriter, NodeBuilder, NodeStreamWriter, NormalizedNodeWriter, ResultSink,
};

const DEPTH: usize = 200;

#[test]
#[timeout(5000)] // 5 seconds
fn test_deep_nesting() {
    let q = QName::new("urn:example:deep", "c");

    let sink = ResultSink::new();
    let mut writer = ImmutableNodeWriter::new(&sink);
    for _ in 0..DEPTH {
        writer.start_container(q.clone(), None).unwrap();
    }
    assert_eq!(writer.depth(), DEPTH);
    writer.start_leaf(q.with_local("bottom")).unwrap();
    writer.scalar_value(1u8.into()).unwrap();
    writer.end_node().unwrap();
    for _ in 0..DEPTH {
        writer.end_node().unwrap();
    }
    let tree = sink.get().cloned().unwrap();

    // Walk it back out and rebuild it.
    let copy_sink = ResultSink::new();
    let mut engine = ImmutableNodeWriter::new(&copy_sink);
    NormalizedNodeWriter::new(&mut engine).write(&tree).unwrap();
    assert_eq!(copy_sink.get(), Some(&tree));
}

#[test]
#[timeout(5000)] // 5 seconds
fn test_deep_builders() {
    let q = QName::new("urn:example:deep", "c");
    let mut node = leaf_node(q.with_local("bottom"), "x");
    for _ in 0..DEPTH {
        node = NodeBuilder::new(NodeKind::Container)
            .with_identifier(PathArgument::Node(q.clone()))
            .unwrap()
            .with_child(node)
            .unwrap()
            .build()
            .unwrap();
    }
    let other = node.clone();
    assert_eq!(node, other);
    assert!(node.ptr_eq(&other));
}
