mod common;

use std::sync::Arc;
use std::thread;

use common::{aug_q, baz_arc, q};
use yang_normalized::builder::{container_node, leaf_node, map_entry};
use yang_normalized::context::SchemaContext;
use yang_normalized::node::NodeKind;
use yang_normalized::path::{InstanceIdentifier, PathArgument, Predicates};
use yang_normalized::util::ErrorMatch;
use yang_normalized::value::Value;
use yang_normalized::{InstanceIdExpander, NodeBuilder, NormalizedNode};

fn expander() -> InstanceIdExpander {
    InstanceIdExpander::new(baz_arc())
}

fn path(args: Vec<PathArgument>) -> InstanceIdentifier {
    InstanceIdentifier::from(args)
}

fn item(id: u8) -> PathArgument {
    PathArgument::with_key(q("item"), q("id"), id)
}

#[test]
fn mixin_transparency() {
    let exp = expander();
    let tree = exp
        .from_instance_id(&path(vec![q("top").into(), item(5)]), None)
        .unwrap();

    assert_eq!(tree.kind(), NodeKind::Container);
    assert_eq!(tree.len(), 1);
    let map = tree.child_by_name(&q("item")).unwrap();
    assert_eq!(map.kind(), NodeKind::Map);
    assert_eq!(map.len(), 1);
    let entry = map.child(&item(5)).unwrap();
    assert_eq!(entry, &map_entry(q("item"), q("id"), 5u8));

    // Naming the map in the path gives the same tree.
    let explicit = exp
        .from_instance_id(
            &path(vec![q("top").into(), q("item").into(), item(5)]),
            None,
        )
        .unwrap();
    assert_eq!(explicit, tree);
}

#[test]
fn minimal_leaf_expansion() {
    let exp = expander();
    let b = leaf_node(q("B"), 42i32);
    let tree = exp
        .from_instance_id(&path(vec![q("A").into()]), Some(&b))
        .unwrap();

    let expected = NodeBuilder::new(NodeKind::Container)
        .with_identifier(PathArgument::Node(q("A")))
        .unwrap()
        .with_child(leaf_node(q("B"), 42i32))
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(tree, expected);
}

#[test]
fn terminal_with_matching_identity() {
    let exp = expander();

    // A leaf path with the leaf itself as the terminal.
    let tree = exp
        .from_instance_id(
            &path(vec![q("top").into(), q("name").into()]),
            Some(&leaf_node(q("name"), "edge")),
        )
        .unwrap();
    assert_eq!(
        tree.child_by_name(&q("name")).unwrap().value(),
        Some(&Value::from("edge"))
    );

    // A list entry path with a fuller copy of the entry.
    let full = NodeBuilder::new(NodeKind::MapEntry)
        .with_identifier(item(5))
        .unwrap()
        .with_child(leaf_node(q("id"), 5u8))
        .unwrap()
        .with_child(leaf_node(q("label"), "five"))
        .unwrap()
        .build()
        .unwrap();
    let tree = exp
        .from_instance_id(&path(vec![q("top").into(), item(5)]), Some(&full))
        .unwrap();
    let entry = tree
        .child_by_name(&q("item"))
        .and_then(|map| map.child(&item(5)))
        .unwrap();
    assert_eq!(entry, &full);

    // Same identity, different kind.
    let wrong = NodeBuilder::new(NodeKind::Map)
        .with_identifier(PathArgument::Node(q("A")))
        .unwrap()
        .build()
        .unwrap();
    exp.from_instance_id(&path(vec![q("A").into()]), Some(&wrong))
        .err_mismatch();
}

#[test]
fn leaves_have_no_children() {
    let exp = expander();
    exp.from_instance_id(&path(vec![q("top").into(), q("name").into()]), None)
        .err_argument();
    exp.from_instance_id(
        &path(vec![q("top").into(), q("name").into(), q("x").into()]),
        Some(&leaf_node(q("x"), 1u8)),
    )
    .err_argument();
}

#[test]
fn choice_expansion() {
    let exp = expander();
    let tree = exp
        .from_instance_id(
            &path(vec![q("top").into(), q("port").into()]),
            Some(&leaf_node(q("port"), 22u16)),
        )
        .unwrap();

    let choice = tree.child_by_name(&q("transport")).unwrap();
    assert_eq!(choice.kind(), NodeKind::Choice);
    assert_eq!(
        choice.child_by_name(&q("port")).unwrap().value(),
        Some(&Value::from(22u16))
    );
}

#[test]
fn augmentation_expansion() {
    let exp = expander();
    let aug_id = PathArgument::augmentation(vec![aug_q("extra"), aug_q("more")]);

    let tree = exp
        .from_instance_id(
            &path(vec![q("top").into(), aug_q("extra").into()]),
            Some(&leaf_node(aug_q("extra"), true)),
        )
        .unwrap();
    let aug = tree.child(&aug_id).unwrap();
    assert_eq!(aug.kind(), NodeKind::Augmentation);
    assert_eq!(
        aug.child_by_name(&aug_q("extra")).unwrap().value(),
        Some(&Value::from(true))
    );

    // Naming the augmentation in the path gives the same tree.
    let explicit = exp
        .from_instance_id(
            &path(vec![q("top").into(), aug_id.clone(), aug_q("extra").into()]),
            Some(&leaf_node(aug_q("extra"), true)),
        )
        .unwrap();
    assert_eq!(explicit, tree);

    let tree = exp
        .from_instance_id(&path(vec![q("top").into(), aug_q("more").into()]), None)
        .unwrap();
    let more = tree
        .child(&aug_id)
        .and_then(|aug| aug.child_by_name(&aug_q("more")))
        .unwrap();
    assert_eq!(more, &container_node(aug_q("more")));
}

#[test]
fn leaf_set_entry_expansion() {
    let exp = expander();
    let tree = exp
        .from_instance_id(
            &path(vec![
                q("top").into(),
                PathArgument::with_value(q("tag"), "blue"),
            ]),
            None,
        )
        .unwrap();
    let tags = tree.child_by_name(&q("tag")).unwrap();
    assert_eq!(tags.kind(), NodeKind::LeafSet);
    let entry = tags.children().next().unwrap();
    assert_eq!(entry.value(), Some(&Value::from("blue")));
}

#[test]
fn key_predicates_are_reordered() {
    let exp = expander();
    let predicates: Predicates = vec![
        (q("label"), Value::from("five")),
        (q("id"), Value::from(5u8)),
    ]
    .into_iter()
    .collect();
    let tree = exp
        .from_instance_id(
            &path(vec![
                q("top").into(),
                PathArgument::with_predicates(q("item"), predicates),
            ]),
            None,
        )
        .unwrap();

    let entry = tree
        .child_by_name(&q("item"))
        .and_then(|map| map.children().next())
        .unwrap();
    let keys: Vec<_> = entry
        .identifier()
        .predicates()
        .unwrap()
        .keys()
        .cloned()
        .collect();
    assert_eq!(keys, vec![q("id"), q("label")]);
    assert_eq!(entry.len(), 2);
}

#[test]
fn unknown_segments() {
    let exp = expander();
    exp.from_instance_id(&path(vec![q("nope").into()]), None)
        .err_argument();
    exp.from_instance_id(&path(vec![q("top").into(), q("nope").into()]), None)
        .err_unknown_child();
    exp.from_instance_id(&path(vec![q("A").into(), q("port").into()]), None)
        .err_unknown_child();
}

#[test]
fn empty_path_is_the_root() {
    let exp = expander();
    let root = exp.from_instance_id(&InstanceIdentifier::root(), None).unwrap();
    assert_eq!(root.node_type(), Some(&SchemaContext::root_name()));
    assert!(root.is_empty());

    let top = container_node(q("top"));
    let root = exp
        .from_instance_id(&InstanceIdentifier::root(), Some(&top))
        .unwrap();
    assert_eq!(root.child_by_name(&q("top")), Some(&top));
}

#[test]
fn concurrent_expansion() {
    let exp = Arc::new(expander());

    let paths: Vec<(InstanceIdentifier, Option<NormalizedNode>)> = vec![
        (path(vec![q("top").into(), item(1)]), None),
        (
            path(vec![q("top").into(), q("port").into()]),
            Some(leaf_node(q("port"), 1u16)),
        ),
        (
            path(vec![q("top").into(), aug_q("extra").into()]),
            Some(leaf_node(aug_q("extra"), false)),
        ),
        (path(vec![q("A").into()]), Some(leaf_node(q("B"), 7i32))),
    ];
    let paths = Arc::new(paths);

    // Expected results, from a separate expander with a cold cache.
    let reference = expander();
    let expected: Vec<_> = paths
        .iter()
        .map(|(p, last)| reference.from_instance_id(p, last.as_ref()).unwrap())
        .collect();
    let expected = Arc::new(expected);

    let handles: Vec<_> = (0..8)
        .map(|offset| {
            let exp = exp.clone();
            let paths = paths.clone();
            let expected = expected.clone();
            thread::spawn(move || {
                for round in 0..50 {
                    let i = (offset + round) % paths.len();
                    let (p, last) = &paths[i];
                    let tree = exp.from_instance_id(p, last.as_ref()).unwrap();
                    assert_eq!(tree, expected[i]);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}
