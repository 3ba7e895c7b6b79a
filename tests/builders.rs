mod common;

use common::{aug_q, baz, child_of, q, schema_of, top};
use yang_normalized::builder::{leaf_node, leaf_set_entry, map_entry};
use yang_normalized::context::DataNodeContainer;
use yang_normalized::node::NodeKind;
use yang_normalized::path::PathArgument;
use yang_normalized::util::{ErrorMatch, TreeError};
use yang_normalized::value::Value;
use yang_normalized::NodeBuilder;

#[test]
fn schema_aware_container() {
    let ctx = baz();
    let top = top(&ctx);

    let node = NodeBuilder::container_for(&top)
        .with_child(leaf_node(q("name"), "first"))
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(node.identifier(), &PathArgument::Node(q("top")));

    let mut b = NodeBuilder::container_for(&top);
    b.add_child(leaf_node(q("nope"), 1u8)).err_unknown_child();
    // A case child has to go through its choice.
    b.add_child(leaf_node(q("port"), 80u16)).err_unknown_child();
    // Declared as a list, offered as a leaf.
    b.add_child(leaf_node(q("item"), 1u8)).err_mismatch();
    // Declared as a string.
    b.add_child(leaf_node(q("name"), 7u8)).err_mismatch();
    // The schema fixes the identity.
    b.set_identifier(PathArgument::Node(q("other")))
        .err_structural();
}

#[test]
fn choice_single_case() {
    let ctx = baz();
    let top = top(&ctx);
    let transport = child_of(top.as_ref(), &q("transport"));
    let transport = transport.as_choice().unwrap();

    let mut b = NodeBuilder::choice_for(transport);
    assert!(b.validator().unwrap().selected_case().is_none());
    b.add_child(leaf_node(q("port"), 8080u16)).unwrap();
    assert_eq!(
        b.validator().unwrap().selected_case().unwrap().qname(),
        &q("tcp")
    );
    b.add_child(leaf_node(q("nodelay"), true)).unwrap();
    b.add_child(leaf_node(q("dgram"), 53u16)).err_mismatch();
    b.add_child(leaf_node(q("name"), "x")).err_unknown_child();

    let choice = b.build().unwrap();
    assert_eq!(choice.kind(), NodeKind::Choice);
    assert_eq!(choice.len(), 2);

    // The built choice fits in its parent.
    NodeBuilder::container_for(&top)
        .with_child(choice)
        .unwrap()
        .build()
        .unwrap();
}

#[test]
fn no_nested_augmentation() {
    let ctx = baz();
    let top = top(&ctx);
    let aug = top.augmentation_for(&aug_q("extra")).cloned().unwrap();

    let inner = NodeBuilder::augmentation_for(&aug)
        .with_child(leaf_node(aug_q("extra"), true))
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(inner.identifier(), &aug.identifier());

    let mut b = NodeBuilder::augmentation_for(&aug);
    b.add_child(inner.clone()).err_structural();
    b.add_child(leaf_node(q("name"), "x")).err_unknown_child();

    // Plain builders enforce the same nesting rule.
    let mut plain = NodeBuilder::new(NodeKind::Augmentation)
        .with_identifier(aug.identifier())
        .unwrap();
    plain.add_child(inner.clone()).err_structural();

    // The augmentation node itself is a legal child of its target.
    let node = NodeBuilder::container_for(&top)
        .with_child(inner)
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(node.len(), 1);
}

#[test]
fn map_entry_key_consistency() {
    let ctx = baz();
    let top = top(&ctx);
    let item = child_of(top.as_ref(), &q("item"));
    let item = item.as_list().unwrap();

    let entry = NodeBuilder::map_entry_for(item)
        .with_child(leaf_node(q("label"), "five"))
        .unwrap()
        .with_child(leaf_node(q("id"), 5u8))
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(
        entry.identifier(),
        &PathArgument::with_key(q("item"), q("id"), 5u8)
    );

    // No key leaf, no identity.
    NodeBuilder::map_entry_for(item)
        .with_child(leaf_node(q("label"), "none"))
        .unwrap()
        .build()
        .err_argument();

    // Key leaves and predicates disagree.
    NodeBuilder::new(NodeKind::MapEntry)
        .with_identifier(PathArgument::with_key(q("item"), q("id"), 5u8))
        .unwrap()
        .with_child(leaf_node(q("id"), 6u8))
        .unwrap()
        .build()
        .err_mismatch();

    // Values are checked against the declared type.
    NodeBuilder::map_entry_for(item)
        .with_child(leaf_node(q("weight"), "heavy"))
        .err_mismatch();
    NodeBuilder::map_entry_for(item)
        .with_child(leaf_node(q("id"), 300u16))
        .err_mismatch();

    let map = NodeBuilder::map_for(item)
        .with_child(entry)
        .unwrap()
        .with_child(map_entry(q("item"), q("id"), 6u8))
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(map.kind(), NodeKind::Map);
    assert_eq!(map.len(), 2);

    NodeBuilder::map_for(item)
        .with_child(map_entry(q("other"), q("id"), 1u8))
        .err_mismatch();
}

#[test]
fn schema_aware_leaf() {
    let ctx = baz();
    let top = top(&ctx);
    let name = child_of(top.as_ref(), &q("name"));
    let name = name.as_leaf().unwrap();

    let leaf = NodeBuilder::leaf_for(name)
        .with_value("router")
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(leaf.value(), Some(&Value::from("router")));

    match NodeBuilder::leaf_for(name).with_value(12u8) {
        Err(TreeError::Mismatch(m)) => assert_eq!(m.expected(), "string"),
        other => panic!("expected mismatch, got {:?}", other),
    }
}

#[test]
fn for_schema_dispatch() {
    let ctx = baz();
    let top = top(&ctx);

    let kinds: Vec<_> = ["name", "item", "tag", "transport", "order", "log"]
        .iter()
        .map(|local| NodeBuilder::for_schema(&child_of(top.as_ref(), &q(local))).kind())
        .collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::Leaf,
            NodeKind::Map,
            NodeKind::LeafSet,
            NodeKind::Choice,
            NodeKind::Container,
            NodeKind::UnkeyedList,
        ]
    );
    assert_eq!(
        NodeBuilder::for_schema(&schema_of(&ctx, "A")).kind(),
        NodeKind::Container
    );
}

#[test]
fn unkeyed_list() {
    let ctx = baz();
    let top = top(&ctx);
    let log = child_of(top.as_ref(), &q("log"));
    let log = log.as_list().unwrap();

    let line = |text: &str| {
        NodeBuilder::unkeyed_list_entry_for(log)
            .with_child(leaf_node(q("line"), text))
            .unwrap()
            .build()
            .unwrap()
    };
    let list = NodeBuilder::unkeyed_list_for(log)
        .with_child(line("one"))
        .unwrap()
        .with_child(line("two"))
        .unwrap()
        .with_child(line("one"))
        .unwrap()
        .build()
        .unwrap();
    // Entries share an identity and are all kept.
    assert_eq!(list.len(), 3);
    assert_eq!(list.kind(), NodeKind::UnkeyedList);
}

#[test]
fn leaf_set_interning() {
    let ctx = baz();
    let top = top(&ctx);
    let flag = child_of(top.as_ref(), &q("flag"));
    let flag = flag.as_leaf_list().unwrap();
    assert!(flag.interner().is_some());

    let build = || {
        NodeBuilder::leaf_set_for(flag)
            .with_child(leaf_set_entry(q("flag"), "up"))
            .unwrap()
            .build()
            .unwrap()
    };
    let a = build();
    let b = build();
    assert_eq!(a, b);
    let entry_a = a.children().next().unwrap();
    let entry_b = b.children().next().unwrap();
    assert!(entry_a.ptr_eq(entry_b));
    assert_eq!(flag.interner().unwrap().len(), 1);

    NodeBuilder::leaf_set_for(flag)
        .with_child(leaf_set_entry(q("flag"), "sideways"))
        .err_mismatch();

    // Leaf-lists of strings aren't interned unless asked to be.
    let tag = child_of(top.as_ref(), &q("tag"));
    let tag = tag.as_leaf_list().unwrap();
    assert!(tag.interner().is_none());
    let build = || {
        NodeBuilder::leaf_set_for(tag)
            .with_child(leaf_set_entry(q("tag"), "blue"))
            .unwrap()
            .build()
            .unwrap()
    };
    let (a, b) = (build(), build());
    assert!(!a.children().next().unwrap().ptr_eq(b.children().next().unwrap()));
}

#[test]
fn schema_aware_leaf_set_entry() {
    let ctx = baz();
    let top = top(&ctx);
    let tag = child_of(top.as_ref(), &q("tag"));
    let tag = tag.as_leaf_list().unwrap();

    let entry = NodeBuilder::leaf_set_entry_for(tag)
        .with_value("green")
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(entry.identifier(), &PathArgument::with_value(q("tag"), "green"));

    NodeBuilder::leaf_set_entry_for(tag).with_value(true).err_mismatch();
}
