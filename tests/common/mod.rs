// Shared fixtures: a small schema modelled on the `baz` test module.
#![allow(dead_code)]

use std::sync::Arc;

use yang_normalized::context::{DataNodeContainer, SchemaContext};
use yang_normalized::path::QName;
use yang_normalized::schema::{
    AugmentationSchema, CaseSchema, ChoiceSchema, ContainerSchema, DataSchemaNode,
    LeafListSchema, LeafSchema, ListSchema,
};
use yang_normalized::types::ScalarType;

pub const BAZ: &str = "urn:example:baz";
pub const BAZ_AUG: &str = "urn:example:baz-aug";

pub fn q(local: &str) -> QName {
    QName::with_revision(BAZ, "2021-03-01", local)
}

pub fn aug_q(local: &str) -> QName {
    QName::new(BAZ_AUG, local)
}

fn leaf(local: &str, ty: ScalarType) -> LeafSchema {
    LeafSchema::new(q(local), ty)
}

// top
//   +-- name       string
//   +-- item*      [id]
//   |   +-- id     uint8
//   |   +-- label  string
//   |   +-- weight uint32
//   +-- tag*       string
//   +-- flag*      enumeration
//   +-- (transport)
//   |   +-- :(tcp) port uint16, nodelay boolean
//   |   +-- :(udp) dgram uint16
//   +-- order      x, y, z
//   +-- log*       (no keys) line
//   +-- aug:extra  boolean        (augment)
//   +-- aug:more   note           (augment)
// A
//   +-- B          int32
fn top_schema() -> ContainerSchema {
    let item = ListSchema::new(q("item"), vec![q("id")])
        .with_child(leaf("id", ScalarType::uint8()))
        .with_child(leaf("label", ScalarType::String))
        .with_child(leaf("weight", ScalarType::uint32()));

    let transport = ChoiceSchema::new(q("transport"))
        .with_case(
            CaseSchema::new(q("tcp"))
                .with_child(leaf("port", ScalarType::uint16()))
                .with_child(leaf("nodelay", ScalarType::Boolean)),
        )
        .with_case(CaseSchema::new(q("udp")).with_child(leaf("dgram", ScalarType::uint16())));

    let order = ContainerSchema::new(q("order"))
        .with_child(leaf("x", ScalarType::String))
        .with_child(leaf("y", ScalarType::String))
        .with_child(leaf("z", ScalarType::String));

    let log = ListSchema::new(q("log"), vec![]).with_child(leaf("line", ScalarType::String));

    let extras = AugmentationSchema::new()
        .with_child(LeafSchema::new(aug_q("extra"), ScalarType::Boolean))
        .with_child(
            ContainerSchema::new(aug_q("more"))
                .with_child(LeafSchema::new(aug_q("note"), ScalarType::String)),
        );

    ContainerSchema::new(q("top"))
        .with_child(leaf("name", ScalarType::String))
        .with_child(item)
        .with_child(LeafListSchema::new(q("tag"), ScalarType::String))
        .with_child(LeafListSchema::new(
            q("flag"),
            ScalarType::enumeration(vec!["up", "down"]),
        ))
        .with_child(transport)
        .with_child(order)
        .with_child(log)
        .augment(extras)
}

pub fn baz() -> SchemaContext {
    let a = ContainerSchema::new(q("A")).with_child(leaf("B", ScalarType::int32()));
    SchemaContext::new(vec![top_schema(), a])
}

pub fn baz_arc() -> Arc<SchemaContext> {
    Arc::new(baz())
}

pub fn schema_of(ctx: &SchemaContext, local: &str) -> DataSchemaNode {
    ctx.data_child(&q(local)).cloned().unwrap()
}

pub fn top(ctx: &SchemaContext) -> Arc<ContainerSchema> {
    schema_of(ctx, "top").as_container().cloned().unwrap()
}

pub fn child_of(container: &dyn DataNodeContainer, name: &QName) -> DataSchemaNode {
    container.data_child(name).cloned().unwrap()
}
