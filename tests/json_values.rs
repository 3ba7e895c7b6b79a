#![cfg(feature = "serde_json")]

use serde::Serialize;
use std::convert::TryFrom;
use yang_normalized::json::value_from_json;
use yang_normalized::path::QName;
use yang_normalized::types::ScalarType;
use yang_normalized::util::ErrorMatch;
use yang_normalized::value::Value;

// The JSON encoding of a few interface leaves.
#[derive(Serialize)]
struct Interface {
    name: String,
    mtu: u16,
    enabled: bool,
    speed: String,
    key: String,
    kind: String,
    loopback: [(); 1],
}

fn interface() -> serde_json::Value {
    serde_json::to_value(Interface {
        name: "eth0".to_string(),
        mtu: 1500,
        enabled: true,
        speed: "10000000000".to_string(),
        key: "3q2+7w==".to_string(),
        kind: "iana-if-type:ethernetCsmacd".to_string(),
        loopback: [()],
    })
    .unwrap()
}

#[test]
fn json_scalars() {
    let json = interface();
    assert_eq!(
        value_from_json(&json["name"], &ScalarType::String).unwrap(),
        Value::from("eth0")
    );
    assert_eq!(
        value_from_json(&json["mtu"], &ScalarType::uint16()).unwrap(),
        Value::from(1500u16)
    );
    assert_eq!(
        value_from_json(&json["enabled"], &ScalarType::Boolean).unwrap(),
        Value::from(true)
    );
    // 64-bit integers are strings in JSON.
    assert_eq!(
        value_from_json(&json["speed"], &ScalarType::uint64()).unwrap(),
        Value::from(10_000_000_000u64)
    );
    assert_eq!(
        value_from_json(&json["key"], &ScalarType::Binary).unwrap(),
        Value::from(vec![0xdeu8, 0xad, 0xbe, 0xef])
    );
    // `empty` is `[null]`.
    assert_eq!(
        value_from_json(&json["loopback"], &ScalarType::Empty).unwrap(),
        Value::Empty
    );
}

#[test]
fn json_identities() {
    let json = interface();
    let ethernet = QName::new("urn:ietf:params:xml:ns:yang:iana-if-type", "ethernetCsmacd");
    let ty = ScalarType::IdentityRef(vec![ethernet.with_local("other"), ethernet.clone()]);
    assert_eq!(
        value_from_json(&json["kind"], &ty).unwrap(),
        Value::Identity(ethernet.clone())
    );
    let ty = ScalarType::IdentityRef(vec![ethernet.with_local("other")]);
    value_from_json(&json["kind"], &ty).err_mismatch();

    // Nothing to resolve the module prefix against.
    value_from_json(&json["kind"], &ScalarType::IdentityRef(vec![])).err_argument();
}

#[test]
fn json_type_errors() {
    let json = interface();
    value_from_json(&json["mtu"], &ScalarType::uint8()).err_mismatch();
    value_from_json(&json["name"], &ScalarType::uint16()).err_mismatch();
    value_from_json(&json["key"], &ScalarType::Boolean).err_mismatch();
    value_from_json(&json, &ScalarType::Any).err_mismatch();

    let union = ScalarType::Union(vec![ScalarType::Boolean, ScalarType::uint16()]);
    assert_eq!(
        value_from_json(&json["mtu"], &union).unwrap(),
        Value::from(1500u16)
    );
    value_from_json(&json["name"], &union).err_mismatch();
}

#[test]
fn json_decimal() {
    let ty = ScalarType::Decimal64 { fraction_digits: 2 };
    let json: serde_json::Value = serde_json::from_str(r#"["2.50", 2.5, "2.505"]"#).unwrap();
    assert_eq!(value_from_json(&json[0], &ty).unwrap(), Value::from(2.5));
    assert_eq!(value_from_json(&json[1], &ty).unwrap(), Value::from(2.5));
    value_from_json(&json[2], &ty).err_mismatch();
}

#[test]
fn untyped_conversion() {
    let json: serde_json::Value = serde_json::from_str(r#"[null, -3, "x", {"a": 1}]"#).unwrap();
    assert_eq!(Value::try_from(&json[0]).unwrap(), Value::Empty);
    assert_eq!(Value::try_from(&json[1]).unwrap(), Value::Integer(-3));
    assert_eq!(Value::try_from(&json[2]).unwrap(), Value::from("x"));
    Value::try_from(&json[3]).err_mismatch();
}
