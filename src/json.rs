//! This module converts JSON scalars into leaf values.
//!
//! Only scalars are converted: building trees out of JSON objects is the
//! job of a codec sitting on top of the streaming interface.
//!
//! # Examples
//!
//! ```
//! use yang_normalized::json::value_from_json;
//! use yang_normalized::types::ScalarType;
//! use yang_normalized::value::Value;
//!
//! // 64-bit integers are encoded as strings.
//! let json = serde_json::json!("18446744073709551615");
//! let value = value_from_json(&json, &ScalarType::uint64()).unwrap();
//! assert_eq!(value, Value::from(u64::MAX));
//! ```
//!

#![cfg(feature = "serde_json")]

use crate::types::ScalarType;
use crate::util::{argument, mismatch, TreeError, TreeResult};
use crate::value::Value;
use serde_json::Value as JSON_Value;
use std::convert::TryFrom;

// Convert JSON scalars to the local `Value` type, without type information.

impl TryFrom<&JSON_Value> for Value {
    type Error = TreeError;

    fn try_from(value: &JSON_Value) -> Result<Self, Self::Error> {
        let result = match value {
            JSON_Value::Null => Value::Empty,
            JSON_Value::Bool(b) => Value::Bool(*b),
            JSON_Value::Number(num) => {
                if let Some(u) = num.as_u64() {
                    Value::Integer(u as i128)
                } else if let Some(i) = num.as_i64() {
                    Value::Integer(i as i128)
                } else if let Some(f) = num.as_f64() {
                    Value::from_float(f)
                } else {
                    return Err(TreeError::Argument(
                        "JSON Value::Number conversion failure".into(),
                    ));
                }
            }
            JSON_Value::String(t) => Value::Text(t.clone()),
            // An `empty` leaf is encoded as `[null]`.
            JSON_Value::Array(a) if a.len() == 1 && a[0].is_null() => Value::Empty,
            JSON_Value::Array(_) | JSON_Value::Object(_) => {
                return Err(mismatch("JSON scalar", json_type_name(value)));
            }
        };
        Ok(result)
    }
}

// A variant that consumes the JSON Value.
impl TryFrom<JSON_Value> for Value {
    type Error = TreeError;

    fn try_from(value: JSON_Value) -> Result<Self, Self::Error> {
        Value::try_from(&value)
    }
}

fn json_type_name(value: &JSON_Value) -> &'static str {
    match value {
        JSON_Value::Null => "null",
        JSON_Value::Bool(_) => "boolean",
        JSON_Value::Number(_) => "number",
        JSON_Value::String(_) => "string",
        JSON_Value::Array(_) => "array",
        JSON_Value::Object(_) => "object",
    }
}

/// Convert a JSON scalar into a value of the declared type.
///
/// This follows the JSON encoding of YANG data: 64-bit integers and
/// `decimal64` may arrive as strings, `binary` is base64 text, identities
/// are `module:name` text and `empty` is `[null]`. The result is checked
/// against the type.
///
/// Identities are matched by local name against the identities the type
/// lists. An `identityref` listing none can't be decoded, because JSON text
/// names a module and not a namespace.
pub fn value_from_json(json: &JSON_Value, ty: &ScalarType) -> TreeResult<Value> {
    let value = match (ty, json) {
        (ScalarType::Integer(_), JSON_Value::String(s)) => s
            .parse::<i128>()
            .map(Value::Integer)
            .map_err(|_| mismatch(ty.to_string(), s.as_str()))?,
        (ScalarType::Decimal64 { .. }, JSON_Value::String(s)) => s
            .parse::<f64>()
            .map(Value::from_float)
            .map_err(|_| mismatch(ty.to_string(), s.as_str()))?,
        (ScalarType::Decimal64 { .. }, JSON_Value::Number(n)) => match n.as_f64() {
            Some(f) => Value::from_float(f),
            None => return Err(mismatch(ty.to_string(), n.to_string())),
        },
        (ScalarType::Binary, JSON_Value::String(s)) => base64::decode(s)
            .map(Value::Bytes)
            .map_err(|e| mismatch("base64 text", e.to_string()))?,
        (ScalarType::IdentityRef(ids), JSON_Value::String(s)) if ids.is_empty() => {
            return argument(format!("no declared identities to resolve {}", s));
        }
        (ScalarType::IdentityRef(ids), JSON_Value::String(s)) => {
            let local = s.rsplit(':').next().unwrap_or(s);
            match ids.iter().find(|id| id.local_name() == local) {
                Some(id) => Value::Identity(id.clone()),
                None => return Err(mismatch(ty.to_string(), s.as_str())),
            }
        }
        (ScalarType::Union(members), _) => {
            return members
                .iter()
                .find_map(|m| value_from_json(json, m).ok())
                .ok_or_else(|| mismatch(ty.to_string(), json.to_string()));
        }
        _ => Value::try_from(json)?,
    };
    ty.check(&value)?;
    Ok(value)
}

#[test]
fn test_json_number_behavior() {
    // Ensures that our JSON decoder tracks number types precisely, and
    // doesn't, say, allow floating-point values to become integers.
    // serde_json does sometimes permit as_f64 to work on integers, which is
    // why try_from has to test u64, then i64, then f64.

    let json_value: JSON_Value = serde_json::from_str("1").unwrap();
    assert!(json_value.as_u64().is_some());
    assert_eq!(Value::try_from(&json_value).unwrap(), Value::Integer(1));

    let json_value: JSON_Value = serde_json::from_str("-1").unwrap();
    assert!(json_value.as_u64().is_none());
    assert!(json_value.as_i64().is_some());

    let json_value: JSON_Value = serde_json::from_str("1.0").unwrap();
    assert!(json_value.as_u64().is_none());
    assert!(json_value.as_i64().is_none());
    assert!(json_value.as_f64().is_some());
    assert_eq!(Value::try_from(json_value).unwrap(), Value::from(1.0));
}
