//! This module declares the scalar Value enum carried by leaves.

use std::fmt;
use std::hash::{Hash, Hasher};

use float_ord::FloatOrd;

use crate::path::QName;

/// `Value` represents every scalar a leaf, leaf-list entry or opaque node
/// can hold.
///
/// The schema's declared type decides which variants are acceptable for a
/// given leaf; see [`ScalarType`](crate::types::ScalarType).
#[derive(Clone, Eq, Ord, PartialEq, PartialOrd)]
#[allow(missing_docs)]
pub enum Value {
    /// The value of a leaf of type `empty`.
    Empty,
    Bool(bool),
    Integer(i128),
    /// A `decimal64` value.
    Float(FloatOrd<f64>),
    /// A `binary` value.
    Bytes(Vec<u8>),
    /// A `string` or `enumeration` value, or an opaque text payload.
    Text(String),
    /// An `identityref` value.
    Identity(QName),
}

// FloatOrd doesn't implement Debug, so we have to do all the work by hand.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => write!(f, "Empty"),
            Value::Bool(x) => x.fmt(f),
            Value::Integer(x) => x.fmt(f),
            Value::Float(x) => x.0.fmt(f),
            Value::Bytes(x) => x.fmt(f),
            Value::Text(x) => x.fmt(f),
            Value::Identity(x) => write!(f, "Identity({})", x),
        }
    }
}

// Floats hash by bit pattern, which agrees with FloatOrd's total order.
impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Empty => (),
            Value::Bool(x) => x.hash(state),
            Value::Integer(x) => x.hash(state),
            Value::Float(x) => x.0.to_bits().hash(state),
            Value::Bytes(x) => x.hash(state),
            Value::Text(x) => x.hash(state),
            Value::Identity(x) => x.hash(state),
        }
    }
}

/// Values print in their canonical lexical form; binary is base64.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Bool(x) => write!(f, "{}", x),
            Value::Integer(x) => write!(f, "{}", x),
            Value::Float(x) => write!(f, "{}", x.0),
            Value::Bytes(x) => write!(f, "{}", base64::encode(x)),
            Value::Text(x) => write!(f, "{}", x),
            Value::Identity(x) => write!(f, "{}", x),
        }
    }
}

// Only exists so implementers don't need to use/see float_ord::FloatOrd
impl Value {
    /// Create a `decimal64` value.
    pub fn from_float<F: Into<f64>>(f: F) -> Value {
        Value::Float(FloatOrd(f.into()))
    }

    /// The name of this value's variant, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Empty => "empty",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "decimal64",
            Value::Bytes(_) => "binary",
            Value::Text(_) => "string",
            Value::Identity(_) => "identityref",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Bool(b)
    }
}

macro_rules! from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(i: $t) -> Value {
                    Value::Integer(i.into())
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, u8, u16, u32, u64);

impl From<f64> for Value {
    fn from(f: f64) -> Value {
        Value::from_float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::Text(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Value {
        Value::Bytes(b)
    }
}

impl From<QName> for Value {
    fn from(q: QName) -> Value {
        Value::Identity(q)
    }
}

#[test]
fn test_value_display() {
    assert_eq!(Value::from(42u8).to_string(), "42");
    assert_eq!(Value::from(-7i64).to_string(), "-7");
    assert_eq!(Value::from("abc").to_string(), "abc");
    assert_eq!(Value::from(vec![1u8, 2, 3]).to_string(), "AQID");
    assert_eq!(Value::Empty.to_string(), "");
    assert_eq!(format!("{:?}", Value::from(1.5)), "1.5");
}

#[test]
fn test_value_hash_agrees_with_eq() {
    use std::collections::HashSet;

    let mut set = HashSet::new();
    set.insert(Value::from(1.5));
    set.insert(Value::from(1.5));
    set.insert(Value::from(1u8));
    set.insert(Value::Integer(1));
    assert_eq!(set.len(), 2);
}
