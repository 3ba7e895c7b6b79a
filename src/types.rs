//! This module describes the declared types of leaves and leaf-lists.
//!
//! Only as much of the YANG type system is modelled as is needed to decide
//! whether a [`Value`] is acceptable for a leaf: the built-in base types, an
//! integer range restriction and unions.

use std::fmt;

use crate::path::QName;
use crate::util::{mismatch, TreeResult};
use crate::value::Value;

/// The declared type of a leaf or leaf-list.
#[derive(Clone, Debug, PartialEq)]
pub enum ScalarType {
    /// `empty`: the leaf is present or not, and carries no data.
    Empty,
    /// `boolean`
    Boolean,
    /// One of the eight built-in integer types, optionally range-restricted.
    Integer(IntegerType),
    /// `decimal64` with the given number of fraction digits.
    Decimal64 {
        #[allow(missing_docs)]
        fraction_digits: u8,
    },
    /// `string`
    String,
    /// `binary`
    Binary,
    /// `enumeration` with its declared names.
    Enumeration(Vec<String>),
    /// `identityref`; the identities a value may name.
    ///
    /// An empty list accepts any identity value, but such a type can't
    /// decode identities from text.
    IdentityRef(Vec<QName>),
    /// `union`: the first member type that accepts a value wins.
    Union(Vec<ScalarType>),
    /// No type information; every value is accepted.
    Any,
}

/// An integer type and the range of values it permits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntegerType {
    name: &'static str,
    min: i128,
    max: i128,
}

macro_rules! integer_types {
    ($($fn_name:ident => $t:ty),*) => {
        $(
            #[allow(missing_docs)]
            pub fn $fn_name() -> ScalarType {
                ScalarType::Integer(IntegerType {
                    name: stringify!($fn_name),
                    min: <$t>::MIN as i128,
                    max: <$t>::MAX as i128,
                })
            }
        )*
    };
}

impl ScalarType {
    integer_types!(
        int8 => i8, int16 => i16, int32 => i32, int64 => i64,
        uint8 => u8, uint16 => u16, uint32 => u32, uint64 => u64
    );

    /// Shortcut for an enumeration type.
    pub fn enumeration<I, S>(names: I) -> ScalarType
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScalarType::Enumeration(names.into_iter().map(Into::into).collect())
    }

    /// Restrict an integer type to `min..=max`.
    ///
    /// The restriction can only narrow the base type's range. Other types
    /// are returned unchanged.
    pub fn range(self, min: i128, max: i128) -> ScalarType {
        match self {
            ScalarType::Integer(t) => ScalarType::Integer(IntegerType {
                name: t.name,
                min: min.max(t.min),
                max: max.min(t.max),
            }),
            other => other,
        }
    }

    /// Check a value against this type.
    ///
    /// Returns a [`Mismatch`](crate::util::TreeError::Mismatch) error naming
    /// the type if the value isn't acceptable.
    pub fn check(&self, value: &Value) -> TreeResult<()> {
        if self.accepts(value) {
            Ok(())
        } else {
            Err(mismatch(self.to_string(), format!("{:?}", value)))
        }
    }

    /// `true` if this type accepts the value.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ScalarType::Any, _) => true,
            (ScalarType::Empty, Value::Empty) => true,
            (ScalarType::Boolean, Value::Bool(_)) => true,
            (ScalarType::Integer(t), Value::Integer(i)) => t.min <= *i && *i <= t.max,
            (ScalarType::Decimal64 { fraction_digits }, Value::Float(f)) => {
                fits_fraction_digits(f.0, *fraction_digits)
            }
            (ScalarType::String, Value::Text(_)) => true,
            (ScalarType::Binary, Value::Bytes(_)) => true,
            (ScalarType::Enumeration(names), Value::Text(s)) => names.iter().any(|n| n == s),
            (ScalarType::IdentityRef(ids), Value::Identity(q)) => {
                ids.is_empty() || ids.contains(q)
            }
            (ScalarType::Union(members), v) => members.iter().any(|m| m.accepts(v)),
            _ => false,
        }
    }

    /// Whether leaf-lists of this type intern their entries unless told
    /// otherwise.
    ///
    /// These are the types with a small value space, where a large leaf-list
    /// is bound to repeat itself.
    pub fn interned_by_default(&self) -> bool {
        matches!(
            self,
            ScalarType::Boolean | ScalarType::Enumeration(_) | ScalarType::IdentityRef(_)
        )
    }
}

// decimal64 values are stored as floats; reject anything with more
// precision than the type declares.
fn fits_fraction_digits(f: f64, fraction_digits: u8) -> bool {
    if !f.is_finite() || fraction_digits == 0 || fraction_digits > 18 {
        return false;
    }
    let scaled = f * 10f64.powi(fraction_digits as i32);
    // Past 2^53 a float can't tell neighbouring scaled values apart.
    if scaled.abs() > 2f64.powi(53) {
        return false;
    }
    let tolerance = (scaled.abs() * 4.0 * f64::EPSILON).max(1e-9);
    (scaled - scaled.round()).abs() <= tolerance
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarType::Empty => write!(f, "empty"),
            ScalarType::Boolean => write!(f, "boolean"),
            ScalarType::Integer(t) => write!(f, "{} {}..{}", t.name, t.min, t.max),
            ScalarType::Decimal64 { fraction_digits } => {
                write!(f, "decimal64 fraction-digits {}", fraction_digits)
            }
            ScalarType::String => write!(f, "string"),
            ScalarType::Binary => write!(f, "binary"),
            ScalarType::Enumeration(names) => write!(f, "enumeration {:?}", names),
            ScalarType::IdentityRef(_) => write!(f, "identityref"),
            ScalarType::Union(members) => {
                write!(f, "union(")?;
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", m)?;
                }
                write!(f, ")")
            }
            ScalarType::Any => write!(f, "any"),
        }
    }
}

#[test]
fn test_integer_ranges() {
    use crate::util::ErrorMatch;

    let t = ScalarType::uint8();
    t.check(&Value::from(255u8)).unwrap();
    t.check(&Value::Integer(256)).err_mismatch();
    t.check(&Value::Integer(-1)).err_mismatch();
    t.check(&Value::from("1")).err_mismatch();

    let t = ScalarType::int32().range(-10, 10);
    assert!(t.accepts(&Value::Integer(-10)));
    assert!(!t.accepts(&Value::Integer(11)));

    // A range can't widen the base type.
    let t = ScalarType::int8().range(-1000, 1000);
    assert!(!t.accepts(&Value::Integer(128)));
}

#[test]
fn test_other_types() {
    let t = ScalarType::Decimal64 { fraction_digits: 2 };
    assert!(t.accepts(&Value::from(1.25)));
    assert!(!t.accepts(&Value::from(1.255)));

    let t = ScalarType::enumeration(vec!["up", "down"]);
    assert!(t.accepts(&Value::from("up")));
    assert!(!t.accepts(&Value::from("sideways")));
    assert!(t.interned_by_default());

    let t = ScalarType::Union(vec![ScalarType::Boolean, ScalarType::uint16()]);
    assert!(t.accepts(&Value::from(true)));
    assert!(t.accepts(&Value::from(8080u16)));
    assert!(!t.accepts(&Value::from("x")));
    assert!(!t.interned_by_default());

    let base = QName::new("urn:example:if", "ethernet");
    let t = ScalarType::IdentityRef(vec![base.clone()]);
    assert!(t.accepts(&Value::from(base.clone())));
    assert!(!t.accepts(&Value::from(base.with_local("atm"))));

    assert!(ScalarType::Empty.accepts(&Value::Empty));
    assert!(ScalarType::Any.accepts(&Value::from(vec![0u8])));
}

#[test]
fn test_decimal_precision() {
    let t = ScalarType::Decimal64 { fraction_digits: 3 };
    assert!(t.accepts(&Value::from(1234567.891)));
    assert!(t.accepts(&Value::from(-0.001)));
    assert!(!t.accepts(&Value::from(0.1234)));

    // Too large to hold 18 fraction digits exactly.
    let t = ScalarType::Decimal64 { fraction_digits: 18 };
    assert!(!t.accepts(&Value::from(5.0)));
    assert!(t.accepts(&Value::from(0.000_5)));

    let t = ScalarType::Decimal64 { fraction_digits: 1 };
    assert!(!t.accepts(&Value::from(1e17)));
    assert!(t.accepts(&Value::from(123456789012.3)));
}
