//! Typed constants for filter predicates.

use std::cmp::Ordering;
use std::fmt::{self, Display};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A typed constant value.
///
/// Represents the constants that column predicates compare against.
/// Equality and hashing are structural: two values are equal only when they
/// are the same variant with identical fields. `Real` uses bit equality so
/// that `Value` can serve as a hash key, and `Decimal` values with different
/// scales are never structurally equal even when numerically equal — that
/// gap is what [`DataType::range_fuzzy`](crate::DataType::range_fuzzy)
/// exists to flag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum Value {
    /// SQL NULL.
    #[default]
    Null,
    /// Boolean value.
    Boolean(bool),
    /// 64-bit signed integer.
    BigInt(i64),
    /// 64-bit floating point (IEEE 754 double precision).
    Real(f64),
    /// Fixed-precision decimal (value in smallest units, scale).
    ///
    /// Example: `Decimal(12345, 2)` represents 123.45.
    Decimal(i128, u8),
    /// UTF-8 text string.
    Text(String),
    /// Raw bytes.
    Bytes(Bytes),
}

impl Value {
    /// Compares two values of the same type.
    ///
    /// Returns `None` for values of different types, and for `Decimal`
    /// values with different scales. `Real` uses total ordering
    /// (NaN sorts above all other values) so the result is usable for
    /// ordered-key reasoning.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::BigInt(a), Value::BigInt(b)) => Some(a.cmp(b)),
            (Value::Real(a), Value::Real(b)) => Some(a.total_cmp(b)),
            (Value::Decimal(a_val, a_scale), Value::Decimal(b_val, b_scale)) => {
                // Only comparable at the same scale
                if a_scale == b_scale {
                    Some(a_val.cmp(b_val))
                } else {
                    None
                }
            }
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Bytes(a), Value::Bytes(b)) => Some(a.as_ref().cmp(b.as_ref())),
            _ => None, // Different types are incomparable
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            // Bit equality: NaN == NaN, 0.0 != -0.0
            (Value::Real(a), Value::Real(b)) => a.to_bits() == b.to_bits(),
            (Value::Decimal(a_val, a_scale), Value::Decimal(b_val, b_scale)) => {
                a_val == b_val && a_scale == b_scale
            }
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(v) => v.hash(state),
            Value::BigInt(v) => v.hash(state),
            Value::Real(v) => v.to_bits().hash(state),
            Value::Decimal(val, scale) => {
                val.hash(state);
                scale.hash(state);
            }
            Value::Text(s) => s.hash(state),
            Value::Bytes(b) => b.hash(state),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::BigInt(v) => write!(f, "{v}"),
            Value::Real(v) => write!(f, "{v}"),
            Value::Decimal(val, scale) => {
                let divisor = 10_i128.pow(u32::from(*scale));
                let int_part = val / divisor;
                let frac_part = (val % divisor).abs();
                write!(f, "{int_part}.{frac_part:0width$}", width = *scale as usize)
            }
            Value::Text(s) => write!(f, "'{s}'"),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::BigInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case(Value::BigInt(1), Value::BigInt(2), Some(Ordering::Less))]
    #[test_case(Value::BigInt(2), Value::BigInt(2), Some(Ordering::Equal))]
    #[test_case(Value::Text("b".into()), Value::Text("a".into()), Some(Ordering::Greater))]
    #[test_case(Value::BigInt(1), Value::Text("1".into()), None)]
    #[test_case(Value::Decimal(100, 1), Value::Decimal(10, 0), None)]
    fn compare_cases(a: Value, b: Value, expected: Option<Ordering>) {
        assert_eq!(a.compare(&b), expected);
    }

    #[test]
    fn real_equality_is_bitwise() {
        assert_eq!(Value::Real(f64::NAN), Value::Real(f64::NAN));
        assert_ne!(Value::Real(0.0), Value::Real(-0.0));
    }

    #[test]
    fn decimal_renders_with_scale() {
        assert_eq!(Value::Decimal(12345, 2).to_string(), "123.45");
        assert_eq!(Value::Decimal(-12345, 2).to_string(), "-123.45");
        assert_eq!(Value::Decimal(7, 3).to_string(), "0.007");
    }

    #[test]
    fn serde_round_trip() {
        let values = [
            Value::Null,
            Value::Boolean(true),
            Value::BigInt(-7),
            Value::Decimal(1234, 2),
            Value::Text("alice".into()),
            Value::Bytes(Bytes::from_static(b"\x00\x01")),
        ];
        for value in values {
            let json = serde_json::to_string(&value).unwrap();
            let back: Value = serde_json::from_str(&json).unwrap();
            assert_eq!(back, value);
        }
    }

    proptest! {
        /// compare() agrees with structural equality for same-typed values.
        #[test]
        fn compare_consistent_with_eq(a: i64, b: i64) {
            let (va, vb) = (Value::BigInt(a), Value::BigInt(b));
            prop_assert_eq!(va.compare(&vb) == Some(Ordering::Equal), va == vb);
        }

        /// Text ordering matches str ordering.
        #[test]
        fn text_ordering(a in "[a-z]{0,8}", b in "[a-z]{0,8}") {
            let ord = Value::Text(a.clone()).compare(&Value::Text(b.clone()));
            prop_assert_eq!(ord, Some(a.cmp(&b)));
        }
    }
}
