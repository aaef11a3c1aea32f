//! Column descriptors consumed by the filter algebra.
//!
//! A [`ColumnInfo`] names a column, fixes its data type, and records the
//! direction it is stored in when it participates in an ordered key.

use std::fmt::{self, Debug, Display};

use serde::{Deserialize, Serialize};

// ============================================================================
// Names
// ============================================================================

/// A column name.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ColumnName(String);

impl ColumnName {
    /// Creates a new column name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the column name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Debug for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ColumnName({:?})", self.0)
    }
}

impl Display for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ColumnName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ColumnName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

// ============================================================================
// Data Types
// ============================================================================

/// Column data types visible to the filter algebra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Boolean value.
    Boolean,
    /// 64-bit signed integer.
    BigInt,
    /// 64-bit floating point (IEEE 754 double precision).
    Real,
    /// Fixed-precision decimal number.
    ///
    /// Stored as an i128 in smallest units plus a scale, so a single
    /// numeric value has one encoding per scale.
    Decimal {
        /// Total number of digits (1-38).
        precision: u8,
        /// Digits after the decimal point.
        scale: u8,
    },
    /// UTF-8 text string.
    Text,
    /// Raw bytes.
    Bytes,
}

impl DataType {
    /// True when equality against this type can match more than one ordered
    /// byte encoding of the same numeric value.
    ///
    /// A range scan that seeks on an equality over such a column cannot stop
    /// advancing the key prefix, and the residual filter must re-check the
    /// matched rows.
    pub fn range_fuzzy(self) -> bool {
        matches!(self, DataType::Decimal { .. })
    }
}

// ============================================================================
// Column Info
// ============================================================================

/// A column descriptor: name, type, and key direction.
///
/// `descending` describes how the column is encoded when it is part of an
/// ordered key; it flips which comparison operators produce low vs. high
/// range bounds.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ColumnInfo {
    name: ColumnName,
    data_type: DataType,
    descending: bool,
}

impl ColumnInfo {
    /// Creates an ascending column descriptor.
    pub fn new(name: impl Into<ColumnName>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            descending: false,
        }
    }

    /// Marks the column as stored in descending key order.
    pub fn descending(mut self) -> Self {
        self.descending = true;
        self
    }

    /// Returns the column name.
    pub fn name(&self) -> &ColumnName {
        &self.name
    }

    /// Returns the column data type.
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// True when the column is stored in descending key order.
    pub fn is_descending(&self) -> bool {
        self.descending
    }
}

impl Display for ColumnInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// ============================================================================
// Ordering
// ============================================================================

/// One column of an ORDER BY specification.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderByColumn {
    column: ColumnInfo,
    descending: bool,
}

impl OrderByColumn {
    /// Ascending order over the given column.
    pub fn asc(column: ColumnInfo) -> Self {
        Self {
            column,
            descending: false,
        }
    }

    /// Descending order over the given column.
    pub fn desc(column: ColumnInfo) -> Self {
        Self {
            column,
            descending: true,
        }
    }

    /// Returns the ordered column.
    pub fn column(&self) -> &ColumnInfo {
        &self.column
    }

    /// True for descending order.
    pub fn is_descending(&self) -> bool {
        self.descending
    }
}

impl Display for OrderByColumn {
    /// Renders as `+name` or `-name`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.descending { '-' } else { '+' };
        write!(f, "{sign}{}", self.column.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_name_round_trip() {
        let name = ColumnName::from("user_id");
        assert_eq!(name.as_str(), "user_id");
        assert_eq!(name.to_string(), "user_id");
    }

    #[test]
    fn decimal_is_range_fuzzy() {
        let dt = DataType::Decimal {
            precision: 10,
            scale: 2,
        };
        assert!(dt.range_fuzzy());
        assert!(!DataType::BigInt.range_fuzzy());
        assert!(!DataType::Text.range_fuzzy());
    }

    #[test]
    fn order_by_renders_direction() {
        let col = ColumnInfo::new("ts", DataType::BigInt);
        assert_eq!(OrderByColumn::asc(col.clone()).to_string(), "+ts");
        assert_eq!(OrderByColumn::desc(col).to_string(), "-ts");
    }
}
