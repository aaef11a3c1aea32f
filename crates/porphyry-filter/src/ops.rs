//! Comparison operators for term filters.
//!
//! Operator codes are wire-stable: external tooling stores them, so the
//! numbering must not change. Renumbering internally is allowed only if the
//! flip involution is preserved.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for operator decoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    /// An operator code outside the wire-stable table.
    #[error("unknown comparison operator code: {0}")]
    UnknownOperator(u8),
}

/// A comparison operator.
///
/// The discriminants are the wire-stable codes. Each operator pairs with its
/// logical negation under [`CompareOp::flip`], an involution used both by
/// filter negation and by the polarity-insensitive match hash.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum CompareOp {
    /// Equal (`==`).
    Eq = 0,
    /// Not equal (`!=`).
    Ne = 1,
    /// Less than (`<`).
    Lt = 2,
    /// Greater than or equal (`>=`).
    Ge = 3,
    /// Greater than (`>`).
    Gt = 4,
    /// Less than or equal (`<=`).
    Le = 5,
    /// Membership (`in`).
    In = 6,
    /// Negated membership (`!in`).
    NotIn = 7,
}

impl CompareOp {
    /// Returns the wire-stable operator code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Decodes a wire-stable operator code.
    pub fn from_code(code: u8) -> Result<Self, FilterError> {
        match code {
            0 => Ok(CompareOp::Eq),
            1 => Ok(CompareOp::Ne),
            2 => Ok(CompareOp::Lt),
            3 => Ok(CompareOp::Ge),
            4 => Ok(CompareOp::Gt),
            5 => Ok(CompareOp::Le),
            6 => Ok(CompareOp::In),
            7 => Ok(CompareOp::NotIn),
            other => Err(FilterError::UnknownOperator(other)),
        }
    }

    /// Returns the logical negation: `== ↔ !=`, `< ↔ >=`, `> ↔ <=`,
    /// `in ↔ !in`.
    ///
    /// Applying `flip` twice yields the original operator.
    pub fn flip(self) -> Self {
        match self {
            CompareOp::Eq => CompareOp::Ne,
            CompareOp::Ne => CompareOp::Eq,
            CompareOp::Lt => CompareOp::Ge,
            CompareOp::Ge => CompareOp::Lt,
            CompareOp::Gt => CompareOp::Le,
            CompareOp::Le => CompareOp::Gt,
            CompareOp::In => CompareOp::NotIn,
            CompareOp::NotIn => CompareOp::In,
        }
    }

    /// Returns the operator with its comparison direction reversed:
    /// `< ↔ >`, `<= ↔ >=`. Equality and membership are unaffected.
    ///
    /// Used when a bound moves between the low and high side of a
    /// descending key column.
    pub fn reverse(self) -> Self {
        match self {
            CompareOp::Lt => CompareOp::Gt,
            CompareOp::Gt => CompareOp::Lt,
            CompareOp::Le => CompareOp::Ge,
            CompareOp::Ge => CompareOp::Le,
            other => other,
        }
    }

    /// Returns the canonical member of the `{op, flip(op)}` pair: the one
    /// with the lower code. Both members of a pair map to the same value,
    /// which is what makes the match hash polarity-insensitive.
    pub fn canonical(self) -> Self {
        let flipped = self.flip();
        if flipped.code() < self.code() {
            flipped
        } else {
            self
        }
    }

    /// True for the membership operators `in` / `!in`.
    pub fn is_membership(self) -> bool {
        matches!(self, CompareOp::In | CompareOp::NotIn)
    }
}

impl Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Ge => ">=",
            CompareOp::Gt => ">",
            CompareOp::Le => "<=",
            CompareOp::In => "in",
            CompareOp::NotIn => "!in",
        };
        f.write_str(s)
    }
}

impl From<CompareOp> for u8 {
    fn from(op: CompareOp) -> Self {
        op.code()
    }
}

impl TryFrom<u8> for CompareOp {
    type Error = FilterError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        CompareOp::from_code(code)
    }
}
