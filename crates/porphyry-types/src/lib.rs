//! # porphyry-types: Core types for Porphyry query planning
//!
//! This crate contains the vocabulary types shared between the filter
//! algebra and its consumers (parser, planner, scanner):
//! - Column descriptors ([`ColumnName`], [`DataType`], [`ColumnInfo`])
//! - Ordering ([`OrderByColumn`])
//! - Typed constants ([`Value`])
//!
//! Everything here is a plain immutable value. The types deliberately know
//! nothing about filters or plans; they only describe columns and the
//! constants that predicates compare them against.

mod column;
mod value;

pub use column::{ColumnInfo, ColumnName, DataType, OrderByColumn};
pub use value::Value;
