//! # porphyry-filter: Row filter algebra for Porphyry query planning
//!
//! This crate is the planner's term-rewriting core: an immutable,
//! canonicalizable expression tree over boolean combinations of column
//! predicates.
//!
//! ## Capabilities
//!
//! - Build filters from column-vs-argument, column-vs-column,
//!   column-vs-constant, and opaque expression terms, combined with
//!   flattened n-ary `and` / `or` ([`RowFilter`])
//! - Negate via operator flips and De Morgan ([`RowFilter::not`])
//! - Canonicalize: [`RowFilter::reduce`], [`RowFilter::sorted`],
//!   [`RowFilter::dnf`], [`RowFilter::cnf`] — each memoized per node, with
//!   a term-count limit on normal-form expansion
//! - Recognize equivalence and inverse-equivalence structurally, including
//!   a filter against its De Morgan inverse ([`RowFilter::is_match`],
//!   [`MatchSet`])
//! - Project and split across column subsets ([`RowFilter::retain`],
//!   [`RowFilter::split`])
//! - Lower conjunctions to ordered-index key bounds
//!   ([`RowFilter::range_extract`])
//! - Bundle projection, ordering, and filter for the executor
//!   ([`QuerySpec`])
//!
//! ## Usage
//!
//! ```
//! use porphyry_filter::{CompareOp, RowFilter};
//! use porphyry_types::{ColumnInfo, DataType};
//!
//! let id = ColumnInfo::new("id", DataType::BigInt);
//! let score = ColumnInfo::new("score", DataType::Real);
//!
//! let filter = RowFilter::and(vec![
//!     RowFilter::column_to_arg(id.clone(), CompareOp::Ge, 1),
//!     RowFilter::column_to_arg(score, CompareOp::Gt, 2),
//! ]);
//! assert_eq!(filter.to_string(), "id >= ?1 & score > ?2");
//!
//! let range = filter.range_extract(&[id]);
//! assert_eq!(range.low.unwrap().to_string(), "id >= ?1");
//! assert_eq!(range.remaining.unwrap().to_string(), "score > ?2");
//! ```
//!
//! ## Concurrency
//!
//! Filters are shared freely across threads. The only mutation is the
//! write-once memoization of canonical forms on each node; concurrent
//! writers compute identical values, and readers either observe the final
//! value or recompute it.

mod filter;
mod match_set;
mod normalize;
mod ops;
mod project;
mod range;
mod reduce;
mod spec;

#[cfg(test)]
mod tests;

// Re-export public types
pub use filter::{
    ColumnToArgFilter, ColumnToColumnFilter, ColumnToConstantFilter, ExprFilter, FilterKind,
    FilterVisitor, GroupFilter, GroupOp, RowFilter, TermFilter,
};
pub use match_set::MatchSet;
pub use ops::{CompareOp, FilterError};
pub use range::RangeExtraction;
pub use spec::QuerySpec;
