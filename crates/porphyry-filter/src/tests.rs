//! Integration tests for porphyry-filter.

#![allow(clippy::unwrap_used)] // Tests use unwrap for simplicity
#![allow(clippy::similar_names)] // Test variables can have similar names

mod property_tests;

use porphyry_types::{ColumnInfo, DataType, OrderByColumn, Value};

use crate::{CompareOp, FilterKind, QuerySpec, RowFilter, TermFilter};

// ============================================================================
// Helpers
// ============================================================================

/// Ascending BigInt column.
pub fn col(name: &str) -> ColumnInfo {
    ColumnInfo::new(name, DataType::BigInt)
}

/// Column-vs-argument term.
pub fn arg(name: &str, op: CompareOp, ordinal: usize) -> RowFilter {
    RowFilter::column_to_arg(col(name), op, ordinal)
}

/// Column-vs-constant term over a BigInt literal.
pub fn constant(name: &str, op: CompareOp, value: i64) -> RowFilter {
    RowFilter::column_to_constant(col(name), op, Value::BigInt(value))
}

fn splitmix(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

fn term_polarity(filter: &RowFilter) -> bool {
    match filter.kind() {
        FilterKind::Term(TermFilter::ColumnToArg(f)) => f.op() == f.op().canonical(),
        FilterKind::Term(TermFilter::ColumnToColumn(f)) => f.op() == f.op().canonical(),
        FilterKind::Term(TermFilter::ColumnToConstant(f)) => f.op() == f.op().canonical(),
        FilterKind::Term(TermFilter::Expr(f)) => !f.is_negated(),
        FilterKind::Group(_) => unreachable!("terms only"),
    }
}

/// Evaluates a filter propositionally: every canonical term gets a truth
/// value derived from `seed`, and a term always evaluates opposite to its
/// inverse. Only sound for trees where distinct terms never share a
/// column and right-hand side under different base operators.
pub fn eval(filter: &RowFilter, seed: u64) -> bool {
    match filter.kind() {
        FilterKind::Term(_) => {
            let positive = splitmix(filter.match_hash() ^ seed) & 1 == 0;
            if term_polarity(filter) {
                positive
            } else {
                !positive
            }
        }
        FilterKind::Group(g) => match g.op() {
            crate::GroupOp::And => g.children().iter().all(|c| eval(c, seed)),
            crate::GroupOp::Or => g.children().iter().any(|c| eval(c, seed)),
        },
    }
}

// ============================================================================
// Planner flow
// ============================================================================

#[test]
fn dnf_disjuncts_drive_ranges() {
    // (region == ?1 | region == ?2) & ts >= ?3
    let filter = RowFilter::and(vec![
        RowFilter::or(vec![
            arg("region", CompareOp::Eq, 1),
            arg("region", CompareOp::Eq, 2),
        ]),
        arg("ts", CompareOp::Ge, 3),
    ]);
    let dnf = filter.dnf();
    assert!(dnf.is_dnf());

    let FilterKind::Group(group) = dnf.kind() else {
        panic!("expected a disjunction, got {dnf}");
    };
    assert_eq!(group.children().len(), 2);

    let keys = [col("region"), col("ts")];
    for disjunct in group.children() {
        let extraction = disjunct.range_extract(&keys);
        // Equality on region, then the ts range closes the prefix.
        let low = extraction.low.unwrap();
        assert_eq!(low.num_terms(), 2);
        assert!(extraction.remaining.is_none());
    }
}

#[test]
fn split_separates_indexed_columns() {
    let check = |f: &RowFilter| match f.kind() {
        FilterKind::Term(TermFilter::ColumnToArg(t)) if t.column().name().as_str() == "k" => {
            Some(f.clone())
        }
        _ => None,
    };
    let filter = RowFilter::and(vec![
        arg("k", CompareOp::Ge, 1),
        arg("k", CompareOp::Lt, 2),
        RowFilter::expr("length(v) > 10"),
    ]);
    let [indexed, residual] = filter.split(&check);
    assert_eq!(indexed.to_string(), "k >= ?1 & k < ?2");
    assert_eq!(residual.to_string(), "(length(v) > 10)");
    assert_eq!(RowFilter::and(vec![indexed, residual]).sorted(), filter.sorted());
}

#[test]
fn spec_bundles_reduced_filter() {
    let filter = RowFilter::and(vec![
        arg("a", CompareOp::Eq, 1),
        arg("a", CompareOp::Eq, 1),
        arg("b", CompareOp::Lt, 2),
    ]);
    let spec = QuerySpec::new(
        Some(vec![col("a")]),
        Some(vec![OrderByColumn::asc(col("b"))]),
        filter.reduce(),
    );
    assert_eq!(spec.to_string(), "{+b, a} a == ?1 & b < ?2");
    assert_eq!(
        spec.primary_key()
            .iter()
            .map(|n| n.as_str().to_string())
            .collect::<Vec<_>>(),
        vec!["b", "a"]
    );
}

// ============================================================================
// Construction & rendering
// ============================================================================

#[test]
fn constant_terms_render_literals() {
    assert_eq!(constant("a", CompareOp::Le, 42).to_string(), "a <= 42");
    let text = RowFilter::column_to_constant(
        ColumnInfo::new("name", DataType::Text),
        CompareOp::Eq,
        Value::Text("alice".into()),
    );
    assert_eq!(text.to_string(), "name == 'alice'");
}

#[test]
fn negated_expr_renders_with_bang() {
    let e = RowFilter::expr("a % 2 == 0");
    assert_eq!(e.to_string(), "(a % 2 == 0)");
    assert_eq!(e.not().to_string(), "!(a % 2 == 0)");
    assert_eq!(e.not().not(), e);
}

#[test]
fn column_to_column_flips_like_terms() {
    let f = RowFilter::column_to_column(col("a"), CompareOp::Lt, col("b"));
    assert_eq!(f.to_string(), "a < b");
    assert_eq!(f.not().to_string(), "a >= b");
    assert_eq!(f.is_match(&f.not()), -1);
}
