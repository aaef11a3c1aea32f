//! Key range extraction.
//!
//! Lowers a conjunction of column predicates into `[low, high)` bounds
//! over an ordered multi-column key, plus the residual filter that must
//! still be checked row by row. The bounds are filters themselves; the
//! scanner encodes their right-hand sides with each key column's own
//! direction, so the emitted operators are byte-order bounds.

use tracing::trace;

use porphyry_types::ColumnInfo;

use crate::filter::{FilterKind, GroupOp, RowFilter, TermFilter};
use crate::ops::CompareOp;

/// The result of lowering a conjunction onto a key.
#[derive(Debug, Clone)]
pub struct RangeExtraction {
    /// Conjunction of terms defining the lower-bound key prefix, or `None`
    /// when the scan is open at the low end.
    pub low: Option<RowFilter>,
    /// Conjunction of terms defining the upper bound, or `None` when open.
    pub high: Option<RowFilter>,
    /// Residual filter to evaluate against each scanned row, or `None`
    /// when the bounds capture everything.
    pub remaining: Option<RowFilter>,
    /// Reserved for future use; always `None`. Consumers must not
    /// interpret it.
    pub reserved: Option<RowFilter>,
}

impl RangeExtraction {
    /// True when neither bound constrains the scan.
    pub fn is_open(&self) -> bool {
        self.low.is_none() && self.high.is_none()
    }

    fn open(remaining: Option<RowFilter>) -> Self {
        Self {
            low: None,
            high: None,
            remaining,
            reserved: None,
        }
    }
}

impl RowFilter {
    /// Extracts key range bounds from this filter for the given ordered
    /// key columns.
    ///
    /// The filter should be conjunctive — a term, or an `And` whose
    /// children are terms (a DNF disjunct being planned). Key columns are
    /// consumed left to right: an equality advances the prefix, the first
    /// range predicate per direction closes it, and a column with no
    /// usable predicate stops the traversal. Terms referencing non-key
    /// columns, membership and inequality predicates, and anything the
    /// bounds don't capture fall through to `remaining`.
    ///
    /// An equality over a column whose type has fuzzy range equality
    /// (see [`DataType::range_fuzzy`]) is recorded in both bounds but
    /// stays in the residual, and stops the prefix from advancing.
    ///
    /// [`DataType::range_fuzzy`]: porphyry_types::DataType::range_fuzzy
    pub fn range_extract(&self, keys: &[ColumnInfo]) -> RangeExtraction {
        if self.is_true() {
            return RangeExtraction::open(None);
        }
        let conjuncts: Vec<RowFilter> = match self.kind() {
            FilterKind::Term(_) => vec![self.clone()],
            FilterKind::Group(group) if group.op() == GroupOp::And => group.children().to_vec(),
            // Disjunctions (including the false filter) can't drive a
            // range; plan their DNF disjuncts individually instead.
            FilterKind::Group(_) => return RangeExtraction::open(Some(self.clone())),
        };

        let mut consumed = vec![false; conjuncts.len()];
        let mut low_terms: Vec<RowFilter> = Vec::new();
        let mut high_terms: Vec<RowFilter> = Vec::new();
        let mut fuzzy = false;

        'keys: for key in keys {
            // An equality pins the prefix column for both bounds.
            if let Some(index) = find_term(&conjuncts, &consumed, key, |op| op == CompareOp::Eq) {
                low_terms.push(conjuncts[index].clone());
                high_terms.push(conjuncts[index].clone());
                if key.data_type().range_fuzzy() {
                    // The equality may match several encodings; keep the
                    // term in the residual and stop advancing.
                    fuzzy = true;
                    break 'keys;
                }
                consumed[index] = true;
                continue 'keys;
            }

            // Otherwise take the first range predicate per direction. For
            // a descending column the bound switches sides with its
            // operator reversed, keeping the byte ordering correct.
            if let Some(index) = find_term(&conjuncts, &consumed, key, |op| {
                matches!(op, CompareOp::Gt | CompareOp::Ge)
            }) {
                consumed[index] = true;
                let term = &conjuncts[index];
                if key.is_descending() {
                    high_terms.push(term.with_op(term_op(term).reverse()));
                } else {
                    low_terms.push(term.clone());
                }
            }
            if let Some(index) = find_term(&conjuncts, &consumed, key, |op| {
                matches!(op, CompareOp::Lt | CompareOp::Le)
            }) {
                consumed[index] = true;
                let term = &conjuncts[index];
                if key.is_descending() {
                    low_terms.push(term.with_op(term_op(term).reverse()));
                } else {
                    high_terms.push(term.clone());
                }
            }
            // A range (or nothing at all) on this column ends the prefix.
            break 'keys;
        }

        let low = build_bound(low_terms, CompareOp::Ge, fuzzy);
        let high = build_bound(high_terms, CompareOp::Le, fuzzy);
        let remaining: Vec<RowFilter> = conjuncts
            .into_iter()
            .zip(&consumed)
            .filter(|&(_, &used)| !used)
            .map(|(conjunct, _)| conjunct)
            .collect();
        let remaining = match RowFilter::and(remaining) {
            filter if filter.is_true() => None,
            filter => Some(filter),
        };

        trace!(low = ?low, high = ?high, fuzzy, "extracted key range");
        RangeExtraction {
            low,
            high,
            remaining,
            reserved: None,
        }
    }
}

/// Finds the first unconsumed arg or constant term over the key column
/// whose operator satisfies `wanted`.
fn find_term(
    conjuncts: &[RowFilter],
    consumed: &[bool],
    key: &ColumnInfo,
    wanted: impl Fn(CompareOp) -> bool,
) -> Option<usize> {
    conjuncts.iter().enumerate().position(|(index, conjunct)| {
        !consumed[index]
            && match conjunct.kind() {
                FilterKind::Term(TermFilter::ColumnToArg(f)) => {
                    f.column().name() == key.name() && wanted(f.op())
                }
                FilterKind::Term(TermFilter::ColumnToConstant(f)) => {
                    f.column().name() == key.name() && wanted(f.op())
                }
                _ => false,
            }
    })
}

fn term_op(filter: &RowFilter) -> CompareOp {
    match filter.kind() {
        FilterKind::Term(TermFilter::ColumnToArg(f)) => f.op(),
        FilterKind::Term(TermFilter::ColumnToConstant(f)) => f.op(),
        _ => unreachable!("range bounds hold only arg and constant terms"),
    }
}

/// Assembles one bound. A terminal equality becomes inclusive (`>=` low,
/// `<=` high) unless the fuzzy flag kept it in the residual.
fn build_bound(mut terms: Vec<RowFilter>, end_op: CompareOp, fuzzy: bool) -> Option<RowFilter> {
    let last = terms.last()?;
    if !fuzzy && term_op(last) == CompareOp::Eq {
        let promoted = last.with_op(end_op);
        *terms
            .last_mut()
            .expect("bound verified to be non-empty") = promoted;
    }
    Some(RowFilter::and(terms))
}
