//! Column projection and filter splitting.
//!
//! `retain` rewrites a filter so it only references an allowed column
//! subset (the columns an index can check, say). `split` partitions a
//! filter into two conjoined halves, routing terms by a caller-supplied
//! check.

use porphyry_types::ColumnName;

use crate::filter::{FilterKind, GroupOp, RowFilter, TermFilter};

impl RowFilter {
    /// Rewrites the tree so it only references columns accepted by
    /// `predicate`.
    ///
    /// A term whose columns all satisfy the predicate is kept. A term
    /// referencing a rejected column becomes `undecided` when `strict` is
    /// false, or the false filter when `strict` is true — which collapses
    /// an enclosing conjunction and drops the disjunct from an enclosing
    /// disjunction. Opaque expressions always become `undecided`.
    pub fn retain(
        &self,
        predicate: &dyn Fn(&ColumnName) -> bool,
        strict: bool,
        undecided: &RowFilter,
    ) -> RowFilter {
        match self.kind() {
            FilterKind::Term(TermFilter::Expr(_)) => undecided.clone(),
            FilterKind::Term(term) => {
                let kept = match term {
                    TermFilter::ColumnToArg(f) => predicate(f.column().name()),
                    TermFilter::ColumnToColumn(f) => {
                        predicate(f.left().name()) && predicate(f.right().name())
                    }
                    TermFilter::ColumnToConstant(f) => predicate(f.column().name()),
                    TermFilter::Expr(_) => false, // handled above
                };
                if kept {
                    self.clone()
                } else if strict {
                    RowFilter::false_filter()
                } else {
                    undecided.clone()
                }
            }
            FilterKind::Group(group) => {
                if group.children().is_empty() {
                    return self.clone();
                }
                let children: Vec<RowFilter> = group
                    .children()
                    .iter()
                    .map(|child| child.retain(predicate, strict, undecided))
                    .collect();
                RowFilter::group(group.op(), children)
            }
        }
    }

    /// Partitions this filter into `[split0, split1]` such that
    /// `split0 & split1` is logically equivalent to the original.
    ///
    /// `check` inspects each term: returning a filter routes the term into
    /// `split0` as that filter; returning `None` leaves the term in
    /// `split1`. Conjunctions distribute across both halves. A disjunction
    /// splits only when every disjunct produces the same `split0`;
    /// otherwise it moves wholesale into `split1`.
    pub fn split(&self, check: &dyn Fn(&RowFilter) -> Option<RowFilter>) -> [RowFilter; 2] {
        match self.kind() {
            FilterKind::Term(_) => match check(self) {
                Some(replacement) => [replacement, RowFilter::true_filter()],
                None => [RowFilter::true_filter(), self.clone()],
            },
            FilterKind::Group(group) => {
                if group.children().is_empty() {
                    return [RowFilter::true_filter(), self.clone()];
                }
                let parts: Vec<[RowFilter; 2]> = group
                    .children()
                    .iter()
                    .map(|child| child.split(check))
                    .collect();
                match group.op() {
                    GroupOp::And => {
                        let (firsts, seconds): (Vec<RowFilter>, Vec<RowFilter>) = parts
                            .into_iter()
                            .map(|[first, second]| (first, second))
                            .unzip();
                        [RowFilter::and(firsts), RowFilter::and(seconds)]
                    }
                    GroupOp::Or => {
                        let shared = parts[0][0].clone();
                        if parts.iter().any(|[first, _]| *first != shared) {
                            return [RowFilter::true_filter(), self.clone()];
                        }
                        let seconds = parts.into_iter().map(|[_, second]| second).collect();
                        [shared, RowFilter::or(seconds)]
                    }
                }
            }
        }
    }
}
