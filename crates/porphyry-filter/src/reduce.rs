//! Filter reduction.
//!
//! Reduction removes duplicate children, collapses contradictions and
//! tautologies, tightens comparisons that share a column and right-hand
//! side, and applies absorption between group children. It runs bottom-up
//! and memoizes its result on each node, so reducing an already-reduced
//! tree is O(1).

use std::cmp::Ordering;

use porphyry_types::{ColumnInfo, Value};

use crate::filter::{FilterKind, GroupOp, RowFilter, TermFilter};
use crate::match_set::MatchSet;
use crate::ops::CompareOp;

impl RowFilter {
    /// Returns the reduced form of this filter.
    ///
    /// The result is logically equivalent to the input. Results are
    /// memoized: the first call computes, subsequent calls return the
    /// cached form. Reduction is idempotent, so the returned filter is its
    /// own reduced form.
    pub fn reduce(&self) -> RowFilter {
        if let Some(slot) = self.memo().reduced.get() {
            return match slot {
                None => self.clone(),
                Some(reduced) => reduced.clone(),
            };
        }
        let result = self.compute_reduced();
        if result == *self {
            self.memo().reduced.get_or_init(|| None);
            return self.clone();
        }
        // Publish the result as its own reduced form first, so a reader
        // chasing the slot never recomputes.
        result.memo().reduced.get_or_init(|| None);
        match self.memo().reduced.get_or_init(|| Some(result)) {
            None => self.clone(),
            Some(reduced) => reduced.clone(),
        }
    }

    fn compute_reduced(&self) -> RowFilter {
        let FilterKind::Group(group) = self.kind() else {
            return self.clone();
        };
        if group.children().is_empty() {
            return self.clone();
        }
        let op = group.op();
        let children: Vec<RowFilter> = group.children().iter().map(RowFilter::reduce).collect();
        let rebuilt = RowFilter::group(op, children);
        match rebuilt.kind() {
            FilterKind::Group(g) if g.op() == op && !g.children().is_empty() => {
                reduce_group(op, g.children().to_vec())
            }
            _ => rebuilt,
        }
    }
}

// ============================================================================
// Group reduction
// ============================================================================

enum Step {
    /// No reduction applies to the pair.
    None,
    /// The pair is a contradiction (`And`) or tautology (`Or`); the whole
    /// group collapses.
    Annihilate,
    /// The first filter subsumes the second.
    KeepFirst,
    /// The second filter subsumes the first.
    KeepSecond,
    /// Both filters are replaced by a single equivalent one.
    Replace(RowFilter),
}

fn reduce_group(op: GroupOp, mut children: Vec<RowFilter>) -> RowFilter {
    'restart: loop {
        for i in 0..children.len() {
            for j in (i + 1)..children.len() {
                match reduce_step(op, &children[i], &children[j]) {
                    Step::None => {}
                    Step::Annihilate => {
                        return match op {
                            GroupOp::And => RowFilter::false_filter(),
                            GroupOp::Or => RowFilter::true_filter(),
                        };
                    }
                    Step::KeepFirst => {
                        children.remove(j);
                        continue 'restart;
                    }
                    Step::KeepSecond => {
                        children.remove(i);
                        continue 'restart;
                    }
                    Step::Replace(filter) => {
                        children[i] = filter;
                        children.remove(j);
                        continue 'restart;
                    }
                }
            }
        }
        break;
    }
    RowFilter::group(op, children)
}

fn reduce_step(op: GroupOp, first: &RowFilter, second: &RowFilter) -> Step {
    match first.is_match(second) {
        1 => return Step::KeepFirst,
        -1 => return Step::Annihilate,
        _ => {}
    }
    if let (FilterKind::Term(a), FilterKind::Term(b)) = (first.kind(), second.kind()) {
        return reduce_term_pair(op, first, a, second, b);
    }
    reduce_absorption(op, first, second)
}

// ============================================================================
// Term pairs
// ============================================================================

enum Rhs<'a> {
    Arg(usize),
    Column(&'a ColumnInfo),
    Constant(&'a Value),
}

fn term_parts<'a>(term: &'a TermFilter) -> Option<(&'a ColumnInfo, CompareOp, Rhs<'a>)> {
    match term {
        TermFilter::ColumnToArg(f) => Some((f.column(), f.op(), Rhs::Arg(f.arg()))),
        TermFilter::ColumnToColumn(f) => Some((f.left(), f.op(), Rhs::Column(f.right()))),
        TermFilter::ColumnToConstant(f) => Some((f.column(), f.op(), Rhs::Constant(f.value()))),
        TermFilter::Expr(_) => None,
    }
}

fn reduce_term_pair(
    op: GroupOp,
    first: &RowFilter,
    a: &TermFilter,
    second: &RowFilter,
    b: &TermFilter,
) -> Step {
    let (Some((col_a, op_a, rhs_a)), Some((col_b, op_b, rhs_b))) = (term_parts(a), term_parts(b))
    else {
        return Step::None;
    };
    if col_a != col_b {
        return Step::None;
    }
    // Relation between the right-hand sides. Arguments and columns only
    // reduce against themselves; constants use value ordering, which also
    // tightens across distinct values.
    let rel = match (rhs_a, rhs_b) {
        (Rhs::Arg(x), Rhs::Arg(y)) if x == y => Ordering::Equal,
        (Rhs::Column(x), Rhs::Column(y)) if x == y => Ordering::Equal,
        (Rhs::Constant(x), Rhs::Constant(y)) => match x.compare(y) {
            Some(rel) => rel,
            None => return Step::None,
        },
        _ => return Step::None,
    };
    if op_a.is_membership() || op_b.is_membership() {
        // Same-rhs duplicates and contradictions were already handled by
        // the match relation; nothing else reduces.
        return Step::None;
    }
    let op_step = match op {
        GroupOp::And => reduce_operator_for_and(op_a, op_b, rel),
        GroupOp::Or => reduce_operator_for_or(op_a, op_b, rel),
    };
    match op_step {
        OpStep::None => Step::None,
        OpStep::Annihilate => Step::Annihilate,
        OpStep::First => Step::KeepFirst,
        OpStep::Second => Step::KeepSecond,
        OpStep::FirstWith(new_op) => Step::Replace(first.with_op(new_op)),
        OpStep::SecondWith(new_op) => Step::Replace(second.with_op(new_op)),
    }
}

enum OpStep {
    None,
    /// Keep the first term as-is.
    First,
    /// Keep the second term as-is.
    Second,
    /// Keep the first term's column and rhs under a different operator.
    FirstWith(CompareOp),
    /// Keep the second term's column and rhs under a different operator.
    SecondWith(CompareOp),
    /// The pair is unsatisfiable (`And`) or exhaustive (`Or`).
    Annihilate,
}

impl OpStep {
    fn mirrored(self) -> OpStep {
        match self {
            OpStep::First => OpStep::Second,
            OpStep::Second => OpStep::First,
            OpStep::FirstWith(op) => OpStep::SecondWith(op),
            OpStep::SecondWith(op) => OpStep::FirstWith(op),
            other => other,
        }
    }
}

/// Conjunction reduction table for two comparisons over the same column.
///
/// `rel` is the ordering of the first right-hand side relative to the
/// second. Equal-rhs duplicate and flip pairs never reach this table; the
/// match relation catches them first.
fn reduce_operator_for_and(op1: CompareOp, op2: CompareOp, rel: Ordering) -> OpStep {
    use CompareOp::{Eq, Ge, Gt, Le, Lt, Ne};

    match rel {
        Ordering::Equal => match (op1, op2) {
            (Eq, Le | Ge) => OpStep::First,
            (Le | Ge, Eq) => OpStep::Second,
            (Eq, Lt | Gt) | (Lt | Gt, Eq) => OpStep::Annihilate,
            (Ne, Lt | Gt) => OpStep::Second,
            (Lt | Gt, Ne) => OpStep::First,
            (Ne, Le) => OpStep::SecondWith(Lt),
            (Le, Ne) => OpStep::FirstWith(Lt),
            (Ne, Ge) => OpStep::SecondWith(Gt),
            (Ge, Ne) => OpStep::FirstWith(Gt),
            (Lt, Le) => OpStep::First,
            (Le, Lt) => OpStep::Second,
            (Gt, Ge) => OpStep::First,
            (Ge, Gt) => OpStep::Second,
            (Le, Ge) | (Ge, Le) => OpStep::FirstWith(Eq),
            (Lt, Gt) | (Gt, Lt) => OpStep::Annihilate,
            _ => OpStep::None,
        },
        Ordering::Less => match (op1, op2) {
            (Eq, Ne | Lt | Le) => OpStep::First,
            (Eq, Eq | Gt | Ge) => OpStep::Annihilate,
            (Ne | Gt | Ge, Eq) => OpStep::Second,
            (Lt | Le, Eq) => OpStep::Annihilate,
            (Ne, Gt | Ge) => OpStep::Second,
            (Lt | Le, Ne) => OpStep::First,
            (Lt | Le, Lt | Le) => OpStep::First,
            (Lt | Le, Gt | Ge) => OpStep::Annihilate,
            (Gt | Ge, Gt | Ge) => OpStep::Second,
            _ => OpStep::None,
        },
        Ordering::Greater => reduce_operator_for_and(op2, op1, Ordering::Less).mirrored(),
    }
}

/// Disjunction reduction table, dual of [`reduce_operator_for_and`].
fn reduce_operator_for_or(op1: CompareOp, op2: CompareOp, rel: Ordering) -> OpStep {
    use CompareOp::{Eq, Ge, Gt, Le, Lt, Ne};

    match rel {
        Ordering::Equal => match (op1, op2) {
            (Eq, Lt) => OpStep::SecondWith(Le),
            (Lt, Eq) => OpStep::FirstWith(Le),
            (Eq, Gt) => OpStep::SecondWith(Ge),
            (Gt, Eq) => OpStep::FirstWith(Ge),
            (Eq, Le | Ge) => OpStep::Second,
            (Le | Ge, Eq) => OpStep::First,
            (Ne, Lt | Gt) => OpStep::First,
            (Lt | Gt, Ne) => OpStep::Second,
            (Ne, Le | Ge) | (Le | Ge, Ne) => OpStep::Annihilate,
            (Lt, Le) => OpStep::Second,
            (Le, Lt) => OpStep::First,
            (Gt, Ge) => OpStep::Second,
            (Ge, Gt) => OpStep::First,
            (Lt, Gt) | (Gt, Lt) => OpStep::FirstWith(Ne),
            (Le, Gt) | (Gt, Le) | (Le, Ge) | (Ge, Le) => OpStep::Annihilate,
            _ => OpStep::None,
        },
        Ordering::Less => match (op1, op2) {
            (Eq, Ne | Lt | Le) => OpStep::Second,
            (Ne | Gt | Ge, Eq) => OpStep::First,
            (Ne, Ne | Lt | Le) => OpStep::Annihilate,
            (Ne, Gt | Ge) => OpStep::First,
            (Lt | Le, Ne | Lt | Le) => OpStep::Second,
            (Gt | Ge, Ne | Lt | Le) => OpStep::Annihilate,
            (Gt | Ge, Gt | Ge) => OpStep::First,
            _ => OpStep::None,
        },
        Ordering::Greater => reduce_operator_for_or(op2, op1, Ordering::Less).mirrored(),
    }
}

// ============================================================================
// Absorption
// ============================================================================

fn reduce_absorption(op: GroupOp, first: &RowFilter, second: &RowFilter) -> Step {
    let dual = match op {
        GroupOp::And => GroupOp::Or,
        GroupOp::Or => GroupOp::And,
    };
    // Subsumption: `x & (x | y)` keeps `x`; `x | (x & y)` keeps `x`.
    if absorbs(dual, first, second) {
        return Step::KeepFirst;
    }
    if absorbs(dual, second, first) {
        return Step::KeepSecond;
    }
    // Complement absorption: `(A & B) | (A & !B)` collapses to `A`, and
    // dually for conjunctions of disjunctions.
    if let (FilterKind::Group(a), FilterKind::Group(b)) = (first.kind(), second.kind()) {
        if a.op() == dual && b.op() == dual && a.children().len() == b.children().len() {
            let set_a = MatchSet::new(a.children());
            let set_b = MatchSet::new(b.children());
            for exclude in a.children() {
                if set_a.equal_matches_excluding(&set_b, exclude) == 1 {
                    let rest: Vec<RowFilter> = a
                        .children()
                        .iter()
                        .filter(|child| *child != exclude)
                        .cloned()
                        .collect();
                    return Step::Replace(RowFilter::group(dual, rest));
                }
            }
        }
    }
    Step::None
}

/// True when `covered` is a dual-kind group made redundant by `cover`
/// within the enclosing group.
fn absorbs(dual: GroupOp, cover: &RowFilter, covered: &RowFilter) -> bool {
    let FilterKind::Group(group) = covered.kind() else {
        return false;
    };
    if group.op() != dual {
        return false;
    }
    match cover.kind() {
        FilterKind::Group(cover_group) if cover_group.op() == dual => {
            if cover_group.children().len() > group.children().len() {
                return false;
            }
            let set = MatchSet::new(group.children());
            cover_group
                .children()
                .iter()
                .all(|child| set.has_equal_match(child) == 1)
        }
        FilterKind::Term(_) => group.children().iter().any(|child| child == cover),
        FilterKind::Group(_) => false,
    }
}
