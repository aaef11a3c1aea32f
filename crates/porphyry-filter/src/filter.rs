//! Row filter expression trees.
//!
//! A [`RowFilter`] is an immutable boolean expression over column
//! predicates. Nodes are shared through cheap handle clones, carry
//! precomputed structural and match hashes, and memoize their canonical
//! forms (reduced / sorted / DNF / CNF) in write-once slots, so repeated
//! planner queries on the same subtree are O(1).
//!
//! Group constructors flatten on the way in: an `And` never holds an `And`
//! child, the empty `And` is the true filter, and the empty `Or` is the
//! false filter. The identity and annihilator shortcuts happen at
//! construction, so every reachable tree satisfies the structural
//! invariants by the time it has a handle.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::collections::hash_map::DefaultHasher;
use std::fmt::{self, Debug, Display};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock, OnceLock};

use porphyry_types::{ColumnInfo, ColumnName, Value};

use crate::match_set::MatchSet;
use crate::ops::CompareOp;

// ============================================================================
// Node representation
// ============================================================================

/// An immutable row filter.
///
/// Cloning is cheap (an `Arc` bump); structurally equal filters compare
/// equal regardless of sharing. Equality, hashing, and ordering ignore the
/// memoization slots.
#[derive(Clone)]
pub struct RowFilter(Arc<FilterNode>);

pub(crate) struct FilterNode {
    /// Structural hash, precomputed at construction.
    hash: u64,
    /// Polarity-insensitive hash: equal for a filter and its De Morgan
    /// inverse.
    match_hash: u64,
    kind: FilterKind,
    memo: MemoSlots,
}

/// Write-once canonical-form slots.
///
/// Each slot transitions once from unset to a final value. A slot holding
/// `None` records that the node is its own canonical form; storing the
/// handle itself would create an `Arc` cycle.
#[derive(Default)]
pub(crate) struct MemoSlots {
    pub(crate) reduced: OnceLock<Option<RowFilter>>,
    pub(crate) sorted: OnceLock<Option<RowFilter>>,
    pub(crate) dnf: OnceLock<Option<RowFilter>>,
    pub(crate) cnf: OnceLock<Option<RowFilter>>,
    pub(crate) is_dnf: OnceLock<bool>,
    pub(crate) is_cnf: OnceLock<bool>,
}

/// The two filter shapes: a leaf predicate or an n-ary boolean group.
#[derive(PartialEq, Eq)]
pub enum FilterKind {
    /// A leaf predicate.
    Term(TermFilter),
    /// An `And` / `Or` over sub-filters.
    Group(GroupFilter),
}

/// A leaf predicate, indivisible by the algebra.
#[derive(PartialEq, Eq, Hash)]
pub enum TermFilter {
    /// Column compared against a query argument.
    ColumnToArg(ColumnToArgFilter),
    /// Column compared against another column.
    ColumnToColumn(ColumnToColumnFilter),
    /// Column compared against a constant.
    ColumnToConstant(ColumnToConstantFilter),
    /// Opaque expression, unanalyzable beyond equality.
    Expr(ExprFilter),
}

/// `column <op> ?argument`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ColumnToArgFilter {
    column: ColumnInfo,
    op: CompareOp,
    /// 1-based argument ordinal, as written in the query text (`?1`).
    arg: usize,
}

impl ColumnToArgFilter {
    /// Returns the constrained column.
    pub fn column(&self) -> &ColumnInfo {
        &self.column
    }

    /// Returns the comparison operator.
    pub fn op(&self) -> CompareOp {
        self.op
    }

    /// Returns the 1-based argument ordinal.
    pub fn arg(&self) -> usize {
        self.arg
    }
}

/// `left <op> right` over two columns. Membership operators don't apply.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ColumnToColumnFilter {
    left: ColumnInfo,
    op: CompareOp,
    right: ColumnInfo,
}

impl ColumnToColumnFilter {
    /// Returns the left-hand column.
    pub fn left(&self) -> &ColumnInfo {
        &self.left
    }

    /// Returns the comparison operator.
    pub fn op(&self) -> CompareOp {
        self.op
    }

    /// Returns the right-hand column.
    pub fn right(&self) -> &ColumnInfo {
        &self.right
    }
}

/// `column <op> constant`. Membership operators don't apply; a membership
/// set is only available as a bound argument.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ColumnToConstantFilter {
    column: ColumnInfo,
    op: CompareOp,
    value: Value,
}

impl ColumnToConstantFilter {
    /// Returns the constrained column.
    pub fn column(&self) -> &ColumnInfo {
        &self.column
    }

    /// Returns the comparison operator.
    pub fn op(&self) -> CompareOp {
        self.op
    }

    /// Returns the constant.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// An opaque expression predicate. The algebra can negate it and test it
/// for equality, nothing more.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ExprFilter {
    text: String,
    negated: bool,
}

impl ExprFilter {
    /// Returns the expression text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// True when the expression is negated.
    pub fn is_negated(&self) -> bool {
        self.negated
    }
}

/// Group kind: conjunction or disjunction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupOp {
    /// All children must hold.
    And,
    /// At least one child must hold.
    Or,
}

/// An n-ary `And` / `Or` over sub-filters.
///
/// Invariants (enforced by construction): no child is a group of the same
/// kind, no child is the true or false filter, and the child count is
/// never one. The empty `And` and empty `Or` are the true and false
/// singletons.
#[derive(PartialEq, Eq)]
pub struct GroupFilter {
    op: GroupOp,
    children: Vec<RowFilter>,
}

impl GroupFilter {
    /// Returns the group kind.
    pub fn op(&self) -> GroupOp {
        self.op
    }

    /// Returns the child filters.
    pub fn children(&self) -> &[RowFilter] {
        &self.children
    }
}

// ============================================================================
// Construction
// ============================================================================

static TRUE: LazyLock<RowFilter> = LazyLock::new(|| RowFilter::new_group(GroupOp::And, Vec::new()));
static FALSE: LazyLock<RowFilter> = LazyLock::new(|| RowFilter::new_group(GroupOp::Or, Vec::new()));

impl RowFilter {
    /// The always-true filter: the empty conjunction.
    pub fn true_filter() -> RowFilter {
        TRUE.clone()
    }

    /// The always-false filter: the empty disjunction.
    pub fn false_filter() -> RowFilter {
        FALSE.clone()
    }

    /// A column-vs-argument predicate. `arg` is the 1-based ordinal of the
    /// query argument.
    pub fn column_to_arg(column: ColumnInfo, op: CompareOp, arg: usize) -> RowFilter {
        Self::term(TermFilter::ColumnToArg(ColumnToArgFilter {
            column,
            op,
            arg,
        }))
    }

    /// A column-vs-column predicate.
    pub fn column_to_column(left: ColumnInfo, op: CompareOp, right: ColumnInfo) -> RowFilter {
        assert!(
            !op.is_membership(),
            "column-to-column filters do not support membership operators"
        );
        Self::term(TermFilter::ColumnToColumn(ColumnToColumnFilter {
            left,
            op,
            right,
        }))
    }

    /// A column-vs-constant predicate.
    pub fn column_to_constant(column: ColumnInfo, op: CompareOp, value: Value) -> RowFilter {
        assert!(
            !op.is_membership(),
            "column-to-constant filters do not support membership operators"
        );
        Self::term(TermFilter::ColumnToConstant(ColumnToConstantFilter {
            column,
            op,
            value,
        }))
    }

    /// An opaque expression predicate.
    pub fn expr(text: impl Into<String>) -> RowFilter {
        Self::term(TermFilter::Expr(ExprFilter {
            text: text.into(),
            negated: false,
        }))
    }

    /// A conjunction of the given filters, flattened.
    ///
    /// Any false child short-circuits to the false filter, true children
    /// are dropped, a single survivor is returned unwrapped, and no
    /// survivors yields the true filter.
    pub fn and(children: Vec<RowFilter>) -> RowFilter {
        Self::group(GroupOp::And, children)
    }

    /// A disjunction of the given filters, flattened (dual of [`and`]).
    ///
    /// [`and`]: RowFilter::and
    pub fn or(children: Vec<RowFilter>) -> RowFilter {
        Self::group(GroupOp::Or, children)
    }

    pub(crate) fn group(op: GroupOp, children: Vec<RowFilter>) -> RowFilter {
        let mut flat = Vec::with_capacity(children.len());
        for child in children {
            if child.is_true() {
                match op {
                    GroupOp::And => continue,
                    GroupOp::Or => return Self::true_filter(),
                }
            }
            if child.is_false() {
                match op {
                    GroupOp::And => return Self::false_filter(),
                    GroupOp::Or => continue,
                }
            }
            match child.kind() {
                FilterKind::Group(g) if g.op == op => flat.extend_from_slice(&g.children),
                _ => flat.push(child.clone()),
            }
        }
        match flat.len() {
            0 => match op {
                GroupOp::And => Self::true_filter(),
                GroupOp::Or => Self::false_filter(),
            },
            1 => flat
                .into_iter()
                .next()
                .expect("child list verified to have exactly 1 element"),
            _ => Self::new_group(op, flat),
        }
    }

    /// Rebuilds a column term with a different operator, keeping column
    /// and right-hand side.
    pub(crate) fn with_op(&self, op: CompareOp) -> RowFilter {
        match self.kind() {
            FilterKind::Term(TermFilter::ColumnToArg(f)) => {
                Self::column_to_arg(f.column.clone(), op, f.arg)
            }
            FilterKind::Term(TermFilter::ColumnToColumn(f)) => {
                Self::column_to_column(f.left.clone(), op, f.right.clone())
            }
            FilterKind::Term(TermFilter::ColumnToConstant(f)) => {
                Self::column_to_constant(f.column.clone(), op, f.value.clone())
            }
            _ => unreachable!("with_op only applies to column terms"),
        }
    }

    fn term(term: TermFilter) -> RowFilter {
        let hash = term_hash(&term);
        let match_hash = term_match_hash(&term);
        RowFilter(Arc::new(FilterNode {
            hash,
            match_hash,
            kind: FilterKind::Term(term),
            memo: MemoSlots::default(),
        }))
    }

    fn new_group(op: GroupOp, children: Vec<RowFilter>) -> RowFilter {
        debug_assert!(
            children.iter().all(|c| {
                !c.is_true()
                    && !c.is_false()
                    && !matches!(c.kind(), FilterKind::Group(g) if g.op == op)
            }),
            "group children must be flattened and free of constants"
        );
        let hash = group_hash(&children);
        let match_hash = group_match_hash(&children);
        RowFilter(Arc::new(FilterNode {
            hash,
            match_hash,
            kind: FilterKind::Group(GroupFilter { op, children }),
            memo: MemoSlots::default(),
        }))
    }
}

// ============================================================================
// Hashing
// ============================================================================

// Per-variant seeds; arbitrary odd constants.
const ARG_TAG: u64 = 0x9e37_79b9_7f4a_7c15;
const COLUMN_TAG: u64 = 0xc2b2_ae3d_27d4_eb4f;
const CONSTANT_TAG: u64 = 0x1656_67b1_9e37_79f9;
const EXPR_TAG: u64 = 0x27d4_eb2f_1656_67c5;
// Kind-agnostic group tag: folded into every group's match hash so that an
// `And` and an `Or` over matching children hash identically.
const GROUP_MATCH_TAG: u64 = 0x94d0_49bb_1331_11eb;

fn field_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn term_hash(term: &TermFilter) -> u64 {
    field_hash(term)
}

/// Polarity-insensitive term hash: the operator contributes only its
/// canonical `{op, flip(op)}` pair, and expression negation is ignored.
fn term_match_hash(term: &TermFilter) -> u64 {
    match term {
        TermFilter::ColumnToArg(f) => {
            ARG_TAG ^ field_hash(&(f.column.name(), f.op.canonical(), f.arg))
        }
        TermFilter::ColumnToColumn(f) => {
            COLUMN_TAG ^ field_hash(&(f.left.name(), f.op.canonical(), f.right.name()))
        }
        TermFilter::ColumnToConstant(f) => {
            CONSTANT_TAG ^ field_hash(&(f.column.name(), f.op.canonical(), &f.value))
        }
        TermFilter::Expr(f) => EXPR_TAG ^ field_hash(&f.text),
    }
}

/// Order-sensitive array hash over the children. The group kind does not
/// contribute; equality and ordering distinguish it.
fn group_hash(children: &[RowFilter]) -> u64 {
    let mut h: u64 = 1;
    for child in children {
        h = h.wrapping_mul(31).wrapping_add(child.hash());
    }
    h
}

/// Commutative, kind-agnostic group match hash: XOR of the children's match
/// hashes. Child order and group kind don't contribute, which is exactly
/// what makes a filter hash equal to its De Morgan inverse.
fn group_match_hash(children: &[RowFilter]) -> u64 {
    let mut h = GROUP_MATCH_TAG;
    for child in children {
        h ^= child.match_hash();
    }
    h
}

// ============================================================================
// Accessors & basic predicates
// ============================================================================

impl RowFilter {
    /// Returns the node shape.
    pub fn kind(&self) -> &FilterKind {
        &self.0.kind
    }

    /// Returns the precomputed structural hash.
    pub fn hash(&self) -> u64 {
        self.0.hash
    }

    /// Returns the precomputed polarity-insensitive match hash.
    ///
    /// Equal for a filter and its De Morgan inverse: `a == ?1` and
    /// `a != ?1` hash identically, as do `a & b` and `!a | !b`.
    pub fn match_hash(&self) -> u64 {
        self.0.match_hash
    }

    pub(crate) fn memo(&self) -> &MemoSlots {
        &self.0.memo
    }

    /// True for the empty conjunction.
    pub fn is_true(&self) -> bool {
        matches!(self.kind(), FilterKind::Group(g) if g.op == GroupOp::And && g.children.is_empty())
    }

    /// True for the empty disjunction.
    pub fn is_false(&self) -> bool {
        matches!(self.kind(), FilterKind::Group(g) if g.op == GroupOp::Or && g.children.is_empty())
    }

    /// Number of term filters in the tree. The true and false filters
    /// contain none.
    pub fn num_terms(&self) -> usize {
        match self.kind() {
            FilterKind::Term(_) => 1,
            FilterKind::Group(g) => g.children.iter().map(RowFilter::num_terms).sum(),
        }
    }

    /// True iff this filter constrains the named column to a single value:
    /// an equality against an argument or constant. An `And` pins the
    /// column when any conjunct does; an `Or` only when every disjunct
    /// does.
    pub fn unique_column(&self, name: &ColumnName) -> bool {
        match self.kind() {
            FilterKind::Term(TermFilter::ColumnToArg(f)) => {
                f.op == CompareOp::Eq && f.column.name() == name
            }
            FilterKind::Term(TermFilter::ColumnToConstant(f)) => {
                f.op == CompareOp::Eq && f.column.name() == name
            }
            FilterKind::Term(_) => false,
            FilterKind::Group(g) => match g.op {
                GroupOp::And => g.children.iter().any(|c| c.unique_column(name)),
                GroupOp::Or => {
                    !g.children.is_empty() && g.children.iter().all(|c| c.unique_column(name))
                }
            },
        }
    }

    /// Collects the names of all columns referenced by the tree. Opaque
    /// expressions contribute nothing.
    pub fn referenced_columns(&self) -> BTreeSet<ColumnName> {
        struct Collector(BTreeSet<ColumnName>);

        impl FilterVisitor for Collector {
            fn visit_column_to_arg(&mut self, filter: &ColumnToArgFilter) {
                self.0.insert(filter.column.name().clone());
            }

            fn visit_column_to_column(&mut self, filter: &ColumnToColumnFilter) {
                self.0.insert(filter.left.name().clone());
                self.0.insert(filter.right.name().clone());
            }

            fn visit_column_to_constant(&mut self, filter: &ColumnToConstantFilter) {
                self.0.insert(filter.column.name().clone());
            }
        }

        let mut collector = Collector(BTreeSet::new());
        self.accept(&mut collector);
        collector.0
    }
}

// ============================================================================
// Negation & matching
// ============================================================================

impl RowFilter {
    /// Returns the logical negation.
    ///
    /// Terms flip their operator (expressions toggle a negation flag);
    /// groups apply De Morgan, so `!(a & b)` is `!a | !b`. Negating twice
    /// returns a structurally equal filter.
    pub fn not(&self) -> RowFilter {
        match self.kind() {
            FilterKind::Term(TermFilter::ColumnToArg(f)) => {
                Self::column_to_arg(f.column.clone(), f.op.flip(), f.arg)
            }
            FilterKind::Term(TermFilter::ColumnToColumn(f)) => {
                Self::column_to_column(f.left.clone(), f.op.flip(), f.right.clone())
            }
            FilterKind::Term(TermFilter::ColumnToConstant(f)) => {
                Self::column_to_constant(f.column.clone(), f.op.flip(), f.value.clone())
            }
            FilterKind::Term(TermFilter::Expr(f)) => Self::term(TermFilter::Expr(ExprFilter {
                text: f.text.clone(),
                negated: !f.negated,
            })),
            FilterKind::Group(g) => {
                let inverted: Vec<RowFilter> = g.children.iter().map(RowFilter::not).collect();
                match g.op {
                    GroupOp::And => Self::or(inverted),
                    GroupOp::Or => Self::and(inverted),
                }
            }
        }
    }

    /// Structural match relation: `+1` when the filters are equal, `-1`
    /// when `other` equals `self.not()` (the De Morgan inverse for
    /// groups), `0` otherwise. Symmetric in its arguments.
    pub fn is_match(&self, other: &RowFilter) -> i8 {
        if self.match_hash() != other.match_hash() {
            return 0;
        }
        match (self.kind(), other.kind()) {
            (FilterKind::Term(a), FilterKind::Term(b)) => term_match(a, b),
            (FilterKind::Group(a), FilterKind::Group(b)) => {
                let set_a = MatchSet::new(&a.children);
                let set_b = MatchSet::new(&b.children);
                if a.op == b.op {
                    set_a.equal_matches(&set_b)
                } else {
                    set_a.inverse_matches(&set_b)
                }
            }
            _ => 0,
        }
    }
}

fn term_match(a: &TermFilter, b: &TermFilter) -> i8 {
    if a == b {
        return 1;
    }
    let inverse = match (a, b) {
        (TermFilter::ColumnToArg(x), TermFilter::ColumnToArg(y)) => {
            x.column == y.column && x.arg == y.arg && x.op == y.op.flip()
        }
        (TermFilter::ColumnToColumn(x), TermFilter::ColumnToColumn(y)) => {
            x.left == y.left && x.right == y.right && x.op == y.op.flip()
        }
        (TermFilter::ColumnToConstant(x), TermFilter::ColumnToConstant(y)) => {
            x.column == y.column && x.value == y.value && x.op == y.op.flip()
        }
        (TermFilter::Expr(x), TermFilter::Expr(y)) => {
            x.text == y.text && x.negated != y.negated
        }
        _ => false,
    };
    if inverse { -1 } else { 0 }
}

// ============================================================================
// Visitor
// ============================================================================

/// Visitor over the term variants of a filter tree.
///
/// [`RowFilter::accept`] drives the traversal (pre-order, group callback
/// first, then children), so implementations only override the callbacks
/// they care about.
pub trait FilterVisitor {
    /// Called for each column-vs-argument term.
    fn visit_column_to_arg(&mut self, filter: &ColumnToArgFilter) {
        let _ = filter;
    }

    /// Called for each column-vs-column term.
    fn visit_column_to_column(&mut self, filter: &ColumnToColumnFilter) {
        let _ = filter;
    }

    /// Called for each column-vs-constant term.
    fn visit_column_to_constant(&mut self, filter: &ColumnToConstantFilter) {
        let _ = filter;
    }

    /// Called for each opaque expression term.
    fn visit_expr(&mut self, filter: &ExprFilter) {
        let _ = filter;
    }

    /// Called for each group before its children are visited.
    fn visit_group(&mut self, group: &GroupFilter) {
        let _ = group;
    }
}

impl RowFilter {
    /// Walks the tree, invoking the visitor callback for every node.
    pub fn accept<V: FilterVisitor + ?Sized>(&self, visitor: &mut V) {
        match self.kind() {
            FilterKind::Term(TermFilter::ColumnToArg(f)) => visitor.visit_column_to_arg(f),
            FilterKind::Term(TermFilter::ColumnToColumn(f)) => visitor.visit_column_to_column(f),
            FilterKind::Term(TermFilter::ColumnToConstant(f)) => {
                visitor.visit_column_to_constant(f);
            }
            FilterKind::Term(TermFilter::Expr(f)) => visitor.visit_expr(f),
            FilterKind::Group(g) => {
                visitor.visit_group(g);
                for child in &g.children {
                    child.accept(visitor);
                }
            }
        }
    }
}

// ============================================================================
// Equality, hashing, ordering
// ============================================================================

impl PartialEq for RowFilter {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.hash() == other.hash() && self.kind() == other.kind())
    }
}

impl Eq for RowFilter {}

impl Hash for RowFilter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}

impl PartialOrd for RowFilter {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RowFilter {
    /// Deterministic total order used for canonicalization: primary by
    /// variant rank (term < `And` < `Or`), secondary by structural hash,
    /// tertiary by lexicographic comparison of fields / child sequences.
    fn cmp(&self, other: &Self) -> Ordering {
        if Arc::ptr_eq(&self.0, &other.0) {
            return Ordering::Equal;
        }
        variant_rank(self)
            .cmp(&variant_rank(other))
            .then_with(|| self.hash().cmp(&other.hash()))
            .then_with(|| match (self.kind(), other.kind()) {
                (FilterKind::Term(a), FilterKind::Term(b)) => term_cmp(a, b),
                (FilterKind::Group(a), FilterKind::Group(b)) => a.children.cmp(&b.children),
                // Unreachable: variant ranks already differ.
                (FilterKind::Term(_), FilterKind::Group(_)) => Ordering::Less,
                (FilterKind::Group(_), FilterKind::Term(_)) => Ordering::Greater,
            })
    }
}

fn variant_rank(filter: &RowFilter) -> u8 {
    match filter.kind() {
        FilterKind::Term(_) => 0,
        FilterKind::Group(g) => match g.op {
            GroupOp::And => 1,
            GroupOp::Or => 2,
        },
    }
}

fn term_cmp(a: &TermFilter, b: &TermFilter) -> Ordering {
    fn rank(term: &TermFilter) -> u8 {
        match term {
            TermFilter::ColumnToArg(_) => 0,
            TermFilter::ColumnToColumn(_) => 1,
            TermFilter::ColumnToConstant(_) => 2,
            TermFilter::Expr(_) => 3,
        }
    }

    rank(a).cmp(&rank(b)).then_with(|| match (a, b) {
        (TermFilter::ColumnToArg(x), TermFilter::ColumnToArg(y)) => x
            .column
            .cmp(&y.column)
            .then_with(|| x.op.cmp(&y.op))
            .then_with(|| x.arg.cmp(&y.arg)),
        (TermFilter::ColumnToColumn(x), TermFilter::ColumnToColumn(y)) => x
            .left
            .cmp(&y.left)
            .then_with(|| x.op.cmp(&y.op))
            .then_with(|| x.right.cmp(&y.right)),
        (TermFilter::ColumnToConstant(x), TermFilter::ColumnToConstant(y)) => x
            .column
            .cmp(&y.column)
            .then_with(|| x.op.cmp(&y.op))
            .then_with(|| value_cmp(&x.value, &y.value)),
        (TermFilter::Expr(x), TermFilter::Expr(y)) => x
            .text
            .cmp(&y.text)
            .then_with(|| x.negated.cmp(&y.negated)),
        _ => Ordering::Equal, // unreachable: ranks already differ
    })
}

/// Total order over constants for canonicalization purposes only: variant
/// rank first, then the natural per-variant order (`Real` by total order,
/// `Decimal` by raw value then scale).
pub(crate) fn value_cmp(a: &Value, b: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Boolean(_) => 1,
            Value::BigInt(_) => 2,
            Value::Real(_) => 3,
            Value::Decimal(..) => 4,
            Value::Text(_) => 5,
            Value::Bytes(_) => 6,
        }
    }

    rank(a).cmp(&rank(b)).then_with(|| match (a, b) {
        (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
        (Value::BigInt(x), Value::BigInt(y)) => x.cmp(y),
        (Value::Real(x), Value::Real(y)) => x.total_cmp(y),
        (Value::Decimal(xv, xs), Value::Decimal(yv, ys)) => xv.cmp(yv).then_with(|| xs.cmp(ys)),
        (Value::Text(x), Value::Text(y)) => x.cmp(y),
        (Value::Bytes(x), Value::Bytes(y)) => x.as_ref().cmp(y.as_ref()),
        _ => Ordering::Equal, // Null == Null; other pairs unreachable
    })
}

// ============================================================================
// Rendering
// ============================================================================

impl Display for RowFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.append_to(f, false)
    }
}

impl Debug for RowFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RowFilter({self})")
    }
}

impl RowFilter {
    fn append_to(&self, f: &mut fmt::Formatter<'_>, nested: bool) -> fmt::Result {
        match self.kind() {
            FilterKind::Term(TermFilter::ColumnToArg(t)) => {
                if t.op == CompareOp::NotIn {
                    write!(f, "!({} in ?{})", t.column.name(), t.arg)
                } else {
                    write!(f, "{} {} ?{}", t.column.name(), t.op, t.arg)
                }
            }
            FilterKind::Term(TermFilter::ColumnToColumn(t)) => {
                write!(f, "{} {} {}", t.left.name(), t.op, t.right.name())
            }
            FilterKind::Term(TermFilter::ColumnToConstant(t)) => {
                write!(f, "{} {} {}", t.column.name(), t.op, t.value)
            }
            FilterKind::Term(TermFilter::Expr(t)) => {
                if t.negated {
                    write!(f, "!({})", t.text)
                } else {
                    write!(f, "({})", t.text)
                }
            }
            FilterKind::Group(g) => {
                if g.children.is_empty() {
                    return match g.op {
                        GroupOp::And => f.write_str("true"),
                        GroupOp::Or => f.write_str("false"),
                    };
                }
                let sep = match g.op {
                    GroupOp::And => " & ",
                    GroupOp::Or => " | ",
                };
                if nested {
                    f.write_str("(")?;
                }
                for (i, child) in g.children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(sep)?;
                    }
                    child.append_to(f, true)?;
                }
                if nested {
                    f.write_str(")")?;
                }
                Ok(())
            }
        }
    }
}
