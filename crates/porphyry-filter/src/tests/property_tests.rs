//! Property-based tests using proptest.
//!
//! Random filter trees are drawn from a pool of terms where each
//! (column, argument) pair carries one fixed base operator, so two terms
//! over the same pair are always either equal or inverse. That keeps the
//! propositional evaluator in `tests` sound against every rewrite the
//! algebra performs on such trees.

use proptest::prelude::*;

use porphyry_types::{ColumnInfo, DataType};

use super::eval;
use crate::{CompareOp, RowFilter};

fn pool_term(index: usize, negate: bool) -> RowFilter {
    const OPS: [CompareOp; 6] = [
        CompareOp::Eq,
        CompareOp::Lt,
        CompareOp::In,
        CompareOp::Ge,
        CompareOp::Le,
        CompareOp::Eq,
    ];
    let column = ColumnInfo::new(format!("c{}", index % 3), DataType::BigInt);
    let term = RowFilter::column_to_arg(column, OPS[index], index + 1);
    if negate { term.not() } else { term }
}

fn arb_term() -> impl Strategy<Value = RowFilter> {
    (0_usize..6, any::<bool>()).prop_map(|(index, negate)| pool_term(index, negate))
}

fn arb_filter() -> impl Strategy<Value = RowFilter> {
    arb_term().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 2..4).prop_map(RowFilter::and),
            prop::collection::vec(inner, 2..4).prop_map(RowFilter::or),
        ]
    })
}

proptest! {
    /// Double negation returns a structurally equal filter.
    #[test]
    fn not_is_involution(f in arb_filter()) {
        prop_assert_eq!(f.not().not(), f);
    }

    /// Negating a conjunction builds the disjunction of negations.
    #[test]
    fn de_morgan_structure(a in arb_filter(), b in arb_filter()) {
        let and = RowFilter::and(vec![a.clone(), b.clone()]);
        let or = RowFilter::or(vec![a.not(), b.not()]);
        prop_assert_eq!(and.not(), or);
    }

    /// Negation evaluates to the logical complement.
    #[test]
    fn not_negates_evaluation(f in arb_filter(), seed: u64) {
        prop_assert_eq!(eval(&f.not(), seed), !eval(&f, seed));
    }

    /// Reduction preserves logical meaning.
    #[test]
    fn reduce_preserves_evaluation(f in arb_filter(), seed: u64) {
        prop_assert_eq!(eval(&f.reduce(), seed), eval(&f, seed));
    }

    /// Conjoining a filter with itself reduces to the filter itself.
    #[test]
    fn and_is_idempotent(f in arb_filter()) {
        let doubled = RowFilter::and(vec![f.clone(), f.clone()]);
        prop_assert_eq!(doubled.reduce().sorted(), f.reduce().sorted());
    }

    /// A disjunct that strengthens another disjunct is absorbed.
    #[test]
    fn or_absorbs_conjunction(a in arb_term(), b in arb_term()) {
        let f = RowFilter::or(vec![a.clone(), RowFilter::and(vec![a.clone(), b])]);
        prop_assert_eq!(f.reduce().sorted(), a.reduce().sorted());
    }

    /// Normal forms preserve logical meaning.
    #[test]
    fn normal_forms_preserve_evaluation(f in arb_filter(), seed: u64) {
        prop_assert_eq!(eval(&f.dnf(), seed), eval(&f, seed));
        prop_assert_eq!(eval(&f.cnf(), seed), eval(&f, seed));
    }

    /// The disjunctive normal form is a fixed point.
    #[test]
    fn dnf_is_fixed_point(f in arb_filter()) {
        let dnf = f.dnf();
        prop_assert!(dnf.is_dnf());
        prop_assert_eq!(dnf.dnf(), dnf);
    }

    /// Negating the CNF is logically the DNF of the negation.
    #[test]
    fn normal_form_duality(f in arb_filter(), seed: u64) {
        prop_assert_eq!(
            eval(&f.cnf().not(), seed),
            eval(&f.not().dnf(), seed)
        );
    }

    /// The match relation is symmetric.
    #[test]
    fn match_is_symmetric(a in arb_filter(), b in arb_filter()) {
        prop_assert_eq!(a.is_match(&b), b.is_match(&a));
    }

    /// A filter and its inverse share a match hash, and matching filters
    /// agree on hashes.
    #[test]
    fn match_hash_laws(f in arb_filter()) {
        prop_assert_eq!(f.match_hash(), f.not().match_hash());
        prop_assert_eq!(f.is_match(&f.not().not()), 1);
    }

    /// A term always inverse-matches its negation.
    #[test]
    fn term_inverse_match(t in arb_term()) {
        prop_assert_eq!(t.is_match(&t.not()), -1);
    }

    /// Hash and equality agree across all normalizations.
    #[test]
    fn hash_equality_agreement(f in arb_filter()) {
        for form in [f.reduce(), f.sorted(), f.dnf(), f.cnf()] {
            if form == f {
                prop_assert_eq!(form.hash(), f.hash());
                prop_assert_eq!(form.cmp(&f), std::cmp::Ordering::Equal);
            }
            // Reordering never changes the match hash.
            prop_assert_eq!(form.sorted().match_hash(), form.match_hash());
        }
    }

    /// Sorting is canonical: any ordering of the same children sorts to
    /// the same tree, and sorting preserves meaning.
    #[test]
    fn sorted_is_canonical(children in prop::collection::vec(arb_term(), 2..5), seed: u64) {
        let forward = RowFilter::and(children.clone());
        let mut reversed_children = children;
        reversed_children.reverse();
        let reversed = RowFilter::and(reversed_children);
        prop_assert_eq!(forward.sorted(), reversed.sorted());
        prop_assert_eq!(eval(&forward.sorted(), seed), eval(&forward, seed));
    }

    /// A split always conjoins back to the original meaning.
    #[test]
    fn split_is_sound(f in arb_filter(), seed: u64) {
        let check = |term: &RowFilter| {
            let names = term.referenced_columns();
            if names.iter().all(|n| n.as_str() == "c0") {
                Some(term.clone())
            } else {
                None
            }
        };
        let [first, second] = f.split(&check);
        let rejoined = RowFilter::and(vec![first, second]);
        prop_assert_eq!(eval(&rejoined, seed), eval(&f, seed));
    }
}
