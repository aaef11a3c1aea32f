//! Hash set of filters under the structural match relation.
//!
//! Keys are the polarity-insensitive match hash, so a filter and its
//! De Morgan inverse always land in the same bucket. The set is fully
//! immutable after construction and is the workhorse behind group-level
//! `is_match` and the absorption rules in reduction.

use crate::filter::RowFilter;

/// An immutable hash set of filters keyed by match hash, with chaining.
///
/// Duplicate inputs (structural equality) are dropped during construction;
/// the match relation has no multiset semantics.
pub struct MatchSet {
    buckets: Vec<Vec<RowFilter>>,
    len: usize,
}

impl MatchSet {
    /// Builds a set from the given filters. Capacity is the next power of
    /// two at or above `filters.len() + 1`.
    pub fn new(filters: &[RowFilter]) -> Self {
        let capacity = (filters.len() + 1).next_power_of_two();
        let mut buckets = vec![Vec::new(); capacity];
        let mut len = 0;
        for filter in filters {
            let bucket = &mut buckets[(filter.match_hash() as usize) & (capacity - 1)];
            if bucket.iter().any(|entry| entry == filter) {
                continue;
            }
            bucket.push(filter.clone());
            len += 1;
        }
        Self { buckets, len }
    }

    /// Number of distinct filters in the set.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when the set holds no filters.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn bucket(&self, filter: &RowFilter) -> &[RowFilter] {
        &self.buckets[(filter.match_hash() as usize) & (self.buckets.len() - 1)]
    }

    fn iter(&self) -> impl Iterator<Item = &RowFilter> {
        self.buckets.iter().flatten()
    }

    /// Matches `filter` against the set members: `+1` when some member is
    /// structurally equal, `-1` when some member is its inverse and none
    /// is equal, `0` otherwise.
    pub fn has_match(&self, filter: &RowFilter) -> i8 {
        let mut inverse = false;
        for entry in self.bucket(filter) {
            match entry.is_match(filter) {
                1 => return 1,
                -1 => inverse = true,
                _ => {}
            }
        }
        if inverse { -1 } else { 0 }
    }

    /// `+1` when some member is structurally equal to `filter`, `0`
    /// otherwise. Inverses don't count.
    pub fn has_equal_match(&self, filter: &RowFilter) -> i8 {
        i8::from(self.bucket(filter).iter().any(|entry| entry == filter))
    }

    /// `+1` iff both sets have the same size and every element of `self`
    /// has an equal match in `other`.
    pub fn equal_matches(&self, other: &MatchSet) -> i8 {
        if self.len != other.len {
            return 0;
        }
        for entry in self.iter() {
            if other.has_equal_match(entry) == 0 {
                return 0;
            }
        }
        1
    }

    /// `-1` iff both sets have the same size and every element of `self`
    /// is inversely matched in `other` (no element has an equal match).
    ///
    /// This is the De Morgan case: an `And` and an `Or` whose children
    /// inverse-match are negations of each other.
    pub fn inverse_matches(&self, other: &MatchSet) -> i8 {
        if self.len != other.len {
            return 0;
        }
        for entry in self.iter() {
            if other.has_match(entry) != -1 {
                return 0;
            }
        }
        -1
    }

    /// As [`equal_matches`], except that `exclude` (which must be present
    /// in `self`) must be inversely matched in `other` instead of equally
    /// matched.
    ///
    /// Detects the complement absorption pattern: the children of
    /// `(A ∧ B)` equal-match the children of `(A ∧ ¬B)` for every element
    /// but `B`, whose inverse is present on the other side.
    ///
    /// [`equal_matches`]: MatchSet::equal_matches
    pub fn equal_matches_excluding(&self, other: &MatchSet, exclude: &RowFilter) -> i8 {
        if self.len != other.len {
            return 0;
        }
        let mut saw_exclude = false;
        for entry in self.iter() {
            if entry == exclude {
                saw_exclude = true;
                if other.has_match(entry) != -1 {
                    return 0;
                }
            } else if other.has_equal_match(entry) == 0 {
                return 0;
            }
        }
        i8::from(saw_exclude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::CompareOp;
    use porphyry_types::{ColumnInfo, DataType};

    fn arg(name: &str, op: CompareOp, ordinal: usize) -> RowFilter {
        RowFilter::column_to_arg(ColumnInfo::new(name, DataType::BigInt), op, ordinal)
    }

    #[test]
    fn capacity_leaves_headroom() {
        let filters: Vec<RowFilter> = (1..=4).map(|i| arg("a", CompareOp::Eq, i)).collect();
        let set = MatchSet::new(&filters);
        assert_eq!(set.len(), 4);
        assert_eq!(set.buckets.len(), 8);
    }

    #[test]
    fn duplicates_are_dropped() {
        let a = arg("a", CompareOp::Eq, 1);
        let set = MatchSet::new(&[a.clone(), a.clone(), arg("b", CompareOp::Lt, 2)]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn match_results() {
        let a = arg("a", CompareOp::Eq, 1);
        let b = arg("b", CompareOp::Lt, 2);
        let set = MatchSet::new(&[a.clone(), b.clone()]);

        assert_eq!(set.has_match(&a), 1);
        assert_eq!(set.has_match(&b.not()), -1);
        assert_eq!(set.has_match(&arg("c", CompareOp::Eq, 1)), 0);

        assert_eq!(set.has_equal_match(&a), 1);
        assert_eq!(set.has_equal_match(&a.not()), 0);
    }

    #[test]
    fn equality_prefers_equal_over_inverse() {
        // Both a==?1 and a!=?1 share a bucket; equality must win.
        let a = arg("a", CompareOp::Eq, 1);
        let set = MatchSet::new(&[a.clone(), a.not()]);
        assert_eq!(set.has_match(&a), 1);
    }

    #[test]
    fn inverse_matches_detects_de_morgan_children() {
        let a = arg("a", CompareOp::Eq, 1);
        let b = arg("b", CompareOp::Lt, 2);
        let set = MatchSet::new(&[a.clone(), b.clone()]);
        let inverted = MatchSet::new(&[a.not(), b.not()]);
        assert_eq!(set.inverse_matches(&inverted), -1);

        let partial = MatchSet::new(&[a.not(), b.clone()]);
        assert_eq!(set.inverse_matches(&partial), 0);
    }

    #[test]
    fn equal_matches_excluding_requires_the_inverse() {
        let a = arg("a", CompareOp::Eq, 1);
        let b = arg("b", CompareOp::Lt, 2);
        let left = MatchSet::new(&[a.clone(), b.clone()]);
        let right = MatchSet::new(&[a.clone(), b.not()]);

        assert_eq!(left.equal_matches_excluding(&right, &b), 1);
        // Excluded element must be present in self.
        let c = arg("c", CompareOp::Eq, 3);
        assert_eq!(left.equal_matches_excluding(&right, &c), 0);
        // And its inverse must be present in other.
        assert_eq!(left.equal_matches_excluding(&left, &b), 0);
    }
}
