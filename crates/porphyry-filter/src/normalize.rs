//! Canonical ordering and normal forms.
//!
//! `sorted` canonicalizes group argument order under the deterministic
//! total order on filters. `dnf` / `cnf` distribute the dual group kinds
//! until the tree is an `Or` of `And`s of terms (or vice versa), bounded
//! by a term-count expansion limit. All three memoize on the node.

use tracing::debug;

use crate::filter::{FilterKind, GroupOp, RowFilter};

impl RowFilter {
    /// Returns this filter with every group's children in canonical order.
    ///
    /// The order is total and deterministic: terms before `And` groups
    /// before `Or` groups, then by structural hash, then lexicographically.
    /// Sorting is memoized and preserves logical meaning.
    pub fn sorted(&self) -> RowFilter {
        if let Some(slot) = self.memo().sorted.get() {
            return match slot {
                None => self.clone(),
                Some(sorted) => sorted.clone(),
            };
        }
        let result = self.compute_sorted();
        if result == *self {
            self.memo().sorted.get_or_init(|| None);
            return self.clone();
        }
        result.memo().sorted.get_or_init(|| None);
        match self.memo().sorted.get_or_init(|| Some(result)) {
            None => self.clone(),
            Some(sorted) => sorted.clone(),
        }
    }

    fn compute_sorted(&self) -> RowFilter {
        let FilterKind::Group(group) = self.kind() else {
            return self.clone();
        };
        if group.children().is_empty() {
            return self.clone();
        }
        let mut children: Vec<RowFilter> =
            group.children().iter().map(RowFilter::sorted).collect();
        children.sort();
        RowFilter::group(group.op(), children)
    }

    /// True when this filter is in disjunctive normal form: a term, an
    /// `And` of terms, or an `Or` whose children are terms or `And`s of
    /// terms. Cached on the node.
    pub fn is_dnf(&self) -> bool {
        *self
            .memo()
            .is_dnf
            .get_or_init(|| self.compute_is_normal(GroupOp::Or))
    }

    /// True when this filter is in conjunctive normal form (dual of
    /// [`is_dnf`]). Cached on the node.
    ///
    /// [`is_dnf`]: RowFilter::is_dnf
    pub fn is_cnf(&self) -> bool {
        *self
            .memo()
            .is_cnf
            .get_or_init(|| self.compute_is_normal(GroupOp::And))
    }

    fn compute_is_normal(&self, outer: GroupOp) -> bool {
        fn is_term(filter: &RowFilter) -> bool {
            matches!(filter.kind(), FilterKind::Term(_))
        }

        match self.kind() {
            FilterKind::Term(_) => true,
            FilterKind::Group(group) if group.op() == outer => {
                group.children().iter().all(|child| match child.kind() {
                    FilterKind::Term(_) => true,
                    FilterKind::Group(inner) => inner.children().iter().all(is_term),
                })
            }
            // The inner kind is normal when it holds terms only.
            FilterKind::Group(group) => group.children().iter().all(is_term),
        }
    }

    /// Returns the disjunctive normal form, reducing along the way.
    ///
    /// Equivalent to [`dnf_bounded`] with no effective limit.
    ///
    /// [`dnf_bounded`]: RowFilter::dnf_bounded
    pub fn dnf(&self) -> RowFilter {
        self.dnf_bounded(u64::MAX)
    }

    /// Returns the disjunctive normal form, bounded by `limit`.
    ///
    /// `limit` caps the number of term filters a single distribution step
    /// may produce. When a step would exceed it, distribution stops and
    /// the current partial result is returned unchanged; callers detect
    /// this via [`is_dnf`] on the result. Exact normal forms are memoized.
    ///
    /// [`is_dnf`]: RowFilter::is_dnf
    pub fn dnf_bounded(&self, limit: u64) -> RowFilter {
        self.normal_bounded(GroupOp::Or, limit)
    }

    /// Returns the conjunctive normal form (dual of [`dnf`]).
    ///
    /// [`dnf`]: RowFilter::dnf
    pub fn cnf(&self) -> RowFilter {
        self.cnf_bounded(u64::MAX)
    }

    /// Returns the conjunctive normal form, bounded by `limit` (dual of
    /// [`dnf_bounded`]).
    ///
    /// [`dnf_bounded`]: RowFilter::dnf_bounded
    pub fn cnf_bounded(&self, limit: u64) -> RowFilter {
        self.normal_bounded(GroupOp::And, limit)
    }

    fn normal_slot(&self, outer: GroupOp) -> &std::sync::OnceLock<Option<RowFilter>> {
        match outer {
            GroupOp::Or => &self.memo().dnf,
            GroupOp::And => &self.memo().cnf,
        }
    }

    fn is_normal(&self, outer: GroupOp) -> bool {
        match outer {
            GroupOp::Or => self.is_dnf(),
            GroupOp::And => self.is_cnf(),
        }
    }

    fn normal_bounded(&self, outer: GroupOp, limit: u64) -> RowFilter {
        if let Some(slot) = self.normal_slot(outer).get() {
            return match slot {
                None => self.clone(),
                Some(normal) => normal.clone(),
            };
        }
        let result = self.compute_normal(outer, limit);
        if !result.is_normal(outer) {
            // Limit hit somewhere below; hand back the partial result
            // without poisoning the slot.
            debug!(
                limit,
                terms = result.num_terms(),
                "normal-form expansion aborted at limit"
            );
            return result;
        }
        if result == *self {
            self.normal_slot(outer).get_or_init(|| None);
            return self.clone();
        }
        result.normal_slot(outer).get_or_init(|| None);
        match self.normal_slot(outer).get_or_init(|| Some(result)) {
            None => self.clone(),
            Some(normal) => normal.clone(),
        }
    }

    fn compute_normal(&self, outer: GroupOp, limit: u64) -> RowFilter {
        let filter = self.reduce();
        if filter.is_normal(outer) {
            return filter;
        }
        let FilterKind::Group(group) = filter.kind() else {
            return filter; // terms are always normal
        };
        if group.op() == outer {
            // Normalize the children; flattening folds nested outer groups
            // back into this one.
            let children: Vec<RowFilter> = group
                .children()
                .iter()
                .map(|child| child.normal_bounded(outer, limit))
                .collect();
            return RowFilter::group(outer, children).reduce();
        }

        // Inner-kind group: normalize children, then distribute.
        let inner = group.op();
        let children: Vec<RowFilter> = group
            .children()
            .iter()
            .map(|child| child.normal_bounded(outer, limit))
            .collect();
        let rebuilt = RowFilter::group(inner, children).reduce();
        let FilterKind::Group(regrouped) = rebuilt.kind() else {
            return rebuilt;
        };
        if regrouped.op() != inner {
            return rebuilt.normal_bounded(outer, limit);
        }

        let mut branches: Vec<&[RowFilter]> = Vec::new();
        let mut base: Vec<RowFilter> = Vec::new();
        for child in regrouped.children() {
            match child.kind() {
                FilterKind::Group(child_group) if child_group.op() == outer => {
                    branches.push(child_group.children());
                }
                _ => base.push(child.clone()),
            }
        }
        if branches.is_empty() {
            return rebuilt;
        }

        // Expansion budget: the exact number of term filters the product
        // would contain.
        let Some(combos) = branches
            .iter()
            .try_fold(1_u128, |acc, branch| acc.checked_mul(branch.len() as u128))
        else {
            return rebuilt;
        };
        let base_terms: u128 = base.iter().map(|f| f.num_terms() as u128).sum();
        let mut total = combos.saturating_mul(base_terms);
        for branch in &branches {
            let branch_terms: u128 = branch.iter().map(|f| f.num_terms() as u128).sum();
            total = total.saturating_add((combos / branch.len() as u128).saturating_mul(branch_terms));
        }
        if total > u128::from(limit) {
            return rebuilt;
        }

        // Cartesian product over the outer-kind children.
        let mut products: Vec<RowFilter> = Vec::new();
        let mut indices = vec![0_usize; branches.len()];
        'odometer: loop {
            let mut parts = base.clone();
            for (branch, &index) in branches.iter().zip(&indices) {
                parts.push(branch[index].clone());
            }
            products.push(RowFilter::group(inner, parts).reduce());
            for position in 0..indices.len() {
                indices[position] += 1;
                if indices[position] < branches[position].len() {
                    continue 'odometer;
                }
                indices[position] = 0;
            }
            break;
        }
        RowFilter::group(outer, products).reduce()
    }
}
