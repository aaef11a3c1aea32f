//! Query specification envelope.
//!
//! A [`QuerySpec`] bundles what the executor needs: the projected columns,
//! the requested ordering, and the (reduced) row filter. It is a plain
//! immutable record with copy-on-change accessors.

use std::fmt::{self, Display};

use porphyry_types::{ColumnInfo, ColumnName, OrderByColumn};

use crate::filter::RowFilter;

/// Projection, order-by, and filter for one query.
///
/// A `None` projection selects every column. An empty order-by collapses
/// to `None`. Any order-by column missing from an explicit projection is
/// added to it, so the executor always materializes the columns it sorts
/// by.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    projection: Option<Vec<ColumnInfo>>,
    order_by: Option<Vec<OrderByColumn>>,
    filter: RowFilter,
}

impl QuerySpec {
    /// Creates a new query spec, normalizing the order-by and expanding
    /// the projection as needed.
    pub fn new(
        projection: Option<Vec<ColumnInfo>>,
        order_by: Option<Vec<OrderByColumn>>,
        filter: RowFilter,
    ) -> Self {
        let order_by = order_by.filter(|columns| !columns.is_empty());
        let projection = expand_projection(projection, order_by.as_deref());
        Self {
            projection,
            order_by,
            filter,
        }
    }

    /// A full scan: every column, no ordering, no filtering.
    pub fn full_scan() -> Self {
        Self::new(None, None, RowFilter::true_filter())
    }

    /// Returns the projected columns, or `None` for all columns.
    pub fn projection(&self) -> Option<&[ColumnInfo]> {
        self.projection.as_deref()
    }

    /// Returns the requested ordering, or `None` for unordered.
    pub fn order_by(&self) -> Option<&[OrderByColumn]> {
        self.order_by.as_deref()
    }

    /// Returns the row filter.
    pub fn filter(&self) -> &RowFilter {
        &self.filter
    }

    /// Returns a spec with the given projection; returns `self` unchanged
    /// when it already matches.
    pub fn with_projection(&self, projection: Option<Vec<ColumnInfo>>) -> Self {
        if self.projection == projection {
            return self.clone();
        }
        Self::new(projection, self.order_by.clone(), self.filter.clone())
    }

    /// Returns a spec with the given ordering, expanding the projection to
    /// cover it; returns `self` unchanged when it already matches.
    pub fn with_order_by(&self, order_by: Option<Vec<OrderByColumn>>) -> Self {
        let order_by = order_by.filter(|columns| !columns.is_empty());
        if self.order_by == order_by {
            return self.clone();
        }
        Self::new(self.projection.clone(), order_by, self.filter.clone())
    }

    /// Returns a spec with the given filter; returns `self` unchanged when
    /// it already matches.
    pub fn with_filter(&self, filter: RowFilter) -> Self {
        if self.filter == filter {
            return self.clone();
        }
        Self::new(self.projection.clone(), self.order_by.clone(), filter)
    }

    /// True for the unrestricted spec: all columns, no ordering, and the
    /// true filter.
    pub fn is_full_scan(&self) -> bool {
        self.projection.is_none() && self.order_by.is_none() && self.filter.is_true()
    }

    /// Returns the column names the executor keys result rows by:
    /// order-by columns first, then projected columns, each name at most
    /// once.
    pub fn primary_key(&self) -> Vec<ColumnName> {
        let mut names: Vec<ColumnName> = Vec::new();
        if let Some(order_by) = &self.order_by {
            for column in order_by {
                if !names.contains(column.column().name()) {
                    names.push(column.column().name().clone());
                }
            }
        }
        if let Some(projection) = &self.projection {
            for column in projection {
                if !names.contains(column.name()) {
                    names.push(column.name().clone());
                }
            }
        }
        names
    }
}

fn expand_projection(
    projection: Option<Vec<ColumnInfo>>,
    order_by: Option<&[OrderByColumn]>,
) -> Option<Vec<ColumnInfo>> {
    let Some(mut columns) = projection else {
        return None; // all columns already covers any ordering
    };
    if let Some(order_by) = order_by {
        for ordered in order_by {
            if !columns.iter().any(|c| c.name() == ordered.column().name()) {
                columns.push(ordered.column().clone());
            }
        }
    }
    Some(columns)
}

impl Display for QuerySpec {
    /// Renders as `{projection} filter`: order-by columns first with
    /// `+`/`-` decoration, remaining projected columns bare, `*` for a
    /// full projection. The filter text is omitted when it is the true
    /// filter, so a pure full scan is exactly `{*}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        let mut first = true;
        if let Some(order_by) = &self.order_by {
            for column in order_by {
                if !first {
                    f.write_str(", ")?;
                }
                write!(f, "{column}")?;
                first = false;
            }
        }
        match &self.projection {
            None => {
                if !first {
                    f.write_str(", ")?;
                }
                f.write_str("*")?;
            }
            Some(projection) => {
                let ordered_names: Vec<&ColumnName> = self
                    .order_by
                    .as_deref()
                    .unwrap_or(&[])
                    .iter()
                    .map(|c| c.column().name())
                    .collect();
                for column in projection {
                    if ordered_names.contains(&column.name()) {
                        continue;
                    }
                    if !first {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", column.name())?;
                    first = false;
                }
            }
        }
        f.write_str("}")?;
        if !self.filter.is_true() {
            write!(f, " {}", self.filter)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::CompareOp;
    use porphyry_types::DataType;

    fn col(name: &str) -> ColumnInfo {
        ColumnInfo::new(name, DataType::BigInt)
    }

    #[test]
    fn full_scan_renders_as_star() {
        let spec = QuerySpec::full_scan();
        assert!(spec.is_full_scan());
        assert_eq!(spec.to_string(), "{*}");
    }

    #[test]
    fn order_by_expands_projection() {
        let spec = QuerySpec::new(Some(vec![col("a")]), None, RowFilter::true_filter());
        let ordered = spec.with_order_by(Some(vec![OrderByColumn::asc(col("b"))]));
        let names: Vec<&str> = ordered
            .projection()
            .unwrap()
            .iter()
            .map(|c| c.name().as_str())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn empty_order_by_collapses_to_none() {
        let spec = QuerySpec::new(None, Some(vec![]), RowFilter::true_filter());
        assert!(spec.order_by().is_none());
        assert!(spec.is_full_scan());
    }

    #[test]
    fn with_accessors_are_copy_on_change() {
        let spec = QuerySpec::new(Some(vec![col("a")]), None, RowFilter::true_filter());
        let same = spec.with_projection(Some(vec![col("a")]));
        assert_eq!(same, spec);
        let same = spec.with_filter(RowFilter::true_filter());
        assert_eq!(same, spec);
    }

    #[test]
    fn primary_key_orders_and_dedups() {
        let spec = QuerySpec::new(
            Some(vec![col("a"), col("b")]),
            Some(vec![OrderByColumn::desc(col("b"))]),
            RowFilter::true_filter(),
        );
        let primary_key = spec.primary_key();
        let key: Vec<&str> = primary_key.iter().map(ColumnName::as_str).collect();
        assert_eq!(key, vec!["b", "a"]);
    }

    #[test]
    fn renders_decorated_projection_and_filter() {
        let filter = RowFilter::column_to_arg(col("a"), CompareOp::Eq, 1);
        let spec = QuerySpec::new(
            Some(vec![col("a")]),
            Some(vec![OrderByColumn::desc(col("b"))]),
            filter,
        );
        assert_eq!(spec.to_string(), "{-b, a} a == ?1");
    }
}
