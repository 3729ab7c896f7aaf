//! Human-readable description of a filter set.

use crate::models::FilterSet;

/// Text used when no filter is set.
pub const ALL_FILTERS: &str = "All filters";

/// Placeholder for an open date bound.
const OPEN_BOUND: &str = "...";

/// Separator between clauses.
const CLAUSE_SEPARATOR: &str = " | ";

/// Describes `filters` for the report header.
///
/// The kind clause always comes first. `Type: All` stands in for a missing
/// kind when a date bound is set, and [`ALL_FILTERS`] is returned only when
/// nothing is set.
///
/// ```
/// use gym_finance::export::describe;
/// use gym_finance::models::{FilterSet, NaiveDate};
///
/// let filters = FilterSet::new().date_range(
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
/// );
/// assert_eq!(describe(&filters), "Type: All | Date: 2024-01-01 -> 2024-01-31");
/// ```
#[must_use]
pub fn describe(filters: &FilterSet) -> String {
    if filters.is_empty() {
        return ALL_FILTERS.to_owned();
    }
    let kind = filters.kind.map_or("All", |kind| kind.label());
    let mut clauses = vec![format!("Type: {kind}")];
    if filters.start_date.is_some() || filters.end_date.is_some() {
        let start = filters
            .start_date
            .map_or_else(|| OPEN_BOUND.to_owned(), |date| date.to_string());
        let end = filters
            .end_date
            .map_or_else(|| OPEN_BOUND.to_owned(), |date| date.to_string());
        clauses.push(format!("Date: {start} -> {end}"));
    }
    clauses.join(CLAUSE_SEPARATOR)
}
