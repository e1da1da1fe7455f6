//! Sortable tables: column-driven, direction-toggling sort over a working set.
//!
//! A table is a list of rows plus a [`SortState`]. Sorting by the active
//! column flips the direction; sorting by any other column switches to it
//! with that column's default direction. The engine is UI-free: callers
//! render whatever order the rows end up in.
//!
//! - [`country`]: the country statistics table
//! - [`timeline`]: the API request timeline table

pub mod country;
pub mod timeline;

use std::cmp::Ordering;
use std::fmt;

use feruca::Collator;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Direction and state
// ---------------------------------------------------------------------------

/// Sort direction of the active column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// The opposite direction.
    pub fn flip(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Orient an ascending comparison result. Equal stays equal, so a stable
    /// sort keeps ties in input order in both directions.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

/// Which column a table is sorted by, if any.
///
/// `Unsorted` is the initial state: the first sort request always applies the
/// column's default direction instead of toggling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortState<C> {
    Unsorted,
    Sorted { column: C, direction: SortDirection },
}

impl<C> Default for SortState<C> {
    fn default() -> Self {
        Self::Unsorted
    }
}

impl<C: Copy + Eq> SortState<C> {
    pub fn active_column(&self) -> Option<C> {
        match self {
            Self::Unsorted => None,
            Self::Sorted { column, .. } => Some(*column),
        }
    }

    pub fn direction(&self) -> Option<SortDirection> {
        match self {
            Self::Unsorted => None,
            Self::Sorted { direction, .. } => Some(*direction),
        }
    }

    /// State after a sort request for `column`.
    pub fn next(self, column: C, default_direction: SortDirection) -> Self {
        match self {
            Self::Sorted {
                column: active,
                direction,
            } if active == column => Self::Sorted {
                column,
                direction: direction.flip(),
            },
            _ => Self::Sorted {
                column,
                direction: default_direction,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

/// The value a row exposes for comparison under a given column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortKey<'a> {
    /// Compared case-insensitively, in collation order.
    Text(&'a str),
    /// Compared numerically; `None` and NaN compare as 0.
    Number(Option<f64>),
}

/// A column of a sortable table.
pub trait SortColumn: Copy + Eq + fmt::Debug {
    type Row;

    /// `false` for pseudo-columns such as the row number.
    fn is_sortable(self) -> bool;

    /// Direction applied when the column becomes active.
    fn default_direction(self) -> SortDirection {
        SortDirection::Asc
    }

    fn key<'r>(self, row: &'r Self::Row) -> SortKey<'r>;
}

/// Locale-aware, case-insensitive ordering for text keys.
///
/// Both operands are lower-cased, then compared with the Unicode collation
/// algorithm over the CLDR root tailoring, so `Côte d'Ivoire` sorts between
/// `Canada` and `Cuba`.
#[derive(Default)]
pub struct TextCollator {
    inner: Collator,
}

impl TextCollator {
    pub fn compare(&mut self, a: &str, b: &str) -> Ordering {
        let (a, b) = (a.to_lowercase(), b.to_lowercase());
        if a == b {
            return Ordering::Equal;
        }
        self.inner.collate(&a, &b)
    }
}

/// Compare two keys in ascending order.
pub fn compare_keys(collator: &mut TextCollator, a: SortKey<'_>, b: SortKey<'_>) -> Ordering {
    match (a, b) {
        (SortKey::Text(a), SortKey::Text(b)) => collator.compare(a, b),
        (SortKey::Number(a), SortKey::Number(b)) => numeric(a)
            .partial_cmp(&numeric(b))
            .unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

fn numeric(value: Option<f64>) -> f64 {
    match value {
        Some(n) if !n.is_nan() => n,
        _ => 0.0,
    }
}

// ---------------------------------------------------------------------------
// Sort engine
// ---------------------------------------------------------------------------

/// Sort `rows` in place by `column` and return the resulting state.
///
/// A non-sortable column leaves both `rows` and `state` untouched.
pub fn sort<C: SortColumn>(rows: &mut [C::Row], column: C, state: SortState<C>) -> SortState<C> {
    if !column.is_sortable() {
        return state;
    }

    let next = state.next(column, column.default_direction());
    let direction = next.direction().unwrap_or_default();

    let mut collator = TextCollator::default();
    rows.sort_by(|a, b| {
        direction.apply(compare_keys(&mut collator, column.key(a), column.key(b)))
    });

    next
}

// ---------------------------------------------------------------------------
// Table instance
// ---------------------------------------------------------------------------

/// What happens to the sort state when a fresh dataset is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadPolicy {
    /// Keep the current state; new rows stay in fetch order until the next
    /// sort request.
    Keep,
    /// Return to `Unsorted`, then apply the table's canonical sort (if any).
    Reset,
}

impl ReloadPolicy {
    pub fn from_reset_flag(reset: bool) -> Self {
        if reset { Self::Reset } else { Self::Keep }
    }
}

/// A table's working set: rows, sort state, and reload behavior.
pub struct SortedTable<C: SortColumn> {
    rows: Vec<C::Row>,
    state: SortState<C>,
    policy: ReloadPolicy,
    canonical: Option<C>,
}

impl<C: SortColumn> SortedTable<C> {
    /// An empty table. `canonical` is the column sorted on a `Reset` reload.
    pub fn new(policy: ReloadPolicy, canonical: Option<C>) -> Self {
        Self {
            rows: Vec::new(),
            state: SortState::Unsorted,
            policy,
            canonical,
        }
    }

    /// Replace the working set wholesale.
    ///
    /// The canonical sort is applied whenever the table ends up `Unsorted`:
    /// on the first load under either policy, and on every `Reset` reload.
    pub fn load(&mut self, rows: Vec<C::Row>) {
        self.rows = rows;
        if self.policy == ReloadPolicy::Reset {
            self.state = SortState::Unsorted;
        }
        if matches!(self.state, SortState::Unsorted)
            && let Some(column) = self.canonical
        {
            self.sort_by(column);
        }
    }

    /// Apply a sort request (a header click) and return the reordered rows.
    pub fn sort_by(&mut self, column: C) -> &[C::Row] {
        self.state = sort(&mut self.rows, column, self.state);
        &self.rows
    }

    pub fn rows(&self) -> &[C::Row] {
        &self.rows
    }

    pub fn state(&self) -> SortState<C> {
        self.state
    }

    pub fn policy(&self) -> ReloadPolicy {
        self.policy
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Error for an unrecognized column name or index.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown column '{input}' (expected one of: {expected})")]
pub struct UnknownColumn {
    pub input: String,
    pub expected: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Col {
        Index,
        Name,
        Score,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: &'static str,
        score: Option<f64>,
    }

    impl SortColumn for Col {
        type Row = Row;

        fn is_sortable(self) -> bool {
            self != Col::Index
        }

        fn default_direction(self) -> SortDirection {
            match self {
                Col::Score => SortDirection::Desc,
                _ => SortDirection::Asc,
            }
        }

        fn key<'r>(self, row: &'r Row) -> SortKey<'r> {
            match self {
                Col::Index => SortKey::Number(None),
                Col::Name => SortKey::Text(row.name),
                Col::Score => SortKey::Number(row.score),
            }
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { name: "b", score: Some(2.0) },
            Row { name: "A", score: None },
            Row { name: "c", score: Some(-1.0) },
        ]
    }

    fn names(rows: &[Row]) -> Vec<&'static str> {
        rows.iter().map(|r| r.name).collect()
    }

    #[test]
    fn first_sort_uses_default_direction() {
        let mut data = rows();
        let state = sort(&mut data, Col::Score, SortState::Unsorted);
        assert_eq!(
            state,
            SortState::Sorted { column: Col::Score, direction: SortDirection::Desc }
        );
        assert_eq!(names(&data), vec!["b", "A", "c"]);
    }

    #[test]
    fn same_column_toggles() {
        let mut data = rows();
        let state = sort(&mut data, Col::Name, SortState::Unsorted);
        assert_eq!(names(&data), vec!["A", "b", "c"]);
        let state = sort(&mut data, Col::Name, state);
        assert_eq!(names(&data), vec!["c", "b", "A"]);
        assert_eq!(state.direction(), Some(SortDirection::Desc));
    }

    #[test]
    fn switching_column_resets_direction() {
        let mut data = rows();
        let state = sort(&mut data, Col::Name, SortState::Unsorted);
        let state = sort(&mut data, Col::Name, state);
        let state = sort(&mut data, Col::Score, state);
        assert_eq!(state.direction(), Some(SortDirection::Desc));
        assert_eq!(state.active_column(), Some(Col::Score));
    }

    #[test]
    fn pseudo_column_is_noop() {
        let mut data = rows();
        let before = SortState::Sorted { column: Col::Name, direction: SortDirection::Asc };
        let after = sort(&mut data, Col::Index, before);
        assert_eq!(after, before);
        assert_eq!(data, rows());
    }

    #[test]
    fn empty_dataset_sorts_to_empty() {
        let mut data: Vec<Row> = Vec::new();
        let state = sort(&mut data, Col::Name, SortState::Unsorted);
        assert!(data.is_empty());
        assert_eq!(state.active_column(), Some(Col::Name));
    }

    #[test]
    fn missing_number_sorts_as_zero() {
        let mut collator = TextCollator::default();
        assert_eq!(
            compare_keys(&mut collator, SortKey::Number(None), SortKey::Number(Some(0.0))),
            Ordering::Equal
        );
        assert_eq!(
            compare_keys(&mut collator, SortKey::Number(Some(f64::NAN)), SortKey::Number(Some(1.0))),
            Ordering::Less
        );
    }

    #[test]
    fn text_comparison_ignores_case() {
        let mut collator = TextCollator::default();
        assert_eq!(
            compare_keys(&mut collator, SortKey::Text("india"), SortKey::Text("India")),
            Ordering::Equal
        );
        assert_eq!(
            compare_keys(&mut collator, SortKey::Text("alpha"), SortKey::Text("Beta")),
            Ordering::Less
        );
    }

    #[test]
    fn accented_text_sorts_next_to_its_base_letters() {
        let mut collator = TextCollator::default();
        let mut names = vec!["Cuba", "Côte d'Ivoire", "Canada", "Réunion", "Russia", "Zambia"];
        names.sort_by(|a, b| collator.compare(a, b));
        assert_eq!(
            names,
            vec!["Canada", "Côte d'Ivoire", "Cuba", "Réunion", "Russia", "Zambia"]
        );
        assert_eq!(collator.compare("ÉCOSSE", "écosse"), Ordering::Equal);
    }

    #[test]
    fn ties_keep_input_order_in_both_directions() {
        let mut data = vec![
            Row { name: "x", score: Some(1.0) },
            Row { name: "y", score: Some(1.0) },
            Row { name: "z", score: Some(5.0) },
        ];
        let state = sort(&mut data, Col::Score, SortState::Unsorted);
        assert_eq!(names(&data), vec!["z", "x", "y"]);
        sort(&mut data, Col::Score, state);
        assert_eq!(names(&data), vec!["x", "y", "z"]);
    }

    #[test]
    fn reset_policy_reapplies_canonical_sort() {
        let mut table = SortedTable::new(ReloadPolicy::Reset, Some(Col::Score));
        table.load(rows());
        table.sort_by(Col::Name);
        table.load(rows());
        assert_eq!(
            table.state(),
            SortState::Sorted { column: Col::Score, direction: SortDirection::Desc }
        );
        assert_eq!(names(table.rows()), vec!["b", "A", "c"]);
    }

    #[test]
    fn keep_policy_retains_state_and_fetch_order() {
        let mut table: SortedTable<Col> = SortedTable::new(ReloadPolicy::Keep, None);
        table.load(rows());
        table.sort_by(Col::Name);
        table.load(rows());
        assert_eq!(table.state().active_column(), Some(Col::Name));
        assert_eq!(names(table.rows()), vec!["b", "A", "c"]);

        // The retained state means the next click on the same column toggles.
        table.sort_by(Col::Name);
        assert_eq!(names(table.rows()), vec!["c", "b", "A"]);
    }

    #[test]
    fn keep_policy_applies_canonical_sort_on_first_load() {
        let mut table = SortedTable::new(ReloadPolicy::Keep, Some(Col::Score));
        table.load(rows());
        assert_eq!(
            table.state(),
            SortState::Sorted { column: Col::Score, direction: SortDirection::Desc }
        );
        assert_eq!(names(table.rows()), vec!["b", "A", "c"]);

        // Later loads keep the state and arrive in fetch order.
        table.load(rows().into_iter().rev().collect());
        assert_eq!(table.state().active_column(), Some(Col::Score));
        assert_eq!(names(table.rows()), vec!["c", "A", "b"]);
    }
}
