//! Search/sort intent and the row projection derived from it.
//!
//! `project` is the only way rows reach the screen: it filters a snapshot by the
//! search term and then applies the sort directive, always on a fresh copy. Both
//! steps are stable, so rows that compare equal keep their snapshot order in
//! either direction.

use std::cmp::Ordering;

use strum_macros::{Display, EnumIter, EnumString};

use crate::quote::Quote;
use crate::snapshot::Snapshot;

/// Sortable table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SortKey {
    /// Ticker symbol, lexicographic.
    Symbol,
    /// Current price.
    Price,
    /// Absolute change.
    Change,
    /// Percent change.
    #[strum(to_string = "percent_change", serialize = "pct", serialize = "percentchange")]
    PercentChange,
}

impl SortKey {
    fn compare(self, a: &Quote, b: &Quote) -> Ordering {
        match self {
            SortKey::Symbol => a.symbol().cmp(b.symbol()),
            SortKey::Price => compare_f64(a.price, b.price),
            SortKey::Change => compare_f64(a.change, b.change),
            SortKey::PercentChange => compare_f64(a.percent_change, b.percent_change),
        }
    }
}

// Incomparable values count as equal so they stay where they are.
fn compare_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Sort direction for the active column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum SortDirection {
    /// Natural order.
    #[default]
    Ascending,
    /// Reverse natural order.
    Descending,
}

impl SortDirection {
    /// Arrow shown next to the active column header.
    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

/// Which column, if any, the table is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortDirective {
    /// Active column; `None` keeps snapshot order.
    pub key: Option<SortKey>,
    /// Direction for the active column.
    pub direction: SortDirection,
}

impl SortDirective {
    /// Sort by `key` in `direction`.
    pub fn by(key: SortKey, direction: SortDirection) -> Self {
        SortDirective {
            key: Some(key),
            direction,
        }
    }

    /// Directive after a header click on `key`.
    ///
    /// A click on the active column while ascending flips it to descending;
    /// every other click selects `key` ascending. Once a column is chosen the
    /// directive never goes back to unsorted.
    pub fn click(self, key: SortKey) -> Self {
        let direction = if self.key == Some(key) && self.direction == SortDirection::Ascending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        SortDirective::by(key, direction)
    }
}

/// User-controlled filter and sort intent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    /// Case-insensitive substring matched against symbols; empty keeps all rows.
    pub search: String,
    /// Active sort.
    pub sort: SortDirective,
}

impl ViewState {
    /// Replace the search term.
    pub fn set_search(&mut self, text: &str) {
        self.search = text.to_string();
    }

    /// Apply a header click on `key`.
    pub fn click_sort(&mut self, key: SortKey) {
        self.sort = self.sort.click(key);
    }
}

/// Derive the displayed rows from `snapshot` under `view`.
pub fn project(snapshot: &Snapshot, view: &ViewState) -> Vec<Quote> {
    let needle = view.search.to_lowercase();
    let mut rows: Vec<Quote> = snapshot
        .quotes()
        .iter()
        .filter(|quote| needle.is_empty() || quote.symbol().as_str().to_lowercase().contains(&needle))
        .cloned()
        .collect();

    if let Some(key) = view.sort.key {
        match view.sort.direction {
            SortDirection::Ascending => rows.sort_by(|a, b| key.compare(a, b)),
            SortDirection::Descending => rows.sort_by(|a, b| key.compare(a, b).reverse()),
        }
    }
    rows
}
