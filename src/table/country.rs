//! Country statistics table.

use std::fmt;
use std::str::FromStr;

use super::{SortColumn, SortKey, TextCollator, UnknownColumn};
use crate::model::CountryRecord;

/// Columns of the country table, in display order. Index 0 is the row
/// number and cannot be sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountryColumn {
    RowNumber,
    Country,
    TotalCases,
    NewCases,
    TotalDeaths,
    TotalRecovered,
    ActiveCases,
}

impl CountryColumn {
    pub const ALL: [CountryColumn; 7] = [
        Self::RowNumber,
        Self::Country,
        Self::TotalCases,
        Self::NewCases,
        Self::TotalDeaths,
        Self::TotalRecovered,
        Self::ActiveCases,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&c| c == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Name accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::RowNumber => "row",
            Self::Country => "country",
            Self::TotalCases => "total-cases",
            Self::NewCases => "new-cases",
            Self::TotalDeaths => "total-deaths",
            Self::TotalRecovered => "total-recovered",
            Self::ActiveCases => "active-cases",
        }
    }

    /// Table header text.
    pub fn header(self) -> &'static str {
        match self {
            Self::RowNumber => "#",
            Self::Country => "Country",
            Self::TotalCases => "Total Cases",
            Self::NewCases => "New Cases",
            Self::TotalDeaths => "Deaths",
            Self::TotalRecovered => "Recovered",
            Self::ActiveCases => "Active",
        }
    }
}

impl SortColumn for CountryColumn {
    type Row = CountryRecord;

    fn is_sortable(self) -> bool {
        self != Self::RowNumber
    }

    fn key<'r>(self, row: &'r CountryRecord) -> SortKey<'r> {
        let number = |n: Option<i64>| SortKey::Number(n.map(|v| v as f64));
        match self {
            Self::RowNumber => SortKey::Number(None),
            Self::Country => SortKey::Text(&row.country),
            Self::TotalCases => number(row.total_cases),
            Self::NewCases => number(row.new_cases),
            Self::TotalDeaths => number(row.total_deaths),
            Self::TotalRecovered => number(row.total_recovered),
            Self::ActiveCases => number(row.active_cases),
        }
    }
}

impl fmt::Display for CountryColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts a column name (`total-cases`, `total_cases`, `totalcases`) or its
/// display index (`2`).
impl FromStr for CountryColumn {
    type Err = UnknownColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['_', '-'], "");
        if let Ok(index) = wanted.parse::<usize>()
            && let Some(column) = Self::from_index(index)
        {
            return Ok(column);
        }
        Self::ALL
            .into_iter()
            .find(|c| c.name().replace('-', "") == wanted)
            .ok_or_else(|| UnknownColumn {
                input: s.to_string(),
                expected: Self::ALL.map(Self::name).join(", "),
            })
    }
}

/// Records whose name contains `query`, ignoring case, in table order.
pub fn filter_countries<'a>(rows: &'a [CountryRecord], query: &str) -> Vec<&'a CountryRecord> {
    let needle = query.trim().to_lowercase();
    rows.iter()
        .filter(|r| r.country.to_lowercase().contains(&needle))
        .collect()
}

/// Country names in case-insensitive alphabetical order, for pickers.
pub fn country_names(rows: &[CountryRecord]) -> Vec<&str> {
    let mut names: Vec<&str> = rows.iter().map(|r| r.country.as_str()).collect();
    let mut collator = TextCollator::default();
    names.sort_by(|a, b| collator.compare(a, b));
    names
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
