//! Date normalization for trade-date columns.
//!
//! Columns are selected by name (canonical name contains the hint, `"trade"`
//! by default) and must be tagged as text. Each column is parsed strictly
//! against a fixed list of candidate layouts; the first layout that parses
//! every present cell wins and the column is rewritten as ISO `YYYY-MM-DD`.
//! A column no layout accepts is left as text and reported.

use crate::data::ingest::DataError;
use crate::data::table::{ColumnKind, Snapshot};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// Canonical output layout.
pub const ISO_FORMAT: &str = "%Y-%m-%d";

/// Candidate layouts for free-form trade dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateLayout {
    /// `YYYY-MM-DD`
    Iso,
    /// `MM/DD/YYYY`
    MonthFirst,
    /// `DD/MM/YYYY`
    DayFirst,
}

impl DateLayout {
    /// Candidates in the order they are tried.
    pub const CANDIDATES: [DateLayout; 3] =
        [DateLayout::Iso, DateLayout::MonthFirst, DateLayout::DayFirst];

    /// chrono format string for this layout.
    pub fn pattern(self) -> &'static str {
        match self {
            DateLayout::Iso => ISO_FORMAT,
            DateLayout::MonthFirst => "%m/%d/%Y",
            DateLayout::DayFirst => "%d/%m/%Y",
        }
    }
}

impl fmt::Display for DateLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DateLayout::Iso => "YYYY-MM-DD",
            DateLayout::MonthFirst => "MM/DD/YYYY",
            DateLayout::DayFirst => "DD/MM/YYYY",
        };
        f.write_str(label)
    }
}

/// How candidate layouts are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateParsePolicy {
    /// Try each candidate in order.
    #[default]
    Ordered,
    /// Every attempt parses with `MM/DD/YYYY`, whatever the candidate.
    /// Reproduces the historical behaviour of the quote cleaner, where only
    /// month-first dates were ever recognised.
    LegacyUsOnly,
}

impl DateParsePolicy {
    fn layout_for_attempt(self, candidate: DateLayout) -> DateLayout {
        match self {
            DateParsePolicy::Ordered => candidate,
            DateParsePolicy::LegacyUsOnly => DateLayout::MonthFirst,
        }
    }
}

/// Result of normalizing one selected column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateColumnOutcome {
    pub column: String,
    /// Layout that parsed the column, `None` if it was left as text or had
    /// no present cells to parse.
    pub layout: Option<DateLayout>,
}

impl DateColumnOutcome {
    pub fn parsed(&self) -> bool {
        self.layout.is_some()
    }
}

/// Output of [`DateNormalizer::normalize`].
#[derive(Debug, Clone)]
pub struct DateNormalization {
    pub snapshot: Snapshot,
    pub outcomes: Vec<DateColumnOutcome>,
}

/// Rewrites trade-date columns into ISO form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateNormalizer {
    column_hint: String,
    policy: DateParsePolicy,
}

impl DateNormalizer {
    pub fn new(column_hint: impl Into<String>, policy: DateParsePolicy) -> Self {
        Self {
            column_hint: column_hint.into(),
            policy,
        }
    }

    pub fn policy(&self) -> DateParsePolicy {
        self.policy
    }

    /// Text columns whose name contains the hint.
    pub fn select_columns(&self, snapshot: &Snapshot) -> Vec<String> {
        snapshot
            .columns_of_kind(ColumnKind::Text)
            .into_iter()
            .filter(|name| name.contains(&self.column_hint))
            .collect()
    }

    /// Normalize every selected column. Unparseable columns are not an error.
    pub fn normalize(&self, snapshot: &Snapshot) -> Result<DateNormalization, DataError> {
        let mut frame = snapshot.frame().clone();
        let mut outcomes = Vec::new();

        for name in self.select_columns(snapshot) {
            let parsed = {
                let values = frame.column(&name)?.str()?;
                self.parse_column(values)
            };

            match parsed {
                Some((layout, dates)) => {
                    info!(column = %name, layout = %layout, "parsed date column");
                    let iso: Vec<Option<String>> = dates
                        .into_iter()
                        .map(|d| d.map(|d| d.format(ISO_FORMAT).to_string()))
                        .collect();
                    frame.with_column(Column::new(name.as_str().into(), iso))?;
                    outcomes.push(DateColumnOutcome {
                        column: name,
                        layout: Some(layout),
                    });
                }
                None => {
                    warn!(column = %name, "could not parse date column; leaving as text");
                    outcomes.push(DateColumnOutcome {
                        column: name,
                        layout: None,
                    });
                }
            }
        }

        Ok(DateNormalization {
            snapshot: Snapshot::new(frame),
            outcomes,
        })
    }

    /// First candidate layout that parses every present cell. A column with
    /// no present cells matches nothing.
    fn parse_column(&self, values: &StringChunked) -> Option<(DateLayout, Vec<Option<NaiveDate>>)> {
        if values.null_count() == values.len() {
            return None;
        }
        DateLayout::CANDIDATES.iter().find_map(|&candidate| {
            let layout = self.policy.layout_for_attempt(candidate);
            parse_strict(values, layout).map(|dates| (layout, dates))
        })
    }
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self::new("trade", DateParsePolicy::default())
    }
}

/// Parse every present cell with one layout; `None` if any cell fails.
fn parse_strict(values: &StringChunked, layout: DateLayout) -> Option<Vec<Option<NaiveDate>>> {
    values
        .into_iter()
        .map(|cell| match cell {
            None => Some(None),
            Some(raw) => NaiveDate::parse_from_str(raw, layout.pattern()).ok().map(Some),
        })
        .collect()
}
