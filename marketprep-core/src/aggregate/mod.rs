//! Derived tables computed from the cleaned quote snapshot.
//!
//! Each aggregate reads the cleaned snapshot independently; one failing or
//! being skipped has no effect on the others.

pub mod avg_close;
pub mod avg_volume;
pub mod daily_return;

use crate::data::schema::{CLOSE_PRICE, SECTOR, TICKER, TRADE_DATE, VOLUME};
use crate::data::Snapshot;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use avg_close::{avg_close, AVG_CLOSE};
pub use avg_volume::{avg_volume, AVG_VOLUME};
pub use daily_return::{daily_return, RETURN};

/// The three aggregates produced per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateKind {
    AvgClose,
    AvgVolume,
    DailyReturn,
}

impl AggregateKind {
    pub const ALL: [AggregateKind; 3] = [
        AggregateKind::AvgClose,
        AggregateKind::AvgVolume,
        AggregateKind::DailyReturn,
    ];

    /// Columns the aggregate reads.
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            AggregateKind::AvgClose | AggregateKind::DailyReturn => {
                &[TRADE_DATE, TICKER, CLOSE_PRICE]
            }
            AggregateKind::AvgVolume => &[SECTOR, VOLUME],
        }
    }

    /// Required columns the snapshot lacks.
    pub fn missing_columns(self, snapshot: &Snapshot) -> Vec<&'static str> {
        self.required_columns()
            .iter()
            .copied()
            .filter(|c| !snapshot.has_column(c))
            .collect()
    }

    /// Compute this aggregate. `Ok(None)` means the aggregate was skipped
    /// because its inputs are absent.
    pub fn compute(self, snapshot: &Snapshot) -> Result<Option<DataFrame>, AggregateError> {
        match self {
            AggregateKind::AvgClose => avg_close(snapshot).map(Some),
            AggregateKind::AvgVolume => avg_volume(snapshot).map(Some),
            AggregateKind::DailyReturn => daily_return(snapshot),
        }
    }
}

impl fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AggregateKind::AvgClose => "avg_close",
            AggregateKind::AvgVolume => "avg_volume",
            AggregateKind::DailyReturn => "daily_return",
        };
        f.write_str(label)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// First of `columns` not present in the snapshot.
pub(crate) fn first_missing<'a>(snapshot: &Snapshot, columns: &[&'a str]) -> Option<&'a str> {
    columns.iter().copied().find(|c| !snapshot.has_column(c))
}

pub(crate) fn require_columns(snapshot: &Snapshot, columns: &[&str]) -> Result<(), AggregateError> {
    match first_missing(snapshot, columns) {
        Some(missing) => Err(AggregateError::MissingColumn(missing.to_string())),
        None => Ok(()),
    }
}
