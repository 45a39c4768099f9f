//! Read-only query layer over the aggregate artifacts.
//!
//! `(aggregate tables, filter) → filtered view`, with the loaded tables
//! memoized by the content hash of the artifact files.

pub mod cache;
pub mod filter;
pub mod summary;
pub mod views;

use marketprep_core::aggregate::AggregateKind;
use marketprep_core::artifacts::ArtifactError;
use marketprep_core::config::PathsConfig;
use polars::prelude::PolarsError;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use cache::ViewCache;
pub use filter::{filter_avg_close, filter_returns, ViewFilter, DEFAULT_TICKER_COUNT};
pub use summary::{CloseSummary, ReturnSummary, VolumeSummary};
pub use views::{AggregateViews, AvgCloseRow, DailyReturnRow, SectorVolumeRow, Tab};

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("{artifact} is missing required column '{column}'")]
    MissingColumn { artifact: String, column: String },

    #[error("fingerprint {path}: {source}")]
    Fingerprint {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Locations of the three aggregate artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatePaths {
    pub avg_close: PathBuf,
    pub avg_volume: PathBuf,
    pub daily_return: PathBuf,
}

impl AggregatePaths {
    pub fn from_config(paths: &PathsConfig) -> Self {
        Self {
            avg_close: paths.aggregate_path(AggregateKind::AvgClose),
            avg_volume: paths.aggregate_path(AggregateKind::AvgVolume),
            daily_return: paths.aggregate_path(AggregateKind::DailyReturn),
        }
    }

    pub fn get(&self, kind: AggregateKind) -> &Path {
        match kind {
            AggregateKind::AvgClose => &self.avg_close,
            AggregateKind::AvgVolume => &self.avg_volume,
            AggregateKind::DailyReturn => &self.daily_return,
        }
    }
}
