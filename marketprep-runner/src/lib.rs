//! marketprep runner: pipeline orchestration, run manifest, dashboard.
//!
//! This crate builds on `marketprep-core` to provide:
//! - The end-to-end cleaning run with per-aggregate outcomes
//! - The JSON run manifest with input and artifact fingerprints
//! - The read-only dashboard query layer with content-keyed memoization
//! - CSV export of filtered views

pub mod dashboard;
pub mod export;
pub mod pipeline;
pub mod reporting;

pub use dashboard::{
    AggregatePaths, AggregateViews, CloseSummary, DashboardError, ReturnSummary, ViewCache,
    ViewFilter, VolumeSummary,
};
pub use pipeline::{
    clean_snapshot, input_fingerprint, normalize_snapshot, run_pipeline, CleanedTable,
    PipelineError, RunReport,
};
pub use reporting::{AggregateOutcome, RunManifest};
