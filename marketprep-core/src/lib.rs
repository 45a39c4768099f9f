//! marketprep core: cleaning stages, aggregates, artifacts, configuration.
//!
//! This crate contains the single-pass batch logic for daily quote files:
//! - Immutable table snapshots with per-column type tags
//! - Loader, header, text, date, schema and dedupe stages
//! - The three aggregates (average close, average volume, daily return)
//! - Parquet artifact store with content fingerprints
//! - TOML pipeline configuration

pub mod aggregate;
pub mod artifacts;
pub mod config;
pub mod data;
pub mod fingerprint;
