//! Run reporting: the JSON manifest written next to the artifacts.

pub mod manifest;

pub use manifest::{
    read_manifest, write_manifest, AggregateOutcome, AggregateReport, ColumnEntry,
    InputFingerprint, RowCounts, RunManifest, MANIFEST_FILE, MANIFEST_SCHEMA_VERSION,
};
