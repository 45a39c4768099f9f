//! Run manifest export (JSON).

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use marketprep_core::aggregate::AggregateKind;
use marketprep_core::artifacts::ArtifactRecord;
use marketprep_core::data::{ColumnKind, DateColumnOutcome, DateParsePolicy};
use marketprep_core::fingerprint::ContentHash;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current manifest schema version. Newer versions are rejected on load.
pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: u32,
    /// Wall-clock time of the run. Not part of any content hash.
    pub generated_at: DateTime<Utc>,
    pub input: InputFingerprint,
    pub rows: RowCounts,
    pub columns: Vec<ColumnEntry>,
    pub date_policy: DateParsePolicy,
    pub date_columns: Vec<DateColumnOutcome>,
    pub cleaned: ArtifactRecord,
    pub aggregates: Vec<AggregateReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputFingerprint {
    pub path: PathBuf,
    pub content_hash: ContentHash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowCounts {
    pub raw: usize,
    pub cleaned: usize,
    pub duplicates_removed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnEntry {
    pub name: String,
    pub kind: ColumnKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub kind: AggregateKind,
    pub outcome: AggregateOutcome,
}

/// What happened to one aggregate during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AggregateOutcome {
    Written(ArtifactRecord),
    Skipped { reason: String },
    Failed { error: String },
}

impl AggregateOutcome {
    pub fn record(&self) -> Option<&ArtifactRecord> {
        match self {
            AggregateOutcome::Written(record) => Some(record),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AggregateOutcome::Written(_) => "written",
            AggregateOutcome::Skipped { .. } => "skipped",
            AggregateOutcome::Failed { .. } => "failed",
        }
    }
}

impl RunManifest {
    pub fn aggregate(&self, kind: AggregateKind) -> Option<&AggregateOutcome> {
        self.aggregates
            .iter()
            .find(|r| r.kind == kind)
            .map(|r| &r.outcome)
    }

    pub fn has_failures(&self) -> bool {
        self.aggregates
            .iter()
            .any(|r| matches!(r.outcome, AggregateOutcome::Failed { .. }))
    }
}

pub fn write_manifest(path: &Path, manifest: &RunManifest) -> Result<()> {
    let json =
        serde_json::to_string_pretty(manifest).context("Failed to serialize run manifest")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write manifest to {}", path.display()))?;
    Ok(())
}

pub fn read_manifest(path: &Path) -> Result<RunManifest> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    let manifest: RunManifest =
        serde_json::from_str(&json).context("Failed to deserialize run manifest")?;
    if manifest.schema_version > MANIFEST_SCHEMA_VERSION {
        bail!(
            "unsupported manifest schema version {} (max supported: {})",
            manifest.schema_version,
            MANIFEST_SCHEMA_VERSION
        );
    }
    Ok(manifest)
}
