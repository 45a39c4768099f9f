//! End-to-end cleaning run.
//!
//! Stage order is fixed: load → headers → text → dates → schema → dedupe →
//! write cleaned → aggregates → manifest. Load, stage and cleaned-artifact
//! errors abort the run. Each aggregate is attempted independently and its
//! outcome (written, skipped or failed) is recorded in the manifest.

use chrono::Utc;
use marketprep_core::aggregate::AggregateKind;
use marketprep_core::artifacts::{ArtifactError, ArtifactStore};
use marketprep_core::config::PipelineConfig;
use marketprep_core::data::{
    normalize_headers, normalize_text, Canonicalizer, ColumnKind, DataError, DataIngestor,
    DateColumnOutcome, DateNormalization, QuoteSchema, Snapshot,
};
use marketprep_core::fingerprint::ContentHash;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::reporting::{
    write_manifest, AggregateOutcome, AggregateReport, ColumnEntry, InputFingerprint, RowCounts,
    RunManifest, MANIFEST_FILE, MANIFEST_SCHEMA_VERSION,
};

/// Fatal pipeline errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("data error: {0}")]
    Data(#[from] DataError),

    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("fingerprint {path}: {source}")]
    Fingerprint {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("manifest error: {0}")]
    Manifest(String),
}

/// The cleaned table plus the bookkeeping gathered on the way.
#[derive(Debug, Clone)]
pub struct CleanedTable {
    pub snapshot: Snapshot,
    pub raw_rows: usize,
    pub duplicates_removed: usize,
    pub date_outcomes: Vec<DateColumnOutcome>,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub manifest: RunManifest,
    pub manifest_path: PathBuf,
}

/// BLAKE3 of the raw input bytes.
pub fn input_fingerprint(path: &Path) -> Result<ContentHash, PipelineError> {
    ContentHash::of_file(path).map_err(|source| PipelineError::Fingerprint {
        path: path.display().to_string(),
        source,
    })
}

/// Header, text and date normalization. Nothing is cast or dropped yet.
pub fn normalize_snapshot(
    raw: &Snapshot,
    config: &PipelineConfig,
) -> Result<DateNormalization, PipelineError> {
    let headers = normalize_headers(raw)?;
    let text = normalize_text(&headers, &config.text.null_tokens)?;
    info!(
        stage = "text",
        text_columns = text.columns_of_kind(ColumnKind::Text).len(),
        "normalized text columns"
    );
    Ok(config.dates.normalizer().normalize(&text)?)
}

/// Run every cleaning stage over a loaded snapshot.
pub fn clean_snapshot(
    raw: &Snapshot,
    config: &PipelineConfig,
) -> Result<CleanedTable, PipelineError> {
    let DateNormalization { snapshot, outcomes } = normalize_snapshot(raw, config)?;

    let typed = QuoteSchema::enforce(&snapshot)?;
    QuoteSchema::validate(typed.frame()).map_err(DataError::from)?;

    let cleaned = Canonicalizer::dedupe(&typed)?;
    let duplicates_removed = typed.height() - cleaned.height();

    Ok(CleanedTable {
        snapshot: cleaned,
        raw_rows: raw.height(),
        duplicates_removed,
        date_outcomes: outcomes,
    })
}

/// Load, clean, persist and aggregate the configured input.
pub fn run_pipeline(config: &PipelineConfig) -> Result<RunReport, PipelineError> {
    let input = &config.paths.input;
    let raw = DataIngestor::new(config.csv.infer_schema_length).ingest_csv(input)?;
    let input_hash = input_fingerprint(input)?;

    let cleaned = clean_snapshot(&raw, config)?;
    info!(
        stage = "clean",
        raw_rows = cleaned.raw_rows,
        rows = cleaned.snapshot.height(),
        duplicates_removed = cleaned.duplicates_removed,
        "cleaned input"
    );

    let store = ArtifactStore::new(&config.paths.output_dir);
    let cleaned_record = store.write("cleaned", &config.paths.cleaned, cleaned.snapshot.frame())?;

    let mut aggregates = Vec::with_capacity(AggregateKind::ALL.len());
    for kind in AggregateKind::ALL {
        let outcome = run_aggregate(&store, config, kind, &cleaned.snapshot)?;
        aggregates.push(AggregateReport { kind, outcome });
    }

    let manifest = RunManifest {
        schema_version: MANIFEST_SCHEMA_VERSION,
        generated_at: Utc::now(),
        input: InputFingerprint {
            path: input.clone(),
            content_hash: input_hash,
        },
        rows: RowCounts {
            raw: cleaned.raw_rows,
            cleaned: cleaned.snapshot.height(),
            duplicates_removed: cleaned.duplicates_removed,
        },
        columns: cleaned
            .snapshot
            .tagged_columns()
            .into_iter()
            .map(|(name, kind)| ColumnEntry { name, kind })
            .collect(),
        date_policy: config.dates.policy,
        date_columns: cleaned.date_outcomes,
        cleaned: cleaned_record,
        aggregates,
    };

    let manifest_path = store.path_for(MANIFEST_FILE);
    write_manifest(&manifest_path, &manifest)
        .map_err(|e| PipelineError::Manifest(format!("{e:#}")))?;
    info!(path = %manifest_path.display(), "wrote run manifest");

    Ok(RunReport {
        manifest,
        manifest_path,
    })
}

/// Compute and persist one aggregate. Only a failure to clear a stale
/// artifact is fatal; compute and write errors become a `Failed` outcome.
fn run_aggregate(
    store: &ArtifactStore,
    config: &PipelineConfig,
    kind: AggregateKind,
    snapshot: &Snapshot,
) -> Result<AggregateOutcome, PipelineError> {
    let file_name = config.paths.aggregate_file(kind);

    let outcome = match kind.compute(snapshot) {
        Ok(Some(frame)) => match store.write(&kind.to_string(), file_name, &frame) {
            Ok(record) => return Ok(AggregateOutcome::Written(record)),
            Err(e) => AggregateOutcome::Failed {
                error: e.to_string(),
            },
        },
        Ok(None) => AggregateOutcome::Skipped {
            reason: format!(
                "missing column(s): {}",
                kind.missing_columns(snapshot).join(", ")
            ),
        },
        Err(e) => AggregateOutcome::Failed {
            error: e.to_string(),
        },
    };

    match &outcome {
        AggregateOutcome::Skipped { reason } => {
            warn!(aggregate = %kind, reason = %reason, "aggregate skipped")
        }
        AggregateOutcome::Failed { error } => {
            warn!(aggregate = %kind, error = %error, "aggregate failed")
        }
        AggregateOutcome::Written(_) => {}
    }

    // No artifact from an earlier run survives a skipped or failed aggregate.
    store.remove_stale(file_name)?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketprep_core::data::DateLayout;
    use polars::prelude::*;

    #[test]
    fn clean_snapshot_counts_duplicates() {
        let raw = df!(
            " Trade Date " => &["01/02/2023", "01/02/2023", "01/03/2023"],
            "Ticker" => &["AAPL", "AAPL", "aapl "],
            "Close Price" => &["100.0", "100.0", "110.0"],
        )
        .unwrap();

        let cleaned = clean_snapshot(&Snapshot::new(raw), &PipelineConfig::default()).unwrap();

        assert_eq!(cleaned.raw_rows, 3);
        assert_eq!(cleaned.duplicates_removed, 1);
        assert_eq!(cleaned.snapshot.height(), 2);
        assert_eq!(
            cleaned.date_outcomes,
            vec![DateColumnOutcome {
                column: "trade_date".into(),
                layout: Some(DateLayout::MonthFirst),
            }]
        );
        let closes = cleaned.snapshot.frame().column("close_price").unwrap();
        assert_eq!(closes.dtype(), &DataType::Float64);
    }

    #[test]
    fn missing_input_is_a_data_error() {
        let mut config = PipelineConfig::default();
        config.paths.input = PathBuf::from("/definitely/not/here.csv");
        assert!(matches!(
            run_pipeline(&config),
            Err(PipelineError::Data(DataError::IngestFailed(_)))
        ));
    }
}
