use crate::data::ingest::DataError;
use crate::data::table::Snapshot;
use polars::prelude::*;
use tracing::info;

/// Row-level canonicalization of the cleaned table.
pub struct Canonicalizer;

impl Canonicalizer {
    /// Drop rows identical across every column, keeping first occurrences
    /// in their original order.
    pub fn dedupe(snapshot: &Snapshot) -> Result<Snapshot, DataError> {
        let before = snapshot.height();
        let frame = snapshot
            .frame()
            .clone()
            .lazy()
            .unique_stable(None, UniqueKeepStrategy::First)
            .collect()?;

        info!(
            rows = frame.height(),
            removed = before - frame.height(),
            "removed duplicate rows"
        );
        Ok(Snapshot::new(frame))
    }
}
