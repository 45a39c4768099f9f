use crate::data::table::Snapshot;
use polars::prelude::*;
use std::path::Path;
use tracing::info;

/// Default number of rows scanned when inferring CSV column types.
pub const DEFAULT_INFER_SCHEMA_LENGTH: usize = 10_000;

/// Loader for raw quote files.
pub struct DataIngestor {
    infer_schema_length: usize,
}

impl DataIngestor {
    pub fn new(infer_schema_length: usize) -> Self {
        Self {
            infer_schema_length,
        }
    }

    /// Ingest a CSV file with a header row. Column types are inferred.
    ///
    /// Any I/O or parse failure is returned as [`DataError::IngestFailed`];
    /// there is no partial load.
    pub fn ingest_csv(&self, path: &Path) -> Result<Snapshot, DataError> {
        if !path.is_file() {
            return Err(DataError::IngestFailed(format!(
                "{}: file not found",
                path.display()
            )));
        }

        let frame = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .finish()
            .and_then(|lf| lf.collect())
            .map_err(|e| DataError::IngestFailed(format!("{}: {e}", path.display())))?;

        info!(
            path = %path.display(),
            rows = frame.height(),
            columns = frame.width(),
            "loaded raw quotes"
        );
        Ok(Snapshot::new(frame))
    }
}

impl Default for DataIngestor {
    fn default() -> Self {
        Self::new(DEFAULT_INFER_SCHEMA_LENGTH)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Ingest failed: {0}")]
    IngestFailed(String),

    #[error("Columns '{first}' and '{second}' both normalize to '{canonical}'")]
    DuplicateColumn {
        canonical: String,
        first: String,
        second: String,
    },

    #[error("Schema check failed: {0}")]
    Schema(#[from] crate::data::schema::SchemaError),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::ColumnKind;
    use std::fs;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn write_temp_csv(content: &str) -> std::path::PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "marketprep_ingest_{}_{id}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("quotes.csv");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn ingest_infers_column_kinds() {
        let path = write_temp_csv(
            "Trade Date,Ticker,Close Price,Volume\n2023-01-01,AAPL,100.5,1000\n2023-01-02,AAPL,101.0,1200\n",
        );

        let snap = DataIngestor::default().ingest_csv(&path).unwrap();

        assert_eq!(snap.height(), 2);
        assert_eq!(snap.kind("Trade Date"), Some(ColumnKind::Text));
        assert_eq!(snap.kind("Close Price"), Some(ColumnKind::Float));
        assert_eq!(snap.kind("Volume"), Some(ColumnKind::Integer));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn missing_file_is_an_ingest_error() {
        let path = std::env::temp_dir().join("marketprep_definitely_missing.csv");
        let err = DataIngestor::default().ingest_csv(&path).unwrap_err();
        assert!(matches!(err, DataError::IngestFailed(_)));
    }

    #[test]
    fn ragged_rows_fail_the_load() {
        let path = write_temp_csv("a,b\n1,2\n3,4,5,6\n");

        let result = DataIngestor::default().ingest_csv(&path);
        assert!(matches!(result, Err(DataError::IngestFailed(_))));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
