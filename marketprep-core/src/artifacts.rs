//! Parquet artifact store.
//!
//! Layout: `{output_dir}/{file_name}` for the cleaned table and each aggregate.
//!
//! - Atomic writes (write to `{file_name}.tmp`, rename into place)
//! - Every write returns an [`ArtifactRecord`] with the file's content hash
//! - Stale artifacts can be removed when an aggregate is skipped

use crate::fingerprint::ContentHash;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What was written, and where.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub name: String,
    pub path: PathBuf,
    pub rows: usize,
    pub columns: Vec<String>,
    pub content_hash: ContentHash,
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Artifact I/O error: {0}")]
    Io(String),

    #[error("Parquet error: {0}")]
    ParquetError(String),
}

/// Directory holding the run's Parquet artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    output_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Root directory of the store.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    /// Write `frame` to `{output_dir}/{file_name}` atomically.
    pub fn write(
        &self,
        name: &str,
        file_name: &str,
        frame: &DataFrame,
    ) -> Result<ArtifactRecord, ArtifactError> {
        fs::create_dir_all(&self.output_dir)
            .map_err(|e| ArtifactError::Io(format!("failed to create dir: {e}")))?;

        let path = self.path_for(file_name);
        let tmp_path = tmp_path_for(&path);

        write_parquet(frame, &tmp_path)?;

        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            ArtifactError::Io(format!("atomic rename failed: {e}"))
        })?;

        let content_hash = ContentHash::of_file(&path)
            .map_err(|e| ArtifactError::Io(format!("hash {}: {e}", path.display())))?;

        info!(artifact = name, path = %path.display(), rows = frame.height(), "wrote artifact");

        Ok(ArtifactRecord {
            name: name.to_string(),
            path,
            rows: frame.height(),
            columns: frame
                .get_columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
            content_hash,
        })
    }

    /// Delete a previously written artifact, if any. Returns whether a file
    /// was removed.
    pub fn remove_stale(&self, file_name: &str) -> Result<bool, ArtifactError> {
        let path = self.path_for(file_name);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)
            .map_err(|e| ArtifactError::Io(format!("remove {}: {e}", path.display())))?;
        warn!(path = %path.display(), "removed stale artifact from a previous run");
        Ok(true)
    }

    /// Read a Parquet artifact back into memory.
    pub fn read(path: &Path) -> Result<DataFrame, ArtifactError> {
        let file = fs::File::open(path)
            .map_err(|e| ArtifactError::ParquetError(format!("open {}: {e}", path.display())))?;
        ParquetReader::new(file)
            .finish()
            .map_err(|e| ArtifactError::ParquetError(format!("read {}: {e}", path.display())))
    }
}

// ── Parquet I/O helpers ─────────────────────────────────────────────

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn write_parquet(df: &DataFrame, path: &Path) -> Result<(), ArtifactError> {
    let file =
        fs::File::create(path).map_err(|e| ArtifactError::ParquetError(format!("create file: {e}")))?;
    ParquetWriter::new(file)
        .finish(&mut df.clone())
        .map_err(|e| ArtifactError::ParquetError(format!("write parquet: {e}")))?;
    Ok(())
}
