//! Memoized aggregate views, keyed by the content of the artifact files.

use super::views::AggregateViews;
use super::{AggregatePaths, DashboardError};
use marketprep_core::aggregate::AggregateKind;
use marketprep_core::fingerprint::ContentHash;
use std::sync::Arc;
use tracing::debug;

/// Holds the most recently loaded views. A reload happens only when the
/// combined hash of the three artifacts changes.
#[derive(Debug, Default)]
pub struct ViewCache {
    entry: Option<(ContentHash, Arc<AggregateViews>)>,
    loads: usize,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Combined BLAKE3 identity of the artifact files. An absent optional
    /// artifact contributes a fixed marker, so deleting it changes the
    /// identity too.
    pub fn identity(paths: &AggregatePaths) -> Result<ContentHash, DashboardError> {
        let mut hasher = blake3::Hasher::new();
        for kind in AggregateKind::ALL {
            let path = paths.get(kind);
            hasher.update(kind.to_string().as_bytes());
            if path.exists() {
                let hash = ContentHash::of_file(path).map_err(|source| {
                    DashboardError::Fingerprint {
                        path: path.display().to_string(),
                        source,
                    }
                })?;
                hasher.update(hash.as_str().as_bytes());
            } else {
                hasher.update(b"absent");
            }
        }
        Ok(ContentHash(hasher.finalize().to_hex().to_string()))
    }

    /// Views for the current artifacts, loading them only if their identity
    /// differs from the cached entry.
    pub fn get(&mut self, paths: &AggregatePaths) -> Result<Arc<AggregateViews>, DashboardError> {
        let identity = Self::identity(paths)?;
        if let Some((cached, views)) = &self.entry {
            if *cached == identity {
                debug!(identity = %identity, "view cache hit");
                return Ok(Arc::clone(views));
            }
        }

        let views = Arc::new(AggregateViews::load(paths)?);
        self.loads += 1;
        self.entry = Some((identity, Arc::clone(&views)));
        Ok(views)
    }

    /// Number of times the artifacts were actually read.
    pub fn loads(&self) -> usize {
        self.loads
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}
