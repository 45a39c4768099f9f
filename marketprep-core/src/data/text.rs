//! Text cleaning: trim, lowercase, and fold null-like tokens into `"null"`.
//!
//! The replacement is the literal *string* `"null"`, not a missing value.
//! Cells that are already missing stay missing.

use crate::data::ingest::DataError;
use crate::data::table::{ColumnKind, Snapshot};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Tokens treated as "no data" when the source CSV does not say so itself.
pub const DEFAULT_NULL_TOKENS: [&str; 6] = ["", " ", "na", "n/a", "null", "-"];

/// Literal written in place of any null-equivalent token.
pub const NULL_MARKER: &str = "null";

/// Set of null-equivalent tokens, stored trimmed and lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct NullTokens(BTreeSet<String>);

impl NullTokens {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            tokens
                .into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .collect(),
        )
    }

    /// Whether an already trimmed and lowercased value is null-equivalent.
    pub fn contains(&self, normalized: &str) -> bool {
        self.0.contains(normalized)
    }

    /// Trim and lowercase a cell, folding null-equivalent values to [`NULL_MARKER`].
    pub fn normalize_cell(&self, raw: &str) -> String {
        let cleaned = raw.trim().to_lowercase();
        if self.contains(&cleaned) {
            NULL_MARKER.to_string()
        } else {
            cleaned
        }
    }
}

impl Default for NullTokens {
    fn default() -> Self {
        Self::new(DEFAULT_NULL_TOKENS)
    }
}

impl From<Vec<String>> for NullTokens {
    fn from(tokens: Vec<String>) -> Self {
        Self::new(tokens)
    }
}

impl From<NullTokens> for Vec<String> {
    fn from(tokens: NullTokens) -> Self {
        tokens.0.into_iter().collect()
    }
}

/// Apply [`NullTokens::normalize_cell`] to every text column.
pub fn normalize_text(snapshot: &Snapshot, tokens: &NullTokens) -> Result<Snapshot, DataError> {
    let mut frame = snapshot.frame().clone();

    for name in snapshot.columns_of_kind(ColumnKind::Text) {
        let cleaned: Vec<Option<String>> = frame
            .column(&name)?
            .str()?
            .into_iter()
            .map(|cell| cell.map(|raw| tokens.normalize_cell(raw)))
            .collect();
        frame.with_column(Column::new(name.as_str().into(), cleaned))?;
    }

    Ok(Snapshot::new(frame))
}
