//! Header normalization: `" Close Price ($) "` becomes `"close_price_"`.

use crate::data::ingest::DataError;
use crate::data::table::Snapshot;
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use std::collections::HashMap;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").unwrap());

/// Canonical form of a raw header: trimmed, lowercased, and every run of
/// non-word characters collapsed to a single underscore.
pub fn canonical_name(raw: &str) -> String {
    NON_WORD
        .replace_all(&raw.trim().to_lowercase(), "_")
        .into_owned()
}

/// Rename every column to its canonical name. Order and data are unchanged.
///
/// Two source columns that collapse onto the same canonical name are
/// rejected with [`DataError::DuplicateColumn`].
pub fn normalize_headers(snapshot: &Snapshot) -> Result<Snapshot, DataError> {
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut columns = Vec::with_capacity(snapshot.width());

    for column in snapshot.frame().get_columns() {
        let original = column.name().to_string();
        let canonical = canonical_name(&original);
        if let Some(first) = seen.insert(canonical.clone(), original.clone()) {
            return Err(DataError::DuplicateColumn {
                canonical,
                first,
                second: original,
            });
        }
        columns.push(column.clone().with_name(canonical.into()));
    }

    Ok(Snapshot::new(DataFrame::new(columns)?))
}
