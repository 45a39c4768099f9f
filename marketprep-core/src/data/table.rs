//! Immutable table snapshots passed from one cleaning stage to the next.
//!
//! A [`Snapshot`] pairs a polars `DataFrame` with a [`ColumnKind`] tag per
//! column. Tags are derived once when the snapshot is built; stages consult
//! the tags instead of matching on dtypes themselves.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Coarse type tag for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Text,
    Integer,
    Float,
    Boolean,
    Date,
    Other,
}

impl ColumnKind {
    /// Classify a polars dtype.
    pub fn of(dtype: &DataType) -> Self {
        match dtype {
            DataType::String => ColumnKind::Text,
            DataType::Boolean => ColumnKind::Boolean,
            DataType::Date => ColumnKind::Date,
            d if d.is_integer() => ColumnKind::Integer,
            d if d.is_float() => ColumnKind::Float,
            _ => ColumnKind::Other,
        }
    }
}

/// One stage's output: a frame and the type tag of each of its columns.
#[derive(Debug, Clone)]
pub struct Snapshot {
    frame: DataFrame,
    kinds: Vec<ColumnKind>,
}

impl Snapshot {
    pub fn new(frame: DataFrame) -> Self {
        let kinds = frame
            .get_columns()
            .iter()
            .map(|c| ColumnKind::of(c.dtype()))
            .collect();
        Self { frame, kinds }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    /// Column names in frame order.
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Type tag of a column, if present.
    pub fn kind(&self, name: &str) -> Option<ColumnKind> {
        self.position(name).map(|i| self.kinds[i])
    }

    /// `(name, kind)` for every column, in frame order.
    pub fn tagged_columns(&self) -> Vec<(String, ColumnKind)> {
        self.column_names()
            .into_iter()
            .zip(self.kinds.iter().copied())
            .collect()
    }

    /// Names of all columns carrying the given tag.
    pub fn columns_of_kind(&self, kind: ColumnKind) -> Vec<String> {
        self.tagged_columns()
            .into_iter()
            .filter(|(_, k)| *k == kind)
            .map(|(name, _)| name)
            .collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.frame
            .get_columns()
            .iter()
            .position(|c| c.name().as_str() == name)
    }
}
