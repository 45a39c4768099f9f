//! Pipeline configuration, loaded from TOML.
//!
//! Every section and field is optional; defaults reproduce the quote
//! cleaner's fixed paths (`stock_market.csv` in, `cleaned.parquet` and
//! `agg{1,2,3}.parquet` out, all in the working directory).

use crate::aggregate::AggregateKind;
use crate::data::ingest::DEFAULT_INFER_SCHEMA_LENGTH;
use crate::data::{DateNormalizer, DateParsePolicy, NullTokens};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub paths: PathsConfig,
    pub csv: CsvConfig,
    pub text: TextConfig,
    pub dates: DatesConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub cleaned: String,
    pub avg_close: String,
    pub avg_volume: String,
    pub daily_return: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CsvConfig {
    /// Rows scanned when inferring column types.
    pub infer_schema_length: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextConfig {
    pub null_tokens: NullTokens,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatesConfig {
    /// Substring a canonical column name must contain to be date-parsed.
    pub column_hint: String,
    pub policy: DateParsePolicy,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("stock_market.csv"),
            output_dir: PathBuf::from("."),
            cleaned: "cleaned.parquet".into(),
            avg_close: "agg1.parquet".into(),
            avg_volume: "agg2.parquet".into(),
            daily_return: "agg3.parquet".into(),
        }
    }
}

impl PathsConfig {
    /// File name of an aggregate artifact inside `output_dir`.
    pub fn aggregate_file(&self, kind: AggregateKind) -> &str {
        match kind {
            AggregateKind::AvgClose => &self.avg_close,
            AggregateKind::AvgVolume => &self.avg_volume,
            AggregateKind::DailyReturn => &self.daily_return,
        }
    }

    pub fn aggregate_path(&self, kind: AggregateKind) -> PathBuf {
        self.output_dir.join(self.aggregate_file(kind))
    }
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            infer_schema_length: DEFAULT_INFER_SCHEMA_LENGTH,
        }
    }
}

impl Default for DatesConfig {
    fn default() -> Self {
        Self {
            column_hint: "trade".into(),
            policy: DateParsePolicy::default(),
        }
    }
}

impl DatesConfig {
    pub fn normalizer(&self) -> DateNormalizer {
        DateNormalizer::new(self.column_hint.clone(), self.policy)
    }
}

impl PipelineConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configs that cannot produce a coherent set of artifacts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dates.column_hint.trim().is_empty() {
            return Err(ConfigError::Invalid("dates.column_hint must not be empty".into()));
        }
        if self.csv.infer_schema_length == 0 {
            return Err(ConfigError::Invalid(
                "csv.infer_schema_length must be at least 1".into(),
            ));
        }

        let files = [
            &self.paths.cleaned,
            &self.paths.avg_close,
            &self.paths.avg_volume,
            &self.paths.daily_return,
        ];
        if let Some(empty) = files.iter().find(|f| f.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "artifact file name must not be empty (got {empty:?})"
            )));
        }
        let distinct: BTreeSet<&str> = files.iter().map(|f| f.as_str()).collect();
        if distinct.len() != files.len() {
            return Err(ConfigError::Invalid(
                "artifact file names must be distinct".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read config {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("parse config TOML: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}
