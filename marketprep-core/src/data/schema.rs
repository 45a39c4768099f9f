use crate::data::ingest::DataError;
use crate::data::table::Snapshot;
use polars::prelude::*;

pub const TRADE_DATE: &str = "trade_date";
pub const TICKER: &str = "ticker";
pub const SECTOR: &str = "sector";
pub const OPEN_PRICE: &str = "open_price";
pub const CLOSE_PRICE: &str = "close_price";
pub const VOLUME: &str = "volume";
pub const VALIDATED: &str = "validated";
pub const CURRENCY: &str = "currency";
pub const EXCHANGE: &str = "exchange";
pub const NOTES: &str = "notes";

/// Target types for the cleaned quote table.
pub struct QuoteSchema;

impl QuoteSchema {
    /// The fixed column → type mapping. `trade_date` stays text (ISO form).
    pub fn schema() -> Schema {
        Schema::from_iter(vec![
            Field::new(TRADE_DATE.into(), DataType::String),
            Field::new(TICKER.into(), DataType::String),
            Field::new(SECTOR.into(), DataType::String),
            Field::new(OPEN_PRICE.into(), DataType::Float64),
            Field::new(CLOSE_PRICE.into(), DataType::Float64),
            Field::new(VOLUME.into(), DataType::Int64),
            Field::new(VALIDATED.into(), DataType::String),
            Field::new(CURRENCY.into(), DataType::String),
            Field::new(EXCHANGE.into(), DataType::String),
            Field::new(NOTES.into(), DataType::String),
        ])
    }

    /// Cast every mapped column that is present. Casting is non-strict:
    /// a value that cannot be converted becomes missing. Unmapped columns
    /// pass through; mapped columns that are absent are not created.
    pub fn enforce(snapshot: &Snapshot) -> Result<Snapshot, DataError> {
        let mut frame = snapshot.frame().clone();

        for field in Self::schema().iter_fields() {
            if !snapshot.has_column(field.name()) {
                continue;
            }
            let cast = frame.column(field.name())?.cast(field.dtype())?;
            frame.with_column(cast)?;
        }

        Ok(Snapshot::new(frame))
    }

    /// Check that every mapped column present in the frame has its target type.
    pub fn validate(df: &DataFrame) -> Result<(), SchemaError> {
        let expected = Self::schema();
        let actual = df.schema();

        for field in expected.iter_fields() {
            let Some(actual_dtype) = actual.get(field.name()) else {
                continue;
            };
            if actual_dtype != field.dtype() {
                return Err(SchemaError::TypeMismatch {
                    column: field.name().to_string(),
                    expected: field.dtype().clone(),
                    actual: actual_dtype.clone(),
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Type mismatch in column {column}: expected {expected:?}, got {actual:?}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        actual: DataType,
    },
}
