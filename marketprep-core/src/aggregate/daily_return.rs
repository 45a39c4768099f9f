use super::{first_missing, AggregateError};
use crate::data::dates::ISO_FORMAT;
use crate::data::schema::{CLOSE_PRICE, TICKER, TRADE_DATE};
use crate::data::Snapshot;
use polars::prelude::*;
use tracing::{info, warn};

pub const RETURN: &str = "return";

/// Close-to-close return per ticker: `close / close.shift(1) - 1` over rows
/// sorted by date.
///
/// Returns `Ok(None)` when `trade_date`, `ticker` or `close_price` is absent.
/// Rows with a missing member of that triple, or a date that is not ISO, are
/// excluded before the lag is taken. The first row of each ticker has no
/// return and is dropped. A previous close of 0 yields `inf` (or `NaN` for
/// 0/0); those rows are kept.
///
/// Output columns: `trade_date` (Date), `ticker`, `return`, sorted by
/// `(ticker, trade_date)`.
pub fn daily_return(snapshot: &Snapshot) -> Result<Option<DataFrame>, AggregateError> {
    if let Some(missing) = first_missing(snapshot, &[TRADE_DATE, TICKER, CLOSE_PRICE]) {
        warn!(column = missing, "daily return skipped: required column absent");
        return Ok(None);
    }

    let frame = snapshot.frame();
    let typed = frame
        .clone()
        .lazy()
        .select([
            col(TRADE_DATE)
                .cast(DataType::String)
                .str()
                .to_date(StrptimeOptions {
                    format: Some(ISO_FORMAT.into()),
                    strict: false,
                    ..Default::default()
                })
                .alias(TRADE_DATE),
            col(TICKER).cast(DataType::String),
            col(CLOSE_PRICE).cast(DataType::Float64),
        ])
        .collect()?;

    let unparsed = typed
        .column(TRADE_DATE)?
        .null_count()
        .saturating_sub(frame.column(TRADE_DATE)?.null_count());
    if unparsed > 0 {
        warn!(rows = unparsed, "daily return ignored rows with non-ISO trade dates");
    }

    let lagged = col(CLOSE_PRICE).shift(lit(1)).over([col(TICKER)]);
    let out = typed
        .lazy()
        .filter(
            col(TRADE_DATE)
                .is_not_null()
                .and(col(TICKER).is_not_null())
                .and(col(CLOSE_PRICE).is_not_null()),
        )
        .sort(
            [TICKER, TRADE_DATE, CLOSE_PRICE],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .select([
            col(TRADE_DATE),
            col(TICKER),
            (col(CLOSE_PRICE) / lagged - lit(1.0)).alias(RETURN),
        ])
        .filter(col(RETURN).is_not_null())
        .collect()?;

    let non_finite = out
        .column(RETURN)?
        .f64()?
        .into_iter()
        .flatten()
        .filter(|r| !r.is_finite())
        .count();
    if non_finite > 0 {
        warn!(rows = non_finite, "daily returns include non-finite values (previous close of 0)");
    }

    info!(rows = out.height(), "computed daily returns");
    Ok(Some(out))
}
