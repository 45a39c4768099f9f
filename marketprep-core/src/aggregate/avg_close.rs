use super::{require_columns, AggregateError};
use crate::data::schema::{CLOSE_PRICE, TICKER, TRADE_DATE};
use crate::data::Snapshot;
use polars::prelude::*;
use tracing::info;

pub const AVG_CLOSE: &str = "avg_close";

/// Mean close per `(trade_date, ticker)` over rows with a close price.
/// Output is sorted by its key columns.
pub fn avg_close(snapshot: &Snapshot) -> Result<DataFrame, AggregateError> {
    require_columns(snapshot, &[TRADE_DATE, TICKER, CLOSE_PRICE])?;

    let out = snapshot
        .frame()
        .clone()
        .lazy()
        .filter(col(CLOSE_PRICE).is_not_null())
        .group_by([col(TRADE_DATE), col(TICKER)])
        .agg([col(CLOSE_PRICE).mean().alias(AVG_CLOSE)])
        .sort([TRADE_DATE, TICKER], SortMultipleOptions::default())
        .collect()?;

    info!(groups = out.height(), "computed average close");
    Ok(out)
}
