//! Typed rows materialized from the aggregate artifacts.

use super::{AggregatePaths, DashboardError};
use chrono::NaiveDate;
use marketprep_core::aggregate::{AggregateKind, AVG_CLOSE, AVG_VOLUME, RETURN};
use marketprep_core::artifacts::ArtifactStore;
use marketprep_core::data::dates::ISO_FORMAT;
use marketprep_core::data::schema::{SECTOR, TICKER, TRADE_DATE};
use polars::prelude::*;
use std::collections::BTreeSet;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct AvgCloseRow {
    pub trade_date: NaiveDate,
    pub ticker: String,
    pub avg_close: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectorVolumeRow {
    pub sector: String,
    pub avg_volume: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyReturnRow {
    pub trade_date: NaiveDate,
    pub ticker: String,
    pub daily_return: f64,
}

/// A tab that may have nothing to show.
#[derive(Debug, Clone, PartialEq)]
pub enum Tab<T> {
    Rows(Vec<T>),
    Unavailable { reason: String },
}

impl<T> Tab<T> {
    /// Rows of the tab; empty when unavailable.
    pub fn rows(&self) -> &[T] {
        match self {
            Tab::Rows(rows) => rows,
            Tab::Unavailable { .. } => &[],
        }
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match self {
            Tab::Rows(_) => None,
            Tab::Unavailable { reason } => Some(reason),
        }
    }
}

/// The three aggregate tables, ready for filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateViews {
    pub avg_close: Vec<AvgCloseRow>,
    pub sector_volume: Tab<SectorVolumeRow>,
    pub daily_returns: Tab<DailyReturnRow>,
    /// Rows dropped because a key or value could not be read.
    pub skipped_rows: usize,
}

impl AggregateViews {
    /// Read the artifacts. The average-close table is required; the other
    /// two are reported as unavailable when their file is absent.
    pub fn load(paths: &AggregatePaths) -> Result<Self, DashboardError> {
        let avg_close = ArtifactStore::read(&paths.avg_close)?;
        let avg_volume = read_optional(paths, AggregateKind::AvgVolume)?;
        let daily_return = read_optional(paths, AggregateKind::DailyReturn)?;

        let views = Self::from_frames(&avg_close, avg_volume.as_ref(), daily_return.as_ref())?;
        info!(
            avg_close_rows = views.avg_close.len(),
            sectors = views.sector_volume.rows().len(),
            return_rows = views.daily_returns.rows().len(),
            "loaded aggregate views"
        );
        Ok(views)
    }

    pub fn from_frames(
        avg_close: &DataFrame,
        avg_volume: Option<&DataFrame>,
        daily_return: Option<&DataFrame>,
    ) -> Result<Self, DashboardError> {
        let mut skipped = 0;

        let close_rows = read_dated_rows(avg_close, "agg1", AVG_CLOSE, &mut skipped)?
            .into_iter()
            .map(|(trade_date, ticker, avg_close)| AvgCloseRow {
                trade_date,
                ticker,
                avg_close,
            })
            .collect();

        let sector_volume = match avg_volume {
            None => Tab::Unavailable {
                reason: "agg2 was not produced".into(),
            },
            Some(frame) if frame.column(SECTOR).is_err() => Tab::Unavailable {
                reason: format!("agg2 is missing required column '{SECTOR}'"),
            },
            Some(frame) => Tab::Rows(read_sector_rows(frame, &mut skipped)?),
        };

        let daily_returns = match daily_return {
            None => Tab::Unavailable {
                reason: "agg3 was not produced".into(),
            },
            Some(frame) => Tab::Rows(
                read_dated_rows(frame, "agg3", RETURN, &mut skipped)?
                    .into_iter()
                    .map(|(trade_date, ticker, daily_return)| DailyReturnRow {
                        trade_date,
                        ticker,
                        daily_return,
                    })
                    .collect(),
            ),
        };

        if skipped > 0 {
            warn!(rows = skipped, "aggregate rows with unreadable keys were skipped");
        }

        Ok(Self {
            avg_close: close_rows,
            sector_volume,
            daily_returns,
            skipped_rows: skipped,
        })
    }

    /// Distinct tickers of the average-close table, sorted.
    pub fn tickers(&self) -> Vec<String> {
        self.avg_close
            .iter()
            .map(|r| r.ticker.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Earliest and latest trade date of the average-close table.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.avg_close.iter().map(|r| r.trade_date).min()?;
        let max = self.avg_close.iter().map(|r| r.trade_date).max()?;
        Some((min, max))
    }
}

fn read_optional(
    paths: &AggregatePaths,
    kind: AggregateKind,
) -> Result<Option<DataFrame>, DashboardError> {
    let path = paths.get(kind);
    if !path.exists() {
        return Ok(None);
    }
    Ok(Some(ArtifactStore::read(path)?))
}

fn column_as(
    frame: &DataFrame,
    artifact: &str,
    name: &str,
    dtype: &DataType,
) -> Result<Column, DashboardError> {
    let column = frame
        .column(name)
        .map_err(|_| DashboardError::MissingColumn {
            artifact: artifact.to_string(),
            column: name.to_string(),
        })?;
    Ok(column.cast(dtype)?)
}

/// `(trade_date, ticker, value)` triples. A date stored as text is parsed
/// as ISO; a date stored as a date is formatted the same way by the cast.
fn read_dated_rows(
    frame: &DataFrame,
    artifact: &str,
    value: &str,
    skipped: &mut usize,
) -> Result<Vec<(NaiveDate, String, f64)>, DashboardError> {
    let dates = column_as(frame, artifact, TRADE_DATE, &DataType::String)?;
    let tickers = column_as(frame, artifact, TICKER, &DataType::String)?;
    let values = column_as(frame, artifact, value, &DataType::Float64)?;

    let mut rows = Vec::with_capacity(frame.height());
    for ((date, ticker), value) in dates
        .str()?
        .into_iter()
        .zip(tickers.str()?.into_iter())
        .zip(values.f64()?.into_iter())
    {
        let parsed = date.and_then(|d| NaiveDate::parse_from_str(d, ISO_FORMAT).ok());
        match (parsed, ticker, value) {
            (Some(trade_date), Some(ticker), Some(value)) => {
                rows.push((trade_date, ticker.to_string(), value))
            }
            _ => *skipped += 1,
        }
    }
    Ok(rows)
}

fn read_sector_rows(
    frame: &DataFrame,
    skipped: &mut usize,
) -> Result<Vec<SectorVolumeRow>, DashboardError> {
    let sectors = column_as(frame, "agg2", SECTOR, &DataType::String)?;
    let volumes = column_as(frame, "agg2", AVG_VOLUME, &DataType::Float64)?;

    let mut rows = Vec::with_capacity(frame.height());
    for (sector, volume) in sectors.str()?.into_iter().zip(volumes.f64()?.into_iter()) {
        match (sector, volume) {
            (Some(sector), Some(avg_volume)) => rows.push(SectorVolumeRow {
                sector: sector.to_string(),
                avg_volume,
            }),
            _ => *skipped += 1,
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn agg1() -> DataFrame {
        df!(
            "trade_date" => &["2023-01-01", "2023-01-02", "not-a-date"],
            "ticker" => &["aapl", "msft", "aapl"],
            "avg_close" => &[100.0, 200.0, 1.0],
        )
        .unwrap()
    }

    fn agg3() -> DataFrame {
        let days = Column::new("trade_date".into(), &[19359i32])
            .cast(&DataType::Date)
            .unwrap();
        DataFrame::new(vec![
            days,
            Column::new("ticker".into(), &["aapl"]),
            Column::new("return".into(), &[0.1f64]),
        ])
        .unwrap()
    }

    #[test]
    fn text_and_date_typed_trade_dates_both_load() {
        let views = AggregateViews::from_frames(&agg1(), None, Some(&agg3())).unwrap();

        assert_eq!(views.avg_close.len(), 2);
        assert_eq!(views.avg_close[0].trade_date, date(2023, 1, 1));
        assert_eq!(views.skipped_rows, 1);

        let returns = views.daily_returns.rows();
        assert_eq!(returns.len(), 1);
        assert_eq!(returns[0].trade_date, date(2023, 1, 2));
        assert_eq!(returns[0].daily_return, 0.1);
    }

    #[test]
    fn missing_sector_column_is_reported_not_fatal() {
        let agg2 = df!("avg_volume" => &[1.0]).unwrap();

        let views = AggregateViews::from_frames(&agg1(), Some(&agg2), None).unwrap();

        assert!(views.sector_volume.rows().is_empty());
        assert_eq!(
            views.sector_volume.unavailable_reason(),
            Some("agg2 is missing required column 'sector'")
        );
        assert!(views.daily_returns.unavailable_reason().is_some());
    }

    #[test]
    fn agg1_without_ticker_is_an_error() {
        let frame = df!(
            "trade_date" => &["2023-01-01"],
            "avg_close" => &[1.0],
        )
        .unwrap();

        let result = AggregateViews::from_frames(&frame, None, None);
        assert!(matches!(
            result,
            Err(DashboardError::MissingColumn { column, .. }) if column == "ticker"
        ));
    }

    #[test]
    fn tickers_and_range_come_from_agg1() {
        let views = AggregateViews::from_frames(&agg1(), None, None).unwrap();
        assert_eq!(views.tickers(), vec!["aapl", "msft"]);
        assert_eq!(views.date_range(), Some((date(2023, 1, 1), date(2023, 1, 2))));
    }
}
