//! Headline metrics for each tab.

use super::views::{AvgCloseRow, DailyReturnRow, SectorVolumeRow};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct CloseSummary {
    pub rows: usize,
    /// `None` when no rows are selected.
    pub mean_avg_close: Option<f64>,
    pub distinct_tickers: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VolumeSummary {
    pub total_avg_volume: f64,
    pub sectors: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSummary {
    pub rows: usize,
    pub mean_return: Option<f64>,
    pub distinct_tickers: usize,
}

impl CloseSummary {
    pub fn of(rows: &[&AvgCloseRow]) -> Self {
        Self {
            rows: rows.len(),
            mean_avg_close: mean(rows.iter().map(|r| r.avg_close)),
            distinct_tickers: distinct(rows.iter().map(|r| r.ticker.as_str())),
        }
    }
}

impl VolumeSummary {
    pub fn of(rows: &[SectorVolumeRow]) -> Self {
        Self {
            total_avg_volume: rows.iter().map(|r| r.avg_volume).sum(),
            sectors: distinct(rows.iter().map(|r| r.sector.as_str())),
        }
    }
}

impl ReturnSummary {
    pub fn of(rows: &[&DailyReturnRow]) -> Self {
        Self {
            rows: rows.len(),
            mean_return: mean(rows.iter().map(|r| r.daily_return)),
            distinct_tickers: distinct(rows.iter().map(|r| r.ticker.as_str())),
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> usize {
    values.collect::<BTreeSet<_>>().len()
}
