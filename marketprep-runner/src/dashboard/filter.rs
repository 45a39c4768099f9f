//! Date-range and ticker filters shared by the close and return tabs.

use super::views::{AggregateViews, AvgCloseRow, DailyReturnRow};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Tickers selected when no explicit choice is made.
pub const DEFAULT_TICKER_COUNT: usize = 5;

/// Inclusive date range plus a ticker subset. An empty ticker set selects
/// no rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewFilter {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub tickers: BTreeSet<String>,
}

impl ViewFilter {
    pub fn new<I, S>(start: NaiveDate, end: NaiveDate, tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            start,
            end,
            tickers: normalize_tickers(tickers),
        }
    }

    /// Full date range of the average-close table and its first
    /// [`DEFAULT_TICKER_COUNT`] tickers. `None` when that table is empty.
    pub fn default_for(views: &AggregateViews) -> Option<Self> {
        let (start, end) = views.date_range()?;
        let tickers = views.tickers().into_iter().take(DEFAULT_TICKER_COUNT);
        Some(Self::new(start, end, tickers))
    }

    pub fn with_tickers<I, S>(mut self, tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tickers = normalize_tickers(tickers);
        self
    }

    pub fn with_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        if let Some(start) = start {
            self.start = start;
        }
        if let Some(end) = end {
            self.end = end;
        }
        self
    }

    pub fn matches(&self, trade_date: NaiveDate, ticker: &str) -> bool {
        trade_date >= self.start && trade_date <= self.end && self.tickers.contains(ticker)
    }
}

// Tickers are stored lowercased by the text stage.
fn normalize_tickers<I, S>(tickers: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tickers
        .into_iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

pub fn filter_avg_close<'a>(rows: &'a [AvgCloseRow], filter: &ViewFilter) -> Vec<&'a AvgCloseRow> {
    rows.iter()
        .filter(|r| filter.matches(r.trade_date, &r.ticker))
        .collect()
}

pub fn filter_returns<'a>(
    rows: &'a [DailyReturnRow],
    filter: &ViewFilter,
) -> Vec<&'a DailyReturnRow> {
    rows.iter()
        .filter(|r| filter.matches(r.trade_date, &r.ticker))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::views::Tab;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, d).unwrap()
    }

    fn close(d: u32, ticker: &str) -> AvgCloseRow {
        AvgCloseRow {
            trade_date: date(d),
            ticker: ticker.into(),
            avg_close: d as f64,
        }
    }

    fn views() -> AggregateViews {
        let tickers = ["aapl", "amzn", "goog", "jnj", "msft", "xom"];
        AggregateViews {
            avg_close: tickers
                .iter()
                .enumerate()
                .map(|(i, t)| close(i as u32 + 2, t))
                .collect(),
            sector_volume: Tab::Rows(vec![]),
            daily_returns: Tab::Rows(vec![]),
            skipped_rows: 0,
        }
    }

    #[test]
    fn default_spans_full_range_and_first_five_tickers() {
        let filter = ViewFilter::default_for(&views()).unwrap();

        assert_eq!(filter.start, date(2));
        assert_eq!(filter.end, date(7));
        assert_eq!(filter.tickers.len(), DEFAULT_TICKER_COUNT);
        assert!(!filter.tickers.contains("xom"));
    }

    #[test]
    fn empty_views_have_no_default() {
        let mut v = views();
        v.avg_close.clear();
        assert!(ViewFilter::default_for(&v).is_none());
    }

    #[test]
    fn range_is_inclusive() {
        let rows = views().avg_close;
        let filter = ViewFilter::new(date(3), date(5), ["AAPL", " amzn ", "goog", "jnj"]);

        let kept: Vec<&str> = filter_avg_close(&rows, &filter)
            .iter()
            .map(|r| r.ticker.as_str())
            .collect();
        assert_eq!(kept, vec!["amzn", "goog", "jnj"]);
    }

    #[test]
    fn empty_ticker_set_selects_nothing() {
        let v = views();
        let filter = ViewFilter::default_for(&v)
            .unwrap()
            .with_tickers(Vec::<String>::new());
        assert!(filter_avg_close(&v.avg_close, &filter).is_empty());
    }

    #[test]
    fn returns_use_the_same_predicate() {
        let rows = vec![
            DailyReturnRow {
                trade_date: date(2),
                ticker: "aapl".into(),
                daily_return: 0.1,
            },
            DailyReturnRow {
                trade_date: date(9),
                ticker: "aapl".into(),
                daily_return: 0.2,
            },
        ];
        let filter = ViewFilter::new(date(1), date(5), ["aapl"]).with_range(None, Some(date(8)));
        assert_eq!(filter_returns(&rows, &filter).len(), 1);
    }
}
