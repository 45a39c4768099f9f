//! CSV export of filtered dashboard views.
//!
//! - `avg_close.csv`: trade_date, ticker, avg_close
//! - `avg_volume.csv`: sector, avg_volume
//! - `daily_return.csv`: trade_date, ticker, return

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::dashboard::{
    filter_avg_close, filter_returns, AggregateViews, AvgCloseRow, DailyReturnRow,
    SectorVolumeRow, ViewFilter,
};

pub fn export_avg_close_csv(rows: &[&AvgCloseRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["trade_date", "ticker", "avg_close"])?;
    for r in rows {
        wtr.write_record([
            &r.trade_date.to_string(),
            &r.ticker,
            &format!("{:.6}", r.avg_close),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

pub fn export_sector_volume_csv(rows: &[SectorVolumeRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["sector", "avg_volume"])?;
    for r in rows {
        wtr.write_record([&r.sector, &format!("{:.2}", r.avg_volume)])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

pub fn export_returns_csv(rows: &[&DailyReturnRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["trade_date", "ticker", "return"])?;
    for r in rows {
        wtr.write_record([
            &r.trade_date.to_string(),
            &r.ticker,
            &format!("{:.8}", r.daily_return),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Write the filtered views into `dir`, one file per available tab.
/// Returns the paths written.
pub fn save_view_exports(
    views: &AggregateViews,
    filter: &ViewFilter,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export dir: {}", dir.display()))?;

    let mut written = Vec::new();

    let path = dir.join("avg_close.csv");
    std::fs::write(&path, export_avg_close_csv(&filter_avg_close(&views.avg_close, filter))?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    written.push(path);

    if views.sector_volume.unavailable_reason().is_none() {
        let path = dir.join("avg_volume.csv");
        std::fs::write(&path, export_sector_volume_csv(views.sector_volume.rows())?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }

    if views.daily_returns.unavailable_reason().is_none() {
        let path = dir.join("daily_return.csv");
        let rows = filter_returns(views.daily_returns.rows(), filter);
        std::fs::write(&path, export_returns_csv(&rows)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }

    Ok(written)
}
