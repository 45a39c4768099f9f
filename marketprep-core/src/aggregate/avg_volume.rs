use super::{require_columns, AggregateError};
use crate::data::schema::{SECTOR, VOLUME};
use crate::data::Snapshot;
use polars::prelude::*;
use tracing::info;

pub const AVG_VOLUME: &str = "avg_volume";

/// Mean volume per sector over rows with a volume. Sorted by sector.
pub fn avg_volume(snapshot: &Snapshot) -> Result<DataFrame, AggregateError> {
    require_columns(snapshot, &[SECTOR, VOLUME])?;

    let out = snapshot
        .frame()
        .clone()
        .lazy()
        .filter(col(VOLUME).is_not_null())
        .group_by([col(SECTOR)])
        .agg([col(VOLUME).mean().alias(AVG_VOLUME)])
        .sort([SECTOR], SortMultipleOptions::default())
        .collect()?;

    info!(sectors = out.height(), "computed average volume");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sector_means(out: &DataFrame) -> Vec<(String, f64)> {
        let sectors = out.column(SECTOR).unwrap().str().unwrap();
        let means = out.column(AVG_VOLUME).unwrap().f64().unwrap();
        sectors
            .into_iter()
            .zip(means.into_iter())
            .map(|(s, m)| (s.unwrap().to_string(), m.unwrap()))
            .collect()
    }

    #[test]
    fn averages_per_sector() {
        let df = df!(
            "sector" => &["tech", "tech", "health"],
            "volume" => &[100i64, 200, 50],
        )
        .unwrap();

        let out = avg_volume(&Snapshot::new(df)).unwrap();

        assert_eq!(
            sector_means(&out),
            vec![("health".to_string(), 50.0), ("tech".to_string(), 150.0)]
        );
    }

    #[test]
    fn rows_without_volume_are_ignored() {
        let df = df!(
            "sector" => &["tech", "tech", "energy"],
            "volume" => &[Some(100i64), None, None],
        )
        .unwrap();

        let out = avg_volume(&Snapshot::new(df)).unwrap();

        assert_eq!(sector_means(&out), vec![("tech".to_string(), 100.0)]);
    }
}
