//! End-to-end runs over a small quote file written into a temp directory.

use marketprep_core::aggregate::AggregateKind;
use marketprep_core::artifacts::ArtifactStore;
use marketprep_core::config::PipelineConfig;
use marketprep_core::data::{DateLayout, DateParsePolicy};
use marketprep_runner::pipeline::{run_pipeline, PipelineError};
use marketprep_runner::reporting::{read_manifest, AggregateOutcome, MANIFEST_FILE};
use std::path::Path;

const QUOTES: &str = "\
Trade Date,Ticker,Sector,Open Price,Close Price,Volume,Validated,Currency,Exchange,Notes
01/02/2023,AAPL,Tech,99.0,100.0,1000,true,USD,NASDAQ,
01/03/2023,AAPL,Tech,100.0,110.0,2000,true,USD,NASDAQ,n/a
01/03/2023,AAPL,Tech,100.0,110.0,2000,true,USD,NASDAQ,n/a
01/02/2023,JNJ,Health,150.0,160.0,50,false,usd,NYSE,-
01/03/2023,JNJ,Health,160.0,152.0,,false,usd,NYSE,late print
";

fn config_in(dir: &Path, csv: &str) -> PipelineConfig {
    let input = dir.join("stock_market.csv");
    std::fs::write(&input, csv).unwrap();

    let mut config = PipelineConfig::default();
    config.paths.input = input;
    config.paths.output_dir = dir.join("out");
    config
}

#[test]
fn run_writes_all_artifacts_and_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), QUOTES);

    let report = run_pipeline(&config).unwrap();
    let manifest = &report.manifest;

    assert_eq!(manifest.rows.raw, 5);
    assert_eq!(manifest.rows.duplicates_removed, 1);
    assert_eq!(manifest.rows.cleaned, 4);
    assert_eq!(manifest.date_columns[0].layout, Some(DateLayout::MonthFirst));
    assert!(!manifest.has_failures());

    for kind in AggregateKind::ALL {
        let outcome = manifest.aggregate(kind).unwrap();
        let record = outcome.record().expect("aggregate written");
        assert!(record.path.exists(), "{kind} artifact missing");
    }
    assert!(config.paths.output_dir.join("cleaned.parquet").exists());

    let on_disk = read_manifest(&report.manifest_path).unwrap();
    assert_eq!(on_disk, *manifest);
    assert_eq!(report.manifest_path, config.paths.output_dir.join(MANIFEST_FILE));

    let agg2 = ArtifactStore::read(&config.paths.aggregate_path(AggregateKind::AvgVolume)).unwrap();
    let sectors = agg2.column("sector").unwrap().str().unwrap();
    let volumes = agg2.column("avg_volume").unwrap().f64().unwrap();
    assert_eq!(sectors.get(0), Some("health"));
    assert_eq!(volumes.get(0), Some(50.0));
    assert_eq!(sectors.get(1), Some("tech"));
    assert_eq!(volumes.get(1), Some(1500.0));
}

#[test]
fn rerun_on_identical_input_gives_identical_hashes() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), QUOTES);

    let first = run_pipeline(&config).unwrap().manifest;
    let second = run_pipeline(&config).unwrap().manifest;

    assert_eq!(first.input.content_hash, second.input.content_hash);
    assert_eq!(first.cleaned.content_hash, second.cleaned.content_hash);
    for kind in AggregateKind::ALL {
        let a = first.aggregate(kind).and_then(|o| o.record()).unwrap();
        let b = second.aggregate(kind).and_then(|o| o.record()).unwrap();
        assert_eq!(a.content_hash, b.content_hash, "{kind} changed between runs");
    }
}

#[test]
fn missing_close_column_skips_returns_and_clears_stale_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), QUOTES);
    run_pipeline(&config).unwrap();
    let agg3 = config.paths.aggregate_path(AggregateKind::DailyReturn);
    assert!(agg3.exists());

    let without_close = "\
Trade Date,Ticker,Sector,Volume
01/02/2023,AAPL,Tech,1000
01/03/2023,AAPL,Tech,2000
";
    std::fs::write(&config.paths.input, without_close).unwrap();
    let manifest = run_pipeline(&config).unwrap().manifest;

    assert!(matches!(
        manifest.aggregate(AggregateKind::DailyReturn),
        Some(AggregateOutcome::Skipped { reason }) if reason.contains("close_price")
    ));
    assert!(!agg3.exists());

    // Average close needs the same column and fails without blocking agg2.
    assert!(matches!(
        manifest.aggregate(AggregateKind::AvgClose),
        Some(AggregateOutcome::Failed { .. })
    ));
    assert!(!config.paths.aggregate_path(AggregateKind::AvgClose).exists());
    assert!(matches!(
        manifest.aggregate(AggregateKind::AvgVolume),
        Some(AggregateOutcome::Written(_))
    ));
    assert!(manifest.has_failures());
}

#[test]
fn legacy_policy_leaves_day_first_dates_as_text() {
    let dir = tempfile::tempdir().unwrap();
    let day_first = "\
trade_date,ticker,close_price
13/01/2023,aapl,100.0
14/01/2023,aapl,110.0
";
    let mut config = config_in(dir.path(), day_first);

    let ordered = run_pipeline(&config).unwrap().manifest;
    assert_eq!(ordered.date_columns[0].layout, Some(DateLayout::DayFirst));
    let returns = ordered.aggregate(AggregateKind::DailyReturn).unwrap();
    assert_eq!(returns.record().unwrap().rows, 1);

    config.dates.policy = DateParsePolicy::LegacyUsOnly;
    let legacy = run_pipeline(&config).unwrap().manifest;
    assert_eq!(legacy.date_columns[0].layout, None);
    let returns = legacy.aggregate(AggregateKind::DailyReturn).unwrap();
    assert_eq!(returns.record().unwrap().rows, 0);
}

#[test]
fn unreadable_input_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path(), QUOTES);
    config.paths.input = dir.path().join("missing.csv");

    assert!(matches!(run_pipeline(&config), Err(PipelineError::Data(_))));
    assert!(!config.paths.output_dir.join(MANIFEST_FILE).exists());
}
