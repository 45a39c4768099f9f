//! marketprep CLI: clean a daily quote file and browse its aggregates.
//!
//! Commands:
//! - `run`: clean the input CSV, write the Parquet artifacts and manifest
//! - `dashboard`: print the three aggregate tabs for a date range and tickers
//! - `inspect`: show how the input's columns are tagged and dates parsed

mod logging;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use marketprep_core::config::PipelineConfig;
use marketprep_core::data::dates::ISO_FORMAT;
use marketprep_core::data::DataIngestor;
use marketprep_runner::dashboard::{
    filter_avg_close, filter_returns, AggregatePaths, CloseSummary, ReturnSummary, ViewCache,
    ViewFilter, VolumeSummary,
};
use marketprep_runner::export::save_view_exports;
use marketprep_runner::pipeline::{normalize_snapshot, run_pipeline};
use marketprep_runner::reporting::{AggregateOutcome, RunManifest};
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser)]
#[command(
    name = "marketprep",
    about = "marketprep: daily quote cleaning and aggregation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean the input CSV and write cleaned + aggregate Parquet artifacts.
    Run {
        /// Path to a TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Input CSV (overrides `paths.input`).
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output directory (overrides `paths.output_dir`).
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Print the aggregate tabs, filtered by date range and tickers.
    Dashboard {
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory holding the aggregate artifacts.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// First trade date (YYYY-MM-DD). Defaults to the earliest date.
        #[arg(long)]
        start: Option<String>,

        /// Last trade date (YYYY-MM-DD). Defaults to the latest date.
        #[arg(long)]
        end: Option<String>,

        /// Tickers to show. Defaults to the first five.
        #[arg(long, value_delimiter = ',')]
        tickers: Vec<String>,

        /// Show every ticker.
        #[arg(long, default_value_t = false)]
        all_tickers: bool,

        /// Also write the filtered views as CSV into this directory.
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },
    /// Load and normalize the input without writing anything.
    Inspect {
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        input: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    logging::init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            input,
            output_dir,
        } => run_cmd(load_config(config, input, output_dir)?),
        Commands::Dashboard {
            config,
            output_dir,
            start,
            end,
            tickers,
            all_tickers,
            export_dir,
        } => {
            if all_tickers && !tickers.is_empty() {
                bail!("--tickers and --all-tickers are mutually exclusive");
            }
            let config = load_config(config, None, output_dir)?;
            dashboard_cmd(&config, start, end, tickers, all_tickers, export_dir)
        }
        Commands::Inspect { config, input } => inspect_cmd(&load_config(config, input, None)?),
    }
}

fn load_config(
    path: Option<PathBuf>,
    input: Option<PathBuf>,
    output_dir: Option<PathBuf>,
) -> Result<PipelineConfig> {
    let mut config = match path {
        Some(path) => PipelineConfig::from_file(&path)?,
        None => PipelineConfig::default(),
    };
    if let Some(input) = input {
        config.paths.input = input;
    }
    if let Some(dir) = output_dir {
        config.paths.output_dir = dir;
    }
    Ok(config)
}

fn parse_date(flag: &str, value: Option<String>) -> Result<Option<NaiveDate>> {
    value
        .as_deref()
        .map(|s| {
            NaiveDate::parse_from_str(s, ISO_FORMAT)
                .with_context(|| format!("{flag} must be YYYY-MM-DD, got '{s}'"))
        })
        .transpose()
}

fn run_cmd(config: PipelineConfig) -> Result<()> {
    let report = run_pipeline(&config)
        .with_context(|| format!("pipeline failed for {}", config.paths.input.display()))?;

    print_run_summary(&report.manifest);
    println!("Manifest: {}", report.manifest_path.display());
    if report.manifest.has_failures() {
        warn!("one or more aggregates failed; see the manifest for details");
    }
    Ok(())
}

fn print_run_summary(manifest: &RunManifest) {
    println!("Input: {}", manifest.input.path.display());
    println!("Input hash: {}", manifest.input.content_hash);
    println!(
        "Rows: {} raw, {} cleaned, {} duplicates removed",
        manifest.rows.raw, manifest.rows.cleaned, manifest.rows.duplicates_removed
    );
    for outcome in &manifest.date_columns {
        match outcome.layout {
            Some(layout) => println!("Date column '{}': parsed as {layout}", outcome.column),
            None => println!("Date column '{}': left as text", outcome.column),
        }
    }
    println!();
    println!("{:<14} {:<8} {:>8}  {}", "Artifact", "Status", "Rows", "Detail");
    println!("{}", "-".repeat(60));
    println!(
        "{:<14} {:<8} {:>8}  {}",
        "cleaned",
        "written",
        manifest.cleaned.rows,
        manifest.cleaned.path.display()
    );
    for report in &manifest.aggregates {
        let (rows, detail) = match &report.outcome {
            AggregateOutcome::Written(record) => {
                (record.rows.to_string(), record.path.display().to_string())
            }
            AggregateOutcome::Skipped { reason } => ("-".to_string(), reason.clone()),
            AggregateOutcome::Failed { error } => ("-".to_string(), error.clone()),
        };
        println!(
            "{:<14} {:<8} {:>8}  {}",
            report.kind.to_string(),
            report.outcome.label(),
            rows,
            detail
        );
    }
}

fn dashboard_cmd(
    config: &PipelineConfig,
    start: Option<String>,
    end: Option<String>,
    tickers: Vec<String>,
    all_tickers: bool,
    export_dir: Option<PathBuf>,
) -> Result<()> {
    let start = parse_date("--start", start)?;
    let end = parse_date("--end", end)?;
    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            bail!("--start ({s}) is after --end ({e})");
        }
    }

    let paths = AggregatePaths::from_config(&config.paths);
    let views = ViewCache::new().get(&paths).with_context(|| {
        format!(
            "failed to load aggregates from {}",
            config.paths.output_dir.display()
        )
    })?;

    let Some(mut filter) = ViewFilter::default_for(&views) else {
        println!("No average-close rows to show.");
        return Ok(());
    };
    filter = filter.with_range(start, end);
    if all_tickers {
        filter = filter.with_tickers(views.tickers());
    } else if !tickers.is_empty() {
        filter = filter.with_tickers(&tickers);
    }

    let tickers: Vec<&str> = filter.tickers.iter().map(String::as_str).collect();
    println!(
        "Range: {} to {}   Tickers: {}",
        filter.start,
        filter.end,
        tickers.join(", ")
    );

    // Tab 1
    let closes = filter_avg_close(&views.avg_close, &filter);
    let summary = CloseSummary::of(&closes);
    println!();
    println!("== Average Close ==");
    println!(
        "Rows: {}   Average close: {}   Distinct tickers: {}",
        summary.rows,
        format_metric(summary.mean_avg_close, 2),
        summary.distinct_tickers
    );
    println!("{:<12} {:<10} {:>12}", "Date", "Ticker", "Avg Close");
    for r in &closes {
        println!("{:<12} {:<10} {:>12.2}", r.trade_date.to_string(), r.ticker, r.avg_close);
    }

    // Tab 2 (not filtered)
    println!();
    println!("== Volume by Sector ==");
    match views.sector_volume.unavailable_reason() {
        Some(reason) => println!("Unavailable: {reason}"),
        None => {
            let rows = views.sector_volume.rows();
            let summary = VolumeSummary::of(rows);
            println!(
                "Total avg volume: {:.0}   Sectors: {}",
                summary.total_avg_volume, summary.sectors
            );
            println!("{:<20} {:>14}", "Sector", "Avg Volume");
            for r in rows {
                println!("{:<20} {:>14.2}", r.sector, r.avg_volume);
            }
        }
    }

    // Tab 3
    println!();
    println!("== Daily Returns ==");
    match views.daily_returns.unavailable_reason() {
        Some(reason) => println!("Unavailable: {reason}"),
        None => {
            let returns = filter_returns(views.daily_returns.rows(), &filter);
            let summary = ReturnSummary::of(&returns);
            println!(
                "Rows: {}   Average return: {}   Distinct tickers: {}",
                summary.rows,
                format_metric(summary.mean_return, 4),
                summary.distinct_tickers
            );
            println!("{:<12} {:<10} {:>10}", "Date", "Ticker", "Return");
            for r in &returns {
                println!(
                    "{:<12} {:<10} {:>10.4}",
                    r.trade_date.to_string(),
                    r.ticker,
                    r.daily_return
                );
            }
        }
    }

    if let Some(dir) = export_dir {
        let written = save_view_exports(&views, &filter, &dir)?;
        println!();
        for path in written {
            println!("Exported: {}", path.display());
        }
    }

    Ok(())
}

fn format_metric(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => "n/a".to_string(),
    }
}

fn inspect_cmd(config: &PipelineConfig) -> Result<()> {
    let raw = DataIngestor::new(config.csv.infer_schema_length)
        .ingest_csv(&config.paths.input)
        .with_context(|| format!("failed to load {}", config.paths.input.display()))?;
    let normalized = normalize_snapshot(&raw, config)?;
    let snapshot = &normalized.snapshot;

    println!(
        "{}: {} rows, {} columns",
        config.paths.input.display(),
        snapshot.height(),
        snapshot.width()
    );
    println!();
    println!("{:<24} {:<8}", "Column", "Kind");
    println!("{}", "-".repeat(33));
    for (name, kind) in snapshot.tagged_columns() {
        println!("{:<24} {:<8}", name, format!("{kind:?}").to_lowercase());
    }

    println!();
    println!("Date policy: {:?}", config.dates.policy);
    if normalized.outcomes.is_empty() {
        println!(
            "No text column matches the date hint '{}'.",
            config.dates.column_hint
        );
    }
    for outcome in &normalized.outcomes {
        match outcome.layout {
            Some(layout) => println!("  {}: {layout}", outcome.column),
            None => println!("  {}: unparsed, left as text", outcome.column),
        }
    }
    Ok(())
}
