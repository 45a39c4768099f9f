//! Criterion benchmarks for the cleaning stages.
//!
//! Benchmarks:
//! 1. Text normalization over all text columns
//! 2. Date normalization of a month-first trade-date column
//! 3. Schema enforcement and dedupe
//! 4. Daily return aggregate

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use marketprep_core::aggregate::daily_return;
use marketprep_core::data::{
    normalize_text, Canonicalizer, DateNormalizer, NullTokens, QuoteSchema, Snapshot,
};
use polars::prelude::*;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_quotes(n: usize) -> Snapshot {
    let tickers = ["AAPL ", " msft", "XOM", "jnj"];
    let sectors = ["Tech", "tech ", "Energy", "n/a"];
    let base = chrono::NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();

    let dates: Vec<String> = (0..n)
        .map(|i| {
            (base + chrono::Duration::days((i / tickers.len()) as i64))
                .format("%m/%d/%Y")
                .to_string()
        })
        .collect();
    let ticker_col: Vec<&str> = (0..n).map(|i| tickers[i % tickers.len()]).collect();
    let sector_col: Vec<&str> = (0..n).map(|i| sectors[i % sectors.len()]).collect();
    let closes: Vec<String> = (0..n)
        .map(|i| format!("{:.2}", 100.0 + (i as f64 * 0.1).sin() * 10.0))
        .collect();
    let volumes: Vec<String> = (0..n).map(|i| (1_000 + i % 500).to_string()).collect();

    let df = DataFrame::new(vec![
        Column::new("trade_date".into(), dates),
        Column::new("ticker".into(), ticker_col),
        Column::new("sector".into(), sector_col),
        Column::new("close_price".into(), closes),
        Column::new("volume".into(), volumes),
    ])
    .unwrap();
    Snapshot::new(df)
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_text");
    let tokens = NullTokens::default();
    for n in [1_000, 10_000, 100_000] {
        let snap = make_quotes(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &snap, |b, snap| {
            b.iter(|| normalize_text(black_box(snap), &tokens).unwrap())
        });
    }
    group.finish();
}

fn bench_dates(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_dates");
    let normalizer = DateNormalizer::default();
    for n in [1_000, 10_000, 100_000] {
        let snap = make_quotes(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &snap, |b, snap| {
            b.iter(|| normalizer.normalize(black_box(snap)).unwrap())
        });
    }
    group.finish();
}

fn bench_schema_and_dedupe(c: &mut Criterion) {
    let snap = make_quotes(50_000);
    c.bench_function("enforce_and_dedupe_50k", |b| {
        b.iter(|| {
            let typed = QuoteSchema::enforce(black_box(&snap)).unwrap();
            Canonicalizer::dedupe(&typed).unwrap()
        })
    });
}

fn bench_daily_return(c: &mut Criterion) {
    let snap = make_quotes(50_000);
    let dated = DateNormalizer::default().normalize(&snap).unwrap().snapshot;
    let typed = QuoteSchema::enforce(&dated).unwrap();
    c.bench_function("daily_return_50k", |b| {
        b.iter(|| daily_return(black_box(&typed)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_text,
    bench_dates,
    bench_schema_and_dedupe,
    bench_daily_return
);
criterion_main!(benches);
