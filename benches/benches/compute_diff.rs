//! Benchmarks for both diff pipelines.
//!
//! Performance-critical paths:
//! - line alignment on documents of growing size (DP below the threshold,
//!   Myers above it)
//! - character refinement of many small hunks
//! - move detection over shuffled blocks

#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use linediff::{DefaultLinesDiffComputer, LegacyLinesDiffComputer, LinesDiffComputer, LinesDiffOptions};

/// A source-like document with one edit every `edit_every` lines.
fn documents(lines: usize, edit_every: usize) -> (Vec<String>, Vec<String>) {
    let original: Vec<String> = (0..lines)
        .map(|i| format!("    let value_{i} = compute(value_{}, {i});", i.saturating_sub(1)))
        .collect();
    let modified = original
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i % edit_every == 0 {
                line.replace("compute", "recompute")
            } else {
                line.clone()
            }
        })
        .collect();
    (original, modified)
}

fn as_lines(document: &[String]) -> Vec<&str> {
    document.iter().map(String::as_str).collect()
}

fn bench_pipelines(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_diff/pipelines");
    let options = LinesDiffOptions::default();
    let default = DefaultLinesDiffComputer::new();
    let legacy = LegacyLinesDiffComputer::new();

    for size in [100usize, 1_000, 5_000] {
        let (original, modified) = documents(size, 17);
        let (original, modified) = (as_lines(&original), as_lines(&modified));

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("default", size), &size, |b, _| {
            b.iter(|| default.compute_diff(black_box(&original), black_box(&modified), &options));
        });
        group.bench_with_input(BenchmarkId::new("legacy", size), &size, |b, _| {
            b.iter(|| legacy.compute_diff(black_box(&original), black_box(&modified), &options));
        });
    }

    group.finish();
}

fn bench_dense_edits(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_diff/dense_edits");
    let default = DefaultLinesDiffComputer::new();
    let options = LinesDiffOptions {
        ignore_trim_whitespace: false,
        ..LinesDiffOptions::default()
    };

    // Every other line edited: many hunks to refine at character level
    let (original, modified) = documents(500, 2);
    let (original, modified) = (as_lines(&original), as_lines(&modified));
    group.bench_function("every_other_line", |b| {
        b.iter(|| default.compute_diff(black_box(&original), black_box(&modified), &options));
    });

    group.finish();
}

fn bench_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_diff/moves");
    let default = DefaultLinesDiffComputer::new();
    let options = LinesDiffOptions {
        compute_moves: true,
        ..LinesDiffOptions::default()
    };

    let (original, _) = documents(600, 1);
    // Swap blocks of 40 lines pairwise
    let modified: Vec<String> = original
        .chunks(40)
        .collect::<Vec<_>>()
        .chunks(2)
        .flat_map(|pair| pair.iter().rev().flat_map(|block| block.iter().cloned()).collect::<Vec<_>>())
        .collect();
    let (original, modified) = (as_lines(&original), as_lines(&modified));
    group.bench_function("swapped_blocks", |b| {
        b.iter(|| default.compute_diff(black_box(&original), black_box(&modified), &options));
    });

    group.finish();
}

criterion_group!(benches, bench_pipelines, bench_dense_edits, bench_moves);
criterion_main!(benches);
