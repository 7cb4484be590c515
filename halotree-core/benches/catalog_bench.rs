//! Benchmarks for catalog loading.
//!
//! # Benchmark Goals
//!
//! 1. Parse throughput of in-memory text
//! 2. Cost of the column mask (tree columns vs. everything)
//! 3. End-to-end file loading through the memory map

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use halotree_core::{Catalog, CatalogFormat};
use rand::Rng;
use std::hint::black_box;
use std::io::Write;
use tempfile::NamedTempFile;

/// Full-width Rockstar halo list with `rows` random halos
fn rockstar_text(rows: usize) -> String {
    let mut rng = rand::rng();
    let mut text = String::from("#ID DescID Mvir Vmax Vrms Rvir Rs Np X Y Z\n#a = 1.000000\n");

    for id in 0..rows {
        let mass: f64 = 10f64.powf(rng.random_range(10.0..15.0));
        text.push_str(&format!("{id} -1 {mass:.5e}"));
        for _ in 3..40 {
            text.push_str(&format!(" {:.4}", rng.random_range(0.0..250.0)));
        }
        text.push_str(&format!(" 0 {:.3e} {:.3e} {:.3e}\n", mass * 0.01, mass * 0.1, mass * 1e-4));
    }

    text
}

/// Benchmark: parse throughput by mask width
fn bench_parse_mask(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_mask");
    group.sample_size(20);

    let text = rockstar_text(20_000);
    group.throughput(Throughput::Bytes(text.len() as u64));

    let masks: [(&str, &[&str]); 3] = [
        ("tree_columns", CatalogFormat::Rockstar.tree_columns()),
        ("positions", &["id", "x", "y", "z"]),
        ("all", &[]),
    ];

    for (name, mask) in masks {
        group.bench_with_input(BenchmarkId::new("mask", name), &mask, |b, &mask| {
            b.iter(|| black_box(Catalog::parse(&text, CatalogFormat::Rockstar, mask).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark: loading from disk
fn bench_read_file(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_file");
    group.sample_size(20);

    for rows in [1_000, 10_000, 50_000] {
        let text = rockstar_text(rows);
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(text.as_bytes()).expect("Failed to write catalog");
        file.flush().expect("Failed to flush catalog");

        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &rows, |b, _| {
            b.iter(|| {
                let mask = CatalogFormat::Rockstar.tree_columns();
                black_box(Catalog::read_data_from_file(file.path(), CatalogFormat::Rockstar, mask).unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse_mask, bench_read_file);
criterion_main!(benches);
