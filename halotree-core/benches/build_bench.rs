//! Benchmarks for tree and forest construction.
//!
//! Synthetic consistent-trees catalogs are generated with random branching,
//! written depth-first the way consistent-trees writes them.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use halotree_core::{Catalog, CatalogFormat, Forest, Tree};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

/// Appends one tree of `size` halos in depth-first order
fn push_tree(rng: &mut StdRng, text: &mut String, next_id: &mut i64, size: usize) {
    // (id, scale, mass) of the open path from the root
    let mut path: Vec<(i64, f64, f64)> = Vec::new();

    for k in 0..size {
        if k > 0 {
            let keep = rng.random_range(1..=path.len());
            path.truncate(keep);
        }

        let (desc, desc_scale, parent_mass) = path.last().copied().unwrap_or((-1, 0.0, 1e14));
        let scale = if desc == -1 { 1.0 } else { desc_scale - 0.01 };
        let mass = parent_mass * rng.random_range(0.05..0.98);
        let id = *next_id;
        *next_id += 1;

        text.push_str(&format!(
            "{scale:.5} {id} {desc_scale:.5} {desc} 0 -1 -1 -1 0 {mass:.5e} {mass:.5e}\n"
        ));
        path.push((id, scale, mass));
    }
}

/// Catalog text holding `trees` trees of `size` halos each
fn synthetic_catalog(trees: usize, size: usize) -> String {
    let mut rng = StdRng::seed_from_u64(42);
    let mut text = String::from("#scale(0) id(1) desc_scale(2) desc_id(3) num_prog(4)\n");
    let mut next_id = 0;

    for _ in 0..trees {
        push_tree(&mut rng, &mut text, &mut next_id, size);
    }
    text
}

fn parse(text: &str) -> Catalog {
    Catalog::parse(text, CatalogFormat::ConsistentTrees, CatalogFormat::ConsistentTrees.tree_columns())
        .expect("synthetic catalog parses")
}

/// Benchmark: single tree of growing size
fn bench_tree_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_build");
    group.sample_size(30);

    for size in [100, 1_000, 5_000] {
        let catalog = parse(&synthetic_catalog(1, size));
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("halos", size), &size, |b, &sz| {
            b.iter(|| black_box(Tree::build(&catalog, 0, sz).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark: many small trees, the common shape of a tree file
fn bench_forest_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("forest_build");
    group.sample_size(30);

    for trees in [100, 1_000, 10_000] {
        let catalog = parse(&synthetic_catalog(trees, 20));
        group.throughput(Throughput::Elements(catalog.row_count() as u64));

        group.bench_with_input(BenchmarkId::new("trees", trees), &catalog, |b, catalog| {
            b.iter(|| black_box(Forest::build(catalog).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark: root discovery alone
fn bench_discover_roots(c: &mut Criterion) {
    let catalog = parse(&synthetic_catalog(10_000, 20));
    let desc = catalog.internal_key("descendant_id").unwrap();

    c.bench_function("discover_roots_200k", |b| {
        b.iter(|| black_box(Forest::discover_roots(&catalog, desc).unwrap()));
    });
}

criterion_group!(benches, bench_tree_build, bench_forest_build, bench_discover_roots);
criterion_main!(benches);
