//! Benchmarks for tree traversals.
//!
//! Main-branch extraction and breadth-first threshold searches over one
//! large synthetic tree.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use halotree_core::tree::{assembly_scales, breadth_first_search, traverse_most_massive_branch};
use halotree_core::{Catalog, CatalogFormat, Tree};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

/// One tree of `size` halos, depth-first, most massive progenitor first
fn synthetic_tree(size: usize) -> String {
    let mut rng = StdRng::seed_from_u64(7);
    let mut text = String::new();
    let mut path: Vec<(i64, f64, f64, bool)> = Vec::new();

    for id in 0..size as i64 {
        if id > 0 {
            // Favour long branches so the main branch is deep
            let keep = if rng.random_bool(0.8) { path.len() } else { rng.random_range(1..=path.len()) };
            path.truncate(keep);
        }

        let (desc, desc_scale, parent_mass, has_child) = path.last().copied().unwrap_or((-1, 0.0, 1e14, false));
        let scale = if desc == -1 { 1.0 } else { desc_scale - 0.005 };
        let fraction = if has_child { rng.random_range(0.01..0.3) } else { rng.random_range(0.7..0.99) };
        let mass = parent_mass * fraction;

        if let Some(parent) = path.last_mut() {
            parent.3 = true;
        }
        text.push_str(&format!(
            "{scale:.5} {id} {desc_scale:.5} {desc} 0 -1 -1 -1 0 {mass:.5e} {mass:.5e}\n"
        ));
        path.push((id, scale, mass, false));
    }

    text
}

fn build(size: usize) -> (Catalog, Tree) {
    let text = synthetic_tree(size);
    let catalog =
        Catalog::parse(&text, CatalogFormat::ConsistentTrees, CatalogFormat::ConsistentTrees.tree_columns()).unwrap();
    let tree = Tree::build(&catalog, 0, size).unwrap();
    (catalog, tree)
}

/// Benchmark: main branch of trees of growing size
fn bench_main_branch(c: &mut Criterion) {
    let mut group = c.benchmark_group("main_branch");
    group.sample_size(50);

    for size in [1_000, 5_000] {
        let (catalog, tree) = build(size);
        let mvir = catalog.internal_key("virial_mass").unwrap();
        group.throughput(Throughput::Elements(tree.root().main_branch().count() as u64));

        group.bench_with_input(BenchmarkId::new("halos", size), &size, |b, _| {
            b.iter(|| black_box(traverse_most_massive_branch::<f64>(&catalog, tree.root(), mvir).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark: BFS with thresholds of growing selectivity
fn bench_bfs_threshold(c: &mut Criterion) {
    let mut group = c.benchmark_group("bfs_threshold");
    group.sample_size(50);

    let (catalog, tree) = build(5_000);
    let mvir = catalog.internal_key("virial_mass").unwrap();
    group.throughput(Throughput::Elements(tree.len() as u64));

    for threshold in [1e9, 1e11, 1e13] {
        group.bench_with_input(BenchmarkId::new("mvir_gt", threshold), &threshold, |b, &t| {
            b.iter(|| black_box(breadth_first_search(&catalog, tree.root(), mvir, t, f64::gt).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark: half-mass and quarter-mass assembly scales
fn bench_assembly(c: &mut Criterion) {
    let (catalog, tree) = build(5_000);

    c.bench_function("assembly_scales_5k", |b| {
        b.iter(|| black_box(assembly_scales(&catalog, &tree, &[0.5, 0.25]).unwrap()));
    });
}

criterion_group!(benches, bench_main_branch, bench_bfs_threshold, bench_assembly);
criterion_main!(benches);
