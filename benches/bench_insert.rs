#![allow(dead_code)]
use shared::*;

use birchrng::{Tree, TreeConfig};
use criterion::{criterion_group, Criterion};
use std::hint::black_box;

fn bench_insert_bulk(c: &mut Criterion) {
    let points = generate_points(BENCH_NUM_INSERT, BENCH_DIMENSION);
    c.bench_function("insert_bulk", |b| {
        b.iter(|| {
            let mut tree = Tree::new(TreeConfig::new(BENCH_DIMENSION, BENCH_THRESHOLD));
            tree.insert_all(black_box(points.clone())).unwrap();
            black_box(tree.len());
        })
    });
}

fn bench_insert_one_more(c: &mut Criterion) {
    let points = generate_points(BENCH_NUM_INSERT, BENCH_DIMENSION);
    let (base, last) = points.split_at(points.len() - 1);
    let base = base.to_vec();
    let to_insert = last[0].clone();

    let mut cc = configure_criterion();
    cc.bench_function("insert_one_more_into_warm_tree", |b| {
        b.iter_with_setup(
            || {
                let mut tree = Tree::new(TreeConfig::new(BENCH_DIMENSION, BENCH_THRESHOLD));
                tree.insert_all(base.clone()).unwrap();
                tree
            },
            |mut tree| {
                black_box(tree.insert(to_insert.clone()).unwrap());
            },
        )
    });
}

criterion_group!(benches, bench_insert_bulk, bench_insert_one_more);
