#![allow(dead_code)]
use shared::*;

use birchrng::config::RngConfig;
use birchrng::rng::{batch, incremental, AdjacencyMap};
use criterion::{criterion_group, Criterion};
use std::hint::black_box;

fn bench_insert_point(c: &mut Criterion) {
    let points = generate_raw_points(401, BENCH_DIMENSION);
    let (base, last) = points.split_at(points.len() - 1);
    let base = base.to_vec();
    let new_point = last[0].clone();
    let config = RngConfig::default();

    let mut cc = configure_criterion();
    cc.bench_function("incremental_insert_point_into_400", |b| {
        b.iter_with_setup(
            || -> AdjacencyMap { batch::compute_rng(&base) },
            |mut adjacency| {
                incremental::insert_point(black_box(&base), black_box(&new_point), &mut adjacency, &config);
                black_box(adjacency);
            },
        )
    });
}

criterion_group!(benches, bench_insert_point);
