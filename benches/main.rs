use criterion::criterion_main;

mod bench_insert;
mod bench_rng_incremental;

criterion_main!(
    bench_insert::benches,
    bench_rng_batch::benches,
    bench_rng_incremental::benches
);
