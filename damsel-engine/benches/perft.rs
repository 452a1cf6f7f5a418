use std::thread::available_parallelism;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use damsel_engine::perft::*;
use damsel_engine::*;

pub fn criterion_perft_small_benchmark(c: &mut Criterion) {
    // Setup
    let starting_position = Position::start_position();
    let num_threads = available_parallelism()
        .map(|inner| inner.get())
        .unwrap_or(1);

    // Benchmarks
    for (ply, expected) in [(2, 81), (3, 658), (4, 4_265)] {
        c.bench_function(&format!("start_position: perft({ply}) threads: 1"), |b| {
            b.iter(|| {
                let info = perft(black_box(starting_position), black_box(ply), black_box(1));
                assert_eq!(info.nodes, expected);
            })
        });
        c.bench_function(
            &format!("start_position: perft({ply}) threads: {num_threads}"),
            |b| {
                b.iter(|| {
                    let info = perft(
                        black_box(starting_position),
                        black_box(ply),
                        black_box(num_threads),
                    );
                    assert_eq!(info.nodes, expected);
                })
            },
        );
    }
}

pub fn criterion_perft_large_benchmark(c: &mut Criterion) {
    let starting_position = Position::start_position();
    let num_threads = available_parallelism()
        .map(|inner| inner.get())
        .unwrap_or(1);

    let mut group = c.benchmark_group("perft_large");
    group.sample_size(10);
    group.bench_function(&format!("start_position: perft(6) threads: {num_threads}"), |b| {
        b.iter(|| perft(black_box(starting_position), black_box(6), black_box(num_threads)))
    });
    group.finish();
}

criterion_group!(
    benches,
    criterion_perft_small_benchmark,
    criterion_perft_large_benchmark
);
criterion_main!(benches);
