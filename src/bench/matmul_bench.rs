//! Sequential reference vs monitored parallel product.

use std::hint::black_box;
use std::io;
use std::time::Duration;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use matmul_monitor::partition::{available_cores, effective_thread_count, partition_rows};
use matmul_monitor::threaded::orchestrator::run_parallel;
use matmul_monitor::{generate_operands, multiply_reference};

fn bench_matmul(c: &mut Criterion) {
    let mut group = c.benchmark_group("matmul_i32");
    group.sample_size(10);

    let cores = available_cores();
    for &size in &[64usize, 128, 256] {
        let (a, b) = generate_operands(size, size, size, 42);

        group.bench_with_input(BenchmarkId::new("reference", size), &size, |bench, _| {
            bench.iter(|| multiply_reference(black_box(&a), black_box(&b)).unwrap())
        });

        let threads = effective_thread_count(None, cores, size);
        let ranges = partition_rows(size, threads).unwrap();
        group.bench_with_input(BenchmarkId::new("parallel", size), &size, |bench, _| {
            bench.iter(|| {
                run_parallel(
                    black_box(&a),
                    black_box(&b),
                    &ranges,
                    cores,
                    Duration::from_millis(50),
                    io::sink(),
                )
                .unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_matmul);
criterion_main!(benches);
