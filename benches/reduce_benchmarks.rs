//! Performance benchmarks for the parallel column reduction
//! Measures end-to-end throughput across file counts and pool sizes

use colstats::{reduce_with, CancellationSignal, WorkerPool};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::fs;
use std::hint::black_box;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use tokio::runtime::Runtime;

const ROWS_PER_FILE: usize = 2_500;

/// Write `count` access-log style CSV files
fn create_files(dir: &TempDir, count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| {
            let mut body = String::from("IP Address,Timestamp,Response Time,Bytes\n");
            for row in 0..ROWS_PER_FILE {
                body.push_str(&format!(
                    "192.168.0.{},{},{},{}\n",
                    row % 255,
                    1_520_698_621 + row,
                    200 + (row * 7 + i) % 60,
                    3000 + (row * 13) % 900
                ));
            }
            let path = dir.path().join(format!("bench_{i}.csv"));
            fs::write(&path, body).unwrap();
            path
        })
        .collect()
}

fn bench_file_count(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("reduce_file_count");
    group.measurement_time(Duration::from_secs(10));

    for count in [1, 10, 50] {
        let dir = TempDir::new().unwrap();
        let files = create_files(&dir, count);
        group.throughput(Throughput::Elements((count * ROWS_PER_FILE) as u64));

        for op in ["avg", "min"] {
            group.bench_with_input(BenchmarkId::new(op, count), &files, |b, files| {
                b.to_async(&rt).iter(|| async move {
                    reduce_with(
                        black_box(files),
                        op,
                        3,
                        WorkerPool::default(),
                        CancellationSignal::new(),
                        &mut io::sink(),
                    )
                    .await
                    .unwrap()
                });
            });
        }
    }

    group.finish();
}

fn bench_pool_size(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("reduce_pool_size");
    group.measurement_time(Duration::from_secs(10));

    let dir = TempDir::new().unwrap();
    let files = create_files(&dir, 32);
    let files = &files;

    for workers in [1, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, &workers| {
            b.to_async(&rt).iter(|| async move {
                reduce_with(
                    black_box(files),
                    "sum",
                    3,
                    WorkerPool::new(workers),
                    CancellationSignal::new(),
                    &mut io::sink(),
                )
                .await
                .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_file_count, bench_pool_size);
criterion_main!(benches);
