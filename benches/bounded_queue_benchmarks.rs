use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use rust_bounded_buffer::prelude::*;
use std::thread;

fn benchmark_queue_creation(c: &mut Criterion) {
    c.bench_function("queue_creation", |b| {
        b.iter(|| {
            let queue = BoundedQueue::<u64>::new(black_box(64)).expect("Failed to create queue");
            black_box(queue);
        });
    });
}

fn benchmark_uncontended(c: &mut Criterion) {
    let mut group = c.benchmark_group("uncontended");
    group.throughput(Throughput::Elements(1000));

    group.bench_function("insert_remove_1000", |b| {
        let queue = BoundedQueue::new(1000).expect("Failed to create queue");
        b.iter(|| {
            for i in 0..1000u64 {
                queue.insert(i);
            }
            for _ in 0..1000 {
                black_box(queue.remove());
            }
        });
    });

    group.bench_function("try_insert_full_1000", |b| {
        let queue = BoundedQueue::new(1).expect("Failed to create queue");
        queue.insert(0u64);
        b.iter(|| {
            for i in 0..1000u64 {
                let _ = black_box(queue.try_insert(i));
            }
        });
    });

    group.finish();
}

fn benchmark_contended(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended");
    let items = 10_000u64;
    group.throughput(Throughput::Elements(items));

    for capacity in [1usize, 16, 256] {
        for workers in [1usize, 4] {
            group.bench_with_input(
                BenchmarkId::new(format!("capacity_{}", capacity), format!("{}x{}", workers, workers)),
                &(capacity, workers),
                |b, &(capacity, workers)| {
                    b.iter(|| {
                        let queue = BoundedQueue::new(capacity).expect("Failed to create queue");
                        let per_worker = items / workers as u64;

                        let producers: Vec<_> = (0..workers)
                            .map(|_| {
                                let q = queue.clone();
                                thread::spawn(move || {
                                    for i in 0..per_worker {
                                        q.insert(i);
                                    }
                                })
                            })
                            .collect();
                        let consumers: Vec<_> = (0..workers)
                            .map(|_| {
                                let q = queue.clone();
                                thread::spawn(move || {
                                    let mut sum = 0u64;
                                    for _ in 0..per_worker {
                                        sum = sum.wrapping_add(q.remove());
                                    }
                                    sum
                                })
                            })
                            .collect();

                        for p in producers {
                            p.join().expect("producer panicked");
                        }
                        for c in consumers {
                            black_box(c.join().expect("consumer panicked"));
                        }
                    });
                },
            );
        }
    }

    group.finish();
}

fn benchmark_coordinator_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("coordinator_run");
    group.sample_size(20);

    group.bench_function("sample", |b| {
        b.iter(|| {
            let output = Coordinator::new(RunConfig::sample())
                .expect("Failed to create coordinator")
                .run()
                .expect("Run failed");
            black_box(output.report.success);
        });
    });

    // Randomised shapes so no single partition dominates
    let mut rng = rand::thread_rng();
    let shapes: Vec<_> = (0..8)
        .map(|_| {
            (
                rng.gen_range(1..=32usize),
                rng.gen_range(1..=8usize),
                rng.gen_range(1..=8usize),
            )
        })
        .collect();

    group.bench_function("random_shapes_2000_items", |b| {
        b.iter(|| {
            for &(capacity, producers, consumers) in &shapes {
                let output = Coordinator::new(RunConfig::new(capacity, producers, consumers, 2000))
                    .expect("Failed to create coordinator")
                    .run()
                    .expect("Run failed");
                black_box(output.report.success);
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_queue_creation,
    benchmark_uncontended,
    benchmark_contended,
    benchmark_coordinator_run
);
criterion_main!(benches);
