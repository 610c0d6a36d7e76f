//! Single-threaded micro-operation benchmarks for every queue variant.
//!
//! Run with: `cargo bench --bench mri_queue`
//!
//! Measures the uncontended cost of offer (with and without eviction), poll
//! and targeted removal, so lock overhead of the shared variants is visible
//! against the sequential baseline.

use std::hint::black_box;
use std::time::Instant;

use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use mriqueue::queue::blocking::BlockingMriQueue;
use mriqueue::queue::locked::LockedMriQueue;
use mriqueue::queue::mri::MriQueue;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const CAPACITY: usize = 1_024;
const OPS: u64 = 100_000;

// ============================================================================
// Offer into a full queue (every offer evicts)
// ============================================================================

fn bench_offer_evicting(c: &mut Criterion) {
    let mut group = c.benchmark_group("offer_evicting_ns");
    group.throughput(Throughput::Elements(OPS));

    group.bench_function("sequential", |b| {
        b.iter_custom(|iters| {
            let mut queue = MriQueue::new(CAPACITY);
            queue.extend(0..CAPACITY as u64);
            let start = Instant::now();
            for _ in 0..iters {
                for i in 0..OPS {
                    black_box(queue.offer(black_box(i)));
                }
            }
            start.elapsed()
        })
    });

    group.bench_function("locked", |b| {
        b.iter_custom(|iters| {
            let queue = LockedMriQueue::new(CAPACITY);
            for i in 0..CAPACITY as u64 {
                queue.offer(i);
            }
            let start = Instant::now();
            for _ in 0..iters {
                for i in 0..OPS {
                    black_box(queue.offer(black_box(i)));
                }
            }
            start.elapsed()
        })
    });

    group.bench_function("blocking", |b| {
        b.iter_custom(|iters| {
            let queue = BlockingMriQueue::new(CAPACITY);
            for i in 0..CAPACITY as u64 {
                queue.offer(i);
            }
            let start = Instant::now();
            for _ in 0..iters {
                for i in 0..OPS {
                    black_box(queue.offer(black_box(i)));
                }
            }
            start.elapsed()
        })
    });

    group.finish();
}

// ============================================================================
// Offer then poll (queue never fills)
// ============================================================================

fn bench_offer_poll(c: &mut Criterion) {
    let mut group = c.benchmark_group("offer_poll_ns");
    group.throughput(Throughput::Elements(OPS));

    group.bench_function("sequential", |b| {
        let mut queue = MriQueue::new(CAPACITY);
        b.iter(|| {
            for i in 0..OPS {
                queue.offer(i);
                black_box(queue.poll());
            }
        })
    });

    group.bench_function("locked", |b| {
        let queue = LockedMriQueue::new(CAPACITY);
        b.iter(|| {
            for i in 0..OPS {
                queue.offer(i);
                black_box(queue.poll());
            }
        })
    });

    group.bench_function("blocking", |b| {
        let queue = BlockingMriQueue::new(CAPACITY);
        b.iter(|| {
            for i in 0..OPS {
                queue.offer(i);
                black_box(queue.poll());
            }
        })
    });

    group.finish();
}

// ============================================================================
// Targeted removal of a random element from a full queue
// ============================================================================

fn bench_remove_random(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove_random");
    group.throughput(Throughput::Elements(1));

    group.bench_function("sequential", |b| {
        let mut rng = StdRng::seed_from_u64(42);
        b.iter_batched(
            || {
                let queue = MriQueue::from_iter_with_capacity(CAPACITY, 0..CAPACITY as u64);
                (queue.unwrap(), rng.gen_range(0..CAPACITY as u64))
            },
            |(mut queue, target)| black_box(queue.remove(&target)),
            BatchSize::SmallInput,
        )
    });

    group.bench_function("blocking", |b| {
        let mut rng = StdRng::seed_from_u64(42);
        b.iter_batched(
            || {
                let queue = BlockingMriQueue::new(CAPACITY);
                for i in 0..CAPACITY as u64 {
                    queue.offer(i);
                }
                (queue, rng.gen_range(0..CAPACITY as u64))
            },
            |(queue, target)| black_box(queue.remove(&target)),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

// ============================================================================
// Bulk drain
// ============================================================================

fn bench_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("drain_all");
    group.throughput(Throughput::Elements(CAPACITY as u64));

    group.bench_function("blocking", |b| {
        b.iter_batched(
            || {
                let queue = BlockingMriQueue::new(CAPACITY);
                for i in 0..CAPACITY as u64 {
                    queue.offer(i);
                }
                (queue, Vec::with_capacity(CAPACITY))
            },
            |(queue, mut sink)| {
                queue.drain_all(&mut sink);
                black_box(sink)
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_offer_evicting,
    bench_offer_poll,
    bench_remove_random,
    bench_drain
);
criterion_main!(benches);
