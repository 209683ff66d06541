//! # Handoff Benchmark
//!
//! Measures:
//! 1. Uncontended publish (one write scope per iteration)
//! 2. Publish + read on one thread
//! 3. Publish while a second thread polls for reads
//!
//! Both role controllers are measured side by side.

#![allow(missing_docs)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use handoff_core::{AtomicRoles, HandoffBuffer, LockedRoles, RoleController};

const SNAPSHOT_LEN: usize = 4096;

fn snapshot_buffer<C: RoleController>() -> HandoffBuffer<Vec<u64>, C> {
    HandoffBuffer::from_fn(|_| vec![0; SNAPSHOT_LEN])
}

fn bench_publish<C: RoleController>(c: &mut Criterion) {
    let mut group = c.benchmark_group("publish");
    group.throughput(Throughput::Elements(1));

    let buffer = HandoffBuffer::<u64, C>::with_controller();
    group.bench_function(BenchmarkId::new("scalar", C::NAME), |b| {
        let mut value = 0_u64;
        b.iter(|| {
            value += 1;
            buffer.publish(black_box(value))
        });
    });

    let snapshots = snapshot_buffer::<C>();
    group.bench_function(BenchmarkId::new("snapshot_in_place", C::NAME), |b| {
        let mut frame = 0_u64;
        b.iter(|| {
            frame += 1;
            snapshots.write_with(|samples| samples.fill(frame));
        });
    });

    group.finish();
}

fn bench_round_trip<C: RoleController>(c: &mut Criterion) {
    let mut group = c.benchmark_group("round_trip");
    let buffer = HandoffBuffer::<u64, C>::with_controller();

    group.bench_function(BenchmarkId::new("publish_then_read", C::NAME), |b| {
        b.iter(|| {
            buffer.publish(black_box(7));
            buffer.read_with(|v| *v)
        });
    });

    group.finish();
}

fn bench_contended<C: RoleController + 'static>(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended_publish");

    let buffer = Arc::new(snapshot_buffer::<C>());
    let stop = Arc::new(AtomicBool::new(false));

    let reader = {
        let buffer = Arc::clone(&buffer);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut checksum = 0_u64;
            while !stop.load(Ordering::Relaxed) {
                if let Some(sum) = buffer.read_with(|samples| samples.iter().sum::<u64>()) {
                    checksum = checksum.wrapping_add(sum);
                }
            }
            checksum
        })
    };

    group.bench_function(BenchmarkId::new("snapshot_vs_poller", C::NAME), |b| {
        let mut frame = 0_u64;
        b.iter(|| {
            frame += 1;
            buffer.write_with(|samples| samples.fill(frame));
        });
    });

    stop.store(true, Ordering::Relaxed);
    let _ = black_box(reader.join().unwrap_or_default());

    group.finish();
}

fn bench_all(c: &mut Criterion) {
    bench_publish::<AtomicRoles>(c);
    bench_publish::<LockedRoles>(c);
    bench_round_trip::<AtomicRoles>(c);
    bench_round_trip::<LockedRoles>(c);
    bench_contended::<AtomicRoles>(c);
    bench_contended::<LockedRoles>(c);
}

criterion_group!(benches, bench_all);
criterion_main!(benches);
