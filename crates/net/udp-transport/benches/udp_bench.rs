//! Benchmarks for the priority queue and loopback send throughput.
//!
//! Run with: cargo bench -p vcore-net-udp

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::Duration;
use vcore_net_udp::{Packet, PacketQueue};

fn bench_enqueue(c: &mut Criterion) {
    let queue = PacketQueue::new(1 << 20);
    c.bench_function("udp_queue_enqueue", |b| {
        b.iter(|| {
            let packet = Packet::new(black_box(vec![0u8; 64]), "127.0.0.1".into(), 9000);
            queue.enqueue(packet);
        });
    });
}

fn bench_drain_batch(c: &mut Criterion) {
    let queue = PacketQueue::new(1 << 20);
    for _ in 0..10_000 {
        queue.enqueue(Packet::new(vec![0u8; 64], "127.0.0.1".into(), 9000));
    }
    c.bench_function("udp_queue_drain_128", |b| {
        b.iter(|| {
            let batch = queue.drain_batch(128, Duration::from_millis(1));
            for p in batch {
                queue.enqueue(p);
            }
        });
    });
}

criterion_group!(benches, bench_enqueue, bench_drain_batch);
criterion_main!(benches);
