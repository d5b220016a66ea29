//! Benchmarks for Turbine tree construction and shred broadcast encoding.
//!
//! Run with: cargo bench -p vcore-da-turbine

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vcore_da_turbine::{TurbineBroadcaster, TurbineNode, TurbineTree};
use vcore_types::{PublicKey, Signature};

fn make_nodes(n: u8) -> Vec<TurbineNode> {
    (0..n)
        .map(|i| TurbineNode {
            pubkey: PublicKey([i; 32]),
            address: format!("10.0.0.{i}"),
            port: 8000,
            stake_weight: (n - i) as u64,
        })
        .collect()
}

fn bench_tree_build(c: &mut Criterion) {
    let nodes = make_nodes(200);
    let me = nodes[0].clone();
    c.bench_function("turbine_tree_build_200", |b| {
        b.iter(|| TurbineTree::build(black_box(nodes.clone()), me.clone(), 8));
    });
}

fn bench_make_shreds(c: &mut Criterion) {
    let broadcaster = TurbineBroadcaster::new(10, 2, 1).unwrap();
    let payload = vec![0xABu8; 64 * 1024];
    c.bench_function("turbine_make_shreds_64kb", |b| {
        b.iter(|| {
            broadcaster
                .make_shreds(1, 1, black_box(&payload), |_| Signature::zero())
                .unwrap()
        });
    });
}

criterion_group!(benches, bench_tree_build, bench_make_shreds);
criterion_main!(benches);
