//! Benchmarks for fork choice head selection under load.
//!
//! Run with: cargo bench -p vcore-consensus

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::Instant;
use vcore_consensus::{ForkChoiceConfig, ForkChoiceEngine, VoteInfo};
use vcore_types::{Hash, PublicKey};

fn build_chain(engine: &ForkChoiceEngine, len: u64) -> Hash {
    let mut parent = Hash::zero();
    let mut head = parent;
    for slot in 1..=len {
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&slot.to_le_bytes());
        let hash = Hash(bytes);
        engine.add_block(hash, parent, slot);
        parent = hash;
        head = hash;
    }
    head
}

fn bench_add_vote(c: &mut Criterion) {
    let engine = ForkChoiceEngine::new(ForkChoiceConfig::default());
    let head = build_chain(&engine, 200);

    c.bench_function("add_vote_on_deep_chain", |b| {
        b.iter(|| {
            engine.add_vote(VoteInfo {
                slot: 200,
                block_hash: black_box(head),
                validator_identity: PublicKey([7u8; 32]),
                stake_weight: 100,
                lockout_distance: 0,
                timestamp: Instant::now(),
            });
        })
    });
}

fn bench_update_fork_weights(c: &mut Criterion) {
    let engine = ForkChoiceEngine::new(ForkChoiceConfig::default());
    build_chain(&engine, 500);

    c.bench_function("update_fork_weights_500_blocks", |b| {
        b.iter(|| engine.update_fork_weights());
    });
}

criterion_group!(benches, bench_add_vote, bench_update_fork_weights);
criterion_main!(benches);
