//! Benchmarks for the banking pipeline's intake and batch-sealing path.
//!
//! Run with: cargo bench -p vcore-banking

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vcore_banking::{BankingPipelineBuilder, PipelineConfig};
use vcore_types::{PublicKey, Signature, Transaction};

fn bench_submit_transaction(c: &mut Criterion) {
    let pipeline = BankingPipelineBuilder::new(PipelineConfig::default(), PublicKey::zero()).start();

    c.bench_function("submit_transaction", |b| {
        b.iter(|| {
            let tx = Transaction::new(vec![Signature::zero()], b"payload".to_vec());
            pipeline.submit_transaction(black_box(tx));
        })
    });

    pipeline.shutdown();
}

criterion_group!(benches, bench_submit_transaction);
criterion_main!(benches);
