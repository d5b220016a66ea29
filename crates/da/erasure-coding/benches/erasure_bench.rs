//! Benchmarks for Reed-Solomon-style shard encode/decode.
//!
//! Run with: cargo bench -p vcore-da-erasure

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vcore_da_erasure::{ReedSolomonDecoder, ReedSolomonEncoder};

fn bench_encode(c: &mut Criterion) {
    let encoder = ReedSolomonEncoder::new(10, 2).unwrap();
    let data = vec![0xABu8; 64 * 1024];

    c.bench_function("erasure_encode_64kb", |b| {
        b.iter(|| encoder.encode(black_box(&data)).unwrap());
    });
}

fn bench_decode(c: &mut Criterion) {
    let encoder = ReedSolomonEncoder::new(10, 2).unwrap();
    let decoder = ReedSolomonDecoder::new(10, 2).unwrap();
    let data = vec![0xABu8; 64 * 1024];
    let shards: Vec<_> = encoder.encode(&data).unwrap().into_iter().map(Some).collect();

    c.bench_function("erasure_decode_64kb", |b| {
        b.iter(|| decoder.decode(black_box(&shards)).unwrap());
    });
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
