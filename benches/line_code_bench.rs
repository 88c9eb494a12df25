//! Criterion benchmark untuk AMI line code
//!
//! Run dengan: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use amilink::protocol::{decode, encode, to_wire, Cipher, Encoder, Key, SignalCodec};

fn bench_line_code(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_code");

    for size in [16usize, 128, 1024].iter() {
        let bytes: Vec<u8> = (0..*size).map(|i| (i * 31 % 256) as u8).collect();
        let wire = to_wire(&encode(&bytes));
        group.throughput(Throughput::Bytes(*size as u64));

        group.bench_function(format!("encode_{}", size), |b| {
            b.iter(|| black_box(encode(black_box(&bytes))));
        });

        group.bench_function(format!("encode_prealloc_{}", size), |b| {
            let mut encoder = Encoder::new(size * 8);
            b.iter(|| {
                encoder.reset();
                black_box(encoder.encode(black_box(&bytes)).map(|w| w.len()));
            });
        });

        group.bench_function(format!("decode_{}", size), |b| {
            b.iter(|| black_box(decode(black_box(&wire)).map(|d| d.len())));
        });
    }

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let codec = SignalCodec::new(Cipher::new(Key(0xFE)));
    let message = "The quick brown fox jumps over the lazy dog";
    let wire = to_wire(&codec.transmit(message).unwrap());
    group.throughput(Throughput::Bytes(message.len() as u64));

    group.bench_function("transmit", |b| {
        let mut encoder = Encoder::new(1024);
        b.iter(|| {
            black_box(
                codec
                    .transmit_into(&mut encoder, black_box(message))
                    .map(|w| w.len()),
            )
        });
    });

    group.bench_function("receive", |b| {
        b.iter(|| black_box(codec.receive(black_box(&wire)).map(|s| s.len())));
    });

    group.finish();
}

criterion_group!(benches, bench_line_code, bench_pipeline);
criterion_main!(benches);
