/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use framepack::{FrameLayout, FramePackDecoder, FramePackEncoder};
use nanorand::Rng;

fn encode_frame(pixels: &[u8], layout: FrameLayout) -> Vec<u8> {
    FramePackEncoder::new(pixels, layout).encode().unwrap()
}

fn decode_frame(buffer: &[u8]) -> Vec<u8> {
    FramePackDecoder::new(buffer).decode().unwrap().into_data()
}

fn bench_roundtrip(c: &mut Criterion) {
    let layout = FrameLayout::new(256, 256, 4, 1);
    let mut pixels = vec![0_u8; layout.frame_bytes()];
    nanorand::WyRand::new().fill(&mut pixels);

    let buffer = encode_frame(&pixels, layout);

    let mut group = c.benchmark_group("framepack: 256x256 RGBA");
    group.throughput(Throughput::Bytes(layout.frame_bytes() as u64));

    group.bench_function("encode", |b| {
        b.iter(|| black_box(encode_frame(pixels.as_slice(), layout)))
    });

    group.bench_function("decode", |b| {
        b.iter(|| black_box(decode_frame(buffer.as_slice())))
    });
}

criterion_group!(benches, bench_roundtrip);
criterion_main!(benches);
