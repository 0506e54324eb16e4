/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Bayer mosaic frames, selected through the depth sentinel

use framepack::{FrameLayout, FramePackDecoder, FramePackEncoder};
use nanorand::Rng;

#[test]
fn test_bayer_roundtrip() {
    let layout = FrameLayout::new(64, 48, 1, 16);
    assert!(layout.is_bayer());

    let mut pixels = vec![0_u8; layout.frame_bytes()];
    nanorand::WyRand::new().fill(&mut pixels);

    let buffer = FramePackEncoder::new(&pixels, layout).encode().unwrap();
    let frame = FramePackDecoder::new(&buffer).decode().unwrap();

    assert_eq!(frame.data(), &pixels);
    // the sentinel depth survives the trip untouched
    assert_eq!(frame.layout().bytes_per_channel(), 16);
}

#[test]
fn test_bayer_smallest_frame() {
    let layout = FrameLayout::new(2, 2, 1, 9);
    let pixels = [100_u8, 50, 60, 200];

    let buffer = FramePackEncoder::new(&pixels, layout).encode().unwrap();
    let frame = FramePackDecoder::new(&buffer).decode().unwrap();
    assert_eq!(frame.data(), &pixels);
}

#[test]
fn test_bayer_rejects_odd_dimensions() {
    for (width, height) in [(5, 4), (4, 5), (3, 3)] {
        let layout = FrameLayout::new(width, height, 1, 16);
        let pixels = vec![0_u8; layout.frame_bytes()];
        assert!(
            FramePackEncoder::new(&pixels, layout).encode().is_err(),
            "{width}x{height} must be rejected"
        );
    }
}

#[test]
fn test_bayer_rejects_multi_channel() {
    let layout = FrameLayout::new(4, 4, 2, 16);
    let pixels = vec![0_u8; layout.frame_bytes()];
    assert!(FramePackEncoder::new(&pixels, layout).encode().is_err());
}

#[test]
fn test_bayer_header_rejected_on_decode_when_odd() {
    // hand-built header: intra magic, 5x4, sentinel depth
    let header = [0xF8, 0xFB, 5, 0, 4, 0, 1, 16];
    assert!(FramePackDecoder::new(&header).decode().is_err());
}
