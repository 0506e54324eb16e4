/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Inter-frame coding: deltas, escapes, saturation fallback

use framepack::{FrameLayout, FramePackDecoder, FramePackEncoder, ImageFrame};
use nanorand::Rng;

fn noise(len: usize) -> Vec<u8> {
    let mut pixels = vec![0_u8; len];
    nanorand::WyRand::new().fill(&mut pixels);
    pixels
}

fn video_roundtrip(layout: FrameLayout, reference: &[u8], current: &[u8]) -> ImageFrame {
    let buffer = FramePackEncoder::new_video(current, layout, reference)
        .encode()
        .unwrap();

    let ref_frame = ImageFrame::new(layout, reference.to_vec()).unwrap();
    let frame = FramePackDecoder::new(&buffer)
        .decode_video(&ref_frame)
        .unwrap();

    assert_eq!(frame.data(), current);
    frame
}

#[test]
fn test_video_small_deltas() {
    let layout = FrameLayout::new(16, 16, 3, 1);
    let reference = noise(layout.frame_bytes());
    let current: Vec<u8> = reference.iter().map(|b| b.wrapping_add(3)).collect();

    // wrapping_add may push single bytes past the escape range, so only
    // check the mode, not the absence of escapes
    let frame = video_roundtrip(layout, &reference, &current);
    assert!(!frame.is_intra());
}

#[test]
fn test_video_magic_on_wire() {
    let layout = FrameLayout::new(4, 4, 1, 1);
    let reference = vec![100_u8; layout.frame_bytes()];
    let current = vec![103_u8; layout.frame_bytes()];

    let buffer = FramePackEncoder::new_video(&current, layout, &reference)
        .encode()
        .unwrap();
    assert_eq!(&buffer[..2], &[0xFB, 0xF8]);
}

#[test]
fn test_video_identical_frames() {
    let layout = FrameLayout::new(33, 21, 4, 1);
    let reference = noise(layout.frame_bytes());

    let frame = video_roundtrip(layout, &reference, &reference.clone());
    assert!(!frame.is_intra());
}

#[test]
fn test_video_escape_roundtrip() {
    let layout = FrameLayout::new(8, 8, 1, 1);
    let reference = vec![10_u8; layout.frame_bytes()];
    let mut current = reference.clone();
    // one pixel jumps far enough to force an escaped literal
    current[13] = 210;

    let frame = video_roundtrip(layout, &reference, &current);
    assert!(!frame.is_intra());
}

#[test]
fn test_video_chain_through_decoded_frames() {
    let layout = FrameLayout::new(24, 24, 2, 1);
    let first = noise(layout.frame_bytes());
    let second: Vec<u8> = first.iter().map(|b| b.wrapping_add(1)).collect();
    let third: Vec<u8> = second.iter().map(|b| b.wrapping_add(1)).collect();

    let intra = FramePackEncoder::new(&first, layout).encode().unwrap();
    let frame1 = FramePackDecoder::new(&intra).decode().unwrap();

    let delta1 = FramePackEncoder::new_video(&second, layout, frame1.data())
        .encode()
        .unwrap();
    let frame2 = FramePackDecoder::new(&delta1).decode_video(&frame1).unwrap();
    assert_eq!(frame2.data(), &second);

    let delta2 = FramePackEncoder::new_video(&third, layout, frame2.data())
        .encode()
        .unwrap();
    let frame3 = FramePackDecoder::new(&delta2).decode_video(&frame2).unwrap();
    assert_eq!(frame3.data(), &third);
}

#[test]
fn test_video_saturation_falls_back_to_intra() {
    // a mosaic frame where over 1000 pixels jump past the delta range
    let layout = FrameLayout::new(64, 32, 1, 16);
    let reference = vec![0_u8; layout.frame_bytes()];
    let mut current = vec![0_u8; layout.frame_bytes()];
    current[..1500].fill(200);

    let buffer = FramePackEncoder::new_video(&current, layout, &reference)
        .encode()
        .unwrap();
    // intra magic on the wire
    assert_eq!(&buffer[..2], &[0xF8, 0xFB]);

    // the video path must still decode it, flagged as intra
    let ref_frame = ImageFrame::new(layout, reference).unwrap();
    let frame = FramePackDecoder::new(&buffer)
        .decode_video(&ref_frame)
        .unwrap();
    assert!(frame.is_intra());
    assert_eq!(frame.data(), &current);
}

#[test]
fn test_video_below_saturation_stays_inter() {
    let layout = FrameLayout::new(64, 32, 1, 16);
    let reference = vec![0_u8; layout.frame_bytes()];
    let mut current = vec![0_u8; layout.frame_bytes()];
    // 999 escapes still fit the inter path
    current[..999].fill(200);

    let buffer = FramePackEncoder::new_video(&current, layout, &reference)
        .encode()
        .unwrap();
    assert_eq!(&buffer[..2], &[0xFB, 0xF8]);

    let ref_frame = ImageFrame::new(layout, reference).unwrap();
    let frame = FramePackDecoder::new(&buffer)
        .decode_video(&ref_frame)
        .unwrap();
    assert!(!frame.is_intra());
    assert_eq!(frame.data(), &current);
}

#[test]
fn test_video_decode_accepts_intra_buffers() {
    let layout = FrameLayout::new(12, 12, 3, 1);
    let pixels = noise(layout.frame_bytes());

    let buffer = FramePackEncoder::new(&pixels, layout).encode().unwrap();

    // any frame of the right layout works, it is never read
    let unrelated = ImageFrame::new(layout, vec![0; layout.frame_bytes()]).unwrap();
    let frame = FramePackDecoder::new(&buffer)
        .decode_video(&unrelated)
        .unwrap();

    assert!(frame.is_intra());
    assert_eq!(frame.data(), &pixels);
}

#[test]
fn test_video_buffer_rejected_without_reference() {
    let layout = FrameLayout::new(8, 8, 1, 1);
    let reference = vec![7_u8; layout.frame_bytes()];
    let current = vec![9_u8; layout.frame_bytes()];

    let buffer = FramePackEncoder::new_video(&current, layout, &reference)
        .encode()
        .unwrap();

    assert!(FramePackDecoder::new(&buffer).decode().is_err());
}

#[test]
fn test_video_decode_rejects_mismatched_reference() {
    let layout = FrameLayout::new(8, 8, 1, 1);
    let reference = vec![7_u8; layout.frame_bytes()];
    let current = vec![9_u8; layout.frame_bytes()];

    let buffer = FramePackEncoder::new_video(&current, layout, &reference)
        .encode()
        .unwrap();

    let other_layout = FrameLayout::new(8, 8, 2, 1);
    let wrong = ImageFrame::new(other_layout, vec![0; other_layout.frame_bytes()]).unwrap();
    assert!(FramePackDecoder::new(&buffer).decode_video(&wrong).is_err());
}
