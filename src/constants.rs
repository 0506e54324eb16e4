/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

/// Magic for an intra-coded frame, stored little-endian at offset 0.
pub(crate) const FRAMEPACK_MAGIC: u16 = 0xFBF8;

/// Magic for an inter-coded (video delta) frame.
///
/// The byte-swapped twin of [`FRAMEPACK_MAGIC`], so a frame is recognizable
/// as framepack either way and the two modes can never be confused.
pub(crate) const FRAMEPACK_VIDEO_MAGIC: u16 = 0xF8FB;

/// Size of the fixed container header preceding the entropy-coded payload.
pub(crate) const HEADER_SIZE: usize = 8;

/// Escape byte for an inter-frame delta outside `[-127, 127]`.
///
/// A true delta of `-128` is never emitted, so the value is unambiguous.
pub(crate) const DELTA_ESCAPE: u8 = 0x80;

/// Number of delta escapes at which an inter-frame encode gives up and
/// re-packs the frame as intra.
pub(crate) const OVERFLOW_LIMIT: usize = 1000;

/// Slack appended to the packing scratch for the overflow region.
///
/// At most `OVERFLOW_LIMIT - 1` literal bytes are ever written there.
pub(crate) const OVERFLOW_SLACK: usize = 1000;

/// Largest interleaved pixel size the filter layer handles.
pub(crate) const MAX_PIXEL_BYTES: usize = 8;

/// Entropy stage compression level.
///
/// Filtered frames are already decorrelated, levels past 1 cost speed
/// for very little size.
pub(crate) const COMPRESSION_LEVEL: i32 = 1;

/// Capacity handed to the dictionary trainer.
pub(crate) const DICT_CAPACITY: usize = 100_000;

/// The packed scratch is split into `height * DICT_SAMPLES_PER_ROW` equal
/// samples for dictionary training.
pub(crate) const DICT_SAMPLES_PER_ROW: usize = 8;
