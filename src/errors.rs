/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::fmt::{Debug, Display, Formatter};

/// Possible errors that may occur during decoding
pub enum FramePackErrors {
    /// The buffer does not start with a known framepack magic
    WrongMagicBytes(u16),
    /// The input buffer doesn't have enough bytes for the
    /// operation
    ///
    /// # Arguments
    /// - 1st argument is the number of bytes we expected
    /// - 2nd argument is number of bytes actually present
    InsufficientData(usize, usize),
    /// The header describes a pixel whose interleaved size is
    /// outside the supported `1..=8` byte range
    ///
    /// # Arguments
    /// - channels
    /// - bytes per channel
    InvalidPixelFormat(u8, u8),
    /// A Bayer frame with an odd width or height
    ///
    /// The mosaic filter halves both axes, behaviour on odd
    /// dimensions is undefined so they are rejected
    OddBayerDimensions(usize, usize),
    /// A Bayer frame whose channel count is not 1
    ///
    /// The mosaic carries one byte per pixel, its three planes
    /// only tile the frame exactly for a single channel
    BayerChannels(u8),
    /// The buffer carries the video magic but was handed to the
    /// intra-only decode path which has no reference frame
    MissingReference,
    /// The reference frame's layout does not match the header
    ReferenceMismatch,
    /// The entropy-coded payload decompressed to fewer bytes than
    /// the frame needs
    ///
    /// # Arguments
    /// - 1st argument is the number of bytes the frame needs
    /// - 2nd argument is the number of bytes recovered
    Truncated(usize, usize),
    /// A pixel buffer whose length does not match its layout
    ///
    /// # Arguments
    /// - 1st argument is the expected length
    /// - 2nd argument is the length found
    InvalidBufferSize(usize, usize),
    /// The entropy coder rejected the payload
    Decompress(std::io::Error),
    /// Generic message
    Generic(String),
    /// Generic message that does not need heap allocation
    GenericStatic(&'static str)
}

impl Debug for FramePackErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FramePackErrors::WrongMagicBytes(magic) => {
                writeln!(f, "Wrong magic bytes {magic:#06x}, not a framepack buffer")
            }
            FramePackErrors::InsufficientData(expected, found) => {
                writeln!(
                    f,
                    "Insufficient data, required {expected} bytes but the buffer has {found}"
                )
            }
            FramePackErrors::InvalidPixelFormat(channels, depth) => {
                writeln!(
                    f,
                    "Unsupported pixel format, {channels} channels at {depth} bytes per channel is outside the 1..=8 bytes per pixel range"
                )
            }
            FramePackErrors::OddBayerDimensions(width, height) => {
                writeln!(
                    f,
                    "Bayer frames need even dimensions, found {width}x{height}"
                )
            }
            FramePackErrors::BayerChannels(channels) => {
                writeln!(
                    f,
                    "Bayer frames carry one byte per pixel, expected 1 channel but found {channels}"
                )
            }
            FramePackErrors::MissingReference => {
                writeln!(
                    f,
                    "Buffer holds an inter-coded frame, decode it with a reference frame via the video path"
                )
            }
            FramePackErrors::ReferenceMismatch => {
                writeln!(
                    f,
                    "Reference frame layout does not match the compressed frame header"
                )
            }
            FramePackErrors::Truncated(expected, found) => {
                writeln!(
                    f,
                    "Payload decompressed to {found} bytes, the frame needs {expected}"
                )
            }
            FramePackErrors::InvalidBufferSize(expected, found) => {
                writeln!(
                    f,
                    "Pixel buffer length {found} does not match the layout, expected {expected}"
                )
            }
            FramePackErrors::Decompress(err) => {
                writeln!(f, "Entropy coder error {err:?}")
            }
            FramePackErrors::Generic(val) => {
                writeln!(f, "{val}")
            }
            FramePackErrors::GenericStatic(val) => {
                writeln!(f, "{val}")
            }
        }
    }
}

impl Display for FramePackErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{self:?}")
    }
}

impl std::error::Error for FramePackErrors {}

impl From<&'static str> for FramePackErrors {
    fn from(val: &'static str) -> Self {
        FramePackErrors::GenericStatic(val)
    }
}

impl From<std::io::Error> for FramePackErrors {
    fn from(err: std::io::Error) -> Self {
        FramePackErrors::Decompress(err)
    }
}

/// Errors encountered during encoding
pub enum FramePackEncodeErrors {
    /// A dimension cannot be represented in the 16-bit header field
    TooLargeDimensions(usize),
    /// Width or height is zero
    ZeroDimensions(usize, usize),
    /// The layout describes a pixel whose interleaved size is
    /// outside the supported `1..=8` byte range
    InvalidPixelFormat(u8, u8),
    /// A Bayer frame with an odd width or height
    OddBayerDimensions(usize, usize),
    /// A Bayer frame whose channel count is not 1
    BayerChannels(u8),
    /// Pixel data length does not match the layout
    ///
    /// # Arguments
    /// - 1st argument is the expected length
    /// - 2nd argument is the length found
    WrongInputSize(usize, usize),
    /// The reference frame's length does not match the current frame
    ReferenceMismatch(usize, usize),
    /// The caller-provided output buffer is smaller than `max_size`
    ///
    /// # Arguments
    /// - 1st argument is the required size
    /// - 2nd argument is the size found
    TooSmallOutput(usize, usize),
    /// The entropy coder failed
    Compress(std::io::Error)
}

impl Debug for FramePackEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FramePackEncodeErrors::TooLargeDimensions(dim) => {
                writeln!(
                    f,
                    "Too large dimension {dim}, the header stores dimensions in 16 bits so the limit is {}",
                    u16::MAX
                )
            }
            FramePackEncodeErrors::ZeroDimensions(width, height) => {
                writeln!(f, "Cannot encode an empty {width}x{height} frame")
            }
            FramePackEncodeErrors::InvalidPixelFormat(channels, depth) => {
                writeln!(
                    f,
                    "Unsupported pixel format, {channels} channels at {depth} bytes per channel is outside the 1..=8 bytes per pixel range"
                )
            }
            FramePackEncodeErrors::OddBayerDimensions(width, height) => {
                writeln!(
                    f,
                    "Bayer frames need even dimensions, found {width}x{height}"
                )
            }
            FramePackEncodeErrors::BayerChannels(channels) => {
                writeln!(
                    f,
                    "Bayer frames carry one byte per pixel, expected 1 channel but found {channels}"
                )
            }
            FramePackEncodeErrors::WrongInputSize(expected, found) => {
                writeln!(
                    f,
                    "Pixel data length {found} does not match the layout, expected {expected}"
                )
            }
            FramePackEncodeErrors::ReferenceMismatch(expected, found) => {
                writeln!(
                    f,
                    "Reference frame has {found} bytes but the current frame has {expected}"
                )
            }
            FramePackEncodeErrors::TooSmallOutput(expected, found) => {
                writeln!(
                    f,
                    "Too small output buffer, need {expected} bytes but found {found}"
                )
            }
            FramePackEncodeErrors::Compress(err) => {
                writeln!(f, "Entropy coder error {err:?}")
            }
        }
    }
}

impl Display for FramePackEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{self:?}")
    }
}

impl std::error::Error for FramePackEncodeErrors {}

impl From<std::io::Error> for FramePackEncodeErrors {
    fn from(err: std::io::Error) -> Self {
        FramePackEncodeErrors::Compress(err)
    }
}
