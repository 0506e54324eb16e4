/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Lossless image and video-delta codec pairing reversible pixel filters
//! with zstd
//!
//! Raw frames go through a cheap decorrelating filter, the filtered bytes
//! through zstd, and an 8-byte self-describing header goes in front.
//! Decoding runs the pipeline backwards and reconstructs the pixels
//! bit-exactly.
//!
//! # Features
//! - Intra coding for 1 to 8 interleaved channels at 8 or 16 bits per
//!   channel, with specialized color-decorrelating paths for RGB/RGBA and
//!   Bayer mosaic frames
//! - Inter coding of a frame against a reference of the same shape, with
//!   automatic fallback to intra coding when the frames differ too much
//! - Optional shared dictionary trained on the first frame of a stream
//!
//! # Wire format
//!
//! | offset | size | field |
//! |--------|------|-------|
//! | 0      | 2    | magic, `0xFBF8` intra / `0xF8FB` video |
//! | 2      | 2    | width in pixels |
//! | 4      | 2    | height in pixels |
//! | 6      | 1    | channels |
//! | 7      | 1    | bytes per channel, above 8 means Bayer mosaic |
//!
//! All fields little-endian, followed by the zstd payload.
//!
//! # Example
//!
//! ```
//! use framepack::{FrameLayout, FramePackDecoder, FramePackEncoder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let layout = FrameLayout::new(2, 2, 1, 1);
//!     let pixels = [10_u8, 20, 30, 40];
//!
//!     let buffer = FramePackEncoder::new(&pixels, layout).encode()?;
//!
//!     let frame = FramePackDecoder::new(&buffer).decode()?;
//!     assert_eq!(frame.data(), &pixels);
//!     assert!(frame.is_intra());
//!     Ok(())
//! }
//! ```
pub use context::FramePackContext;
pub use decoder::{FramePackDecoder, FramePackDecoderOptions};
pub use encoder::FramePackEncoder;
pub use errors::{FramePackEncodeErrors, FramePackErrors};
pub use frame::{FrameLayout, ImageFrame};

mod constants;
mod context;
mod decoder;
mod encoder;
mod errors;
mod filters;
mod frame;
