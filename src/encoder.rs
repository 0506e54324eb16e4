/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use log::trace;
use zstd::bulk::Compressor;

use crate::constants::{
    COMPRESSION_LEVEL, FRAMEPACK_MAGIC, FRAMEPACK_VIDEO_MAGIC, HEADER_SIZE, MAX_PIXEL_BYTES,
    OVERFLOW_SLACK
};
use crate::context::FramePackContext;
use crate::errors::FramePackEncodeErrors;
use crate::filters::{pack_frame, PackOutcome};
use crate::frame::{FrameHeader, FrameLayout};

/// A framepack encoder
///
/// Filters a raw frame into a decorrelated scratch, entropy codes the
/// scratch with zstd and prepends the 8-byte container header. With a
/// reference frame the encoder writes an inter-coded delta instead and
/// falls back to intra coding on its own when the delta saturates.
///
/// # Example
/// - Encode a 2 by 2 grayscale image
///
/// ```
/// use framepack::{FrameLayout, FramePackEncoder};
///
/// let pixels = [12_u8, 13, 200, 201];
/// let layout = FrameLayout::new(2, 2, 1, 1);
///
/// let mut encoder = FramePackEncoder::new(&pixels, layout);
/// let buffer = encoder.encode().unwrap();
/// assert!(buffer.len() <= encoder.max_size());
/// ```
pub struct FramePackEncoder<'a> {
    data:      &'a [u8],
    layout:    FrameLayout,
    reference: Option<&'a [u8]>,
    context:   Option<&'a mut FramePackContext>
}

impl<'a> FramePackEncoder<'a> {
    /// Create an encoder that will intra-code the frame
    ///
    /// # Arguments
    /// - `data`: Raw interleaved pixels, length must equal
    ///   `layout.frame_bytes()`
    /// - `layout`: Shape of the frame
    pub fn new(data: &'a [u8], layout: FrameLayout) -> FramePackEncoder<'a> {
        FramePackEncoder {
            data,
            layout,
            reference: None,
            context: None
        }
    }

    /// Create an encoder that will inter-code the frame against a
    /// reference of the same layout
    ///
    /// Pixels whose delta fits in `[-127, 127]` are stored as signed
    /// bytes, the rest escape to a literal overflow region. If more than
    /// 999 pixels escape the encoder silently re-packs the frame as
    /// intra, visible to the decoder through the header magic only.
    ///
    /// # Arguments
    /// - `data`: Raw pixels of the current frame
    /// - `layout`: Shape shared by both frames
    /// - `reference`: Raw pixels of the reference frame
    pub fn new_video(
        data: &'a [u8], layout: FrameLayout, reference: &'a [u8]
    ) -> FramePackEncoder<'a> {
        FramePackEncoder {
            data,
            layout,
            reference: Some(reference),
            context: None
        }
    }

    /// Attach a reusable context whose dictionary is trained on the first
    /// frame and shared by later encodes
    pub fn set_context(&mut self, context: &'a mut FramePackContext) {
        self.context = Some(context);
    }

    /// Return the buffer size that is always large enough for this
    /// frame, however badly it compresses
    ///
    /// [`encode_into`] requires its output buffer to be at least this
    /// large, [`encode`] allocates exactly this much and trims.
    ///
    /// [`encode`]: FramePackEncoder::encode
    /// [`encode_into`]: FramePackEncoder::encode_into
    pub fn max_size(&self) -> usize {
        HEADER_SIZE + zstd::zstd_safe::compress_bound(self.layout.frame_bytes() + OVERFLOW_SLACK)
    }

    fn validate(&self) -> Result<(), FramePackEncodeErrors> {
        let layout = &self.layout;

        if layout.width() == 0 || layout.height() == 0 {
            return Err(FramePackEncodeErrors::ZeroDimensions(
                layout.width(),
                layout.height()
            ));
        }
        if layout.width() > usize::from(u16::MAX) {
            return Err(FramePackEncodeErrors::TooLargeDimensions(layout.width()));
        }
        if layout.height() > usize::from(u16::MAX) {
            return Err(FramePackEncodeErrors::TooLargeDimensions(layout.height()));
        }

        let pixel_bytes = layout.pixel_bytes();
        if pixel_bytes == 0 || pixel_bytes > MAX_PIXEL_BYTES {
            return Err(FramePackEncodeErrors::InvalidPixelFormat(
                layout.channels(),
                layout.bytes_per_channel()
            ));
        }

        if layout.is_bayer() {
            if layout.channels() != 1 {
                return Err(FramePackEncodeErrors::BayerChannels(layout.channels()));
            }
            if layout.width() % 2 != 0 || layout.height() % 2 != 0 {
                return Err(FramePackEncodeErrors::OddBayerDimensions(
                    layout.width(),
                    layout.height()
                ));
            }
        }

        if self.data.len() != layout.frame_bytes() {
            return Err(FramePackEncodeErrors::WrongInputSize(
                layout.frame_bytes(),
                self.data.len()
            ));
        }
        if let Some(reference) = self.reference {
            if reference.len() != self.data.len() {
                return Err(FramePackEncodeErrors::ReferenceMismatch(
                    self.data.len(),
                    reference.len()
                ));
            }
        }
        Ok(())
    }

    /// Encode the frame, returning the compressed buffer
    ///
    /// # Returns
    /// - On success: A self-describing buffer, never longer than
    ///   [`max_size`]
    /// - On error: The reason encoding failed, nothing is allocated for
    ///   the caller on that path
    ///
    /// [`max_size`]: FramePackEncoder::max_size
    pub fn encode(&mut self) -> Result<Vec<u8>, FramePackEncodeErrors> {
        let mut output = vec![0_u8; self.max_size()];
        let written = self.encode_into(&mut output)?;
        output.truncate(written);
        Ok(output)
    }

    /// Encode the frame into a caller-provided buffer
    ///
    /// # Arguments
    /// - `output`: Destination, must hold at least [`max_size`] bytes
    ///
    /// # Returns
    /// - On success: Number of bytes written, starting at `output[0]`
    /// - On error: The reason encoding failed, `output` contents are
    ///   unspecified
    ///
    /// [`max_size`]: FramePackEncoder::max_size
    pub fn encode_into(&mut self, output: &mut [u8]) -> Result<usize, FramePackEncodeErrors> {
        self.validate()?;

        let max_size = self.max_size();
        if output.len() < max_size {
            return Err(FramePackEncodeErrors::TooSmallOutput(max_size, output.len()));
        }

        let frame_bytes = self.layout.frame_bytes();
        let mut packing = vec![0_u8; frame_bytes + OVERFLOW_SLACK];

        let outcome = pack_frame(self.data, self.layout, self.reference, &mut packing);

        let (magic, packed_len) = match outcome {
            PackOutcome::Video { overflow } => (FRAMEPACK_VIDEO_MAGIC, frame_bytes + overflow),
            PackOutcome::Intra => (FRAMEPACK_MAGIC, frame_bytes)
        };

        if let Some(context) = self.context.as_deref_mut() {
            context.train(&packing[..frame_bytes], self.layout.height());
        }
        let mut compressor = match self.context.as_deref() {
            Some(context) => context.compressor()?,
            None => Compressor::new(COMPRESSION_LEVEL)?
        };

        let compressed =
            compressor.compress_to_buffer(&packing[..packed_len], &mut output[HEADER_SIZE..])?;

        let header = FrameHeader {
            magic,
            width: self.layout.width() as u16,
            height: self.layout.height() as u16,
            channels: self.layout.channels(),
            bytes_per_channel: self.layout.bytes_per_channel()
        };
        output[..HEADER_SIZE].copy_from_slice(&header.to_bytes());

        trace!(
            "encoded {}x{} frame, {} packed bytes into {}",
            self.layout.width(),
            self.layout.height(),
            packed_len,
            HEADER_SIZE + compressed
        );

        Ok(HEADER_SIZE + compressed)
    }
}
