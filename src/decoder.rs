/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use log::trace;
use zstd::bulk::Decompressor;

use crate::constants::{
    FRAMEPACK_MAGIC, FRAMEPACK_VIDEO_MAGIC, HEADER_SIZE, MAX_PIXEL_BYTES, OVERFLOW_SLACK
};
use crate::errors::FramePackErrors;
use crate::filters::unpack_frame;
use crate::frame::{FrameHeader, FrameLayout, ImageFrame};

/// Limits a decoder will enforce before allocating anything
///
/// The wire format caps dimensions at 65535 either way, these exist so
/// callers handling untrusted buffers can clamp allocations well below
/// that.
#[derive(Copy, Clone, Debug)]
pub struct FramePackDecoderOptions {
    max_width:  usize,
    max_height: usize
}

impl FramePackDecoderOptions {
    /// Return the configured maximum width
    pub const fn max_width(&self) -> usize {
        self.max_width
    }

    /// Return the configured maximum height
    pub const fn max_height(&self) -> usize {
        self.max_height
    }

    /// Set the maximum width the decoder will accept
    pub fn set_max_width(mut self, width: usize) -> Self {
        self.max_width = width;
        self
    }

    /// Set the maximum height the decoder will accept
    pub fn set_max_height(mut self, height: usize) -> Self {
        self.max_height = height;
        self
    }
}

impl Default for FramePackDecoderOptions {
    fn default() -> Self {
        FramePackDecoderOptions {
            max_width:  1 << 16,
            max_height: 1 << 16
        }
    }
}

/// A framepack decoder
///
/// The decoder is initialized by calling [`new`] and either of
/// [`decode_headers`] to read frame metadata or [`decode`] /
/// [`decode_video`] to reconstruct pixels.
///
/// Frame details like width, height and layout are accessible after
/// decoding headers.
///
/// [`new`]: FramePackDecoder::new
/// [`decode_headers`]: FramePackDecoder::decode_headers
/// [`decode`]: FramePackDecoder::decode
/// [`decode_video`]: FramePackDecoder::decode_video
pub struct FramePackDecoder<'a> {
    data:            &'a [u8],
    layout:          FrameLayout,
    intra:           bool,
    decoded_headers: bool,
    dictionary:      Option<&'a [u8]>,
    options:         FramePackDecoderOptions
}

impl<'a> FramePackDecoder<'a> {
    /// Create a new decoder with the default options
    ///
    /// # Arguments
    /// - `data`: A complete compressed framepack buffer
    pub fn new(data: &'a [u8]) -> FramePackDecoder<'a> {
        FramePackDecoder::new_with_options(data, FramePackDecoderOptions::default())
    }

    /// Create a new decoder that obeys the specified limits
    ///
    /// E.g. can be used to set width and height limits to prevent OOM
    /// attacks on untrusted input
    ///
    /// # Arguments
    /// - `data`: A complete compressed framepack buffer
    /// - `options`: Limits the decoder should respect
    pub fn new_with_options(
        data: &'a [u8], options: FramePackDecoderOptions
    ) -> FramePackDecoder<'a> {
        FramePackDecoder {
            data,
            layout: FrameLayout::new(0, 0, 0, 0),
            intra: true,
            decoded_headers: false,
            dictionary: None,
            options
        }
    }

    /// Use a trained dictionary for the entropy stage
    ///
    /// Required for buffers that were compressed through a
    /// [`FramePackContext`], see [`FramePackContext::dictionary`].
    ///
    /// [`FramePackContext`]: crate::FramePackContext
    /// [`FramePackContext::dictionary`]: crate::FramePackContext::dictionary
    pub fn set_dictionary(&mut self, dictionary: &'a [u8]) {
        self.dictionary = Some(dictionary);
    }

    /// Parse and validate the container header, storing frame metadata
    /// in the decoder
    ///
    /// # Returns
    /// - On success: Nothing, dimensions and layout become available
    /// - On error: Why the buffer cannot be a framepack frame
    pub fn decode_headers(&mut self) -> Result<(), FramePackErrors> {
        if self.decoded_headers {
            return Ok(());
        }

        if self.data.len() < HEADER_SIZE {
            return Err(FramePackErrors::InsufficientData(
                HEADER_SIZE,
                self.data.len()
            ));
        }
        let header_bytes: [u8; HEADER_SIZE] = self.data[..HEADER_SIZE].try_into().unwrap();
        let header = FrameHeader::from_bytes(&header_bytes);

        match header.magic {
            FRAMEPACK_MAGIC => {}
            FRAMEPACK_VIDEO_MAGIC => self.intra = false,
            other => return Err(FramePackErrors::WrongMagicBytes(other))
        }

        let layout = header.layout();

        if layout.width() > self.options.max_width() {
            let msg = format!(
                "Width {} greater than max configured width {}",
                layout.width(),
                self.options.max_width()
            );
            return Err(FramePackErrors::Generic(msg));
        }
        if layout.height() > self.options.max_height() {
            let msg = format!(
                "Height {} greater than max configured height {}",
                layout.height(),
                self.options.max_height()
            );
            return Err(FramePackErrors::Generic(msg));
        }

        let pixel_bytes = layout.pixel_bytes();
        if pixel_bytes == 0 || pixel_bytes > MAX_PIXEL_BYTES {
            return Err(FramePackErrors::InvalidPixelFormat(
                layout.channels(),
                layout.bytes_per_channel()
            ));
        }
        if layout.is_bayer() {
            if layout.channels() != 1 {
                return Err(FramePackErrors::BayerChannels(layout.channels()));
            }
            if layout.width() % 2 != 0 || layout.height() % 2 != 0 {
                return Err(FramePackErrors::OddBayerDimensions(
                    layout.width(),
                    layout.height()
                ));
            }
        }

        trace!("frame width: {}", layout.width());
        trace!("frame height: {}", layout.height());
        trace!(
            "frame format: {} channels, {} bytes per channel",
            layout.channels(),
            layout.bytes_per_channel()
        );
        trace!("intra coded: {}", self.intra);

        self.layout = layout;
        self.decoded_headers = true;

        Ok(())
    }

    /// Return the number of bytes required to hold the decoded frame
    ///
    /// # Returns
    /// - `Some(usize)`: Size of the raw pixel buffer
    /// - `None`: The headers have not been decoded
    pub fn output_buffer_size(&self) -> Option<usize> {
        if self.decoded_headers {
            Some(self.layout.frame_bytes())
        } else {
            None
        }
    }

    /// Return the width and height of the frame, or `None` if the
    /// headers haven't been decoded
    pub const fn dimensions(&self) -> Option<(usize, usize)> {
        if self.decoded_headers {
            return Some((self.layout.width(), self.layout.height()));
        }
        None
    }

    /// Return the frame layout, or `None` if the headers haven't been
    /// decoded
    pub const fn layout(&self) -> Option<FrameLayout> {
        if self.decoded_headers {
            return Some(self.layout);
        }
        None
    }

    /// Return whether the buffer holds an intra-coded frame, or `None`
    /// if the headers haven't been decoded
    pub const fn is_intra(&self) -> Option<bool> {
        if self.decoded_headers {
            return Some(self.intra);
        }
        None
    }

    /// Decode an intra-coded frame
    ///
    /// Buffers carrying the video magic are rejected here since their
    /// pixels only exist relative to a reference frame, use
    /// [`decode_video`] for those.
    ///
    /// # Returns
    /// - On success: The reconstructed frame, bit-exact with what the
    ///   encoder was given
    /// - On error: Why the buffer could not be decoded
    ///
    /// [`decode_video`]: FramePackDecoder::decode_video
    pub fn decode(&mut self) -> Result<ImageFrame, FramePackErrors> {
        self.decode_headers()?;

        if !self.intra {
            return Err(FramePackErrors::MissingReference);
        }
        self.decode_frame(None)
    }

    /// Decode a frame that may be inter-coded against a reference
    ///
    /// Intra-coded buffers decode as usual and the reference is left
    /// untouched, so a video stream's occasional intra frames pass
    /// through this path transparently. The returned frame's
    /// [`is_intra`] tells the caller which one it was.
    ///
    /// # Arguments
    /// - `reference`: The previously reconstructed frame, its layout
    ///   must match the compressed header for inter-coded buffers
    ///
    /// [`is_intra`]: ImageFrame::is_intra
    pub fn decode_video(&mut self, reference: &ImageFrame) -> Result<ImageFrame, FramePackErrors> {
        self.decode_headers()?;

        if self.intra {
            return self.decode_frame(None);
        }
        if reference.layout() != self.layout {
            return Err(FramePackErrors::ReferenceMismatch);
        }
        self.decode_frame(Some(reference.data()))
    }

    fn decode_frame(&mut self, reference: Option<&[u8]>) -> Result<ImageFrame, FramePackErrors> {
        let frame_bytes = self.layout.frame_bytes();
        let mut packing = vec![0_u8; frame_bytes + OVERFLOW_SLACK];

        let mut decompressor = match self.dictionary {
            Some(dictionary) => Decompressor::with_dictionary(dictionary)?,
            None => Decompressor::new()?
        };
        let decompressed =
            decompressor.decompress_to_buffer(&self.data[HEADER_SIZE..], &mut packing[..])?;

        if decompressed < frame_bytes {
            return Err(FramePackErrors::Truncated(frame_bytes, decompressed));
        }

        let mut output = vec![0_u8; frame_bytes];
        unpack_frame(&packing, self.layout, reference, &mut output);

        trace!("decoded {} pixel bytes", frame_bytes);

        Ok(ImageFrame::from_decode(self.layout, self.intra, output))
    }
}
