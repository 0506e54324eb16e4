/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Reusable entropy-coder state and the dictionary slot.

use std::io;

use log::{trace, warn};
use zstd::bulk::Compressor;
use zstd::dict::EncoderDictionary;

use crate::constants::{COMPRESSION_LEVEL, DICT_CAPACITY, DICT_SAMPLES_PER_ROW};

struct TrainedDictionary {
    raw:      Vec<u8>,
    prepared: EncoderDictionary<'static>
}

/// Encoder state shared across calls: a dictionary slot that is trained
/// lazily from the first packed frame it sees and reused afterwards.
///
/// Frames of similar content compress better against a shared dictionary,
/// which is worth it for long runs of small frames. A context is not
/// thread safe, pin it to one thread at a time and give each concurrent
/// encoder its own.
///
/// Plain zstd cannot read dictionary-stamped frames, so a caller that
/// compresses through a context must hand [`dictionary`] to
/// [`FramePackDecoder::set_dictionary`] on the decoding side.
///
/// [`dictionary`]: FramePackContext::dictionary
/// [`FramePackDecoder::set_dictionary`]: crate::FramePackDecoder::set_dictionary
pub struct FramePackContext {
    dictionary: Option<TrainedDictionary>
}

impl FramePackContext {
    /// Create a context with an empty dictionary slot
    pub fn new() -> FramePackContext {
        FramePackContext { dictionary: None }
    }

    /// Return true once a dictionary has been trained
    pub fn has_dictionary(&self) -> bool {
        self.dictionary.is_some()
    }

    /// Return the trained dictionary bytes, if any
    ///
    /// Hand these to the decoder so it can read frames compressed through
    /// this context.
    pub fn dictionary(&self) -> Option<&[u8]> {
        self.dictionary.as_ref().map(|dict| dict.raw.as_slice())
    }

    /// Drop the trained dictionary, the next encode through this context
    /// trains a fresh one
    pub fn clear_dictionary(&mut self) {
        self.dictionary = None;
    }

    pub(crate) fn compressor(&self) -> io::Result<Compressor<'_>> {
        match &self.dictionary {
            Some(dict) => Compressor::with_prepared_dictionary(&dict.prepared),
            None => Compressor::new(COMPRESSION_LEVEL)
        }
    }

    /// Train the dictionary slot from a packed frame if it is still empty.
    ///
    /// The scratch is split into `height * 8` equal samples. Training can
    /// fail on degenerate sample sets, in which case the slot stays empty
    /// and encoding proceeds without a dictionary.
    pub(crate) fn train(&mut self, packing: &[u8], height: usize) {
        if self.dictionary.is_some() {
            return;
        }

        let samples = height * DICT_SAMPLES_PER_ROW;
        if samples == 0 {
            return;
        }
        let sample_size = packing.len() / samples;
        if sample_size == 0 {
            warn!("frame too small to train a dictionary, continuing without one");
            return;
        }

        let sizes = vec![sample_size; samples];

        match zstd::dict::from_continuous(&packing[..sample_size * samples], &sizes, DICT_CAPACITY)
        {
            Ok(raw) => {
                trace!("trained a {} byte dictionary", raw.len());
                let prepared = EncoderDictionary::copy(&raw, COMPRESSION_LEVEL);
                self.dictionary = Some(TrainedDictionary { raw, prepared });
            }
            Err(err) => {
                warn!("dictionary training failed ({err}), continuing without one");
            }
        }
    }
}

impl Default for FramePackContext {
    fn default() -> Self {
        FramePackContext::new()
    }
}
