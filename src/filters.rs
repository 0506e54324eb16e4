/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Reversible pixel filters and the filter dispatcher.
//!
//! Everything here works on whole frames in one pass and is exactly
//! invertible in 8-bit wraparound arithmetic. The encoder writes into a
//! packing scratch that the entropy coder then shrinks, the decoder runs
//! the mirror image of each routine.

use log::trace;

use crate::constants::{DELTA_ESCAPE, OVERFLOW_LIMIT};
use crate::frame::FrameLayout;

/// What the inter-frame filter did with a frame.
pub(crate) enum DeltaOutcome {
    /// The delta stream was written, with this many escaped literals in
    /// the overflow region
    Fitted(usize),
    /// Too many escapes, the caller should fall back to intra coding
    Saturated
}

/// Which filter family a packed frame went through.
pub(crate) enum PackOutcome {
    Intra,
    Video { overflow: usize }
}

/// Row-wise left-neighbor delta for `N` interleaved channels.
///
/// Each row starts from a zero predictor so rows are independent.
/// Output is interleaved, same shape as the input.
pub(crate) fn filter_rows<const N: usize>(input: &[u8], width: usize, output: &mut [u8]) {
    let row_bytes = width * N;

    for (in_row, out_row) in input
        .chunks_exact(row_bytes)
        .zip(output.chunks_exact_mut(row_bytes))
    {
        let mut prev = [0_u8; N];

        for (pix, deltas) in in_row.chunks_exact(N).zip(out_row.chunks_exact_mut(N)) {
            for ((raw, prev_c), delta) in pix.iter().zip(prev.iter_mut()).zip(deltas.iter_mut()) {
                *delta = raw.wrapping_sub(*prev_c);
                *prev_c = *raw;
            }
        }
    }
}

/// Mirror of [`filter_rows`].
pub(crate) fn unfilter_rows<const N: usize>(input: &[u8], width: usize, output: &mut [u8]) {
    let row_bytes = width * N;

    for (in_row, out_row) in input
        .chunks_exact(row_bytes)
        .zip(output.chunks_exact_mut(row_bytes))
    {
        let mut prev = [0_u8; N];

        for (deltas, pix) in in_row.chunks_exact(N).zip(out_row.chunks_exact_mut(N)) {
            for ((delta, prev_c), raw) in deltas.iter().zip(prev.iter_mut()).zip(pix.iter_mut()) {
                *raw = delta.wrapping_add(*prev_c);
                *prev_c = *raw;
            }
        }
    }
}

/// RGB specialization: row delta, then the GB-RG color transform from
/// BCIF on the deltas, written as planar Y, U, V.
///
/// The delta is taken before the color transform, the decoder undoes
/// them in the opposite order.
pub(crate) fn filter_rgb(input: &[u8], width: usize, output: &mut [u8]) {
    let plane = input.len() / 3;
    let (y_plane, rest) = output.split_at_mut(plane);
    let (u_plane, v_plane) = rest.split_at_mut(plane);

    let mut y_out = y_plane.iter_mut();
    let mut u_out = u_plane.iter_mut();
    let mut v_out = v_plane.iter_mut();

    for row in input.chunks_exact(width * 3) {
        let mut prev = [0_u8; 3];

        for (pix, ((y, u), v)) in row
            .chunks_exact(3)
            .zip(y_out.by_ref().zip(u_out.by_ref()).zip(v_out.by_ref()))
        {
            let r = pix[0].wrapping_sub(prev[0]);
            let g = pix[1].wrapping_sub(prev[1]);
            let b = pix[2].wrapping_sub(prev[2]);

            prev.copy_from_slice(pix);

            *y = b;
            *u = g.wrapping_sub(b);
            *v = g.wrapping_sub(r);
        }
    }
}

/// Mirror of [`filter_rgb`].
pub(crate) fn unfilter_rgb(input: &[u8], width: usize, output: &mut [u8]) {
    let plane = output.len() / 3;
    let (y_plane, rest) = input.split_at(plane);
    let (u_plane, v_plane) = rest.split_at(plane);

    let mut y_in = y_plane.iter();
    let mut u_in = u_plane.iter();
    let mut v_in = v_plane.iter();

    for row in output.chunks_exact_mut(width * 3) {
        let mut prev = [0_u8; 3];

        for (pix, ((y, u), v)) in row
            .chunks_exact_mut(3)
            .zip(y_in.by_ref().zip(u_in.by_ref()).zip(v_in.by_ref()))
        {
            let b_delta = *y;
            let g_delta = u.wrapping_add(b_delta);
            let r_delta = g_delta.wrapping_sub(*v);

            pix[0] = r_delta.wrapping_add(prev[0]);
            pix[1] = g_delta.wrapping_add(prev[1]);
            pix[2] = b_delta.wrapping_add(prev[2]);

            prev.copy_from_slice(pix);
        }
    }
}

/// RGBA version of [`filter_rgb`], alpha rides along as a fourth plane
/// with a plain row delta.
pub(crate) fn filter_rgba(input: &[u8], width: usize, output: &mut [u8]) {
    let plane = input.len() / 4;
    let (y_plane, rest) = output.split_at_mut(plane);
    let (u_plane, rest) = rest.split_at_mut(plane);
    let (v_plane, a_plane) = rest.split_at_mut(plane);

    let mut y_out = y_plane.iter_mut();
    let mut u_out = u_plane.iter_mut();
    let mut v_out = v_plane.iter_mut();
    let mut a_out = a_plane.iter_mut();

    for row in input.chunks_exact(width * 4) {
        let mut prev = [0_u8; 4];

        for (pix, (((y, u), v), alpha)) in row.chunks_exact(4).zip(
            y_out
                .by_ref()
                .zip(u_out.by_ref())
                .zip(v_out.by_ref())
                .zip(a_out.by_ref())
        ) {
            let r = pix[0].wrapping_sub(prev[0]);
            let g = pix[1].wrapping_sub(prev[1]);
            let b = pix[2].wrapping_sub(prev[2]);
            let a = pix[3].wrapping_sub(prev[3]);

            prev.copy_from_slice(pix);

            *y = b;
            *u = g.wrapping_sub(b);
            *v = g.wrapping_sub(r);
            *alpha = a;
        }
    }
}

/// Mirror of [`filter_rgba`].
pub(crate) fn unfilter_rgba(input: &[u8], width: usize, output: &mut [u8]) {
    let plane = output.len() / 4;
    let (y_plane, rest) = input.split_at(plane);
    let (u_plane, rest) = rest.split_at(plane);
    let (v_plane, a_plane) = rest.split_at(plane);

    let mut y_in = y_plane.iter();
    let mut u_in = u_plane.iter();
    let mut v_in = v_plane.iter();
    let mut a_in = a_plane.iter();

    for row in output.chunks_exact_mut(width * 4) {
        let mut prev = [0_u8; 4];

        for (pix, (((y, u), v), alpha)) in row.chunks_exact_mut(4).zip(
            y_in.by_ref()
                .zip(u_in.by_ref())
                .zip(v_in.by_ref())
                .zip(a_in.by_ref())
        ) {
            let b_delta = *y;
            let g_delta = u.wrapping_add(b_delta);
            let r_delta = g_delta.wrapping_sub(*v);

            pix[0] = r_delta.wrapping_add(prev[0]);
            pix[1] = g_delta.wrapping_add(prev[1]);
            pix[2] = b_delta.wrapping_add(prev[2]);
            pix[3] = alpha.wrapping_add(prev[3]);

            prev.copy_from_slice(pix);
        }
    }
}

/// Bayer XGGY mosaic filter, one byte per pixel.
///
/// Even rows alternate X,G and odd rows G,Y with X and Y being the two
/// non-green primaries. Row pairs are scanned with stride 2 and the
/// samples land in three planes: X (`w*h/4`), Y (`w*h/4`) and G
/// (`w*h/2`, even-row greens first within each row pair).
pub(crate) fn filter_bayer(input: &[u8], width: usize, output: &mut [u8]) {
    let plane = input.len() / 4;
    let (r_plane, rest) = output.split_at_mut(plane);
    let (b_plane, g_plane) = rest.split_at_mut(plane);

    let mut r_out = r_plane.iter_mut();
    let mut b_out = b_plane.iter_mut();
    let mut g_out = g_plane.iter_mut();

    for rows in input.chunks_exact(width * 2) {
        let (even, odd) = rows.split_at(width);

        let mut prev = [0_u8; 2];
        for (pair, (r, g)) in even
            .chunks_exact(2)
            .zip(r_out.by_ref().zip(g_out.by_ref()))
        {
            *r = pair[0].wrapping_sub(prev[0]);
            *g = pair[1].wrapping_sub(prev[1]);
            prev.copy_from_slice(pair);
        }

        prev = [0_u8; 2];
        for (pair, (g, b)) in odd
            .chunks_exact(2)
            .zip(g_out.by_ref().zip(b_out.by_ref()))
        {
            *g = pair[0].wrapping_sub(prev[0]);
            *b = pair[1].wrapping_sub(prev[1]);
            prev.copy_from_slice(pair);
        }
    }
}

/// Mirror of [`filter_bayer`].
pub(crate) fn unfilter_bayer(input: &[u8], width: usize, output: &mut [u8]) {
    let plane = input.len() / 4;
    let (r_plane, rest) = input.split_at(plane);
    let (b_plane, g_plane) = rest.split_at(plane);

    let mut r_in = r_plane.iter();
    let mut b_in = b_plane.iter();
    let mut g_in = g_plane.iter();

    for rows in output.chunks_exact_mut(width * 2) {
        let (even, odd) = rows.split_at_mut(width);

        let mut prev = [0_u8; 2];
        for (pair, (r, g)) in even
            .chunks_exact_mut(2)
            .zip(r_in.by_ref().zip(g_in.by_ref()))
        {
            pair[0] = r.wrapping_add(prev[0]);
            pair[1] = g.wrapping_add(prev[1]);
            prev.copy_from_slice(pair);
        }

        prev = [0_u8; 2];
        for (pair, (g, b)) in odd
            .chunks_exact_mut(2)
            .zip(g_in.by_ref().zip(b_in.by_ref()))
        {
            pair[0] = g.wrapping_add(prev[0]);
            pair[1] = b.wrapping_add(prev[1]);
            prev.copy_from_slice(pair);
        }
    }
}

/// Per-byte signed delta against a reference frame.
///
/// Deltas in `[-127, 127]` are stored as two's complement bytes. Anything
/// wider is replaced by [`DELTA_ESCAPE`] and the raw byte goes to the
/// overflow region starting right after the delta stream. The escape is
/// unambiguous since `-128` is never emitted.
///
/// The delta has no per-channel state so one routine covers every pixel
/// size, `output` must be the full packing scratch (frame plus overflow
/// slack).
pub(crate) fn filter_delta(reference: &[u8], input: &[u8], output: &mut [u8]) -> DeltaOutcome {
    let (deltas, overflow) = output.split_at_mut(input.len());
    let mut escapes = 0_usize;

    for ((cur, ref_byte), delta) in input.iter().zip(reference.iter()).zip(deltas.iter_mut()) {
        let diff = i32::from(*cur) - i32::from(*ref_byte);

        if (-127..=127).contains(&diff) {
            *delta = diff as i8 as u8;
        } else {
            escapes += 1;
            if escapes == OVERFLOW_LIMIT {
                return DeltaOutcome::Saturated;
            }
            overflow[escapes - 1] = *cur;
            *delta = DELTA_ESCAPE;
        }
    }

    if escapes != 0 {
        trace!("inter-frame escapes: {escapes}");
    }

    DeltaOutcome::Fitted(escapes)
}

/// Mirror of [`filter_delta`].
///
/// `input` must include the overflow region, `output` is exactly one
/// frame. Escapes past the recorded overflow bytes reconstruct as zero,
/// matching what the zero-filled scratch would hold.
pub(crate) fn unfilter_delta(reference: &[u8], input: &[u8], output: &mut [u8]) {
    let (deltas, overflow) = input.split_at(output.len());
    let mut literals = overflow.iter();

    for ((delta, ref_byte), out) in deltas.iter().zip(reference.iter()).zip(output.iter_mut()) {
        if *delta == DELTA_ESCAPE {
            *out = literals.next().copied().unwrap_or(0);
        } else {
            *out = ref_byte.wrapping_add(*delta);
        }
    }
}

/// Filter a frame into the packing scratch, selecting the filter from the
/// layout and the reference presence.
///
/// A saturated delta silently re-packs through the intra path so the
/// result always decodes with the header that will be written for it.
/// The layout must have been validated (`pixel_bytes` in `1..=8`, Bayer
/// rules) before calling.
pub(crate) fn pack_frame(
    data: &[u8], layout: FrameLayout, reference: Option<&[u8]>, packing: &mut [u8]
) -> PackOutcome {
    if let Some(reference) = reference {
        match filter_delta(reference, data, packing) {
            DeltaOutcome::Fitted(overflow) => return PackOutcome::Video { overflow },
            DeltaOutcome::Saturated => {
                trace!("inter-frame delta saturated, re-packing frame as intra");
            }
        }
    }

    pack_intra(data, layout, &mut packing[..data.len()]);
    PackOutcome::Intra
}

fn pack_intra(data: &[u8], layout: FrameLayout, packing: &mut [u8]) {
    let width = layout.width();

    if layout.is_bayer() {
        filter_bayer(data, width, packing);
        return;
    }

    match layout.pixel_bytes() {
        1 => filter_rows::<1>(data, width, packing),
        2 => filter_rows::<2>(data, width, packing),
        3 => filter_rgb(data, width, packing),
        4 => filter_rgba(data, width, packing),
        5 => filter_rows::<5>(data, width, packing),
        6 => filter_rows::<6>(data, width, packing),
        7 => filter_rows::<7>(data, width, packing),
        8 => filter_rows::<8>(data, width, packing),
        _ => unreachable!("pixel size is validated before dispatch")
    }
}

/// Inverse of [`pack_frame`].
///
/// `reference` must be `Some` exactly when the buffer carried the video
/// magic, `packing` is the decompressed scratch including overflow slack
/// and `output` is exactly one frame.
pub(crate) fn unpack_frame(
    packing: &[u8], layout: FrameLayout, reference: Option<&[u8]>, output: &mut [u8]
) {
    if let Some(reference) = reference {
        unfilter_delta(reference, packing, output);
        return;
    }

    let packed = &packing[..output.len()];
    let width = layout.width();

    if layout.is_bayer() {
        unfilter_bayer(packed, width, output);
        return;
    }

    match layout.pixel_bytes() {
        1 => unfilter_rows::<1>(packed, width, output),
        2 => unfilter_rows::<2>(packed, width, output),
        3 => unfilter_rgb(packed, width, output),
        4 => unfilter_rgba(packed, width, output),
        5 => unfilter_rows::<5>(packed, width, output),
        6 => unfilter_rows::<6>(packed, width, output),
        7 => unfilter_rows::<7>(packed, width, output),
        8 => unfilter_rows::<8>(packed, width, output),
        _ => unreachable!("pixel size is validated before dispatch")
    }
}
