//! Grayscale conversion filter.
//!
//! Uses the classic `0.3 R + 0.59 G + 0.11 B` luma weights and writes the
//! result back into all three color channels. The conversion is lossy: color
//! information cannot be recovered afterwards.
//!
//! Single-channel images are already gray and pass through unchanged. Alpha
//! (if present) is preserved.

use ndarray::{Array3, ArrayView3, Axis};

use crate::executor::Executor;

/// Luma weights (sum to 1.0)
const LUMA_R: f32 = 0.3;
const LUMA_G: f32 = 0.59;
const LUMA_B: f32 = 0.11;

/// Luma of one RGB triple, rounded to the nearest integer.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let gray = LUMA_R * r as f32 + LUMA_G * g as f32 + LUMA_B * b as f32;
    gray.round().clamp(0.0, 255.0) as u8
}

/// Convert an image to grayscale (luminosity method).
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
///
/// # Returns
/// Image with R=G=B=luma, alpha preserved, same shape
pub fn grayscale(input: ArrayView3<u8>, exec: &Executor) -> Array3<u8> {
    let mut output = input.to_owned();
    if input.dim().2 < 3 {
        return output;
    }

    exec.for_each_row(&mut output, |y, mut row| {
        let src = input.index_axis(Axis(0), y);
        for (mut dst, px) in row.outer_iter_mut().zip(src.outer_iter()) {
            let gray = luma(px[0], px[1], px[2]);
            dst[0] = gray;
            dst[1] = gray;
            dst[2] = gray;
        }
    });

    output
}
