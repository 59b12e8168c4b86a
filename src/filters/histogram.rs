//! Histogram equalization on the luma proxy channel.
//!
//! Channel 0 is treated as intensity (the image is normally grayscale by the
//! time this runs). The equalized value is written to channels 0, 1 and 2;
//! alpha, if present, is preserved.
//!
//! An image with a single intensity has no spread to redistribute and is
//! returned unchanged.

use ndarray::{Array3, ArrayView3, Axis};

use crate::executor::Executor;

/// 256-bin intensity histogram.
pub type Histogram = [u64; 256];

/// Count channel-0 samples of every pixel.
pub fn histogram(input: ArrayView3<u8>, exec: &Executor) -> Histogram {
    exec.fold_rows(
        input,
        || [0u64; 256],
        |mut hist, row| {
            for px in row.outer_iter() {
                hist[px[0] as usize] += 1;
            }
            hist
        },
        |mut a, b| {
            for (dst, src) in a.iter_mut().zip(b.iter()) {
                *dst += src;
            }
            a
        },
    )
}

/// Build the equalization lookup table.
///
/// `cdf_min` is the count of the first non-empty bin. Returns `None` when
/// every pixel has the same intensity (the mapping would divide by zero).
pub fn equalization_lut(hist: &Histogram) -> Option<[u8; 256]> {
    let total: u64 = hist.iter().sum();
    let cdf_min = hist.iter().copied().find(|&count| count > 0)?;
    if total == cdf_min {
        return None;
    }

    let denom = (total - cdf_min) as f64;
    let mut lut = [0u8; 256];
    let mut cdf = 0u64;
    for (v, &count) in hist.iter().enumerate() {
        cdf += count;
        let scaled = 255.0 * (cdf as f64 - cdf_min as f64) / denom;
        lut[v] = scaled.round().clamp(0.0, 255.0) as u8;
    }
    Some(lut)
}

/// Equalize the intensity histogram.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
///
/// # Returns
/// Equalized image with same shape; identical to the input when the image
/// holds a single intensity
pub fn equalize(input: ArrayView3<u8>, exec: &Executor) -> Array3<u8> {
    let mut output = input.to_owned();
    let Some(lut) = equalization_lut(&histogram(input, exec)) else {
        return output;
    };

    let color_channels = input.dim().2.min(3);
    exec.for_each_row(&mut output, |y, mut row| {
        let src = input.index_axis(Axis(0), y);
        for (mut dst, px) in row.outer_iter_mut().zip(src.outer_iter()) {
            let mapped = lut[px[0] as usize];
            for c in 0..color_channels {
                dst[c] = mapped;
            }
        }
    });

    output
}
