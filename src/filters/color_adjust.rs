//! Color adjustment filters: Brightness, Contrast.
//!
//! These are pixel-wise operations that don't require spatial context: each
//! output sample depends only on the input sample at the same index.
//!
//! ## Supported Formats
//!
//! All filters accept images with 1, 3, or 4 channels and adjust every
//! sample, alpha included. Results are clamped to 0-255.

use ndarray::{Array3, ArrayView3, Axis};

use crate::executor::Executor;

// ============================================================================
// Brightness
// ============================================================================

/// Shift every sample by a constant.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `offset` - Signed amount added to each sample
///
/// # Returns
/// Brightness-adjusted image with same shape
pub fn brightness(input: ArrayView3<u8>, offset: i32, exec: &Executor) -> Array3<u8> {
    map_samples(input, exec, |v| (v as i32).saturating_add(offset).clamp(0, 255) as u8)
}

// ============================================================================
// Contrast
// ============================================================================

/// Scale every sample's distance from mid-gray (128).
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `factor` - 1.0 = no change, < 1.0 flattens toward gray, > 1.0 stretches
///
/// # Returns
/// Contrast-adjusted image with same shape
pub fn contrast(input: ArrayView3<u8>, factor: f32, exec: &Executor) -> Array3<u8> {
    map_samples(input, exec, |v| {
        let adjusted = factor * (v as f32 - 128.0) + 128.0;
        // NaN clamps to NaN and casts to 0
        adjusted.round().clamp(0.0, 255.0) as u8
    })
}

/// Apply `f` to every sample, one row per work item.
pub(crate) fn map_samples<F>(input: ArrayView3<u8>, exec: &Executor, f: F) -> Array3<u8>
where
    F: Fn(u8) -> u8 + Sync + Send,
{
    let mut output = Array3::<u8>::zeros(input.dim());
    exec.for_each_row(&mut output, |y, mut row| {
        let src = input.index_axis(Axis(0), y);
        row.zip_mut_with(&src, |dst, &s| *dst = f(s));
    });
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(value: u8, channels: usize) -> Array3<u8> {
        Array3::from_elem((2, 2, channels), value)
    }

    // ========================================================================
    // Brightness Tests
    // ========================================================================

    #[test]
    fn test_brightness_rgb() {
        let img = solid(100, 3);

        let result = brightness(img.view(), 30, &Executor::sequential());

        assert_eq!(result.dim(), (2, 2, 3));
        assert!(result.iter().all(|&v| v == 130));
    }

    #[test]
    fn test_brightness_clamps_both_ends() {
        let mut img = Array3::<u8>::zeros((1, 2, 1));
        img[[0, 0, 0]] = 250;
        img[[0, 1, 0]] = 5;

        let up = brightness(img.view(), 30, &Executor::sequential());
        let down = brightness(img.view(), -30, &Executor::sequential());

        assert_eq!(up[[0, 0, 0]], 255);
        assert_eq!(up[[0, 1, 0]], 35);
        assert_eq!(down[[0, 0, 0]], 220);
        assert_eq!(down[[0, 1, 0]], 0);
    }

    #[test]
    fn test_brightness_extreme_offsets_stay_in_range() {
        let img = Array3::from_shape_fn((16, 16, 1), |(y, x, _)| (y * 16 + x) as u8);

        let high = brightness(img.view(), i32::MAX, &Executor::default());
        let low = brightness(img.view(), i32::MIN, &Executor::default());

        assert!(high.iter().all(|&v| v == 255));
        assert!(low.iter().all(|&v| v == 0));
    }

    // ========================================================================
    // Contrast Tests
    // ========================================================================

    #[test]
    fn test_contrast_identity() {
        let img = Array3::from_shape_fn((16, 16, 3), |(y, x, c)| ((y * 16 + x) as u8).wrapping_mul(c as u8 + 1));

        let result = contrast(img.view(), 1.0, &Executor::sequential());

        assert_eq!(result, img);
    }

    #[test]
    fn test_contrast_stretch_and_flatten() {
        let mut img = Array3::<u8>::zeros((1, 2, 1));
        img[[0, 0, 0]] = 200;
        img[[0, 1, 0]] = 60;

        let stretched = contrast(img.view(), 1.5, &Executor::sequential());
        let flattened = contrast(img.view(), 0.5, &Executor::sequential());

        // 1.5 * 72 + 128 = 236, 1.5 * -68 + 128 = 26
        assert_eq!(stretched[[0, 0, 0]], 236);
        assert_eq!(stretched[[0, 1, 0]], 26);
        // 0.5 * 72 + 128 = 164, 0.5 * -68 + 128 = 94
        assert_eq!(flattened[[0, 0, 0]], 164);
        assert_eq!(flattened[[0, 1, 0]], 94);
    }

    #[test]
    fn test_contrast_large_factor_clamps() {
        let mut img = Array3::<u8>::zeros((1, 3, 1));
        img[[0, 0, 0]] = 0;
        img[[0, 1, 0]] = 128;
        img[[0, 2, 0]] = 255;

        let result = contrast(img.view(), 100.0, &Executor::sequential());

        assert_eq!(result[[0, 0, 0]], 0);
        assert_eq!(result[[0, 1, 0]], 128);
        assert_eq!(result[[0, 2, 0]], 255);
    }
}
