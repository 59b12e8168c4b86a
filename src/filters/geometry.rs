//! Geometric remaps: Rotate, Scale, Horizontal/Vertical Flip.
//!
//! Every remap resamples into a canvas of the same size using inverse
//! mapping: for each destination pixel a source coordinate is computed and,
//! when it falls inside the image, all channels are copied from there.
//!
//! ## Out-of-Range Policy
//!
//! The output canvas starts as a copy of the input. Destination pixels whose
//! source lies outside the image keep that initial value (copy-through),
//! matching the border policy of the neighborhood filters.

use ndarray::{Array3, ArrayView3};

use crate::error::{EnhanceError, EnhanceResult};
use crate::executor::Executor;

/// Validated per-axis scale factors (finite, > 0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    sx: f32,
    sy: f32,
}

impl ScaleFactors {
    pub fn new(sx: f32, sy: f32) -> EnhanceResult<Self> {
        let valid = |s: f32| s.is_finite() && s > 0.0;
        if !valid(sx) || !valid(sy) {
            return Err(EnhanceError::invalid_parameter(format!(
                "scale factors must be finite and > 0, got ({sx}, {sy})"
            )));
        }
        Ok(Self { sx, sy })
    }

    pub fn sx(self) -> f32 {
        self.sx
    }

    pub fn sy(self) -> f32 {
        self.sy
    }
}

/// Copy source pixels chosen by `source(x, y)` into a same-size canvas.
fn remap<F>(input: ArrayView3<u8>, exec: &Executor, source: F) -> Array3<u8>
where
    F: Fn(usize, usize) -> Option<(usize, usize)> + Sync + Send,
{
    let mut output = input.to_owned();
    exec.for_each_row(&mut output, |y, mut row| {
        for (x, mut dst) in row.outer_iter_mut().enumerate() {
            if let Some((sx, sy)) = source(x, y) {
                dst.assign(&input.slice(ndarray::s![sy, sx, ..]));
            }
        }
    });
    output
}

/// Source index if `(x, y)` lies inside a `width x height` image.
#[inline]
fn inside(x: f64, y: f64, width: usize, height: usize) -> Option<(usize, usize)> {
    if x >= 0.0 && y >= 0.0 && x < width as f64 && y < height as f64 {
        Some((x as usize, y as usize))
    } else {
        None
    }
}

// ============================================================================
// Rotate
// ============================================================================

/// Rotate about the image center `(width / 2, height / 2)`.
///
/// Source coordinates are `R(-θ) · (dst - center) + center`, truncated
/// toward zero to pick the source pixel. With y pointing down, positive angles
/// turn the content clockwise on screen.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `degrees` - Rotation angle
pub fn rotate(input: ArrayView3<u8>, degrees: f32, exec: &Executor) -> Array3<u8> {
    let (height, width, _) = input.dim();
    let theta = (degrees as f64).to_radians();
    let (sin, cos) = theta.sin_cos();
    let cx = (width / 2) as f64;
    let cy = (height / 2) as f64;

    remap(input, exec, |x, y| {
        let dx = x as f64 - cx;
        let dy = y as f64 - cy;
        let src_x = cos * dx + sin * dy + cx;
        let src_y = -sin * dx + cos * dy + cy;
        inside(truncate(src_x), truncate(src_y), width, height)
    })
}

/// Integer part of a source coordinate, toward zero (`-0.4` becomes `0`).
///
/// Values within [`SNAP_EPSILON`] of an integer are snapped to it first, so
/// right angles map `2.9999999999999996` to `3` rather than `2`.
#[inline]
fn truncate(v: f64) -> f64 {
    let nearest = v.round();
    if (v - nearest).abs() < SNAP_EPSILON {
        nearest
    } else {
        v.trunc()
    }
}

const SNAP_EPSILON: f64 = 1e-9;

// ============================================================================
// Scale
// ============================================================================

/// Resample in place by `(sx, sy)`: the top-left region is magnified
/// (factors > 1) or the image is shrunk into the top-left corner (< 1).
pub fn scale(input: ArrayView3<u8>, factors: ScaleFactors, exec: &Executor) -> Array3<u8> {
    let (height, width, _) = input.dim();
    let sx = factors.sx as f64;
    let sy = factors.sy as f64;

    remap(input, exec, |x, y| inside((x as f64 / sx).floor(), (y as f64 / sy).floor(), width, height))
}

// ============================================================================
// Flip
// ============================================================================

/// Mirror left to right. Applying it twice restores the input.
pub fn flip_horizontal(input: ArrayView3<u8>, exec: &Executor) -> Array3<u8> {
    let width = input.dim().1;
    remap(input, exec, |x, y| Some((width - 1 - x, y)))
}

/// Mirror top to bottom. Applying it twice restores the input.
pub fn flip_vertical(input: ArrayView3<u8>, exec: &Executor) -> Array3<u8> {
    let height = input.dim().0;
    remap(input, exec, |x, y| Some((x, height - 1 - y)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(height: usize, width: usize, channels: usize) -> Array3<u8> {
        Array3::from_shape_fn((height, width, channels), |(y, x, c)| ((y * 31 + x * 7 + c * 101) % 256) as u8)
    }

    // ========================================================================
    // Flip Tests
    // ========================================================================

    #[test]
    fn test_flip_horizontal_swaps_columns() {
        // Two columns: black, white
        let mut img = Array3::<u8>::zeros((1, 2, 3));
        for c in 0..3 {
            img[[0, 1, c]] = 255;
        }

        let result = flip_horizontal(img.view(), &Executor::sequential());

        assert!(result.slice(ndarray::s![0, 0, ..]).iter().all(|&v| v == 255));
        assert!(result.slice(ndarray::s![0, 1, ..]).iter().all(|&v| v == 0));
    }

    #[test]
    fn test_flips_are_involutions() {
        for (h, w, c) in [(1, 1, 1), (3, 5, 3), (6, 4, 4)] {
            let img = pattern(h, w, c);
            let exec = Executor::default();

            let hh = flip_horizontal(flip_horizontal(img.view(), &exec).view(), &exec);
            let vv = flip_vertical(flip_vertical(img.view(), &exec).view(), &exec);

            assert_eq!(hh, img);
            assert_eq!(vv, img);
        }
    }

    #[test]
    fn test_flip_vertical_moves_rows() {
        let img = pattern(3, 2, 1);

        let result = flip_vertical(img.view(), &Executor::sequential());

        assert_eq!(result[[0, 1, 0]], img[[2, 1, 0]]);
        assert_eq!(result[[1, 0, 0]], img[[1, 0, 0]]);
    }

    // ========================================================================
    // Rotate Tests
    // ========================================================================

    #[test]
    fn test_rotate_zero_is_identity() {
        let img = pattern(5, 7, 3);

        let result = rotate(img.view(), 0.0, &Executor::sequential());

        assert_eq!(result, img);
    }

    #[test]
    fn test_rotate_180_about_center() {
        // Odd size so the integer center is the true center
        let img = pattern(5, 5, 1);

        let result = rotate(img.view(), 180.0, &Executor::sequential());

        for y in 0..5 {
            for x in 0..5 {
                assert_eq!(result[[y, x, 0]], img[[4 - y, 4 - x, 0]]);
            }
        }
    }

    #[test]
    fn test_rotate_keeps_out_of_range_pixels() {
        // Wide image: rotating 90 degrees maps corners outside the canvas
        let img = pattern(3, 9, 1);

        let result = rotate(img.view(), 90.0, &Executor::sequential());

        // Corner (0, 0) has source (cx + dy, cy - dx) = (3, 5): out of range
        assert_eq!(result[[0, 0, 0]], img[[0, 0, 0]]);
        // Center is fixed
        assert_eq!(result[[1, 4, 0]], img[[1, 4, 0]]);
    }

    #[test]
    fn test_rotate_45_truncates_source_coordinates() {
        let img = pattern(5, 5, 1);

        let result = rotate(img.view(), 45.0, &Executor::sequential());

        // dst (0, 0): src = (2 - 2.83, 2) truncates to (0, 2); rounding would leave the canvas
        assert_eq!(result[[0, 0, 0]], img[[2, 0, 0]]);
        // dst (4, 4): src = (4.83, 2) truncates to (4, 2)
        assert_eq!(result[[4, 4, 0]], img[[2, 4, 0]]);

        // Anti-diagonal sources sit within an ulp of an integer and snap to it
        let (sin, cos) = 45f64.to_radians().sin_cos();
        for y in 0..5 {
            for x in 0..5 {
                let (dx, dy) = (x as f64 - 2.0, y as f64 - 2.0);
                let sx = truncate(cos * dx + sin * dy + 2.0);
                let sy = truncate(-sin * dx + cos * dy + 2.0);
                let expected = if (0.0..5.0).contains(&sx) && (0.0..5.0).contains(&sy) {
                    img[[sy as usize, sx as usize, 0]]
                } else {
                    img[[y, x, 0]]
                };
                assert_eq!(result[[y, x, 0]], expected, "dst ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_rotate_90_is_exact() {
        // Square odd image: a quarter turn is a pure permutation
        let img = pattern(5, 5, 3);

        let result = rotate(img.view(), 90.0, &Executor::sequential());

        // src = (cx + dy, cy - dx)
        for y in 0..5 {
            for x in 0..5 {
                for c in 0..3 {
                    assert_eq!(result[[y, x, c]], img[[4 - x, y, c]]);
                }
            }
        }
    }

    #[test]
    fn test_truncate_toward_zero_with_snap() {
        assert_eq!(truncate(-0.4), 0.0);
        assert_eq!(truncate(-1.2), -1.0);
        assert_eq!(truncate(2.7), 2.0);
        assert_eq!(truncate(2.9999999999999996), 3.0);
        assert_eq!(truncate(1.0000000000000002), 1.0);
    }

    // ========================================================================
    // Scale Tests
    // ========================================================================

    #[test]
    fn test_scale_two_magnifies_top_left() {
        let img = pattern(4, 4, 3);
        let factors = ScaleFactors::new(2.0, 2.0).unwrap();

        let result = scale(img.view(), factors, &Executor::sequential());

        assert_eq!(result[[3, 3, 2]], img[[1, 1, 2]]);
        assert_eq!(result[[2, 1, 0]], img[[1, 0, 0]]);
    }

    #[test]
    fn test_scale_half_keeps_uncovered_pixels() {
        let img = pattern(4, 4, 1);
        let factors = ScaleFactors::new(0.5, 0.5).unwrap();

        let result = scale(img.view(), factors, &Executor::sequential());

        assert_eq!(result[[1, 1, 0]], img[[2, 2, 0]]);
        // Source (4, 4) is outside: pixel keeps the input value
        assert_eq!(result[[2, 2, 0]], img[[2, 2, 0]]);
    }

    #[test]
    fn test_scale_factors_validation() {
        assert!(ScaleFactors::new(0.0, 1.0).is_err());
        assert!(ScaleFactors::new(1.0, f32::NAN).is_err());
        assert!(ScaleFactors::new(1.5, 1.5).is_ok());
    }
}
