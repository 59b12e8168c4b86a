//! Core utilities shared by the neighborhood filters.
//!
//! This module provides:
//! - The [`Kernel`] type and its named instances
//! - Gaussian kernel generation
//! - Generic 2D convolution with copy-through borders
//! - Interior bounds helpers used by the order-statistic filters
//!
//! ## Border Policy
//!
//! Neighborhood filters only write interior pixels, i.e. pixels whose whole
//! window lies inside the image. The output starts as a copy of the input,
//! so pixels within `radius` of an edge keep their pre-filter value.

use ndarray::{array, Array2, Array3, ArrayView3};

use crate::error::{EnhanceError, EnhanceResult};
use crate::executor::Executor;

/// Largest radius accepted by [`Kernel::gaussian`] (a 129x129 kernel).
pub const MAX_GAUSSIAN_RADIUS: usize = 64;

/// Square convolution kernel of odd size.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    weights: Array2<f32>,
    radius: usize,
    normalize: bool,
}

impl Kernel {
    /// Build a kernel from literal weights.
    ///
    /// # Arguments
    /// * `weights` - Square matrix with odd side length
    /// * `normalize` - Rescale weights so they sum to 1.0
    pub fn new(weights: Array2<f32>, normalize: bool) -> EnhanceResult<Self> {
        let (rows, cols) = weights.dim();
        if rows != cols || rows % 2 == 0 {
            return Err(EnhanceError::invalid_parameter(format!(
                "kernel must be square with odd size, got {rows}x{cols}"
            )));
        }
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(EnhanceError::invalid_parameter("kernel weights must be finite"));
        }

        let mut weights = weights;
        if normalize {
            let sum: f32 = weights.sum();
            if sum.abs() <= f32::EPSILON {
                return Err(EnhanceError::invalid_parameter(
                    "cannot normalize a kernel whose weights sum to zero",
                ));
            }
            weights.mapv_inplace(|w| w / sum);
        }

        Ok(Self {
            weights,
            radius: rows / 2,
            normalize,
        })
    }

    /// Light 3x3 smoothing kernel (1-2-1 binomial, sums to 1).
    pub fn gaussian_light() -> Self {
        let weights = array![[1.0f32, 2.0, 1.0], [2.0, 4.0, 2.0], [1.0, 2.0, 1.0]] / 16.0;
        Self {
            weights,
            radius: 1,
            normalize: true,
        }
    }

    /// Parametric Gaussian kernel of size `2 * radius + 1`.
    ///
    /// # Arguments
    /// * `sigma` - Standard deviation, must be > 0
    /// * `radius` - Half size, 1 to [`MAX_GAUSSIAN_RADIUS`]
    pub fn gaussian(sigma: f32, radius: usize) -> EnhanceResult<Self> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(EnhanceError::invalid_parameter("gaussian sigma must be > 0"));
        }
        if radius == 0 || radius > MAX_GAUSSIAN_RADIUS {
            return Err(EnhanceError::invalid_parameter(format!(
                "gaussian radius must be 1-{MAX_GAUSSIAN_RADIUS}, got {radius}"
            )));
        }
        Self::new(gaussian_kernel_2d(sigma, radius)?, true)
    }

    /// Strong edge-emphasizing sharpen (center 9, neighbors -1).
    pub fn sharpen() -> Self {
        Self {
            weights: array![[-1.0f32, -1.0, -1.0], [-1.0, 9.0, -1.0], [-1.0, -1.0, -1.0]],
            radius: 1,
            normalize: false,
        }
    }

    /// Reduced sharpen (center 5, four-connected neighbors -0.5, corners 0).
    ///
    /// The weights sum to 3, so flat regions are brightened as well.
    pub fn sharpen_soft() -> Self {
        Self {
            weights: array![[0.0f32, -0.5, 0.0], [-0.5, 5.0, -0.5], [0.0, -0.5, 0.0]],
            radius: 1,
            normalize: false,
        }
    }

    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    pub fn size(&self) -> usize {
        self.radius * 2 + 1
    }

    pub fn is_normalized(&self) -> bool {
        self.normalize
    }
}

/// Generate unnormalized 2D Gaussian weights `exp(-(dx² + dy²) / (2σ²))`.
///
/// Fails when `2 * radius + 1` (or its square) does not fit in `usize`.
pub fn gaussian_kernel_2d(sigma: f32, radius: usize) -> EnhanceResult<Array2<f32>> {
    let size = radius
        .checked_mul(2)
        .and_then(|d| d.checked_add(1))
        .filter(|s| s.checked_mul(*s).is_some())
        .ok_or_else(|| EnhanceError::invalid_parameter(format!("gaussian radius {radius} is too large")))?;
    let denom = 2.0 * sigma * sigma;
    Ok(Array2::from_shape_fn((size, size), |(y, x)| {
        let dy = y as f32 - radius as f32;
        let dx = x as f32 - radius as f32;
        (-(dx * dx + dy * dy) / denom).exp()
    }))
}

/// Range of rows (or columns) whose full window of `radius` fits inside `len`.
#[inline]
pub(crate) fn interior(len: usize, radius: usize) -> std::ops::Range<usize> {
    if len <= radius * 2 {
        0..0
    } else {
        radius..len - radius
    }
}

/// Convolve every channel of the image with `kernel`.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `kernel` - Odd-sized square kernel
///
/// # Returns
/// Filtered image with same shape; borders copied from the input
pub fn convolve(input: ArrayView3<u8>, kernel: &Kernel, exec: &Executor) -> Array3<u8> {
    let (height, width, channels) = input.dim();
    let r = kernel.radius;
    let size = kernel.size();
    let weights = &kernel.weights;
    let mut output = input.to_owned();

    let rows = interior(height, r);
    let cols = interior(width, r);
    if rows.is_empty() || cols.is_empty() {
        return output;
    }

    exec.for_each_row(&mut output, |y, mut row| {
        if !rows.contains(&y) {
            return;
        }
        for x in cols.clone() {
            for c in 0..channels {
                let mut sum = 0.0f32;
                for ky in 0..size {
                    for kx in 0..size {
                        let v = input[[y + ky - r, x + kx - r, c]];
                        sum += v as f32 * weights[[ky, kx]];
                    }
                }
                row[[x, c]] = sum.round().clamp(0.0, 255.0) as u8;
            }
        }
    });

    output
}

/// Compute `f(y, x, c)` for every interior sample; borders are copied from `input`.
pub(crate) fn map_interior<F>(input: ArrayView3<u8>, radius: usize, exec: &Executor, f: F) -> Array3<u8>
where
    F: Fn(usize, usize, usize) -> u8 + Sync + Send,
{
    let (height, width, channels) = input.dim();
    let mut output = input.to_owned();

    let rows = interior(height, radius);
    let cols = interior(width, radius);
    if rows.is_empty() || cols.is_empty() {
        return output;
    }

    exec.for_each_row(&mut output, |y, mut row| {
        if !rows.contains(&y) {
            return;
        }
        for x in cols.clone() {
            for c in 0..channels {
                row[[x, c]] = f(y, x, c);
            }
        }
    });

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaussian_light_sums_to_one() {
        let k = Kernel::gaussian_light();
        assert!((k.weights().sum() - 1.0).abs() < 1e-6);
        assert_eq!(k.size(), 3);
    }

    #[test]
    fn test_gaussian_kernel_normalized_and_symmetric() {
        let k = Kernel::gaussian(5.0, 10).unwrap();
        let w = k.weights();

        assert_eq!(k.size(), 21);
        assert!((w.sum() - 1.0).abs() < 1e-4);
        assert_eq!(w[[0, 0]], w[[20, 20]]);
        assert_eq!(w[[3, 7]], w[[7, 3]]);
        // Center is the peak
        assert!(w.iter().all(|&v| v <= w[[10, 10]]));
    }

    #[test]
    fn test_kernel_rejects_even_and_non_square() {
        assert!(Kernel::new(Array2::zeros((2, 2)), false).is_err());
        assert!(Kernel::new(Array2::zeros((3, 5)), false).is_err());
        assert!(Kernel::new(Array2::zeros((3, 3)), true).is_err());
        assert!(Kernel::gaussian(0.0, 2).is_err());
        assert!(Kernel::gaussian(1.0, 0).is_err());
    }

    #[test]
    fn test_gaussian_rejects_huge_radius() {
        assert!(Kernel::gaussian(1.0, MAX_GAUSSIAN_RADIUS).is_ok());

        let err = Kernel::gaussian(1.0, MAX_GAUSSIAN_RADIUS + 1).unwrap_err();
        assert_eq!(err.kind(), "invalid-parameter");
        assert!(Kernel::gaussian(1.0, usize::MAX).is_err());
        assert!(gaussian_kernel_2d(1.0, usize::MAX).is_err());
        assert!(gaussian_kernel_2d(1.0, usize::MAX / 2).is_err());
    }

    #[test]
    fn test_kernel_normalize_flag() {
        let k = Kernel::new(Array2::from_elem((3, 3), 2.0), true).unwrap();
        assert!(k.is_normalized());
        assert!((k.weights()[[1, 1]] - 1.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_sharpen_kernel_weights() {
        assert!((Kernel::sharpen().weights().sum() - 1.0).abs() < 1e-6);
        assert!((Kernel::sharpen_soft().weights().sum() - 3.0).abs() < 1e-6);
        assert_eq!(Kernel::sharpen_soft().weights()[[0, 0]], 0.0);
    }

    #[test]
    fn test_convolve_uniform_stays_uniform() {
        let img = Array3::<u8>::from_elem((4, 4, 3), 128);

        let result = convolve(img.view(), &Kernel::gaussian_light(), &Executor::sequential());

        assert!(result.iter().all(|&v| v == 128));
    }

    #[test]
    fn test_convolve_uniform_with_sum_one_kernels() {
        let img = Array3::<u8>::from_elem((25, 25, 1), 77);
        let kernels = [Kernel::gaussian(2.0, 3).unwrap(), Kernel::sharpen(), Kernel::gaussian_light()];

        for k in &kernels {
            let result = convolve(img.view(), k, &Executor::default());
            assert!(result.iter().all(|&v| v == 77), "kernel of size {}", k.size());
        }
    }

    #[test]
    fn test_convolve_copies_border() {
        let img = Array3::from_shape_fn((5, 5, 1), |(y, x, _)| if (y + x) % 2 == 0 { 0 } else { 255 });

        let result = convolve(img.view(), &Kernel::gaussian_light(), &Executor::sequential());

        for i in 0..5 {
            assert_eq!(result[[0, i, 0]], img[[0, i, 0]]);
            assert_eq!(result[[4, i, 0]], img[[4, i, 0]]);
            assert_eq!(result[[i, 0, 0]], img[[i, 0, 0]]);
            assert_eq!(result[[i, 4, 0]], img[[i, 4, 0]]);
        }
        // Interior is smoothed: a 0 center sees 4*255*2/16 + 0 + 0 = 127.5
        assert_eq!(result[[2, 2, 0]], 128);
    }

    #[test]
    fn test_convolve_sharpen_clamps() {
        let mut img = Array3::<u8>::zeros((3, 3, 1));
        img[[1, 1, 0]] = 200;

        let result = convolve(img.view(), &Kernel::sharpen(), &Executor::sequential());
        assert_eq!(result[[1, 1, 0]], 255);

        let mut img = Array3::<u8>::from_elem((3, 3, 1), 200);
        img[[1, 1, 0]] = 0;
        let result = convolve(img.view(), &Kernel::sharpen(), &Executor::sequential());
        assert_eq!(result[[1, 1, 0]], 0);
    }

    #[test]
    fn test_convolve_smaller_than_kernel_is_identity() {
        let img = Array3::from_shape_fn((4, 30, 1), |(y, x, _)| (y * 30 + x) as u8);

        let result = convolve(img.view(), &Kernel::gaussian(5.0, 10).unwrap(), &Executor::sequential());

        assert_eq!(result, img);
    }
}
