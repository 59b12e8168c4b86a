//! Gaussian blur filters.
//!
//! Provides the light 3x3 smoothing pass used by the preprocessing pipeline
//! and a strong parametric variant with a full `(2r+1)²` kernel.

use ndarray::{Array3, ArrayView3};

use super::core::{convolve, Kernel};
use crate::error::EnhanceResult;
use crate::executor::Executor;

/// Apply the light 3x3 Gaussian blur.
pub fn gaussian_blur_light(input: ArrayView3<u8>, exec: &Executor) -> Array3<u8> {
    convolve(input, &Kernel::gaussian_light(), exec)
}

/// Apply a strong Gaussian blur.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `sigma` - Standard deviation of the Gaussian
/// * `radius` - Kernel half size; pixels closer than this to an edge are copied
///
/// # Returns
/// Blurred image with same dimensions
pub fn gaussian_blur(input: ArrayView3<u8>, sigma: f32, radius: usize, exec: &Executor) -> EnhanceResult<Array3<u8>> {
    let kernel = Kernel::gaussian(sigma, radius)?;
    Ok(convolve(input, &kernel, exec))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaussian_blur_light_spreads_impulse() {
        let mut img = Array3::<u8>::zeros((5, 5, 1));
        img[[2, 2, 0]] = 160;

        let result = gaussian_blur_light(img.view(), &Executor::sequential());

        assert_eq!(result[[2, 2, 0]], 40); // 160 * 4/16
        assert_eq!(result[[1, 2, 0]], 20); // 160 * 2/16
        assert_eq!(result[[1, 1, 0]], 10); // 160 * 1/16
    }

    #[test]
    fn test_gaussian_blur_strong_reduces_peak() {
        let mut img = Array3::<u8>::zeros((21, 21, 3));
        img[[10, 10, 1]] = 255;

        let result = gaussian_blur(img.view(), 2.0, 4, &Executor::default()).unwrap();

        assert!(result[[10, 10, 1]] < 255);
        assert!(result[[10, 11, 1]] > 0);
        // Other channels untouched by a green impulse
        assert_eq!(result[[10, 10, 0]], 0);
    }

    #[test]
    fn test_gaussian_blur_invalid_sigma() {
        let img = Array3::<u8>::zeros((3, 3, 1));
        assert!(gaussian_blur(img.view(), -1.0, 2, &Executor::sequential()).is_err());
    }
}
