//! Edge detection: Sobel gradient magnitude.
//!
//! Unlike a plain convolution this combines two directional responses through
//! a nonlinear magnitude. Every channel is processed independently, so an RGB
//! input yields per-channel edge strength.
//!
//! Border pixels are copied from the input (see [`super::core`]).

use ndarray::{Array3, ArrayView3};

use super::core::map_interior;
use crate::executor::Executor;

/// Horizontal gradient kernel.
pub const SOBEL_X: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
/// Vertical gradient kernel.
pub const SOBEL_Y: [[i32; 3]; 3] = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// Apply Sobel edge detection.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
///
/// # Returns
/// `clamp(round(sqrt(gx² + gy²)), 0, 255)` per interior sample, same shape
pub fn sobel(input: ArrayView3<u8>, exec: &Executor) -> Array3<u8> {
    map_interior(input, 1, exec, |y, x, c| {
        let mut gx = 0i32;
        let mut gy = 0i32;
        for ky in 0..3 {
            for kx in 0..3 {
                let v = input[[y + ky - 1, x + kx - 1, c]] as i32;
                gx += v * SOBEL_X[ky][kx];
                gy += v * SOBEL_Y[ky][kx];
            }
        }
        let magnitude = ((gx * gx + gy * gy) as f32).sqrt();
        magnitude.round().min(255.0) as u8
    })
}
