//! Sharpening filters (3x3 convolution).

use ndarray::{Array3, ArrayView3};

use super::core::{convolve, Kernel};
use crate::executor::Executor;

/// Strong sharpen: center 9, all eight neighbors -1.
pub fn sharpen(input: ArrayView3<u8>, exec: &Executor) -> Array3<u8> {
    convolve(input, &Kernel::sharpen(), exec)
}

/// Reduced sharpen: center 5, four-connected neighbors -0.5.
pub fn sharpen_soft(input: ArrayView3<u8>, exec: &Executor) -> Array3<u8> {
    convolve(input, &Kernel::sharpen_soft(), exec)
}
