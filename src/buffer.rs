//! Owned 8-bit raster passed between pipeline stages.
//!
//! ## Layout
//!
//! Pixels are stored as a standard-layout `Array3<u8>` of shape
//! `(height, width, channels)`, so sample `(x, y, c)` lives at flat index
//! `(y * width + x) * channels + c`. This is the same interleaved layout the
//! codec produces and consumes.
//!
//! | Channels | Meaning |
//! |----------|---------|
//! | 1 | Grayscale |
//! | 3 | RGB |
//! | 4 | RGB + alpha |

use ndarray::{Array3, ArrayView3};

use crate::error::{EnhanceError, EnhanceResult};

/// An image owned by whichever pipeline stage is currently transforming it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pixels: Array3<u8>,
}

impl PixelBuffer {
    /// Wrap raw interleaved samples.
    ///
    /// # Arguments
    /// * `width`, `height` - Image dimensions, both non-zero
    /// * `channels` - 1, 3 or 4
    /// * `data` - Exactly `width * height * channels` samples
    pub fn from_raw(width: usize, height: usize, channels: usize, data: Vec<u8>) -> EnhanceResult<Self> {
        if width == 0 || height == 0 {
            return Err(EnhanceError::invalid_buffer(format!(
                "dimensions must be non-zero, got {width}x{height}"
            )));
        }
        if !matches!(channels, 1 | 3 | 4) {
            return Err(EnhanceError::invalid_buffer(format!(
                "unsupported channel count {channels}"
            )));
        }
        let pixels = Array3::from_shape_vec((height, width, channels), data)
            .map_err(|e| EnhanceError::invalid_buffer(format!("{width}x{height}x{channels}: {e}")))?;
        Ok(Self { pixels })
    }

    /// Build a buffer with every sample set to `value`.
    pub fn filled(width: usize, height: usize, channels: usize, value: u8) -> EnhanceResult<Self> {
        Self::from_raw(width, height, channels, vec![value; width * height * channels])
    }

    /// Wrap an array produced by a filter.
    ///
    /// Filters only ever produce arrays with the same shape as their input,
    /// so the channel invariant carries over.
    pub(crate) fn from_array(pixels: Array3<u8>) -> Self {
        debug_assert!(matches!(pixels.dim().2, 1 | 3 | 4));
        Self { pixels }
    }

    pub fn width(&self) -> usize {
        self.pixels.dim().1
    }

    pub fn height(&self) -> usize {
        self.pixels.dim().0
    }

    pub fn channels(&self) -> usize {
        self.pixels.dim().2
    }

    /// Read-only view with shape `(height, width, channels)`.
    pub fn view(&self) -> ArrayView3<'_, u8> {
        self.pixels.view()
    }

    /// Sample at `(x, y, c)`.
    pub fn sample(&self, x: usize, y: usize, c: usize) -> u8 {
        self.pixels[[y, x, c]]
    }

    /// Interleaved samples in row-major order.
    pub fn into_raw(self) -> Vec<u8> {
        if self.pixels.is_standard_layout() {
            let (data, _) = self.pixels.into_raw_vec_and_offset();
            data
        } else {
            self.pixels.iter().copied().collect()
        }
    }

    /// Borrow the samples as a flat slice when the layout allows it.
    pub fn as_slice(&self) -> Option<&[u8]> {
        self.pixels.as_slice()
    }
}
