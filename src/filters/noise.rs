//! Noise reduction filters: Mean, Median, and their blend.
//!
//! All three are order-statistic filters over a square `k x k` window with
//! `k` odd and at least 3. Every channel is filtered independently; pixels
//! closer than `k / 2` to an edge are copied from the input.

use ndarray::{Array3, ArrayView3, Axis};

use super::core::map_interior;
use crate::error::{EnhanceError, EnhanceResult};
use crate::executor::Executor;

/// Validated odd window size (3, 5, 7, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window(usize);

impl Window {
    pub fn new(size: usize) -> EnhanceResult<Self> {
        if size < 3 || size % 2 == 0 {
            return Err(EnhanceError::invalid_parameter(format!(
                "window size must be odd and >= 3, got {size}"
            )));
        }
        Ok(Self(size))
    }

    pub fn size(self) -> usize {
        self.0
    }

    pub fn radius(self) -> usize {
        self.0 / 2
    }

    /// Number of samples in the window (`k²`, always odd).
    pub fn area(self) -> usize {
        self.0 * self.0
    }
}

/// Statistic reduced over each window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    Mean,
    Median,
}

// ============================================================================
// Mean
// ============================================================================

/// Apply a box mean filter.
///
/// # Returns
/// `floor(sum / k²)` per interior sample
pub fn mean(input: ArrayView3<u8>, window: Window, exec: &Executor) -> Array3<u8> {
    let r = window.radius();
    let area = window.area() as u32;
    map_interior(input, r, exec, |y, x, c| {
        let patch = input.slice(ndarray::s![y - r..=y + r, x - r..=x + r, c]);
        let sum: u32 = patch.iter().map(|&v| v as u32).sum();
        (sum / area) as u8
    })
}

// ============================================================================
// Median
// ============================================================================

/// Apply a median filter.
///
/// Uses selection rather than a full sort; the result equals element `k²/2`
/// of the sorted window.
pub fn median(input: ArrayView3<u8>, window: Window, exec: &Executor) -> Array3<u8> {
    let r = window.radius();
    let (height, width, channels) = input.dim();
    let mut output = input.to_owned();
    if height <= 2 * r || width <= 2 * r {
        return output;
    }

    exec.for_each_row(&mut output, |y, mut row| {
        if y < r || y >= height - r {
            return;
        }
        // One scratch buffer per row keeps the inner loop allocation free
        let mut values: Vec<u8> = Vec::with_capacity(window.area());
        for x in r..width - r {
            for c in 0..channels {
                values.clear();
                let patch = input.slice(ndarray::s![y - r..=y + r, x - r..=x + r, c]);
                values.extend(patch.iter().copied());
                let mid = values.len() / 2;
                let (_, median, _) = values.select_nth_unstable(mid);
                row[[x, c]] = *median;
            }
        }
    });

    output
}

// ============================================================================
// Mean / Median Blend
// ============================================================================

/// Average the mean- and median-filtered versions of the same input.
///
/// Both intermediates are full-size images; the blend is
/// `(mean + median) / 2` with integer division.
pub fn mean_median_blend(input: ArrayView3<u8>, window: Window, exec: &Executor) -> Array3<u8> {
    let mean_img = mean(input, window, exec);
    let median_img = median(input, window, exec);

    let mut output = Array3::<u8>::zeros(input.dim());
    exec.for_each_row(&mut output, |y, mut row| {
        let a = mean_img.index_axis(Axis(0), y);
        let b = median_img.index_axis(Axis(0), y);
        ndarray::Zip::from(&mut row)
            .and(&a)
            .and(&b)
            .for_each(|dst, &m, &d| *dst = ((m as u16 + d as u16) / 2) as u8);
    });
    output
}

/// Dispatch on [`Statistic`].
pub fn order_statistic(input: ArrayView3<u8>, window: Window, statistic: Statistic, exec: &Executor) -> Array3<u8> {
    match statistic {
        Statistic::Mean => mean(input, window, exec),
        Statistic::Median => median(input, window, exec),
    }
}
