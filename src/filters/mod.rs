//! Filter modules for image enhancement.
//!
//! ## Supported Formats
//!
//! All filters accept 8-bit images with 1, 3, or 4 channels:
//!
//! | Format | Shape | Description |
//! |--------|-------|-------------|
//! | Grayscale8 | (H, W, 1) | Single luminance channel, 0-255 |
//! | RGB8 | (H, W, 3) | Red, green, blue, 0-255 |
//! | RGBA8 | (H, W, 4) | RGB + alpha, 0-255 |
//!
//! ## Architecture
//!
//! All filters follow these principles:
//! - **Pure** - Take an `ArrayView3<u8>` and return a new `Array3<u8>` of the same shape
//! - **Row parallel** - Output rows are written through an [`Executor`](crate::executor::Executor),
//!   so parallel and sequential runs are byte-identical
//! - **Copy-through borders** - Neighborhood filters and remaps leave pixels they
//!   cannot compute at their input value
//! - **Clamped** - Every computed sample is clamped to 0-255
//!
//! ## Filter Categories
//!
//! - **Point**: brightness, contrast, grayscale
//! - **Convolution**: gaussian blur (light / strong), sharpen (strong / soft)
//! - **Edge detection**: sobel magnitude
//! - **Order statistic**: mean, median, mean/median blend
//! - **Tonal**: histogram equalization
//! - **Geometric**: rotate, scale, horizontal / vertical flip

pub mod core;
pub mod color_adjust;
pub mod grayscale;
pub mod blur;
pub mod sharpen;
pub mod edge;
pub mod noise;
pub mod histogram;
pub mod geometry;
