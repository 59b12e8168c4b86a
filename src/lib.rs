//! Image Enhance
//!
//! Spatial-domain image enhancement filters and a recursive batch runner
//! that applies a filter pipeline to every image in a directory tree.
//!
//! ## Image Format
//! Filters work on interleaved 8-bit samples with multiple channel
//! configurations:
//! - **Grayscale**: (height, width, 1) - single channel
//! - **RGB**: (height, width, 3) - 3 color channels
//! - **RGBA**: (height, width, 4) - 3 color channels + alpha
//!
//! Every filter keeps the input dimensions. Pixels a filter cannot compute
//! (kernel borders, remaps that land outside the image) keep their input
//! value.
//!
//! ## Execution
//! Filters take an [`Executor`] that writes output rows either on a rayon
//! pool or one after another. Both modes produce byte-identical results.
//!
//! ```no_run
//! use std::path::Path;
//! use image_enhance::{run_batch, BatchOptions, ImageCodec, Pipeline};
//!
//! let summary = run_batch(
//!     Path::new("photos"),
//!     Path::new("enhanced"),
//!     &Pipeline::preprocessing(),
//!     &ImageCodec,
//!     &BatchOptions::default(),
//! )?;
//! println!("{} images", summary.processed);
//! # Ok::<(), image_enhance::EnhanceError>(())
//! ```

pub mod batch;
pub mod buffer;
pub mod codec;
pub mod error;
pub mod executor;
pub mod filters;
pub mod pipeline;
pub mod stage;

pub use batch::{enhance_file, run_batch, BatchOptions, BatchSummary, ProgressCounter};
pub use buffer::PixelBuffer;
pub use codec::{Codec, ImageCodec};
pub use error::{EnhanceError, EnhanceResult};
pub use executor::{ExecutionMode, Executor};
pub use filters::core::Kernel;
pub use filters::geometry::ScaleFactors;
pub use filters::noise::{Statistic, Window};
pub use pipeline::Pipeline;
pub use stage::{FilterStage, PointOp, Remap};
