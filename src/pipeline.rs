//! Ordered chains of filter stages.

use std::fmt;
use std::str::FromStr;

use crate::buffer::PixelBuffer;
use crate::error::{EnhanceError, EnhanceResult};
use crate::executor::Executor;
use crate::stage::FilterStage;

/// An immutable, ordered list of stages.
///
/// Applying a pipeline threads the buffer through every stage in order; stage
/// `i + 1` consumes the buffer produced by stage `i`. Nothing else is touched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pipeline {
    stages: Vec<FilterStage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage.
    pub fn then(mut self, stage: FilterStage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Grayscale, light blur, sharpen, histogram equalization.
    ///
    /// This is the fixed chain the batch walker runs on every file.
    pub fn preprocessing() -> Self {
        Self::new()
            .then(FilterStage::grayscale())
            .then(FilterStage::gaussian_blur_light())
            .then(FilterStage::sharpen())
            .then(FilterStage::HistogramEqualize)
    }

    /// Mean/median blend noise reduction.
    pub fn denoise(window: usize) -> EnhanceResult<Self> {
        Ok(Self::new().then(FilterStage::dual_filter_blend(window)?))
    }

    pub fn stages(&self) -> &[FilterStage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage in order. An empty pipeline returns the input.
    pub fn apply(&self, buffer: PixelBuffer, exec: &Executor) -> PixelBuffer {
        self.stages.iter().fold(buffer, |current, stage| {
            tracing::trace!(stage = %stage, "applying stage");
            stage.apply(&current, exec)
        })
    }
}

impl FromIterator<FilterStage> for Pipeline {
    fn from_iter<I: IntoIterator<Item = FilterStage>>(iter: I) -> Self {
        Self {
            stages: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stage) in self.stages.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{stage}")?;
        }
        Ok(())
    }
}

impl FromStr for Pipeline {
    type Err = EnhanceError;

    /// Comma separated stages, e.g. `grayscale,blur,sharpen,equalize`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let pipeline = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse::<FilterStage>)
            .collect::<EnhanceResult<Pipeline>>()?;
        if pipeline.is_empty() {
            return Err(EnhanceError::invalid_parameter("pipeline needs at least one stage"));
        }
        Ok(pipeline)
    }
}
