//! Filter stages: one immutable, parameterized step of a pipeline.

use std::fmt;
use std::str::FromStr;

use crate::buffer::PixelBuffer;
use crate::error::{EnhanceError, EnhanceResult};
use crate::executor::Executor;
use crate::filters::core::{convolve, Kernel};
use crate::filters::geometry::{self, ScaleFactors};
use crate::filters::noise::{self, Statistic, Window};
use crate::filters::{color_adjust, edge, grayscale, histogram};

/// Element-wise operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointOp {
    Brightness { offset: i32 },
    Contrast { factor: f32 },
    /// Lossy: color is discarded.
    Grayscale,
}

/// Same-size geometric resampling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Remap {
    Rotate { degrees: f32 },
    Scale(ScaleFactors),
    HorizontalFlip,
    VerticalFlip,
}

/// One step of a [`Pipeline`](crate::pipeline::Pipeline).
#[derive(Debug, Clone, PartialEq)]
pub enum FilterStage {
    Point(PointOp),
    Convolution(Kernel),
    /// Sobel gradient magnitude.
    EdgeMagnitude,
    OrderStatistic { window: Window, statistic: Statistic },
    /// `(mean + median) / 2` computed from the same input.
    DualFilterBlend { window: Window },
    HistogramEqualize,
    GeometricRemap(Remap),
}

impl FilterStage {
    pub fn brightness(offset: i32) -> Self {
        Self::Point(PointOp::Brightness { offset })
    }

    pub fn contrast(factor: f32) -> EnhanceResult<Self> {
        if !factor.is_finite() {
            return Err(EnhanceError::invalid_parameter("contrast factor must be finite"));
        }
        Ok(Self::Point(PointOp::Contrast { factor }))
    }

    pub fn grayscale() -> Self {
        Self::Point(PointOp::Grayscale)
    }

    pub fn gaussian_blur_light() -> Self {
        Self::Convolution(Kernel::gaussian_light())
    }

    pub fn gaussian_blur(sigma: f32, radius: usize) -> EnhanceResult<Self> {
        Ok(Self::Convolution(Kernel::gaussian(sigma, radius)?))
    }

    pub fn sharpen() -> Self {
        Self::Convolution(Kernel::sharpen())
    }

    pub fn sharpen_soft() -> Self {
        Self::Convolution(Kernel::sharpen_soft())
    }

    pub fn mean(window: usize) -> EnhanceResult<Self> {
        Ok(Self::OrderStatistic {
            window: Window::new(window)?,
            statistic: Statistic::Mean,
        })
    }

    pub fn median(window: usize) -> EnhanceResult<Self> {
        Ok(Self::OrderStatistic {
            window: Window::new(window)?,
            statistic: Statistic::Median,
        })
    }

    pub fn dual_filter_blend(window: usize) -> EnhanceResult<Self> {
        Ok(Self::DualFilterBlend {
            window: Window::new(window)?,
        })
    }

    pub fn rotate(degrees: f32) -> EnhanceResult<Self> {
        if !degrees.is_finite() {
            return Err(EnhanceError::invalid_parameter("rotation angle must be finite"));
        }
        Ok(Self::GeometricRemap(Remap::Rotate { degrees }))
    }

    pub fn scale(sx: f32, sy: f32) -> EnhanceResult<Self> {
        Ok(Self::GeometricRemap(Remap::Scale(ScaleFactors::new(sx, sy)?)))
    }

    pub fn hflip() -> Self {
        Self::GeometricRemap(Remap::HorizontalFlip)
    }

    pub fn vflip() -> Self {
        Self::GeometricRemap(Remap::VerticalFlip)
    }

    /// Produce a new buffer from `input`; the input is left untouched.
    pub fn apply(&self, input: &PixelBuffer, exec: &Executor) -> PixelBuffer {
        let view = input.view();
        let pixels = match self {
            Self::Point(PointOp::Brightness { offset }) => color_adjust::brightness(view, *offset, exec),
            Self::Point(PointOp::Contrast { factor }) => color_adjust::contrast(view, *factor, exec),
            Self::Point(PointOp::Grayscale) => grayscale::grayscale(view, exec),
            Self::Convolution(kernel) => convolve(view, kernel, exec),
            Self::EdgeMagnitude => edge::sobel(view, exec),
            Self::OrderStatistic { window, statistic } => noise::order_statistic(view, *window, *statistic, exec),
            Self::DualFilterBlend { window } => noise::mean_median_blend(view, *window, exec),
            Self::HistogramEqualize => histogram::equalize(view, exec),
            Self::GeometricRemap(Remap::Rotate { degrees }) => geometry::rotate(view, *degrees, exec),
            Self::GeometricRemap(Remap::Scale(factors)) => geometry::scale(view, *factors, exec),
            Self::GeometricRemap(Remap::HorizontalFlip) => geometry::flip_horizontal(view, exec),
            Self::GeometricRemap(Remap::VerticalFlip) => geometry::flip_vertical(view, exec),
        };
        PixelBuffer::from_array(pixels)
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Point(PointOp::Brightness { .. }) => "brightness",
            Self::Point(PointOp::Contrast { .. }) => "contrast",
            Self::Point(PointOp::Grayscale) => "grayscale",
            Self::Convolution(_) => "convolution",
            Self::EdgeMagnitude => "sobel",
            Self::OrderStatistic { statistic: Statistic::Mean, .. } => "mean",
            Self::OrderStatistic { statistic: Statistic::Median, .. } => "median",
            Self::DualFilterBlend { .. } => "denoise",
            Self::HistogramEqualize => "equalize",
            Self::GeometricRemap(Remap::Rotate { .. }) => "rotate",
            Self::GeometricRemap(Remap::Scale(_)) => "scale",
            Self::GeometricRemap(Remap::HorizontalFlip) => "hflip",
            Self::GeometricRemap(Remap::VerticalFlip) => "vflip",
        }
    }
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Point(PointOp::Brightness { offset }) => write!(f, "brightness={offset}"),
            Self::Point(PointOp::Contrast { factor }) => write!(f, "contrast={factor}"),
            Self::OrderStatistic { window, .. } | Self::DualFilterBlend { window } => {
                write!(f, "{}={}", self.name(), window.size())
            }
            Self::GeometricRemap(Remap::Rotate { degrees }) => write!(f, "rotate={degrees}"),
            Self::GeometricRemap(Remap::Scale(s)) => write!(f, "scale={}x{}", s.sx(), s.sy()),
            Self::Convolution(k) => write!(f, "convolution({0}x{0})", k.size()),
            _ => f.write_str(self.name()),
        }
    }
}

fn parse_param<T: FromStr>(name: &str, value: Option<&str>) -> EnhanceResult<T> {
    let value = value.ok_or_else(|| EnhanceError::invalid_parameter(format!("stage '{name}' needs a value")))?;
    value
        .trim()
        .parse()
        .map_err(|_| EnhanceError::invalid_parameter(format!("stage '{name}': cannot parse '{value}'")))
}

fn parse_pair<A: FromStr, B: FromStr>(name: &str, value: Option<&str>, sep: char) -> EnhanceResult<(A, B)> {
    let raw: String = parse_param(name, value)?;
    let (a, b) = raw
        .split_once(sep)
        .ok_or_else(|| EnhanceError::invalid_parameter(format!("stage '{name}' expects <a>{sep}<b>")))?;
    Ok((parse_param(name, Some(a))?, parse_param(name, Some(b))?))
}

impl FromStr for FilterStage {
    type Err = EnhanceError;

    /// Parse `name` or `name=value`, e.g. `rotate=45`, `scale=1.5x1.5`,
    /// `gaussian=5:10` (sigma:radius), `median=3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, value) = match s.split_once('=') {
            Some((name, value)) => (name.trim(), Some(value)),
            None => (s, None),
        };

        let no_value = |stage: FilterStage| match value {
            None => Ok(stage),
            Some(_) => Err(EnhanceError::invalid_parameter(format!("stage '{name}' takes no value"))),
        };

        match name.to_ascii_lowercase().as_str() {
            "grayscale" | "gray" => no_value(Self::grayscale()),
            "brightness" => Ok(Self::brightness(parse_param(name, value)?)),
            "contrast" => Self::contrast(parse_param(name, value)?),
            "blur" => no_value(Self::gaussian_blur_light()),
            "gaussian" => {
                let (sigma, radius): (f32, usize) = parse_pair(name, value, ':')?;
                Self::gaussian_blur(sigma, radius)
            }
            "sharpen" => no_value(Self::sharpen()),
            "sharpen-soft" => no_value(Self::sharpen_soft()),
            "sobel" => no_value(Self::EdgeMagnitude),
            "mean" => Self::mean(parse_param(name, value)?),
            "median" => Self::median(parse_param(name, value)?),
            "denoise" => Self::dual_filter_blend(parse_param(name, value)?),
            "equalize" => no_value(Self::HistogramEqualize),
            "rotate" => Self::rotate(parse_param(name, value)?),
            "scale" => {
                let (sx, sy) = parse_pair(name, value, 'x')?;
                Self::scale(sx, sy)
            }
            "hflip" => no_value(Self::hflip()),
            "vflip" => no_value(Self::vflip()),
            other => Err(EnhanceError::invalid_parameter(format!("unknown stage '{other}'"))),
        }
    }
}
