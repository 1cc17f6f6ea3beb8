use crate::template_matching::Real;
use gait_common::{DatasetName, SampleIndex};
use thiserror::Error;

/// Problems with the supplied parameters or inputs, detected before any dataset is processed.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error(
        "Dataset keys must match: no labels for {missing_labels:?}, no pressure data for {missing_pressure:?}"
    )]
    MismatchedKeys {
        missing_labels: Vec<DatasetName>,
        missing_pressure: Vec<DatasetName>,
    },
    #[error("Upsample factor must be at least 1, got {0}")]
    UpsampleFactor(usize),
    #[error("Template range must contain at least one sample")]
    EmptyTemplateRange,
    #[error("Invalid smoothing parameters: {0}")]
    Smoothing(#[from] SmoothingError),
    #[error("Invalid resampling parameters: {0}")]
    Resample(#[from] ResampleError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SmoothingError {
    #[error("Window size must be a positive odd number, got {0}")]
    WindowNotPositiveOdd(usize),
    #[error("Window size {window} is too small for polynomial order {order}")]
    WindowTooSmall { window: usize, order: usize },
    #[error("Derivative order {deriv} exceeds polynomial order {order}")]
    DerivativeTooHigh { deriv: usize, order: usize },
    #[error("Least squares design matrix is singular")]
    SingularDesign,
    #[error("Signal of length {len} is too short for a window of size {window}")]
    SignalTooShort { len: usize, window: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResampleError {
    #[error("Upsample factor must be at least 1, got {0}")]
    UpsampleFactor(usize),
    #[error("Cubic interpolation requires at least 4 samples, got {0}")]
    InsufficientSamples(usize),
    #[error("Label {label} is outside a signal of length {len}")]
    LabelOutOfBounds { label: SampleIndex, len: usize },
    #[error("Sample positions must be strictly increasing")]
    NonIncreasingKnots,
    #[error("Upsampled length of {len} samples by a factor of {factor} overflows")]
    LengthOverflow { len: usize, factor: usize },
    #[error("Singular system whilst computing spline coefficients")]
    SingularSystem,
}

#[derive(Debug, Clone, Copy, PartialEq, strum::Display)]
pub enum SkipReason {
    #[strum(to_string = "window starts before the signal")]
    BeforeStart,
    #[strum(to_string = "window ends after the signal")]
    PastEnd,
}

/// A label whose extraction window does not fit inside the signal.
/// The label is excluded from the template, processing continues.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Label {label} skipped: {reason}")]
pub struct ExtractionSkip {
    pub label: SampleIndex,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TemplateError {
    #[error("No label produced a complete window ({skipped} skipped), cannot build a template")]
    NoWindows { skipped: usize },
}

/// A failure confined to a single dataset's pass through the pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DatasetError {
    #[error("Resampling failed: {0}")]
    Resample(#[from] ResampleError),
    #[error("Smoothing failed: {0}")]
    Smoothing(#[from] SmoothingError),
    #[error("Template construction failed: {0}")]
    Template(#[from] TemplateError),
    #[error("Offset {offset} added to inflection point {index} overflows")]
    OffsetOverflow { index: SampleIndex, offset: usize },
    #[error("Sample {index} is not finite: {value}")]
    NonFiniteSample { index: SampleIndex, value: Real },
}

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("IO Error: {0}")]
    IO(#[from] std::io::Error),
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
}
