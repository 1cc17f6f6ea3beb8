use crate::{
    error::{ConfigurationError, SmoothingError},
    template_matching::Real,
};
use clap::Args;

pub const DEFAULT_SIMILARITY_BIAS: Real = 20.0;
pub const DEFAULT_SMOOTHING_WINDOW: usize = 93;
pub const DEFAULT_SMOOTHING_ORDER: usize = 3;
pub const DEFAULT_TEMPLATE_HALF_WIDTH: usize = 100;

#[derive(Debug, Clone, Args)]
pub struct SmoothingParameters {
    /// Width of the Savitzky-Golay window, must be a positive odd number.
    #[clap(long = "smoothing-window", env = "SMOOTHING_WINDOW", default_value_t = DEFAULT_SMOOTHING_WINDOW)]
    pub window: usize,

    /// Order of the polynomial fitted over each window, must be less than `window - 1`.
    #[clap(long = "smoothing-order", env = "SMOOTHING_ORDER", default_value_t = DEFAULT_SMOOTHING_ORDER)]
    pub order: usize,

    /// Derivative of the fitted polynomial to output, zero for plain smoothing.
    #[clap(long = "smoothing-derivative", env = "SMOOTHING_DERIVATIVE", default_value_t = 0)]
    pub derivative: usize,

    #[clap(long = "smoothing-rate", env = "SMOOTHING_RATE", default_value_t = 1.0)]
    pub rate: Real,
}

impl Default for SmoothingParameters {
    fn default() -> Self {
        Self {
            window: DEFAULT_SMOOTHING_WINDOW,
            order: DEFAULT_SMOOTHING_ORDER,
            derivative: 0,
            rate: 1.0,
        }
    }
}

impl SmoothingParameters {
    pub fn validate(&self) -> Result<(), SmoothingError> {
        if self.window % 2 != 1 {
            Err(SmoothingError::WindowNotPositiveOdd(self.window))
        } else if self.window < self.order + 2 {
            Err(SmoothingError::WindowTooSmall {
                window: self.window,
                order: self.order,
            })
        } else if self.derivative > self.order {
            Err(SmoothingError::DerivativeTooHigh {
                deriv: self.derivative,
                order: self.order,
            })
        } else {
            Ok(())
        }
    }

    pub(crate) fn half_window(&self) -> usize {
        (self.window - 1) / 2
    }
}

/// Number of samples taken either side of each label when building a template.
#[derive(Debug, Clone, Copy, PartialEq, Args)]
pub struct TemplateRange {
    /// Samples kept before each inflection point.
    #[clap(long, env, default_value_t = DEFAULT_TEMPLATE_HALF_WIDTH)]
    pub lower_range: usize,

    /// Samples kept from each inflection point onwards.
    #[clap(long, env, default_value_t = DEFAULT_TEMPLATE_HALF_WIDTH)]
    pub upper_range: usize,
}

impl Default for TemplateRange {
    fn default() -> Self {
        Self {
            lower_range: DEFAULT_TEMPLATE_HALF_WIDTH,
            upper_range: DEFAULT_TEMPLATE_HALF_WIDTH,
        }
    }
}

impl TemplateRange {
    pub fn new(lower_range: usize, upper_range: usize) -> Self {
        Self {
            lower_range,
            upper_range,
        }
    }

    pub fn len(&self) -> usize {
        self.lower_range + self.upper_range
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Args)]
pub struct PipelineParameters {
    /// The length factor each signal is upsampled by,
    /// e.g. data sampled at 66 Hz is taken to 1980 Hz with a factor of 30.
    #[clap(long, env)]
    pub upsample_factor: usize,

    /// Added to the negated distance from the template, so that close matches score above zero.
    #[clap(long, env, default_value_t = DEFAULT_SIMILARITY_BIAS)]
    pub similarity_bias: Real,

    #[clap(flatten)]
    pub smoothing: SmoothingParameters,

    #[clap(flatten)]
    pub template_range: TemplateRange,

    /// Offset added to every detected index.
    /// Defaults to one and a half template lengths.
    #[clap(long, env)]
    pub alignment_offset: Option<usize>,

    /// If set, a run of positive similarity still open when the trace ends is resolved
    /// to an inflection point, otherwise it is discarded.
    #[clap(long, env, default_value = "false")]
    pub flush_trailing_run: bool,
}

impl PipelineParameters {
    pub fn new(upsample_factor: usize) -> Self {
        Self {
            upsample_factor,
            similarity_bias: DEFAULT_SIMILARITY_BIAS,
            smoothing: SmoothingParameters::default(),
            template_range: TemplateRange::default(),
            alignment_offset: None,
            flush_trailing_run: false,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.upsample_factor == 0 {
            return Err(ConfigurationError::UpsampleFactor(self.upsample_factor));
        }
        if self.template_range.is_empty() {
            return Err(ConfigurationError::EmptyTemplateRange);
        }
        self.smoothing.validate()?;
        Ok(())
    }

    /// Offset mapping a resolved similarity peak onto the inflection point it matched.
    /// The default, `len + round(len / 2)`, is an empirical calibration.
    pub(crate) fn alignment_offset(&self, template_len: usize) -> usize {
        self.alignment_offset
            .unwrap_or(template_len + (0.5 * template_len as Real).round() as usize)
    }
}
