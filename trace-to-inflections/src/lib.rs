//! Detects the repeated inflection points of underfoot pressure traces
//! from a few manually labelled examples per trace.

pub mod error;
pub mod loader;
pub mod parameters;
pub mod processing;
pub(crate) mod template_matching;

pub use error::{ConfigurationError, DatasetError, ExtractionSkip, LoaderError, SkipReason};
pub use parameters::{PipelineParameters, SmoothingParameters, TemplateRange};
pub use processing::{InflectionReport, find_inflections};
pub use template_matching::Real;
