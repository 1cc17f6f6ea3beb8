//! Tools for locating repeated inflection points in an underfoot pressure trace.
//!
//! A handful of manually labelled points are used to learn the shape of the signal
//! around an inflection point, that shape is then slid across the whole trace.
//! Typical usage of this module may look like:
//! ```ignore
//! let upsampled = Resampler::new(factor)?.upsample(&raw, &labels)?;
//! let smoothed = SavitzkyGolay::new(&smoothing)?.apply(upsampled.samples())?;
//! let (template, skipped) = TemplateBuilder::new(range).extract_all(&smoothed, upsampled.labels())?;
//! let peaks: Vec<_> = smoothed
//!     .similarity(&template, bias)        // (position, score) for each valid position
//!     .events(PeakDetector::default())    // one position per run of positive scores
//!     .collect();
//! ```

pub(crate) mod datatype;
pub(crate) mod detectors;
pub(crate) mod iterators;
pub(crate) mod matcher;
pub(crate) mod resample;
pub(crate) mod smoothing;
pub(crate) mod template;

pub(crate) use datatype::TracePoint;
pub(crate) use detectors::{Detector, peak_detector::PeakDetector};
pub(crate) use iterators::{EventFilter, SaveToFileFilter};
pub(crate) use matcher::SimilarityFilter;
pub(crate) use resample::Resampler;
pub(crate) use smoothing::SavitzkyGolay;
pub(crate) use template::{Template, TemplateBuilder};

pub type Real = f64;
