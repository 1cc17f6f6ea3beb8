pub mod tracer;

use std::collections::BTreeMap;

pub type Sample = f64;
pub type SampleIndex = usize;
pub type DatasetName = String;

/// Raw underfoot pressure samples, keyed by dataset name.
pub type PressureData = BTreeMap<DatasetName, Vec<Sample>>;

/// Manually marked inflection points, as indices into the matching entry of [PressureData].
pub type LabelData = BTreeMap<DatasetName, Vec<SampleIndex>>;

/// Detected inflection points, as indices into each dataset's upsampled signal.
pub type InflectionData = BTreeMap<DatasetName, Vec<SampleIndex>>;
