use crate::{
    error::{ConfigurationError, DatasetError, ExtractionSkip},
    parameters::PipelineParameters,
    template_matching::{
        EventFilter, PeakDetector, Real, Resampler, SaveToFileFilter, SavitzkyGolay,
        SimilarityFilter, Template, TemplateBuilder,
    },
};
use gait_common::{DatasetName, InflectionData, LabelData, PressureData, Sample, SampleIndex};
use itertools::{Either, EitherOrBoth, Itertools};
use rayon::prelude::*;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use tracing::{Span, debug, info, instrument, warn};

/// The outcome of running the pipeline over every dataset.
#[derive(Debug, Default)]
pub struct InflectionReport {
    /// Detected inflection points of each dataset which completed, in upsampled coordinates.
    pub inflections: InflectionData,
    /// Labels excluded from each dataset's template.
    pub skipped_labels: BTreeMap<DatasetName, Vec<ExtractionSkip>>,
    /// Datasets which failed, and why.
    pub failures: BTreeMap<DatasetName, DatasetError>,
}

struct DatasetInflections {
    indices: Vec<SampleIndex>,
    skipped: Vec<ExtractionSkip>,
}

#[derive(Debug, Clone, Copy, strum::Display)]
pub(crate) enum SaveKind {
    #[strum(to_string = "smoothed")]
    Smoothed,
    #[strum(to_string = "template")]
    Template,
    #[strum(to_string = "similarity")]
    Similarity,
    #[strum(to_string = "inflections")]
    Inflections,
}

pub(crate) fn get_save_file_name(save_path: &Path, dataset: &str, kind: SaveKind) -> PathBuf {
    save_path.join(format!("{dataset}_{kind}.csv"))
}

/// Every dataset must have labels, and every set of labels a dataset.
pub(crate) fn check_keys(
    pressure: &PressureData,
    labels: &LabelData,
) -> Result<(), ConfigurationError> {
    let (missing_labels, missing_pressure): (Vec<_>, Vec<_>) = pressure
        .keys()
        .merge_join_by(labels.keys(), |p, l| p.cmp(l))
        .filter_map(|keys| match keys {
            EitherOrBoth::Left(name) => Some(Either::Left(name.clone())),
            EitherOrBoth::Right(name) => Some(Either::Right(name.clone())),
            EitherOrBoth::Both(..) => None,
        })
        .partition_map(|name| name);

    if missing_labels.is_empty() && missing_pressure.is_empty() {
        Ok(())
    } else {
        Err(ConfigurationError::MismatchedKeys {
            missing_labels,
            missing_pressure,
        })
    }
}

/// Learns a template from the labels of each dataset and uses it to locate
/// every inflection point in that dataset.
///
/// Parameters and dataset keys are checked before any dataset is processed.
/// Datasets are independent, a failure in one is recorded in the report and the rest continue.
#[instrument(skip_all, fields(num_datasets = pressure.len(), num_failures))]
pub fn find_inflections(
    pressure: &PressureData,
    labels: &LabelData,
    parameters: &PipelineParameters,
    save_path: Option<&Path>,
) -> Result<InflectionReport, ConfigurationError> {
    parameters.validate()?;
    check_keys(pressure, labels)?;

    let resampler = Resampler::new(parameters.upsample_factor)?;
    let smoother = SavitzkyGolay::new(&parameters.smoothing)?;

    let span = Span::current();
    let results: Vec<_> = pressure
        .par_iter()
        .filter_map(|(name, signal)| Some((name, signal, labels.get(name)?)))
        .map(|(name, signal, labels)| {
            let result = span.in_scope(|| {
                find_dataset_inflections(
                    name,
                    signal,
                    labels,
                    &resampler,
                    &smoother,
                    parameters,
                    save_path,
                )
            });
            (name, result)
        })
        .collect();

    let mut report = InflectionReport::default();
    for (name, result) in results {
        match result {
            Ok(DatasetInflections { indices, skipped }) => {
                if !skipped.is_empty() {
                    report.skipped_labels.insert(name.clone(), skipped);
                }
                report.inflections.insert(name.clone(), indices);
            }
            Err(e) => {
                warn!(dataset = %name, "Dataset failed: {e}");
                report.failures.insert(name.clone(), e);
            }
        }
    }
    span.record("num_failures", report.failures.len());
    info!(
        "Inflection points found in {} of {} datasets",
        report.inflections.len(),
        pressure.len()
    );
    Ok(report)
}

#[instrument(skip_all, fields(dataset = name, num_labels = labels.len(), num_inflections))]
fn find_dataset_inflections(
    name: &str,
    signal: &[Sample],
    labels: &[SampleIndex],
    resampler: &Resampler,
    smoother: &SavitzkyGolay,
    parameters: &PipelineParameters,
    save_path: Option<&Path>,
) -> Result<DatasetInflections, DatasetError> {
    if let Some((index, value)) = signal
        .iter()
        .copied()
        .enumerate()
        .find(|(_, value)| !value.is_finite())
    {
        return Err(DatasetError::NonFiniteSample { index, value });
    }

    let upsampled = resampler.upsample(signal, labels)?;
    let smoothed = smoother.apply(upsampled.samples())?;
    let (template, skipped) = TemplateBuilder::new(parameters.template_range)
        .extract_all(&smoothed, upsampled.labels())?;

    let offset = parameters.alignment_offset(template.len());
    let trace = smoothed.similarity(&template, parameters.similarity_bias);
    let indices = trace
        .clone()
        .events(PeakDetector::new(parameters.flush_trailing_run))
        .map(|index| {
            index
                .checked_add(offset)
                .ok_or(DatasetError::OffsetOverflow { index, offset })
        })
        .collect::<Result<Vec<SampleIndex>, _>>()?;
    Span::current().record("num_inflections", indices.len());
    debug!(
        "Template of {} samples from {} labels, offset {offset}",
        template.len(),
        upsampled.labels().len() - skipped.len()
    );

    if let Some(save_path) = save_path {
        save_intermediates(save_path, name, &smoothed, &template, trace, &indices);
    }

    Ok(DatasetInflections { indices, skipped })
}

fn save_intermediates<I>(
    save_path: &Path,
    name: &str,
    smoothed: &[Real],
    template: &Template,
    trace: I,
    indices: &[SampleIndex],
) where
    I: Iterator<Item = (SampleIndex, Real)>,
{
    let file = |kind| get_save_file_name(save_path, name, kind);
    let results = [
        (
            SaveKind::Smoothed,
            smoothed.iter().enumerate().save_to_file(&file(SaveKind::Smoothed)),
        ),
        (
            SaveKind::Template,
            template
                .values()
                .iter()
                .enumerate()
                .save_to_file(&file(SaveKind::Template)),
        ),
        (
            SaveKind::Similarity,
            trace.save_to_file(&file(SaveKind::Similarity)),
        ),
        (
            SaveKind::Inflections,
            indices
                .iter()
                .enumerate()
                .save_to_file(&file(SaveKind::Inflections)),
        ),
    ];
    for (kind, result) in results {
        if let Err(e) = result {
            warn!("Failed to save {kind} for dataset {name}: {e}");
        }
    }
}
