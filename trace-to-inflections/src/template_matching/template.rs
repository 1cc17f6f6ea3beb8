use crate::{
    error::{ExtractionSkip, SkipReason, TemplateError},
    parameters::TemplateRange,
    template_matching::Real,
};
use gait_common::SampleIndex;
use tracing::{instrument, warn};

/// The canonical shape of the signal around an inflection point.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Template(Vec<Real>);

impl Template {
    #[cfg(test)]
    pub(crate) fn new(values: Vec<Real>) -> Self {
        Self(values)
    }

    pub(crate) fn values(&self) -> &[Real] {
        &self.0
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

/// Accumulates the column-wise mean of the windows extracted around each label.
#[derive(Debug, Clone)]
pub(crate) struct TemplateBuilder {
    range: TemplateRange,
    mean: Vec<Real>,
    rows: usize,
}

impl TemplateBuilder {
    pub(crate) fn new(range: TemplateRange) -> Self {
        Self {
            range,
            mean: vec![0.0; range.len()],
            rows: 0,
        }
    }

    /// The window `[label - lower_range, label + upper_range)` of `signal`.
    pub(crate) fn extract<'a>(
        &self,
        signal: &'a [Real],
        label: SampleIndex,
    ) -> Result<&'a [Real], ExtractionSkip> {
        let start = label
            .checked_sub(self.range.lower_range)
            .ok_or(ExtractionSkip {
                label,
                reason: SkipReason::BeforeStart,
            })?;
        signal
            .get(start..label + self.range.upper_range)
            .ok_or(ExtractionSkip {
                label,
                reason: SkipReason::PastEnd,
            })
    }

    /// Adds the window around `label` to the running mean.
    /// Nothing is accumulated if the window does not fit inside the signal.
    pub(crate) fn push(&mut self, signal: &[Real], label: SampleIndex) -> Result<(), ExtractionSkip> {
        let window = self.extract(signal, label)?;
        self.rows += 1;
        let rows = self.rows as Real;
        for (mean, value) in self.mean.iter_mut().zip(window) {
            *mean += (value - *mean) / rows;
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn rows(&self) -> usize {
        self.rows
    }

    pub(crate) fn build(self, skipped: usize) -> Result<Template, TemplateError> {
        if self.rows == 0 {
            Err(TemplateError::NoWindows { skipped })
        } else {
            Ok(Template(self.mean))
        }
    }

    /// Builds a template from every label, returning it with the labels that were skipped.
    #[instrument(skip_all, level = "debug", fields(num_labels = labels.len(), num_rows))]
    pub(crate) fn extract_all(
        mut self,
        signal: &[Real],
        labels: &[SampleIndex],
    ) -> Result<(Template, Vec<ExtractionSkip>), TemplateError> {
        let skipped: Vec<ExtractionSkip> = labels
            .iter()
            .filter_map(|&label| self.push(signal, label).err())
            .collect();
        for skip in &skipped {
            warn!("{skip}");
        }
        tracing::Span::current().record("num_rows", self.rows);
        let template = self.build(skipped.len())?;
        Ok((template, skipped))
    }
}
