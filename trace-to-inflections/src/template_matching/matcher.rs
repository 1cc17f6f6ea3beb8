use super::{Real, Template};
use gait_common::SampleIndex;
use std::ops::Range;

/// Lazily scores each placement of a template along a signal.
/// The score at position `p` compares `signal[p..p + len]` with the template,
/// positions within one template length of either end of the signal are not scored.
#[derive(Clone)]
pub(crate) struct SimilarityIter<'a> {
    signal: &'a [Real],
    template: &'a Template,
    bias: Real,
    positions: Range<SampleIndex>,
}

impl<'a> SimilarityIter<'a> {
    pub(crate) fn new(signal: &'a [Real], template: &'a Template, bias: Real) -> Self {
        let width = template.len();
        Self {
            signal,
            template,
            bias,
            positions: (width + 1)..signal.len().saturating_sub(width),
        }
    }

    /// `bias - sum(|segment - template|)`, positive for close matches.
    fn score(&self, position: SampleIndex) -> Option<Real> {
        let segment = self
            .signal
            .get(position..position + self.template.len())?;
        let distance: Real = segment
            .iter()
            .zip(self.template.values())
            .map(|(s, t)| (s - t).abs())
            .sum();
        Some(self.bias - distance)
    }
}

impl Iterator for SimilarityIter<'_> {
    type Item = (SampleIndex, Real);

    fn next(&mut self) -> Option<Self::Item> {
        let position = self.positions.next()?;
        self.score(position).map(|score| (position, score))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.positions.size_hint()
    }
}

pub(crate) trait SimilarityFilter {
    fn similarity<'a>(&'a self, template: &'a Template, bias: Real) -> SimilarityIter<'a>;
}

impl SimilarityFilter for [Real] {
    fn similarity<'a>(&'a self, template: &'a Template, bias: Real) -> SimilarityIter<'a> {
        SimilarityIter::new(self, template, bias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template_matching::{EventFilter, PeakDetector};
    use assert_approx_eq::assert_approx_eq;

    fn triangle(len: usize, height: Real) -> Vec<Real> {
        let half = len as Real / 2.0;
        (0..len)
            .map(|i| height * (1.0 - (i as Real - half).abs() / half))
            .collect()
    }

    #[test]
    fn valid_positions() {
        let signal = [0.0; 10];
        let template = Template::new(vec![1.0, 1.0]);
        let positions: Vec<_> = signal
            .similarity(&template, 0.0)
            .map(|(position, _)| position)
            .collect();
        assert_eq!(positions, vec![3, 4, 5, 6, 7]);
    }

    #[test]
    fn short_signal() {
        let template = Template::new(vec![1.0; 5]);
        assert_eq!([0.0; 10].similarity(&template, 20.0).count(), 0);
        assert_eq!([0.0; 0].similarity(&template, 20.0).count(), 0);
    }

    #[test]
    fn scores() {
        let signal = [0.0, 0.0, 0.0, 1.0, 2.0, 1.0, 0.0, 0.0, 0.0, 0.0];
        let template = Template::new(vec![1.0, 2.0]);
        let scores: Vec<_> = signal.similarity(&template, 3.0).collect();
        assert_eq!(scores.len(), 5);
        assert_eq!(scores[0].0, 3);
        assert_approx_eq!(scores[0].1, 3.0);
        assert_approx_eq!(scores[1].1, 3.0 - 2.0);
        assert_approx_eq!(scores[2].1, 3.0 - 2.0);
        assert_approx_eq!(scores[3].1, 3.0 - 3.0);
    }

    #[test]
    fn single_match_on_flat_baseline() {
        let shape = triangle(50, 100.0);
        let k = 400;
        let mut signal = vec![0.0; 1000];
        signal[k..k + shape.len()].copy_from_slice(&shape);
        let template = Template::new(shape);

        let trace: Vec<_> = signal.similarity(&template, 20.0).collect();
        assert_eq!(trace.iter().filter(|(_, score)| *score > 0.0).count(), 1);

        let peaks: Vec<_> = trace.into_iter().events(PeakDetector::default()).collect();
        assert_eq!(peaks, vec![k - 1]);
    }
}
