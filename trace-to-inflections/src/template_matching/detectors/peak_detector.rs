use super::Detector;
use crate::template_matching::Real;
use gait_common::SampleIndex;
use tracing::debug;

/// Scores strictly above this value belong to a run.
const THRESHOLD: Real = 0.0;

/// The (position, score) pairs of a run of scores above the threshold.
#[derive(Default, Debug, Clone, PartialEq)]
pub(crate) struct DetectionBuffer {
    points: Vec<(SampleIndex, Real)>,
}

impl DetectionBuffer {
    fn new(position: SampleIndex, score: Real) -> Self {
        Self {
            points: vec![(position, score)],
        }
    }

    fn push(&mut self, position: SampleIndex, score: Real) {
        self.points.push((position, score));
    }

    /// Position of the greatest score in the run, the earliest if several are equal.
    fn peak_position(&self) -> Option<SampleIndex> {
        self.points
            .iter()
            .fold(None, |best: Option<&(SampleIndex, Real)>, point| match best {
                Some(best) if best.1 >= point.1 => Some(best),
                _ => Some(point),
            })
            .map(|(position, _)| *position)
    }

    /// The inflection point a completed run resolves to.
    fn resolve(&self) -> Option<SampleIndex> {
        self.peak_position()
            .map(|position| position.saturating_sub(1))
    }
}

#[derive(Default, Debug, Clone, PartialEq)]
pub(crate) enum PeakState {
    #[default]
    Searching,
    Accumulating(DetectionBuffer),
}

impl PeakState {
    fn transition(self, position: SampleIndex, score: Real) -> (Self, Option<SampleIndex>) {
        let above = score > THRESHOLD;
        match self {
            Self::Searching if above => (
                Self::Accumulating(DetectionBuffer::new(position, score)),
                None,
            ),
            Self::Searching => (Self::Searching, None),
            Self::Accumulating(mut buffer) if above => {
                buffer.push(position, score);
                (Self::Accumulating(buffer), None)
            }
            Self::Accumulating(buffer) => (Self::Searching, buffer.resolve()),
        }
    }
}

/// Two-state hysteresis peak picker.
/// Buffers each contiguous run of positive similarity scores and,
/// when the run ends, emits one less than the position of its maximum.
#[derive(Default, Clone)]
pub(crate) struct PeakDetector {
    state: PeakState,
    flush_trailing_run: bool,
}

impl PeakDetector {
    pub(crate) fn new(flush_trailing_run: bool) -> Self {
        Self {
            flush_trailing_run,
            ..Default::default()
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> &PeakState {
        &self.state
    }
}

impl Detector for PeakDetector {
    type TracePointType = (SampleIndex, Real);
    type EventPointType = SampleIndex;

    fn signal(&mut self, position: SampleIndex, score: Real) -> Option<SampleIndex> {
        let (state, event) = std::mem::take(&mut self.state).transition(position, score);
        self.state = state;
        event
    }

    fn finish(&mut self) -> Option<SampleIndex> {
        match std::mem::take(&mut self.state) {
            PeakState::Accumulating(buffer) if self.flush_trailing_run => buffer.resolve(),
            PeakState::Accumulating(buffer) => {
                debug!(
                    "Discarding run of {} positive scores open at end of trace",
                    buffer.points.len()
                );
                None
            }
            PeakState::Searching => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template_matching::EventFilter;

    fn detect(scores: &[Real], detector: PeakDetector) -> Vec<SampleIndex> {
        scores
            .iter()
            .copied()
            .enumerate()
            .map(|(i, v)| (i + 10, v))
            .events(detector)
            .collect()
    }

    #[test]
    fn zero_data() {
        assert!(detect(&[], PeakDetector::default()).is_empty());
    }

    #[test]
    fn no_positive_scores() {
        assert!(detect(&[-5.0, -1.0, 0.0, -3.0, 0.0], PeakDetector::default()).is_empty());
    }

    #[test]
    fn single_runs() {
        let scores = [-1.0, 2.0, 5.0, 3.0, -1.0, -2.0, 1.0, 0.0, 4.0, 6.0, 7.0, -1.0];
        assert_eq!(detect(&scores, PeakDetector::default()), vec![11, 15, 19]);
    }

    #[test]
    fn zero_ends_a_run() {
        let scores = [1.0, 0.0, 2.0, -0.5];
        assert_eq!(detect(&scores, PeakDetector::default()), vec![9, 11]);
    }

    #[test]
    fn ties_resolve_to_earliest() {
        let scores = [-1.0, 3.0, 1.0, 3.0, -1.0];
        assert_eq!(detect(&scores, PeakDetector::default()), vec![10]);
    }

    #[test]
    fn trailing_run_discarded() {
        let scores = [-1.0, 2.0, -1.0, 1.0, 4.0];
        assert_eq!(detect(&scores, PeakDetector::new(false)), vec![10]);
    }

    #[test]
    fn trailing_run_flushed() {
        let scores = [-1.0, 2.0, -1.0, 1.0, 4.0];
        assert_eq!(detect(&scores, PeakDetector::new(true)), vec![10, 13]);
    }

    #[test]
    fn state_transitions() {
        let mut detector = PeakDetector::default();
        assert_eq!(detector.signal(5, -1.0), None);
        assert_eq!(detector.state(), &PeakState::Searching);

        assert_eq!(detector.signal(6, 1.0), None);
        assert_eq!(
            detector.state(),
            &PeakState::Accumulating(DetectionBuffer::new(6, 1.0))
        );

        assert_eq!(detector.signal(7, 2.0), None);
        assert_eq!(detector.signal(8, -2.0), Some(6));
        assert_eq!(detector.state(), &PeakState::Searching);
        assert_eq!(detector.finish(), None);
    }
}
