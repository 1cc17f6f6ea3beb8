pub(crate) mod peak_detector;

use super::TracePoint;

/// A stateful consumer of a trace, which occasionally emits an event.
pub(crate) trait Detector: Clone {
    type TracePointType: TracePoint;
    type EventPointType;

    /// Feeds the next point of the trace to the detector.
    fn signal(
        &mut self,
        time: <Self::TracePointType as TracePoint>::Time,
        value: <Self::TracePointType as TracePoint>::Value,
    ) -> Option<Self::EventPointType>;

    /// Called once the trace is exhausted, allowing any pending event to be emitted.
    fn finish(&mut self) -> Option<Self::EventPointType>;
}
