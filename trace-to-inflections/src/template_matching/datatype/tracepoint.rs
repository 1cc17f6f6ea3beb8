use std::fmt::Debug;

/// An abstraction of the types that are processed by the detectors.
/// To implement TracePoint a type must contain a position and a value.
pub(crate) trait TracePoint: Clone {
    /// The type which represents the position of the data point.
    /// This should be trivially copyable (usually a scalar).
    type Time: Copy + Debug;

    /// The type which contains the value of the data point.
    type Value: Copy + Debug;

    /// Returns the position of the data point.
    fn get_time(&self) -> Self::Time;

    /// Returns the value of the data point.
    fn get_value(&self) -> Self::Value;
}

/// This is the most basic non-trivial TracePoint type.
/// The first element is the position and the second the value.
impl<X, Y> TracePoint for (X, Y)
where
    X: Copy + Debug,
    Y: Copy + Debug,
{
    type Time = X;
    type Value = Y;

    fn get_time(&self) -> Self::Time {
        self.0
    }

    fn get_value(&self) -> Self::Value {
        self.1
    }
}
