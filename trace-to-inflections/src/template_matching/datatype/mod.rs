pub(crate) mod tracepoint;

pub(crate) use tracepoint::TracePoint;
