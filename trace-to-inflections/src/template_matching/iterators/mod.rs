pub(crate) mod event;
pub(crate) mod save_to_file;

use super::{Detector, TracePoint};

pub(crate) use event::EventFilter;
pub(crate) use save_to_file::SaveToFileFilter;
