//! Track data models shared by the host task and the format plugins.

mod task;
mod track;

pub use task::{FrameAnnotation, LabeledShape, TaskData};
pub use track::{ShapeType, Track, TrackSource, TrackedShape};
