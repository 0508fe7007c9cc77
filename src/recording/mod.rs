mod recorder;

pub use recorder::{CaptureEnd, ChunkedRecorder};
