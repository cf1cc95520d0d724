mod recorder;

pub use recorder::DebugRecorder;
