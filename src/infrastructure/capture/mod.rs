//! Capture engine infrastructure module
//!
//! Encodes microphone PCM with an external ffmpeg process.

mod ffmpeg;

pub use ffmpeg::{EventSender, FfmpegCaptureEngine, FfmpegCapabilities};
