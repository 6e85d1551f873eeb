//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with external systems like cpal, FFmpeg and the filesystem.

pub mod capture;
pub mod clock;
pub mod config;
pub mod download;
pub mod microphone;

// Re-export adapters
pub use capture::{FfmpegCaptureEngine, FfmpegCapabilities};
pub use clock::SystemClock;
pub use config::XdgConfigStore;
pub use download::DirectoryDownloads;
pub use microphone::{CpalMicrophone, MicrophoneStream};
