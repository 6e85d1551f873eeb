//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod capture;
pub mod clock;
pub mod config;
pub mod download;
pub mod microphone;
pub mod surface;

// Re-export common types
pub use capture::{CaptureEngine, CaptureError, RecorderEvent};
pub use clock::Clock;
pub use config::ConfigStore;
pub use download::{DownloadError, DownloadLink, DownloadSink};
pub use microphone::MicrophoneAccess;
pub use surface::WidgetSurface;
