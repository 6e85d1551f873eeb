//! Domain layer - Core widget logic
//!
//! Contains value objects, entities, and domain errors.
//! This layer has no dependencies on external systems.

pub mod config;
pub mod error;
pub mod recording;
pub mod widget;

// Re-export common types
pub use config::AppConfig;
pub use error::*;
pub use recording::{
    Artifact, ArtifactExtension, AudioFragment, EncodingFormat, RecorderState, RecordingId,
    RecordingSession,
};
pub use widget::{ReleaseTrigger, UiState};
