//! Capture engine port interfaces

use thiserror::Error;

use crate::domain::recording::{AudioFragment, EncodingFormat, RecordingId};

/// Capture errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("Microphone access denied")]
    PermissionDenied,

    #[error("No microphone available")]
    NoInputDevice,

    #[error("Microphone unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to start recording: {0}")]
    StartFailed(String),

    #[error("Failed to stop recording: {0}")]
    StopFailed(String),
}

/// Notifications a capture engine delivers while and after recording.
///
/// Every event carries the id of the recording it belongs to so that
/// late events from an abandoned recording can be told apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent<F> {
    /// A chunk of encoded audio became available
    Fragment { recording: RecordingId, data: F },

    /// Capture has halted; no more fragments will follow for this recording
    Stopped {
        recording: RecordingId,
        mime_type: Option<String>,
    },
}

impl<F> RecorderEvent<F> {
    pub fn recording(&self) -> RecordingId {
        match self {
            Self::Fragment { recording, .. } | Self::Stopped { recording, .. } => *recording,
        }
    }
}

/// Port for the platform facility that encodes a capture session.
///
/// `begin` and `request_stop` only ask; results arrive later as
/// [`RecorderEvent`]s through whatever channel the adapter was built with.
pub trait CaptureEngine {
    /// Handle to the microphone input the engine records from
    type Source;

    /// Unit of encoded audio the engine emits
    type Fragment: AudioFragment + Send + Sync + 'static;

    /// Whether the engine can produce the given format
    fn supports(&self, format: EncodingFormat) -> bool;

    /// Start encoding `source` for `recording`.
    ///
    /// `format` of `None` asks for the engine's own default.
    fn begin(
        &mut self,
        source: &Self::Source,
        recording: RecordingId,
        format: Option<EncodingFormat>,
    ) -> Result<(), CaptureError>;

    /// Ask the engine to halt. A `Stopped` event follows once it has.
    fn request_stop(&mut self) -> Result<(), CaptureError>;
}
