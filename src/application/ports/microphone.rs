//! Microphone access port interface

use async_trait::async_trait;

use super::capture::CaptureError;

/// Port for requesting access to the user's microphone
#[async_trait]
pub trait MicrophoneAccess: Send + Sync {
    /// Handle to an open microphone input
    type Stream: Send + Sync;

    /// Ask the platform for microphone input.
    ///
    /// # Returns
    /// An open input stream, or the reason access failed
    async fn request(&self) -> Result<Self::Stream, CaptureError>;
}
