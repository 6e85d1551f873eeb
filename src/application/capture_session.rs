//! Capture session manager

use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::ports::{CaptureError, MicrophoneAccess};

/// Acquires the microphone once and hands out the cached session afterwards.
///
/// The first successful acquisition wins and is kept for the life of the
/// manager. Failures are not cached: the next call asks the platform again.
pub struct CaptureSessionManager<M: MicrophoneAccess> {
    access: M,
    session: OnceCell<M::Stream>,
}

impl<M: MicrophoneAccess> CaptureSessionManager<M> {
    /// Create a manager that has not acquired anything yet
    pub fn new(access: M) -> Self {
        Self {
            access,
            session: OnceCell::new(),
        }
    }

    /// Return the capture session, requesting microphone access on first use
    pub async fn acquire(&self) -> Result<&M::Stream, CaptureError> {
        if let Some(session) = self.session.get() {
            debug!("Reusing cached capture session");
            return Ok(session);
        }

        let session = self
            .session
            .get_or_try_init(|| async {
                debug!("Requesting microphone access");
                self.access.request().await
            })
            .await?;
        info!("Microphone capture session acquired");
        Ok(session)
    }

    /// The cached session, if one was acquired
    pub fn current(&self) -> Option<&M::Stream> {
        self.session.get()
    }

    pub fn is_acquired(&self) -> bool {
        self.session.initialized()
    }
}
