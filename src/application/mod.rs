//! Application layer - Use cases and port interfaces
//!
//! Contains the recording lifecycle, the press-and-hold binding and
//! the trait definitions for external system interactions.

pub mod binder;
pub mod capture_session;
pub mod ports;
pub mod recording;

pub use binder::InteractionBinder;
pub use capture_session::CaptureSessionManager;
pub use recording::RecordingController;
