//! hold-record - press-and-hold microphone recorder
//!
//! Hold the trigger to record from the microphone; on release the take is
//! assembled into a single audio file and saved as a download.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Recording session, artifact naming, encoding formats, UI state
//! - **Application**: Capture session manager, recording controller,
//!   interaction binder and the port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal, FFmpeg, downloads directory, config)
//! - **CLI**: Command-line interface, terminal widget, control socket and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
