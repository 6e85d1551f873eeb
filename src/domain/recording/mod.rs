//! Recording domain module

mod artifact;
mod format;
mod fragment;
mod session;

pub use artifact::{artifact_filename, Artifact, ArtifactExtension, FILENAME_PREFIX};
pub use format::{EncodingFormat, FALLBACK_MIME_TYPE};
pub use fragment::AudioFragment;
pub use session::{RecorderState, RecordingId, RecordingSession};
