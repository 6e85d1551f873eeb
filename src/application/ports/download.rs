//! Download port interface

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::recording::Artifact;

/// Download errors
#[derive(Debug, Clone, Error)]
pub enum DownloadError {
    #[error("Failed to prepare downloads location: {0}")]
    Unavailable(String),

    #[error("Failed to save {filename}: {message}")]
    WriteFailed { filename: String, message: String },
}

/// Visible link added to the downloads surface for one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub filename: String,
    pub label: String,
    pub location: String,
}

impl DownloadLink {
    /// Create a link labelled `Download <filename>`
    pub fn new(filename: impl Into<String>, location: impl Into<String>) -> Self {
        let filename = filename.into();
        Self {
            label: format!("Download {}", filename),
            filename,
            location: location.into(),
        }
    }
}

impl fmt::Display for DownloadLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.location)
    }
}

/// Port for handing a finished artifact to the user
#[async_trait]
pub trait DownloadSink<F: Send + Sync + 'static>: Send {
    /// Offer the artifact as a download and return the link shown for it
    async fn offer(&mut self, artifact: &Artifact<F>) -> Result<DownloadLink, DownloadError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_label() {
        let link = DownloadLink::new("recording-input-x.webm", "/tmp/recording-input-x.webm");
        assert_eq!(link.label, "Download recording-input-x.webm");
        assert_eq!(link.filename, "recording-input-x.webm");
        assert!(link.to_string().contains("/tmp/recording-input-x.webm"));
    }
}
