//! Finished recording artifact

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

use super::format::FALLBACK_MIME_TYPE;
use super::fragment::AudioFragment;

/// Prefix of every artifact filename
pub const FILENAME_PREFIX: &str = "recording-input-";

/// File extension of an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactExtension {
    Ogg,
    Webm,
}

impl ArtifactExtension {
    /// `ogg` if the MIME type mentions ogg, `webm` for anything else
    pub fn for_mime_type(mime_type: &str) -> Self {
        if mime_type.contains("ogg") {
            Self::Ogg
        } else {
            Self::Webm
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ogg => "ogg",
            Self::Webm => "webm",
        }
    }
}

impl fmt::Display for ArtifactExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Build `recording-input-<timestamp>.<ext>`.
///
/// The timestamp is the UTC instant in ISO-8601 with millisecond precision
/// and a `Z` suffix, with every `:` and `.` replaced by `-`.
pub fn artifact_filename(at: DateTime<Utc>, extension: ArtifactExtension) -> String {
    let stamp = at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace(|c: char| c == ':' || c == '.', "-");
    format!("{}{}.{}", FILENAME_PREFIX, stamp, extension)
}

/// The finished audio object assembled from one recording session.
///
/// Parts are kept in arrival order; concatenating them yields the file.
#[derive(Debug, Clone)]
pub struct Artifact<F> {
    parts: Vec<F>,
    mime_type: String,
    filename: String,
}

impl<F: AudioFragment> Artifact<F> {
    /// Assemble an artifact from collected fragments.
    ///
    /// Returns `None` when there is nothing to assemble. A missing or blank
    /// MIME type falls back to [`FALLBACK_MIME_TYPE`].
    pub fn assemble(parts: Vec<F>, mime_type: Option<&str>, at: DateTime<Utc>) -> Option<Self> {
        if parts.is_empty() {
            return None;
        }

        let mime_type = mime_type
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(FALLBACK_MIME_TYPE)
            .to_string();
        let extension = ArtifactExtension::for_mime_type(&mime_type);
        let filename = artifact_filename(at, extension);

        Some(Self {
            parts,
            mime_type,
            filename,
        })
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Get the size in bytes
    pub fn size_bytes(&self) -> usize {
        self.parts.iter().map(AudioFragment::size).sum()
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        let bytes = self.size_bytes();
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }
}

impl<F: AudioFragment + AsRef<[u8]>> Artifact<F> {
    /// Concatenate all parts into one buffer
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.size_bytes());
        for part in &self.parts {
            bytes.extend_from_slice(part.as_ref());
        }
        bytes
    }
}
