//! Downloads directory adapter

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info};

use crate::application::ports::{DownloadError, DownloadLink, DownloadSink};
use crate::domain::recording::{Artifact, AudioFragment};

/// Saves artifacts into a directory and keeps the list of links shown so far
pub struct DirectoryDownloads {
    dir: PathBuf,
    links: Vec<DownloadLink>,
}

impl DirectoryDownloads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            links: Vec::new(),
        }
    }

    /// Links offered so far, oldest first
    pub fn links(&self) -> &[DownloadLink] {
        &self.links
    }

    /// Write `<dir>/<filename>.part`, then rename it into place
    async fn write(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, DownloadError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| DownloadError::Unavailable(format!("{}: {}", self.dir.display(), e)))?;

        let target = self.dir.join(filename);
        let partial = self.dir.join(format!("{}.part", filename));
        let write_failed = |e: std::io::Error| DownloadError::WriteFailed {
            filename: filename.to_string(),
            message: e.to_string(),
        };

        fs::write(&partial, bytes).await.map_err(write_failed)?;
        if let Err(e) = fs::rename(&partial, &target).await {
            let _ = fs::remove_file(&partial).await;
            return Err(write_failed(e));
        }

        Ok(target)
    }
}

#[async_trait]
impl<F> DownloadSink<F> for DirectoryDownloads
where
    F: AudioFragment + AsRef<[u8]> + Send + Sync + 'static,
{
    async fn offer(&mut self, artifact: &Artifact<F>) -> Result<DownloadLink, DownloadError> {
        let bytes = artifact.to_bytes();
        debug!("Writing {} byte(s) to {}", bytes.len(), self.dir.display());

        let path = self.write(artifact.filename(), &bytes).await?;
        let link = DownloadLink::new(artifact.filename(), path.to_string_lossy());
        info!("Saved {}", path.display());

        self.links.push(link.clone());
        Ok(link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn artifact(parts: Vec<Vec<u8>>) -> Artifact<Vec<u8>> {
        let at = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        Artifact::assemble(parts, Some("audio/ogg"), at).unwrap()
    }

    #[tokio::test]
    async fn writes_concatenated_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let mut downloads = DirectoryDownloads::new(dir.path());

        let link = downloads
            .offer(&artifact(vec![b"ab".to_vec(), b"cd".to_vec()]))
            .await
            .unwrap();

        assert_eq!(link.filename, "recording-input-2024-05-06T07-08-09-000Z.ogg");
        assert_eq!(link.label, "Download recording-input-2024-05-06T07-08-09-000Z.ogg");
        let saved = std::fs::read(dir.path().join(&link.filename)).unwrap();
        assert_eq!(saved, b"abcd");
        assert!(!dir.path().join(format!("{}.part", link.filename)).exists());
        assert_eq!(downloads.links(), &[link]);
    }

    #[tokio::test]
    async fn creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let mut downloads = DirectoryDownloads::new(&nested);

        downloads.offer(&artifact(vec![vec![1]])).await.unwrap();
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn unusable_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();
        let mut downloads = DirectoryDownloads::new(&file);

        let err = downloads.offer(&artifact(vec![vec![1]])).await.unwrap_err();
        assert!(matches!(err, DownloadError::Unavailable(_)));
        assert!(downloads.links().is_empty());
    }
}
