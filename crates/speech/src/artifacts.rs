//! Filesystem audio artifact store

use async_trait::async_trait;
use std::path::PathBuf;
use uuid::Uuid;

use tontouma_core::{AudioArtifact, AudioFormat, AudioStore, StoreError};

/// Writes audio artifacts to a directory, one file per artifact.
///
/// Artifact paths are file names relative to the directory root, so the
/// transport layer can serve them from a static route.
pub struct FsAudioStore {
    dir: PathBuf,
}

impl FsAudioStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|e| StoreError::Backend(format!("cannot create {}: {}", dir.display(), e)))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

#[async_trait]
impl AudioStore for FsAudioStore {
    async fn store(
        &self,
        bytes: Vec<u8>,
        format: AudioFormat,
    ) -> Result<AudioArtifact, StoreError> {
        let file_name = format!("{}.{}", Uuid::new_v4(), format.extension());
        let path = self.dir.join(&file_name);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| StoreError::Backend(format!("cannot write {}: {}", path.display(), e)))?;

        tracing::debug!(file = %file_name, "Stored audio artifact");
        Ok(AudioArtifact::new(file_name, format.mime()))
    }
}
