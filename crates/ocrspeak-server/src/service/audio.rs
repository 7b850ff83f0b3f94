//! Storage for generated speech.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ocrspeak_core::SpeechAudio;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Tracing target for audio storage.
const TRACING_TARGET: &str = "ocrspeak_server::service::audio";

/// URL prefix under which the audio directory is served.
pub const AUDIO_ROUTE: &str = "/audio";

/// A speech file written for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFile {
    /// File name inside the audio directory.
    pub file_name: String,
    /// URL the page plays the file from.
    pub url: String,
    /// MIME type of the file.
    pub mime_type: String,
}

/// Writes one audio file per request into a directory.
#[derive(Debug, Clone)]
pub struct AudioStore {
    dir: Arc<PathBuf>,
}

impl AudioStore {
    /// Creates the store, creating `dir` when it does not exist.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            Error::file_system(format!("cannot create audio directory '{}'", dir.display()))
                .with_source(e)
        })?;

        tracing::debug!(
            target: TRACING_TARGET,
            dir = %dir.display(),
            "Audio directory ready"
        );

        Ok(Self { dir: Arc::new(dir) })
    }

    /// Directory the files are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `audio` under a fresh time-ordered name.
    pub async fn save(&self, audio: &SpeechAudio) -> Result<AudioFile> {
        let file_name = format!("{}.{}", Uuid::now_v7(), audio.format.extension());
        let path = self.dir.join(&file_name);

        tokio::fs::write(&path, &audio.data).await.map_err(|e| {
            Error::file_system(format!("cannot write '{}'", path.display())).with_source(e)
        })?;

        tracing::info!(
            target: TRACING_TARGET,
            file = %file_name,
            bytes = audio.len(),
            "Speech audio saved"
        );

        Ok(AudioFile {
            url: format!("{AUDIO_ROUTE}/{file_name}"),
            mime_type: audio.format.mime_type().to_owned(),
            file_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn saves_under_unique_names() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let store = AudioStore::open(root.path().join("nested")).await?;
        let audio = SpeechAudio::mp3(&b"ID3 audio"[..]);

        let first = store.save(&audio).await?;
        let second = store.save(&audio).await?;

        assert_ne!(first.file_name, second.file_name);
        assert!(first.file_name.ends_with(".mp3"));
        assert_eq!(first.url, format!("/audio/{}", first.file_name));
        assert_eq!(first.mime_type, "audio/mpeg");
        assert_eq!(std::fs::read(store.dir().join(&first.file_name))?, b"ID3 audio");
        Ok(())
    }
}
