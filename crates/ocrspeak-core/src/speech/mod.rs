//! Text-to-speech capability.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

mod service;

pub use service::SpeechService;

use crate::{Result, ServiceHealth};

/// Container format of synthesized audio.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioFormat {
    /// MPEG-1 Audio Layer III.
    #[default]
    Mp3,
    /// Waveform audio.
    Wav,
}

impl AudioFormat {
    /// File extension without the leading dot.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
        }
    }

    /// MIME type for HTTP responses.
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Wav => "audio/wav",
        }
    }
}

/// Synthesized speech audio.
#[derive(Debug, Clone)]
pub struct SpeechAudio {
    /// Encoded audio bytes.
    pub data: Bytes,
    /// Encoding of `data`.
    pub format: AudioFormat,
}

impl SpeechAudio {
    /// Creates a new MP3 audio payload.
    pub fn mp3(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            format: AudioFormat::Mp3,
        }
    }

    /// Returns the payload size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true when no audio was produced.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Core trait for speech synthesis backends.
#[async_trait::async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Converts text in the given language into audio.
    async fn synthesize(&self, text: &str, language: &str) -> Result<SpeechAudio>;

    /// Perform a health check on the speech backend.
    async fn health_check(&self) -> Result<ServiceHealth>;
}
