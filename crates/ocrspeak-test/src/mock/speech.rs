//! Mock speech provider for testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use ocrspeak_core::{Error, Result, ServiceHealth, SpeechAudio, SpeechProvider};

/// Fake MP3 payload returned by default.
const FAKE_MP3: &[u8] = b"ID3\x04\x00\x00\x00\x00\x00\x00mock";

/// Mock speech provider for testing.
///
/// Counts calls and remembers the last request, so tests can assert whether
/// synthesis was attempted and with what text.
#[derive(Clone, Debug)]
pub struct MockSpeechProvider {
    audio: Bytes,
    failure: Option<String>,
    calls: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<(String, String)>>>,
}

impl Default for MockSpeechProvider {
    fn default() -> Self {
        Self {
            audio: Bytes::from_static(FAKE_MP3),
            failure: None,
            calls: Arc::default(),
            last_request: Arc::default(),
        }
    }
}

impl MockSpeechProvider {
    /// Creates a provider whose every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Number of synthesize calls so far, shared across clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Text and language of the most recent call.
    pub fn last_request(&self) -> Option<(String, String)> {
        self.last_request.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait::async_trait]
impl SpeechProvider for MockSpeechProvider {
    async fn synthesize(&self, text: &str, language: &str) -> Result<SpeechAudio> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some((text.to_string(), language.to_string()));
        }

        if let Some(message) = &self.failure {
            return Err(Error::external_error().with_message(message.clone()));
        }
        if text.trim().is_empty() {
            return Err(Error::invalid_input().with_message("No text to speak"));
        }

        Ok(SpeechAudio::mp3(self.audio.clone()))
    }

    async fn health_check(&self) -> Result<ServiceHealth> {
        Ok(ServiceHealth::healthy())
    }
}
