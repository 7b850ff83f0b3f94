//! Speech service wrapper with observability.

use std::fmt;
use std::sync::Arc;

use jiff::Timestamp;

use super::{SpeechAudio, SpeechProvider};
use crate::{Result, ServiceHealth, TRACING_TARGET_SPEECH};

/// Speech service wrapping any [`SpeechProvider`].
#[derive(Clone)]
pub struct SpeechService {
    provider: Arc<dyn SpeechProvider>,
}

impl fmt::Debug for SpeechService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechService").finish_non_exhaustive()
    }
}

impl SpeechService {
    /// Create a new speech service from a provider.
    pub fn new<P>(provider: P) -> Self
    where
        P: SpeechProvider + 'static,
    {
        Self {
            provider: Arc::new(provider),
        }
    }

    /// Synthesize speech for the given text.
    pub async fn synthesize(&self, text: &str, language: &str) -> Result<SpeechAudio> {
        let started_at = Timestamp::now();

        tracing::debug!(
            target: TRACING_TARGET_SPEECH,
            language,
            chars = text.chars().count(),
            "Processing speech request"
        );

        let result = self.provider.synthesize(text, language).await;
        let elapsed = Timestamp::now().duration_since(started_at);

        match &result {
            Ok(audio) => {
                tracing::info!(
                    target: TRACING_TARGET_SPEECH,
                    bytes = audio.len(),
                    format = audio.format.extension(),
                    elapsed_ms = elapsed.as_millis(),
                    "Speech synthesis successful"
                );
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET_SPEECH,
                    error = %error,
                    elapsed_ms = elapsed.as_millis(),
                    "Speech synthesis failed"
                );
            }
        }

        result
    }

    /// Check the health of the underlying provider.
    pub async fn health_check(&self) -> Result<ServiceHealth> {
        self.provider.health_check().await
    }
}
