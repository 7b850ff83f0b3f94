//! [`SpeechProvider`] implementation over [`SpeechClient`].

use ocrspeak_core::{ServiceHealth, SpeechAudio, SpeechProvider};

use crate::SpeechClient;

/// Speech provider backed by the Google Translate speech endpoint.
#[derive(Debug, Clone)]
pub struct GoogleTtsProvider {
    client: SpeechClient,
}

impl GoogleTtsProvider {
    /// Creates a new provider.
    pub fn new(client: SpeechClient) -> Self {
        Self { client }
    }

    /// Returns a reference to the underlying client.
    pub fn client(&self) -> &SpeechClient {
        &self.client
    }
}

#[async_trait::async_trait]
impl SpeechProvider for GoogleTtsProvider {
    async fn synthesize(&self, text: &str, language: &str) -> ocrspeak_core::Result<SpeechAudio> {
        let audio = self.client.synthesize(text, language).await?;
        Ok(SpeechAudio::mp3(audio))
    }

    /// Reports the configured endpoint without contacting it.
    async fn health_check(&self) -> ocrspeak_core::Result<ServiceHealth> {
        Ok(ServiceHealth::healthy()
            .with_metric("endpoint", self.client.endpoint().as_str().into())
            .with_metric("slow", self.client.config().slow.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SpeechConfig;

    #[tokio::test]
    async fn empty_text_is_rejected_before_any_request() -> anyhow::Result<()> {
        let config = SpeechConfig::default().with_endpoint("http://127.0.0.1:9/unreachable");
        let provider = GoogleTtsProvider::new(SpeechClient::new(config)?);

        let err = provider.synthesize("   ", "en").await.unwrap_err();
        assert_eq!(err.kind(), ocrspeak_core::ErrorKind::InvalidInput);

        let health = provider.health_check().await?;
        assert!(health.is_operational());
        Ok(())
    }
}
