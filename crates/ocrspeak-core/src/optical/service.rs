//! OCR service wrapper with observability.

use std::fmt;
use std::sync::Arc;

use image::DynamicImage;
use jiff::Timestamp;

use super::OpticalProvider;
use crate::{OcrOutput, Result, ServiceHealth, TRACING_TARGET_OCR};

/// OCR service wrapping any [`OpticalProvider`].
///
/// The provider is stored behind an `Arc`, making this wrapper cheap to clone
/// into request handlers.
#[derive(Clone)]
pub struct OpticalService {
    provider: Arc<dyn OpticalProvider>,
}

impl fmt::Debug for OpticalService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpticalService")
            .field("uses_angle_classifier", &self.provider.uses_angle_classifier())
            .finish_non_exhaustive()
    }
}

impl OpticalService {
    /// Create a new OCR service from a provider.
    pub fn new<P>(provider: P) -> Self
    where
        P: OpticalProvider + 'static,
    {
        Self {
            provider: Arc::new(provider),
        }
    }

    /// Create a new OCR service from a shared provider.
    pub fn from_arc(provider: Arc<dyn OpticalProvider>) -> Self {
        Self { provider }
    }

    /// Returns true when text-line angle classification is active.
    pub fn uses_angle_classifier(&self) -> bool {
        self.provider.uses_angle_classifier()
    }

    /// Run OCR on an image.
    pub async fn recognize(&self, image: DynamicImage) -> Result<OcrOutput> {
        let started_at = Timestamp::now();
        let (width, height) = (image.width(), image.height());

        tracing::debug!(
            target: TRACING_TARGET_OCR,
            width,
            height,
            "Processing OCR request"
        );

        let result = self.provider.recognize(image).await;
        let elapsed = Timestamp::now().duration_since(started_at);

        match &result {
            Ok(output) => {
                tracing::info!(
                    target: TRACING_TARGET_OCR,
                    lines = output.len(),
                    elapsed_ms = elapsed.as_millis(),
                    "OCR processing successful"
                );
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET_OCR,
                    error = %error,
                    elapsed_ms = elapsed.as_millis(),
                    "OCR processing failed"
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, ErrorKind, Quad, TextLine};

    struct FixedProvider(Option<OcrOutput>);

    #[async_trait::async_trait]
    impl OpticalProvider for FixedProvider {
        async fn recognize(&self, _image: DynamicImage) -> Result<OcrOutput> {
            self.0
                .clone()
                .ok_or_else(|| Error::inference().with_message("det session failed"))
        }

        fn uses_angle_classifier(&self) -> bool {
            true
        }

        async fn health_check(&self) -> Result<ServiceHealth> {
            Ok(ServiceHealth::healthy())
        }
    }

    #[tokio::test]
    async fn forwards_provider_output() -> Result<()> {
        let line = TextLine::new(Quad::from_bounds(0.0, 0.0, 8.0, 4.0), "Hi", 0.9);
        let service = OpticalService::new(FixedProvider(Some(OcrOutput::new(vec![line]))));

        let output = service.recognize(DynamicImage::new_rgb8(8, 8)).await?;
        assert_eq!(output.joined_text(), "Hi");
        assert!(service.uses_angle_classifier());
        assert!(service.health_check().await?.is_operational());
        Ok(())
    }

    #[tokio::test]
    async fn forwards_provider_errors() {
        let service = OpticalService::from_arc(Arc::new(FixedProvider(None)));

        let err = service
            .recognize(DynamicImage::new_rgb8(8, 8))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Inference);
        assert_eq!(err.message(), "det session failed");
    }
}
