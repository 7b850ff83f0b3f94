//! Mock OCR provider for testing.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::DynamicImage;
use ocrspeak_core::{
    Error, OcrOutput, OpticalProvider, Quad, Result, ServiceHealth, TextLine,
};

/// Mock OCR provider for testing.
///
/// Returns the configured output for every image, or fails every call when
/// built with [`MockOpticalProvider::failing`].
#[derive(Clone, Default, Debug)]
pub struct MockOpticalProvider {
    output: OcrOutput,
    failure: Option<String>,
    angle_classifier: bool,
    calls: Arc<AtomicUsize>,
}

impl MockOpticalProvider {
    /// Creates a provider that returns `output`.
    pub fn new(output: OcrOutput) -> Self {
        Self {
            output,
            ..Self::default()
        }
    }

    /// Creates a provider returning one line per `(text, score)`, stacked
    /// top to bottom.
    pub fn with_lines(lines: &[(&str, f32)]) -> Self {
        let lines = lines
            .iter()
            .enumerate()
            .map(|(i, (text, score))| {
                let top = 4.0 + 12.0 * i as f32;
                TextLine::new(Quad::from_bounds(2.0, top, 30.0, top + 10.0), *text, *score)
            })
            .collect::<Vec<_>>();
        Self::new(OcrOutput::new(lines))
    }

    /// Creates a provider whose every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Reports angle classification as enabled.
    pub fn with_angle_classifier(mut self) -> Self {
        self.angle_classifier = true;
        self
    }

    /// Number of recognize calls so far, shared across clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl OpticalProvider for MockOpticalProvider {
    async fn recognize(&self, _image: DynamicImage) -> Result<OcrOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.failure {
            Some(message) => Err(Error::inference().with_message(message.clone())),
            None => Ok(self.output.clone()),
        }
    }

    fn uses_angle_classifier(&self) -> bool {
        self.angle_classifier
    }

    async fn health_check(&self) -> Result<ServiceHealth> {
        Ok(ServiceHealth::healthy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_configured_lines() {
        let provider = MockOpticalProvider::with_lines(&[("Hello", 0.9), ("World", 0.8)]);
        let output = provider.recognize(DynamicImage::new_rgb8(4, 4)).await.unwrap();

        assert_eq!(output.joined_text(), "Hello\nWorld");
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn failing_provider_errors() {
        let provider = MockOpticalProvider::failing("model exploded");
        let err = provider.recognize(DynamicImage::new_rgb8(4, 4)).await.unwrap_err();
        assert_eq!(err.message(), "model exploded");
    }
}
