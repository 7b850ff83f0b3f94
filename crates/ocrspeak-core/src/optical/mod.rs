//! Optical character recognition capability.
//!
//! An [`OpticalProvider`] takes a decoded image and returns, per detected
//! line, a quadrilateral region, the recognized text and a confidence score.

use image::DynamicImage;

mod service;

pub use service::OpticalService;

use crate::{OcrOutput, Result, ServiceHealth};

/// Core trait for OCR pipelines.
#[async_trait::async_trait]
pub trait OpticalProvider: Send + Sync {
    /// Detects and reads every text line in the image.
    ///
    /// Returns an empty [`OcrOutput`] when no text is found. Errors are
    /// reserved for failures of the pipeline itself.
    async fn recognize(&self, image: DynamicImage) -> Result<OcrOutput>;

    /// Returns true when text-line angle classification is active.
    fn uses_angle_classifier(&self) -> bool {
        false
    }

    /// Perform a health check on the OCR pipeline.
    async fn health_check(&self) -> Result<ServiceHealth>;
}
