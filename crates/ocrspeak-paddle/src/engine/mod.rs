//! PaddleOCR inference pipeline on ONNX Runtime.

mod cls;
mod det;
mod preprocess;
mod rec;
mod session;

use std::time::Instant;

use image::DynamicImage;
use ocrspeak_core::{OcrOutput, TextLine};

use self::cls::AngleClassifier;
use self::det::TextDetector;
use self::rec::TextRecognizer;
use self::session::OnnxModel;
use crate::{Error, ModelLayout, ModelPart, PaddleConfig, Result, TRACING_TARGET_ENGINE};

/// Detection, optional angle classification and recognition in one handle.
///
/// Running a model needs exclusive access to its session, so every method
/// that infers takes `&mut self`. Share the engine behind a mutex.
pub struct PaddleEngine {
    detector: TextDetector,
    classifier: Option<AngleClassifier>,
    recognizer: TextRecognizer,
    drop_score: f32,
}

impl PaddleEngine {
    /// Loads all sessions described by the layout.
    ///
    /// Fails when a required part is missing or a model cannot be loaded. A
    /// missing classifier only disables angle classification.
    pub fn new(layout: &ModelLayout, config: &PaddleConfig) -> Result<Self> {
        let report = layout.check();
        if let Some(missing) = report.missing_required().first() {
            return Err(Error::missing(missing.part, missing.path.clone()));
        }

        let detector = TextDetector::new(OnnxModel::load(layout, ModelPart::Detection, config)?);

        let charset = rec::load_charset(layout.path(ModelPart::Dictionary))?;
        let recognizer = TextRecognizer::new(
            OnnxModel::load(layout, ModelPart::Recognition, config)?,
            charset,
        );

        let classifier = if report.use_cls() && !config.disable_angle_cls {
            let model = OnnxModel::load(layout, ModelPart::Classifier, config)?;
            Some(AngleClassifier::new(model, config.cls_thresh))
        } else {
            tracing::warn!(
                target: TRACING_TARGET_ENGINE,
                path = %layout.path(ModelPart::Classifier).display(),
                "Angle classification disabled"
            );
            None
        };

        tracing::info!(
            target: TRACING_TARGET_ENGINE,
            charset = recognizer.charset_len(),
            angle_classifier = classifier.is_some(),
            drop_score = config.drop_score,
            "PaddleOCR engine initialized"
        );

        Ok(Self {
            detector,
            classifier,
            recognizer,
            drop_score: config.drop_score,
        })
    }

    /// Whether crops are checked for upside-down text.
    pub fn uses_angle_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    /// Reads all text lines in the image, in reading order.
    pub fn recognize(&mut self, image: &DynamicImage) -> Result<OcrOutput> {
        if image.width() == 0 || image.height() == 0 {
            return Err(Error::invalid_input("image has no pixels"));
        }

        let started = Instant::now();
        let rgb = image.to_rgb8();

        let regions = self.detector.detect(&rgb)?;
        tracing::debug!(
            target: TRACING_TARGET_ENGINE,
            regions = regions.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Detection finished"
        );

        if regions.is_empty() {
            return Ok(OcrOutput::default());
        }

        let mut crops: Vec<_> = regions
            .iter()
            .map(|region| preprocess::crop_region(&rgb, region))
            .collect();

        if let Some(classifier) = self.classifier.as_mut() {
            let rotated = classifier.correct(&mut crops)?;
            tracing::debug!(
                target: TRACING_TARGET_ENGINE,
                rotated,
                "Angle classification finished"
            );
        }

        let recognized = self.recognizer.recognize(&crops)?;
        let lines: Vec<TextLine> = regions
            .into_iter()
            .zip(recognized)
            .filter(|(_, (text, score))| !text.is_empty() && *score >= self.drop_score)
            .map(|(region, (text, score))| TextLine::new(region, text, score))
            .collect();

        tracing::debug!(
            target: TRACING_TARGET_ENGINE,
            lines = lines.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Recognition finished"
        );

        Ok(OcrOutput::new(lines))
    }
}
