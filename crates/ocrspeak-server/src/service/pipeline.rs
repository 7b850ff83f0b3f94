//! The request handler: image in, annotated image, text and speech out.
//!
//! [`OcrPipeline::process`] never fails. Every problem is turned into a
//! message for the user, mirroring what the page shows in the text box.

use std::io::Cursor;

use bytes::Bytes;
use image::{DynamicImage, ImageFormat};
use ocrspeak_core::{Language, OcrOutput, OpticalService, SpeechService};
use ocrspeak_paddle::{DrawOptions, FontResource, draw_ocr};

use crate::service::{AudioFile, AudioStore};
use crate::{Error, Result};

/// Tracing target for the request pipeline.
const TRACING_TARGET: &str = "ocrspeak_server::service::pipeline";

/// Shown when the engine failed to load at startup.
pub const ENGINE_UNAVAILABLE: &str =
    "PaddleOCR engine is not available. Please check the application logs for errors.";

/// Shown when the form carried no image.
pub const NO_IMAGE: &str = "No image provided. Please upload an image.";

/// Shown when the image contains no readable text.
pub const NO_TEXT: &str = "No text detected.";

/// Shown when speech was requested but is turned off.
pub const SPEECH_DISABLED: &str = "Speech synthesis is disabled on this server.";

/// What the page displays after one upload.
#[derive(Debug, Clone, Default)]
pub struct OcrOutcome {
    /// PNG of the annotated image, or of the upload when nothing was drawn.
    pub image: Option<Bytes>,
    /// Extracted text or a message for the user.
    pub text: String,
    /// Whether `image` carries the drawn regions and text panel.
    pub annotated: bool,
    /// Spoken text, when requested and produced.
    pub audio: Option<AudioFile>,
    /// Why speech is missing although it was requested.
    pub speech_error: Option<String>,
}

impl OcrOutcome {
    /// An outcome without an image.
    fn message(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// An outcome showing an error next to the image, if there is one.
    fn failure(original: Option<&DynamicImage>, error: &Error) -> Self {
        tracing::error!(
            target: TRACING_TARGET,
            error = %error,
            kind = %error.kind(),
            "Error during OCR processing"
        );

        Self {
            image: original.and_then(|image| encode_png(image).ok()),
            text: format!("An error occurred during OCR: {}", error.message()),
            ..Self::default()
        }
    }

    /// An outcome showing the unmodified upload next to `text`.
    fn original(original: &DynamicImage, text: impl Into<String>) -> Self {
        match encode_png(original) {
            Ok(png) => Self {
                image: Some(png),
                text: text.into(),
                ..Self::default()
            },
            Err(error) => Self::failure(None, &error),
        }
    }
}

/// Runs detection, drawing and speech for uploaded images.
#[derive(Debug, Clone)]
pub struct OcrPipeline {
    optical: Option<OpticalService>,
    speech: Option<SpeechService>,
    font: FontResource,
    audio: AudioStore,
    language: Language,
    draw: DrawOptions,
}

impl OcrPipeline {
    /// Creates a pipeline.
    ///
    /// `optical` is `None` when the models failed to load; `speech` is
    /// `None` when speech is turned off.
    pub fn new(
        optical: Option<OpticalService>,
        speech: Option<SpeechService>,
        font: FontResource,
        audio: AudioStore,
        language: Language,
        draw: DrawOptions,
    ) -> Self {
        Self {
            optical,
            speech,
            font,
            audio,
            language,
            draw,
        }
    }

    /// The OCR capability, if loaded.
    pub fn optical(&self) -> Option<&OpticalService> {
        self.optical.as_ref()
    }

    /// The speech capability, if enabled.
    pub fn speech(&self) -> Option<&SpeechService> {
        self.speech.as_ref()
    }

    /// Font used for drawing.
    pub fn font(&self) -> &FontResource {
        &self.font
    }

    /// Where speech files are written.
    pub fn audio_store(&self) -> &AudioStore {
        &self.audio
    }

    /// Language selected when the request names none or an unknown one.
    pub fn default_language(&self) -> Language {
        self.language
    }

    /// Processes one upload.
    ///
    /// `language` is a display name or code from the dropdown. `speak`
    /// requests audio for the extracted text.
    pub async fn process(
        &self,
        image: Option<Bytes>,
        language: Option<&str>,
        speak: bool,
    ) -> OcrOutcome {
        let Some(optical) = self.optical.as_ref() else {
            tracing::warn!(target: TRACING_TARGET, "OCR requested but the engine is not loaded");
            return OcrOutcome::message(ENGINE_UNAVAILABLE);
        };

        let Some(bytes) = image.filter(|bytes| !bytes.is_empty()) else {
            return OcrOutcome::message(NO_IMAGE);
        };

        let original = match image::load_from_memory(&bytes) {
            Ok(image) => image,
            Err(e) => return OcrOutcome::failure(None, &Error::from(e)),
        };

        let language = self.resolve_language(language);
        tracing::debug!(
            target: TRACING_TARGET,
            language = language.code,
            width = original.width(),
            height = original.height(),
            speak,
            "Processing upload"
        );

        let output = match optical.recognize(original.clone()).await {
            Ok(output) => output,
            Err(e) => return OcrOutcome::failure(Some(&original), &Error::from(e)),
        };

        if output.is_empty() {
            tracing::info!(target: TRACING_TARGET, "No text detected");
            return OcrOutcome::original(&original, NO_TEXT);
        }

        let text = output.joined_text();
        let mut outcome = if self.font.exists() {
            match self.annotate(&original, output).await {
                Ok(png) => OcrOutcome {
                    image: Some(png),
                    text: text.clone(),
                    annotated: true,
                    ..OcrOutcome::default()
                },
                Err(e) => return OcrOutcome::failure(Some(&original), &e),
            }
        } else {
            tracing::warn!(
                target: TRACING_TARGET,
                font = %self.font.path().display(),
                "Font file not found, returning text without drawing"
            );
            match encode_png(&original) {
                Ok(png) => OcrOutcome {
                    image: Some(png),
                    text: format!("Font file missing. Extracted text (raw):\n{text}"),
                    ..OcrOutcome::default()
                },
                Err(e) => return OcrOutcome::failure(Some(&original), &e),
            }
        };

        if speak {
            self.speak(&mut outcome, &text, language).await;
        }

        outcome
    }

    /// Maps a dropdown value to a language, falling back to the default.
    fn resolve_language(&self, requested: Option<&str>) -> Language {
        let Some(requested) = requested.map(str::trim).filter(|r| !r.is_empty()) else {
            return self.language;
        };

        Language::find(requested).unwrap_or_else(|| {
            tracing::warn!(
                target: TRACING_TARGET,
                requested,
                fallback = self.language.code,
                "Unknown language, using the loaded one"
            );
            self.language
        })
    }

    /// Draws the regions and text panels and encodes the result.
    async fn annotate(&self, original: &DynamicImage, output: OcrOutput) -> Result<Bytes> {
        let image = original.clone();
        let font = self.font.clone();
        let options = self.draw.clone();

        tokio::task::spawn_blocking(move || {
            let font = font.load()?;
            let (boxes, texts, scores) = output.into_parts();
            let drawn = draw_ocr(&image, &boxes, &texts, &scores, &font, &options)?;
            encode_png(&DynamicImage::ImageRgb8(drawn))
        })
        .await
        .map_err(|e| Error::internal("draw", "drawing task did not complete").with_source(e))?
    }

    /// Adds audio for `text` to `outcome`, or the reason there is none.
    async fn speak(&self, outcome: &mut OcrOutcome, text: &str, language: Language) {
        if text.trim().is_empty() {
            return;
        }

        let Some(speech) = self.speech.as_ref() else {
            outcome.speech_error = Some(SPEECH_DISABLED.to_owned());
            return;
        };

        let reason = match speech.synthesize(text, language.code).await {
            Ok(audio) => match self.audio.save(&audio).await {
                Ok(file) => {
                    outcome.audio = Some(file);
                    return;
                }
                Err(e) => e.message().to_owned(),
            },
            Err(e) => e.message().to_owned(),
        };

        tracing::error!(
            target: TRACING_TARGET,
            reason = %reason,
            "Speech synthesis failed"
        );
        outcome.speech_error = Some(format!("Speech synthesis failed: {reason}"));
    }
}

/// Encodes an image as PNG.
fn encode_png(image: &DynamicImage) -> Result<Bytes> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(Bytes::from(buffer.into_inner()))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use ocrspeak_core::language::ENGLISH;
    use ocrspeak_test::{MockOpticalProvider, MockSpeechProvider, font_path, sample_png};
    use tempfile::TempDir;

    use super::*;

    struct Fixture {
        pipeline: OcrPipeline,
        speech: MockSpeechProvider,
        _audio_dir: TempDir,
    }

    async fn fixture(
        optical: Option<MockOpticalProvider>,
        speech: MockSpeechProvider,
        font: PathBuf,
    ) -> anyhow::Result<Fixture> {
        let audio_dir = tempfile::tempdir()?;
        let pipeline = OcrPipeline::new(
            optical.map(OpticalService::new),
            Some(SpeechService::new(speech.clone())),
            FontResource::new(font),
            AudioStore::open(audio_dir.path()).await?,
            ENGLISH,
            DrawOptions::default(),
        );

        Ok(Fixture {
            pipeline,
            speech,
            _audio_dir: audio_dir,
        })
    }

    fn upload() -> Option<Bytes> {
        Some(Bytes::from(sample_png(40, 30)))
    }

    fn dimensions(png: &Bytes) -> anyhow::Result<(u32, u32)> {
        let image = image::load_from_memory(png)?;
        Ok((image.width(), image.height()))
    }

    #[tokio::test]
    async fn missing_engine_is_reported_first() -> anyhow::Result<()> {
        let fx = fixture(None, MockSpeechProvider::default(), "latin.ttf".into()).await?;

        let outcome = fx.pipeline.process(None, None, true).await;
        assert_eq!(outcome.text, ENGINE_UNAVAILABLE);
        assert!(outcome.image.is_none());
        assert_eq!(fx.speech.calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn missing_or_empty_upload() -> anyhow::Result<()> {
        let optical = MockOpticalProvider::with_lines(&[("Hello", 0.9)]);
        let fx = fixture(Some(optical), MockSpeechProvider::default(), "latin.ttf".into()).await?;

        let outcome = fx.pipeline.process(None, None, false).await;
        assert_eq!(outcome.text, NO_IMAGE);

        let outcome = fx.pipeline.process(Some(Bytes::new()), None, false).await;
        assert_eq!(outcome.text, NO_IMAGE);
        assert!(outcome.image.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn no_detections_return_original_image() -> anyhow::Result<()> {
        let fx = fixture(
            Some(MockOpticalProvider::default()),
            MockSpeechProvider::default(),
            "latin.ttf".into(),
        )
        .await?;

        let outcome = fx.pipeline.process(upload(), None, true).await;
        assert_eq!(outcome.text, NO_TEXT);
        assert!(!outcome.annotated);
        assert_eq!(outcome.image.as_ref().map(dimensions).transpose()?, Some((40, 30)));
        assert!(outcome.audio.is_none());
        assert_eq!(fx.speech.calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn missing_font_returns_raw_text_and_speaks() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let optical = MockOpticalProvider::with_lines(&[("Hello", 0.98), ("World", 0.91)]);
        let fx = fixture(
            Some(optical),
            MockSpeechProvider::default(),
            dir.path().join("absent.ttf"),
        )
        .await?;

        let outcome = fx
            .pipeline
            .process(upload(), Some("English (Loaded)"), true)
            .await;

        assert_eq!(outcome.text, "Font file missing. Extracted text (raw):\nHello\nWorld");
        assert!(!outcome.annotated);
        assert_eq!(outcome.image.as_ref().map(dimensions).transpose()?, Some((40, 30)));

        let audio = outcome.audio.expect("speech should be produced");
        assert!(fx.pipeline.audio_store().dir().join(&audio.file_name).exists());
        assert_eq!(
            fx.speech.last_request(),
            Some(("Hello\nWorld".to_owned(), "en".to_owned()))
        );
        Ok(())
    }

    #[tokio::test]
    async fn annotates_and_speaks_with_font() -> anyhow::Result<()> {
        let optical = MockOpticalProvider::with_lines(&[("Hello", 0.98), ("World", 0.3)]);
        let fx = fixture(Some(optical), MockSpeechProvider::default(), font_path()).await?;

        let outcome = fx.pipeline.process(upload(), Some("en"), true).await;
        assert!(outcome.annotated);
        assert_eq!(outcome.text, "Hello\nWorld");
        assert!(outcome.speech_error.is_none());

        let png = outcome.image.as_ref().expect("annotated image");
        assert_eq!(dimensions(png)?, (1200, 450));

        // "World" scores below the drop threshold and is not outlined.
        let drawn = image::load_from_memory(png)?.to_rgb8();
        let kept = drawn.get_pixel(45, 135);
        assert!(kept[0] > 200 && kept[1] < 80);
        let dropped = drawn.get_pixel(45, 315);
        assert!(dropped[1] > 200);

        assert!(outcome.audio.is_some());
        assert_eq!(
            fx.speech.last_request(),
            Some(("Hello\nWorld".to_owned(), "en".to_owned()))
        );
        Ok(())
    }

    #[tokio::test]
    async fn whitespace_text_is_never_spoken() -> anyhow::Result<()> {
        let optical = MockOpticalProvider::with_lines(&[("   ", 0.9)]);
        let fx = fixture(Some(optical), MockSpeechProvider::default(), "absent.ttf".into()).await?;

        let outcome = fx.pipeline.process(upload(), None, true).await;
        assert!(outcome.audio.is_none());
        assert!(outcome.speech_error.is_none());
        assert_eq!(fx.speech.calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn speech_is_skipped_unless_requested() -> anyhow::Result<()> {
        let optical = MockOpticalProvider::with_lines(&[("Hello", 0.9)]);
        let fx = fixture(Some(optical), MockSpeechProvider::default(), "absent.ttf".into()).await?;

        let outcome = fx.pipeline.process(upload(), None, false).await;
        assert!(outcome.audio.is_none());
        assert_eq!(fx.speech.calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn speech_failure_keeps_text() -> anyhow::Result<()> {
        let optical = MockOpticalProvider::with_lines(&[("Hello", 0.9)]);
        let fx = fixture(
            Some(optical),
            MockSpeechProvider::failing("429 from TTS API"),
            "absent.ttf".into(),
        )
        .await?;

        let outcome = fx.pipeline.process(upload(), None, true).await;
        assert!(outcome.text.ends_with("Hello"));
        assert!(outcome.image.is_some());
        assert!(outcome.audio.is_none());
        assert_eq!(
            outcome.speech_error.as_deref(),
            Some("Speech synthesis failed: 429 from TTS API")
        );
        Ok(())
    }

    #[tokio::test]
    async fn undecodable_upload_reports_error_without_image() -> anyhow::Result<()> {
        let optical = MockOpticalProvider::with_lines(&[("Hello", 0.9)]);
        let fx = fixture(Some(optical), MockSpeechProvider::default(), "latin.ttf".into()).await?;

        let outcome = fx
            .pipeline
            .process(Some(Bytes::from_static(b"not an image")), None, true)
            .await;

        assert!(outcome.text.starts_with("An error occurred during OCR: "));
        assert!(outcome.image.is_none());
        assert_eq!(fx.speech.calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn ocr_failure_returns_original_image() -> anyhow::Result<()> {
        let optical = MockOpticalProvider::failing("detection inference failed");
        let fx = fixture(Some(optical), MockSpeechProvider::default(), "latin.ttf".into()).await?;

        let outcome = fx.pipeline.process(upload(), None, true).await;
        assert!(outcome.text.starts_with("An error occurred during OCR: "));
        assert!(outcome.text.contains("detection inference failed"));
        assert!(!outcome.annotated);
        assert_eq!(outcome.image.as_ref().map(dimensions).transpose()?, Some((40, 30)));
        assert_eq!(fx.speech.calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn unreadable_font_is_a_drawing_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let font = dir.path().join("broken.ttf");
        std::fs::write(&font, b"not a font")?;

        let optical = MockOpticalProvider::with_lines(&[("Hello", 0.9)]);
        let fx = fixture(Some(optical), MockSpeechProvider::default(), font).await?;

        let outcome = fx.pipeline.process(upload(), None, true).await;
        assert!(outcome.text.starts_with("An error occurred during OCR: "));
        assert!(!outcome.annotated);
        assert_eq!(outcome.image.as_ref().map(dimensions).transpose()?, Some((40, 30)));
        assert_eq!(fx.speech.calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_language_falls_back() -> anyhow::Result<()> {
        let optical = MockOpticalProvider::with_lines(&[("Hello", 0.9)]);
        let fx = fixture(Some(optical), MockSpeechProvider::default(), "absent.ttf".into()).await?;

        fx.pipeline.process(upload(), Some("Klingon"), true).await;
        assert_eq!(
            fx.speech.last_request(),
            Some(("Hello".to_owned(), "en".to_owned()))
        );
        Ok(())
    }
}
