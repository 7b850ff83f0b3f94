//! Application state and dependency injection.

use ocrspeak_core::{OpticalService, SpeechService};
use ocrspeak_paddle::{DrawOptions, FontResource, PaddleConfig};

use crate::service::{AudioStore, IndexPage, OcrPipeline, PageDetails, Result, ServiceConfig};

/// Tracing target for state initialization.
const TRACING_TARGET: &str = "ocrspeak_server::service::state";

/// Capabilities created by the binary before the state is built.
///
/// Either may be missing: OCR when the models failed to load, speech when
/// it is turned off.
#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    /// Text detection and recognition.
    pub optical: Option<OpticalService>,
    /// Text-to-speech.
    pub speech: Option<SpeechService>,
}

impl Capabilities {
    /// Creates capabilities from both services.
    pub fn new(optical: Option<OpticalService>, speech: Option<SpeechService>) -> Self {
        Self { optical, speech }
    }
}

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    pipeline: OcrPipeline,
    index_page: IndexPage,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Creates the audio directory and renders the upload page. A missing
    /// font is only logged, since it is checked again on every request.
    pub async fn from_config(
        config: &ServiceConfig,
        models: &PaddleConfig,
        capabilities: Capabilities,
    ) -> Result<Self> {
        config.validate()?;
        let language = config.default_language()?;
        let audio = AudioStore::open(&config.audio_dir).await?;

        let font = FontResource::new(&config.font_path);
        if !font.exists() {
            tracing::warn!(
                target: TRACING_TARGET,
                font = %font.path().display(),
                "Font file not found, results will be returned as raw text"
            );
        }

        let speech = if config.disable_speech {
            None
        } else {
            capabilities.speech
        };

        let font_path = config.font_path.to_string_lossy();
        let details = PageDetails {
            speech: speech.is_some(),
            ..PageDetails::from_models(models, language, &font_path)
        };
        let index_page = IndexPage::render(&details);

        let pipeline = OcrPipeline::new(
            capabilities.optical,
            speech,
            font,
            audio,
            language,
            DrawOptions::with_drop_score(config.draw_drop_score),
        );

        tracing::info!(
            target: TRACING_TARGET,
            ocr = pipeline.optical().is_some(),
            speech = pipeline.speech().is_some(),
            language = language.code,
            "Service state initialized"
        );

        Ok(Self {
            pipeline,
            index_page,
        })
    }

    /// The request pipeline.
    pub fn pipeline(&self) -> &OcrPipeline {
        &self.pipeline
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(pipeline: OcrPipeline);
impl_di!(index_page: IndexPage);
