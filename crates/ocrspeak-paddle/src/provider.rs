//! [`OpticalProvider`] implementation over a shared [`PaddleEngine`].

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use image::DynamicImage;
use ocrspeak_core::{OcrOutput, OpticalProvider, ServiceHealth};

use crate::{Error, ModelLayout, PaddleConfig, PaddleEngine, TRACING_TARGET_ENGINE};

/// Local PaddleOCR provider.
///
/// Holds the process-wide engine. Inference runs on the blocking thread
/// pool, one request at a time.
#[derive(Clone)]
pub struct PaddleProvider {
    engine: Arc<Mutex<PaddleEngine>>,
    angle_classifier: bool,
}

impl fmt::Debug for PaddleProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaddleProvider")
            .field("angle_classifier", &self.angle_classifier)
            .finish_non_exhaustive()
    }
}

impl PaddleProvider {
    /// Wraps an already loaded engine.
    pub fn new(engine: PaddleEngine) -> Self {
        Self {
            angle_classifier: engine.uses_angle_classifier(),
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    /// Resolves the layout from `config` and loads the engine.
    pub fn load(config: &PaddleConfig) -> crate::Result<Self> {
        let layout = ModelLayout::from_config(config);
        PaddleEngine::new(&layout, config).map(Self::new)
    }
}

#[async_trait::async_trait]
impl OpticalProvider for PaddleProvider {
    async fn recognize(&self, image: DynamicImage) -> ocrspeak_core::Result<OcrOutput> {
        let engine = Arc::clone(&self.engine);

        let result = tokio::task::spawn_blocking(move || {
            let mut engine = engine
                .lock()
                .map_err(|_| Error::inference("engine", "engine lock poisoned by an earlier panic"))?;
            engine.recognize(&image)
        })
        .await
        .map_err(|e| {
            ocrspeak_core::Error::internal_error()
                .with_message("OCR task did not complete")
                .with_source(e)
        })?;

        result.map_err(Into::into)
    }

    fn uses_angle_classifier(&self) -> bool {
        self.angle_classifier
    }

    async fn health_check(&self) -> ocrspeak_core::Result<ServiceHealth> {
        let started = Instant::now();
        let poisoned = self.engine.is_poisoned();

        let health = if poisoned {
            tracing::warn!(target: TRACING_TARGET_ENGINE, "Engine lock is poisoned");
            ServiceHealth::unhealthy("engine lock poisoned")
        } else {
            ServiceHealth::healthy()
        };

        Ok(health
            .with_response_time(started.elapsed())
            .with_metric("angle_classifier", self.angle_classifier.into()))
    }
}
