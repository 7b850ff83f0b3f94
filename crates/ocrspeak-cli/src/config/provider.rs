//! Capability construction and startup presence checks.

use ocrspeak_core::{OpticalService, SpeechService};
use ocrspeak_paddle::{LayoutReport, ModelLayout, PaddleConfig, PaddleProvider};
use ocrspeak_server::service::Capabilities;
use ocrspeak_speech::{GoogleTtsProvider, SpeechClient, SpeechConfig};

use super::Cli;
use crate::TRACING_TARGET_SERVER_STARTUP;

/// Creates every capability the configuration asks for.
///
/// Never fails: a capability that cannot be created is left out and the
/// server answers affected requests with a message.
pub fn create_capabilities(cli: &Cli) -> Capabilities {
    let optical = create_optical_service(&cli.paddle);
    let speech = if cli.service.disable_speech {
        tracing::info!(target: TRACING_TARGET_SERVER_STARTUP, "Speech synthesis disabled");
        None
    } else {
        create_speech_service(&cli.speech)
    };

    Capabilities::new(optical, speech)
}

/// Checks the model layout and loads the engine when it is complete.
pub fn create_optical_service(config: &PaddleConfig) -> Option<OpticalService> {
    let report = ModelLayout::from_config(config).check();
    log_layout_report(&report);

    if !report.is_complete() {
        for status in report.missing_required() {
            tracing::error!(
                target: TRACING_TARGET_SERVER_STARTUP,
                part = %status.part,
                path = %status.path.display(),
                "FATAL ERROR: required model file not found, OCR is unavailable"
            );
        }
        return None;
    }

    match PaddleProvider::load(config) {
        Ok(provider) => {
            tracing::info!(
                target: TRACING_TARGET_SERVER_STARTUP,
                angle_classifier = report.use_cls() && !config.disable_angle_cls,
                "PaddleOCR engine initialized"
            );
            Some(OpticalService::new(provider))
        }
        Err(error) => {
            tracing::error!(
                target: TRACING_TARGET_SERVER_STARTUP,
                error = %error,
                category = error.category(),
                "FATAL ERROR initializing PaddleOCR engine, OCR is unavailable"
            );
            None
        }
    }
}

/// Creates the speech client.
pub fn create_speech_service(config: &SpeechConfig) -> Option<SpeechService> {
    match SpeechClient::new(config.clone()) {
        Ok(client) => Some(SpeechService::new(GoogleTtsProvider::new(client))),
        Err(error) => {
            tracing::warn!(
                target: TRACING_TARGET_SERVER_STARTUP,
                error = %error,
                "Speech client could not be created, speech is disabled"
            );
            None
        }
    }
}

/// Logs the presence of every model part.
fn log_layout_report(report: &LayoutReport) {
    for status in report.parts() {
        if status.present {
            tracing::info!(
                target: TRACING_TARGET_SERVER_STARTUP,
                part = %status.part,
                path = %status.path.display(),
                "Model part found"
            );
        } else if status.part.is_required() {
            tracing::error!(
                target: TRACING_TARGET_SERVER_STARTUP,
                part = %status.part,
                path = %status.path.display(),
                "Model part missing"
            );
        } else {
            tracing::warn!(
                target: TRACING_TARGET_SERVER_STARTUP,
                part = %status.part,
                path = %status.path.display(),
                "Optional model part missing, angle classification disabled"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_models_disable_ocr() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let config = PaddleConfig {
            model_dir: dir.path().to_path_buf(),
            ..PaddleConfig::default()
        };

        assert!(create_optical_service(&config).is_none());
        Ok(())
    }

    #[test]
    fn speech_client_from_defaults() {
        assert!(create_speech_service(&SpeechConfig::default()).is_some());
    }
}
