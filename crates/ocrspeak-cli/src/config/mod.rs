//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── server: ServerConfig         # Host, port, shutdown
//! ├── middleware: MiddlewareConfig # CORS, upload limit, request timeout
//! ├── service: ServiceConfig       # Font, audio directory, language, speech toggle
//! ├── paddle: PaddleConfig         # Model directory and file names
//! └── speech: SpeechConfig         # Speech endpoint
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.

mod middleware;
mod provider;
mod server;

use std::process;

use anyhow::Context;
use clap::Parser;
pub use middleware::MiddlewareConfig;
use ocrspeak_paddle::PaddleConfig;
use ocrspeak_server::service::ServiceConfig;
use ocrspeak_speech::SpeechConfig;
pub use provider::create_capabilities;
use serde::{Deserialize, Serialize};
pub use server::ServerConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "ocrspeak")]
#[command(about = "PaddleOCR web app with optional text-to-speech")]
#[command(version)]
pub struct Cli {
    /// Print the model layout report and exit.
    ///
    /// Exits with status 0 when every required part is present, 1 otherwise.
    #[arg(long)]
    #[serde(default)]
    pub check_models: bool,

    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// HTTP middleware configuration (CORS, limits, timeouts).
    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    /// Page, font and audio configuration.
    #[clap(flatten)]
    pub service: ServiceConfig,

    /// OCR model configuration.
    #[clap(flatten)]
    pub paddle: PaddleConfig,

    /// Speech endpoint configuration.
    #[clap(flatten)]
    pub speech: SpeechConfig,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    ///
    /// `RUST_LOG` controls the filter; the default is `info`.
    pub fn init_tracing() -> anyhow::Result<()> {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .context("failed to initialize tracing")
    }

    /// Logs build information at debug level.
    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;
        self.service
            .validate()
            .context("invalid service configuration")?;
        Ok(())
    }

    /// Logs configuration at info level.
    pub fn log(&self) {
        Self::log_build_info();
        self.server.log();
        self.middleware.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            model_dir = %self.paddle.model_dir.display(),
            det_model = %self.paddle.det_model,
            rec_model = %self.paddle.rec_model,
            rec_dict = %self.paddle.rec_dict,
            font = %self.service.font_path.display(),
            audio_dir = %self.service.audio_dir.display(),
            language = %self.service.language,
            speech = !self.service.disable_speech,
            "Service configuration"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [
            cfg!(feature = "otel").then_some("otel"),
            cfg!(feature = "dotenv").then_some("dotenv"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_defaults() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from(["ocrspeak"])?;
        assert!(!cli.check_models);
        assert_eq!(cli.service.language, "en");
        assert_eq!(cli.paddle.det_model, "en_PP-OCRv3_det_infer");
        Ok(())
    }

    #[test]
    fn parses_flags() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from([
            "ocrspeak",
            "--check-models",
            "--port",
            "8080",
            "--disable-speech",
            "--request-timeout",
            "120",
        ])?;
        assert!(cli.check_models);
        assert_eq!(cli.server.port, 8080);
        assert!(cli.service.disable_speech);
        assert_eq!(cli.middleware.recovery.request_timeout, 120);
        Ok(())
    }
}
