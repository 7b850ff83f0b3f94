//! Middleware configuration for the HTTP server.
//!
//! ```bash
//! ocrspeak --cors-origins "https://example.com" --request-timeout 120
//! ```

use clap::Args;
use ocrspeak_server::middleware::{BodyLimitConfig, CorsConfig, RecoveryConfig};
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Middleware configuration combining CORS, upload limits and recovery settings.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// CORS (Cross-Origin Resource Sharing) configuration.
    #[clap(flatten)]
    pub cors: CorsConfig,

    /// Request body limits.
    #[clap(flatten)]
    pub body_limit: BodyLimitConfig,

    /// Recovery middleware configuration.
    ///
    /// Controls request timeout and panic recovery behavior.
    #[clap(flatten)]
    pub recovery: RecoveryConfig,
}

impl MiddlewareConfig {
    /// Logs middleware configuration at info level.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            origins = ?self.cors.allowed_origins,
            credentials = self.cors.allow_credentials,
            "CORS configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            max_upload_size = self.body_limit.max_upload_size,
            request_timeout_secs = self.recovery.request_timeout,
            "Request limits"
        );
    }
}
