//! Security middleware for HTTP request protection.
//!
//! Applies CORS rules, security headers, response compression and limits on
//! the size of uploaded images.

use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::http::header::{self, HeaderValue};
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;

/// Tracing target for security middleware.
const TRACING_TARGET: &str = "ocrspeak_server::middleware::security";

/// Origins allowed when none are configured.
const LOCALHOST_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://127.0.0.1:3000",
    "http://localhost:7860",
    "http://127.0.0.1:7860",
];

/// Extension trait for `axum::`[`Router`] to apply security middleware.
pub trait RouterSecurityExt<S> {
    /// Layers security middlewares with the provided configurations.
    fn with_security(
        self,
        cors: &CorsConfig,
        limits: &BodyLimitConfig,
        headers: &SecurityHeadersConfig,
    ) -> Self;

    /// Layers security middlewares with default configurations.
    fn with_default_security(self) -> Self;
}

impl<S> RouterSecurityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_security(
        self,
        cors: &CorsConfig,
        limits: &BodyLimitConfig,
        headers: &SecurityHeadersConfig,
    ) -> Self {
        let cors_layer = CorsLayer::new()
            .allow_origin(cors.to_header_values())
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            .allow_credentials(cors.allow_credentials)
            .max_age(cors.max_age());

        let mut router = self
            .layer(DefaultBodyLimit::max(limits.max_upload_size))
            .layer(RequestBodyLimitLayer::new(limits.max_upload_size))
            .layer(CompressionLayer::new())
            .layer(cors_layer)
            .layer(SetResponseHeaderLayer::overriding(
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static(headers.frame_options.as_str()),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::REFERRER_POLICY,
                HeaderValue::from_static(headers.referrer_policy.as_str()),
            ));

        match HeaderValue::from_str(&headers.hsts_header_value()) {
            Ok(value) => {
                router = router.layer(SetResponseHeaderLayer::overriding(
                    header::STRICT_TRANSPORT_SECURITY,
                    value,
                ));
            }
            Err(err) => {
                tracing::warn!(target: TRACING_TARGET, error = %err, "Invalid HSTS header skipped");
            }
        }

        if let Some(csp) = headers.content_security_policy.as_deref() {
            match HeaderValue::from_str(csp) {
                Ok(value) => {
                    router = router.layer(SetResponseHeaderLayer::overriding(
                        header::CONTENT_SECURITY_POLICY,
                        value,
                    ));
                }
                Err(err) => {
                    tracing::warn!(target: TRACING_TARGET, error = %err, "Invalid CSP header skipped");
                }
            }
        }

        router
    }

    fn with_default_security(self) -> Self {
        self.with_security(
            &CorsConfig::default(),
            &BodyLimitConfig::default(),
            &SecurityHeadersConfig::default(),
        )
    }
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct CorsConfig {
    /// List of allowed CORS origins.
    ///
    /// If empty, defaults to localhost origins for development.
    #[cfg_attr(
        feature = "config",
        arg(long = "cors-origins", env = "CORS_ORIGINS", value_delimiter = ',')
    )]
    pub allowed_origins: Vec<String>,

    /// Maximum age for CORS preflight requests in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CORS_MAX_AGE", default_value = "3600")
    )]
    pub max_age_seconds: u64,

    /// Whether to allow credentials in CORS requests.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CORS_ALLOW_CREDENTIALS", default_value = "false")
    )]
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_age_seconds: 3600,
            allow_credentials: false,
        }
    }
}

impl CorsConfig {
    /// Returns the CORS max age as a Duration.
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_seconds)
    }

    /// Converts configured origins to HeaderValue list, falling back to localhost for development.
    ///
    /// Origins that are not valid header values are skipped.
    pub fn to_header_values(&self) -> Vec<HeaderValue> {
        if self.allowed_origins.is_empty() {
            LOCALHOST_ORIGINS
                .into_iter()
                .map(HeaderValue::from_static)
                .collect()
        } else {
            self.allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect()
        }
    }
}

/// Limits on request bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct BodyLimitConfig {
    /// Largest accepted request body in bytes, including the uploaded image.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "MAX_UPLOAD_SIZE", default_value = "20971520")
    )]
    pub max_upload_size: usize,
}

impl Default for BodyLimitConfig {
    fn default() -> Self {
        Self {
            max_upload_size: 20 * 1024 * 1024,
        }
    }
}

/// Security headers configuration for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct SecurityHeadersConfig {
    /// HSTS max age in seconds. Forces browsers to use HTTPS for this duration.
    pub hsts_max_age_seconds: u64,

    /// Whether to include subdomains in HSTS policy.
    pub hsts_include_subdomains: bool,

    /// Content Security Policy directives controlling resource loading.
    ///
    /// The page uses inline script and style, shows results as `data:`
    /// images and plays audio from this origin.
    pub content_security_policy: Option<String>,

    /// X-Frame-Options value protecting against clickjacking.
    pub frame_options: FrameOptions,

    /// Referrer-Policy controlling referrer information in requests.
    pub referrer_policy: ReferrerPolicy,
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            hsts_max_age_seconds: 31_536_000,
            hsts_include_subdomains: true,
            content_security_policy: Some(
                "default-src 'self'; \
                 script-src 'self' 'unsafe-inline'; \
                 style-src 'self' 'unsafe-inline'; \
                 img-src 'self' data: blob:; \
                 media-src 'self'; \
                 connect-src 'self'; \
                 frame-ancestors 'none'; \
                 base-uri 'self'; \
                 form-action 'self'"
                    .to_owned(),
            ),
            frame_options: FrameOptions::Deny,
            referrer_policy: ReferrerPolicy::StrictOriginWhenCrossOrigin,
        }
    }
}

impl SecurityHeadersConfig {
    /// Returns the HSTS header value as a string.
    pub fn hsts_header_value(&self) -> String {
        if self.hsts_include_subdomains {
            format!("max-age={}; includeSubDomains", self.hsts_max_age_seconds)
        } else {
            format!("max-age={}", self.hsts_max_age_seconds)
        }
    }
}

/// X-Frame-Options header values controlling frame embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameOptions {
    /// The page cannot be displayed in a frame, regardless of the site.
    Deny,
    /// The page can only be displayed in a frame on the same origin.
    SameOrigin,
}

impl FrameOptions {
    /// Returns the header value string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deny => "DENY",
            Self::SameOrigin => "SAMEORIGIN",
        }
    }
}

/// Referrer-Policy header values controlling referrer information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferrerPolicy {
    /// No referrer information is sent.
    NoReferrer,
    /// Sends only the origin as the referrer.
    Origin,
    /// Sends full URL for same-origin, only origin for cross-origin.
    StrictOriginWhenCrossOrigin,
}

impl ReferrerPolicy {
    /// Returns the header value string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoReferrer => "no-referrer",
            Self::Origin => "origin",
            Self::StrictOriginWhenCrossOrigin => "strict-origin-when-cross-origin",
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum_test::TestServer;
    use bytes::Bytes;

    use super::*;

    #[test]
    fn hsts_header_value() {
        let config = SecurityHeadersConfig {
            hsts_include_subdomains: false,
            ..Default::default()
        };
        assert_eq!(config.hsts_header_value(), "max-age=31536000");
    }

    #[test]
    fn cors_origins() {
        assert_eq!(CorsConfig::default().to_header_values().len(), 4);

        let config = CorsConfig {
            allowed_origins: vec!["https://example.com".into(), "bad\norigin".into()],
            ..Default::default()
        };
        assert_eq!(config.to_header_values().len(), 1);
    }

    #[tokio::test]
    async fn sets_security_headers() -> anyhow::Result<()> {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .with_default_security();
        let server = TestServer::new(app)?;

        let response = server.get("/").await;
        response.assert_status_ok();
        response.assert_header("x-frame-options", "DENY");
        response.assert_header("x-content-type-options", "nosniff");
        let csp = response.header("content-security-policy");
        assert!(csp.to_str()?.contains("img-src 'self' data:"));
        Ok(())
    }

    #[tokio::test]
    async fn rejects_oversized_body() -> anyhow::Result<()> {
        let limits = BodyLimitConfig {
            max_upload_size: 16,
        };
        let app = Router::new()
            .route("/upload", post(|body: Bytes| async move { body.len().to_string() }))
            .with_security(&CorsConfig::default(), &limits, &SecurityHeadersConfig::default());
        let server = TestServer::new(app)?;

        let response = server.post("/upload").bytes(Bytes::from(vec![0u8; 64])).await;
        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);

        let response = server.post("/upload").bytes(Bytes::from_static(b"small")).await;
        response.assert_status_ok();
        Ok(())
    }
}
