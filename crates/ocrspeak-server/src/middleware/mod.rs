//! Middleware for `axum::Router` and HTTP request processing.
//!
//! - Security: CORS, response headers, upload size limits
//! - Observability: request IDs and request tracing
//! - Recovery: panics, timeouts, middleware errors
//!
//! ```rust,no_run
//! use axum::Router;
//! use ocrspeak_server::middleware::{
//!     BodyLimitConfig, CorsConfig, RecoveryConfig, RouterObservabilityExt,
//!     RouterRecoveryExt, RouterSecurityExt, SecurityHeadersConfig,
//! };
//!
//! let app: Router = Router::new()
//!     .with_security(
//!         &CorsConfig::default(),
//!         &BodyLimitConfig::default(),
//!         &SecurityHeadersConfig::default(),
//!     )
//!     .with_observability()
//!     .with_recovery(&RecoveryConfig::default());
//! ```

mod observability;
mod recovery;
mod security;

pub use observability::RouterObservabilityExt;
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
pub use security::{
    BodyLimitConfig, CorsConfig, FrameOptions, ReferrerPolicy, RouterSecurityExt,
    SecurityHeadersConfig,
};
