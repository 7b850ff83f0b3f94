#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use ocrspeak_paddle::{ModelLayout, PaddleConfig};
use ocrspeak_server::handler::routes;
use ocrspeak_server::middleware::{
    RouterObservabilityExt, RouterRecoveryExt, RouterSecurityExt, SecurityHeadersConfig,
};
use ocrspeak_server::service::ServiceState;

use crate::config::{Cli, MiddlewareConfig, create_capabilities};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "ocrspeak_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "ocrspeak_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "ocrspeak_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    if cli.check_models {
        return check_models(&cli.paddle);
    }

    Cli::init_tracing()?;
    cli.log();
    cli.validate()?;

    let capabilities = create_capabilities(&cli);
    let state = ServiceState::from_config(&cli.service, &cli.paddle, capabilities)
        .await
        .context("failed to create service state")?;
    let router = create_router(state, &cli.middleware);

    server::serve_http(router, cli.server).await?;

    Ok(())
}

/// Prints the model layout report.
///
/// Fails when a required part is missing, so the process exits with 1.
fn check_models(config: &PaddleConfig) -> anyhow::Result<()> {
    let report = ModelLayout::from_config(config).check();
    println!("{report}");

    if !report.is_complete() {
        anyhow::bail!(
            "{} required model file(s) missing",
            report.missing_required().len()
        );
    }

    Ok(())
}

/// Creates the router with all middleware layers applied.
///
/// Middleware is applied in reverse order (last added = outermost):
/// 1. Recovery (outermost) - catches panics and enforces timeouts
/// 2. Observability - request IDs and tracing spans
/// 3. Security - CORS, security headers, compression, upload limit
/// 4. Routes (innermost) - actual request handlers
fn create_router(state: ServiceState, middleware: &MiddlewareConfig) -> Router {
    routes(state.clone())
        .with_state(state)
        .with_security(
            &middleware.cors,
            &middleware.body_limit,
            &SecurityHeadersConfig::default(),
        )
        .with_observability()
        .with_recovery(&middleware.recovery)
}
