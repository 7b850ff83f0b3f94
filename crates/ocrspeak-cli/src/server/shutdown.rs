//! Signals that stop the server.
//!
//! Uploads in progress keep running after a signal arrives: OCR inference
//! and speech synthesis are given the shutdown timeout to finish before
//! their connections are dropped.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix;

use crate::TRACING_TARGET_SERVER_SHUTDOWN;

/// The signal that ended the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// SIGINT, usually Ctrl+C in a terminal.
    Interrupt,
    /// SIGTERM, sent by container runtimes and process managers.
    Terminate,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => f.write_str("SIGINT"),
            Self::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Resolves once SIGINT or SIGTERM is received.
pub async fn shutdown_signal(shutdown_timeout: Duration) {
    shutdown_on(next_signal(), shutdown_timeout).await;
}

/// Waits for `signal` and logs how long in-flight requests may still run.
async fn shutdown_on(signal: impl Future<Output = Signal>, shutdown_timeout: Duration) -> Signal {
    let signal = signal.await;

    tracing::info!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        %signal,
        timeout_secs = shutdown_timeout.as_secs(),
        "Stopping: no new uploads accepted, in-flight OCR and speech requests may finish"
    );

    signal
}

async fn next_signal() -> Signal {
    let interrupt = async {
        if let Err(e) = ctrl_c().await {
            tracing::error!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                error = %e,
                "Cannot listen for SIGINT"
            );
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match unix::signal(unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    error = %e,
                    "Cannot listen for SIGTERM"
                );
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => Signal::Interrupt,
        () = terminate => Signal::Terminate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_received_signal() {
        let signal = shutdown_on(async { Signal::Terminate }, Duration::from_secs(30)).await;
        assert_eq!(signal, Signal::Terminate);
    }

    #[test]
    fn signal_names() {
        assert_eq!(Signal::Interrupt.to_string(), "SIGINT");
        assert_eq!(Signal::Terminate.to_string(), "SIGTERM");
    }
}
