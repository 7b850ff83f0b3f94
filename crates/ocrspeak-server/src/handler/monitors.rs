//! Health check handler.
//!
//! Reports whether uploads can be processed, and which optional parts
//! (angle classifier, font, speech) are in use.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use jiff::Timestamp;

use super::response::{ComponentStatus, MonitorStatusResponse};
use crate::service::{OcrPipeline, ServiceState};

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "ocrspeak_server::handler::monitors";

#[tracing::instrument(skip_all)]
async fn health_status(
    State(pipeline): State<OcrPipeline>,
) -> (StatusCode, Json<MonitorStatusResponse>) {
    let (ocr_engine, angle_classifier) = match pipeline.optical() {
        Some(optical) => {
            let healthy = optical
                .health_check()
                .await
                .is_ok_and(|health| health.is_operational());
            (
                ComponentStatus::from_available(healthy),
                optical.uses_angle_classifier(),
            )
        }
        None => (ComponentStatus::Unavailable, false),
    };

    let speech = match pipeline.speech() {
        Some(speech) => ComponentStatus::from_available(
            speech
                .health_check()
                .await
                .is_ok_and(|health| health.is_operational()),
        ),
        None => ComponentStatus::Disabled,
    };

    let font = ComponentStatus::from_available(pipeline.font().exists());
    let is_healthy = ocr_engine == ComponentStatus::Available;

    let response = MonitorStatusResponse {
        checked_at: Timestamp::now(),
        is_healthy,
        ocr_engine,
        angle_classifier,
        font,
        speech,
    };

    let status_code = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    tracing::info!(
        target: TRACING_TARGET,
        is_healthy,
        status_code = status_code.as_u16(),
        "Health status response prepared"
    );

    (status_code, Json(response))
}

/// Returns a [`Router`] with all health monitoring routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/health", get(health_status))
}

#[cfg(test)]
mod tests {
    use ocrspeak_test::{MockOpticalProvider, font_path};

    use super::*;
    use crate::handler::test::{
        create_test_server_with_font, create_test_server_with_mocks,
        create_test_server_with_router,
    };

    #[tokio::test]
    async fn healthy_with_engine() -> anyhow::Result<()> {
        let app = create_test_server_with_router(|_| routes()).await?;

        let response = app.server.get("/health").await;
        response.assert_status_ok();

        let status = response.json::<MonitorStatusResponse>();
        assert!(status.is_healthy);
        assert_eq!(status.ocr_engine, ComponentStatus::Available);
        assert_eq!(status.font, ComponentStatus::Unavailable);
        assert_eq!(status.speech, ComponentStatus::Available);
        assert!(!status.angle_classifier);
        Ok(())
    }

    #[tokio::test]
    async fn unavailable_without_engine() -> anyhow::Result<()> {
        let app = create_test_server_with_mocks(|_| routes(), None, None).await?;

        let response = app.server.get("/health").await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

        let status = response.json::<MonitorStatusResponse>();
        assert!(!status.is_healthy);
        assert_eq!(status.ocr_engine, ComponentStatus::Unavailable);
        assert_eq!(status.speech, ComponentStatus::Disabled);
        Ok(())
    }

    #[tokio::test]
    async fn reports_angle_classifier() -> anyhow::Result<()> {
        let optical = MockOpticalProvider::default().with_angle_classifier();
        let app = create_test_server_with_mocks(|_| routes(), Some(optical), None).await?;

        let status = app.server.get("/health").await.json::<MonitorStatusResponse>();
        assert!(status.angle_classifier);
        Ok(())
    }

    #[tokio::test]
    async fn health_body_uses_camel_case_keys() -> anyhow::Result<()> {
        let optical = MockOpticalProvider::default();
        let app =
            create_test_server_with_font(|_| routes(), Some(optical), None, Some(font_path()))
                .await?;

        let body = app.server.get("/health").await.json::<serde_json::Value>();
        let mut keys = body
            .as_object()
            .map(|object| object.keys().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        keys.sort();
        assert_eq!(
            keys,
            ["angleClassifier", "checkedAt", "font", "isHealthy", "ocrEngine", "speech"]
        );
        assert_eq!(body["isHealthy"], true);
        assert_eq!(body["ocrEngine"], "available");
        assert_eq!(body["font"], "available");
        assert_eq!(body["speech"], "disabled");
        Ok(())
    }
}
