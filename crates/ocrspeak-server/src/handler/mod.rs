//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! | Method | Path              | Handler                          |
//! |--------|-------------------|----------------------------------|
//! | GET    | `/`               | upload page                      |
//! | POST   | `/api/ocr`        | OCR, drawing and optional speech |
//! | GET    | `/api/languages`  | dropdown entries                 |
//! | GET    | `/audio/{file}`   | generated speech                 |
//! | GET    | `/health`         | component status                 |
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod error;
mod languages;
mod monitors;
mod ocr;
mod pages;
pub mod request;
pub mod response;

use axum::Router;
use axum::response::{IntoResponse, Response};
use tower_http::services::ServeDir;

pub use crate::handler::error::{Error, ErrorKind, Result};
use crate::service::{AUDIO_ROUTE, ServiceState};

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with all routes.
///
/// Audio files are served from the directory the pipeline writes to.
pub fn routes(state: ServiceState) -> Router<ServiceState> {
    let audio_dir = state.pipeline().audio_store().dir().to_path_buf();

    Router::new()
        .merge(pages::routes())
        .merge(ocr::routes())
        .merge(languages::routes())
        .merge(monitors::routes())
        .nest_service(AUDIO_ROUTE, ServeDir::new(audio_dir))
        .fallback(handler)
}

#[cfg(test)]
pub(crate) mod test {
    use std::path::PathBuf;

    use axum::Router;
    use axum_test::TestServer;
    use ocrspeak_core::{OpticalService, SpeechService};
    use ocrspeak_paddle::PaddleConfig;
    use ocrspeak_test::{MockOpticalProvider, MockSpeechProvider};
    use tempfile::TempDir;

    use crate::handler::routes;
    use crate::service::{Capabilities, ServiceConfig, ServiceState};

    /// A running test server with the mocks behind it.
    pub struct TestApp {
        pub server: TestServer,
        pub optical: Option<MockOpticalProvider>,
        pub speech: Option<MockSpeechProvider>,
        _audio_dir: TempDir,
    }

    /// Returns a new [`TestApp`] with the given router and the given mocks.
    ///
    /// The font path never exists, so results come back as raw text.
    pub async fn create_test_server_with_mocks(
        router: impl Fn(ServiceState) -> Router<ServiceState>,
        optical: Option<MockOpticalProvider>,
        speech: Option<MockSpeechProvider>,
    ) -> anyhow::Result<TestApp> {
        create_test_server_with_font(router, optical, speech, None).await
    }

    /// Returns a new [`TestApp`] drawing with `font`, or with a missing
    /// font when `None`.
    pub async fn create_test_server_with_font(
        router: impl Fn(ServiceState) -> Router<ServiceState>,
        optical: Option<MockOpticalProvider>,
        speech: Option<MockSpeechProvider>,
        font: Option<PathBuf>,
    ) -> anyhow::Result<TestApp> {
        let audio_dir = tempfile::tempdir()?;
        let font = font.unwrap_or_else(|| audio_dir.path().join("missing.ttf"));
        let config = ServiceConfig::default()
            .with_audio_dir(audio_dir.path().join("audio"))
            .with_font_path(font);

        let capabilities = Capabilities::new(
            optical.clone().map(OpticalService::new),
            speech.clone().map(SpeechService::new),
        );
        let state =
            ServiceState::from_config(&config, &PaddleConfig::default(), capabilities).await?;

        let app: Router = router(state.clone()).with_state(state);
        let server = TestServer::new(app)?;

        Ok(TestApp {
            server,
            optical,
            speech,
            _audio_dir: audio_dir,
        })
    }

    /// Returns a new [`TestApp`] whose engine reads "Hello" and "World".
    pub async fn create_test_server_with_router(
        router: impl Fn(ServiceState) -> Router<ServiceState>,
    ) -> anyhow::Result<TestApp> {
        create_test_server_with_mocks(
            router,
            Some(MockOpticalProvider::with_lines(&[("Hello", 0.98), ("World", 0.91)])),
            Some(MockSpeechProvider::default()),
        )
        .await
    }

    /// Returns a new [`TestApp`] with all routes.
    pub async fn create_test_server() -> anyhow::Result<TestApp> {
        create_test_server_with_router(routes).await
    }

    #[tokio::test]
    async fn handlers() -> anyhow::Result<()> {
        let app = create_test_server().await?;
        assert!(app.server.is_running());
        Ok(())
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() -> anyhow::Result<()> {
        let app = create_test_server().await?;

        let response = app.server.get("/missing").await;
        response.assert_status_not_found();
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["name"], "not_found");
        Ok(())
    }
}
