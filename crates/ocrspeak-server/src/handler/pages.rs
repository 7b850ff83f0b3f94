//! Upload page handler.

use axum::Router;
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;

use crate::service::{IndexPage, ServiceState};

/// Tracing target for page handlers.
const TRACING_TARGET: &str = "ocrspeak_server::handler::pages";

/// Serves the upload page.
#[tracing::instrument(skip_all)]
async fn index(State(page): State<IndexPage>) -> Html<String> {
    tracing::debug!(target: TRACING_TARGET, "Serving upload page");
    Html(page.html().to_owned())
}

/// Returns a [`Router`] with the page routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/", get(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::test::create_test_server_with_router;
    use crate::service::TITLE;

    #[tokio::test]
    async fn serves_upload_page() -> anyhow::Result<()> {
        let app = create_test_server_with_router(|_| routes()).await?;

        let response = app.server.get("/").await;
        response.assert_status_ok();

        let html = response.text();
        assert!(html.contains(TITLE));
        assert!(html.contains("/api/ocr"));
        assert!(html.contains("id=\"speak-row\">"));
        Ok(())
    }
}
