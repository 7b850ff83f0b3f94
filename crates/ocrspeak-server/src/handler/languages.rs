//! Language listing handler.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use ocrspeak_core::language::SUPPORTED_LANGUAGES;

use super::response::{LanguageOption, LanguagesResponse};
use crate::service::{OcrPipeline, ServiceState};

/// Lists the languages the dropdown offers.
#[tracing::instrument(skip_all)]
async fn list_languages(State(pipeline): State<OcrPipeline>) -> Json<LanguagesResponse> {
    let languages = SUPPORTED_LANGUAGES
        .iter()
        .copied()
        .map(LanguageOption::from)
        .collect();

    Json(LanguagesResponse {
        languages,
        default_language: pipeline.default_language().code.to_owned(),
    })
}

/// Returns a [`Router`] with the language routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/api/languages", get(list_languages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::test::create_test_server_with_router;

    #[tokio::test]
    async fn lists_english() -> anyhow::Result<()> {
        let app = create_test_server_with_router(|_| routes()).await?;

        let response = app.server.get("/api/languages").await;
        response.assert_status_ok();

        let body = response.json::<LanguagesResponse>();
        assert_eq!(body.default_language, "en");
        assert_eq!(
            body.languages,
            vec![LanguageOption {
                code: "en".into(),
                display_name: "English (Loaded)".into(),
            }]
        );
        Ok(())
    }
}
