//! OCR upload handler.
//!
//! The upload is always answered with `200 OK` once the form could be read.
//! Missing images, unreadable files and engine failures come back as text
//! for the page to display.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use super::request::OcrForm;
use super::response::OcrResponse;
use crate::extract::Multipart;
use crate::handler::Result;
use crate::service::{OcrPipeline, ServiceState};

/// Tracing target for OCR handlers.
const TRACING_TARGET: &str = "ocrspeak_server::handler::ocr";

/// Runs OCR on the uploaded image.
#[tracing::instrument(skip_all)]
async fn recognize(
    State(pipeline): State<OcrPipeline>,
    mut multipart: Multipart,
) -> Result<Json<OcrResponse>> {
    let form = OcrForm::from_multipart(&mut multipart).await?;

    tracing::debug!(
        target: TRACING_TARGET,
        has_image = form.image.is_some(),
        language = form.language.as_deref(),
        speak = form.speak,
        "OCR form received"
    );

    let outcome = pipeline
        .process(form.image, form.language.as_deref(), form.speak)
        .await;

    tracing::info!(
        target: TRACING_TARGET,
        annotated = outcome.annotated,
        has_image = outcome.image.is_some(),
        spoken = outcome.audio.is_some(),
        "OCR request completed"
    );

    Ok(Json(OcrResponse::from(outcome)))
}

/// Returns a [`Router`] with the OCR routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/api/ocr", post(recognize))
}

#[cfg(test)]
mod tests {
    use axum_test::multipart::{MultipartForm, Part};
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use ocrspeak_test::{MockOpticalProvider, MockSpeechProvider, font_path, sample_png};

    use super::*;
    use crate::handler::routes as all_routes;
    use crate::handler::test::{
        create_test_server_with_font, create_test_server_with_mocks,
        create_test_server_with_router,
    };
    use crate::service::{ENGINE_UNAVAILABLE, NO_IMAGE, NO_TEXT};

    fn image_part() -> Part {
        Part::bytes(sample_png(40, 30))
            .file_name("sample.png")
            .mime_type("image/png")
    }

    #[tokio::test]
    async fn returns_text_without_font() -> anyhow::Result<()> {
        let app = create_test_server_with_router(|_| routes()).await?;

        let form = MultipartForm::new()
            .add_part("image", image_part())
            .add_text("language", "English (Loaded)");
        let response = app.server.post("/api/ocr").multipart(form).await;
        response.assert_status_ok();

        let body = response.json::<OcrResponse>();
        assert!(body.text.contains("Hello\nWorld"));
        assert!(!body.annotated);
        assert!(body.image.is_some_and(|uri| uri.starts_with("data:image/png;base64,")));
        assert!(body.audio_url.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn returns_annotated_image_with_font() -> anyhow::Result<()> {
        let optical = MockOpticalProvider::with_lines(&[("Hello", 0.98), ("World", 0.3)]);
        let app = create_test_server_with_font(
            all_routes,
            Some(optical),
            Some(MockSpeechProvider::default()),
            Some(font_path()),
        )
        .await?;

        let form = MultipartForm::new()
            .add_part("image", image_part())
            .add_text("language", "English (Loaded)")
            .add_text("speak", "true");
        let response = app.server.post("/api/ocr").multipart(form).await;
        response.assert_status_ok();

        let body = response.json::<OcrResponse>();
        assert!(body.annotated);
        assert_eq!(body.text, "Hello\nWorld");
        assert!(body.speech_error.is_none());
        assert!(body.audio_url.is_some());

        let uri = body.image.ok_or_else(|| anyhow::anyhow!("missing image"))?;
        let png = STANDARD.decode(
            uri.strip_prefix("data:image/png;base64,")
                .ok_or_else(|| anyhow::anyhow!("not a png data uri"))?,
        )?;
        let drawn = image::load_from_memory(&png)?.to_rgb8();
        assert_eq!(drawn.dimensions(), (1200, 450));

        // The low-scoring "World" line is listed in the text but not outlined.
        let kept = drawn.get_pixel(45, 135);
        assert!(kept[0] > 200 && kept[1] < 80);
        let dropped = drawn.get_pixel(45, 315);
        assert!(dropped[1] > 200);
        Ok(())
    }

    #[tokio::test]
    async fn speaks_and_serves_audio() -> anyhow::Result<()> {
        let app = create_test_server_with_router(all_routes).await?;

        let form = MultipartForm::new()
            .add_part("image", image_part())
            .add_text("speak", "true");
        let body = app
            .server
            .post("/api/ocr")
            .multipart(form)
            .await
            .json::<OcrResponse>();

        let url = body
            .audio_url
            .ok_or_else(|| anyhow::anyhow!("missing audio url"))?;
        assert!(url.starts_with("/audio/"));
        assert!(url.ends_with(".mp3"));

        let speech = app.speech.as_ref().map(MockSpeechProvider::calls);
        assert_eq!(speech, Some(1));

        let audio = app.server.get(&url).await;
        audio.assert_status_ok();
        assert!(audio.as_bytes().starts_with(b"ID3"));
        Ok(())
    }

    #[tokio::test]
    async fn missing_image_is_a_message() -> anyhow::Result<()> {
        let app = create_test_server_with_router(|_| routes()).await?;

        let form = MultipartForm::new().add_text("speak", "true");
        let response = app.server.post("/api/ocr").multipart(form).await;
        response.assert_status_ok();

        let body = response.json::<OcrResponse>();
        assert_eq!(body.text, NO_IMAGE);
        assert!(body.image.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn engine_unavailable_is_a_message() -> anyhow::Result<()> {
        let app = create_test_server_with_mocks(|_| routes(), None, None).await?;

        let form = MultipartForm::new().add_part("image", image_part());
        let body = app
            .server
            .post("/api/ocr")
            .multipart(form)
            .await
            .json::<OcrResponse>();

        assert_eq!(body.text, ENGINE_UNAVAILABLE);
        assert!(body.image.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn no_text_returns_original() -> anyhow::Result<()> {
        let optical = MockOpticalProvider::default();
        let app = create_test_server_with_mocks(|_| routes(), Some(optical), None).await?;

        let form = MultipartForm::new().add_part("image", image_part());
        let body = app
            .server
            .post("/api/ocr")
            .multipart(form)
            .await
            .json::<OcrResponse>();

        assert_eq!(body.text, NO_TEXT);
        assert!(body.image.is_some());
        assert!(!body.annotated);
        Ok(())
    }

    #[tokio::test]
    async fn engine_failure_is_reported() -> anyhow::Result<()> {
        let optical = MockOpticalProvider::failing("detection inference failed");
        let app = create_test_server_with_mocks(|_| routes(), Some(optical), None).await?;

        let form = MultipartForm::new().add_part("image", image_part());
        let body = app
            .server
            .post("/api/ocr")
            .multipart(form)
            .await
            .json::<OcrResponse>();

        assert!(body.text.starts_with("An error occurred during OCR:"));
        assert!(body.image.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() -> anyhow::Result<()> {
        let app = create_test_server_with_router(|_| routes()).await?;

        let response = app
            .server
            .post("/api/ocr")
            .bytes("not a multipart body".into())
            .content_type("multipart/form-data")
            .await;
        response.assert_status_bad_request();

        let body = response.json::<serde_json::Value>();
        assert_eq!(body["name"], "bad_request");
        Ok(())
    }
}
