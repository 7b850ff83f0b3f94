//! The upload page.

use std::sync::Arc;

use ocrspeak_core::Language;
use ocrspeak_core::language::SUPPORTED_LANGUAGES;
use ocrspeak_paddle::PaddleConfig;

/// Page template with `{{name}}` placeholders.
const TEMPLATE: &str = include_str!("../../assets/index.html");

/// Page title.
pub const TITLE: &str = "PaddleOCR Web App (Bundled Models)";

/// Values substituted into the page.
#[derive(Debug, Clone)]
pub struct PageDetails<'a> {
    /// Language the models were loaded for.
    pub language: Language,
    /// Detection model folder name.
    pub det_model: &'a str,
    /// Recognition model folder name.
    pub rec_model: &'a str,
    /// Recognition dictionary file name.
    pub rec_dict: &'a str,
    /// Font file path as configured.
    pub font_path: &'a str,
    /// Whether the "Read aloud" option is offered.
    pub speech: bool,
}

impl<'a> PageDetails<'a> {
    /// Takes the model names from the paddle configuration.
    pub fn from_models(models: &'a PaddleConfig, language: Language, font_path: &'a str) -> Self {
        Self {
            language,
            det_model: &models.det_model,
            rec_model: &models.rec_model,
            rec_dict: &models.rec_dict,
            font_path,
            speech: true,
        }
    }
}

/// The rendered upload page, shared between requests.
#[derive(Debug, Clone)]
pub struct IndexPage {
    html: Arc<str>,
}

impl IndexPage {
    /// Renders the page once.
    pub fn render(details: &PageDetails<'_>) -> Self {
        let options = SUPPORTED_LANGUAGES
            .iter()
            .map(|lang| {
                let selected = if *lang == details.language { " selected" } else { "" };
                format!(
                    "<option value=\"{}\"{selected}>{}</option>",
                    escape(lang.display_name),
                    escape(lang.display_name)
                )
            })
            .collect::<Vec<_>>()
            .join("\n          ");

        let html = TEMPLATE
            .replace("{{title}}", TITLE)
            .replace("{{language}}", &escape(&details.language.code.to_uppercase()))
            .replace("{{det_model}}", &escape(details.det_model))
            .replace("{{rec_model}}", &escape(details.rec_model))
            .replace("{{rec_dict}}", &escape(details.rec_dict))
            .replace("{{font_path}}", &escape(details.font_path))
            .replace("{{language_options}}", &options)
            .replace("{{speech_hidden}}", if details.speech { "" } else { " hidden" });

        Self { html: html.into() }
    }

    /// The page markup.
    pub fn html(&self) -> &str {
        &self.html
    }
}

/// Escapes text for use in HTML content and attribute values.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use ocrspeak_core::language::ENGLISH;

    use super::*;

    #[test]
    fn renders_model_names_and_language() {
        let models = PaddleConfig::default();
        let page = IndexPage::render(&PageDetails::from_models(&models, ENGLISH, "latin.ttf"));
        let html = page.html();

        assert!(html.contains(TITLE));
        assert!(html.contains("<strong>EN</strong>"));
        assert!(html.contains("en_PP-OCRv3_det_infer"));
        assert!(html.contains("en_PP-OCRv4_rec_infer"));
        assert!(html.contains("en_dict.txt"));
        assert!(html.contains("<option value=\"English (Loaded)\" selected>"));
        assert!(html.contains("Powered by PaddleOCR and Gradio"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn hides_speech_when_disabled() {
        let models = PaddleConfig::default();
        let mut details = PageDetails::from_models(&models, ENGLISH, "latin.ttf");
        details.speech = false;

        let html = IndexPage::render(&details).html().to_owned();
        assert!(html.contains("id=\"speak-row\" hidden"));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<b>&\"x\"</b>"), "&lt;b&gt;&amp;&quot;x&quot;&lt;/b&gt;");
    }
}
