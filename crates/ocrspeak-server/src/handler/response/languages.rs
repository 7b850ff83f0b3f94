//! Language response types.

use ocrspeak_core::Language;
use serde::{Deserialize, Serialize};

/// One entry of the language dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageOption {
    /// Recognition language code.
    pub code: String,
    /// Label shown in the dropdown.
    pub display_name: String,
}

impl From<Language> for LanguageOption {
    fn from(language: Language) -> Self {
        Self {
            code: language.code.to_owned(),
            display_name: language.display_name.to_owned(),
        }
    }
}

/// Languages the loaded models can read.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguagesResponse {
    /// All selectable languages.
    pub languages: Vec<LanguageOption>,
    /// Code of the language the models were loaded for.
    pub default_language: String,
}
