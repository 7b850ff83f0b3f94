//! Languages the bundled models are able to read.
//!
//! Models are loaded once at startup for a single language, so the list is
//! informational: it backs the language dropdown and maps display names to
//! the language codes the speech endpoint expects.

use serde::Serialize;

/// A language offered in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    /// ISO-639 code passed to speech synthesis (e.g. `en`).
    pub code: &'static str,
    /// Name shown in the dropdown.
    pub display_name: &'static str,
}

/// English, matching the bundled `en` detection and recognition models.
pub const ENGLISH: Language = Language {
    code: "en",
    display_name: "English (Loaded)",
};

/// All languages offered by the UI.
pub const SUPPORTED_LANGUAGES: &[Language] = &[ENGLISH];

impl Language {
    /// Looks up a language by display name or code.
    pub fn find(name_or_code: &str) -> Option<Self> {
        let needle = name_or_code.trim();
        SUPPORTED_LANGUAGES
            .iter()
            .find(|lang| lang.display_name == needle || lang.code.eq_ignore_ascii_case(needle))
            .copied()
    }

    /// Looks up a language by code only.
    pub fn from_code(code: &str) -> Option<Self> {
        SUPPORTED_LANGUAGES
            .iter()
            .find(|lang| lang.code.eq_ignore_ascii_case(code.trim()))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_by_display_name_and_code() {
        assert_eq!(Language::find("English (Loaded)"), Some(ENGLISH));
        assert_eq!(Language::find("EN"), Some(ENGLISH));
        assert_eq!(Language::find("Klingon"), None);
    }

    #[test]
    fn from_code_ignores_display_names() {
        assert_eq!(Language::from_code("en"), Some(ENGLISH));
        assert_eq!(Language::from_code("English (Loaded)"), None);
    }
}
