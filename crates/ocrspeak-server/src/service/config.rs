use std::path::{Path, PathBuf};

#[cfg(feature = "config")]
use clap::Args;
use ocrspeak_core::Language;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default values for configuration options.
mod defaults {
    use std::path::PathBuf;

    /// Font used to write recognized text next to the image.
    pub fn font_path() -> PathBuf {
        "latin.ttf".into()
    }

    /// Directory for generated speech files.
    pub fn audio_dir() -> PathBuf {
        "output_audio".into()
    }

    /// Code of the language the bundled models read.
    pub fn language() -> String {
        "en".to_owned()
    }

    /// Lines scoring below this are left out of the drawing.
    pub const DRAW_DROP_SCORE: f32 = 0.5;
}

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    /// Font file used to draw recognized text.
    ///
    /// Checked on every request; when missing, the raw text is returned
    /// without an annotated image.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "FONT_PATH", default_value = "latin.ttf")
    )]
    #[serde(default = "defaults::font_path")]
    pub font_path: PathBuf,

    /// Directory where generated speech is written and served from.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "AUDIO_DIR", default_value = "output_audio")
    )]
    #[serde(default = "defaults::audio_dir")]
    pub audio_dir: PathBuf,

    /// Code of the language selected by default and used for speech.
    #[cfg_attr(
        feature = "config",
        arg(long = "language", env = "OCR_LANGUAGE", default_value = "en")
    )]
    #[serde(default = "defaults::language")]
    pub language: String,

    /// Minimum score for a line to be drawn on the annotated image.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "DRAW_DROP_SCORE", default_value_t = 0.5)
    )]
    #[serde(default = "default_drop_score")]
    pub draw_drop_score: f32,

    /// Turns off the "Read aloud" feature.
    #[cfg_attr(feature = "config", arg(long, env = "DISABLE_SPEECH"))]
    #[serde(default)]
    pub disable_speech: bool,
}

fn default_drop_score() -> f32 {
    defaults::DRAW_DROP_SCORE
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            font_path: defaults::font_path(),
            audio_dir: defaults::audio_dir(),
            language: defaults::language(),
            draw_drop_score: defaults::DRAW_DROP_SCORE,
            disable_speech: false,
        }
    }
}

impl ServiceConfig {
    /// Returns a config writing audio into `audio_dir`.
    pub fn with_audio_dir(mut self, audio_dir: impl Into<PathBuf>) -> Self {
        self.audio_dir = audio_dir.into();
        self
    }

    /// Returns a config reading the font from `font_path`.
    pub fn with_font_path(mut self, font_path: impl Into<PathBuf>) -> Self {
        self.font_path = font_path.into();
        self
    }

    /// Returns the font path.
    pub fn font_path(&self) -> &Path {
        &self.font_path
    }

    /// Resolves the configured default language.
    pub fn default_language(&self) -> Result<Language> {
        Language::from_code(&self.language)
            .ok_or_else(|| Error::config(format!("unsupported language '{}'", self.language)))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        self.default_language()?;

        if !(0.0..=1.0).contains(&self.draw_drop_score) {
            return Err(Error::config(format!(
                "draw drop score {} must be between 0 and 1",
                self.draw_drop_score
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ocrspeak_core::language::ENGLISH;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.font_path(), Path::new("latin.ttf"));
        assert_eq!(config.default_language().ok(), Some(ENGLISH));
    }

    #[test]
    fn rejects_unknown_language() {
        let config = ServiceConfig {
            language: "xx".to_owned(),
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_drop_score() {
        let config = ServiceConfig {
            draw_drop_score: 1.5,
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
