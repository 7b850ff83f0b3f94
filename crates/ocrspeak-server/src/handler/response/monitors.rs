//! Monitor response types.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Whether a part of the pipeline can be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentStatus {
    /// Loaded and ready.
    Available,
    /// Expected but missing or failing.
    Unavailable,
    /// Turned off by configuration.
    Disabled,
}

impl ComponentStatus {
    /// Maps presence to [`Available`] or [`Unavailable`].
    ///
    /// [`Available`]: ComponentStatus::Available
    /// [`Unavailable`]: ComponentStatus::Unavailable
    pub fn from_available(available: bool) -> Self {
        if available {
            Self::Available
        } else {
            Self::Unavailable
        }
    }
}

/// Status of the OCR pipeline and its optional parts.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorStatusResponse {
    /// Timestamp when this status was generated.
    pub checked_at: Timestamp,
    /// True when uploads can be processed.
    pub is_healthy: bool,
    /// Detection and recognition models.
    pub ocr_engine: ComponentStatus,
    /// Whether text lines are checked for rotation.
    pub angle_classifier: bool,
    /// Font used to draw recognized text.
    pub font: ComponentStatus,
    /// Text-to-speech.
    pub speech: ComponentStatus,
}
