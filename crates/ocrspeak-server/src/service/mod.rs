//! Application state, configuration and the request pipeline.

mod audio;
mod config;
mod page;
mod pipeline;
mod state;

pub use crate::service::audio::{AUDIO_ROUTE, AudioFile, AudioStore};
pub use crate::service::config::ServiceConfig;
pub use crate::service::page::{IndexPage, PageDetails, TITLE};
pub use crate::service::pipeline::{
    ENGINE_UNAVAILABLE, NO_IMAGE, NO_TEXT, OcrOutcome, OcrPipeline, SPEECH_DISABLED,
};
pub use crate::service::state::{Capabilities, ServiceState};
// Re-export error types from crate root for convenience
pub use crate::{Error, Result};
