//! HTTP client for the hosted speech endpoint.

mod tts_client;
mod tts_config;

pub use tts_client::SpeechClient;
pub use tts_config::SpeechConfig;
