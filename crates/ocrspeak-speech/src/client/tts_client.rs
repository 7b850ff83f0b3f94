//! Speech client implementation.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::{Bytes, BytesMut};
use regex::Regex;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use url::Url;

use crate::{Error, Result, SpeechConfig, TRACING_TARGET_CLIENT, TRACING_TARGET_HTTP, text};

/// RPC identifier of the speech call.
const RPC_ID: &str = "jQ1olc";

/// Captures the base64 audio inside an RPC response line.
const AUDIO_PATTERN: &str = r#"jQ1olc","\[\\"(.*)\\"]"#;

/// HTTP client for the speech endpoint.
///
/// Each call is a single attempt per chunk. Failures are returned to the
/// caller unchanged.
#[derive(Debug, Clone)]
pub struct SpeechClient {
    /// HTTP client
    http_client: Client,

    /// Resolved RPC endpoint
    endpoint: Url,

    /// Extracts audio from responses
    audio_pattern: Regex,

    /// Configuration
    config: SpeechConfig,
}

impl SpeechClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: SpeechConfig) -> Result<Self> {
        let endpoint = config.endpoint()?;

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded;charset=utf-8"),
        );
        headers.insert(
            header::REFERER,
            HeaderValue::from_str(&config.host())
                .map_err(|e| Error::config(format!("Invalid top-level domain: {e}")))?,
        );

        let http_client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        let audio_pattern = Regex::new(AUDIO_PATTERN)
            .map_err(|e| Error::config(format!("Invalid audio pattern: {e}")))?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            endpoint = %endpoint,
            timeout = ?config.timeout(),
            slow = config.slow,
            "Speech client initialized"
        );

        Ok(Self {
            http_client,
            endpoint,
            audio_pattern,
            config,
        })
    }

    /// Get a reference to the client configuration.
    pub fn config(&self) -> &SpeechConfig {
        &self.config
    }

    /// Get the resolved endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Synthesizes `text` in `language` and returns MP3 audio.
    ///
    /// The text is chunked and each chunk is requested in order. The MP3
    /// payloads are concatenated.
    pub async fn synthesize(&self, text: &str, language: &str) -> Result<Bytes> {
        let chunks = text::chunks(text)?;

        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            language,
            chunks = chunks.len(),
            chars = text.chars().count(),
            "Synthesizing speech"
        );

        let mut audio = BytesMut::new();
        for (index, chunk) in chunks.iter().enumerate() {
            let part = self.synthesize_chunk(chunk, language).await?;

            tracing::debug!(
                target: TRACING_TARGET_HTTP,
                chunk = index,
                bytes = part.len(),
                "Received audio chunk"
            );

            audio.extend_from_slice(&part);
        }

        Ok(audio.freeze())
    }

    async fn synthesize_chunk(&self, chunk: &str, language: &str) -> Result<Vec<u8>> {
        let body = request_body(chunk, language, self.config.slow)?;

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::timeout(self.config.timeout())
                } else {
                    Error::Http(e)
                }
            })?;

        let status = response.status();
        tracing::debug!(
            target: TRACING_TARGET_HTTP,
            status = status.as_u16(),
            "Received response from speech endpoint"
        );

        if !status.is_success() {
            return Err(Error::api(
                status.as_u16(),
                probable_cause(status, &self.config.tld),
            ));
        }

        let body = response.text().await?;
        extract_audio(&self.audio_pattern, &body)
    }
}

/// Builds the form-encoded RPC body for one chunk.
pub(crate) fn request_body(text: &str, language: &str, slow: bool) -> Result<String> {
    let speed = if slow { Value::Bool(true) } else { Value::Null };
    let parameter = serde_json::to_string(&json!([text, language, speed, "null"]))?;
    let rpc = serde_json::to_string(&json!([[[RPC_ID, parameter, null, "generic"]]]))?;

    let encoded: String = url::form_urlencoded::byte_serialize(rpc.as_bytes()).collect();
    Ok(format!("f.req={encoded}&"))
}

/// Decodes and concatenates every audio payload in the response.
pub(crate) fn extract_audio(pattern: &Regex, body: &str) -> Result<Vec<u8>> {
    let mut audio = Vec::new();
    let mut found = false;

    for line in body.lines().filter(|line| line.contains(RPC_ID)) {
        if let Some(captures) = pattern.captures(line) {
            audio.extend(BASE64.decode(&captures[1])?);
            found = true;
        }
    }

    if found {
        Ok(audio)
    } else {
        Err(Error::invalid_response("No audio stream in response"))
    }
}

fn probable_cause(status: StatusCode, tld: &str) -> String {
    match status.as_u16() {
        403 => "Bad token or upstream API changes".to_string(),
        404 if tld != "com" => format!("Unsupported tld '{tld}'"),
        500..=599 => "Upstream API error. Try again later.".to_string(),
        _ => "Unknown".to_string(),
    }
}
