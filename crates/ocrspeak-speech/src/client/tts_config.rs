//! Configuration for the speech client.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// Default top-level domain of the translate host.
pub const DEFAULT_TLD: &str = "com";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Browser user agent the endpoint expects.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; WOW64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/47.0.2526.106 Safari/537.36";

/// Configuration for [`SpeechClient`].
///
/// [`SpeechClient`]: crate::SpeechClient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct SpeechConfig {
    /// Top-level domain of the translate host (e.g. "com", "co.uk")
    #[cfg_attr(
        feature = "config",
        arg(long = "tts-tld", env = "TTS_TLD", default_value = DEFAULT_TLD)
    )]
    #[serde(default = "default_tld")]
    pub tld: String,

    /// Read more slowly
    #[cfg_attr(feature = "config", arg(long = "tts-slow", env = "TTS_SLOW"))]
    #[serde(default)]
    pub slow: bool,

    /// Request timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "tts-timeout-secs", env = "TTS_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)
    )]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User agent sent with every request
    #[cfg_attr(
        feature = "config",
        arg(long = "tts-user-agent", env = "TTS_USER_AGENT", default_value = DEFAULT_USER_AGENT)
    )]
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Full endpoint URL, overriding the one derived from the domain
    #[cfg_attr(feature = "config", arg(long = "tts-endpoint", env = "TTS_ENDPOINT"))]
    pub endpoint: Option<String>,
}

fn default_tld() -> String {
    DEFAULT_TLD.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            tld: default_tld(),
            slow: false,
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            endpoint: None,
        }
    }
}

impl SpeechConfig {
    /// Creates a configuration for the given top-level domain.
    pub fn new(tld: impl Into<String>) -> Self {
        Self {
            tld: tld.into(),
            ..Self::default()
        }
    }

    /// Sets slow speech.
    pub fn with_slow(mut self, slow: bool) -> Self {
        self.slow = slow;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// Overrides the endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Host the requests are sent to, used as the referer.
    pub fn host(&self) -> String {
        format!("https://translate.google.{}/", self.tld)
    }

    /// Resolves the RPC endpoint URL.
    pub fn endpoint(&self) -> Result<Url> {
        let raw = match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("{}_/TranslateWebserverUi/data/batchexecute", self.host()),
        };

        Url::parse(&raw).map_err(|e| Error::config(format!("Invalid endpoint '{raw}': {e}")))
    }
}
