//! Client configuration.
//!
//! Values come from the environment (optionally seeded from `.env.local` /
//! `.env` in the working directory) and fall back to the local development
//! endpoints.

use std::time::Duration;

use anyhow::Context;
use url::Url;

/// Default base URL of the lobby REST API.
pub const DEFAULT_API_URL: &str = "http://localhost";

/// Default game service socket endpoint.
pub const DEFAULT_WS_URL: &str = "ws://localhost/ws";

/// Default timeout for one lobby request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default time a lifecycle request waits for the socket to open before
/// sending `join_game`.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(5_000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: Url,
    pub ws_url: Url,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_url(DEFAULT_API_URL),
            ws_url: default_url(DEFAULT_WS_URL),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Load configuration from the process environment.
    ///
    /// Reads `DELTA_API_URL`, `DELTA_WS_URL`, `DELTA_REQUEST_TIMEOUT_SECS` and
    /// `DELTA_CONNECT_TIMEOUT_MS`. Unset variables keep their defaults; set but
    /// invalid ones are an error.
    pub fn from_env() -> anyhow::Result<Self> {
        load_dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let api_url = match get("DELTA_API_URL") {
            Some(raw) => {
                Url::parse(&raw).with_context(|| format!("invalid DELTA_API_URL: {raw}"))?
            }
            None => defaults.api_url,
        };
        let ws_url = match get("DELTA_WS_URL") {
            Some(raw) => {
                Url::parse(&raw).with_context(|| format!("invalid DELTA_WS_URL: {raw}"))?
            }
            None => defaults.ws_url,
        };
        if !matches!(ws_url.scheme(), "ws" | "wss") {
            anyhow::bail!("DELTA_WS_URL must use ws:// or wss://, got {ws_url}");
        }

        let request_timeout = match get("DELTA_REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse()
                    .with_context(|| format!("invalid DELTA_REQUEST_TIMEOUT_SECS: {raw}"))?,
            ),
            None => defaults.request_timeout,
        };
        let connect_timeout = match get("DELTA_CONNECT_TIMEOUT_MS") {
            Some(raw) => Duration::from_millis(
                raw.parse()
                    .with_context(|| format!("invalid DELTA_CONNECT_TIMEOUT_MS: {raw}"))?,
            ),
            None => defaults.connect_timeout,
        };

        Ok(Self {
            api_url,
            ws_url,
            request_timeout,
            connect_timeout,
        })
    }
}

// Only called with the DEFAULT_* constants, which `default_urls_parse` checks.
#[allow(clippy::expect_used)]
fn default_url(raw: &str) -> Url {
    Url::parse(raw).expect("default URL is valid")
}

fn load_dotenv() {
    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        if std::path::Path::new(filename).exists() {
            let _ = dotenvy::from_filename(filename);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).expect("config");
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.ws_url.as_str(), "ws://localhost/ws");
    }

    #[test]
    fn reads_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("DELTA_API_URL", "https://delta.example"),
            ("DELTA_WS_URL", "wss://delta.example/ws"),
            ("DELTA_REQUEST_TIMEOUT_SECS", "3"),
            ("DELTA_CONNECT_TIMEOUT_MS", " 250 "),
        ]))
        .expect("config");

        assert_eq!(config.api_url.as_str(), "https://delta.example/");
        assert_eq!(config.ws_url.as_str(), "wss://delta.example/ws");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.connect_timeout, Duration::from_millis(250));
    }

    #[test]
    fn blank_values_fall_back() {
        let config =
            ClientConfig::from_lookup(lookup(&[("DELTA_WS_URL", "   ")])).expect("config");
        assert_eq!(config.ws_url.as_str(), DEFAULT_WS_URL);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(ClientConfig::from_lookup(lookup(&[("DELTA_API_URL", "not a url")])).is_err());
        assert!(ClientConfig::from_lookup(lookup(&[("DELTA_WS_URL", "http://x/ws")])).is_err());
        assert!(
            ClientConfig::from_lookup(lookup(&[("DELTA_REQUEST_TIMEOUT_SECS", "soon")])).is_err()
        );
    }

    #[test]
    fn default_urls_parse() {
        for raw in [DEFAULT_API_URL, DEFAULT_WS_URL] {
            assert!(Url::parse(raw).is_ok(), "{raw}");
        }
        assert_eq!(default_url(DEFAULT_WS_URL).scheme(), "ws");
    }
}
