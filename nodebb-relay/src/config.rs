//! Configuration module for environment variable parsing.
//!
//! All settings are read once at startup into an immutable [`Config`] that is
//! shared with the request handlers through axum state.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;
use url::Url;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SECRET: &str = "secret_key";
const DEFAULT_API_ROOT: &str = "http://localhost:8000";
const DEFAULT_EVENT_TOPIC: &str = "-1";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Shared secret GitHub signs deliveries with
    pub github_webhook_secret: String,

    /// Base URL of the NodeBB instance (without `/api/v3`)
    pub nodebb_api_root: Url,

    /// Category id new topics are created under
    pub nodebb_event_topic: String,

    /// Bearer token for the NodeBB write API
    pub nodebb_api_secret: String,

    /// Timeout for the outbound NodeBB request in milliseconds
    pub request_timeout_ms: u64,

    /// Whether 500 responses carry the upstream error text
    pub expose_upstream_errors: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// Tests pass a map here instead of mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Config {
            port: parse_or(&lookup, "PORT", DEFAULT_PORT),

            github_webhook_secret: lookup("GITHUB_WEBHOOK_SECRET")
                .unwrap_or_else(|| DEFAULT_SECRET.to_string()),

            nodebb_api_root: parse_url(&lookup, "NODEBB_API_ROOT", DEFAULT_API_ROOT),

            nodebb_event_topic: lookup("NODEBB_GITHUB_EVENT_TOPIC")
                .unwrap_or_else(|| DEFAULT_EVENT_TOPIC.to_string()),

            nodebb_api_secret: lookup("NODEBB_SECRET")
                .unwrap_or_else(|| DEFAULT_SECRET.to_string()),

            request_timeout_ms: parse_or(&lookup, "REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT_MS),

            expose_upstream_errors: parse_bool(&lookup, "EXPOSE_UPSTREAM_ERRORS", true),
        }
    }

    /// Outbound request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// True when either secret is still the built-in placeholder.
    pub fn uses_default_secrets(&self) -> bool {
        self.github_webhook_secret == DEFAULT_SECRET || self.nodebb_api_secret == DEFAULT_SECRET
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Load `.env`, then `.env.local` on top of it.
///
/// Variables already present in the process environment win over `.env`,
/// while `.env.local` overrides everything. Missing files are skipped.
/// Returns the names of the files that were loaded.
pub fn load_dotenv() -> Result<Vec<&'static str>, dotenvy::Error> {
    let mut loaded = Vec::new();

    match dotenvy::from_filename(".env") {
        Ok(_) => loaded.push(".env"),
        Err(e) if e.not_found() => {}
        Err(e) => return Err(e),
    }

    match dotenvy::from_filename_override(".env.local") {
        Ok(_) => loaded.push(".env.local"),
        Err(e) if e.not_found() => {}
        Err(e) => return Err(e),
    }

    Ok(loaded)
}

/// Parse a typed value, falling back to `default` when unset or invalid.
fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let raw = match lookup(name) {
        Some(v) => v,
        None => return default,
    };

    match raw.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid value, using default");
            default
        }
    }
}

/// Parse a base URL, falling back to `default` when unset or invalid.
fn parse_url<F>(lookup: &F, name: &str, default: &str) -> Url
where
    F: Fn(&str) -> Option<String>,
{
    let fallback = || Url::parse(default).unwrap_or_else(|_| unreachable!("default URL is valid"));

    let raw = match lookup(name) {
        Some(v) => v,
        None => return fallback(),
    };

    match Url::parse(raw.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url,
        _ => {
            warn!(env_var = name, value = %raw, "Invalid URL, using default");
            fallback()
        }
    }
}

/// Parse a boolean flag such as `true`, `0` or `off`.
fn parse_bool<F>(lookup: &F, name: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    let raw = match lookup(name) {
        Some(v) => v,
        None => return default,
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => {
            warn!(env_var = name, value = %raw, "Invalid boolean, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.github_webhook_secret, "secret_key");
        assert_eq!(config.nodebb_api_root.as_str(), "http://localhost:8000/");
        assert_eq!(config.nodebb_event_topic, "-1");
        assert_eq!(config.nodebb_api_secret, "secret_key");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert!(config.expose_upstream_errors);
        assert!(config.uses_default_secrets());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("GITHUB_WEBHOOK_SECRET", "gh"),
            ("NODEBB_API_ROOT", "https://forum.example.com"),
            ("NODEBB_GITHUB_EVENT_TOPIC", "12"),
            ("NODEBB_SECRET", "bb"),
            ("REQUEST_TIMEOUT_MS", "2500"),
            ("EXPOSE_UPSTREAM_ERRORS", "off"),
        ]);

        assert_eq!(config.port, 8080);
        assert_eq!(config.github_webhook_secret, "gh");
        assert_eq!(config.nodebb_api_root.host_str(), Some("forum.example.com"));
        assert_eq!(config.nodebb_event_topic, "12");
        assert_eq!(config.nodebb_api_secret, "bb");
        assert_eq!(config.request_timeout_ms, 2500);
        assert!(!config.expose_upstream_errors);
        assert!(!config.uses_default_secrets());
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("PORT", "not-a-port"),
            ("NODEBB_API_ROOT", "ftp://nope"),
            ("REQUEST_TIMEOUT_MS", "-5"),
            ("EXPOSE_UPSTREAM_ERRORS", "maybe"),
        ]);

        assert_eq!(config.port, 3000);
        assert_eq!(config.nodebb_api_root.as_str(), "http://localhost:8000/");
        assert_eq!(config.request_timeout_ms, 10_000);
        assert!(config.expose_upstream_errors);
    }
}
