//! Connection settings for `ObjectsClient`.

use std::time::Duration;

use crate::error::{ApiError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.restful-api.dev";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const BASE_URL_ENV: &str = "OBJECTS_API_BASE_URL";
pub const TIMEOUT_ENV: &str = "OBJECTS_API_TIMEOUT_SECS";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Upper bound for a single round trip, connect included.
    pub timeout: Duration,
    /// Sent with every request.
    pub default_headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            default_headers: vec![("accept".to_string(), "application/json".to_string())],
        }
    }
}

impl ClientConfig {
    /// Defaults, overridden by `OBJECTS_API_BASE_URL` and
    /// `OBJECTS_API_TIMEOUT_SECS` when set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(url) = lookup(BASE_URL_ENV) {
            config = config.with_base_url(&url);
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ApiError::Config(format!("{TIMEOUT_ENV} must be whole seconds, got {raw:?}")))?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add a default header, replacing any existing one with the same name.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.default_headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.default_headers.push((name.to_ascii_lowercase(), value.to_string()));
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_accept_json_with_bounded_timeout() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(
            config.default_headers,
            vec![("accept".to_string(), "application/json".to_string())]
        );
    }

    #[test]
    fn env_overrides_base_url_and_timeout() {
        let config =
            ClientConfig::from_lookup(lookup(&[(BASE_URL_ENV, "http://localhost:3000/"), (TIMEOUT_ENV, "5")])).unwrap();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_timeout_is_a_config_error() {
        let err = ClientConfig::from_lookup(lookup(&[(TIMEOUT_ENV, "soon")])).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn with_header_replaces_same_name() {
        let config = ClientConfig::default().with_header("Accept", "text/plain");
        assert_eq!(config.default_headers, vec![("accept".to_string(), "text/plain".to_string())]);
    }
}
