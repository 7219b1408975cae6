//! Endpoint configuration for a Locker client.
//!
//! Explicit values always win; the environment is only consulted as a
//! fallback for the host and the API key.

use url::Url;

use crate::error::Error;

/// Environment variable holding the default Locker host.
pub const HOST_ENV: &str = "LOCKER_HOST";

/// Environment variable holding the default API key.
pub const KEY_ENV: &str = "LOCKER_KEY";

/// Where and how to reach a Locker server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockerConfig {
    host: String,
    key: Option<String>,
    insecure: bool,
}

impl LockerConfig {
    /// Create a configuration for the given host, with no key and TLS
    /// verification enabled.
    ///
    /// The host may carry an `http://` or `https://` scheme; without one,
    /// `https://` is assumed.
    pub fn new(host: impl Into<String>) -> Result<Self, Error> {
        let host = host.into();
        if host.is_empty() {
            return Err(Error::MissingHost);
        }

        Ok(Self {
            host,
            key: None,
            insecure: false,
        })
    }

    /// Set the API key sent as `X-API-KEY`.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Disable TLS certificate verification for clients built from this
    /// configuration.
    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// Build a configuration from explicit values, falling back to
    /// [`HOST_ENV`] and [`KEY_ENV`] for whatever is missing.
    pub fn resolve(
        host: Option<String>,
        key: Option<String>,
        insecure: bool,
    ) -> Result<Self, Error> {
        Self::resolve_with(host, key, insecure, |name| std::env::var(name).ok())
    }

    /// Same as [`LockerConfig::resolve`], reading fallbacks through `lookup`.
    pub fn resolve_with<F>(
        host: Option<String>,
        key: Option<String>,
        insecure: bool,
        lookup: F,
    ) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = host
            .filter(|h| !h.is_empty())
            .or_else(|| lookup(HOST_ENV))
            .ok_or(Error::MissingHost)?;
        let key = key.or_else(|| lookup(KEY_ENV)).filter(|k| !k.is_empty());

        let config = Self::new(host)?.insecure(insecure);
        Ok(match key {
            Some(key) => config.with_key(key),
            None => config,
        })
    }

    /// Configuration taken entirely from the environment.
    pub fn from_env() -> Result<Self, Error> {
        Self::resolve(None, None, false)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn is_insecure(&self) -> bool {
        self.insecure
    }

    /// The server root URL, e.g. `https://locker.example.com/`.
    pub fn base_url(&self) -> Result<Url, Error> {
        if self.host.starts_with("http://") || self.host.starts_with("https://") {
            Ok(Url::parse(&self.host)?)
        } else {
            Ok(Url::parse(&format!("https://{}", self.host))?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn bare_host_defaults_to_https() {
        let config = LockerConfig::new("example.com").unwrap();
        assert_eq!(config.base_url().unwrap().as_str(), "https://example.com/");
    }

    #[test]
    fn explicit_scheme_is_kept() {
        let config = LockerConfig::new("http://example.com").unwrap();
        assert_eq!(config.base_url().unwrap().as_str(), "http://example.com/");

        let config = LockerConfig::new("https://example.com:8443").unwrap();
        assert_eq!(
            config.base_url().unwrap().as_str(),
            "https://example.com:8443/"
        );
    }

    #[test]
    fn empty_host_is_rejected() {
        assert!(matches!(LockerConfig::new(""), Err(Error::MissingHost)));
    }

    #[test]
    fn explicit_values_win_over_environment() {
        let config = LockerConfig::resolve_with(
            Some("explicit.example.com".to_string()),
            Some("explicit-key".to_string()),
            false,
            env(&[(HOST_ENV, "env.example.com"), (KEY_ENV, "env-key")]),
        )
        .unwrap();

        assert_eq!(config.host(), "explicit.example.com");
        assert_eq!(config.key(), Some("explicit-key"));
    }

    #[test]
    fn environment_fills_in_missing_values() {
        let config = LockerConfig::resolve_with(
            None,
            None,
            true,
            env(&[(HOST_ENV, "env.example.com"), (KEY_ENV, "env-key")]),
        )
        .unwrap();

        assert_eq!(config.host(), "env.example.com");
        assert_eq!(config.key(), Some("env-key"));
        assert!(config.is_insecure());
    }

    #[test]
    fn missing_host_everywhere_fails() {
        let result = LockerConfig::resolve_with(None, Some("k".to_string()), false, env(&[]));
        assert!(matches!(result, Err(Error::MissingHost)));

        let result =
            LockerConfig::resolve_with(Some(String::new()), None, false, env(&[(KEY_ENV, "k")]));
        assert!(matches!(result, Err(Error::MissingHost)));
    }

    #[test]
    fn key_is_optional() {
        let config =
            LockerConfig::resolve_with(None, None, false, env(&[(HOST_ENV, "h.example.com")]))
                .unwrap();
        assert_eq!(config.key(), None);
    }
}
