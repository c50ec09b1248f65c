//! Application configuration with layered loading.
//!
//! Sources, highest wins:
//!
//! 1. Environment variables (GARANTI_*)
//! 2. TOML config file (if GARANTI_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::CachePolicy;

mod validation;

pub use validation::ConfigError;

/// How Source B (the device registry) is reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryTransport {
    /// Spawn the system `curl` binary. The registry only negotiates well with it.
    #[default]
    Curl,
    /// In-process HTTPS via reqwest.
    Native,
}

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the JSON result cache.
    ///
    /// Set via GARANTI_CACHE_PATH environment variable.
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,

    /// Path to the JSON device notes file.
    #[serde(default = "default_notes_path")]
    pub notes_path: PathBuf,

    /// Source A lookup base; the serial is appended as the last path segment.
    #[serde(default = "default_certificate_base_url")]
    pub certificate_base_url: String,

    /// Source B lookup base; the serial is appended to the `imeiNo` query.
    #[serde(default = "default_registry_base_url")]
    pub registry_base_url: String,

    /// User-Agent string for both sources.
    ///
    /// Set via GARANTI_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_certificate_timeout_ms")]
    pub certificate_timeout_ms: u64,

    #[serde(default = "default_registry_timeout_ms")]
    pub registry_timeout_ms: u64,

    /// Source A retries on 429/5xx and connection failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay for exponential retry backoff.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    #[serde(default)]
    pub registry_transport: RegistryTransport,

    /// `curl` executable, looked up on PATH when not absolute.
    #[serde(default = "default_curl_path")]
    pub curl_path: PathBuf,

    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: u64,

    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Store error results too. A cached error suppresses retries until it
    /// expires.
    #[serde(default = "default_true")]
    pub cache_errors: bool,

    /// Serial prefixes answered with the fixed special-case result.
    ///
    /// Set via GARANTI_SPECIAL_PREFIXES environment variable (comma-separated).
    #[serde(default = "default_special_prefixes", deserialize_with = "string_list")]
    pub special_prefixes: Vec<String>,
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("warranty_cache.json")
}

fn default_notes_path() -> PathBuf {
    PathBuf::from("device_notes.json")
}

fn default_certificate_base_url() -> String {
    "https://garantibelgesi.recciteknoloji.com/sorgu/".into()
}

fn default_registry_base_url() -> String {
    "https://guvencesorgula.kvkteknikservis.com/api/device-data".into()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into()
}

fn default_certificate_timeout_ms() -> u64 {
    8_000
}

fn default_registry_timeout_ms() -> u64 {
    10_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    300
}

fn default_curl_path() -> PathBuf {
    PathBuf::from("curl")
}

fn default_cache_ttl_hours() -> u64 {
    crate::cache::store::DEFAULT_TTL_HOURS
}

fn default_cache_capacity() -> usize {
    crate::cache::store::DEFAULT_CAPACITY
}

fn default_true() -> bool {
    true
}

fn default_special_prefixes() -> Vec<String> {
    vec!["RCCVBY".into(), "RCFVBY".into()]
}

/// Accept either a list or a comma-separated string, so the env provider can
/// carry lists.
fn string_list<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Joined(String),
    }

    let items = match Raw::deserialize(deserializer)? {
        Raw::List(items) => items,
        Raw::Joined(joined) => joined.split(',').map(str::to_string).collect(),
    };
    Ok(items.into_iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_path: default_cache_path(),
            notes_path: default_notes_path(),
            certificate_base_url: default_certificate_base_url(),
            registry_base_url: default_registry_base_url(),
            user_agent: default_user_agent(),
            certificate_timeout_ms: default_certificate_timeout_ms(),
            registry_timeout_ms: default_registry_timeout_ms(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            registry_transport: RegistryTransport::default(),
            curl_path: default_curl_path(),
            cache_ttl_hours: default_cache_ttl_hours(),
            cache_capacity: default_cache_capacity(),
            cache_errors: true,
            special_prefixes: default_special_prefixes(),
        }
    }
}

impl AppConfig {
    pub fn certificate_timeout(&self) -> Duration {
        Duration::from_millis(self.certificate_timeout_ms)
    }

    pub fn registry_timeout(&self) -> Duration {
        Duration::from_millis(self.registry_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy::new(self.cache_ttl_hours, self.cache_capacity)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file or environment cannot be
    /// parsed, or if validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("GARANTI_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("GARANTI_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        Self::extract(figment)
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.cache_path, PathBuf::from("warranty_cache.json"));
        assert_eq!(config.notes_path, PathBuf::from("device_notes.json"));
        assert_eq!(config.certificate_timeout(), Duration::from_secs(8));
        assert_eq!(config.registry_timeout(), Duration::from_secs(10));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_backoff(), Duration::from_millis(300));
        assert_eq!(config.registry_transport, RegistryTransport::Curl);
        assert!(config.cache_errors);
        assert_eq!(config.special_prefixes, vec!["RCCVBY", "RCFVBY"]);
    }

    #[test]
    fn test_cache_policy_from_config() {
        let config = AppConfig { cache_ttl_hours: 2, cache_capacity: 5, ..Default::default() };
        let policy = config.cache_policy();
        assert_eq!(policy.ttl, TimeDelta::hours(2));
        assert_eq!(policy.capacity, 5);
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let toml = r#"
            registry_transport = "native"
            cache_capacity = 10
            special_prefixes = ["RXX"]
        "#;
        let figment = Figment::from(Serialized::defaults(AppConfig::default())).merge(Toml::string(toml));
        let config = AppConfig::extract(figment).unwrap();

        assert_eq!(config.registry_transport, RegistryTransport::Native);
        assert_eq!(config.cache_capacity, 10);
        assert_eq!(config.special_prefixes, vec!["RXX"]);
    }

    #[test]
    fn test_comma_separated_prefixes() {
        let toml = r#"special_prefixes = "RAAA, RBBB,""#;
        let figment = Figment::from(Serialized::defaults(AppConfig::default())).merge(Toml::string(toml));
        let config = AppConfig::extract(figment).unwrap();
        assert_eq!(config.special_prefixes, vec!["RAAA", "RBBB"]);
    }

    #[test]
    fn test_invalid_values_fail_load() {
        let figment =
            Figment::from(Serialized::defaults(AppConfig::default())).merge(Toml::string("cache_capacity = 0"));
        let result = AppConfig::extract(figment);
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "cache_capacity"));
    }

    #[test]
    fn test_unknown_transport_fails_load() {
        let figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::string(r#"registry_transport = "carrier-pigeon""#));
        assert!(matches!(AppConfig::extract(figment), Err(ConfigError::LoadFailed(_))));
    }
}
