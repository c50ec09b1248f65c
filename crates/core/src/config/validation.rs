//! Configuration validation rules.
//!
//! Checked after `AppConfig` has been loaded from environment, files, or
//! defaults.

use crate::config::AppConfig;
use thiserror::Error;

const MIN_TIMEOUT_MS: u64 = 100;
const MAX_TIMEOUT_MS: u64 = 300_000;
const MAX_CAPACITY: usize = 100_000;
const MAX_RETRIES: u32 = 10;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

fn check_timeout(field: &str, value: u64) -> Result<(), ConfigError> {
    if value < MIN_TIMEOUT_MS {
        return Err(invalid(field, "must be at least 100ms"));
    }
    if value > MAX_TIMEOUT_MS {
        return Err(invalid(field, "must not exceed 5 minutes (300000ms)"));
    }
    Ok(())
}

fn check_base_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(value).map_err(|e| invalid(field, e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(field, format!("unsupported scheme '{other}'"))),
    }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_timeout("certificate_timeout_ms", self.certificate_timeout_ms)?;
        check_timeout("registry_timeout_ms", self.registry_timeout_ms)?;

        if self.user_agent.trim().is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        check_base_url("certificate_base_url", &self.certificate_base_url)?;
        check_base_url("registry_base_url", &self.registry_base_url)?;

        if self.cache_ttl_hours == 0 {
            return Err(invalid("cache_ttl_hours", "must be greater than 0"));
        }
        if self.cache_capacity == 0 || self.cache_capacity > MAX_CAPACITY {
            return Err(invalid("cache_capacity", "must be between 1 and 100000"));
        }

        if self.max_retries > MAX_RETRIES {
            return Err(invalid("max_retries", "must not exceed 10"));
        }

        if let Some(bad) = self
            .special_prefixes
            .iter()
            .find(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_alphanumeric()))
        {
            return Err(invalid("special_prefixes", format!("'{bad}' is not an alphanumeric prefix")));
        }

        if self.curl_path.as_os_str().is_empty() {
            return Err(invalid("curl_path", "must not be empty"));
        }

        if !self.cache_errors {
            tracing::debug!("error results will not be cached");
        }

        Ok(())
    }
}
