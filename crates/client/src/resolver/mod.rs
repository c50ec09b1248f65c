//! Resolution pipeline: cache, certificate site, special prefixes, registry.
//!
//! ### States
//! - `CacheCheck`: an unexpired entry is returned without network access.
//! - `SourceA`: coverage ends the lookup (green); a transport failure ends it
//!   with an error result; no coverage moves on.
//! - `SpecialCase`: configured serial prefixes are covered without asking
//!   the registry.
//! - `SourceB`: a record ends the lookup (blue); a fatal failure ends it with
//!   an error result; a soft failure reads as "no data".
//! - `NotFound`: neither source reported coverage (red).
//!
//! Every terminal state except the cache hit writes its result through to
//! the cache once. A per-serial lock keeps concurrent callers for the same
//! serial from querying the sources twice; the second caller is served from
//! the cache.

mod inflight;
pub mod sources;

pub use sources::{CertificateSource, RegistrySource};

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use garanti_core::{AppConfig, Error, ResultCache, SerialNumber, WarrantyResult, extract_serial, result::ERROR_TITLE};

use crate::certificate::{CertificateClient, CertificateVerdict};
use crate::fetch::FetchError;
use crate::registry::{RegistryClient, RegistryError, RegistryVerdict};
use inflight::InflightLocks;

/// Prefixes covered without a registry lookup unless configured otherwise.
pub const DEFAULT_SPECIAL_PREFIXES: [&str; 2] = ["RCCVBY", "RCFVBY"];

const CERTIFICATE_TIMEOUT_MESSAGE: &str = "Sorgu zaman aşımına uğradı.";
const CURL_MISSING_MESSAGE: &str = "curl komutu sistemde bulunamadı.";
const REGISTRY_TIMEOUT_MESSAGE: &str = "KVK sorgusu zaman aşımına uğradı.";

/// Terminal state that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    CacheHit,
    Certificate,
    SpecialCase,
    Registry,
    NotFound,
    Error,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::CacheHit => "cache_hit",
            Outcome::Certificate => "certificate",
            Outcome::SpecialCase => "special_case",
            Outcome::Registry => "registry",
            Outcome::NotFound => "not_found",
            Outcome::Error => "error",
        }
    }
}

/// A resolved serial.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub serial: SerialNumber,
    pub result: WarrantyResult,
    pub outcome: Outcome,
}

/// Warranty resolver.
pub struct Resolver {
    certificate: Arc<dyn CertificateSource>,
    registry: Arc<dyn RegistrySource>,
    cache: Arc<Mutex<ResultCache>>,
    inflight: InflightLocks,
    special_prefixes: Vec<String>,
    cache_errors: bool,
}

impl Resolver {
    pub fn new(
        certificate: impl CertificateSource + 'static, registry: impl RegistrySource + 'static, cache: ResultCache,
    ) -> Self {
        Self {
            certificate: Arc::new(certificate),
            registry: Arc::new(registry),
            cache: Arc::new(Mutex::new(cache)),
            inflight: InflightLocks::default(),
            special_prefixes: DEFAULT_SPECIAL_PREFIXES.iter().map(|p| p.to_string()).collect(),
            cache_errors: true,
        }
    }

    /// Build the production resolver: both HTTP clients and the file-backed
    /// cache described by `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let certificate = CertificateClient::from_config(config)?;
        let registry = RegistryClient::from_config(config)?;
        let cache = ResultCache::load(config.cache_path.clone(), config.cache_policy());

        tracing::info!(
            cache_path = %config.cache_path.display(),
            cached = cache.len(),
            transport = ?config.registry_transport,
            "resolver ready"
        );

        Ok(Self::new(certificate, registry, cache)
            .with_special_prefixes(config.special_prefixes.clone())
            .with_cache_errors(config.cache_errors))
    }

    pub fn with_special_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.special_prefixes = prefixes;
        self
    }

    /// When false, error results are returned but not cached.
    pub fn with_cache_errors(mut self, cache_errors: bool) -> Self {
        self.cache_errors = cache_errors;
        self
    }

    /// Shared handle to the result cache.
    pub fn cache(&self) -> &Arc<Mutex<ResultCache>> {
        &self.cache
    }

    pub async fn resolve(&self, serial: &SerialNumber) -> WarrantyResult {
        self.resolve_detailed(serial).await.result
    }

    /// Find a serial in `text` and resolve it.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the text contains no serial number.
    pub async fn resolve_text(&self, text: &str) -> Result<Resolution, Error> {
        let serial =
            extract_serial(text).ok_or_else(|| Error::InvalidInput("no serial number found in text".into()))?;
        Ok(self.resolve_detailed(&serial).await)
    }

    /// Resolve `serial` and report which state produced the result.
    pub async fn resolve_detailed(&self, serial: &SerialNumber) -> Resolution {
        let _inflight = self.inflight.acquire(serial.as_str()).await;

        let cached = self.cache.lock().await.get(serial.as_str()).cloned();
        if let Some(entry) = cached {
            tracing::debug!(serial = %serial, cached_at = %entry.timestamp, "cache hit");
            return Resolution { serial: serial.clone(), result: entry.result, outcome: Outcome::CacheHit };
        }

        let (result, outcome) = self.lookup(serial).await;
        self.record(serial, &result).await;

        tracing::info!(serial = %serial, outcome = ?outcome, info = %result.display_info, "resolved");
        Resolution { serial: serial.clone(), result, outcome }
    }

    async fn lookup(&self, serial: &SerialNumber) -> (WarrantyResult, Outcome) {
        match self.certificate.check(serial).await {
            Ok(CertificateVerdict::InWarranty(attributes)) => return (attributes.into_result(), Outcome::Certificate),
            Ok(CertificateVerdict::NotInWarranty) => {}
            Err(err) => {
                tracing::warn!(serial = %serial, error = %err, "certificate lookup failed");
                return (certificate_failure(&err), Outcome::Error);
            }
        }

        if serial.has_any_prefix(&self.special_prefixes) {
            return (WarrantyResult::special_case(), Outcome::SpecialCase);
        }

        match self.registry.lookup(serial).await {
            Ok(RegistryVerdict::InWarranty(record)) => (record.into_result(), Outcome::Registry),
            Ok(RegistryVerdict::NoData) => (WarrantyResult::not_found(), Outcome::NotFound),
            Err(err) if err.is_fatal() => {
                tracing::warn!(serial = %serial, error = %err, "registry lookup failed");
                (registry_failure(&err), Outcome::Error)
            }
            Err(err) => {
                tracing::debug!(serial = %serial, error = %err, "registry failure read as no data");
                (WarrantyResult::not_found(), Outcome::NotFound)
            }
        }
    }

    async fn record(&self, serial: &SerialNumber, result: &WarrantyResult) {
        if result.is_error() && !self.cache_errors {
            tracing::debug!(serial = %serial, "error result not cached");
            return;
        }
        self.cache.lock().await.put(serial.as_str(), result.clone());
    }
}

fn certificate_failure(err: &FetchError) -> WarrantyResult {
    if err.is_timeout() {
        WarrantyResult::error(ERROR_TITLE, CERTIFICATE_TIMEOUT_MESSAGE)
    } else {
        WarrantyResult::error(ERROR_TITLE, format!("Sorgu hatası: {err}"))
    }
}

fn registry_failure(err: &RegistryError) -> WarrantyResult {
    match err {
        RegistryError::ToolMissing(_) => WarrantyResult::error(ERROR_TITLE, CURL_MISSING_MESSAGE),
        RegistryError::Timeout => WarrantyResult::error("", REGISTRY_TIMEOUT_MESSAGE),
        other => WarrantyResult::error(ERROR_TITLE, format!("Beklenmeyen bir hata oluştu: {other}")),
    }
}
