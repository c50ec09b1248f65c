//! Lookup sources consulted by the resolver.

use async_trait::async_trait;

use garanti_core::SerialNumber;

use crate::certificate::{CertificateClient, CertificateVerdict};
use crate::fetch::FetchError;
use crate::registry::{RegistryClient, RegistryError, RegistryVerdict};

/// Source A: reports coverage with device attributes, or no coverage.
#[async_trait]
pub trait CertificateSource: Send + Sync {
    async fn check(&self, serial: &SerialNumber) -> Result<CertificateVerdict, FetchError>;
}

/// Source B: reports a device record, or no data.
#[async_trait]
pub trait RegistrySource: Send + Sync {
    async fn lookup(&self, serial: &SerialNumber) -> Result<RegistryVerdict, RegistryError>;
}

#[async_trait]
impl CertificateSource for CertificateClient {
    async fn check(&self, serial: &SerialNumber) -> Result<CertificateVerdict, FetchError> {
        CertificateClient::check(self, serial).await
    }
}

#[async_trait]
impl RegistrySource for RegistryClient {
    async fn lookup(&self, serial: &SerialNumber) -> Result<RegistryVerdict, RegistryError> {
        RegistryClient::lookup(self, serial).await
    }
}
