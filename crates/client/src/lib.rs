//! Client code for garanti.
//!
//! This crate provides the two lookup sources (the HTML certificate site and
//! the JSON device registry), the HTTP fetch layer they share, and the
//! resolver that runs a serial through cache, sources and fallbacks.

pub mod certificate;
pub mod fetch;
pub mod registry;
pub mod resolver;

pub use certificate::{CertificateClient, CertificateVerdict, DeviceAttributes, parse_certificate_page};
pub use fetch::{FetchClient, FetchConfig, FetchError, FetchResponse};
pub use registry::{RegistryClient, RegistryError, RegistryVerdict};
pub use resolver::{CertificateSource, Outcome, RegistrySource, Resolution, Resolver};
