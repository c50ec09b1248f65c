//! Source B: the JSON device registry.
//!
//! The registry answers `GET <base>?imeiNo=<serial>` with
//! `{IsSucceeded, ResultData: [{DESCRIPTION, WARRANTYEND}]}`. By default the
//! request goes through the system `curl`; a native reqwest transport can be
//! selected instead.

pub mod command;
pub mod error;
pub mod response;

pub use command::CurlCommand;
pub use error::RegistryError;
pub use response::{DeviceRecord, RegistryVerdict, copy_model_label, parse_registry_body};

use std::path::PathBuf;
use std::time::{Duration, Instant};

use reqwest::header;

use garanti_core::{AppConfig, Error, RegistryTransport, SerialNumber};

use crate::fetch::registry_url;

#[derive(Debug, Clone)]
enum Transport {
    Curl(CurlCommand),
    Native(reqwest::Client),
}

/// Device registry client.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    transport: Transport,
    base_url: String,
}

impl RegistryClient {
    /// Registry lookups through the `curl` executable at `program`.
    pub fn curl(
        base_url: impl Into<String>, program: impl Into<PathBuf>, user_agent: &str, timeout: Duration,
    ) -> Self {
        Self { transport: Transport::Curl(CurlCommand::new(program, user_agent, timeout)), base_url: base_url.into() }
    }

    /// Registry lookups over in-process HTTPS, TLS 1.2 or newer.
    pub fn native(base_url: impl Into<String>, user_agent: &str, timeout: Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .use_rustls_tls()
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            .redirect(reqwest::redirect::Policy::limited(10))
            .gzip(true)
            .build()
            .map_err(|e| Error::HttpClient(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { transport: Transport::Native(http), base_url: base_url.into() })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        match config.registry_transport {
            RegistryTransport::Curl => Ok(Self::curl(
                config.registry_base_url.clone(),
                config.curl_path.clone(),
                &config.user_agent,
                config.registry_timeout(),
            )),
            RegistryTransport::Native => {
                Self::native(config.registry_base_url.clone(), &config.user_agent, config.registry_timeout())
            }
        }
    }

    /// Look `serial` up in the registry.
    pub async fn lookup(&self, serial: &SerialNumber) -> Result<RegistryVerdict, RegistryError> {
        let url = registry_url(&self.base_url, serial).map_err(|e| RegistryError::InvalidUrl(e.to_string()))?;
        let start = Instant::now();

        let body = match &self.transport {
            Transport::Curl(curl) => curl.get(url.as_str()).await?,
            Transport::Native(http) => native_get(http, url).await?,
        };

        let verdict = parse_registry_body(&body)?;
        tracing::debug!(
            serial = %serial,
            found = matches!(verdict, RegistryVerdict::InWarranty(_)),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "registry lookup finished"
        );
        Ok(verdict)
    }
}

async fn native_get(http: &reqwest::Client, url: url::Url) -> Result<Vec<u8>, RegistryError> {
    let response = http.get(url).header(header::ACCEPT, "application/json").send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(RegistryError::HttpStatus(status.as_u16()));
    }

    Ok(response.bytes().await?.to_vec())
}
