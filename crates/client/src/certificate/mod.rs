//! Source A: the HTML warranty-certificate site.
//!
//! A GET on `<base><serial>` returns a page that either states the device is
//! covered or does not. Covered pages carry brand, model and color, laid out
//! either as label/value rows or as a flat grid.

pub mod parse;

pub use parse::{CertificateVerdict, DeviceAttributes, parse_certificate_page};

use garanti_core::{AppConfig, Error, SerialNumber, WarrantyResult, result::MODEL_NOT_FOUND_MESSAGE};

use crate::fetch::{FetchClient, FetchConfig, FetchError, certificate_url};

/// Client for the certificate site.
#[derive(Debug, Clone)]
pub struct CertificateClient {
    fetch: FetchClient,
    base_url: String,
}

impl CertificateClient {
    pub fn new(base_url: impl Into<String>, config: FetchConfig) -> Result<Self, Error> {
        Ok(Self { fetch: FetchClient::new(config)?, base_url: base_url.into() })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        Self::new(config.certificate_base_url.clone(), FetchConfig::from(config))
    }

    /// Fetch and parse the certificate page for `serial`.
    pub async fn check(&self, serial: &SerialNumber) -> Result<CertificateVerdict, FetchError> {
        let url = certificate_url(&self.base_url, serial).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        let response = self.fetch.get_text(&url).await?;
        let verdict = parse_certificate_page(&response.body);

        tracing::debug!(
            serial = %serial,
            covered = matches!(verdict, CertificateVerdict::InWarranty(_)),
            fetch_ms = response.fetch_ms,
            "certificate page parsed"
        );
        Ok(verdict)
    }
}

impl DeviceAttributes {
    /// Build the green result shown for a covered device.
    ///
    /// Without a model the fixed "check the device" message is shown and
    /// nothing is offered for copying.
    pub fn into_result(self) -> WarrantyResult {
        let upper = |v: Option<String>| v.map(|s| s.to_uppercase());
        let (brand, model, color) = (upper(self.brand), upper(self.model), upper(self.color));

        if model.is_none() {
            return WarrantyResult::certificate(MODEL_NOT_FOUND_MESSAGE, None);
        }

        let display = join([&brand, &model, &color]);
        let copy_model = Some(join([&model, &color])).filter(|s| !s.is_empty());
        WarrantyResult::certificate(display, copy_model)
    }
}

fn join<const N: usize>(parts: [&Option<String>; N]) -> String {
    parts.into_iter().flatten().map(String::as_str).collect::<Vec<_>>().join(" - ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use garanti_core::{ColorTag, WarrantyStatus};
    use httpmock::prelude::*;
    use std::time::Duration;

    fn attrs(brand: Option<&str>, model: Option<&str>, color: Option<&str>) -> DeviceAttributes {
        DeviceAttributes {
            brand: brand.map(str::to_string),
            model: model.map(str::to_string),
            color: color.map(str::to_string),
        }
    }

    #[test]
    fn test_full_attributes() {
        let result = attrs(Some("Xiaomi"), Some("S8"), Some("White")).into_result();
        assert_eq!(result.display_info, "XIAOMI - S8 - WHITE");
        assert_eq!(result.copy_model_payload.as_deref(), Some("S8 - WHITE"));
        assert_eq!(result.color, ColorTag::Green);
        assert_eq!(result.status, WarrantyStatus::CertificateInWarranty);
        assert!(result.copy_date_payload.is_none());
    }

    #[test]
    fn test_missing_color() {
        let result = attrs(None, Some("q7 max"), None).into_result();
        assert_eq!(result.display_info, "Q7 MAX");
        assert_eq!(result.copy_model_payload.as_deref(), Some("Q7 MAX"));
    }

    #[test]
    fn test_missing_model() {
        let result = attrs(Some("Xiaomi"), None, Some("White")).into_result();
        assert_eq!(result.display_info, MODEL_NOT_FOUND_MESSAGE);
        assert!(result.copy_model_payload.is_none());
        assert_eq!(result.color, ColorTag::Green);
    }

    fn client_for(server: &MockServer) -> CertificateClient {
        let config = FetchConfig { timeout: Duration::from_millis(500), backoff: Duration::from_millis(1), ..Default::default() };
        CertificateClient::new(server.url("/sorgu/"), config).unwrap()
    }

    #[tokio::test]
    async fn test_check_in_warranty_page() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/sorgu/RABCDEFGHIJKLM");
            then.status(200).body(
                r#"<div class="bg-emerald-100">Garanti Kapsamındadır</div>
                   <div><div>Marka</div><div>Xiaomi</div></div>
                   <div><div>Model</div><div>S8</div></div>
                   <div><div>Renk</div><div>White</div></div>"#,
            );
        });

        let serial = SerialNumber::parse("RABCDEFGHIJKLM").unwrap();
        let verdict = client_for(&server).check(&serial).await.unwrap();

        mock.assert();
        let CertificateVerdict::InWarranty(attributes) = verdict else {
            panic!("expected coverage");
        };
        assert_eq!(attributes.into_result().display_info, "XIAOMI - S8 - WHITE");
    }

    #[tokio::test]
    async fn test_check_status_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/sorgu/RABCDEFGHIJKLM");
            then.status(404);
        });

        let serial = SerialNumber::parse("RABCDEFGHIJKLM").unwrap();
        let result = client_for(&server).check(&serial).await;
        assert!(matches!(result, Err(FetchError::Status(404))));
    }
}
