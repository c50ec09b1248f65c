//! Lookup URL construction for both sources.

use garanti_core::{Error, SerialNumber};

fn parse_base(base: &str) -> Result<url::Url, Error> {
    let parsed = url::Url::parse(base.trim()).map_err(|e| Error::InvalidUrl(format!("{base}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(Error::InvalidUrl(format!("unsupported scheme: {scheme}"))),
    }
}

/// `<base>/<serial>`: the serial becomes the last path segment.
///
/// A trailing slash on the base is optional.
pub fn certificate_url(base: &str, serial: &SerialNumber) -> Result<url::Url, Error> {
    let mut url = parse_base(base)?;
    url.path_segments_mut()
        .map_err(|()| Error::InvalidUrl(format!("{base}: cannot be a base")))?
        .pop_if_empty()
        .push(serial.as_str());
    Ok(url)
}

/// `<base>?imeiNo=<serial>`. Other query parameters on the base are kept.
pub fn registry_url(base: &str, serial: &SerialNumber) -> Result<url::Url, Error> {
    let mut url = parse_base(base)?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "imeiNo")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    {
        let mut query = url.query_pairs_mut();
        query.clear();
        for (k, v) in &kept {
            query.append_pair(k, v);
        }
        query.append_pair("imeiNo", serial.as_str());
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serial() -> SerialNumber {
        SerialNumber::parse("RABCDEFGHIJKLM").unwrap()
    }

    #[test]
    fn test_certificate_url_with_trailing_slash() {
        let url = certificate_url("https://garantibelgesi.recciteknoloji.com/sorgu/", &serial()).unwrap();
        assert_eq!(url.as_str(), "https://garantibelgesi.recciteknoloji.com/sorgu/RABCDEFGHIJKLM");
    }

    #[test]
    fn test_certificate_url_without_trailing_slash() {
        let url = certificate_url("http://127.0.0.1:8080/sorgu", &serial()).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/sorgu/RABCDEFGHIJKLM");
    }

    #[test]
    fn test_registry_url() {
        let url = registry_url("https://guvencesorgula.kvkteknikservis.com/api/device-data", &serial()).unwrap();
        assert_eq!(url.as_str(), "https://guvencesorgula.kvkteknikservis.com/api/device-data?imeiNo=RABCDEFGHIJKLM");
    }

    #[test]
    fn test_registry_url_replaces_empty_imei() {
        let url = registry_url("https://example.com/api?imeiNo=", &serial()).unwrap();
        assert_eq!(url.query(), Some("imeiNo=RABCDEFGHIJKLM"));

        let url = registry_url("https://example.com/api?lang=tr", &serial()).unwrap();
        assert_eq!(url.query(), Some("lang=tr&imeiNo=RABCDEFGHIJKLM"));
    }

    #[test]
    fn test_invalid_base() {
        assert!(matches!(certificate_url("not a url", &serial()), Err(Error::InvalidUrl(_))));
        assert!(matches!(registry_url("file:///tmp/x", &serial()), Err(Error::InvalidUrl(_))));
    }
}
