//! Registry response types and normalization.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use garanti_core::WarrantyResult;

use super::RegistryError;

static BRAND_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)ROBOROCK|ROBOT SÜPÜRGE").expect("brand pattern is valid"));

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Raw registry response.
#[derive(Debug, Deserialize)]
pub struct RegistryResponse {
    #[serde(rename = "IsSucceeded", default)]
    pub is_succeeded: Value,
    #[serde(rename = "ResultData", default)]
    pub result_data: Value,
}

/// One device row.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct DeviceRecord {
    #[serde(rename = "DESCRIPTION", default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(rename = "WARRANTYEND", default, deserialize_with = "lenient_string")]
    pub warranty_end: String,
}

/// What the registry says about the serial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryVerdict {
    InWarranty(DeviceRecord),
    NoData,
}

fn lenient_string<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

impl RegistryResponse {
    fn succeeded(&self) -> bool {
        match &self.is_succeeded {
            Value::Number(n) => n.as_f64() == Some(1.0),
            Value::Bool(b) => *b,
            _ => false,
        }
    }

    /// The first record, when the call succeeded and the record has a usable
    /// description.
    pub fn into_verdict(self) -> RegistryVerdict {
        if !self.succeeded() {
            return RegistryVerdict::NoData;
        }

        let Value::Array(rows) = self.result_data else {
            return RegistryVerdict::NoData;
        };
        let Some(first) = rows.into_iter().next() else {
            return RegistryVerdict::NoData;
        };

        if !first.is_object() {
            return RegistryVerdict::NoData;
        }
        match serde_json::from_value::<DeviceRecord>(first) {
            Ok(record) if has_data(&record.description) => RegistryVerdict::InWarranty(record),
            _ => RegistryVerdict::NoData,
        }
    }
}

fn has_data(description: &str) -> bool {
    !description.is_empty() && !description.to_lowercase().contains("no data found")
}

/// Parse a raw response body. Valid JSON that is not an object carries no data.
pub fn parse_registry_body(body: &[u8]) -> Result<RegistryVerdict, RegistryError> {
    let text = std::str::from_utf8(body).map_err(|e| RegistryError::InvalidJson(e.to_string()))?;
    let value: Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Ok(RegistryVerdict::NoData);
    }
    let response: RegistryResponse = serde_json::from_value(value)?;
    Ok(response.into_verdict())
}

/// Model label for copying: brand words stripped, whitespace collapsed, then
/// `PREFIX - SUFFIX` split at the last space, uppercased.
pub fn copy_model_label(description: &str) -> Option<String> {
    let stripped = BRAND_WORDS.replace_all(description, "");
    let collapsed = WHITESPACE.replace_all(&stripped, " ");
    let cleaned = collapsed.trim();

    if cleaned.is_empty() {
        return None;
    }

    Some(match cleaned.rsplit_once(' ') {
        Some((prefix, suffix)) => format!("{} - {}", prefix.to_uppercase(), suffix.to_uppercase()),
        None => cleaned.to_uppercase(),
    })
}

impl DeviceRecord {
    /// Build the blue result for a registry hit.
    pub fn into_result(self) -> WarrantyResult {
        let display = format!("{}\nBitiş: {}", self.description, self.warranty_end);
        let copy_model = copy_model_label(&self.description);
        let copy_date = Some(self.warranty_end).filter(|d| !d.is_empty());
        WarrantyResult::registry(display, copy_model, copy_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garanti_core::{ColorTag, WarrantyStatus};

    fn verdict(json: &str) -> RegistryVerdict {
        parse_registry_body(json.as_bytes()).unwrap()
    }

    #[test]
    fn test_success() {
        let v = verdict(r#"{"IsSucceeded":1,"ResultData":[{"DESCRIPTION":"ROBOROCK S7 MaxV","WARRANTYEND":"2025-01-01"}]}"#);
        let RegistryVerdict::InWarranty(record) = v else {
            panic!("expected a record");
        };
        assert_eq!(record.description, "ROBOROCK S7 MaxV");
        assert_eq!(record.warranty_end, "2025-01-01");
    }

    #[test]
    fn test_true_counts_as_success() {
        let v = verdict(r#"{"IsSucceeded":true,"ResultData":[{"DESCRIPTION":"Q7","WARRANTYEND":""}]}"#);
        assert!(matches!(v, RegistryVerdict::InWarranty(_)));
    }

    #[test]
    fn test_no_data_cases() {
        let cases = [
            r#"{"IsSucceeded":0,"ResultData":[{"DESCRIPTION":"S7"}]}"#,
            r#"{"IsSucceeded":1,"ResultData":[]}"#,
            r#"{"IsSucceeded":1,"ResultData":null}"#,
            r#"{"IsSucceeded":1,"ResultData":{"DESCRIPTION":"S7"}}"#,
            r#"{"IsSucceeded":1,"ResultData":[{"DESCRIPTION":""}]}"#,
            r#"{"IsSucceeded":1,"ResultData":[{"DESCRIPTION":"No Data Found"}]}"#,
            r#"{"IsSucceeded":1,"ResultData":["text"]}"#,
            r#"{}"#,
            r#"{"IsSucceeded":1,"ResultData":[["ROBOROCK S7","2025-01-01"]]}"#,
            r#"[1, [{"DESCRIPTION":"ROBOROCK S7","WARRANTYEND":"2025-01-01"}]]"#,
            r#"[{"IsSucceeded":1,"ResultData":[{"DESCRIPTION":"S7"}]}]"#,
            r#""IsSucceeded""#,
            r#"null"#,
        ];
        for case in cases {
            assert_eq!(verdict(case), RegistryVerdict::NoData, "{case}");
        }
    }

    #[test]
    fn test_invalid_bodies() {
        assert!(matches!(parse_registry_body(b"<html>"), Err(RegistryError::InvalidJson(_))));
        assert!(matches!(parse_registry_body(&[0xff, 0xfe]), Err(RegistryError::InvalidJson(_))));
    }

    #[test]
    fn test_copy_model_label() {
        assert_eq!(copy_model_label("ROBOROCK S7 MaxV").as_deref(), Some("S7 - MAXV"));
        assert_eq!(copy_model_label("Roborock Robot Süpürge  Q7   Max").as_deref(), Some("Q7 - MAX"));
        assert_eq!(copy_model_label("ROBOROCK Q5").as_deref(), Some("Q5"));
        assert_eq!(copy_model_label("ROBOROCK"), None);
    }

    #[test]
    fn test_into_result() {
        let record = DeviceRecord { description: "ROBOROCK S7 MaxV".into(), warranty_end: "2025-01-01".into() };
        let result = record.into_result();
        assert_eq!(result.display_info, "ROBOROCK S7 MaxV\nBitiş: 2025-01-01");
        assert_eq!(result.copy_model_payload.as_deref(), Some("S7 - MAXV"));
        assert_eq!(result.copy_date_payload.as_deref(), Some("2025-01-01"));
        assert_eq!(result.color, ColorTag::Blue);
        assert_eq!(result.status, WarrantyStatus::RegistryInWarranty);
    }
}
