//! The normalized warranty result handed to presenters and stored in the cache.
//!
//! Field names on the wire (`title`, `info`, `status_color`, ...) are the ones
//! used by the persisted cache file. Older cache files carry no `status`; it is
//! inferred from the color and text when read.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Shown when a device is covered but its model could not be read.
pub const MODEL_NOT_FOUND_MESSAGE: &str = "MODEL BULUNAMADI. LÜTFEN CİHAZ ÜZERİNDEN ÖĞRENİNİZ.";

/// Shown when neither backend knows the serial.
pub const NOT_FOUND_MESSAGE: &str = "Hiçbir sistemde garanti bilgisi bulunamadı.";

/// Title used on error results.
pub const ERROR_TITLE: &str = "HATA";

/// Which terminal state produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WarrantyStatus {
    /// In warranty according to the certificate page.
    CertificateInWarranty,
    /// In warranty according to the device registry.
    RegistryInWarranty,
    /// Serial prefix known to be covered without a registry lookup.
    SpecialCase,
    /// Neither backend reported coverage.
    NotFound,
    /// A lookup failed.
    Error,
}

/// Presentation color of a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    Green,
    Blue,
    Red,
}

impl ColorTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorTag::Green => "green",
            ColorTag::Blue => "blue",
            ColorTag::Red => "red",
        }
    }
}

/// A normalized lookup outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct WarrantyResult {
    pub status: WarrantyStatus,
    #[serde(rename = "title")]
    pub display_title: String,
    #[serde(rename = "info")]
    pub display_info: String,
    #[serde(default)]
    pub copy_model_payload: Option<String>,
    #[serde(default)]
    pub copy_date_payload: Option<String>,
    #[serde(rename = "status_color")]
    pub color: ColorTag,
}

impl WarrantyResult {
    /// Covered according to the certificate page.
    pub fn certificate(display_info: impl Into<String>, copy_model_payload: Option<String>) -> Self {
        Self {
            status: WarrantyStatus::CertificateInWarranty,
            display_title: String::new(),
            display_info: display_info.into(),
            copy_model_payload,
            copy_date_payload: None,
            color: ColorTag::Green,
        }
    }

    /// Covered according to the device registry.
    pub fn registry(
        display_info: impl Into<String>, copy_model_payload: Option<String>, copy_date_payload: Option<String>,
    ) -> Self {
        Self {
            status: WarrantyStatus::RegistryInWarranty,
            display_title: String::new(),
            display_info: display_info.into(),
            copy_model_payload,
            copy_date_payload,
            color: ColorTag::Blue,
        }
    }

    /// Covered by serial prefix; the model has to be read off the device.
    pub fn special_case() -> Self {
        Self {
            status: WarrantyStatus::SpecialCase,
            display_title: String::new(),
            display_info: MODEL_NOT_FOUND_MESSAGE.to_string(),
            copy_model_payload: None,
            copy_date_payload: None,
            color: ColorTag::Green,
        }
    }

    /// Neither backend reported coverage.
    pub fn not_found() -> Self {
        Self {
            status: WarrantyStatus::NotFound,
            display_title: String::new(),
            display_info: NOT_FOUND_MESSAGE.to_string(),
            copy_model_payload: None,
            copy_date_payload: None,
            color: ColorTag::Red,
        }
    }

    /// A failed lookup.
    pub fn error(display_title: impl Into<String>, display_info: impl Into<String>) -> Self {
        Self {
            status: WarrantyStatus::Error,
            display_title: display_title.into(),
            display_info: display_info.into(),
            copy_model_payload: None,
            copy_date_payload: None,
            color: ColorTag::Red,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == WarrantyStatus::Error
    }

    /// Whether the device was reported as covered by any rule.
    pub fn is_in_warranty(&self) -> bool {
        matches!(
            self.status,
            WarrantyStatus::CertificateInWarranty | WarrantyStatus::RegistryInWarranty | WarrantyStatus::SpecialCase
        )
    }
}

/// On-disk shape, with `status` optional.
#[derive(Deserialize)]
struct StoredResult {
    #[serde(default)]
    status: Option<WarrantyStatus>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    info: String,
    #[serde(default)]
    copy_model_payload: Option<String>,
    #[serde(default)]
    copy_date_payload: Option<String>,
    status_color: ColorTag,
}

impl StoredResult {
    fn infer_status(&self) -> WarrantyStatus {
        match self.status_color {
            ColorTag::Blue => WarrantyStatus::RegistryInWarranty,
            ColorTag::Green if self.copy_model_payload.is_none() && self.info == MODEL_NOT_FOUND_MESSAGE => {
                WarrantyStatus::SpecialCase
            }
            ColorTag::Green => WarrantyStatus::CertificateInWarranty,
            ColorTag::Red if self.info == NOT_FOUND_MESSAGE => WarrantyStatus::NotFound,
            ColorTag::Red => WarrantyStatus::Error,
        }
    }
}

impl<'de> Deserialize<'de> for WarrantyResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let stored = StoredResult::deserialize(deserializer)?;
        let status = stored.status.unwrap_or_else(|| stored.infer_status());
        Ok(Self {
            status,
            display_title: stored.title,
            display_info: stored.info,
            copy_model_payload: stored.copy_model_payload,
            copy_date_payload: stored.copy_date_payload,
            color: stored.status_color,
        })
    }
}
