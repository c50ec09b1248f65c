//! Certificate page parsing: coverage detection and device attributes.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static COVERED_PHRASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Garanti Kapsam[ıi]ndadır").expect("coverage pattern is valid"));

static DIV: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div").expect("invalid selector"));

static COVERED_BADGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"div[class*="bg-emerald-100"]"#).expect("invalid selector"));

static GRID: LazyLock<Selector> = LazyLock::new(|| Selector::parse(r#"div[class*="grid"]"#).expect("invalid selector"));

const BRAND_LABEL: &str = "marka";
const MODEL_LABEL: &str = "model";
const COLOR_LABEL: &str = "renk";

/// Brand, model and color as printed on the certificate. Values are trimmed;
/// empty values are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceAttributes {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
}

impl DeviceAttributes {
    fn is_empty(&self) -> bool {
        self.brand.is_none() && self.model.is_none() && self.color.is_none()
    }
}

/// What the certificate page says about the serial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificateVerdict {
    InWarranty(DeviceAttributes),
    NotInWarranty,
}

/// Parse a certificate page.
pub fn parse_certificate_page(html: &str) -> CertificateVerdict {
    let document = Html::parse_document(html);

    if !is_covered(&document) {
        return CertificateVerdict::NotInWarranty;
    }

    let mut attributes = DeviceAttributes {
        brand: labelled_value(&document, BRAND_LABEL),
        model: labelled_value(&document, MODEL_LABEL),
        color: labelled_value(&document, COLOR_LABEL),
    };

    if attributes.is_empty() {
        attributes = grid_values(&document);
    }

    CertificateVerdict::InWarranty(attributes)
}

/// Either the coverage phrase appears in some text node, or the green badge
/// is present.
fn is_covered(document: &Html) -> bool {
    document.root_element().text().any(|t| COVERED_PHRASE.is_match(t))
        || document.select(&COVERED_BADGE).next().is_some()
}

/// Text of an element with every text node trimmed and concatenated.
fn stripped_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).filter(|t| !t.is_empty()).collect()
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}

fn child_divs(element: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    element.children().filter_map(ElementRef::wrap).filter(|c| c.value().name() == "div")
}

/// Locate the first `div` whose text is exactly `label` and read the second
/// `div` child of its parent.
fn labelled_value(document: &Html, label: &str) -> Option<String> {
    let label_div = document.select(&DIV).find(|div| stripped_text(*div).to_lowercase() == label)?;
    let parent = label_div.parent().and_then(ElementRef::wrap)?;
    child_divs(parent).nth(1).map(stripped_text).and_then(non_empty)
}

/// Positional fallback: the first grid's child divs read as label, value,
/// label, value. Later pairs overwrite earlier ones.
fn grid_values(document: &Html) -> DeviceAttributes {
    let mut attributes = DeviceAttributes::default();
    let Some(grid) = document.select(&GRID).next() else {
        return attributes;
    };

    let texts: Vec<String> = child_divs(grid).map(stripped_text).collect();
    for pair in texts.windows(2) {
        let value = || non_empty(pair[1].clone());
        match pair[0].to_lowercase().as_str() {
            BRAND_LABEL => attributes.brand = value(),
            MODEL_LABEL => attributes.model = value(),
            COLOR_LABEL => attributes.color = value(),
            _ => {}
        }
    }

    attributes
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABELLED_PAGE: &str = r#"
        <html><body>
            <div class="rounded bg-emerald-100 text-emerald-700">Garanti Kapsamındadır</div>
            <div class="details">
                <div class="row"><div>Marka</div><div> Xiaomi </div></div>
                <div class="row"><div>Model</div><div>S8</div></div>
                <div class="row"><div>Renk</div><div>White</div></div>
            </div>
        </body></html>
    "#;

    fn attributes(html: &str) -> DeviceAttributes {
        match parse_certificate_page(html) {
            CertificateVerdict::InWarranty(attrs) => attrs,
            CertificateVerdict::NotInWarranty => panic!("expected in-warranty verdict"),
        }
    }

    #[test]
    fn test_labelled_fields() {
        let attrs = attributes(LABELLED_PAGE);
        assert_eq!(attrs.brand.as_deref(), Some("Xiaomi"));
        assert_eq!(attrs.model.as_deref(), Some("S8"));
        assert_eq!(attrs.color.as_deref(), Some("White"));
    }

    #[test]
    fn test_phrase_without_badge() {
        let html = "<html><body><p>Cihaz garanti kapsamindadır.</p></body></html>";
        assert_eq!(parse_certificate_page(html), CertificateVerdict::InWarranty(DeviceAttributes::default()));
    }

    #[test]
    fn test_badge_without_phrase() {
        let html = r#"<div class="px-2 bg-emerald-100">OK</div>"#;
        assert!(matches!(parse_certificate_page(html), CertificateVerdict::InWarranty(_)));
    }

    #[test]
    fn test_not_in_warranty() {
        let html = r#"<html><body><div class="bg-red-100">Garanti Dışı</div></body></html>"#;
        assert_eq!(parse_certificate_page(html), CertificateVerdict::NotInWarranty);
    }

    #[test]
    fn test_empty_page() {
        assert_eq!(parse_certificate_page(""), CertificateVerdict::NotInWarranty);
    }

    #[test]
    fn test_label_match_is_case_insensitive_and_whitespace_tolerant() {
        let html = r#"
            <div class="bg-emerald-100"></div>
            <div><div>
                MODEL
            </div><div> <span>S7</span> <span>MaxV</span> </div></div>
        "#;
        assert_eq!(attributes(html).model.as_deref(), Some("S7MaxV"));
    }

    #[test]
    fn test_label_without_sibling_is_absent() {
        let html = r#"
            <div class="bg-emerald-100"></div>
            <div><div>Model</div></div>
            <div><div>Renk</div><div>Black</div></div>
        "#;
        let attrs = attributes(html);
        assert!(attrs.model.is_none());
        assert_eq!(attrs.color.as_deref(), Some("Black"));
    }

    #[test]
    fn test_empty_value_is_absent() {
        let html = r#"
            <div class="bg-emerald-100"></div>
            <div><div>Model</div><div>   </div></div>
        "#;
        assert!(attributes(html).model.is_none());
    }

    #[test]
    fn test_grid_fallback() {
        let html = r#"
            <span>Garanti Kapsamındadır</span>
            <section><div>Marka</div></section>
            <section><div>Model</div></section>
            <section><div>Renk</div></section>
            <div class="grid grid-cols-2">
                <div>Marka</div><div>Roborock</div>
                <div>Model</div><div>Q7</div>
                <div>Renk</div><div>Black</div>
            </div>
        "#;
        let attrs = attributes(html);
        assert_eq!(attrs.brand.as_deref(), Some("Roborock"));
        assert_eq!(attrs.model.as_deref(), Some("Q7"));
        assert_eq!(attrs.color.as_deref(), Some("Black"));
    }

    #[test]
    fn test_grid_not_used_when_any_label_found() {
        let html = r#"
            <span>Garanti Kapsamındadır</span>
            <section><div>Model</div></section>
            <div class="row"><div>Renk</div><div>Blue</div></div>
            <div class="grid">
                <div>Model</div><div>Q7</div>
            </div>
        "#;
        let attrs = attributes(html);
        assert_eq!(attrs.color.as_deref(), Some("Blue"));
        assert!(attrs.model.is_none());
    }

    #[test]
    fn test_only_first_label_div_is_consulted() {
        let html = r#"
            <div class="bg-emerald-100"></div>
            <div class="grid">
                <div>Model</div><div>Q7</div>
            </div>
        "#;
        assert_eq!(attributes(html).model.as_deref(), Some("Q7"));
    }
}
