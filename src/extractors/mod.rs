//! HTML extraction modules
//!
//! Each module provides extraction for one kind of field. The document is
//! parsed once and shared by every field.

mod css_extractor;
mod meta_extractor;

pub use css_extractor::*;
pub use meta_extractor::*;

use std::collections::BTreeMap;

use scraper::Html;
use serde::Serialize;

use crate::error::Result;
use crate::fields::{FieldConfig, FieldSpec};

/// Value extracted for a single field.
///
/// Serializes to `null`, a string, an array of strings, or an object whose
/// values are strings or `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ExtractionValue {
    Absent,
    Scalar(String),
    List(Vec<String>),
    MetaMap(BTreeMap<String, Option<String>>),
}

impl ExtractionValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, ExtractionValue::Absent)
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            ExtractionValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ExtractionValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_meta(&self) -> Option<&BTreeMap<String, Option<String>>> {
        match self {
            ExtractionValue::MetaMap(map) => Some(map),
            _ => None,
        }
    }
}

/// Field name to extracted value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExtractionResult {
    pub values: BTreeMap<String, ExtractionValue>,
}

impl ExtractionResult {
    pub fn get(&self, field: &str) -> Option<&ExtractionValue> {
        self.values.get(field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExtractionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// JSON form: `{ field: string | string[] | null | { name: string|null } }`
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.values).unwrap_or(serde_json::Value::Null)
    }
}

impl IntoIterator for ExtractionResult {
    type Item = (String, ExtractionValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, ExtractionValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

/// Parse HTML into a queryable document
pub fn parse_document(html: &str) -> Html {
    let document = Html::parse_document(html);
    if !document.errors.is_empty() {
        // html5ever recovers from these; they are only worth a trace
        tracing::debug!(errors = document.errors.len(), "recovered from malformed HTML");
    }
    document
}

/// Dispatch one field to the matching extractor
pub fn extract_field(document: &Html, spec: &FieldSpec) -> Result<ExtractionValue> {
    match spec {
        FieldSpec::Css(selector) => extract_css(document, selector),
        FieldSpec::Meta(names) => Ok(extract_meta(document, names)),
    }
}

/// Extract every configured field from an already parsed document
pub fn extract_parsed(document: &Html, fields: &FieldConfig) -> Result<ExtractionResult> {
    let values = fields
        .iter()
        .map(|(name, spec)| extract_field(document, spec).map(|value| (name.to_string(), value)))
        .collect::<Result<BTreeMap<_, _>>>()?;

    Ok(ExtractionResult { values })
}

/// Extract all requested fields from HTML
pub fn extract_document(html: &str, fields: &FieldConfig) -> Result<ExtractionResult> {
    let document = parse_document(html);
    extract_parsed(&document, fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PAGE: &str = r#"
    <html>
    <head>
        <title>AEG 7000</title>
        <meta name="keywords" content="a,b">
        <meta name="twitter:image" content="https://image.example.com/p.jpg">
    </head>
    <body>
        <span class="price">10</span>
        <span class="price">20</span>
        <span class="ratingValue">4,9</span>
    </body>
    </html>
    "#;

    #[test]
    fn test_full_extraction() {
        let fields = FieldConfig::new()
            .css("price", ".price")
            .css("rating_value", ".ratingValue")
            .css("title", ".missing")
            .meta("meta", ["keywords", "twitter:image", "og:title"]);

        let result = extract_document(PAGE, &fields).unwrap();

        assert_eq!(
            result.to_json(),
            json!({
                "price": ["10", "20"],
                "rating_value": "4,9",
                "title": null,
                "meta": {
                    "keywords": "a,b",
                    "twitter:image": "https://image.example.com/p.jpg",
                    "og:title": null
                }
            })
        );
    }

    #[test]
    fn test_dispatch_by_spec_shape() {
        let document = parse_document(PAGE);

        let css = extract_field(&document, &FieldSpec::Css("title".to_string())).unwrap();
        assert_eq!(css.as_scalar(), Some("AEG 7000"));

        let meta = extract_field(&document, &FieldSpec::Meta(vec!["keywords".to_string()])).unwrap();
        assert_eq!(
            meta.as_meta().and_then(|m| m.get("keywords")).cloned().flatten(),
            Some("a,b".to_string())
        );
    }

    #[test]
    fn test_bad_selector_fails_whole_extraction() {
        let fields = FieldConfig::new().css("price", ".price").css("broken", "p[");
        assert!(extract_document(PAGE, &fields).is_err());
    }

    #[test]
    fn test_empty_config_gives_empty_result() {
        let result = extract_document(PAGE, &FieldConfig::new()).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.to_json(), json!({}));
    }

    #[test]
    fn test_malformed_html_is_recovered() {
        let fields = FieldConfig::new().css("item", "li");
        let result = extract_document("<ul><li>one<li>two</ul></div></span>", &fields).unwrap();
        assert_eq!(
            result.get("item").and_then(|v| v.as_list()),
            Some(&["one".to_string(), "two".to_string()][..])
        );
    }
}
