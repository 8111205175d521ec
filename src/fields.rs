//! Field configuration: which value to pull out of a page, and how

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, ScrapeError};

/// How a single field is resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldSpec {
    /// Text of the elements matching a CSS selector
    Css(String),
    /// `content` of the named `<meta>` tags
    Meta(Vec<String>),
}

impl FieldSpec {
    /// Decide the variant from a decoded JSON value.
    ///
    /// A string is a CSS selector, an array of strings is a meta-name list.
    /// Anything else is rejected rather than coerced.
    pub fn from_json(field: &str, value: &Value) -> Result<Self> {
        match value {
            Value::String(selector) => Ok(FieldSpec::Css(selector.clone())),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Value::String(name) => Ok(name.clone()),
                    other => Err(ScrapeError::invalid_config(
                        field,
                        format!("meta name #{} must be a string, got {}", i, json_kind(other)),
                    )),
                })
                .collect::<Result<Vec<_>>>()
                .map(FieldSpec::Meta),
            other => Err(ScrapeError::invalid_config(
                field,
                format!(
                    "expected a selector string or a list of meta names, got {}",
                    json_kind(other)
                ),
            )),
        }
    }
}

/// Field name to spec; names are unique, iteration order is by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldConfig {
    fields: BTreeMap<String, FieldSpec>,
}

impl FieldConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a CSS field
    pub fn css(mut self, name: impl Into<String>, selector: impl Into<String>) -> Self {
        self.fields
            .insert(name.into(), FieldSpec::Css(selector.into()));
        self
    }

    /// Add (or replace) a meta-tag field
    pub fn meta<I, S>(mut self, name: impl Into<String>, meta_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = meta_names.into_iter().map(Into::into).collect();
        self.fields.insert(name.into(), FieldSpec::Meta(names));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, spec: FieldSpec) -> Option<FieldSpec> {
        self.fields.insert(name.into(), spec)
    }

    /// Parse the JSON wire format, e.g. `{"price": ".price", "meta": ["keywords"]}`
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            ScrapeError::invalid_config(
                "<root>",
                format!("expected an object of fields, got {}", json_kind(value)),
            )
        })?;

        let fields = object
            .iter()
            .map(|(name, spec)| FieldSpec::from_json(name, spec).map(|spec| (name.clone(), spec)))
            .collect::<Result<BTreeMap<_, _>>>()?;

        Ok(Self { fields })
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl TryFrom<&Value> for FieldConfig {
    type Error = ScrapeError;

    fn try_from(value: &Value) -> Result<Self> {
        Self::from_value(value)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_config() {
        let config = FieldConfig::from_json(
            r#"{"price": ".price-box__value", "meta": ["keywords", "twitter:image"]}"#,
        )
        .unwrap();

        assert_eq!(config.len(), 2);
        assert_eq!(
            config.get("price"),
            Some(&FieldSpec::Css(".price-box__value".to_string()))
        );
        assert_eq!(
            config.get("meta"),
            Some(&FieldSpec::Meta(vec![
                "keywords".to_string(),
                "twitter:image".to_string()
            ]))
        );
    }

    #[test]
    fn test_builder_matches_json() {
        let built = FieldConfig::new()
            .css("price", ".price")
            .meta("meta", ["keywords"]);
        let parsed = FieldConfig::from_json(r#"{"meta": ["keywords"], "price": ".price"}"#).unwrap();

        assert_eq!(built, parsed);
    }

    #[test]
    fn test_number_selector_fails_fast() {
        let err = FieldConfig::from_json(r#"{"price": 42}"#).unwrap_err();
        match err {
            ScrapeError::InvalidConfig { field, reason } => {
                assert_eq!(field, "price");
                assert!(reason.contains("a number"));
            }
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn test_mixed_array_fails_fast() {
        let err = FieldConfig::from_json(r#"{"meta": ["keywords", 1]}"#).unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidConfig { ref field, .. } if field == "meta"));
    }

    #[test]
    fn test_object_selector_rejected() {
        let err = FieldConfig::from_json(r#"{"price": {"css": ".p"}}"#).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_non_object_root_rejected() {
        let err = FieldConfig::from_json(r#"[".price"]"#).unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidConfig { ref field, .. } if field == "<root>"));
    }

    #[test]
    fn test_malformed_json() {
        let err = FieldConfig::from_json("{price: ").unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidJson(_)));
    }

    #[test]
    fn test_empty_meta_list_allowed() {
        let config = FieldConfig::from_json(r#"{"meta": []}"#).unwrap();
        assert_eq!(config.get("meta"), Some(&FieldSpec::Meta(vec![])));
    }
}
