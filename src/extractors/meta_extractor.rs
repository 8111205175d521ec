//! Meta tag extraction
//!
//! Resolves `<meta>` tags by `name` or OpenGraph-style `property`.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::ExtractionValue;

/// Names that may only be matched through the `name` attribute
const NAME_ONLY: &[&str] = &["keywords"];

// Constant selector; a parse failure is a programming error
static META: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta").expect("`meta` is a valid selector"));

/// Look up the `content` of each requested meta tag.
///
/// `keywords` only matches `<meta name="keywords">`. Every other name matches
/// the first `<meta>` whose `name` or `property` equals it, in document order.
/// Tags that are missing, or carry no `content`, map to `None`.
pub fn extract_meta(document: &Html, names: &[String]) -> ExtractionValue {
    let metas: Vec<ElementRef<'_>> = document.select(&META).collect();

    let mut result = BTreeMap::new();
    for name in names {
        let content = find_meta(&metas, name).and_then(|el| el.value().attr("content"));
        result.insert(name.clone(), content.map(String::from));
    }

    ExtractionValue::MetaMap(result)
}

fn find_meta<'a>(metas: &[ElementRef<'a>], name: &str) -> Option<ElementRef<'a>> {
    let name_only = NAME_ONLY.contains(&name);

    metas
        .iter()
        .find(|el| {
            let value = el.value();
            value.attr("name") == Some(name)
                || (!name_only && value.attr("property") == Some(name))
        })
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta_map(pairs: &[(&str, Option<&str>)]) -> ExtractionValue {
        ExtractionValue::MetaMap(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.map(String::from)))
                .collect(),
        )
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extract_meta() {
        let html = r#"
        <html>
        <head>
            <meta name="keywords" content="AEG,7000,ProSteam">
            <meta property="og:title" content="Test Page">
            <meta name="twitter:image" content="https://example.com/image.jpg">
            <meta name="description" content="Page description">
        </head>
        </html>
        "#;
        let document = Html::parse_document(html);

        let result = extract_meta(
            &document,
            &names(&["keywords", "twitter:image", "og:title", "description"]),
        );

        assert_eq!(
            result,
            meta_map(&[
                ("keywords", Some("AEG,7000,ProSteam")),
                ("twitter:image", Some("https://example.com/image.jpg")),
                ("og:title", Some("Test Page")),
                ("description", Some("Page description")),
            ])
        );
    }

    #[test]
    fn test_keywords_ignores_property() {
        let html = r#"<head><meta property="keywords" content="wrong"></head>"#;
        let document = Html::parse_document(html);

        let result = extract_meta(&document, &names(&["keywords"]));
        assert_eq!(result, meta_map(&[("keywords", None)]));
    }

    #[test]
    fn test_first_in_document_wins() {
        let html = r#"
        <head>
            <meta property="og:image" content="first.jpg">
            <meta name="og:image" content="second.jpg">
            <meta property="og:image" content="third.jpg">
        </head>
        "#;
        let document = Html::parse_document(html);

        let result = extract_meta(&document, &names(&["og:image"]));
        assert_eq!(result, meta_map(&[("og:image", Some("first.jpg"))]));
    }

    #[test]
    fn test_missing_tag_and_missing_content() {
        let html = r#"<head><meta name="author"></head>"#;
        let document = Html::parse_document(html);

        let result = extract_meta(&document, &names(&["author", "robots"]));
        assert_eq!(result, meta_map(&[("author", None), ("robots", None)]));
    }

    #[test]
    fn test_meta_selector_reused_across_documents() {
        let first = Html::parse_document(r#"<meta name="author" content="one">"#);
        let second = Html::parse_document(r#"<meta name="author" content="two">"#);

        assert_eq!(
            extract_meta(&first, &names(&["author"])),
            meta_map(&[("author", Some("one"))])
        );
        assert_eq!(
            extract_meta(&second, &names(&["author"])),
            meta_map(&[("author", Some("two"))])
        );
    }

    #[test]
    fn test_names_with_quotes_are_matched_literally() {
        let html = r#"<head><meta name="it's" content="fine"></head>"#;
        let document = Html::parse_document(html);

        let result = extract_meta(&document, &names(&["it's"]));
        assert_eq!(result, meta_map(&[("it's", Some("fine"))]));
    }
}
