//! CSS selector-based extraction
//!
//! Uses the scraper crate to select elements by CSS selectors.

use scraper::{ElementRef, Html, Selector};

use super::ExtractionValue;
use crate::error::{Result, ScrapeError};

/// Compile a selector, keeping the parser's complaint
pub fn parse_selector(selector_str: &str) -> Result<Selector> {
    Selector::parse(selector_str).map_err(|e| ScrapeError::InvalidSelector {
        selector: selector_str.to_string(),
        reason: e.to_string(),
    })
}

/// Text content of an element, trimmed at both ends only
pub fn trimmed_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Extract text from all elements matching a CSS selector.
///
/// No match is `Absent`, one match a `Scalar`, several a `List` in
/// document order.
pub fn extract_css(document: &Html, selector_str: &str) -> Result<ExtractionValue> {
    let selector = parse_selector(selector_str)?;

    let mut texts: Vec<String> = document
        .select(&selector)
        .map(|el| trimmed_text(&el))
        .collect();

    Ok(match texts.len() {
        0 => ExtractionValue::Absent,
        1 => ExtractionValue::Scalar(texts.remove(0)),
        _ => ExtractionValue::List(texts),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCT_HTML: &str = r#"
        <html>
        <body>
            <div class="price">
                $19.99
            </div>
            <div class="price">$29.99</div>
            <span class="rating">4,9</span>
            <p class="desc">  two   spaces inside  </p>
            <div class="product">
                <span class="name">Product <b>A</b></span>
                <span class="unit-price">€1.50/kg</span>
            </div>
        </body>
        </html>
    "#;

    #[test]
    fn test_multiple_matches_become_list() {
        let document = Html::parse_document(PRODUCT_HTML);

        let prices = extract_css(&document, ".price").unwrap();
        assert_eq!(
            prices,
            ExtractionValue::List(vec!["$19.99".to_string(), "$29.99".to_string()])
        );
    }

    #[test]
    fn test_single_match_is_scalar() {
        let document = Html::parse_document(PRODUCT_HTML);

        let rating = extract_css(&document, ".rating").unwrap();
        assert_eq!(rating, ExtractionValue::Scalar("4,9".to_string()));
    }

    #[test]
    fn test_no_match_is_absent() {
        let document = Html::parse_document(PRODUCT_HTML);

        let missing = extract_css(&document, ".non-existent-class").unwrap();
        assert_eq!(missing, ExtractionValue::Absent);
    }

    #[test]
    fn test_internal_whitespace_preserved() {
        let document = Html::parse_document(PRODUCT_HTML);

        let desc = extract_css(&document, "p.desc").unwrap();
        assert_eq!(desc, ExtractionValue::Scalar("two   spaces inside".to_string()));
    }

    #[test]
    fn test_complex_selectors() {
        let document = Html::parse_document(PRODUCT_HTML);

        let unit_price = extract_css(&document, "div.product .unit-price").unwrap();
        assert_eq!(unit_price, ExtractionValue::Scalar("€1.50/kg".to_string()));

        let name = extract_css(&document, "div.product > .name").unwrap();
        assert_eq!(name, ExtractionValue::Scalar("Product A".to_string()));
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        let document = Html::parse_document(PRODUCT_HTML);

        let err = extract_css(&document, "div[[").unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidSelector { ref selector, .. } if selector == "div[["));
    }
}
