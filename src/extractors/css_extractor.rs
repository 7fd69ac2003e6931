//! CSS selector-based extraction
//!
//! Uses the scraper crate to select elements by CSS selectors inside a
//! listing scope. Every lookup returns `None` when nothing matches so the
//! caller decides what to substitute.

use scraper::{ElementRef, Html, Selector};

use crate::error::ExtractError;

/// Compile a selector, keeping the offending text in the error
pub fn compile_selector(selector_str: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector_str).map_err(|e| ExtractError::InvalidSelector {
        selector: selector_str.to_string(),
        message: e.to_string(),
    })
}

/// Trimmed text content of an element and all its descendants
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Extract first matching element's text
pub fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope.select(selector).next().map(element_text)
}

/// Extract first matching element's attribute
pub fn first_attr(scope: ElementRef<'_>, selector: &Selector, attr_name: &str) -> Option<String> {
    scope
        .select(selector)
        .next()
        .and_then(|el| el.value().attr(attr_name))
        .map(|value| value.trim().to_string())
}

/// Extract first matching element's attribute as an absolute URL
///
/// Relative values are joined onto `base_url`. Without a usable base the
/// raw attribute value is returned unchanged.
pub fn first_url(
    scope: ElementRef<'_>,
    selector: &Selector,
    attr_name: &str,
    base_url: Option<&str>,
) -> Option<String> {
    let raw = first_attr(scope, selector, attr_name)?;
    if raw.is_empty() {
        return None;
    }

    let base = match base_url.and_then(|b| url::Url::parse(b).ok()) {
        Some(base) => base,
        None => return Some(raw),
    };

    match base.join(&raw) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute.to_string())
        }
        _ => Some(raw),
    }
}

/// Whether any element in the scope matches
pub fn has_match(scope: ElementRef<'_>, selector: &Selector) -> bool {
    scope.select(selector).next().is_some()
}

/// All elements of the document matching the selector, in document order
pub fn select_all<'a>(document: &'a Html, selector: &Selector) -> Vec<ElementRef<'a>> {
    document.select(selector).collect()
}
