//! Label-adjacency extraction
//!
//! Product pages often render attributes as a label element followed by a
//! value element (`<td>MOQ</td><td>100 Pieces</td>`). The value is read
//! from the first element that follows the label text in document order.

use scraper::ElementRef;

use super::css_extractor::element_text;

/// Value of the element following `label` inside `scope`
///
/// `label_tag` restricts the label to text directly inside that element
/// type; `value_tag` restricts which following element holds the value.
pub fn label_value(
    scope: ElementRef<'_>,
    label: &str,
    label_tag: Option<&str>,
    value_tag: Option<&str>,
) -> Option<String> {
    let mut nodes = scope.descendants();

    let found = nodes.by_ref().any(|node| {
        let Some(text) = node.value().as_text() else {
            return false;
        };
        if text.trim() != label {
            return false;
        }
        match label_tag {
            None => true,
            Some(tag) => node
                .parent()
                .and_then(|parent| parent.value().as_element().map(|el| el.name() == tag))
                .unwrap_or(false),
        }
    });

    if !found {
        return None;
    }

    nodes
        .filter_map(ElementRef::wrap)
        .find(|el| value_tag.map_or(true, |tag| el.value().name() == tag))
        .map(element_text)
}
