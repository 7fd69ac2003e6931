//! Flat output records

use std::collections::BTreeMap;

use serde::Serialize;

/// Sentinel written when a field could not be extracted
pub const NOT_AVAILABLE: &str = "N/A";

/// One output row: every schema column paired with a value, in schema order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, column: &str, value: String) {
        self.fields.push((column.to_string(), value));
    }

    /// Value of a column, if the column exists
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Values known outside the page (source URL, topic keyword) that rules can copy
#[derive(Debug, Clone, Default)]
pub struct ExtractContext {
    values: BTreeMap<String, String>,
}

impl ExtractContext {
    /// Key holding the URL the page was fetched from
    pub const URL: &'static str = "url";
    /// Key holding the discovery keyword
    pub const KEYWORD: &'static str = "keyword";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Page URL, used as the base for resolving relative links
    pub fn url(&self) -> Option<&str> {
        self.get(Self::URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_column_order() {
        let mut record = Record::with_capacity(2);
        record.push("B", "2".to_string());
        record.push("A", "1".to_string());

        assert_eq!(record.columns().collect::<Vec<_>>(), vec!["B", "A"]);
        assert_eq!(record.values().collect::<Vec<_>>(), vec!["2", "1"]);
        assert_eq!(record.get("A"), Some("1"));
        assert_eq!(record.get("C"), None);
    }

    #[test]
    fn test_context_lookup() {
        let ctx = ExtractContext::new()
            .with(ExtractContext::URL, "https://example.com/a")
            .with(ExtractContext::KEYWORD, "lighting");

        assert_eq!(ctx.url(), Some("https://example.com/a"));
        assert_eq!(ctx.get("keyword"), Some("lighting"));
        assert_eq!(ctx.get("missing"), None);
    }
}
