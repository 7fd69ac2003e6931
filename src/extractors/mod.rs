//! HTML field extraction
//!
//! A page is split into listing scopes by an optional container selector,
//! and every [`FieldRule`] of a [`RecordSchema`] is evaluated against each
//! scope independently. Lookups return `Option`; substituting the fallback
//! is a separate, explicit step so each field's failure mode can be tested
//! on its own.

mod css_extractor;
mod label_extractor;
mod schemas;

pub use css_extractor::*;
pub use label_extractor::*;
pub use schemas::*;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::error::ExtractError;
use crate::record::{ExtractContext, Record, NOT_AVAILABLE};

/// What to read from a matched element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accessor {
    /// Trimmed text content
    Text,
    /// Raw attribute value
    Attr(String),
    /// Attribute value resolved against the page URL
    Url(String),
}

/// Where a field's value lives
#[derive(Debug, Clone)]
pub enum Locator {
    /// First element matching a CSS selector inside the listing
    Css { selector: Selector, accessor: Accessor },
    /// Element following a label text node
    Label {
        label: String,
        label_tag: Option<String>,
        value_tag: Option<String>,
    },
    /// One of two fixed outcomes depending on whether a marker element exists
    Marker {
        selector: Selector,
        present: String,
        absent: String,
    },
    /// Value supplied by the caller rather than the page
    Context(String),
}

impl Locator {
    pub fn css(selector: &str, accessor: Accessor) -> Result<Self, ExtractError> {
        Ok(Locator::Css {
            selector: compile_selector(selector)?,
            accessor,
        })
    }

    pub fn text(selector: &str) -> Result<Self, ExtractError> {
        Self::css(selector, Accessor::Text)
    }

    pub fn attr(selector: &str, attr_name: &str) -> Result<Self, ExtractError> {
        Self::css(selector, Accessor::Attr(attr_name.to_string()))
    }

    pub fn url(selector: &str, attr_name: &str) -> Result<Self, ExtractError> {
        Self::css(selector, Accessor::Url(attr_name.to_string()))
    }

    /// Label located anywhere, value read from the next element
    pub fn label(label: &str) -> Self {
        Locator::Label {
            label: label.to_string(),
            label_tag: None,
            value_tag: None,
        }
    }

    /// Label inside a `label_tag` element, value read from the next `value_tag` element
    pub fn label_between(label: &str, label_tag: &str, value_tag: &str) -> Self {
        Locator::Label {
            label: label.to_string(),
            label_tag: Some(label_tag.to_string()),
            value_tag: Some(value_tag.to_string()),
        }
    }

    pub fn marker(selector: &str, present: &str, absent: &str) -> Result<Self, ExtractError> {
        Ok(Locator::Marker {
            selector: compile_selector(selector)?,
            present: present.to_string(),
            absent: absent.to_string(),
        })
    }

    pub fn context(key: &str) -> Self {
        Locator::Context(key.to_string())
    }

    /// Look the value up; `None` means the locator matched nothing
    pub fn locate(&self, scope: ElementRef<'_>, ctx: &ExtractContext) -> Option<String> {
        match self {
            Locator::Css { selector, accessor } => match accessor {
                Accessor::Text => first_text(scope, selector),
                Accessor::Attr(name) => first_attr(scope, selector, name),
                Accessor::Url(name) => first_url(scope, selector, name, ctx.url()),
            },
            Locator::Label {
                label,
                label_tag,
                value_tag,
            } => label_value(scope, label, label_tag.as_deref(), value_tag.as_deref()),
            Locator::Marker {
                selector,
                present,
                absent,
            } => {
                let outcome = if has_match(scope, selector) {
                    present
                } else {
                    absent
                };
                Some(outcome.clone())
            }
            Locator::Context(key) => ctx.get(key).map(String::from),
        }
    }
}

/// What happens when a locator misses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallback {
    Value(String),
    /// A miss fails the whole listing
    Required,
}

/// A named column paired with its locator and fallback
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub column: String,
    pub locator: Locator,
    pub fallback: Fallback,
}

impl FieldRule {
    /// Optional field falling back to `N/A`
    pub fn optional(column: &str, locator: Locator) -> Self {
        Self::with_fallback(column, locator, NOT_AVAILABLE)
    }

    pub fn with_fallback(column: &str, locator: Locator, fallback: &str) -> Self {
        Self {
            column: column.to_string(),
            locator,
            fallback: Fallback::Value(fallback.to_string()),
        }
    }

    pub fn required(column: &str, locator: Locator) -> Self {
        Self {
            column: column.to_string(),
            locator,
            fallback: Fallback::Required,
        }
    }

    /// Locate the value, then substitute the fallback on a miss
    pub fn evaluate(&self, scope: ElementRef<'_>, ctx: &ExtractContext) -> Result<String, ExtractError> {
        match (self.locator.locate(scope, ctx), &self.fallback) {
            (Some(value), _) => Ok(value),
            (None, Fallback::Value(fallback)) => Ok(fallback.clone()),
            (None, Fallback::Required) => Err(ExtractError::MissingField {
                column: self.column.clone(),
            }),
        }
    }
}

/// Ordered set of rules producing one kind of record
#[derive(Debug, Clone)]
pub struct RecordSchema {
    pub name: String,
    container: Option<Selector>,
    rules: Vec<FieldRule>,
}

impl RecordSchema {
    /// Schema treating the whole page as a single listing
    pub fn new(name: &str, rules: Vec<FieldRule>) -> Self {
        Self {
            name: name.to_string(),
            container: None,
            rules,
        }
    }

    /// Split the page into one listing per element matching `selector`
    pub fn with_container(mut self, selector: &str) -> Result<Self, ExtractError> {
        self.container = Some(compile_selector(selector)?);
        Ok(self)
    }

    pub fn columns(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.column.as_str()).collect()
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Build one record from a listing scope
    pub fn extract_record(
        &self,
        scope: ElementRef<'_>,
        ctx: &ExtractContext,
    ) -> Result<Record, ExtractError> {
        let mut record = Record::with_capacity(self.rules.len());
        for rule in &self.rules {
            record.push(&rule.column, rule.evaluate(scope, ctx)?);
        }
        Ok(record)
    }

    /// Parse a page into zero or more records
    ///
    /// A listing that fails a required rule is skipped and logged; its
    /// siblings are unaffected.
    pub fn extract_records(&self, html: &str, ctx: &ExtractContext) -> Vec<Record> {
        let document = Html::parse_document(html);

        let scopes = match &self.container {
            Some(container) => select_all(&document, container),
            None => vec![document.root_element()],
        };

        if scopes.is_empty() {
            debug!(schema = %self.name, url = ctx.url().unwrap_or_default(), "No listings found");
        }

        scopes
            .into_iter()
            .enumerate()
            .filter_map(|(index, scope)| match self.extract_record(scope, ctx) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(
                        schema = %self.name,
                        url = ctx.url().unwrap_or_default(),
                        index,
                        error = %e,
                        "Skipping listing"
                    );
                    None
                }
            })
            .collect()
    }
}

/// Extract all records a schema finds in the page
pub fn extract_records(html: &str, schema: &RecordSchema, ctx: &ExtractContext) -> Vec<Record> {
    schema.extract_records(html, ctx)
}
