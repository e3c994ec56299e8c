//! Attribute object model for HTML tags
//!
//! Holds a class token list plus arbitrary key/value attributes. Updates
//! are functional: `add_classes` returns a new object and leaves every
//! existing reference untouched, so a compiled template can be shared
//! between concurrent renders safely.

use std::collections::BTreeMap;

use crate::runtime::escape::{Escaper, HtmlEscaper};

/// An HTML element's attributes: class tokens plus other key/value pairs
///
/// Class tokens keep insertion order and are de-duplicated; the remaining
/// attributes serialize sorted by key, so output is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a class token (builder form)
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.push_class(class.into());
        self
    }

    /// Set a key/value attribute (builder form)
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Functional update: a new object with the given class tokens merged in
    ///
    /// Duplicate and empty tokens are skipped, so the operation is
    /// idempotent. The receiver is not modified.
    pub fn add_classes<I, S>(&self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut updated = self.clone();
        for token in tokens {
            updated.push_class(token.into());
        }
        updated
    }

    fn push_class(&mut self, token: String) {
        if !token.is_empty() && !self.classes.contains(&token) {
            self.classes.push(token);
        }
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.iter().any(|c| c == name)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.attrs.is_empty()
    }

    /// Serialize as attribute markup: ` class="a b" key="value"`
    ///
    /// The leading space lets templates write `<div{{ attributes }}>`. An
    /// empty object serializes to an empty string. Values pass through the
    /// given escaper; the result as a whole counts as pre-sanitized.
    pub fn render(&self, escaper: &dyn Escaper) -> String {
        let mut out = String::new();
        if !self.classes.is_empty() {
            out.push_str(" class=\"");
            out.push_str(&escaper.escape(&self.classes.join(" ")));
            out.push('"');
        }
        for (key, value) in &self.attrs {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escaper.escape(value));
            out.push('"');
        }
        out
    }
}

impl std::fmt::Display for Attributes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render(&HtmlEscaper))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_classes_merges_without_duplicates() {
        let base = Attributes::new().with_class("form-item");
        let updated = base.add_classes(["is-required"]);
        assert_eq!(updated.to_string(), r#" class="form-item is-required""#);
    }

    #[test]
    fn test_add_classes_idempotent() {
        let base = Attributes::new().with_class("form-item");
        let once = base.add_classes(["is-required"]);
        let twice = once.add_classes(["is-required"]);
        assert_eq!(once, twice);
        assert_eq!(twice.classes().len(), 2);
    }

    #[test]
    fn test_add_classes_does_not_mutate_receiver() {
        let base = Attributes::new().with_class("form-item");
        let _updated = base.add_classes(["extra"]);
        assert!(!base.has_class("extra"));
        assert_eq!(base.classes().len(), 1);
    }

    #[test]
    fn test_empty_tokens_skipped() {
        // Ternary class entries produce empty strings when the condition
        // is false; those must not serialize
        let attrs = Attributes::new().add_classes(["fieldset-legend", "", "form-required"]);
        assert_eq!(
            attrs.to_string(),
            r#" class="fieldset-legend form-required""#
        );
    }

    #[test]
    fn test_attribute_values_escaped() {
        let attrs = Attributes::new().with_attribute("title", r#"a "quoted" <tag>"#);
        assert_eq!(
            attrs.to_string(),
            r#" title="a &quot;quoted&quot; &lt;tag&gt;""#
        );
    }

    #[test]
    fn test_attributes_sorted_for_determinism() {
        let attrs = Attributes::new()
            .with_attribute("id", "edit-field")
            .with_attribute("data-selector", "x");
        assert_eq!(
            attrs.to_string(),
            r#" data-selector="x" id="edit-field""#
        );
    }

    #[test]
    fn test_empty_renders_nothing() {
        assert_eq!(Attributes::new().to_string(), "");
    }
}
