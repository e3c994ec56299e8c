//! Runtime values and the render context
//!
//! Missing data is modelled explicitly as [`Value::Undefined`] rather than
//! as an error: templates routinely probe for optional context members and
//! expect absence to render as nothing.

use std::collections::{BTreeMap, HashMap};

use crate::runtime::attributes::Attributes;

/// A value available to a template at render time
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent data; prints as empty, iterates as empty, is falsy
    Undefined,
    Bool(bool),
    Number(f64),
    /// Plain text, escaped on output
    String(String),
    /// Pre-sanitized markup, emitted verbatim
    Markup(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Attributes(Attributes),
}

static UNDEFINED: Value = Value::Undefined;

impl Value {
    /// Truthiness for conditionals and ternaries
    ///
    /// False, zero, empty strings, and empty collections are falsy, as is
    /// the undefined value. Non-empty attribute objects are truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::String(s) | Value::Markup(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(entries) => !entries.is_empty(),
            Value::Attributes(attrs) => !attrs.is_empty(),
        }
    }

    /// Human-readable type name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Markup(_) => "markup",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Attributes(_) => "attributes",
        }
    }

    /// Lenient member lookup: absent keys and non-map targets yield the
    /// undefined value
    pub fn get(&self, key: &str) -> &Value {
        match self {
            Value::Map(entries) => entries.get(key).unwrap_or(&UNDEFINED),
            _ => &UNDEFINED,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Attributes> for Value {
    fn from(attrs: Attributes) -> Self {
        Value::Attributes(attrs)
    }
}

/// Named values supplied by the caller for one render
#[derive(Debug, Clone, Default)]
pub struct Context {
    vars: HashMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Lenient lookup: an unknown name yields the undefined value
    pub fn get(&self, name: &str) -> &Value {
        self.vars.get(name).unwrap_or(&UNDEFINED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Undefined.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::String(String::new()).is_truthy());
        assert!(!Value::List(vec![]).is_truthy());

        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Number(1.5).is_truthy());
        assert!(Value::String("x".into()).is_truthy());
        assert!(Value::List(vec![Value::Bool(true)]).is_truthy());
        assert!(Value::Attributes(Attributes::new().with_class("a")).is_truthy());
        assert!(!Value::Attributes(Attributes::new()).is_truthy());
    }

    #[test]
    fn test_lenient_member_lookup() {
        let mut map = BTreeMap::new();
        map.insert("title".to_string(), Value::from("hello"));
        let value = Value::Map(map);

        assert_eq!(value.get("title"), &Value::from("hello"));
        assert_eq!(value.get("missing"), &Value::Undefined);
        // Non-map targets resolve to undefined, not an error
        assert_eq!(Value::Number(3.0).get("anything"), &Value::Undefined);
        assert_eq!(Value::Undefined.get("anything"), &Value::Undefined);
    }

    #[test]
    fn test_context_lookup() {
        let mut ctx = Context::new();
        ctx.insert("name", "fieldset");
        assert_eq!(ctx.get("name"), &Value::from("fieldset"));
        assert_eq!(ctx.get("absent"), &Value::Undefined);
    }
}
