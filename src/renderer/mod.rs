//! Render unit: walks a compiled node sequence and emits output text
//!
//! A render unit is immutable once built. Each render gets its own local
//! scope, so a unit can serve many renders (with different contexts)
//! without interference.

pub mod error;

pub use error::RenderError;

use std::collections::HashMap;

use crate::compiler::ast::{Expr, Identifier, Node, Span, Spanned};
use crate::compiler::debug::LineIndex;
use crate::runtime::attributes::Attributes;
use crate::runtime::escape::{Escaper, HtmlEscaper};
use crate::runtime::value::{Context, Value};

/// A compiled template ready to render
pub struct RenderUnit {
    name: String,
    nodes: Vec<Spanned<Node>>,
    line_index: LineIndex,
    escaper: Box<dyn Escaper>,
}

/// Escaping decision for one interpolation, after filters
enum EscapeMode {
    /// Escape unless the value is pre-sanitized
    Default,
    /// Emit verbatim (`|raw`)
    Raw,
    /// Escape unconditionally (`|escape`)
    Forced,
}

impl std::fmt::Debug for RenderUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderUnit")
            .field("name", &self.name)
            .field("nodes", &self.nodes.len())
            .finish_non_exhaustive()
    }
}

impl RenderUnit {
    pub fn new(name: impl Into<String>, nodes: Vec<Spanned<Node>>, line_index: LineIndex) -> Self {
        Self {
            name: name.into(),
            nodes,
            line_index,
            escaper: Box::new(HtmlEscaper),
        }
    }

    /// Replace the default HTML escaper
    pub fn with_escaper(mut self, escaper: Box<dyn Escaper>) -> Self {
        self.escaper = escaper;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render against the given context
    ///
    /// A type mismatch anywhere in the template fails the whole render;
    /// no partial output is returned.
    pub fn render(&self, context: &Context) -> Result<String, RenderError> {
        let mut scope = Scope::new(context);
        let mut out = String::new();
        self.render_nodes(&self.nodes, &mut scope, &mut out)?;
        Ok(out)
    }

    fn render_nodes(
        &self,
        nodes: &[Spanned<Node>],
        scope: &mut Scope<'_>,
        out: &mut String,
    ) -> Result<(), RenderError> {
        for node in nodes {
            match &node.node {
                Node::Text(text) => out.push_str(text),
                Node::Interp { expr, filters } => {
                    let value = self.eval(expr, scope)?;
                    out.push_str(&self.print(&value, filters, &expr.span)?);
                }
                Node::If {
                    cond,
                    then_branch,
                    else_branch,
                } => {
                    if self.eval(cond, scope)?.is_truthy() {
                        self.render_nodes(then_branch, scope, out)?;
                    } else {
                        self.render_nodes(else_branch, scope, out)?;
                    }
                }
                Node::For { var, iter, body } => {
                    let items = match self.eval(iter, scope)? {
                        Value::List(items) => items,
                        // Looping over absent data renders nothing
                        Value::Undefined => Vec::new(),
                        other => {
                            return Err(RenderError::NotIterable {
                                template: self.name.clone(),
                                found: other.type_name(),
                                line: self.line_of(&iter.span),
                            });
                        }
                    };
                    for item in items {
                        scope.push_frame();
                        scope.set(var.node.as_str(), item);
                        self.render_nodes(body, scope, out)?;
                        scope.pop_frame();
                    }
                }
                Node::Set { name, value } => {
                    let value = self.eval(value, scope)?;
                    scope.set(name.node.as_str(), value);
                }
            }
        }
        Ok(())
    }

    /// Stringify an interpolated value, applying filters and escaping
    fn print(
        &self,
        value: &Value,
        filters: &[Spanned<Identifier>],
        span: &Span,
    ) -> Result<String, RenderError> {
        let (text, presanitized) = match value {
            Value::Undefined => (String::new(), true),
            Value::Bool(b) => (b.to_string(), false),
            Value::Number(n) => (format_number(*n), false),
            Value::String(s) => (s.clone(), false),
            Value::Markup(s) => (s.clone(), true),
            Value::Attributes(attrs) => (attrs.render(self.escaper.as_ref()), true),
            Value::List(_) | Value::Map(_) => {
                return Err(RenderError::NotPrintable {
                    template: self.name.clone(),
                    found: value.type_name(),
                    line: self.line_of(span),
                });
            }
        };

        let mut mode = EscapeMode::Default;
        for filter in filters {
            mode = match filter.node.as_str() {
                "raw" => EscapeMode::Raw,
                "escape" => EscapeMode::Forced,
                other => {
                    return Err(RenderError::UnknownFilter {
                        template: self.name.clone(),
                        name: other.to_string(),
                        line: self.line_of(&filter.span),
                    });
                }
            };
        }

        Ok(match mode {
            EscapeMode::Raw => text,
            EscapeMode::Forced => self.escaper.escape(&text),
            EscapeMode::Default if presanitized => text,
            EscapeMode::Default => self.escaper.escape(&text),
        })
    }

    fn eval(&self, expr: &Spanned<Expr>, scope: &mut Scope<'_>) -> Result<Value, RenderError> {
        match &expr.node {
            Expr::Str(s) => Ok(Value::String(s.clone())),
            Expr::Num(n) => Ok(Value::Number(*n)),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval(item, scope)?);
                }
                Ok(Value::List(values))
            }
            Expr::Var(name) => Ok(scope.lookup(name.as_str()).clone()),
            Expr::Member { target, name } => {
                let target = self.eval(target, scope)?;
                Ok(target.get(name.node.as_str()).clone())
            }
            Expr::MethodCall {
                target,
                method,
                args,
            } => {
                let receiver = self.eval(target, scope)?;
                match (&receiver, method.node.as_str()) {
                    (Value::Attributes(attrs), "addClass") => {
                        let mut tokens = Vec::new();
                        for arg in args {
                            let value = self.eval(arg, scope)?;
                            collect_class_tokens(&value, &mut tokens);
                        }
                        Ok(Value::Attributes(attrs.add_classes(tokens)))
                    }
                    // Calling through absent data stays lenient
                    (Value::Undefined, _) => Ok(Value::Undefined),
                    _ => Err(RenderError::UnknownMethod {
                        template: self.name.clone(),
                        method: method.node.as_str().to_string(),
                        found: receiver.type_name(),
                        line: self.line_of(&method.span),
                    }),
                }
            }
            Expr::FunctionCall { name, .. } => Err(RenderError::UnknownFunction {
                template: self.name.clone(),
                name: name.node.as_str().to_string(),
                line: self.line_of(&name.span),
            }),
            Expr::Not(inner) => Ok(Value::Bool(!self.eval(inner, scope)?.is_truthy())),
            Expr::And(lhs, rhs) => {
                if !self.eval(lhs, scope)?.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(self.eval(rhs, scope)?.is_truthy()))
            }
            Expr::Or(lhs, rhs) => {
                if self.eval(lhs, scope)?.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(self.eval(rhs, scope)?.is_truthy()))
            }
            Expr::Ternary {
                cond,
                then,
                otherwise,
            } => {
                if self.eval(cond, scope)?.is_truthy() {
                    self.eval(then, scope)
                } else {
                    self.eval(otherwise, scope)
                }
            }
        }
    }

    fn line_of(&self, span: &Span) -> u32 {
        self.line_index.line_of(span.start)
    }
}

/// Class-token extraction for `addClass` arguments
///
/// Strings contribute one token, lists contribute their string items,
/// and absent or non-string values contribute nothing.
fn collect_class_tokens(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) | Value::Markup(s) => out.push(s.clone()),
        Value::Number(n) => out.push(format_number(*n)),
        Value::List(items) => {
            for item in items {
                collect_class_tokens(item, out);
            }
        }
        Value::Undefined | Value::Bool(_) | Value::Map(_) | Value::Attributes(_) => {}
    }
}

/// Integral floats print without a fractional part
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Per-render variable scope
///
/// `set` bindings live in frames layered over the caller's context; the
/// context itself is never written. Each loop iteration gets its own
/// frame so the loop variable does not leak.
struct Scope<'a> {
    context: &'a Context,
    frames: Vec<HashMap<String, Value>>,
}

impl<'a> Scope<'a> {
    fn new(context: &'a Context) -> Self {
        Self {
            context,
            frames: vec![HashMap::new()],
        }
    }

    fn push_frame(&mut self) {
        self.frames.push(HashMap::new());
    }

    fn pop_frame(&mut self) {
        self.frames.pop();
    }

    fn lookup(&self, name: &str) -> &Value {
        for frame in self.frames.iter().rev() {
            if let Some(value) = frame.get(name) {
                return value;
            }
        }
        self.context.get(name)
    }

    fn set(&mut self, name: &str, value: Value) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string(), value);
        }
    }
}
