//! sprig: a small, policy-checked HTML template engine
//!
//! Templates are compiled in two stages. The compiler lexes and parses
//! source text into a spanned AST and validates it against a fail-closed
//! [`SecurityPolicy`]; the resulting [`RenderUnit`] is an immutable value
//! that can render any number of contexts. Interpolated output is
//! HTML-escaped by default, absent context data renders as nothing, and
//! attribute objects support functional class merging.
//!
//! ```
//! use sprig::{compile, Context};
//!
//! let compiled = compile("<h2>{{ title }}</h2>", "heading.html")?;
//! let mut ctx = Context::new();
//! ctx.insert("title", "Fieldsets & legends");
//! let out = compiled.unit.render(&ctx)?;
//! assert_eq!(out, "<h2>Fieldsets &amp; legends</h2>");
//! # Ok::<(), sprig::TemplateError>(())
//! ```

pub mod compiler;
pub mod error;
pub mod policy;
pub mod registry;
pub mod renderer;
pub mod runtime;

pub use compiler::{CompiledTemplate, DebugMap, SecurityPolicyError};
pub use error::CompileError;
pub use policy::{PolicyError, SecurityPolicy};
pub use registry::ModuleRegistry;
pub use renderer::{RenderError, RenderUnit};
pub use runtime::{Attributes, Context, Escaper, HtmlEscaper, Value};

use thiserror::Error;

/// Any failure across the compile/render pipeline
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("compilation failed with {} error(s)", .0.len())]
    Compile(Vec<CompileError>),

    #[error(transparent)]
    Security(#[from] SecurityPolicyError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Compile a template under the default security policy
pub fn compile(source: &str, name: &str) -> Result<CompiledTemplate, TemplateError> {
    compiler::compile(source, name, &SecurityPolicy::default())
}

/// Compile a template under an explicit security policy
pub fn compile_with_policy(
    source: &str,
    name: &str,
    policy: &SecurityPolicy,
) -> Result<CompiledTemplate, TemplateError> {
    compiler::compile(source, name, policy)
}

/// One-shot convenience: compile under the default policy and render
pub fn render(source: &str, name: &str, context: &Context) -> Result<String, TemplateError> {
    let compiled = compile(source, name)?;
    Ok(compiled.unit.render(context)?)
}
