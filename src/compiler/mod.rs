//! Template compiler: source text in, render unit plus debug map out
//!
//! Compilation runs in three stages: lexing and parsing into a spanned
//! AST, a fail-closed security check against the active policy, and
//! emission of the immutable [`RenderUnit`] alongside its diagnostic
//! [`DebugMap`].

pub mod ast;
pub mod debug;
pub mod grammar;
pub mod lexer;
pub mod security;

pub use debug::{DebugMap, LineIndex};
pub use security::SecurityPolicyError;

use crate::policy::SecurityPolicy;
use crate::renderer::RenderUnit;
use crate::TemplateError;

/// Result of a successful compilation
///
/// The render unit carries everything needed to render; the debug map is
/// a side table for diagnostics and is never consulted during rendering.
#[derive(Debug)]
pub struct CompiledTemplate {
    pub unit: RenderUnit,
    pub debug: DebugMap,
}

/// Compile template source under the given security policy
///
/// Syntax errors and policy violations both abort compilation; a template
/// that compiles is guaranteed to contain only allow-listed constructs.
pub fn compile(
    source: &str,
    name: &str,
    policy: &SecurityPolicy,
) -> Result<CompiledTemplate, TemplateError> {
    let nodes = grammar::parse(source).map_err(TemplateError::Compile)?;
    let line_index = LineIndex::new(source);
    security::check(&nodes, policy, &line_index, name)?;

    let debug = DebugMap::from_nodes(&nodes, &line_index);
    let unit = RenderUnit::new(name, nodes, line_index);
    Ok(CompiledTemplate { unit, debug })
}
