//! Render-time failures
//!
//! Type mismatches discovered while rendering abort the whole render; no
//! partial output is returned. Every variant carries the template name and
//! the source line of the offending directive.

use thiserror::Error;

/// A render aborted by a runtime type mismatch or unknown operation
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template {template}: cannot iterate over {found} value (line {line})")]
    NotIterable {
        template: String,
        found: &'static str,
        line: u32,
    },

    #[error("template {template}: cannot print {found} value (line {line})")]
    NotPrintable {
        template: String,
        found: &'static str,
        line: u32,
    },

    #[error("template {template}: unknown filter '{name}' (line {line})")]
    UnknownFilter {
        template: String,
        name: String,
        line: u32,
    },

    #[error("template {template}: no function '{name}' is available (line {line})")]
    UnknownFunction {
        template: String,
        name: String,
        line: u32,
    },

    #[error("template {template}: {found} value has no method '{method}' (line {line})")]
    UnknownMethod {
        template: String,
        method: String,
        found: &'static str,
        line: u32,
    },
}
