//! Escaping policy applied to interpolated output

/// Escapes raw values before they are concatenated into output
///
/// Injected into a render unit at construction; every interpolated value
/// passes through it unless explicitly marked pre-sanitized.
pub trait Escaper: Send + Sync {
    fn escape(&self, raw: &str) -> String;
}

/// HTML entity escaping, the default policy
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlEscaper;

impl Escaper for HtmlEscaper {
    fn escape(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        for c in raw.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#039;"),
                _ => out.push(c),
            }
        }
        out
    }
}
