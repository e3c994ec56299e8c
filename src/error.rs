//! Compile-time error type and diagnostic formatting

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in template source text
pub type Span = std::ops::Range<usize>;

/// Malformed template syntax. Compilation never partially succeeds: the
/// first syntax problem discards the whole compilation.
#[derive(Error, Debug)]
pub enum CompileError {
    /// Invalid character sequence found while lexing
    #[error("Lex error at {span:?}: {message}")]
    Lexer { span: Span, message: String },

    /// Token stream does not form a valid template
    #[error("Syntax error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },
}

impl CompileError {
    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, template_name: &str) -> String {
        let (span, message, expected) = match self {
            CompileError::Lexer { span, message } => (span, message, &[][..]),
            CompileError::Syntax {
                span,
                message,
                expected,
            } => (span, message, expected.as_slice()),
        };

        let expected_str = if expected.is_empty() {
            String::new()
        } else {
            format!("\nExpected: {}", expected.join(", "))
        };

        let mut buf = Vec::new();
        Report::build(ReportKind::Error, template_name, span.start)
            .with_message(message)
            .with_label(
                Label::new((template_name, span.clone()))
                    .with_message(format!("{}{}", message, expected_str))
                    .with_color(Color::Red),
            )
            .finish()
            .write((template_name, Source::from(source)), &mut buf)
            .unwrap();
        String::from_utf8(buf).unwrap()
    }
}

impl<'a> From<chumsky::error::Rich<'a, crate::compiler::lexer::Token>> for CompileError {
    fn from(err: chumsky::error::Rich<'a, crate::compiler::lexer::Token>) -> Self {
        use chumsky::error::RichReason;

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => {
                let found_str = match found {
                    Some(tok) => format_token(tok),
                    None => "end of input".to_string(),
                };
                format!("Unexpected {}", found_str)
            }
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                chumsky::error::RichPattern::Token(tok) => Some(format_token(tok)),
                chumsky::error::RichPattern::Label(label) => Some(label.to_string()),
                chumsky::error::RichPattern::EndOfInput => Some("end of input".to_string()),
                chumsky::error::RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                chumsky::error::RichPattern::Any => Some("any token".to_string()),
                chumsky::error::RichPattern::SomethingElse => None,
            })
            .collect();

        CompileError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &crate::compiler::lexer::Token) -> String {
    use crate::compiler::lexer::Token;
    match tok {
        Token::Text(s) => {
            let short: String = s.chars().take(20).collect();
            format!("template text \"{}\"", short)
        }
        Token::Ident(s) => format!("identifier '{}'", s),
        Token::Str(s) => format!("string \"{}\"", s),
        Token::Number(n) => format!("number {}", n),
        Token::VarOpen => "'{{'".to_string(),
        Token::VarClose => "'}}'".to_string(),
        Token::TagOpen => "'{%'".to_string(),
        Token::TagClose => "'%}'".to_string(),
        Token::If => "keyword 'if'".to_string(),
        Token::Else => "keyword 'else'".to_string(),
        Token::EndIf => "keyword 'endif'".to_string(),
        Token::For => "keyword 'for'".to_string(),
        Token::In => "keyword 'in'".to_string(),
        Token::EndFor => "keyword 'endfor'".to_string(),
        Token::Set => "keyword 'set'".to_string(),
        Token::Not => "keyword 'not'".to_string(),
        Token::And => "keyword 'and'".to_string(),
        Token::Or => "keyword 'or'".to_string(),
        Token::True => "keyword 'true'".to_string(),
        Token::False => "keyword 'false'".to_string(),
        Token::Dot => "'.'".to_string(),
        Token::Comma => "','".to_string(),
        Token::Pipe => "'|'".to_string(),
        Token::ParenOpen => "'('".to_string(),
        Token::ParenClose => "')'".to_string(),
        Token::BracketOpen => "'['".to_string(),
        Token::BracketClose => "']'".to_string(),
        Token::Equals => "'='".to_string(),
        Token::Question => "'?'".to_string(),
        Token::Colon => "':'".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_includes_location() {
        let err = CompileError::Syntax {
            span: 4..6,
            message: "Unexpected '%}'".to_string(),
            expected: vec!["identifier".to_string()],
        };
        let report = err.format("<p>{% %}</p>", "broken.html");
        assert!(report.contains("broken.html"));
        assert!(report.contains("Unexpected"));
    }

    #[test]
    fn test_format_lex_error() {
        let err = CompileError::Lexer {
            span: 3..4,
            message: "unexpected character '@' in directive".to_string(),
        };
        let report = err.format("{{ @ }}", "bad.html");
        assert!(report.contains("bad.html"));
        assert!(report.contains("unexpected character"));
    }
}
