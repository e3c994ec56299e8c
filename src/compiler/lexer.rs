//! Lexer for template source using logos
//!
//! Template source is a mix of literal text and directive regions
//! (`{{ ... }}`, `{% ... %}`, `{# ... #}`). A scanning pass splits the
//! source into those regions; logos then tokenizes the directive interiors,
//! with spans re-offset so every token locates itself in the whole source.

use logos::Logos;

use crate::error::CompileError;

/// Byte range in template source text
pub type Span = std::ops::Range<usize>;

/// Tokens inside a `{{ ... }}` or `{% ... %}` region
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
enum DirToken {
    // Tag keywords
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("endif")]
    EndIf,
    #[token("for")]
    For,
    #[token("in")]
    In,
    #[token("endfor")]
    EndFor,
    #[token("set")]
    Set,

    // Operator keywords
    #[token("not")]
    Not,
    #[token("and")]
    And,
    #[token("or")]
    Or,

    // Boolean literals
    #[token("true")]
    True,
    #[token("false")]
    False,

    // Delimiters and operators
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token("|")]
    Pipe,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token("=")]
    Equals,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,

    // Literals - identifiers must come after keywords
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        s[1..s.len()-1].to_string()
    })]
    #[regex(r#"'([^'\\]|\\.)*'"#, |lex| {
        let s = lex.slice();
        s[1..s.len()-1].to_string()
    })]
    Str(String),

    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),
}

/// Token stream fed to the parser: literal text, region delimiters, and
/// directive-interior tokens
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Literal template text emitted verbatim
    Text(String),
    /// `{{`
    VarOpen,
    /// `}}`
    VarClose,
    /// `{%`
    TagOpen,
    /// `%}`
    TagClose,
    If,
    Else,
    EndIf,
    For,
    In,
    EndFor,
    Set,
    Not,
    And,
    Or,
    True,
    False,
    Dot,
    Comma,
    Pipe,
    ParenOpen,
    ParenClose,
    BracketOpen,
    BracketClose,
    Equals,
    Question,
    Colon,
    Ident(String),
    Str(String),
    Number(f64),
}

impl From<DirToken> for Token {
    fn from(tok: DirToken) -> Self {
        match tok {
            DirToken::If => Token::If,
            DirToken::Else => Token::Else,
            DirToken::EndIf => Token::EndIf,
            DirToken::For => Token::For,
            DirToken::In => Token::In,
            DirToken::EndFor => Token::EndFor,
            DirToken::Set => Token::Set,
            DirToken::Not => Token::Not,
            DirToken::And => Token::And,
            DirToken::Or => Token::Or,
            DirToken::True => Token::True,
            DirToken::False => Token::False,
            DirToken::Dot => Token::Dot,
            DirToken::Comma => Token::Comma,
            DirToken::Pipe => Token::Pipe,
            DirToken::ParenOpen => Token::ParenOpen,
            DirToken::ParenClose => Token::ParenClose,
            DirToken::BracketOpen => Token::BracketOpen,
            DirToken::BracketClose => Token::BracketClose,
            DirToken::Equals => Token::Equals,
            DirToken::Question => Token::Question,
            DirToken::Colon => Token::Colon,
            DirToken::Ident(s) => Token::Ident(s),
            DirToken::Str(s) => Token::Str(s),
            DirToken::Number(n) => Token::Number(n),
        }
    }
}

/// Lex template source into tokens with spans
///
/// Comments (`{# ... #}`) are dropped here and never reach the parser.
pub fn lex(source: &str) -> Result<Vec<(Token, Span)>, CompileError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut text_start = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'{' || pos + 1 >= bytes.len() {
            pos += 1;
            continue;
        }
        let kind = bytes[pos + 1];
        if !matches!(kind, b'{' | b'%' | b'#') {
            pos += 1;
            continue;
        }

        if text_start < pos {
            tokens.push((
                Token::Text(source[text_start..pos].to_string()),
                text_start..pos,
            ));
        }

        let open = pos;
        let body_start = pos + 2;
        let (opener, closer) = match kind {
            b'{' => ("{{", "}}"),
            b'%' => ("{%", "%}"),
            _ => ("{#", "#}"),
        };
        // Comments hold arbitrary prose, not expressions, so an unpaired
        // quote inside one must not hide the closer
        let body_end = match kind {
            b'#' => source[body_start..].find("#}").map(|i| body_start + i),
            _ => find_closer(source, body_start, closer),
        }
        .ok_or_else(|| CompileError::Lexer {
            span: open..source.len(),
            message: format!("unterminated '{}' directive", opener),
        })?;

        match kind {
            b'#' => {} // comment: dropped entirely
            b'{' => {
                tokens.push((Token::VarOpen, open..open + 2));
                lex_directive(source, body_start, body_end, &mut tokens)?;
                tokens.push((Token::VarClose, body_end..body_end + 2));
            }
            _ => {
                tokens.push((Token::TagOpen, open..open + 2));
                lex_directive(source, body_start, body_end, &mut tokens)?;
                tokens.push((Token::TagClose, body_end..body_end + 2));
            }
        }

        pos = body_end + 2;
        text_start = pos;
    }

    if text_start < source.len() {
        tokens.push((
            Token::Text(source[text_start..].to_string()),
            text_start..source.len(),
        ));
    }

    Ok(tokens)
}

/// Find the closing delimiter of a `{{` or `{%` region, skipping quoted
/// strings so a literal like `'}}'` does not end the region early
fn find_closer(source: &str, from: usize, closer: &str) -> Option<usize> {
    let bytes = source.as_bytes();
    let c0 = closer.as_bytes()[0];
    let c1 = closer.as_bytes()[1];
    let mut quote: Option<u8> = None;
    let mut i = from;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 2;
                    continue;
                }
                if b == q {
                    quote = None;
                }
            }
            None => {
                if b == b'\'' || b == b'"' {
                    quote = Some(b);
                } else if b == c0 && i + 1 < bytes.len() && bytes[i + 1] == c1 {
                    return Some(i);
                }
            }
        }
        i += 1;
    }
    None
}

/// Run logos over a directive interior, re-offsetting spans into the source
fn lex_directive(
    source: &str,
    start: usize,
    end: usize,
    out: &mut Vec<(Token, Span)>,
) -> Result<(), CompileError> {
    let body = &source[start..end];
    for (result, span) in DirToken::lexer(body).spanned() {
        let span = start + span.start..start + span.end;
        match result {
            Ok(tok) => out.push((tok.into(), span)),
            Err(()) => {
                return Err(CompileError::Lexer {
                    span: span.clone(),
                    message: format!(
                        "unexpected character '{}' in directive",
                        &source[span.start..span.end]
                    ),
                })
            }
        }
    }
    Ok(())
}
