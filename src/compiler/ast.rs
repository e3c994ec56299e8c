//! Abstract syntax tree for compiled templates

/// Byte range in template source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Valid identifier (alphanumeric + underscore, starts with letter/_)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A directive in the compiled sequence
///
/// A template compiles to a flat sequence of these at the top level, with
/// conditional and loop bodies nested inside their owning node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal text emitted verbatim
    Text(String),
    /// Interpolation: `{{ expr }}` with optional trailing filters
    Interp {
        expr: Spanned<Expr>,
        filters: Vec<Spanned<Identifier>>,
    },
    /// Conditional: `{% if expr %} ... {% else %} ... {% endif %}`
    If {
        cond: Spanned<Expr>,
        then_branch: Vec<Spanned<Node>>,
        else_branch: Vec<Spanned<Node>>,
    },
    /// Loop: `{% for var in expr %} ... {% endfor %}`
    For {
        var: Spanned<Identifier>,
        iter: Spanned<Expr>,
        body: Vec<Spanned<Node>>,
    },
    /// Render-local binding: `{% set name = expr %}`
    Set {
        name: Spanned<Identifier>,
        value: Spanned<Expr>,
    },
}

impl Node {
    /// Tag name for security checking, or None for non-tag nodes
    pub fn tag_name(&self) -> Option<&'static str> {
        match self {
            Node::If { .. } => Some("if"),
            Node::For { .. } => Some("for"),
            Node::Set { .. } => Some("set"),
            Node::Text(_) | Node::Interp { .. } => None,
        }
    }
}

/// Expression evaluated against a render context
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// String literal
    Str(String),
    /// Numeric literal
    Num(f64),
    /// Boolean literal
    Bool(bool),
    /// List literal: `[a, b, c]`
    List(Vec<Spanned<Expr>>),
    /// Context variable reference
    Var(Identifier),
    /// Member access on a value: `target.name`
    ///
    /// Resolves leniently: an absent member or an undefined target yields
    /// the undefined value, never an error.
    Member {
        target: Box<Spanned<Expr>>,
        name: Spanned<Identifier>,
    },
    /// Method call on a value: `target.name(args)`
    MethodCall {
        target: Box<Spanned<Expr>>,
        method: Spanned<Identifier>,
        args: Vec<Spanned<Expr>>,
    },
    /// Free function call: `name(args)`
    FunctionCall {
        name: Spanned<Identifier>,
        args: Vec<Spanned<Expr>>,
    },
    /// Logical negation: `not expr`
    Not(Box<Spanned<Expr>>),
    /// Short-circuit conjunction: `a and b`
    And(Box<Spanned<Expr>>, Box<Spanned<Expr>>),
    /// Short-circuit disjunction: `a or b`
    Or(Box<Spanned<Expr>>, Box<Spanned<Expr>>),
    /// Ternary: `cond ? then : otherwise`
    Ternary {
        cond: Box<Spanned<Expr>>,
        then: Box<Spanned<Expr>>,
        otherwise: Box<Spanned<Expr>>,
    },
}
