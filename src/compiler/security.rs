//! Allow-list validation for compiled templates
//!
//! Runs after parsing and before a render unit is emitted. The check is
//! fail-closed: a disallowed construct aborts compilation outright rather
//! than being stripped from the output.

use thiserror::Error;

use crate::compiler::ast::{Expr, Node, Spanned};
use crate::compiler::debug::LineIndex;
use crate::policy::SecurityPolicy;

/// Use of a construct outside the policy allow-lists
#[derive(Debug, Error)]
pub enum SecurityPolicyError {
    #[error("template {template}: tag '{name}' is not allowed by the security policy (line {line})")]
    Tag {
        template: String,
        name: String,
        line: u32,
    },

    #[error("template {template}: filter '{name}' is not allowed by the security policy (line {line})")]
    Filter {
        template: String,
        name: String,
        line: u32,
    },

    #[error("template {template}: function '{name}' is not allowed by the security policy (line {line})")]
    Function {
        template: String,
        name: String,
        line: u32,
    },
}

/// Validate every tag, filter, and function a template uses
///
/// Runs unconditionally, including against empty allow-lists (then only
/// literal text and default-escaped interpolation pass).
pub fn check(
    nodes: &[Spanned<Node>],
    policy: &SecurityPolicy,
    index: &LineIndex,
    template: &str,
) -> Result<(), SecurityPolicyError> {
    for node in nodes {
        if let Some(tag) = node.node.tag_name() {
            if !policy.allows_tag(tag) {
                return Err(SecurityPolicyError::Tag {
                    template: template.to_string(),
                    name: tag.to_string(),
                    line: index.line_of(node.span.start),
                });
            }
        }

        match &node.node {
            Node::Text(_) => {}
            Node::Interp { expr, filters } => {
                check_expr(expr, policy, index, template)?;
                for filter in filters {
                    if !policy.allows_filter(filter.node.as_str()) {
                        return Err(SecurityPolicyError::Filter {
                            template: template.to_string(),
                            name: filter.node.as_str().to_string(),
                            line: index.line_of(filter.span.start),
                        });
                    }
                }
            }
            Node::If {
                cond,
                then_branch,
                else_branch,
            } => {
                check_expr(cond, policy, index, template)?;
                check(then_branch, policy, index, template)?;
                check(else_branch, policy, index, template)?;
            }
            Node::For { iter, body, .. } => {
                check_expr(iter, policy, index, template)?;
                check(body, policy, index, template)?;
            }
            Node::Set { value, .. } => check_expr(value, policy, index, template)?,
        }
    }
    Ok(())
}

fn check_expr(
    expr: &Spanned<Expr>,
    policy: &SecurityPolicy,
    index: &LineIndex,
    template: &str,
) -> Result<(), SecurityPolicyError> {
    match &expr.node {
        Expr::Str(_) | Expr::Num(_) | Expr::Bool(_) | Expr::Var(_) => Ok(()),
        Expr::List(items) => {
            for item in items {
                check_expr(item, policy, index, template)?;
            }
            Ok(())
        }
        Expr::Member { target, .. } => check_expr(target, policy, index, template),
        Expr::MethodCall { target, args, .. } => {
            check_expr(target, policy, index, template)?;
            for arg in args {
                check_expr(arg, policy, index, template)?;
            }
            Ok(())
        }
        Expr::FunctionCall { name, args } => {
            if !policy.allows_function(name.node.as_str()) {
                return Err(SecurityPolicyError::Function {
                    template: template.to_string(),
                    name: name.node.as_str().to_string(),
                    line: index.line_of(name.span.start),
                });
            }
            for arg in args {
                check_expr(arg, policy, index, template)?;
            }
            Ok(())
        }
        Expr::Not(inner) => check_expr(inner, policy, index, template),
        Expr::And(lhs, rhs) | Expr::Or(lhs, rhs) => {
            check_expr(lhs, policy, index, template)?;
            check_expr(rhs, policy, index, template)
        }
        Expr::Ternary {
            cond,
            then,
            otherwise,
        } => {
            check_expr(cond, policy, index, template)?;
            check_expr(then, policy, index, template)?;
            check_expr(otherwise, policy, index, template)
        }
    }
}
