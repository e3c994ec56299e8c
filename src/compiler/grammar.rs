//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::compiler::ast::*;
use crate::compiler::lexer::{self, Token};
use crate::error::CompileError;

/// Parse template source into a spanned directive sequence
pub fn parse(source: &str) -> Result<Vec<Spanned<Node>>, Vec<CompileError>> {
    let len = source.len();

    let tokens = lexer::lex(source).map_err(|e| vec![e])?;
    let token_iter = tokens.into_iter().map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    template_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn template_parser<'a, I>(
) -> impl Parser<'a, I, Vec<Spanned<Node>>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let identifier = select! {
        Token::Ident(s) => Identifier::new(s),
    }
    .map_with(|id, e| Spanned::new(id, span_range(&e.span())));

    // Expression grammar, lowest precedence last: postfix access, `not`,
    // `and`, `or`, then the ternary
    let expr = recursive(|expr| {
        let literal = select! {
            Token::Str(s) => Expr::Str(s),
            Token::Number(n) => Expr::Num(n),
            Token::True => Expr::Bool(true),
            Token::False => Expr::Bool(false),
        }
        .map_with(|v, e| Spanned::new(v, span_range(&e.span())));

        let list = expr
            .clone()
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just(Token::BracketOpen), just(Token::BracketClose))
            .map_with(|items, e| Spanned::new(Expr::List(items), span_range(&e.span())));

        let call_args = expr
            .clone()
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just(Token::ParenOpen), just(Token::ParenClose));

        // Bare identifier is a variable; identifier followed by parens is a
        // function call (subject to the policy's function allow-list)
        let var_or_call =
            identifier
                .then(call_args.clone().or_not())
                .map_with(|(name, args), e| {
                    let node = match args {
                        Some(args) => Expr::FunctionCall { name, args },
                        None => Expr::Var(name.node),
                    };
                    Spanned::new(node, span_range(&e.span()))
                });

        let parens = expr
            .clone()
            .delimited_by(just(Token::ParenOpen), just(Token::ParenClose));

        let atom = choice((literal, list, var_or_call, parens));

        // Postfix chain: `a.b.c` member access, `a.addClass(x)` method call
        let postfix = atom
            .then(
                just(Token::Dot)
                    .ignore_then(identifier)
                    .then(call_args.or_not())
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .map(|(base, accesses)| {
                accesses.into_iter().fold(base, |target, (name, args)| {
                    let span = target.span.start..name.span.end;
                    let node = match args {
                        Some(args) => Expr::MethodCall {
                            target: Box::new(target),
                            method: name,
                            args,
                        },
                        None => Expr::Member {
                            target: Box::new(target),
                            name,
                        },
                    };
                    Spanned::new(node, span)
                })
            });

        let negation = just(Token::Not)
            .repeated()
            .collect::<Vec<_>>()
            .then(postfix)
            .map(|(nots, inner)| {
                nots.into_iter().fold(inner, |inner, _| {
                    let span = inner.span.clone();
                    Spanned::new(Expr::Not(Box::new(inner)), span)
                })
            });

        let conjunction = negation
            .clone()
            .then(
                just(Token::And)
                    .ignore_then(negation)
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .map(|(first, rest)| {
                rest.into_iter().fold(first, |lhs, rhs| {
                    let span = lhs.span.start..rhs.span.end;
                    Spanned::new(Expr::And(Box::new(lhs), Box::new(rhs)), span)
                })
            });

        let disjunction = conjunction
            .clone()
            .then(
                just(Token::Or)
                    .ignore_then(conjunction)
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .map(|(first, rest)| {
                rest.into_iter().fold(first, |lhs, rhs| {
                    let span = lhs.span.start..rhs.span.end;
                    Spanned::new(Expr::Or(Box::new(lhs), Box::new(rhs)), span)
                })
            });

        // Ternary: `cond ? a : b`; the branches may themselves be ternaries
        disjunction
            .then(
                just(Token::Question)
                    .ignore_then(expr.clone())
                    .then_ignore(just(Token::Colon))
                    .then(expr.clone())
                    .or_not(),
            )
            .map(|(cond, branches)| match branches {
                Some((then, otherwise)) => {
                    let span = cond.span.start..otherwise.span.end;
                    Spanned::new(
                        Expr::Ternary {
                            cond: Box::new(cond),
                            then: Box::new(then),
                            otherwise: Box::new(otherwise),
                        },
                        span,
                    )
                }
                None => cond,
            })
            .boxed()
    });

    let text = select! {
        Token::Text(s) => Node::Text(s),
    }
    .map_with(|n, e| Spanned::new(n, span_range(&e.span())));

    // Interpolation: `{{ expr }}` with optional `|filter` chain
    let interpolation = expr
        .clone()
        .then(
            just(Token::Pipe)
                .ignore_then(identifier)
                .repeated()
                .collect::<Vec<_>>(),
        )
        .delimited_by(just(Token::VarOpen), just(Token::VarClose))
        .map_with(|(value, filters), e| {
            Spanned::new(
                Node::Interp {
                    expr: value,
                    filters,
                },
                span_range(&e.span()),
            )
        });

    // Recursive node parser for nested block bodies
    let node = recursive(|node| {
        let body = node.clone().repeated().collect::<Vec<_>>();

        let if_block = just(Token::TagOpen)
            .ignore_then(just(Token::If))
            .ignore_then(expr.clone())
            .then_ignore(just(Token::TagClose))
            .then(body.clone())
            .then(
                just(Token::TagOpen)
                    .ignore_then(just(Token::Else))
                    .ignore_then(just(Token::TagClose))
                    .ignore_then(body.clone())
                    .or_not(),
            )
            .then_ignore(
                just(Token::TagOpen)
                    .ignore_then(just(Token::EndIf))
                    .then_ignore(just(Token::TagClose)),
            )
            .map_with(|((cond, then_branch), else_branch), e| {
                Spanned::new(
                    Node::If {
                        cond,
                        then_branch,
                        else_branch: else_branch.unwrap_or_default(),
                    },
                    span_range(&e.span()),
                )
            });

        let for_block = just(Token::TagOpen)
            .ignore_then(just(Token::For))
            .ignore_then(identifier)
            .then_ignore(just(Token::In))
            .then(expr.clone())
            .then_ignore(just(Token::TagClose))
            .then(body)
            .then_ignore(
                just(Token::TagOpen)
                    .ignore_then(just(Token::EndFor))
                    .then_ignore(just(Token::TagClose)),
            )
            .map_with(|((var, iter), body), e| {
                Spanned::new(Node::For { var, iter, body }, span_range(&e.span()))
            });

        let set_stmt = just(Token::Set)
            .ignore_then(identifier)
            .then_ignore(just(Token::Equals))
            .then(expr.clone())
            .delimited_by(just(Token::TagOpen), just(Token::TagClose))
            .map_with(|(name, value), e| {
                Spanned::new(Node::Set { name, value }, span_range(&e.span()))
            });

        choice((text, interpolation, if_block, for_block, set_stmt)).boxed()
    });

    node.repeated().collect().then_ignore(end())
}
