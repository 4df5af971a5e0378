//! Grammar for Java fragments inside directives, using chumsky
//!
//! The template scanner hands over the text between a directive's
//! parentheses. Spans in the results are byte ranges relative to that
//! fragment; the scanner maps them back into the template.

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::model::Span;
use crate::parser::lexer::{lex, Token};

/// One `Type name` entry of an `@args` list
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentDecl {
    pub type_span: Span,
    pub name: String,
    /// From the type's first token to the name's last
    pub span: Span,
}

/// One `[Type] name = value` entry of a `@with` list
#[derive(Debug, Clone, PartialEq)]
pub struct BindingDecl {
    pub type_span: Option<Span>,
    pub name: String,
    pub value_span: Span,
}

/// An expression split at its top-level `?:`, if any
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionDecl {
    pub left: Span,
    pub right: Option<Span>,
}

/// A grammar error, positioned within the fragment
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentError {
    pub span: Span,
    pub message: String,
    pub expected: Vec<String>,
}

impl<'a> From<Rich<'a, Token>> for FragmentError {
    fn from(err: Rich<'a, Token>) -> Self {
        let message = match err.reason() {
            chumsky::error::RichReason::Custom(msg) => msg.to_string(),
            _ => match err.found() {
                Some(tok) => format!("Unexpected {}", format_token(tok)),
                None => "Unexpected end of input".to_string(),
            },
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                chumsky::error::RichPattern::Token(tok) => Some(format_token(tok)),
                chumsky::error::RichPattern::EndOfInput => Some("end of input".to_string()),
                _ => None,
            })
            .collect();

        FragmentError {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &Token) -> String {
    match tok {
        Token::Ident(s) => format!("identifier '{}'", s),
        Token::StringLit(s) => format!("string {}", s),
        Token::CharLit(s) => format!("character {}", s),
        Token::Number(n) => format!("number {}", n),
        Token::Punct(p) => format!("'{}'", p),
        Token::Extends => "keyword 'extends'".to_string(),
        Token::Super => "keyword 'super'".to_string(),
        Token::Final => "keyword 'final'".to_string(),
        Token::ParenOpen => "'('".to_string(),
        Token::ParenClose => "')'".to_string(),
        Token::BracketOpen => "'['".to_string(),
        Token::BracketClose => "']'".to_string(),
        Token::BraceOpen => "'{'".to_string(),
        Token::BraceClose => "'}'".to_string(),
        Token::AngleOpen => "'<'".to_string(),
        Token::AngleClose => "'>'".to_string(),
        Token::Comma => "','".to_string(),
        Token::Ellipsis => "'...'".to_string(),
        Token::Dot => "'.'".to_string(),
        Token::Elvis => "'?:'".to_string(),
        Token::Question => "'?'".to_string(),
        Token::Assign => "'='".to_string(),
    }
}

/// Lex a fragment, rejecting characters no token matches
fn tokens(fragment: &str) -> Result<Vec<(Token, SimpleSpan)>, Vec<FragmentError>> {
    lex(fragment)
        .map(|result| match result {
            Ok((tok, span)) => Ok((tok, span.into())),
            Err(span) => Err(vec![FragmentError {
                message: format!("Unexpected character '{}'", &fragment[span.clone()]),
                span,
                expected: vec![],
            }]),
        })
        .collect()
}

/// Parse the inside of `@args (...)`
pub fn parse_arguments(fragment: &str) -> Result<Vec<ArgumentDecl>, Vec<FragmentError>> {
    let len = fragment.len();
    let token_stream = Stream::from_iter(tokens(fragment)?.into_iter())
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    argument_list_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Parse the inside of `@with (...)`
pub fn parse_bindings(fragment: &str) -> Result<Vec<BindingDecl>, Vec<FragmentError>> {
    let len = fragment.len();
    let token_stream = Stream::from_iter(tokens(fragment)?.into_iter())
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    binding_list_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Parse the inside of `@(...)`, splitting at a top-level `?:`
pub fn parse_expression(fragment: &str) -> Result<ExpressionDecl, Vec<FragmentError>> {
    let len = fragment.len();
    let token_stream = Stream::from_iter(tokens(fragment)?.into_iter())
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    expression_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

/// Any balanced token sequence: a bracketed group, or a single
/// non-delimiter token
fn token_tree<'a, I>() -> impl Parser<'a, I, (), extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    recursive(|tree| {
        let trees = tree.repeated().collect::<Vec<()>>();
        choice((
            trees
                .clone()
                .delimited_by(just(Token::ParenOpen), just(Token::ParenClose))
                .ignored(),
            trees
                .clone()
                .delimited_by(just(Token::BracketOpen), just(Token::BracketClose))
                .ignored(),
            trees
                .delimited_by(just(Token::BraceOpen), just(Token::BraceClose))
                .ignored(),
            any().filter(|t: &Token| !t.is_delimiter()).ignored(),
        ))
    })
}

/// A non-empty expression ending before a top-level `stop` token
fn expression_until<'a, I>(
    stop: Option<Token>,
) -> impl Parser<'a, I, Span, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let top_level = any()
        .filter(move |t: &Token| Some(t) != stop.as_ref())
        .rewind()
        .ignore_then(token_tree());

    top_level
        .repeated()
        .at_least(1)
        .collect::<Vec<()>>()
        .map_with(|_, e| span_range(&e.span()))
}

/// Java type: qualified name, optional type arguments, array suffixes
fn java_type<'a, I>() -> impl Parser<'a, I, (), extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let ident = select! { Token::Ident(s) => s };

    recursive(|ty| {
        let qualified = ident
            .separated_by(just(Token::Dot))
            .at_least(1)
            .collect::<Vec<_>>();

        let wildcard = just(Token::Question)
            .then(
                choice((just(Token::Extends), just(Token::Super)))
                    .then(ty.clone())
                    .or_not(),
            )
            .ignored();

        let type_args = choice((wildcard, ty.clone()))
            .separated_by(just(Token::Comma))
            .at_least(1)
            .collect::<Vec<()>>()
            .delimited_by(just(Token::AngleOpen), just(Token::AngleClose));

        let array = just(Token::BracketOpen).then(just(Token::BracketClose));

        qualified
            .then(type_args.or_not())
            .then(array.repeated().collect::<Vec<_>>())
            .ignored()
    })
}

fn identifier<'a, I>() -> impl Parser<'a, I, (String, Span), extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    select! { Token::Ident(s) => s }
        .map_with(|s, e| (s, span_range(&e.span())))
}

fn argument_list_parser<'a, I>(
) -> impl Parser<'a, I, Vec<ArgumentDecl>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    // Varargs are part of the declared type: `String... names`
    let declared_type = java_type()
        .then(just(Token::Ellipsis).or_not())
        .map_with(|_, e| span_range(&e.span()));

    let argument = just(Token::Final)
        .or_not()
        .ignore_then(declared_type)
        .then(identifier())
        .map(|(type_span, (name, name_span))| ArgumentDecl {
            span: type_span.start..name_span.end,
            type_span,
            name,
        });

    argument
        .separated_by(just(Token::Comma))
        .collect::<Vec<_>>()
        .then_ignore(end())
}

fn binding_list_parser<'a, I>(
) -> impl Parser<'a, I, Vec<BindingDecl>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    // Typed form first; a bare name also parses as a type
    let target = choice((
        java_type()
            .map_with(|_, e| span_range(&e.span()))
            .then(identifier())
            .map(|(type_span, name)| (Some(type_span), name)),
        identifier().map(|name| (None, name)),
    ));

    let binding = target
        .then_ignore(just(Token::Assign))
        .then(expression_until(Some(Token::Comma)))
        .map(|((type_span, (name, _)), value_span)| BindingDecl {
            type_span,
            name,
            value_span,
        });

    binding
        .separated_by(just(Token::Comma))
        .at_least(1)
        .collect::<Vec<_>>()
        .then_ignore(end())
}

fn expression_parser<'a, I>(
) -> impl Parser<'a, I, ExpressionDecl, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    expression_until(Some(Token::Elvis))
        .then(
            just(Token::Elvis)
                .ignore_then(expression_until(None))
                .or_not(),
        )
        .then_ignore(end())
        .map(|(left, right)| ExpressionDecl { left, right })
}
