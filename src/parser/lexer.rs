//! Lexer for the Java fragments embedded in directives, using logos
//!
//! Only the pieces of Java the directive grammar needs to tell apart get a
//! dedicated token; everything else is an identifier, a literal or a
//! single punctuation character.

use logos::Logos;

use crate::model::Span;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum Token {
    // Keywords that matter inside type declarations
    #[token("extends")]
    Extends,
    #[token("super")]
    Super,
    #[token("final")]
    Final,

    // Delimiters
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    // Never merged into `>>` so nested generics close one level at a time
    #[token("<")]
    AngleOpen,
    #[token(">")]
    AngleClose,

    #[token(",")]
    Comma,
    // Longer patterns win over their prefixes
    #[token("...")]
    Ellipsis,
    #[token(".")]
    Dot,
    #[token("?:")]
    Elvis,
    #[token("?")]
    Question,
    #[token("=")]
    Assign,

    // Literals - identifiers must come after keywords
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| lex.slice().to_string())]
    StringLit(String),

    #[regex(r"'([^'\\]|\\.)*'", |lex| lex.slice().to_string())]
    CharLit(String),

    #[regex(r"[0-9][0-9a-zA-Z_]*", |lex| lex.slice().to_string())]
    Number(String),

    #[regex(r"[-+*/%!&|^~:;#@]", |lex| lex.slice().to_string())]
    Punct(String),
}

impl Token {
    pub fn is_delimiter(&self) -> bool {
        matches!(
            self,
            Token::ParenOpen
                | Token::ParenClose
                | Token::BracketOpen
                | Token::BracketClose
                | Token::BraceOpen
                | Token::BraceClose
        )
    }
}

/// Lex input string into tokens with spans
///
/// Input the lexer cannot match is returned as `Err(span)`.
pub fn lex(input: &str) -> impl Iterator<Item = Result<(Token, Span), Span>> + '_ {
    Token::lexer(input).spanned().map(|(tok, span)| match tok {
        Ok(t) => Ok((t, span)),
        Err(()) => Err(span),
    })
}
