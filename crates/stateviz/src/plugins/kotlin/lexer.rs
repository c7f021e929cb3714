//! Kotlin lexer using chumsky
//!
//! Splits Kotlin source into the coarse tokens the tree builder needs.
//! Comments and inline whitespace are dropped; newlines are kept because
//! they terminate statements. Characters no rule recognizes become
//! [`Token::Unknown`] instead of failing the lex.

use std::ops::Range;

use chumsky::prelude::*;
use chumsky::span::{SimpleSpan, Span};

use crate::core::chumsky_utils::trivia;
use crate::core::StatevizError;

/// A value paired with its byte range in the source
pub type Spanned<T> = (T, Range<usize>);

/// Lexical token; payloads borrow the matched source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'src> {
    /// Plain or back-ticked identifier, keywords included
    Ident(&'src str),
    /// String literal including its quotes
    Str(&'src str),
    Char(&'src str),
    Number(&'src str),
    /// Operator or punctuation
    Punct(&'src str),
    Open(char),
    Close(char),
    Newline,
    Unknown(&'src str),
}

impl Token<'_> {
    pub fn is_punct(&self, text: &str) -> bool {
        matches!(self, Token::Punct(p) if *p == text)
    }
}

/// Build the Kotlin lexer
pub fn lexer<'src>() -> impl Parser<'src, &'src str, Vec<Spanned<Token<'src>>>> {
    let ident_start = any().filter(|c: &char| c.is_alphabetic() || *c == '_');
    let ident_rest = any().filter(|c: &char| c.is_alphanumeric() || *c == '_');
    let plain_ident = ident_start.then(ident_rest.repeated()).to_slice();
    let quoted_ident = just('`')
        .then(none_of("`\n").repeated())
        .then(just('`'))
        .to_slice();
    let ident = quoted_ident.or(plain_ident).map(Token::Ident);

    let escape = just('\\').then(any()).ignored();
    let template = just("${")
        .then(none_of("}\n").repeated())
        .then(just('}'))
        .ignored();

    let raw_string = just("\"\"\"")
        .then(any().and_is(just("\"\"\"").not()).repeated())
        .then(just("\"\"\""))
        .to_slice();
    let plain_string = just('"')
        .then(
            choice((escape.clone(), template, none_of("\\\"\n").ignored())).repeated(),
        )
        .then(just('"'))
        .to_slice();
    let string = raw_string.or(plain_string).map(Token::Str);

    let char_literal = just('\'')
        .then(
            escape
                .or(none_of("\\'\n").ignored())
                .repeated()
                .at_least(1),
        )
        .then(just('\''))
        .to_slice()
        .map(Token::Char);

    let number_tail = any()
        .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_')
        .repeated();
    let number = one_of('0'..='9')
        .then(number_tail.clone())
        .then(just('.').then(one_of('0'..='9')).then(number_tail).or_not())
        .to_slice()
        .map(Token::Number);

    // Longest operators first
    let multi_punct = choice((
        just("==="),
        just("!=="),
        just("?."),
        just("?:"),
        just("::"),
        just("->"),
        just("!!"),
        just(".."),
        just("=="),
        just("!="),
        just("<="),
        just(">="),
        just("&&"),
        just("||"),
        just("++"),
        just("--"),
        just("+="),
        just("-="),
        just("*="),
        just("/="),
        just("%="),
    ));
    let punct = multi_punct
        .ignored()
        .or(one_of("+-*/%<>=!?:.,;@&|^~#$").ignored())
        .to_slice()
        .map(Token::Punct);

    let open = one_of("({[").map(Token::Open);
    let close = one_of(")}]").map(Token::Close);
    let newline = just('\n').to(Token::Newline);
    let unknown = any().to_slice().map(Token::Unknown);

    let token = choice((
        newline,
        string,
        char_literal,
        number,
        ident,
        punct,
        open,
        close,
        unknown,
    ))
    .map_with(|token, e| {
        let span: SimpleSpan = e.span();
        (token, span.start()..span.end())
    });

    trivia()
        .ignore_then(token.then_ignore(trivia()).repeated().collect::<Vec<_>>())
        .then_ignore(end())
}

/// Lex a complete source unit
pub fn tokenize(source: &str) -> Result<Vec<Spanned<Token<'_>>>, StatevizError> {
    lexer()
        .parse(source)
        .into_result()
        .map_err(|errors| StatevizError::parse_error(format!("{:?}", errors), 1, 1))
}
