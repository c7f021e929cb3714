//! Shared chumsky parser utilities for host-language lexing
//!
//! Trivia (whitespace and comments) handling shared by source lexers.
//! Newlines are not trivia: in Kotlin they terminate
//! statements, so lexers emit them as tokens.

use chumsky::prelude::*;

/// Parse inline whitespace (spaces, tabs, carriage returns, form feeds).
///
/// Requires at least one character so it can be repeated safely.
pub fn inline_whitespace<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    one_of(" \t\r\u{000C}").repeated().at_least(1).ignored()
}

/// Parse a line comment (`//` to end of line, newline not consumed).
pub fn line_comment<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    just("//").ignore_then(none_of('\n').repeated()).ignored()
}

/// Parse a block comment (`/* ... */`, not nested).
pub fn block_comment<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    just("/*")
        .ignore_then(any().and_is(just("*/").not()).repeated())
        .then_ignore(just("*/"))
        .ignored()
}

/// Parse any amount of inline whitespace and comments.
pub fn trivia<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    choice((inline_whitespace(), line_comment(), block_comment()))
        .repeated()
        .ignored()
}
