//! # Whitespace Token Handling
//!
//! Whitespace is emitted as tokens so that spans stay exact and error positions
//! point at the right column. The preprocessor drops these tokens before parsing.
//!
//! * [`Token::Whitespace`]: Spaces and tabs
//! * [`Token::Newline`]: Line breaks (`\n`, `\r\n` and a bare `\r`)

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    combinator::map,
    error::context,
};

use super::token::{ParserResult, Token};

#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_whitespace(input: &str) -> ParserResult<Token> {
    context(
        "whitespace",
        map(take_while1(|c| c == ' ' || c == '\t'), |s: &str| {
            Token::Whitespace(s.to_string())
        }),
    )(input)
}

#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_newline(input: &str) -> ParserResult<Token> {
    context(
        "newline",
        map(alt((tag("\r\n"), tag("\n"), tag("\r"))), |_| Token::Newline),
    )(input)
}
