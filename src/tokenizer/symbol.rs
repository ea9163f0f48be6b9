//! # Symbol Token Handling
//!
//! This module defines the symbols (operators and delimiters) of the expression
//! language and provides functionality for parsing symbol tokens.
//!
//! ## Symbol Types
//!
//! * [`Operator`]: Arithmetic, comparison, logical and string operators
//! * [`Delimiter`]: Parentheses, brackets, braces and punctuation
//!
//! ## Parsing Strategy
//!
//! Symbols are parsed using a longest-match approach so that `<=`, `<>`, `&&`
//! and `==` are not split into their single character prefixes.
//!
//! ## Operator Precedence
//!
//! The tokenizer does not enforce precedence. The expression parser layers the
//! operators from `||` (loosest) down to the unary operators (tightest).

use strum_macros::{AsRefStr, Display, EnumString};

use nom::{
    branch::alt,
    bytes::complete::tag,
    combinator::{map, value},
    error::context,
};

use super::token::{ParserResult, Token};

/// Represents operators of the expression language.
#[derive(Debug, Clone, PartialEq, Eq, EnumString, Display, AsRefStr)]
pub enum Operator {
    /// Equality comparison operator (`==`)
    #[strum(serialize = "==")]
    EqualEqual,
    /// Inequality comparison operator (`!=`)
    #[strum(serialize = "!=")]
    NotEqual,
    /// Alternate inequality operator (`<>`)
    #[strum(serialize = "<>")]
    LessGreater,
    /// Greater than comparison operator (`>`)
    #[strum(serialize = ">")]
    Greater,
    /// Greater than or equal comparison operator (`>=`)
    #[strum(serialize = ">=")]
    GreaterEqual,
    /// Less than comparison operator (`<`)
    #[strum(serialize = "<")]
    Less,
    /// Less than or equal comparison operator (`<=`)
    #[strum(serialize = "<=")]
    LessEqual,

    /// Addition or string concatenation (`+`)
    #[strum(serialize = "+")]
    Plus,
    /// Subtraction operator (`-`)
    #[strum(serialize = "-")]
    Minus,
    /// Multiplication operator (`*`)
    #[strum(serialize = "*")]
    Multiply,
    /// Division operator (`/`)
    #[strum(serialize = "/")]
    Divide,
    /// Remainder operator (`%`)
    #[strum(serialize = "%")]
    Modulo,
    /// Power operator (`^`)
    #[strum(serialize = "^")]
    Power,
    /// String concatenation operator (`&`)
    #[strum(serialize = "&")]
    Concat,

    /// Logical AND operator (`&&`)
    #[strum(serialize = "&&")]
    And,
    /// Logical OR operator (`||`)
    #[strum(serialize = "||")]
    Or,
    /// Logical NOT operator (`!`)
    #[strum(serialize = "!")]
    Not,
}

/// Represents delimiters of the expression language.
///
/// `Display` is written by hand: the derived one would treat the brace names
/// as format strings.
#[derive(Debug, Clone, PartialEq, Eq, EnumString, AsRefStr)]
pub enum Delimiter {
    /// Opening brace (`{`) for object literals
    #[strum(serialize = "{")]
    OpenBrace,
    /// Closing brace (`}`) for object literals
    #[strum(serialize = "}")]
    CloseBrace,
    /// Opening parenthesis (`(`) for grouping and function calls
    #[strum(serialize = "(")]
    OpenParen,
    /// Closing parenthesis (`)`) for grouping and function calls
    #[strum(serialize = ")")]
    CloseParen,
    /// Opening bracket (`[`) for arrays and indexing
    #[strum(serialize = "[")]
    OpenBracket,
    /// Closing bracket (`]`) for arrays and indexing
    #[strum(serialize = "]")]
    CloseBracket,
    /// Comma (`,`) between arguments and elements
    #[strum(serialize = ",")]
    Comma,
    /// Colon (`:`) between object keys and values
    #[strum(serialize = ":")]
    Colon,
    /// Member access (`.`)
    #[strum(serialize = ".")]
    Dot,
}

impl std::fmt::Display for Delimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Parses an operator token, two character operators first.
#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_operator(input: &str) -> ParserResult<Token> {
    context(
        "operator",
        map(
            alt((
                alt((
                    value(Operator::EqualEqual, tag("==")),
                    value(Operator::NotEqual, tag("!=")),
                    value(Operator::LessGreater, tag("<>")),
                    value(Operator::GreaterEqual, tag(">=")),
                    value(Operator::LessEqual, tag("<=")),
                    value(Operator::And, tag("&&")),
                    value(Operator::Or, tag("||")),
                )),
                alt((
                    value(Operator::Greater, tag(">")),
                    value(Operator::Less, tag("<")),
                    value(Operator::Plus, tag("+")),
                    value(Operator::Minus, tag("-")),
                    value(Operator::Multiply, tag("*")),
                    value(Operator::Divide, tag("/")),
                    value(Operator::Modulo, tag("%")),
                    value(Operator::Power, tag("^")),
                    value(Operator::Concat, tag("&")),
                    value(Operator::Not, tag("!")),
                )),
            )),
            Token::Operator,
        ),
    )(input)
}

#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_delimiter(input: &str) -> ParserResult<Token> {
    context(
        "delimiter",
        map(
            alt((
                value(Delimiter::OpenBrace, tag("{")),
                value(Delimiter::CloseBrace, tag("}")),
                value(Delimiter::OpenParen, tag("(")),
                value(Delimiter::CloseParen, tag(")")),
                value(Delimiter::OpenBracket, tag("[")),
                value(Delimiter::CloseBracket, tag("]")),
                value(Delimiter::Comma, tag(",")),
                value(Delimiter::Colon, tag(":")),
                value(Delimiter::Dot, tag(".")),
            )),
            Token::Delimiter,
        ),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_longest_match() {
        let (rest, token) = parse_operator("<=b").unwrap();
        assert_eq!(token, Token::Operator(Operator::LessEqual));
        assert_eq!(rest, "b");

        let (rest, token) = parse_operator("&&x").unwrap();
        assert_eq!(token, Token::Operator(Operator::And));
        assert_eq!(rest, "x");

        let (_, token) = parse_operator("<>").unwrap();
        assert_eq!(token, Token::Operator(Operator::LessGreater));

        let (rest, token) = parse_operator("& y").unwrap();
        assert_eq!(token, Token::Operator(Operator::Concat));
        assert_eq!(rest, " y");
    }

    #[test]
    fn test_delimiters() {
        let (_, token) = parse_delimiter("}").unwrap();
        assert_eq!(token, Token::Delimiter(Delimiter::CloseBrace));
        assert!(parse_delimiter("+").is_err());
    }

    #[test]
    fn test_strum_round_trip() {
        assert_eq!(Operator::from_str("||").unwrap(), Operator::Or);
        assert_eq!(Operator::Power.to_string(), "^");
        assert_eq!(Delimiter::CloseBrace.as_ref(), "}");
        assert_eq!(Delimiter::from_str("{").unwrap(), Delimiter::OpenBrace);
    }

    #[test]
    fn test_brace_display() {
        assert_eq!(Delimiter::OpenBrace.to_string(), "{");
        assert_eq!(Delimiter::CloseBrace.to_string(), "}");
        assert_eq!(Token::Delimiter(Delimiter::CloseBrace).to_string(), "}");
    }
}
