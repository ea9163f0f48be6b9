//! # Core Parser Definitions
//!
//! The parser interface and error type shared by every combinator.

use thiserror::Error;

/// Parser trait defines the core parsing interface.
///
/// A parser takes the full input slice and a position, and returns either the
/// position after the consumed input together with the parsed value, or a
/// [`ParseError`].
///
/// # Type Parameters
///
/// * `I` - The input token type
/// * `O` - The output value type
pub trait Parser<I, O> {
    /// Attempts to parse the input starting at the given position.
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O>;
}

/// On success, the new position and the parsed value.
pub type ParseResult<O> = Result<(usize, O), ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected end of input: {message} at token {position}{}", fmt_context(.context))]
    UnexpectedEOF {
        message: String,
        position: usize,
        context: Option<String>,
    },
    #[error("Unexpected token: expected {expected}, found {found} at token {position}{}", fmt_context(.context))]
    Unexpected {
        expected: String,
        found: String,
        position: usize,
        context: Option<String>,
    },
    #[error("No alternative matched at token {position}{}", fmt_context(.context))]
    NoAlternative {
        position: usize,
        context: Option<String>,
    },
    #[error("{message} at token {position}{}", fmt_context(.context))]
    Failure {
        message: String,
        position: usize,
        context: Option<String>,
    },
    #[error("Extra input '{found}' at token {position}")]
    TrailingInput { found: String, position: usize },
}

fn fmt_context(context: &Option<String>) -> String {
    match context {
        Some(c) => format!(" ({})", c),
        None => String::new(),
    }
}

fn push_context(context: Option<String>, ctx: &str) -> Option<String> {
    Some(match context {
        Some(c) => format!("{} -> {}", c, ctx),
        None => ctx.to_string(),
    })
}

impl ParseError {
    pub fn with_context(self, ctx: &str) -> Self {
        match self {
            ParseError::UnexpectedEOF {
                message,
                position,
                context,
            } => ParseError::UnexpectedEOF {
                message,
                position,
                context: push_context(context, ctx),
            },
            ParseError::Unexpected {
                expected,
                found,
                position,
                context,
            } => ParseError::Unexpected {
                expected,
                found,
                position,
                context: push_context(context, ctx),
            },
            ParseError::NoAlternative { position, context } => ParseError::NoAlternative {
                position,
                context: push_context(context, ctx),
            },
            ParseError::Failure {
                message,
                position,
                context,
            } => ParseError::Failure {
                message,
                position,
                context: push_context(context, ctx),
            },
            trailing @ ParseError::TrailingInput { .. } => trailing,
        }
    }

    pub fn get_position(&self) -> usize {
        match self {
            ParseError::UnexpectedEOF { position, .. } => *position,
            ParseError::Unexpected { position, .. } => *position,
            ParseError::NoAlternative { position, .. } => *position,
            ParseError::Failure { position, .. } => *position,
            ParseError::TrailingInput { position, .. } => *position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_chain() {
        let error = ParseError::NoAlternative {
            position: 3,
            context: None,
        }
        .with_context("primary")
        .with_context("expression");
        assert_eq!(
            error,
            ParseError::NoAlternative {
                position: 3,
                context: Some("primary -> expression".to_string()),
            }
        );
        assert_eq!(error.get_position(), 3);
        assert_eq!(
            error.to_string(),
            "No alternative matched at token 3 (primary -> expression)"
        );
    }
}
