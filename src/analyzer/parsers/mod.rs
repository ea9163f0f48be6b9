pub mod expression;

use super::core::{ParseError, Parser};
use crate::ast::Syntax;
use crate::tokenizer::token::Token;

/// Parses a complete token stream into a single expression.
///
/// Every token must be consumed: `hello world` is two expressions and fails.
#[tracing::instrument(level = "debug", skip(tokens))]
pub fn parse_root(tokens: &[Token]) -> Result<Syntax, ParseError> {
    let (pos, syntax) = expression::parse_expression().parse(tokens, 0)?;
    if pos < tokens.len() {
        let found = tokens[pos..]
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        return Err(ParseError::TrailingInput {
            found,
            position: pos,
        });
    }
    Ok(syntax)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessor::{Preprocessor, TokenPreprocessor};
    use crate::tokenizer::token::Tokenizer;

    fn tokens(input: &str) -> Vec<Token> {
        TokenPreprocessor::new().process(Tokenizer::new().tokenize(input).unwrap())
    }

    #[test]
    fn test_complete_input() {
        assert!(parse_root(&tokens("a.b + 1")).is_ok());
    }

    #[test]
    fn test_trailing_input_rejected() {
        let err = parse_root(&tokens("hello world")).unwrap_err();
        assert_eq!(
            err,
            ParseError::TrailingInput {
                found: "world".to_string(),
                position: 1,
            }
        );
        assert!(parse_root(&tokens("func(A,b,b,)")).is_err());
        assert!(parse_root(&tokens("a + ")).is_err());
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(parse_root(&[]).is_err());
    }
}
