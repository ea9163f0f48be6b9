//! # Preprocessor
//!
//! Bridges tokenization and parsing. The tokenizer keeps whitespace so spans are
//! exact. The analyzer only wants significant tokens.
//!
//! ```text
//! Source Text → Tokenizer → Preprocessor → Analyzer → Binder → Evaluator
//! ```

use crate::tokenizer::token::{Token, TokenSpan};

/// A trait for preprocessing different types of input
pub trait Preprocessor<T, U = T> {
    /// Process the input of type T and return the processed result
    fn process(&self, input: T) -> U;
}

/// Drops formatting tokens and strips spans.
#[derive(Debug, Default, Clone)]
pub struct TokenPreprocessor {}

impl TokenPreprocessor {
    pub fn new() -> Self {
        Self {}
    }
}

impl Preprocessor<Vec<TokenSpan>, Vec<Token>> for TokenPreprocessor {
    fn process(&self, input: Vec<TokenSpan>) -> Vec<Token> {
        input
            .into_iter()
            .filter(|span| !span.token.is_whitespace() && !span.token.is_newline())
            .map(|span| span.token)
            .collect()
    }
}

/// Normalizes raw expression text before tokenization.
///
/// A leading `=` is allowed on expressions stored in declarative assets and is
/// removed here.
#[derive(Debug, Default, Clone)]
pub struct StringPreprocessor {}

impl StringPreprocessor {
    pub fn new() -> Self {
        Self {}
    }
}

impl Preprocessor<&str, String> for StringPreprocessor {
    fn process(&self, input: &str) -> String {
        let trimmed = input.trim();
        trimmed.strip_prefix('=').unwrap_or(trimmed).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::token::Tokenizer;

    #[test]
    fn test_formatting_tokens_dropped() {
        let spans = Tokenizer::new().tokenize("a +\n b").unwrap();
        assert_eq!(spans.len(), 6);
        let tokens = TokenPreprocessor::new().process(spans);
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_leading_equals_removed() {
        let preprocessor = StringPreprocessor::new();
        assert_eq!(preprocessor.process(" =a.b "), "a.b");
        assert_eq!(preprocessor.process("a == b"), "a == b");
    }
}
