//! # Tokenizer Component
//!
//! The Tokenizer performs lexical analysis of expression text, transforming raw
//! input into a token stream for the analyzer.
//!
//! ## Component Structure
//!
//! * [`token`]: Core token types and the [`Tokenizer`](token::Tokenizer) itself
//! * [`symbol`]: Operators and delimiters
//! * [`literal`]: Quoted strings, backtick templates and numbers
//! * [`whitespace`]: Whitespace and newline handling
//!
//! ## Integration Points
//!
//! 1. **Input**: Raw expression text
//! 2. **Processing**: Lexical analysis via [`Tokenizer::tokenize`](token::Tokenizer::tokenize)
//! 3. **Output**: Stream of [`TokenSpan`](token::TokenSpan) objects
//! 4. **Next Stage**: The [`preprocessor`](crate::preprocessor) drops formatting tokens
//!
//! ## Usage Example
//!
//! ```rust
//! use adaptive_expressions::tokenizer::token::Tokenizer;
//!
//! let mut tokenizer = Tokenizer::new();
//! let tokens = tokenizer.tokenize("user.age >= 18 && exists(user.name)").unwrap();
//! assert!(!tokens.is_empty());
//! ```

pub mod literal;
pub mod symbol;
pub mod token;
pub mod whitespace;
