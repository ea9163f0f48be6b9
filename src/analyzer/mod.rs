//! # Expression Analyzer
//!
//! Transforms the preprocessed token stream into a [`Syntax`](crate::ast::Syntax)
//! tree using a parser combinator design.
//!
//! ## Architecture
//!
//! 1. **Core Parser Interface**: The [`Parser`] trait defines the parsing contract
//! 2. **Combinators**: Small, composable parser units ([`combinators`], [`prelude`])
//! 3. **Grammar**: One function per precedence layer ([`parsers::expression`])
//! 4. **Error Handling**: [`ParseError`] carries the token position and rule context
//!
//! ## Position in the Pipeline
//!
//! ```text
//! Source Text → Tokenizer → Preprocessor → Analyzer → Binder → Evaluator
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use adaptive_expressions::analyzer::parsers::parse_root;
//! use adaptive_expressions::preprocessor::{Preprocessor, TokenPreprocessor};
//! use adaptive_expressions::tokenizer::token::Tokenizer;
//!
//! let spans = Tokenizer::new().tokenize("count(items) > 2").unwrap();
//! let tokens = TokenPreprocessor::new().process(spans);
//! let syntax = parse_root(&tokens).unwrap();
//! ```

pub mod combinators;
pub mod core;
pub mod parsers;
pub mod prelude;

pub use core::ParseError;
pub use core::ParseResult;
pub use core::Parser;
