//! # Adaptive Expressions
//!
//! An expression language for bots and rule engines: parse text such as
//! `user.age >= 18 && contains(user.roles, 'admin')` once, then evaluate it
//! against any [`Memory`] as often as needed.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Source Text → Tokenizer → Preprocessor → Analyzer → Binder → Evaluator
//! ```
//!
//! ### Stage 1: Tokenization
//!
//! The [`tokenizer`] module turns text into spanned tokens: numbers, quoted
//! strings, backtick templates, identifiers and operators.
//!
//! ### Stage 2: Preprocessing
//!
//! The [`preprocessor`] module trims the text, strips a leading `=` and drops
//! whitespace tokens.
//!
//! ### Stage 3: Analysis
//!
//! The [`analyzer`] module builds a [`Syntax`](ast::Syntax) tree with parser
//! combinators, one function per precedence level.
//!
//! ### Stage 4: Binding
//!
//! The [`parser`] module resolves every operator and function name through a
//! lookup, defaulting to the [`FunctionTable`], and validates the bound
//! [`Expression`].
//!
//! ### Stage 5: Evaluation
//!
//! [`Expression::try_evaluate`] walks the tree. Each node's
//! [`ExpressionEvaluator`] reads [`Memory`], honours the [`Options`] and
//! returns a [`Value`].
//!
//! ## Trigger Trees
//!
//! The [`trigger_tree`] module indexes many boolean expressions so that only
//! the most specific ones are reported for a given memory.
//!
//! ## Example
//!
//! ```rust
//! use adaptive_expressions::{Expression, Options, SimpleObjectMemory, Value};
//!
//! let expression = Expression::parse("join(foreach(items, x, x * 2), ', ')").unwrap();
//! let mut memory = SimpleObjectMemory::new(Value::from_json_str(r#"{"items": [1, 2, 3]}"#).unwrap());
//! let value = expression.try_evaluate(&mut memory, &Options::new()).unwrap();
//! assert_eq!(value, Value::from("2, 4, 6"));
//! ```

pub mod analyzer;
pub mod ast;
pub mod config;
pub mod error;
pub mod expression;
pub mod functions;
pub mod memory;
pub mod parser;
pub mod preprocessor;
pub mod tokenizer;
pub mod trigger_tree;
pub mod value;

// Re-exports
pub use config::{ConfigError, ExpressionConfig, Options};
pub use error::{Error, ExpressionResult};
pub use expression::{
    EvaluatorLookup, Expression, ExpressionEvaluator, ExpressionType, ReturnType,
};
pub use functions::FunctionTable;
pub use memory::{Memory, MemoryError, SimpleObjectMemory, StackedMemory};
pub use parser::ExpressionParser;
pub use trigger_tree::{Clause, Quantifier, QuantifierType, RelationshipType, Trigger, TriggerTree};
pub use value::{ObjectMap, Value};
