use thiserror::Error;

use crate::analyzer::ParseError;
use crate::config::ConfigError;
use crate::memory::MemoryError;
use crate::tokenizer::token::TokenizerError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),
    #[error("Syntax error: {0}")]
    Syntax(#[from] ParseError),
    // static checks run while binding
    #[error("{0}")]
    Validation(String),
    // runtime failures raised by evaluators
    #[error("{0}")]
    Evaluation(String),
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ExpressionResult<T> = Result<T, Error>;

impl Error {
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Error::Internal(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Error::Validation(message.into())
    }

    pub fn evaluation<S: Into<String>>(message: S) -> Self {
        Error::Evaluation(message.into())
    }

    /// True for failures that happened while evaluating, as opposed to parsing.
    pub fn is_evaluation(&self) -> bool {
        matches!(self, Error::Evaluation(_) | Error::Memory(_))
    }
}
