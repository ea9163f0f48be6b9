//! # Memory
//!
//! Accessor paths resolve against a [`Memory`]. Two implementations exist:
//!
//! * [`SimpleObjectMemory`] wraps a single [`Value`] tree and supports writes.
//! * [`StackedMemory`] layers scopes for lambda iteration and is read-only.
//!
//! Missing properties and out-of-range indices read as [`Value::Null`]; only
//! writes can fail.

pub mod path;
pub mod simple;
pub mod stacked;

pub use path::{parse_path, try_accumulate_path, PathSegment};
pub use simple::SimpleObjectMemory;
pub use stacked::StackedMemory;

use thiserror::Error;

use crate::value::Value;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MemoryError {
    #[error("Invalid memory path '{path}': {message}")]
    InvalidPath { path: String, message: String },
    #[error("Cannot set '{path}': {message}")]
    NotWritable { path: String, message: String },
    #[error("StackedMemory does not support setting values")]
    ReadOnly,
}

/// Object graph that expressions read from and `setPathToValue` writes to.
#[mockall::automock]
pub trait Memory {
    /// Resolves a path such as `user.lists['todo'][0]`, yielding `Null` when absent.
    fn get_value(&self, path: &str) -> Value;

    fn set_value(&mut self, path: &str, value: Value) -> Result<(), MemoryError>;

    /// Changes whenever the memory is written.
    fn version(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_memory() {
        let mut memory = MockMemory::new();
        memory
            .expect_get_value()
            .withf(|path| path == "a.b")
            .returning(|_| Value::Integer(3));
        memory
            .expect_set_value()
            .returning(|_, _| Err(MemoryError::ReadOnly));

        assert_eq!(memory.get_value("a.b"), Value::Integer(3));
        assert_eq!(
            memory.set_value("a.b", Value::Null),
            Err(MemoryError::ReadOnly)
        );
    }
}
