use super::{Memory, MemoryError};
use crate::value::Value;

/// Read-only stack of memories; the most recently pushed scope wins.
pub struct StackedMemory<'a> {
    layers: Vec<&'a dyn Memory>,
}

impl<'a> StackedMemory<'a> {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    pub fn wrap(memory: &'a dyn Memory) -> Self {
        Self {
            layers: vec![memory],
        }
    }

    pub fn push(&mut self, memory: &'a dyn Memory) {
        self.layers.push(memory);
    }

    pub fn pop(&mut self) -> Option<&'a dyn Memory> {
        self.layers.pop()
    }

    pub fn depth(&self) -> usize {
        self.layers.len()
    }
}

impl Default for StackedMemory<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory for StackedMemory<'_> {
    fn get_value(&self, path: &str) -> Value {
        self.layers
            .iter()
            .rev()
            .map(|layer| layer.get_value(path))
            .find(|value| !value.is_null())
            .unwrap_or_default()
    }

    fn set_value(&mut self, _path: &str, _value: Value) -> Result<(), MemoryError> {
        Err(MemoryError::ReadOnly)
    }

    fn version(&self) -> String {
        self.layers
            .iter()
            .map(|layer| layer.version())
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::SimpleObjectMemory;

    #[test]
    fn test_top_scope_wins() {
        let global =
            SimpleObjectMemory::new(Value::from_json_str(r#"{"x": 1, "y": 2}"#).unwrap());
        let scope = SimpleObjectMemory::new(Value::from_json_str(r#"{"x": 10}"#).unwrap());

        let mut stacked = StackedMemory::wrap(&global);
        stacked.push(&scope);
        assert_eq!(stacked.get_value("x"), Value::Integer(10));
        assert_eq!(stacked.get_value("y"), Value::Integer(2));
        assert_eq!(stacked.get_value("z"), Value::Null);
        assert_eq!(stacked.depth(), 2);

        stacked.pop();
        assert_eq!(stacked.get_value("x"), Value::Integer(1));
    }

    #[test]
    fn test_set_is_rejected() {
        let global = SimpleObjectMemory::default();
        let mut stacked = StackedMemory::wrap(&global);
        assert_eq!(
            stacked.set_value("x", Value::Null),
            Err(MemoryError::ReadOnly)
        );
    }
}
