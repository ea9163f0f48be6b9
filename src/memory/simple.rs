use super::{path::parse_path, Memory, MemoryError, PathSegment};
use crate::value::{ObjectMap, Value};

/// Memory backed by a single value tree.
#[derive(Debug, Clone, Default)]
pub struct SimpleObjectMemory {
    root: Value,
    version: u64,
}

impl SimpleObjectMemory {
    pub fn new(root: Value) -> Self {
        Self { root, version: 0 }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn into_value(self) -> Value {
        self.root
    }

    fn lookup<'v>(value: &'v Value, segment: &PathSegment) -> Option<&'v Value> {
        match (value, segment) {
            (Value::Object(map), PathSegment::Key(key)) => map.get(key),
            (Value::Object(map), PathSegment::Index(index)) => map.get(&index.to_string()),
            (Value::List(items), PathSegment::Index(index)) => items.get(*index),
            _ => None,
        }
    }

    fn assign(slot: &mut Value, segments: &[PathSegment], value: Value) -> Result<(), String> {
        let Some((segment, rest)) = segments.split_first() else {
            *slot = value;
            return Ok(());
        };

        if slot.is_null() {
            *slot = match segment {
                PathSegment::Key(_) => Value::Object(ObjectMap::new()),
                PathSegment::Index(_) => Value::List(Vec::new()),
            };
        }

        match (slot, segment) {
            (Value::Object(map), PathSegment::Key(key)) => {
                if !map.contains_key(key) {
                    map.insert(key.clone(), Value::Null);
                }
                match map.get_mut(key) {
                    Some(child) => Self::assign(child, rest, value),
                    None => Err(format!("property {} could not be created", key)),
                }
            }
            (Value::List(items), PathSegment::Index(index)) => {
                if *index >= items.len() {
                    items.resize(*index + 1, Value::Null);
                }
                Self::assign(&mut items[*index], rest, value)
            }
            (other, segment) => Err(format!(
                "{} cannot be indexed by {}",
                other.type_name(),
                segment
            )),
        }
    }
}

impl Memory for SimpleObjectMemory {
    fn get_value(&self, path: &str) -> Value {
        let segments = match parse_path(path) {
            Ok(segments) if !segments.is_empty() => segments,
            Ok(_) => return Value::Null,
            Err(e) => {
                tracing::debug!("unreadable path: {}", e);
                return Value::Null;
            }
        };

        let mut current = &self.root;
        for segment in &segments {
            match Self::lookup(current, segment) {
                Some(next) => current = next,
                None => return Value::Null,
            }
        }
        current.clone()
    }

    fn set_value(&mut self, path: &str, value: Value) -> Result<(), MemoryError> {
        let segments = parse_path(path)?;
        if segments.is_empty() {
            return Err(MemoryError::InvalidPath {
                path: path.to_string(),
                message: "path is empty".to_string(),
            });
        }
        Self::assign(&mut self.root, &segments, value).map_err(|message| {
            MemoryError::NotWritable {
                path: path.to_string(),
                message,
            }
        })?;
        self.version += 1;
        Ok(())
    }

    fn version(&self) -> String {
        self.version.to_string()
    }
}

impl From<Value> for SimpleObjectMemory {
    fn from(root: Value) -> Self {
        Self::new(root)
    }
}
