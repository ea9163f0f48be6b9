use std::{fmt, ops::BitOr};

use crate::value::Value;

/// Static result type of an expression, as a set of flags.
///
/// `OBJECT` doubles as "unknown until evaluated", so static checks skip any
/// child whose type includes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReturnType(u8);

impl ReturnType {
    pub const BOOLEAN: ReturnType = ReturnType(1);
    pub const NUMBER: ReturnType = ReturnType(2);
    pub const OBJECT: ReturnType = ReturnType(4);
    pub const STRING: ReturnType = ReturnType(8);
    pub const ARRAY: ReturnType = ReturnType(16);

    const NAMES: [(ReturnType, &'static str); 5] = [
        (ReturnType::BOOLEAN, "boolean"),
        (ReturnType::NUMBER, "number"),
        (ReturnType::OBJECT, "object"),
        (ReturnType::STRING, "string"),
        (ReturnType::ARRAY, "array"),
    ];

    pub fn bits(self) -> u8 {
        self.0
    }

    /// True when the two sets share a flag.
    pub fn intersects(self, other: ReturnType) -> bool {
        self.0 & other.0 != 0
    }

    pub fn of_value(value: &Value) -> ReturnType {
        match value {
            Value::Boolean(_) => ReturnType::BOOLEAN,
            Value::Integer(_) | Value::Float(_) => ReturnType::NUMBER,
            Value::String(_) => ReturnType::STRING,
            Value::List(_) => ReturnType::ARRAY,
            _ => ReturnType::OBJECT,
        }
    }
}

impl BitOr for ReturnType {
    type Output = ReturnType;

    fn bitor(self, rhs: ReturnType) -> ReturnType {
        ReturnType(self.0 | rhs.0)
    }
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(flag, _)| self.intersects(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "{}", names.join(" or "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        let t = ReturnType::NUMBER | ReturnType::STRING;
        assert!(t.intersects(ReturnType::NUMBER));
        assert!(t.intersects(ReturnType::STRING | ReturnType::ARRAY));
        assert!(!t.intersects(ReturnType::BOOLEAN));
        assert_eq!(t.bits(), 10);
        assert_eq!(t.to_string(), "number or string");
    }

    #[test]
    fn test_of_value() {
        assert_eq!(ReturnType::of_value(&Value::from(1.5)), ReturnType::NUMBER);
        assert_eq!(ReturnType::of_value(&Value::from("a")), ReturnType::STRING);
        assert_eq!(ReturnType::of_value(&Value::Null), ReturnType::OBJECT);
    }
}
