use super::{datetime::parse_iso, utils::*};
use crate::{
    expression::{ExpressionEvaluator, ExpressionType, ReturnType},
    value::Value,
};

fn is_integer(value: &Value) -> bool {
    match value {
        Value::Integer(_) => true,
        Value::Float(f) => f.is_finite() && f.fract() == 0.0,
        _ => false,
    }
}

fn is_float(value: &Value) -> bool {
    matches!(value, Value::Float(f) if f.fract() != 0.0)
}

/// Timestamps, and strings that hold a strict ISO 8601 timestamp.
fn is_date_time(value: &Value) -> bool {
    match value {
        Value::DateTime(_) => true,
        Value::String(text) => parse_iso(text).is_ok(),
        _ => false,
    }
}

fn check(expr_type: ExpressionType, predicate: fn(&Value) -> bool) -> ExpressionEvaluator {
    ExpressionEvaluator::new(
        expr_type.as_ref(),
        apply(move |args| Value::Boolean(predicate(&args[0])), None),
        ReturnType::BOOLEAN,
        validate_unary,
    )
}

pub(super) fn evaluators() -> Vec<ExpressionEvaluator> {
    vec![
        check(ExpressionType::IsInteger, is_integer),
        check(ExpressionType::IsFloat, is_float),
        check(ExpressionType::IsString, Value::is_string),
        check(ExpressionType::IsArray, |v| matches!(v, Value::List(_))),
        check(ExpressionType::IsObject, |v| matches!(v, Value::Object(_))),
        check(ExpressionType::IsBoolean, |v| matches!(v, Value::Boolean(_))),
        check(ExpressionType::IsDateTime, is_date_time),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers() {
        assert!(is_integer(&Value::Integer(1)));
        assert!(is_integer(&Value::Float(2.0)));
        assert!(!is_integer(&Value::Float(2.5)));
        assert!(is_float(&Value::Float(2.5)));
        assert!(!is_float(&Value::Integer(2)));
    }

    #[test]
    fn test_date_time_strings() {
        assert!(is_date_time(&Value::from("2018-03-15T13:00:00.000Z")));
        assert!(!is_date_time(&Value::from("2018-03-15")));
        assert!(!is_date_time(&Value::Integer(1)));
    }
}
