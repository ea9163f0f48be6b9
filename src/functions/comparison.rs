use std::cmp::Ordering;

use super::utils::*;
use crate::{
    config::Options,
    error::{Error, ExpressionResult},
    expression::{Expression, ExpressionEvaluator, ExpressionType, ReturnType},
    memory::Memory,
    value::Value,
};

/// Orders two values of the same kind. Numbers of either representation are
/// one kind.
pub(crate) fn compare(left: &Value, right: &Value) -> Result<Ordering, String> {
    let ordering = match (left, right) {
        (a, b) if a.is_number() && b.is_number() => a
            .as_f64()
            .unwrap_or_default()
            .partial_cmp(&b.as_f64().unwrap_or_default()),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
        (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
        _ => None,
    };
    ordering.ok_or_else(|| format!("{} and {} must be comparable.", left, right))
}

/// Relational operators evaluate their operands without null substitution and
/// read any failure to produce operands as `false`.
fn comparison(
    accept: fn(Ordering) -> bool,
) -> impl Fn(&Expression, &mut dyn Memory, &Options) -> ExpressionResult<Value> + Send + Sync + 'static
{
    move |expression: &Expression, memory: &mut dyn Memory, options: &Options| {
        let raw = options.without_null_substitution();
        match evaluate_children(expression, memory, &raw, Some(verify_not_null)) {
            Ok(args) => compare(&args[0], &args[1])
                .map(|ordering| Value::Boolean(accept(ordering)))
                .map_err(Error::evaluation),
            Err(e) => {
                tracing::trace!("{} treated as false: {}", expression, e);
                Ok(Value::Boolean(false))
            }
        }
    }
}

fn equality(
    expected: bool,
) -> impl Fn(&Expression, &mut dyn Memory, &Options) -> ExpressionResult<Value> + Send + Sync + 'static
{
    move |expression: &Expression, memory: &mut dyn Memory, options: &Options| {
        let raw = options.without_null_substitution();
        let args = evaluate_children(expression, memory, &raw, None)?;
        Ok(Value::Boolean(args[0].values_equal(&args[1]) == expected))
    }
}

fn exists(expression: &Expression, memory: &mut dyn Memory, options: &Options) -> ExpressionResult<Value> {
    let raw = options.without_null_substitution();
    let args = evaluate_children(expression, memory, &raw, None)?;
    Ok(Value::Boolean(!args[0].is_null()))
}

pub(super) fn evaluators() -> Vec<ExpressionEvaluator> {
    vec![
        ExpressionEvaluator::new(
            ExpressionType::Equal.as_ref(),
            equality(true),
            ReturnType::BOOLEAN,
            validate_binary,
        )
        .with_negation(ExpressionType::NotEqual.as_ref()),
        ExpressionEvaluator::new(
            ExpressionType::NotEqual.as_ref(),
            equality(false),
            ReturnType::BOOLEAN,
            validate_binary,
        )
        .with_negation(ExpressionType::Equal.as_ref()),
        ExpressionEvaluator::new(
            ExpressionType::LessThan.as_ref(),
            comparison(|o| o == Ordering::Less),
            ReturnType::BOOLEAN,
            validate_binary_number_or_string,
        )
        .with_negation(ExpressionType::GreaterThanOrEqual.as_ref()),
        ExpressionEvaluator::new(
            ExpressionType::LessThanOrEqual.as_ref(),
            comparison(|o| o != Ordering::Greater),
            ReturnType::BOOLEAN,
            validate_binary_number_or_string,
        )
        .with_negation(ExpressionType::GreaterThan.as_ref()),
        ExpressionEvaluator::new(
            ExpressionType::GreaterThan.as_ref(),
            comparison(|o| o == Ordering::Greater),
            ReturnType::BOOLEAN,
            validate_binary_number_or_string,
        )
        .with_negation(ExpressionType::LessThanOrEqual.as_ref()),
        ExpressionEvaluator::new(
            ExpressionType::GreaterThanOrEqual.as_ref(),
            comparison(|o| o != Ordering::Less),
            ReturnType::BOOLEAN,
            validate_binary_number_or_string,
        )
        .with_negation(ExpressionType::LessThan.as_ref()),
        ExpressionEvaluator::new(
            ExpressionType::Exists.as_ref(),
            exists,
            ReturnType::BOOLEAN,
            validate_unary,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare() {
        assert_eq!(
            compare(&Value::Integer(1), &Value::Float(1.5)),
            Ok(Ordering::Less)
        );
        assert_eq!(
            compare(&Value::from("b"), &Value::from("a")),
            Ok(Ordering::Greater)
        );
        assert_eq!(
            compare(&Value::Integer(1), &Value::from("a")),
            Err("1 and a must be comparable.".to_string())
        );
    }
}
