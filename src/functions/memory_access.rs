use super::utils::*;
use crate::{
    config::Options,
    error::{Error, ExpressionResult},
    expression::{Expression, ExpressionEvaluator, ExpressionType, ReturnType},
    memory::{try_accumulate_path, Memory, SimpleObjectMemory},
    value::Value,
};

fn substitute(value: Value, path: Option<&str>, options: &Options) -> Value {
    match (value, path) {
        (Value::Null, Some(path)) => options.substitute_null(path).unwrap_or_default(),
        (value, _) => value,
    }
}

/// Reads a path from memory, or relative to the value of a non-path instance
/// such as `json('{...}').a.b`.
fn accessor(
    expression: &Expression,
    memory: &mut dyn Memory,
    options: &Options,
) -> ExpressionResult<Value> {
    let (path, left) = try_accumulate_path(expression, memory, options)?;
    let Some(path) = path else {
        return Err(Error::evaluation(format!("{} is not a valid accessor", expression)));
    };

    let value = match left {
        None => memory.get_value(&path),
        Some(instance) => {
            let raw = options.without_null_substitution();
            let root = instance.try_evaluate(memory, &raw)?;
            SimpleObjectMemory::new(root).get_value(&path)
        }
    };
    Ok(substitute(value, Some(&path), options))
}

fn index_into(instance: &Value, index: &Value) -> ExpressionResult<Value> {
    match (instance, index) {
        (Value::Null, _) => Ok(Value::Null),
        (Value::List(items), index) => {
            let position = index
                .as_i64()
                .filter(|_| index.is_integer())
                .ok_or_else(|| Error::evaluation(format!("{} is not an integer index.", index)))?;
            Ok(usize::try_from(position)
                .ok()
                .and_then(|i| items.get(i))
                .cloned()
                .unwrap_or_default())
        }
        (Value::Object(map), Value::String(key)) => Ok(map.get(key).cloned().unwrap_or_default()),
        (Value::Object(map), Value::Integer(i)) => {
            Ok(map.get(&i.to_string()).cloned().unwrap_or_default())
        }
        (other, index) => Err(Error::evaluation(format!(
            "{} cannot be indexed by {}.",
            other, index
        ))),
    }
}

fn element(
    expression: &Expression,
    memory: &mut dyn Memory,
    options: &Options,
) -> ExpressionResult<Value> {
    let raw = options.without_null_substitution();
    let instance = expression.children[0].try_evaluate(memory, &raw)?;
    let index = expression.children[1].try_evaluate(memory, &raw)?;
    let value = index_into(&instance, &index)?;

    if value.is_null() && options.null_substitution.is_some() {
        let (path, _) = try_accumulate_path(expression, memory, &raw)?;
        return Ok(substitute(value, path.as_deref(), options));
    }
    Ok(value)
}

fn set_path_to_value(
    expression: &Expression,
    memory: &mut dyn Memory,
    options: &Options,
) -> ExpressionResult<Value> {
    let (path, left) = try_accumulate_path(&expression.children[0], memory, options)?;
    let path = match (path, left) {
        (Some(path), None) => path,
        _ => {
            return Err(Error::evaluation(format!(
                "{} is not a valid path to set value",
                expression.children[0]
            )))
        }
    };
    let value = expression.children[1].try_evaluate(memory, options)?;
    memory.set_value(&path, value.clone())?;
    tracing::debug!("set {} in memory", path);
    Ok(value)
}

fn validate_accessor(expression: &Expression) -> ExpressionResult<()> {
    validate_order(expression, &[ReturnType::OBJECT], &[ReturnType::STRING])?;
    let named = expression.children[0].is_constant()
        && expression.children[0]
            .value
            .as_ref()
            .is_some_and(Value::is_string);
    if !named {
        return Err(Error::validation(format!(
            "{} must have a string constant as its first child.",
            expression
        )));
    }
    Ok(())
}

pub(super) fn evaluators() -> Vec<ExpressionEvaluator> {
    vec![
        ExpressionEvaluator::new(
            ExpressionType::Accessor.as_ref(),
            accessor,
            ReturnType::OBJECT,
            validate_accessor,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Element.as_ref(),
            element,
            ReturnType::OBJECT,
            |e| validate_order(e, &[], &[ReturnType::OBJECT, ReturnType::OBJECT]),
        ),
        ExpressionEvaluator::new(
            ExpressionType::SetPathToValue.as_ref(),
            set_path_to_value,
            ReturnType::OBJECT,
            |e| validate_order(e, &[], &[ReturnType::OBJECT, ReturnType::OBJECT]),
        ),
    ]
}
