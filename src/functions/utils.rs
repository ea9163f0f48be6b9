//! Shared building blocks for builtin functions: static validators, runtime
//! argument verifiers and the `apply` family that turns plain closures over
//! argument values into evaluators.

use crate::{
    config::Options,
    error::{Error, ExpressionResult},
    expression::{Expression, ReturnType},
    memory::{Memory, SimpleObjectMemory, StackedMemory},
    value::{ObjectMap, Value},
};

/// Checks one evaluated argument. Receives the value, the child that produced
/// it and its position.
pub type VerifyFn = fn(&Value, &Expression, usize) -> Result<(), String>;

fn type_error(expected: ReturnType, child: &Expression, expression: &Expression) -> Error {
    Error::validation(format!(
        "{} is not a {} expression in {}.",
        child, expected, expression
    ))
}

fn check_child_type(
    expected: ReturnType,
    child: &Expression,
    expression: &Expression,
) -> ExpressionResult<()> {
    if !expected.intersects(ReturnType::OBJECT)
        && !child.return_type().intersects(ReturnType::OBJECT)
        && !expected.intersects(child.return_type())
    {
        return Err(type_error(expected, child, expression));
    }
    Ok(())
}

pub fn validate_arity_and_any_type(
    expression: &Expression,
    min_arity: usize,
    max_arity: usize,
    return_type: ReturnType,
) -> ExpressionResult<()> {
    if expression.children.len() < min_arity {
        return Err(Error::validation(format!(
            "{} should have at least {} children.",
            expression, min_arity
        )));
    }
    if expression.children.len() > max_arity {
        return Err(Error::validation(format!(
            "{} can't have more than {} children.",
            expression, max_arity
        )));
    }
    for child in &expression.children {
        check_child_type(return_type, child, expression)?;
    }
    Ok(())
}

/// Validates argument count and position-wise types, with `optional` trailing
/// arguments.
pub fn validate_order(
    expression: &Expression,
    optional: &[ReturnType],
    types: &[ReturnType],
) -> ExpressionResult<()> {
    let count = expression.children.len();
    if count < types.len() || count > types.len() + optional.len() {
        let message = if optional.is_empty() {
            format!("{} should have {} children.", expression, types.len())
        } else {
            format!(
                "{} should have between {} and {} children.",
                expression,
                types.len(),
                types.len() + optional.len()
            )
        };
        return Err(Error::validation(message));
    }
    for (child, expected) in expression
        .children
        .iter()
        .zip(types.iter().chain(optional.iter()))
    {
        check_child_type(*expected, child, expression)?;
    }
    Ok(())
}

pub fn validate_at_least_one(expression: &Expression) -> ExpressionResult<()> {
    validate_arity_and_any_type(expression, 1, usize::MAX, ReturnType::OBJECT)
}

pub fn validate_number(expression: &Expression) -> ExpressionResult<()> {
    validate_arity_and_any_type(expression, 1, usize::MAX, ReturnType::NUMBER)
}

pub fn validate_string(expression: &Expression) -> ExpressionResult<()> {
    validate_arity_and_any_type(expression, 1, usize::MAX, ReturnType::STRING)
}

pub fn validate_binary(expression: &Expression) -> ExpressionResult<()> {
    validate_arity_and_any_type(expression, 2, 2, ReturnType::OBJECT)
}

pub fn validate_binary_number(expression: &Expression) -> ExpressionResult<()> {
    validate_arity_and_any_type(expression, 2, 2, ReturnType::NUMBER)
}

pub fn validate_unary_or_binary_number(expression: &Expression) -> ExpressionResult<()> {
    validate_arity_and_any_type(expression, 1, 2, ReturnType::NUMBER)
}

pub fn validate_two_or_more_than_two_numbers(expression: &Expression) -> ExpressionResult<()> {
    validate_arity_and_any_type(expression, 2, usize::MAX, ReturnType::NUMBER)
}

pub fn validate_binary_number_or_string(expression: &Expression) -> ExpressionResult<()> {
    validate_arity_and_any_type(
        expression,
        2,
        2,
        ReturnType::NUMBER | ReturnType::STRING,
    )
}

pub fn validate_unary(expression: &Expression) -> ExpressionResult<()> {
    validate_arity_and_any_type(expression, 1, 1, ReturnType::OBJECT)
}

pub fn validate_unary_string(expression: &Expression) -> ExpressionResult<()> {
    validate_arity_and_any_type(expression, 1, 1, ReturnType::STRING)
}

pub fn validate_unary_or_binary_string(expression: &Expression) -> ExpressionResult<()> {
    validate_arity_and_any_type(expression, 1, 2, ReturnType::STRING)
}

pub fn validate_unary_number(expression: &Expression) -> ExpressionResult<()> {
    validate_arity_and_any_type(expression, 1, 1, ReturnType::NUMBER)
}

pub fn validate_unary_boolean(expression: &Expression) -> ExpressionResult<()> {
    validate_order(expression, &[], &[ReturnType::BOOLEAN])
}

pub fn validate_no_arguments(expression: &Expression) -> ExpressionResult<()> {
    validate_arity_and_any_type(expression, 0, 0, ReturnType::OBJECT)
}

/// `fn(collection, iterator, body)` where `iterator` is a bare identifier.
pub fn validate_lambda_expression(expression: &Expression) -> ExpressionResult<()> {
    if expression.children.len() != 3 {
        return Err(Error::validation(format!(
            "Lambda expression expects 3 parameters, found {}",
            expression.children.len()
        )));
    }
    let second = &expression.children[1];
    if iterator_name(second).is_none() {
        return Err(Error::validation(format!(
            "Second parameter is not an identifier : {}",
            second
        )));
    }
    Ok(())
}

fn iterator_name(expression: &Expression) -> Option<&str> {
    if expression.is(crate::expression::ExpressionType::Accessor) && expression.children.len() == 1
    {
        expression.children[0].value.as_ref()?.as_str()
    } else {
        None
    }
}

pub fn verify_number(value: &Value, expression: &Expression, _: usize) -> Result<(), String> {
    if value.is_number() {
        Ok(())
    } else {
        Err(format!("{} is not a number.", expression))
    }
}

pub fn verify_numeric_list(value: &Value, expression: &Expression, _: usize) -> Result<(), String> {
    let items = value
        .as_list()
        .ok_or_else(|| format!("{} is not a list.", expression))?;
    match items.iter().find(|item| !item.is_number()) {
        Some(item) => Err(format!("{} is not a number in {}", item, expression)),
        None => Ok(()),
    }
}

pub fn verify_numeric_list_or_number(
    value: &Value,
    expression: &Expression,
    position: usize,
) -> Result<(), String> {
    if value.is_number() {
        return Ok(());
    }
    if value.as_list().is_none() {
        return Err(format!("{} is neither a list nor a number.", expression));
    }
    verify_numeric_list(value, expression, position)
}

pub fn verify_container(value: &Value, expression: &Expression, _: usize) -> Result<(), String> {
    match value {
        Value::String(_) | Value::List(_) | Value::Object(_) | Value::Binary(_) => Ok(()),
        _ => Err(format!("{} must be a string or list.", expression)),
    }
}

pub fn verify_container_or_null(
    value: &Value,
    expression: &Expression,
    _: usize,
) -> Result<(), String> {
    match value {
        Value::Null | Value::String(_) | Value::List(_) | Value::Object(_) => Ok(()),
        _ => Err(format!(
            "{} must be a string or list or a null object.",
            expression
        )),
    }
}

pub fn verify_list(value: &Value, expression: &Expression, _: usize) -> Result<(), String> {
    match value {
        Value::List(_) => Ok(()),
        _ => Err(format!("{} must be a list.", expression)),
    }
}

pub fn verify_integer(value: &Value, expression: &Expression, _: usize) -> Result<(), String> {
    match value {
        Value::Integer(_) => Ok(()),
        _ => Err(format!("{} is not an integer.", expression)),
    }
}

pub fn verify_string(value: &Value, expression: &Expression, _: usize) -> Result<(), String> {
    match value {
        Value::String(_) => Ok(()),
        _ => Err(format!("{} is not a string.", expression)),
    }
}

pub fn verify_string_or_null(
    value: &Value,
    expression: &Expression,
    _: usize,
) -> Result<(), String> {
    match value {
        Value::String(_) | Value::Null => Ok(()),
        _ => Err(format!(
            "{} is neither a string nor a null object.",
            expression
        )),
    }
}

pub fn verify_not_null(value: &Value, expression: &Expression, _: usize) -> Result<(), String> {
    if value.is_null() {
        Err(format!("{} is null.", expression))
    } else {
        Ok(())
    }
}

pub fn verify_number_or_string(
    value: &Value,
    expression: &Expression,
    _: usize,
) -> Result<(), String> {
    match value {
        Value::Integer(_) | Value::Float(_) | Value::String(_) => Ok(()),
        _ => Err(format!("{} is not string or number.", expression)),
    }
}

pub fn verify_number_or_string_or_null(
    value: &Value,
    expression: &Expression,
    _: usize,
) -> Result<(), String> {
    match value {
        Value::Null | Value::Integer(_) | Value::Float(_) | Value::String(_) => Ok(()),
        _ => Err(format!("{} is not string or number.", expression)),
    }
}

/// Evaluates every child in order, stopping at the first failure.
pub fn evaluate_children(
    expression: &Expression,
    memory: &mut dyn Memory,
    options: &Options,
    verify: Option<VerifyFn>,
) -> ExpressionResult<Vec<Value>> {
    let mut args = Vec::with_capacity(expression.children.len());
    for (position, child) in expression.children.iter().enumerate() {
        let value = child.try_evaluate(memory, options)?;
        if let Some(verify) = verify {
            verify(&value, child, position).map_err(Error::evaluation)?;
        }
        args.push(value);
    }
    Ok(args)
}

pub fn apply<F>(
    function: F,
    verify: Option<VerifyFn>,
) -> impl Fn(&Expression, &mut dyn Memory, &Options) -> ExpressionResult<Value> + Send + Sync + 'static
where
    F: Fn(&[Value]) -> Value + Send + Sync + 'static,
{
    move |expression: &Expression, memory: &mut dyn Memory, options: &Options| {
        let args = evaluate_children(expression, memory, options, verify)?;
        Ok(function(&args))
    }
}

pub fn apply_with_error<F>(
    function: F,
    verify: Option<VerifyFn>,
) -> impl Fn(&Expression, &mut dyn Memory, &Options) -> ExpressionResult<Value> + Send + Sync + 'static
where
    F: Fn(&[Value]) -> ExpressionResult<Value> + Send + Sync + 'static,
{
    move |expression: &Expression, memory: &mut dyn Memory, options: &Options| {
        let args = evaluate_children(expression, memory, options, verify)?;
        function(&args)
    }
}

pub fn apply_with_options_and_error<F>(
    function: F,
    verify: Option<VerifyFn>,
) -> impl Fn(&Expression, &mut dyn Memory, &Options) -> ExpressionResult<Value> + Send + Sync + 'static
where
    F: Fn(&[Value], &Options) -> ExpressionResult<Value> + Send + Sync + 'static,
{
    move |expression: &Expression, memory: &mut dyn Memory, options: &Options| {
        let args = evaluate_children(expression, memory, options, verify)?;
        function(&args, options)
    }
}

/// Folds a binary function over all arguments from left to right.
pub fn apply_sequence<F>(
    function: F,
    verify: Option<VerifyFn>,
) -> impl Fn(&Expression, &mut dyn Memory, &Options) -> ExpressionResult<Value> + Send + Sync + 'static
where
    F: Fn(&Value, &Value) -> Value + Send + Sync + 'static,
{
    apply(
        move |args| {
            let mut iter = args.iter();
            let first = iter.next().cloned().unwrap_or_default();
            iter.fold(first, |sofar, next| function(&sofar, next))
        },
        verify,
    )
}

pub fn apply_sequence_with_error<F>(
    function: F,
    verify: Option<VerifyFn>,
) -> impl Fn(&Expression, &mut dyn Memory, &Options) -> ExpressionResult<Value> + Send + Sync + 'static
where
    F: Fn(&Value, &Value) -> ExpressionResult<Value> + Send + Sync + 'static,
{
    apply_with_error(
        move |args| {
            let mut iter = args.iter();
            let first = iter.next().cloned().unwrap_or_default();
            iter.try_fold(first, |sofar, next| function(&sofar, next))
        },
        verify,
    )
}

/// Converts a value to an `i32`, accepting whole floats.
pub fn parse_int32(value: &Value) -> Result<i32, String> {
    let error = || format!("{} must be a 32-bit signed integer.", value);
    match value {
        Value::Integer(i) => i32::try_from(*i).map_err(|_| error()),
        Value::Float(f) if f.fract() == 0.0 && *f >= i32::MIN as f64 && *f <= i32::MAX as f64 => {
            Ok(*f as i32)
        }
        _ => Err(error()),
    }
}

/// Treats anything that is not a string as the empty string.
pub fn parse_string_or_null(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        _ => String::new(),
    }
}

/// Lists iterate as themselves; objects iterate as `{key, value}` pairs.
pub fn convert_to_list(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::List(items) => Some(items.clone()),
        Value::Object(map) => Some(
            map.iter()
                .map(|(key, value)| {
                    let mut pair = ObjectMap::new();
                    pair.insert("key", Value::String(key.clone()));
                    pair.insert("value", value.clone());
                    Value::Object(pair)
                })
                .collect(),
        ),
        _ => None,
    }
}

/// Evaluates the body of `fn(collection, iterator, body)` once per item, with
/// the item bound to the iterator name in a new scope.
///
/// The callback receives the item and the body's result and returns `true` to
/// stop iterating.
pub fn lambda_evaluator<F>(
    expression: &Expression,
    memory: &mut dyn Memory,
    options: &Options,
    items: &[Value],
    mut callback: F,
) -> ExpressionResult<()>
where
    F: FnMut(&Value, ExpressionResult<Value>) -> ExpressionResult<bool>,
{
    let iterator = iterator_name(&expression.children[1])
        .ok_or_else(|| {
            Error::evaluation(format!(
                "Second parameter is not an identifier : {}",
                expression.children[1]
            ))
        })?
        .to_string();

    for item in items {
        let mut local = ObjectMap::new();
        local.insert(iterator.clone(), item.clone());
        let scope = SimpleObjectMemory::new(Value::Object(local));

        let result = {
            let mut stacked = StackedMemory::wrap(&*memory);
            stacked.push(&scope);
            expression.children[2].try_evaluate(&mut stacked, options)
        };

        if callback(item, result)? {
            break;
        }
    }
    Ok(())
}

/// Evaluates the collection argument of a lambda builtin.
pub fn evaluate_lambda_source(
    expression: &Expression,
    memory: &mut dyn Memory,
    options: &Options,
) -> ExpressionResult<(Value, Vec<Value>)> {
    let source = expression.children[0].try_evaluate(memory, options)?;
    if source.is_null() {
        return Err(Error::evaluation(format!(
            "'{}' evaluated to null.",
            expression.children[0]
        )));
    }
    let items = convert_to_list(&source).ok_or_else(|| {
        Error::evaluation(format!(
            "{} is not a collection or structure object to run {}",
            expression.children[0],
            expression.expr_type()
        ))
    })?;
    Ok((source, items))
}
