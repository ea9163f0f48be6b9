use super::utils::*;
use crate::{
    config::Options,
    error::{Error, ExpressionResult},
    expression::{Expression, ExpressionEvaluator, ExpressionType, ReturnType},
    memory::Memory,
    value::Value,
};

/// Truthiness of a child in a boolean context. Substitution is disabled and a
/// failing child counts as false.
fn child_is_true(child: &Expression, memory: &mut dyn Memory, options: &Options) -> bool {
    match child.try_evaluate(memory, &options.without_null_substitution()) {
        Ok(value) => value.is_logic_true(),
        Err(e) => {
            tracing::trace!("{} treated as false: {}", child, e);
            false
        }
    }
}

fn and(expression: &Expression, memory: &mut dyn Memory, options: &Options) -> ExpressionResult<Value> {
    for child in &expression.children {
        if !child_is_true(child, memory, options) {
            return Ok(Value::Boolean(false));
        }
    }
    Ok(Value::Boolean(true))
}

fn or(expression: &Expression, memory: &mut dyn Memory, options: &Options) -> ExpressionResult<Value> {
    for child in &expression.children {
        if child_is_true(child, memory, options) {
            return Ok(Value::Boolean(true));
        }
    }
    Ok(Value::Boolean(false))
}

fn not(expression: &Expression, memory: &mut dyn Memory, options: &Options) -> ExpressionResult<Value> {
    Ok(Value::Boolean(!child_is_true(
        &expression.children[0],
        memory,
        options,
    )))
}

fn if_then_else(
    expression: &Expression,
    memory: &mut dyn Memory,
    options: &Options,
) -> ExpressionResult<Value> {
    let branch = if child_is_true(&expression.children[0], memory, options) {
        &expression.children[1]
    } else {
        &expression.children[2]
    };
    branch.try_evaluate(memory, options)
}

fn to_bool(expression: &Expression, memory: &mut dyn Memory, options: &Options) -> ExpressionResult<Value> {
    Ok(Value::Boolean(child_is_true(
        &expression.children[0],
        memory,
        options,
    )))
}

fn optional(expression: &Expression, _: &mut dyn Memory, _: &Options) -> ExpressionResult<Value> {
    Err(Error::evaluation(format!(
        "{} is only meaningful inside a trigger condition",
        expression
    )))
}

pub(super) fn evaluators() -> Vec<ExpressionEvaluator> {
    vec![
        ExpressionEvaluator::new(
            ExpressionType::And.as_ref(),
            and,
            ReturnType::BOOLEAN,
            validate_at_least_one,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Or.as_ref(),
            or,
            ReturnType::BOOLEAN,
            validate_at_least_one,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Not.as_ref(),
            not,
            ReturnType::BOOLEAN,
            validate_unary,
        ),
        ExpressionEvaluator::new(
            ExpressionType::If.as_ref(),
            if_then_else,
            ReturnType::OBJECT,
            |e| validate_arity_and_any_type(e, 3, 3, ReturnType::OBJECT),
        ),
        ExpressionEvaluator::new(
            ExpressionType::Bool.as_ref(),
            to_bool,
            ReturnType::BOOLEAN,
            validate_unary,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Optional.as_ref(),
            optional,
            ReturnType::BOOLEAN,
            validate_unary_boolean,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Ignore.as_ref(),
            to_bool,
            ReturnType::BOOLEAN,
            validate_unary_boolean,
        ),
    ]
}
