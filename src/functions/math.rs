use super::utils::*;
use crate::{
    error::{Error, ExpressionResult},
    expression::{Expression, ExpressionEvaluator, ExpressionType, ReturnType},
    value::Value,
};

/// Integer arithmetic while both sides are integers and the result fits,
/// float arithmetic otherwise.
fn arithmetic(
    left: &Value,
    right: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Value {
    if let (Value::Integer(a), Value::Integer(b)) = (left, right) {
        if let Some(result) = int_op(*a, *b) {
            return Value::Integer(result);
        }
    }
    let a = left.as_f64().unwrap_or_default();
    let b = right.as_f64().unwrap_or_default();
    Value::Float(float_op(a, b))
}

fn add(left: &Value, right: &Value) -> ExpressionResult<Value> {
    let string_concat = !left.is_number() || !right.is_number();
    if (left.is_null() && right.is_number()) || (right.is_null() && left.is_number()) {
        return Err(Error::evaluation(
            "Operator '+' or add cannot be applied to operands of type 'number' and null object.",
        ));
    }
    if string_concat {
        let render = |v: &Value| if v.is_null() { String::new() } else { v.to_string() };
        return Ok(Value::String(format!("{}{}", render(left), render(right))));
    }
    Ok(arithmetic(left, right, i64::checked_add, |a, b| a + b))
}

fn verify_divisor(value: &Value, expression: &Expression, position: usize) -> Result<(), String> {
    verify_number(value, expression, position)?;
    if position > 0 && value.as_f64() == Some(0.0) {
        return Err(format!("Cannot divide by 0 from {}", expression));
    }
    Ok(())
}

fn divide(left: &Value, right: &Value) -> Value {
    arithmetic(left, right, i64::checked_div, |a, b| a / b)
}

fn modulo(args: &[Value]) -> ExpressionResult<Value> {
    match (&args[0], &args[1]) {
        (_, Value::Integer(0)) => Err(Error::evaluation("Cannot mod by 0")),
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a.wrapping_rem(*b))),
        _ => Err(Error::evaluation("mod only accepts integers")),
    }
}

/// Flattens numeric list arguments so `max(list, 5)` compares every number.
fn numbers(args: &[Value]) -> Vec<&Value> {
    args.iter()
        .flat_map(|arg| match arg {
            Value::List(items) => items.iter().collect::<Vec<_>>(),
            other => vec![other],
        })
        .collect()
}

fn extreme(args: &[Value], pick_greater: bool) -> ExpressionResult<Value> {
    numbers(args)
        .into_iter()
        .reduce(|best, next| {
            let better = match (best.as_f64(), next.as_f64()) {
                (Some(b), Some(n)) if pick_greater => n > b,
                (Some(b), Some(n)) => n < b,
                _ => false,
            };
            if better {
                next
            } else {
                best
            }
        })
        .cloned()
        .ok_or_else(|| Error::evaluation("there are no numbers to compare"))
}

fn sum(args: &[Value]) -> Value {
    let items = args[0].as_list().map(Vec::as_slice).unwrap_or_default();
    if items.iter().all(Value::is_integer) {
        let total = items
            .iter()
            .filter_map(Value::as_i64)
            .try_fold(0i64, |acc, i| acc.checked_add(i));
        if let Some(total) = total {
            return Value::Integer(total);
        }
    }
    Value::Float(items.iter().filter_map(Value::as_f64).sum())
}

fn average(args: &[Value]) -> ExpressionResult<Value> {
    let items = args[0].as_list().map(Vec::as_slice).unwrap_or_default();
    if items.is_empty() {
        return Err(Error::evaluation("average of an empty list is undefined"));
    }
    let total: f64 = items.iter().filter_map(Value::as_f64).sum();
    Ok(Value::Float(total / items.len() as f64))
}

/// Longest list `range` will build.
const MAX_RANGE_COUNT: i32 = 1_000_000;

fn range(args: &[Value]) -> ExpressionResult<Value> {
    let start = parse_int32(&args[0]).map_err(Error::evaluation)?;
    let count = parse_int32(&args[1]).map_err(Error::evaluation)?;
    if count <= 0 {
        return Err(Error::evaluation(
            "The second parameter should be more than zero",
        ));
    }
    if count > MAX_RANGE_COUNT {
        return Err(Error::evaluation(format!(
            "The second parameter should be at most {}",
            MAX_RANGE_COUNT
        )));
    }
    // the last element must still be an int32
    let end = i64::from(start) + i64::from(count) - 1;
    if end > i64::from(i32::MAX) {
        return Err(Error::evaluation(format!(
            "range({}, {}) goes past the largest 32-bit integer",
            start, count
        )));
    }
    Ok(Value::List(
        (i64::from(start)..=end).map(Value::Integer).collect(),
    ))
}

/// Rounds to `digits` decimals, sending midpoints to the even neighbour.
fn round_half_even(x: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    let scaled = x * scale;
    let rounded = scaled.round();
    let result = if (scaled - scaled.trunc()).abs() == 0.5 {
        2.0 * (scaled / 2.0).round()
    } else {
        rounded
    };
    result / scale
}

fn round(args: &[Value]) -> ExpressionResult<Value> {
    let digits = match args.get(1) {
        Some(value) => parse_int32(value).map_err(Error::evaluation)?,
        None => 0,
    };
    if !(0..=15).contains(&digits) {
        return Err(Error::evaluation(
            "The second parameter should be an integer between 0 and 15",
        ));
    }
    let x = args[0].as_f64().unwrap_or_default();
    Ok(Value::Float(round_half_even(x, digits)))
}

fn float_unary(args: &[Value], f: fn(f64) -> f64) -> Value {
    Value::Float(f(args[0].as_f64().unwrap_or_default()))
}

pub(super) fn evaluators() -> Vec<ExpressionEvaluator> {
    vec![
        ExpressionEvaluator::new(
            ExpressionType::Add.as_ref(),
            apply_sequence_with_error(add, Some(verify_number_or_string_or_null)),
            ReturnType::STRING | ReturnType::NUMBER,
            |e| {
                validate_arity_and_any_type(
                    e,
                    2,
                    usize::MAX,
                    ReturnType::STRING | ReturnType::NUMBER,
                )
            },
        ),
        ExpressionEvaluator::new(
            ExpressionType::Subtract.as_ref(),
            apply_sequence(
                |a, b| arithmetic(a, b, i64::checked_sub, |x, y| x - y),
                Some(verify_number),
            ),
            ReturnType::NUMBER,
            validate_two_or_more_than_two_numbers,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Multiply.as_ref(),
            apply_sequence(
                |a, b| arithmetic(a, b, i64::checked_mul, |x, y| x * y),
                Some(verify_number),
            ),
            ReturnType::NUMBER,
            validate_two_or_more_than_two_numbers,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Divide.as_ref(),
            apply_sequence(divide, Some(verify_divisor)),
            ReturnType::NUMBER,
            validate_two_or_more_than_two_numbers,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Power.as_ref(),
            apply_sequence(
                |a, b| {
                    Value::Float(
                        a.as_f64()
                            .unwrap_or_default()
                            .powf(b.as_f64().unwrap_or_default()),
                    )
                },
                Some(verify_number),
            ),
            ReturnType::NUMBER,
            validate_two_or_more_than_two_numbers,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Mod.as_ref(),
            apply_with_error(modulo, Some(verify_integer)),
            ReturnType::NUMBER,
            validate_binary_number,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Min.as_ref(),
            apply_with_error(|args| extreme(args, false), Some(verify_numeric_list_or_number)),
            ReturnType::NUMBER,
            |e| validate_arity_and_any_type(e, 1, usize::MAX, ReturnType::NUMBER | ReturnType::ARRAY),
        ),
        ExpressionEvaluator::new(
            ExpressionType::Max.as_ref(),
            apply_with_error(|args| extreme(args, true), Some(verify_numeric_list_or_number)),
            ReturnType::NUMBER,
            |e| validate_arity_and_any_type(e, 1, usize::MAX, ReturnType::NUMBER | ReturnType::ARRAY),
        ),
        ExpressionEvaluator::new(
            ExpressionType::Sum.as_ref(),
            apply(sum, Some(verify_numeric_list)),
            ReturnType::NUMBER,
            |e| validate_order(e, &[], &[ReturnType::ARRAY]),
        ),
        ExpressionEvaluator::new(
            ExpressionType::Average.as_ref(),
            apply_with_error(average, Some(verify_numeric_list)),
            ReturnType::NUMBER,
            |e| validate_order(e, &[], &[ReturnType::ARRAY]),
        ),
        ExpressionEvaluator::new(
            ExpressionType::Range.as_ref(),
            apply_with_error(range, Some(verify_integer)),
            ReturnType::ARRAY,
            validate_binary_number,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Floor.as_ref(),
            apply(|args| float_unary(args, f64::floor), Some(verify_number)),
            ReturnType::NUMBER,
            validate_unary_number,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Ceiling.as_ref(),
            apply(|args| float_unary(args, f64::ceil), Some(verify_number)),
            ReturnType::NUMBER,
            validate_unary_number,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Round.as_ref(),
            apply_with_error(round, Some(verify_number)),
            ReturnType::NUMBER,
            validate_unary_or_binary_number,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Abs.as_ref(),
            apply(
                |args| match &args[0] {
                    Value::Integer(i) => Value::Integer(i.wrapping_abs()),
                    other => Value::Float(other.as_f64().unwrap_or_default().abs()),
                },
                Some(verify_number),
            ),
            ReturnType::NUMBER,
            validate_unary_number,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Sqrt.as_ref(),
            apply_with_error(
                |args| {
                    let x = args[0].as_f64().unwrap_or_default();
                    if x < 0.0 {
                        Err(Error::evaluation("Square root of a negative number is undefined"))
                    } else {
                        Ok(Value::Float(x.sqrt()))
                    }
                },
                Some(verify_number),
            ),
            ReturnType::NUMBER,
            validate_unary_number,
        ),
    ]
}
