use std::cmp::Ordering;

use super::{comparison::compare, utils::*};
use crate::{
    config::Options,
    error::{Error, ExpressionResult},
    expression::{Expression, ExpressionEvaluator, ExpressionType, ReturnType},
    memory::{Memory, SimpleObjectMemory},
    value::{ObjectMap, Value},
};

fn count(args: &[Value]) -> ExpressionResult<Value> {
    match &args[0] {
        Value::String(s) => Ok(Value::from(s.chars().count())),
        Value::List(items) => Ok(Value::from(items.len())),
        Value::Binary(bytes) => Ok(Value::from(bytes.len())),
        Value::Object(map) => Ok(Value::from(map.len())),
        other => Err(Error::evaluation(format!(
            "{} is not a string or list.",
            other
        ))),
    }
}

fn contains(args: &[Value]) -> Value {
    let found = match (&args[0], &args[1]) {
        (Value::String(text), Value::String(search)) => text.contains(search.as_str()),
        (Value::List(items), needle) => items.iter().any(|item| item.values_equal(needle)),
        (Value::Object(map), Value::String(key)) => map.contains_key(key),
        _ => false,
    };
    Value::Boolean(found)
}

fn first_or_last(args: &[Value], last: bool) -> Value {
    match &args[0] {
        Value::String(s) => {
            let c = if last { s.chars().last() } else { s.chars().next() };
            c.map(|c| Value::String(c.to_string())).unwrap_or_default()
        }
        Value::List(items) => {
            let item = if last { items.last() } else { items.first() };
            item.cloned().unwrap_or_default()
        }
        _ => Value::Null,
    }
}

fn join(args: &[Value]) -> ExpressionResult<Value> {
    let items = args[0]
        .as_list()
        .ok_or_else(|| Error::evaluation(format!("{} is not a list or array.", args[0])))?;
    let separator = parse_string_or_null(&args[1]);
    let strings: Vec<String> = items.iter().map(ToString::to_string).collect();
    let joined = match args.get(2) {
        Some(last_separator) if strings.len() > 1 => {
            let last_separator = parse_string_or_null(last_separator);
            let (last, init) = strings.split_last().map(|(l, i)| (l.clone(), i)).unwrap_or_default();
            format!("{}{}{}", init.join(&separator), last_separator, last)
        }
        _ => strings.join(&separator),
    };
    Ok(Value::String(joined))
}

/// `foreach` and `select`: the body's value for every item.
fn foreach(expression: &Expression, memory: &mut dyn Memory, options: &Options) -> ExpressionResult<Value> {
    let (_, items) = evaluate_lambda_source(expression, memory, options)?;
    let mut results = Vec::with_capacity(items.len());
    lambda_evaluator(expression, memory, options, &items, |_, result| {
        results.push(result?);
        Ok(false)
    })?;
    Ok(Value::List(results))
}

fn where_(expression: &Expression, memory: &mut dyn Memory, options: &Options) -> ExpressionResult<Value> {
    let (source, items) = evaluate_lambda_source(expression, memory, options)?;
    let mut kept = Vec::new();
    lambda_evaluator(expression, memory, options, &items, |item, result| {
        if result?.is_logic_true() {
            kept.push(item.clone());
        }
        Ok(false)
    })?;

    if matches!(source, Value::Object(_)) {
        let object: ObjectMap = kept
            .into_iter()
            .filter_map(|pair| {
                let pair = pair.as_object()?;
                let key = pair.get("key")?.as_str()?.to_string();
                Some((key, pair.get("value").cloned().unwrap_or_default()))
            })
            .collect();
        return Ok(Value::Object(object));
    }
    Ok(Value::List(kept))
}

fn any(expression: &Expression, memory: &mut dyn Memory, options: &Options) -> ExpressionResult<Value> {
    let (_, items) = evaluate_lambda_source(expression, memory, options)?;
    let mut found = false;
    lambda_evaluator(expression, memory, options, &items, |_, result| {
        found = result?.is_logic_true();
        Ok(found)
    })?;
    Ok(Value::Boolean(found))
}

fn all(expression: &Expression, memory: &mut dyn Memory, options: &Options) -> ExpressionResult<Value> {
    let (_, items) = evaluate_lambda_source(expression, memory, options)?;
    let mut every = true;
    lambda_evaluator(expression, memory, options, &items, |_, result| {
        every = result?.is_logic_true();
        Ok(!every)
    })?;
    Ok(Value::Boolean(every))
}

fn push_unique(target: &mut Vec<Value>, item: &Value) {
    if !target.iter().any(|existing| existing.values_equal(item)) {
        target.push(item.clone());
    }
}

fn union(args: &[Value]) -> Value {
    let mut result = Vec::new();
    for item in args.iter().filter_map(Value::as_list).flatten() {
        push_unique(&mut result, item);
    }
    Value::List(result)
}

fn intersection(args: &[Value]) -> Value {
    let mut lists = args.iter().filter_map(Value::as_list);
    let Some(first) = lists.next() else {
        return Value::List(Vec::new());
    };
    let rest: Vec<&Vec<Value>> = lists.collect();
    let mut result = Vec::new();
    for item in first {
        if rest
            .iter()
            .all(|list| list.iter().any(|other| other.values_equal(item)))
        {
            push_unique(&mut result, item);
        }
    }
    Value::List(result)
}

fn unique(args: &[Value]) -> Value {
    let mut result = Vec::new();
    for item in args[0].as_list().map(Vec::as_slice).unwrap_or_default() {
        push_unique(&mut result, item);
    }
    Value::List(result)
}

/// Items as a list, or the characters of a string.
fn sequence(value: &Value) -> Option<(Vec<Value>, bool)> {
    match value {
        Value::List(items) => Some((items.clone(), false)),
        Value::String(s) => Some((s.chars().map(|c| Value::String(c.to_string())).collect(), true)),
        _ => None,
    }
}

fn rebuild(items: Vec<Value>, as_string: bool) -> Value {
    if as_string {
        Value::String(items.iter().map(ToString::to_string).collect())
    } else {
        Value::List(items)
    }
}

fn skip(args: &[Value]) -> ExpressionResult<Value> {
    let (items, as_string) = sequence(&args[0])
        .ok_or_else(|| Error::evaluation(format!("{} is not array or string.", args[0])))?;
    let start = parse_int32(&args[1]).map_err(Error::evaluation)?.max(0) as usize;
    let start = start.min(items.len());
    Ok(rebuild(items[start..].to_vec(), as_string))
}

fn take(args: &[Value]) -> ExpressionResult<Value> {
    let (items, as_string) = sequence(&args[0])
        .ok_or_else(|| Error::evaluation(format!("{} is not array or string.", args[0])))?;
    let count = parse_int32(&args[1]).map_err(Error::evaluation)?;
    if count < 0 {
        return Err(Error::evaluation(format!(
            "{} is not a positive integer.",
            count
        )));
    }
    let count = (count as usize).min(items.len());
    Ok(rebuild(items[..count].to_vec(), as_string))
}

fn sub_array(args: &[Value]) -> ExpressionResult<Value> {
    let (items, as_string) = sequence(&args[0])
        .ok_or_else(|| Error::evaluation(format!("{} is not array or string.", args[0])))?;
    let start = parse_int32(&args[1]).map_err(Error::evaluation)?;
    if start < 0 || start as usize > items.len() {
        return Err(Error::evaluation(format!(
            "start={} which is out of range for {}",
            start, args[0]
        )));
    }
    let end = match args.get(2) {
        Some(end) => parse_int32(end).map_err(Error::evaluation)?,
        None => items.len() as i32,
    };
    if end < start || end as usize > items.len() {
        return Err(Error::evaluation(format!(
            "end={} which is out of range for {}",
            end, args[0]
        )));
    }
    Ok(rebuild(
        items[start as usize..end as usize].to_vec(),
        as_string,
    ))
}

fn sort_by(args: &[Value], descending: bool) -> ExpressionResult<Value> {
    let items = args[0]
        .as_list()
        .ok_or_else(|| Error::evaluation(format!("{} is not array.", args[0])))?;
    let property = args.get(1).map(parse_string_or_null);
    let key = |item: &Value| match &property {
        Some(path) => SimpleObjectMemory::new(item.clone()).get_value(path),
        None => item.clone(),
    };
    let mut keyed: Vec<(Value, Value)> = items.iter().map(|item| (key(item), item.clone())).collect();
    keyed.sort_by(|(a, _), (b, _)| {
        let ordering = compare(a, b).unwrap_or(Ordering::Equal);
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
    Ok(Value::List(keyed.into_iter().map(|(_, item)| item).collect()))
}

fn indices_and_values(args: &[Value]) -> ExpressionResult<Value> {
    let pair = |index: Value, value: &Value| {
        let mut map = ObjectMap::new();
        map.insert("index", index);
        map.insert("value", value.clone());
        Value::Object(map)
    };
    match &args[0] {
        Value::List(items) => Ok(Value::List(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| pair(Value::from(i), item))
                .collect(),
        )),
        Value::Object(map) => Ok(Value::List(
            map.iter()
                .map(|(key, value)| pair(Value::String(key.clone()), value))
                .collect(),
        )),
        other => Err(Error::evaluation(format!(
            "{} is not array or object.",
            other
        ))),
    }
}

fn flatten_into(items: &[Value], depth: i32, target: &mut Vec<Value>) {
    for item in items {
        match item {
            Value::List(inner) if depth > 0 => flatten_into(inner, depth - 1, target),
            other => target.push(other.clone()),
        }
    }
}

fn flatten(args: &[Value]) -> ExpressionResult<Value> {
    let items = args[0]
        .as_list()
        .ok_or_else(|| Error::evaluation(format!("{} is not array.", args[0])))?;
    let depth = match args.get(1) {
        Some(depth) => parse_int32(depth).map_err(Error::evaluation)?,
        None => 100,
    };
    let mut result = Vec::new();
    flatten_into(items, depth, &mut result);
    Ok(Value::List(result))
}

fn reverse(args: &[Value]) -> ExpressionResult<Value> {
    match &args[0] {
        Value::String(s) => Ok(Value::String(s.chars().rev().collect())),
        Value::List(items) => Ok(Value::List(items.iter().rev().cloned().collect())),
        other => Err(Error::evaluation(format!(
            "{} is not a string or list.",
            other
        ))),
    }
}

pub(super) fn evaluators() -> Vec<ExpressionEvaluator> {
    vec![
        ExpressionEvaluator::new(
            ExpressionType::Count.as_ref(),
            apply_with_error(count, Some(verify_container)),
            ReturnType::NUMBER,
            |e| validate_order(e, &[], &[ReturnType::STRING | ReturnType::ARRAY]),
        ),
        ExpressionEvaluator::new(
            ExpressionType::Contains.as_ref(),
            apply(contains, None),
            ReturnType::BOOLEAN,
            validate_binary,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Empty.as_ref(),
            apply(|args| Value::Boolean(args[0].is_empty_value()), None),
            ReturnType::BOOLEAN,
            validate_unary,
        ),
        ExpressionEvaluator::new(
            ExpressionType::First.as_ref(),
            apply(|args| first_or_last(args, false), None),
            ReturnType::OBJECT,
            validate_unary,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Last.as_ref(),
            apply(|args| first_or_last(args, true), None),
            ReturnType::OBJECT,
            validate_unary,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Join.as_ref(),
            apply_with_error(join, None),
            ReturnType::STRING,
            |e| {
                validate_order(
                    e,
                    &[ReturnType::STRING],
                    &[ReturnType::ARRAY, ReturnType::STRING],
                )
            },
        ),
        ExpressionEvaluator::new(
            ExpressionType::Foreach.as_ref(),
            foreach,
            ReturnType::ARRAY,
            validate_lambda_expression,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Select.as_ref(),
            foreach,
            ReturnType::ARRAY,
            validate_lambda_expression,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Where.as_ref(),
            where_,
            ReturnType::ARRAY,
            validate_lambda_expression,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Any.as_ref(),
            any,
            ReturnType::BOOLEAN,
            validate_lambda_expression,
        ),
        ExpressionEvaluator::new(
            ExpressionType::All.as_ref(),
            all,
            ReturnType::BOOLEAN,
            validate_lambda_expression,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Union.as_ref(),
            apply(union, Some(verify_list)),
            ReturnType::ARRAY,
            |e| validate_arity_and_any_type(e, 1, usize::MAX, ReturnType::ARRAY),
        ),
        ExpressionEvaluator::new(
            ExpressionType::Intersection.as_ref(),
            apply(intersection, Some(verify_list)),
            ReturnType::ARRAY,
            |e| validate_arity_and_any_type(e, 1, usize::MAX, ReturnType::ARRAY),
        ),
        ExpressionEvaluator::new(
            ExpressionType::Skip.as_ref(),
            apply_with_error(skip, None),
            ReturnType::ARRAY | ReturnType::STRING,
            |e| {
                validate_order(
                    e,
                    &[],
                    &[ReturnType::ARRAY | ReturnType::STRING, ReturnType::NUMBER],
                )
            },
        ),
        ExpressionEvaluator::new(
            ExpressionType::Take.as_ref(),
            apply_with_error(take, None),
            ReturnType::ARRAY | ReturnType::STRING,
            |e| {
                validate_order(
                    e,
                    &[],
                    &[ReturnType::ARRAY | ReturnType::STRING, ReturnType::NUMBER],
                )
            },
        ),
        ExpressionEvaluator::new(
            ExpressionType::SubArray.as_ref(),
            apply_with_error(sub_array, None),
            ReturnType::ARRAY | ReturnType::STRING,
            |e| {
                validate_order(
                    e,
                    &[ReturnType::NUMBER],
                    &[ReturnType::ARRAY | ReturnType::STRING, ReturnType::NUMBER],
                )
            },
        ),
        ExpressionEvaluator::new(
            ExpressionType::SortBy.as_ref(),
            apply_with_error(|args| sort_by(args, false), None),
            ReturnType::ARRAY,
            |e| validate_order(e, &[ReturnType::STRING], &[ReturnType::ARRAY]),
        ),
        ExpressionEvaluator::new(
            ExpressionType::SortByDescending.as_ref(),
            apply_with_error(|args| sort_by(args, true), None),
            ReturnType::ARRAY,
            |e| validate_order(e, &[ReturnType::STRING], &[ReturnType::ARRAY]),
        ),
        ExpressionEvaluator::new(
            ExpressionType::IndicesAndValues.as_ref(),
            apply_with_error(indices_and_values, None),
            ReturnType::ARRAY,
            validate_unary,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Flatten.as_ref(),
            apply_with_error(flatten, None),
            ReturnType::ARRAY,
            |e| validate_order(e, &[ReturnType::NUMBER], &[ReturnType::ARRAY]),
        ),
        ExpressionEvaluator::new(
            ExpressionType::Unique.as_ref(),
            apply(unique, Some(verify_list)),
            ReturnType::ARRAY,
            |e| validate_order(e, &[], &[ReturnType::ARRAY]),
        ),
        ExpressionEvaluator::new(
            ExpressionType::Reverse.as_ref(),
            apply_with_error(reverse, None),
            ReturnType::ARRAY | ReturnType::STRING,
            |e| validate_order(e, &[], &[ReturnType::ARRAY | ReturnType::STRING]),
        ),
        ExpressionEvaluator::new(
            ExpressionType::CreateArray.as_ref(),
            apply(|args| Value::List(args.to_vec()), None),
            ReturnType::ARRAY,
            |_| Ok(()),
        ),
    ]
}
