use super::{jpath, utils::*};
use crate::{
    config::Options,
    error::{Error, ExpressionResult},
    expression::{Expression, ExpressionEvaluator, ExpressionType, ReturnType},
    memory::Memory,
    value::{ObjectMap, Value},
};

fn parse_json(args: &[Value]) -> ExpressionResult<Value> {
    match &args[0] {
        Value::String(text) => Value::from_json_str(text.trim()).map_err(|e| {
            Error::evaluation(format!("{} is not a valid json string: {}", text, e))
        }),
        other => Ok(other.clone()),
    }
}

fn object_arg<'v>(value: &'v Value, function: &str) -> ExpressionResult<&'v ObjectMap> {
    value.as_object().ok_or_else(|| {
        Error::evaluation(format!("{} expects an object, not {}.", function, value))
    })
}

/// `getProperty(obj, name)` reads from `obj`; `getProperty(name)` reads a
/// top-level property from memory.
fn get_property(
    expression: &Expression,
    memory: &mut dyn Memory,
    options: &Options,
) -> ExpressionResult<Value> {
    let args = evaluate_children(expression, memory, options, None)?;
    match args.as_slice() {
        [Value::String(name)] => Ok(memory.get_value(&format!("['{}']", name))),
        [instance, Value::String(name)] => Ok(match instance {
            Value::Object(map) => map.get(name).cloned().unwrap_or_default(),
            Value::Null => Value::Null,
            other => {
                return Err(Error::evaluation(format!(
                    "{} is not an object to read {} from.",
                    other, name
                )))
            }
        }),
        _ => Err(Error::evaluation(format!(
            "{} should have a property name string.",
            expression
        ))),
    }
}

fn add_property(args: &[Value]) -> ExpressionResult<Value> {
    let mut map = object_arg(&args[0], "addProperty")?.clone();
    let key = parse_string_or_null(&args[1]);
    if map.contains_key(&key) {
        return Err(Error::evaluation(format!(
            "{} already exists in {}.",
            key, args[0]
        )));
    }
    map.insert(key, args[2].clone());
    Ok(Value::Object(map))
}

fn set_property(args: &[Value]) -> ExpressionResult<Value> {
    let mut map = object_arg(&args[0], "setProperty")?.clone();
    map.insert(parse_string_or_null(&args[1]), args[2].clone());
    Ok(Value::Object(map))
}

fn remove_property(args: &[Value]) -> ExpressionResult<Value> {
    let mut map = object_arg(&args[0], "removeProperty")?.clone();
    map.remove(&parse_string_or_null(&args[1]));
    Ok(Value::Object(map))
}

fn coalesce(args: &[Value]) -> Value {
    args.iter().find(|arg| !arg.is_null()).cloned().unwrap_or_default()
}

/// Nested objects merge recursively; any other value replaces the old one.
fn merge_into(target: &mut ObjectMap, source: &ObjectMap) {
    for (key, value) in source.iter() {
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                merge_into(existing, incoming)
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

fn merge(args: &[Value]) -> ExpressionResult<Value> {
    let mut result = ObjectMap::new();
    for arg in args {
        match arg {
            Value::Object(map) => merge_into(&mut result, map),
            Value::List(items) if items.iter().all(|item| item.as_object().is_some()) => {
                for map in items.iter().filter_map(Value::as_object) {
                    merge_into(&mut result, map);
                }
            }
            other => {
                return Err(Error::evaluation(format!(
                    "The argument {} must be a JSON object or array of JSON objects.",
                    other
                )))
            }
        }
    }
    Ok(Value::Object(result))
}

fn json_path(args: &[Value]) -> ExpressionResult<Value> {
    let root = parse_json(&args[..1])?;
    let path = parse_string_or_null(&args[1]);
    let mut matches = jpath::select(&root, &path).map_err(Error::evaluation)?;
    Ok(if matches.len() == 1 {
        matches.remove(0)
    } else {
        Value::List(matches)
    })
}

pub(super) fn evaluators() -> Vec<ExpressionEvaluator> {
    vec![
        ExpressionEvaluator::new(
            ExpressionType::Json.as_ref(),
            apply_with_error(parse_json, None),
            ReturnType::OBJECT,
            |e| validate_order(e, &[ReturnType::STRING], &[ReturnType::STRING]),
        ),
        ExpressionEvaluator::new(
            ExpressionType::GetProperty.as_ref(),
            get_property,
            ReturnType::OBJECT,
            |e| validate_order(e, &[ReturnType::STRING], &[ReturnType::OBJECT]),
        ),
        ExpressionEvaluator::new(
            ExpressionType::AddProperty.as_ref(),
            apply_with_error(add_property, None),
            ReturnType::OBJECT,
            |e| {
                validate_order(
                    e,
                    &[],
                    &[ReturnType::OBJECT, ReturnType::STRING, ReturnType::OBJECT],
                )
            },
        ),
        ExpressionEvaluator::new(
            ExpressionType::SetProperty.as_ref(),
            apply_with_error(set_property, None),
            ReturnType::OBJECT,
            |e| {
                validate_order(
                    e,
                    &[],
                    &[ReturnType::OBJECT, ReturnType::STRING, ReturnType::OBJECT],
                )
            },
        ),
        ExpressionEvaluator::new(
            ExpressionType::RemoveProperty.as_ref(),
            apply_with_error(remove_property, None),
            ReturnType::OBJECT,
            |e| validate_order(e, &[], &[ReturnType::OBJECT, ReturnType::STRING]),
        ),
        ExpressionEvaluator::new(
            ExpressionType::Coalesce.as_ref(),
            apply(coalesce, None),
            ReturnType::OBJECT,
            validate_at_least_one,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Merge.as_ref(),
            apply_with_error(merge, None),
            ReturnType::OBJECT,
            |e| validate_arity_and_any_type(e, 2, usize::MAX, ReturnType::OBJECT),
        ),
        ExpressionEvaluator::new(
            ExpressionType::JPath.as_ref(),
            apply_with_error(json_path, None),
            ReturnType::OBJECT,
            |e| validate_order(e, &[], &[ReturnType::OBJECT, ReturnType::STRING]),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn json(text: &str) -> Value {
        Value::from_json_str(text).unwrap()
    }

    #[test]
    fn test_property_updates() {
        let base = json(r#"{"a": 1}"#);
        assert_eq!(
            add_property(&[base.clone(), Value::from("b"), Value::Integer(2)]).unwrap(),
            json(r#"{"a": 1, "b": 2}"#)
        );
        assert!(add_property(&[base.clone(), Value::from("a"), Value::Integer(2)]).is_err());
        assert_eq!(
            set_property(&[base.clone(), Value::from("a"), Value::Integer(3)]).unwrap(),
            json(r#"{"a": 3}"#)
        );
        assert_eq!(
            remove_property(&[base, Value::from("a")]).unwrap(),
            json("{}")
        );
    }

    #[test]
    fn test_merge_is_deep() {
        let merged = merge(&[
            json(r#"{"a": {"x": 1}, "list": [1]}"#),
            json(r#"{"a": {"y": 2}, "list": [2]}"#),
        ])
        .unwrap();
        assert_eq!(merged, json(r#"{"a": {"x": 1, "y": 2}, "list": [2]}"#));
        assert!(merge(&[json("{}"), Value::Integer(1)]).is_err());
    }

    #[test]
    fn test_coalesce_and_json_path() {
        assert_eq!(
            coalesce(&[Value::Null, Value::from("b"), Value::from("c")]),
            Value::from("b")
        );
        assert_eq!(coalesce(&[Value::Null]), Value::Null);
        assert_eq!(
            json_path(&[Value::from(r#"{"a": [{"b": 1}, {"b": 2}]}"#), Value::from("$.a[*].b")])
                .unwrap(),
            json("[1, 2]")
        );
    }
}
