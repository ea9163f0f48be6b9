use regex::{NoExpand, RegexBuilder};

use super::utils::*;
use crate::{
    config::Options,
    error::{Error, ExpressionResult},
    expression::{Expression, ExpressionEvaluator, ExpressionType, ReturnType},
    memory::Memory,
    value::Value,
};

fn concat(args: &[Value]) -> Value {
    if !args.is_empty() && args.iter().all(|arg| matches!(arg, Value::List(_))) {
        return Value::List(
            args.iter()
                .filter_map(Value::as_list)
                .flat_map(|items| items.iter().cloned())
                .collect(),
        );
    }
    Value::String(
        args.iter()
            .map(|arg| if arg.is_null() { String::new() } else { arg.to_string() })
            .collect(),
    )
}

fn replace(args: &[Value], ignore_case: bool) -> ExpressionResult<Value> {
    let text = parse_string_or_null(&args[0]);
    let old = parse_string_or_null(&args[1]);
    let new = parse_string_or_null(&args[2]);
    if old.is_empty() {
        return Err(Error::evaluation(format!(
            "{} the oldValue in replace function should be a string with at least length 1.",
            args[1]
        )));
    }
    if !ignore_case {
        return Ok(Value::String(text.replace(&old, &new)));
    }
    let pattern = RegexBuilder::new(&regex::escape(&old))
        .case_insensitive(true)
        .build()
        .map_err(|e| Error::evaluation(e.to_string()))?;
    Ok(Value::String(
        pattern.replace_all(&text, NoExpand(&new)).into_owned(),
    ))
}

fn split(args: &[Value]) -> Value {
    let text = parse_string_or_null(&args[0]);
    let separator = args.get(1).map(parse_string_or_null).unwrap_or_default();
    let parts: Vec<Value> = if separator.is_empty() {
        text.chars().map(|c| Value::String(c.to_string())).collect()
    } else {
        text.split(separator.as_str()).map(Value::from).collect()
    };
    Value::List(parts)
}

fn substring(args: &[Value]) -> ExpressionResult<Value> {
    let chars: Vec<char> = parse_string_or_null(&args[0]).chars().collect();
    if args[0].is_null() {
        return Ok(Value::String(String::new()));
    }
    let start = args[1]
        .as_i64()
        .ok_or_else(|| Error::evaluation(format!("{} is not an integer.", args[1])))?;
    if start < 0 || start as usize > chars.len() {
        return Err(Error::evaluation(format!(
            "{} is not in the range of the string",
            start
        )));
    }
    let start = start as usize;
    let length = match args.get(2) {
        None => chars.len() - start,
        Some(value) => {
            let length = value
                .as_i64()
                .ok_or_else(|| Error::evaluation(format!("{} is not an integer.", value)))?;
            if length < 0 || start + length as usize > chars.len() {
                return Err(Error::evaluation(format!(
                    "{} is not a valid length for a substring starting at {}",
                    length, start
                )));
            }
            length as usize
        }
    };
    Ok(Value::String(chars[start..start + length].iter().collect()))
}

fn add_ordinal(args: &[Value]) -> ExpressionResult<Value> {
    let number = parse_int32(&args[0]).map_err(Error::evaluation)?;
    if number <= 0 {
        return Ok(Value::String(number.to_string()));
    }
    let suffix = match (number % 100, number % 10) {
        (11..=13, _) => "th",
        (_, 1) => "st",
        (_, 2) => "nd",
        (_, 3) => "rd",
        _ => "th",
    };
    Ok(Value::String(format!("{}{}", number, suffix)))
}

fn index_of(args: &[Value], last: bool) -> ExpressionResult<Value> {
    match &args[0] {
        Value::Null | Value::String(_) => {
            if !matches!(args[1], Value::Null | Value::String(_)) {
                return Err(Error::evaluation(format!(
                    "{} should be a string.",
                    args[1]
                )));
            }
            let text: Vec<char> = parse_string_or_null(&args[0]).chars().collect();
            let search: Vec<char> = parse_string_or_null(&args[1]).chars().collect();
            if args[0].is_null() {
                return Ok(Value::Integer(-1));
            }
            if search.is_empty() {
                let index = if last { text.len().saturating_sub(1) } else { 0 };
                return Ok(Value::from(index));
            }
            let mut positions = text
                .windows(search.len())
                .enumerate()
                .filter(|(_, window)| *window == search.as_slice())
                .map(|(i, _)| i);
            let found = if last { positions.last() } else { positions.next() };
            Ok(found.map(Value::from).unwrap_or(Value::Integer(-1)))
        }
        Value::List(items) => {
            let mut positions = items
                .iter()
                .enumerate()
                .filter(|(_, item)| item.values_equal(&args[1]))
                .map(|(i, _)| i);
            let found = if last { positions.last() } else { positions.next() };
            Ok(found.map(Value::from).unwrap_or(Value::Integer(-1)))
        }
        other => Err(Error::evaluation(format!(
            "{} should be a string or a list.",
            other
        ))),
    }
}

fn sentence_case(args: &[Value]) -> Value {
    let text = parse_string_or_null(&args[0]);
    let mut chars = text.chars();
    Value::String(match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
        None => String::new(),
    })
}

fn title_case(args: &[Value]) -> Value {
    let text = parse_string_or_null(&args[0]).to_lowercase();
    let mut result = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if at_word_start && c.is_alphanumeric() {
            result.extend(c.to_uppercase());
        } else {
            result.push(c);
        }
        at_word_start = c.is_whitespace();
    }
    Value::String(result)
}

/// Rejects a locale argument that is not a string.
fn verify_locale(args: &[Value], position: usize) -> ExpressionResult<()> {
    match args.get(position) {
        None | Some(Value::String(_)) => Ok(()),
        Some(other) => Err(Error::evaluation(format!(
            "{} should be a locale string.",
            other
        ))),
    }
}

fn with_locale<F>(function: F) -> impl Fn(&[Value], &Options) -> ExpressionResult<Value> + Send + Sync + 'static
where
    F: Fn(&[Value]) -> Value + Send + Sync + 'static,
{
    move |args: &[Value], _: &Options| {
        verify_locale(args, 1)?;
        if !matches!(args[0], Value::Null | Value::String(_)) {
            return Err(Error::evaluation(format!(
                "{} is neither a string nor a null object.",
                args[0]
            )));
        }
        Ok(function(args))
    }
}

/// Evaluates `'${x}'` to the value of `x` and anything else to its
/// interpolated string.
fn string_or_value(
    expression: &Expression,
    memory: &mut dyn Memory,
    options: &Options,
) -> ExpressionResult<Value> {
    let args = evaluate_children(expression, memory, options, Some(verify_string))?;
    let text = parse_string_or_null(&args[0]).replace('`', "\\`");
    let template = Expression::parse(&format!("`{}`", text))?;
    let single = template.is(ExpressionType::Concat) && template.children.len() == 1;
    if single {
        template.children[0].try_evaluate(memory, options)
    } else {
        template.try_evaluate(memory, options)
    }
}

fn string_unary(f: fn(&str) -> Value) -> impl Fn(&[Value]) -> Value + Send + Sync + 'static {
    move |args: &[Value]| f(&parse_string_or_null(&args[0]))
}

pub(super) fn evaluators() -> Vec<ExpressionEvaluator> {
    let string = ReturnType::STRING;
    vec![
        ExpressionEvaluator::new(
            ExpressionType::Concat.as_ref(),
            apply(concat, None),
            ReturnType::STRING | ReturnType::ARRAY,
            validate_at_least_one,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Length.as_ref(),
            apply(
                string_unary(|s| Value::from(s.chars().count())),
                Some(verify_string_or_null),
            ),
            ReturnType::NUMBER,
            validate_unary_string,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Replace.as_ref(),
            apply_with_error(|args| replace(args, false), Some(verify_string_or_null)),
            ReturnType::STRING,
            move |e| validate_arity_and_any_type(e, 3, 3, string),
        ),
        ExpressionEvaluator::new(
            ExpressionType::ReplaceIgnoreCase.as_ref(),
            apply_with_error(|args| replace(args, true), Some(verify_string_or_null)),
            ReturnType::STRING,
            move |e| validate_arity_and_any_type(e, 3, 3, string),
        ),
        ExpressionEvaluator::new(
            ExpressionType::Split.as_ref(),
            apply(split, Some(verify_string_or_null)),
            ReturnType::ARRAY,
            move |e| validate_arity_and_any_type(e, 1, 2, string),
        ),
        ExpressionEvaluator::new(
            ExpressionType::Substring.as_ref(),
            apply_with_error(substring, None),
            ReturnType::STRING,
            |e| {
                validate_order(
                    e,
                    &[ReturnType::NUMBER],
                    &[ReturnType::STRING, ReturnType::NUMBER],
                )
            },
        ),
        ExpressionEvaluator::new(
            ExpressionType::ToLower.as_ref(),
            apply_with_options_and_error(
                with_locale(string_unary(|s| Value::String(s.to_lowercase()))),
                None,
            ),
            ReturnType::STRING,
            |e| validate_order(e, &[ReturnType::STRING], &[ReturnType::STRING]),
        ),
        ExpressionEvaluator::new(
            ExpressionType::ToUpper.as_ref(),
            apply_with_options_and_error(
                with_locale(string_unary(|s| Value::String(s.to_uppercase()))),
                None,
            ),
            ReturnType::STRING,
            |e| validate_order(e, &[ReturnType::STRING], &[ReturnType::STRING]),
        ),
        ExpressionEvaluator::new(
            ExpressionType::Trim.as_ref(),
            apply(
                string_unary(|s| Value::from(s.trim())),
                Some(verify_string_or_null),
            ),
            ReturnType::STRING,
            validate_unary_string,
        ),
        ExpressionEvaluator::new(
            ExpressionType::StartsWith.as_ref(),
            apply(
                |args| {
                    Value::Boolean(
                        parse_string_or_null(&args[0])
                            .starts_with(&parse_string_or_null(&args[1])),
                    )
                },
                Some(verify_string_or_null),
            ),
            ReturnType::BOOLEAN,
            move |e| validate_arity_and_any_type(e, 2, 2, string),
        ),
        ExpressionEvaluator::new(
            ExpressionType::EndsWith.as_ref(),
            apply(
                |args| {
                    Value::Boolean(
                        parse_string_or_null(&args[0]).ends_with(&parse_string_or_null(&args[1])),
                    )
                },
                Some(verify_string_or_null),
            ),
            ReturnType::BOOLEAN,
            move |e| validate_arity_and_any_type(e, 2, 2, string),
        ),
        ExpressionEvaluator::new(
            ExpressionType::CountWord.as_ref(),
            apply(
                string_unary(|s| Value::from(s.split_whitespace().count())),
                Some(verify_string_or_null),
            ),
            ReturnType::NUMBER,
            validate_unary_string,
        ),
        ExpressionEvaluator::new(
            ExpressionType::AddOrdinal.as_ref(),
            apply_with_error(add_ordinal, Some(verify_integer)),
            ReturnType::STRING,
            |e| validate_arity_and_any_type(e, 1, 1, ReturnType::NUMBER),
        ),
        ExpressionEvaluator::new(
            ExpressionType::NewGuid.as_ref(),
            apply(|_| Value::String(uuid::Uuid::new_v4().to_string()), None),
            ReturnType::STRING,
            validate_no_arguments,
        ),
        ExpressionEvaluator::new(
            ExpressionType::IndexOf.as_ref(),
            apply_with_error(|args| index_of(args, false), None),
            ReturnType::NUMBER,
            validate_binary,
        ),
        ExpressionEvaluator::new(
            ExpressionType::LastIndexOf.as_ref(),
            apply_with_error(|args| index_of(args, true), None),
            ReturnType::NUMBER,
            validate_binary,
        ),
        ExpressionEvaluator::new(
            ExpressionType::Eol.as_ref(),
            apply(|_| Value::from("\n"), None),
            ReturnType::STRING,
            validate_no_arguments,
        ),
        ExpressionEvaluator::new(
            ExpressionType::SentenceCase.as_ref(),
            apply_with_options_and_error(with_locale(sentence_case), None),
            ReturnType::STRING,
            |e| validate_order(e, &[ReturnType::STRING], &[ReturnType::STRING]),
        ),
        ExpressionEvaluator::new(
            ExpressionType::TitleCase.as_ref(),
            apply_with_options_and_error(with_locale(title_case), None),
            ReturnType::STRING,
            |e| validate_order(e, &[ReturnType::STRING], &[ReturnType::STRING]),
        ),
        ExpressionEvaluator::new(
            ExpressionType::StringOrValue.as_ref(),
            string_or_value,
            ReturnType::OBJECT,
            validate_unary_string,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> Value {
        Value::from(text)
    }

    #[test]
    fn test_concat() {
        assert_eq!(concat(&[s("a"), Value::Null, Value::Float(1.0)]), s("a1"));
        assert_eq!(
            concat(&[
                Value::List(vec![Value::Integer(1)]),
                Value::List(vec![Value::Integer(2)])
            ]),
            Value::List(vec![Value::Integer(1), Value::Integer(2)])
        );
    }

    #[test]
    fn test_replace_ignore_case_is_literal() {
        assert_eq!(
            replace(&[s("a.b.A"), s("a"), s("$1")], true).unwrap(),
            s("$1.b.$1")
        );
        assert!(replace(&[s("hi"), s(""), s("x")], false).is_err());
    }

    #[test]
    fn test_split() {
        assert_eq!(split(&[s(""), s("")]), Value::List(vec![]));
        assert_eq!(split(&[Value::Null, s("e")]), Value::List(vec![s("")]));
        assert_eq!(
            split(&[s("hello"), s("l")]),
            Value::List(vec![s("he"), s(""), s("o")])
        );
    }

    #[test]
    fn test_substring_bounds() {
        assert_eq!(
            substring(&[s("hello"), Value::Integer(1), Value::Integer(3)]).unwrap(),
            s("ell")
        );
        assert!(substring(&[s("hello"), Value::Integer(10)]).is_err());
        assert!(substring(&[s("hello"), Value::Integer(0), Value::Integer(10)]).is_err());
    }

    #[test]
    fn test_add_ordinal() {
        let ordinal = |n: i64| add_ordinal(&[Value::Integer(n)]).unwrap();
        assert_eq!(ordinal(1), s("1st"));
        assert_eq!(ordinal(12), s("12th"));
        assert_eq!(ordinal(22), s("22nd"));
        assert_eq!(ordinal(113), s("113th"));
        assert_eq!(ordinal(0), s("0"));
    }

    #[test]
    fn test_cases() {
        assert_eq!(sentence_case(&[s("aBC dEF")]), s("Abc def"));
        assert_eq!(title_case(&[s("aBC dEF")]), s("Abc Def"));
        assert_eq!(title_case(&[Value::Null]), s(""));
    }
}
