use dashmap::DashMap;
use lazy_static::lazy_static;
use rand::{rngs::StdRng, Rng, SeedableRng};
use regex::Regex;

use super::utils::*;
use crate::{
    config::Options,
    error::{Error, ExpressionResult},
    expression::{ExpressionEvaluator, ExpressionType, ReturnType},
    value::Value,
};

lazy_static! {
    // patterns compiled by isMatch, keyed by source text
    static ref PATTERNS: DashMap<String, Regex> = DashMap::new();
}

fn compile(pattern: &str) -> ExpressionResult<Regex> {
    if let Some(regex) = PATTERNS.get(pattern) {
        return Ok(regex.clone());
    }
    let regex = Regex::new(pattern)
        .map_err(|e| Error::evaluation(format!("'{}' is not a valid regular expression: {}", pattern, e)))?;
    PATTERNS.insert(pattern.to_string(), regex.clone());
    Ok(regex)
}

fn is_match(args: &[Value]) -> ExpressionResult<Value> {
    let regex = compile(&parse_string_or_null(&args[1]))?;
    Ok(Value::Boolean(regex.is_match(&parse_string_or_null(&args[0]))))
}

/// Uniform integer in `[min, max)`. A configured seed makes the draw
/// reproducible.
fn random(args: &[Value], options: &Options) -> ExpressionResult<Value> {
    let min = parse_int32(&args[0]).map_err(Error::evaluation)?;
    let max = parse_int32(&args[1]).map_err(Error::evaluation)?;
    if min >= max {
        return Err(Error::evaluation(format!(
            "Min value {} cannot be greater than or equal to max value {}.",
            min, max
        )));
    }
    let value = match options.random_seed {
        Some(seed) => StdRng::seed_from_u64(seed).gen_range(min..max),
        None => rand::thread_rng().gen_range(min..max),
    };
    Ok(Value::Integer(value as i64))
}

pub(super) fn evaluators() -> Vec<ExpressionEvaluator> {
    vec![
        ExpressionEvaluator::new(
            ExpressionType::Rand.as_ref(),
            apply_with_options_and_error(random, Some(verify_integer)),
            ReturnType::NUMBER,
            validate_binary_number,
        ),
        ExpressionEvaluator::new(
            ExpressionType::IsMatch.as_ref(),
            apply_with_error(is_match, Some(verify_string_or_null)),
            ReturnType::BOOLEAN,
            |e| validate_arity_and_any_type(e, 2, 2, ReturnType::STRING),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_rand_is_reproducible() {
        let options = Options {
            random_seed: Some(7),
            ..Options::new()
        };
        let args = [Value::Integer(1), Value::Integer(100)];
        let first = random(&args, &options).unwrap();
        assert_eq!(random(&args, &options).unwrap(), first);
        let n = first.as_i64().unwrap();
        assert!((1..100).contains(&n));
    }

    #[test]
    fn test_rand_bounds() {
        assert!(random(&[Value::Integer(5), Value::Integer(5)], &Options::new()).is_err());
        assert_eq!(
            random(&[Value::Integer(0), Value::Integer(1)], &Options::new()).unwrap(),
            Value::Integer(0)
        );
    }

    #[test]
    fn test_is_match() {
        assert_eq!(
            is_match(&[Value::from("abc123"), Value::from(r"^[a-z]+\d+$")]).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            is_match(&[Value::Null, Value::from("^$")]).unwrap(),
            Value::Boolean(true)
        );
        assert!(is_match(&[Value::from("a"), Value::from("(")]).is_err());
    }
}
