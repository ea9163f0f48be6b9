use std::fmt;

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, digit1},
    combinator::{all_consuming, map, map_res},
    error::{Error as NomError, ErrorKind},
    multi::many0,
    sequence::{delimited, preceded},
    IResult,
};

use super::{Memory, MemoryError};
use crate::{
    config::Options,
    error::{Error, ExpressionResult},
    expression::{Expression, ExpressionType},
    value::Value,
};

/// One step of a memory path.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(index) => write!(f, "[{}]", index),
        }
    }
}

fn parse_key(input: &str) -> IResult<&str, PathSegment> {
    map(
        take_while1(|c: char| c != '.' && c != '[' && c != ']'),
        |key: &str| PathSegment::Key(key.to_string()),
    )(input)
}

/// A `'…'` or `"…"` key. A backslash makes the next character literal.
fn parse_quoted(input: &str) -> IResult<&str, PathSegment> {
    let mut chars = input.char_indices();
    let quote = match chars.next() {
        Some((_, c)) if c == '\'' || c == '"' => c,
        _ => return Err(nom::Err::Error(NomError::new(input, ErrorKind::Char))),
    };
    let mut key = String::new();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, escaped)) => key.push(escaped),
                None => break,
            },
            c if c == quote => return Ok((&input[i + 1..], PathSegment::Key(key))),
            c => key.push(c),
        }
    }
    Err(nom::Err::Error(NomError::new(input, ErrorKind::Char)))
}

/// Renders a key as a bracketed segment that [`parse_path`] reads back.
pub fn quote_key(key: &str) -> String {
    format!("['{}']", key.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn parse_index(input: &str) -> IResult<&str, PathSegment> {
    delimited(
        char('['),
        alt((
            map_res(digit1, |digits: &str| {
                digits.parse::<usize>().map(PathSegment::Index)
            }),
            parse_quoted,
        )),
        char(']'),
    )(input)
}

fn parse_segments(input: &str) -> IResult<&str, Vec<PathSegment>> {
    let (input, first) = alt((parse_index, parse_key))(input)?;
    let (input, rest) = many0(alt((preceded(char('.'), parse_key), parse_index)))(input)?;
    let mut segments = Vec::with_capacity(rest.len() + 1);
    segments.push(first);
    segments.extend(rest);
    Ok((input, segments))
}

/// Splits `a.b[0]['c.d']` into `[Key(a), Key(b), Index(0), Key(c.d)]`.
pub fn parse_path(path: &str) -> Result<Vec<PathSegment>, MemoryError> {
    if path.is_empty() {
        return Ok(Vec::new());
    }
    all_consuming(parse_segments)(path)
        .map(|(_, segments)| segments)
        .map_err(|e| MemoryError::InvalidPath {
            path: path.to_string(),
            message: e.to_string(),
        })
}

/// Folds an `Accessor`/`Element` chain into a single memory path.
///
/// Element indices are evaluated, so `a[f].b[n].z` with `f = 'foo'` and `n = 2`
/// yields `a['foo'].b[2].z`. The second result is the part of the chain that is
/// not a path (for example a function call the chain hangs off), if any.
pub fn try_accumulate_path<'e>(
    expression: &'e Expression,
    memory: &mut dyn Memory,
    options: &Options,
) -> ExpressionResult<(Option<String>, Option<&'e Expression>)> {
    let mut parts: Vec<String> = Vec::new();
    let mut left = Some(expression);

    while let Some(current) = left {
        if current.is(ExpressionType::Accessor) {
            let name = current.children[0]
                .value
                .as_ref()
                .and_then(Value::as_str)
                .ok_or_else(|| Error::evaluation(format!("{} is not a valid accessor", current)))?;
            parts.push(name.to_string());
            left = current.children.get(1);
        } else if current.is(ExpressionType::Element) {
            let index = current.children[1].try_evaluate(memory, options)?;
            match index {
                Value::Integer(i) if i >= 0 => parts.push(format!("[{}]", i)),
                Value::String(s) => parts.push(quote_key(&s)),
                _ => {
                    return Err(Error::evaluation(format!(
                        "{} doesn't return an int or string",
                        current.children[1]
                    )))
                }
            }
            left = current.children.first();
        } else {
            break;
        }
    }

    let mut path = String::new();
    for part in parts.iter().rev() {
        if !path.is_empty() && !part.starts_with('[') {
            path.push('.');
        }
        path.push_str(part);
    }

    Ok(((!path.is_empty()).then_some(path), left))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::SimpleObjectMemory;

    #[test]
    fn test_parse_path() {
        assert_eq!(
            parse_path("a.b[0]['c.d'].e").unwrap(),
            vec![
                PathSegment::Key("a".to_string()),
                PathSegment::Key("b".to_string()),
                PathSegment::Index(0),
                PathSegment::Key("c.d".to_string()),
                PathSegment::Key("e".to_string()),
            ]
        );
        assert_eq!(
            parse_path("$index").unwrap(),
            vec![PathSegment::Key("$index".to_string())]
        );
        assert_eq!(
            parse_path("[1][\"x\"]").unwrap(),
            vec![PathSegment::Index(1), PathSegment::Key("x".to_string())]
        );
        assert!(parse_path("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_path_errors() {
        assert!(parse_path("a..b").is_err());
        assert!(parse_path("a[-1]").is_err());
        assert!(parse_path("a[0").is_err());
    }

    #[test]
    fn test_accumulate_path() {
        let mut memory = SimpleObjectMemory::new(
            Value::from_json_str(r#"{"f": "foo", "n": 2}"#).unwrap(),
        );
        let options = Options::new();

        let expression = Expression::parse("a[f].b[n].z").unwrap();
        let (path, left) = try_accumulate_path(&expression, &mut memory, &options).unwrap();
        assert_eq!(path.as_deref(), Some("a['foo'].b[2].z"));
        assert!(left.is_none());

        let expression = Expression::parse("json('{}').x.y").unwrap();
        let (path, left) = try_accumulate_path(&expression, &mut memory, &options).unwrap();
        assert_eq!(path.as_deref(), Some("x.y"));
        assert_eq!(left.map(|e| e.expr_type().to_string()).as_deref(), Some("json"));
    }

    #[test]
    fn test_quoted_keys_with_quotes() {
        assert_eq!(quote_key("it's"), r"['it\'s']");
        assert_eq!(
            parse_path(&format!("a{}.b", quote_key(r"it's a \ path"))).unwrap(),
            vec![
                PathSegment::Key("a".to_string()),
                PathSegment::Key(r"it's a \ path".to_string()),
                PathSegment::Key("b".to_string()),
            ]
        );
        assert_eq!(
            parse_path(r#"["say \"hi\""]"#).unwrap(),
            vec![PathSegment::Key(r#"say "hi""#.to_string())]
        );
    }

    #[test]
    fn test_accumulate_path_through_quoted_key() {
        let mut memory = SimpleObjectMemory::new(
            Value::from_json_str(r#"{"a": {"it's": {"b": 7}}}"#).unwrap(),
        );
        let expression = Expression::parse(r#"a["it's"].b"#).unwrap();
        let (path, _) = try_accumulate_path(&expression, &mut memory, &Options::new()).unwrap();
        assert_eq!(path.as_deref(), Some(r"a['it\'s'].b"));
        assert_eq!(
            expression.try_evaluate(&mut memory, &Options::new()).unwrap(),
            Value::Integer(7)
        );
    }

    #[test]
    fn test_accumulate_path_rejects_bad_index() {
        let mut memory = SimpleObjectMemory::new(Value::Null);
        let expression = Expression::parse("a[true]").unwrap();
        let err = try_accumulate_path(&expression, &mut memory, &Options::new()).unwrap_err();
        assert_eq!(err.to_string(), "true doesn't return an int or string");
    }
}
