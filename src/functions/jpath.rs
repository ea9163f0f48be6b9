//! A small JSONPath dialect for `jPath`.
//!
//! Supported: `$`, `.name`, `['name']`, `[n]` (negative from the end), `*`,
//! recursive descent `..` and filters of the form `[?(@.a.b op literal)]` or
//! `[?(@.a)]`.

use std::cmp::Ordering;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1, multispace0},
    combinator::{all_consuming, map, map_res, opt, recognize, value},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

use super::comparison::compare;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
enum Selector {
    Names(Vec<String>),
    Wildcard,
    Index(i64),
    Filter(Filter),
}

#[derive(Debug, Clone, PartialEq)]
struct Step {
    recursive: bool,
    selector: Selector,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FilterOp {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

#[derive(Debug, Clone, PartialEq)]
struct Filter {
    path: Vec<String>,
    comparison: Option<(FilterOp, Value)>,
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '$' || c == '@'
}

fn name(input: &str) -> IResult<&str, String> {
    map(take_while1(is_name_char), String::from)(input)
}

fn quoted(input: &str) -> IResult<&str, String> {
    map(
        alt((
            delimited(char('\''), take_while(|c: char| c != '\''), char('\'')),
            delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
        )),
        String::from,
    )(input)
}

fn integer(input: &str) -> IResult<&str, i64> {
    map_res(recognize(pair(opt(char('-')), digit1)), str::parse::<i64>)(input)
}

fn literal(input: &str) -> IResult<&str, Value> {
    alt((
        map(quoted, Value::String),
        value(Value::Boolean(true), tag("true")),
        value(Value::Boolean(false), tag("false")),
        value(Value::Null, tag("null")),
        map_res(
            recognize(tuple((opt(char('-')), digit1, opt(pair(char('.'), digit1))))),
            |text: &str| -> Result<Value, std::num::ParseFloatError> {
                match text.parse::<i64>() {
                    Ok(i) => Ok(Value::Integer(i)),
                    Err(_) => text.parse::<f64>().map(Value::Float),
                }
            },
        ),
    ))(input)
}

fn filter_op(input: &str) -> IResult<&str, FilterOp> {
    alt((
        value(FilterOp::Equal, tag("==")),
        value(FilterOp::NotEqual, tag("!=")),
        value(FilterOp::LessEqual, tag("<=")),
        value(FilterOp::GreaterEqual, tag(">=")),
        value(FilterOp::Less, tag("<")),
        value(FilterOp::Greater, tag(">")),
    ))(input)
}

fn filter(input: &str) -> IResult<&str, Filter> {
    let (input, _) = tuple((tag("?("), multispace0, char('@')))(input)?;
    let (input, path) = many0(alt((preceded(char('.'), name), delimited(char('['), quoted, char(']')))))(input)?;
    let (input, comparison) = opt(pair(
        delimited(multispace0, filter_op, multispace0),
        literal,
    ))(input)?;
    let (input, _) = pair(multispace0, char(')'))(input)?;
    Ok((input, Filter { path, comparison }))
}

fn bracket(input: &str) -> IResult<&str, Selector> {
    delimited(
        pair(char('['), multispace0),
        alt((
            value(Selector::Wildcard, char('*')),
            map(filter, Selector::Filter),
            map(integer, Selector::Index),
            map(
                separated_list1(delimited(multispace0, char(','), multispace0), quoted),
                Selector::Names,
            ),
        )),
        pair(multispace0, char(']')),
    )(input)
}

fn dotted(input: &str) -> IResult<&str, Selector> {
    alt((
        value(Selector::Wildcard, char('*')),
        map(name, |n| Selector::Names(vec![n])),
    ))(input)
}

fn step(input: &str) -> IResult<&str, Step> {
    alt((
        map(preceded(tag(".."), alt((bracket, dotted))), |selector| Step {
            recursive: true,
            selector,
        }),
        map(preceded(char('.'), dotted), |selector| Step {
            recursive: false,
            selector,
        }),
        map(bracket, |selector| Step {
            recursive: false,
            selector,
        }),
    ))(input)
}

fn steps(input: &str) -> IResult<&str, Vec<Step>> {
    let (input, root) = opt(char('$'))(input)?;
    let (input, first) = match root {
        Some(_) => (input, None),
        None => map(opt(dotted), |s| {
            s.map(|selector| Step {
                recursive: false,
                selector,
            })
        })(input)?,
    };
    let (input, mut rest) = many0(step)(input)?;
    if let Some(first) = first {
        rest.insert(0, first);
    }
    Ok((input, rest))
}

fn parse(path: &str) -> Result<Vec<Step>, String> {
    all_consuming(steps)(path.trim())
        .map(|(_, steps)| steps)
        .map_err(|e| format!("{} is not a valid path: {}", path, e))
}

fn descendants<'v>(node: &'v Value, out: &mut Vec<&'v Value>) {
    out.push(node);
    match node {
        Value::Object(map) => map.values().for_each(|child| descendants(child, out)),
        Value::List(items) => items.iter().for_each(|child| descendants(child, out)),
        _ => {}
    }
}

fn children(node: &Value) -> Vec<&Value> {
    match node {
        Value::Object(map) => map.values().collect(),
        Value::List(items) => items.iter().collect(),
        _ => Vec::new(),
    }
}

impl Filter {
    fn accepts(&self, item: &Value) -> bool {
        let mut current = item;
        for key in &self.path {
            match current.as_object().and_then(|map| map.get(key)) {
                Some(next) => current = next,
                None => return false,
            }
        }
        let Some((op, expected)) = &self.comparison else {
            return true;
        };
        match op {
            FilterOp::Equal => current.values_equal(expected),
            FilterOp::NotEqual => !current.values_equal(expected),
            _ => match compare(current, expected) {
                Ok(ordering) => match op {
                    FilterOp::Less => ordering == Ordering::Less,
                    FilterOp::LessEqual => ordering != Ordering::Greater,
                    FilterOp::Greater => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                },
                Err(_) => false,
            },
        }
    }
}

impl Selector {
    fn select<'v>(&self, node: &'v Value, out: &mut Vec<&'v Value>) {
        match (self, node) {
            (Selector::Names(names), Value::Object(map)) => {
                out.extend(names.iter().filter_map(|name| map.get(name)))
            }
            (Selector::Wildcard, _) => out.extend(children(node)),
            (Selector::Index(index), Value::List(items)) => {
                let position = if *index < 0 {
                    items.len() as i64 + index
                } else {
                    *index
                };
                if let Some(item) = usize::try_from(position).ok().and_then(|i| items.get(i)) {
                    out.push(item);
                }
            }
            (Selector::Filter(filter), _) => out.extend(
                children(node)
                    .into_iter()
                    .filter(|child| filter.accepts(child)),
            ),
            _ => {}
        }
    }
}

/// Selects every node matched by `path` below `root`.
pub fn select(root: &Value, path: &str) -> Result<Vec<Value>, String> {
    let steps = parse(path)?;
    let mut current = vec![root];
    for step in &steps {
        let mut next = Vec::new();
        for node in current {
            if step.recursive {
                let mut nodes = Vec::new();
                descendants(node, &mut nodes);
                for descendant in nodes {
                    step.selector.select(descendant, &mut next);
                }
            } else {
                step.selector.select(node, &mut next);
            }
        }
        current = next;
    }
    Ok(current.into_iter().cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store() -> Value {
        Value::from_json_str(
            r#"{
                "Stores": ["Lambton Quay", "Willis Street"],
                "Manufacturers": [
                    {"Name": "Acme Co", "Products": [{"Name": "Anvil", "Price": 50}]},
                    {"Name": "Contoso", "Products": [
                        {"Name": "Elbow Grease", "Price": 99.95},
                        {"Name": "Headlight Fluid", "Price": 4}
                    ]}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_dotted_and_indexed() {
        assert_eq!(
            select(&store(), "$.Stores[1]").unwrap(),
            vec![Value::from("Willis Street")]
        );
        assert_eq!(
            select(&store(), "Manufacturers[-1]['Name']").unwrap(),
            vec![Value::from("Contoso")]
        );
    }

    #[test]
    fn test_recursive_descent_and_filters() {
        assert_eq!(
            select(&store(), "$..Products[?(@.Price >= 50)].Name").unwrap(),
            vec![Value::from("Anvil"), Value::from("Elbow Grease")]
        );
        assert_eq!(
            select(&store(), "$.Manufacturers[?(@.Name == 'Acme Co')].Products[0].Price").unwrap(),
            vec![Value::Integer(50)]
        );
        assert_eq!(select(&store(), "$.Stores[*]").unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_path() {
        assert!(select(&store(), "$.Stores[").is_err());
        assert!(select(&store(), "$.missing").unwrap().is_empty());
    }
}
