//! # Binder
//!
//! Lowers the analyzer's [`Syntax`] tree into a bound [`Expression`], resolving
//! every function name to its evaluator.
//!
//! ```text
//! Source Text → Tokenizer → Preprocessor → Analyzer → Binder → Evaluator
//! ```
//!
//! Structural nodes (property access, indexing, constants, array and object
//! literals, templates) always bind to the standard evaluators. Function calls
//! and operators go through the lookup, which defaults to the global
//! [`FunctionTable`].

use std::sync::Arc;

use tracing::instrument;

use crate::{
    analyzer::parsers::parse_root,
    ast::{Syntax, UnaryOperator},
    error::{Error, ExpressionResult},
    expression::{EvaluatorLookup, Expression, ExpressionEvaluator, ExpressionType},
    functions::{builtin, FunctionTable},
    preprocessor::{Preprocessor, StringPreprocessor, TokenPreprocessor},
    tokenizer::{literal::StringPart, token::Tokenizer},
    value::Value,
};

pub struct ExpressionParser<'a> {
    lookup: Option<EvaluatorLookup<'a>>,
}

impl Default for ExpressionParser<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionParser<'static> {
    pub fn new() -> Self {
        Self { lookup: None }
    }
}

impl<'a> ExpressionParser<'a> {
    pub fn with_lookup(lookup: EvaluatorLookup<'a>) -> Self {
        Self {
            lookup: Some(lookup),
        }
    }

    /// Parses, binds and validates expression text.
    #[instrument(level = "debug", skip(self))]
    pub fn parse(&self, text: &str) -> ExpressionResult<Expression> {
        let expression = self.bind_text(text)?;
        expression.validate_tree()?;
        Ok(expression)
    }

    fn bind_text(&self, text: &str) -> ExpressionResult<Expression> {
        let text = StringPreprocessor::new().process(text);
        if text.is_empty() {
            return Ok(Expression::constant(""));
        }
        let spans = Tokenizer::new().tokenize(&text)?;
        let tokens = TokenPreprocessor::new().process(spans);
        let syntax = parse_root(&tokens)?;
        self.bind(&syntax)
    }

    fn resolve(&self, name: &str) -> ExpressionResult<Arc<ExpressionEvaluator>> {
        let found = match self.lookup {
            Some(lookup) => lookup(name),
            None => FunctionTable::global().lookup(name),
        };
        found.ok_or_else(|| {
            Error::validation(format!(
                "{} does not have an evaluator, it's not a built-in function or a custom function.",
                name
            ))
        })
    }

    fn call(&self, name: &str, children: Vec<Expression>) -> ExpressionResult<Expression> {
        Ok(Expression::new(self.resolve(name)?, children))
    }

    fn bind_all(&self, items: &[Syntax]) -> ExpressionResult<Vec<Expression>> {
        items.iter().map(|item| self.bind(item)).collect()
    }

    fn bind(&self, syntax: &Syntax) -> ExpressionResult<Expression> {
        match syntax {
            Syntax::String(s) => Ok(Expression::constant(s.as_str())),
            Syntax::Integer(i) => Ok(Expression::constant(*i)),
            Syntax::Float(f) => Ok(Expression::constant(*f)),
            Syntax::Identifier(name) => Ok(match name.to_ascii_lowercase().as_str() {
                "true" => Expression::constant(true),
                "false" => Expression::constant(false),
                "null" => Expression::constant(Value::Null),
                _ => Expression::accessor(name, None),
            }),
            Syntax::Unary { op, operand } => {
                let operand = self.bind(operand)?;
                match op {
                    UnaryOperator::Not => self.call(op.as_ref(), vec![operand]),
                    UnaryOperator::Minus | UnaryOperator::Plus => {
                        self.call(op.as_ref(), vec![Expression::constant(0), operand])
                    }
                }
            }
            Syntax::Binary { op, left, right } => {
                let children = vec![self.bind(left)?, self.bind(right)?];
                self.call(op.as_ref(), children)
            }
            Syntax::Member { instance, property } => {
                Ok(Expression::accessor(property, Some(self.bind(instance)?)))
            }
            Syntax::Index { instance, index } => Ok(Expression::new(
                builtin(ExpressionType::Element),
                vec![self.bind(instance)?, self.bind(index)?],
            )),
            Syntax::Call { name, args } => {
                let children = self.bind_all(args)?;
                self.call(name, children)
            }
            Syntax::Array(items) => Ok(Expression::new(
                builtin(ExpressionType::CreateArray),
                self.bind_all(items)?,
            )),
            Syntax::Object(entries) => {
                let mut object = Expression::new(
                    builtin(ExpressionType::Json),
                    vec![Expression::constant("{}")],
                );
                for (key, value) in entries {
                    object = Expression::new(
                        builtin(ExpressionType::SetProperty),
                        vec![object, Expression::constant(key.as_str()), self.bind(value)?],
                    );
                }
                Ok(object)
            }
            Syntax::Template(parts) => self.bind_template(parts),
        }
    }

    fn bind_template(&self, parts: &[StringPart]) -> ExpressionResult<Expression> {
        if parts.is_empty() {
            return Ok(Expression::constant(""));
        }
        let mut children = Vec::with_capacity(parts.len());
        for part in parts {
            children.push(match part {
                StringPart::Literal(text) => Expression::constant(text.as_str()),
                StringPart::Interpolation(source) => self.bind_text(source)?,
            });
        }
        Ok(Expression::new(builtin(ExpressionType::Concat), children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Options, memory::SimpleObjectMemory};
    use pretty_assertions::assert_eq;

    fn display(text: &str) -> String {
        ExpressionParser::new().parse(text).unwrap().to_string()
    }

    fn evaluate(text: &str) -> Value {
        let mut memory = SimpleObjectMemory::new(
            Value::from_json_str(r#"{"name": "Ada", "n": 3}"#).unwrap(),
        );
        ExpressionParser::new()
            .parse(text)
            .unwrap()
            .try_evaluate(&mut memory, &Options::new())
            .unwrap()
    }

    #[test]
    fn test_operators_bind_to_functions() {
        assert_eq!(display("1 + 2 * 3"), "(1 + (2 * 3))");
        assert_eq!(display("!a"), "!(a)");
        assert_eq!(display("-n"), "(0 - n)");
        assert_eq!(display("a & b"), "concat(a, b)");
        assert_eq!(display("add(1, 2)"), "(1 + 2)");
    }

    #[test]
    fn test_constants() {
        assert_eq!(evaluate("TRUE"), Value::Boolean(true));
        assert_eq!(evaluate("Null"), Value::Null);
        assert_eq!(evaluate("=  n"), Value::Integer(3));
        assert_eq!(evaluate("   "), Value::from(""));
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            evaluate("[1, n, 'x']"),
            Value::from_json_str(r#"[1, 3, "x"]"#).unwrap()
        );
        assert_eq!(
            evaluate("{a: n, 'b c': [1]}"),
            Value::from_json_str(r#"{"a": 3, "b c": [1]}"#).unwrap()
        );
        assert_eq!(evaluate("`hi ${name}, ${n + 1}`"), Value::from("hi Ada, 4"));
        assert_eq!(evaluate("``"), Value::from(""));
    }

    #[test]
    fn test_unknown_function() {
        let err = ExpressionParser::new().parse("nope(1)").unwrap_err();
        assert_eq!(
            err.to_string(),
            "nope does not have an evaluator, it's not a built-in function or a custom function."
        );
    }

    #[test]
    fn test_tree_is_validated() {
        assert!(ExpressionParser::new().parse("length(1, 2)").is_err());
        assert!(ExpressionParser::new().parse("concat(sqrt(), 1)").is_err());
    }

    #[test]
    fn test_custom_lookup() {
        let lookup = |name: &str| {
            if name == "twice" {
                FunctionTable::global().lookup("+")
            } else {
                FunctionTable::global().lookup(name)
            }
        };
        let expression = ExpressionParser::with_lookup(&lookup)
            .parse("twice(2, 2)")
            .unwrap();
        assert_eq!(expression.to_string(), "(2 + 2)");
    }
}
