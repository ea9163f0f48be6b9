//! # Bound Expressions
//!
//! An [`Expression`] is a tree of builtin or custom functions, each node
//! carrying the [`ExpressionEvaluator`] that validates and evaluates it.
//! Trees are produced by the binder in [`crate::parser`] or assembled directly
//! with the constructors here.
//!
//! ## Memory Paths
//!
//! Property access is modelled by two builtins:
//!
//! * `Accessor(Constant(name), instance?)` reads `name` from `instance`, or from
//!   memory when there is no instance.
//! * `Element(instance, index)` indexes a list or object.
//!
//! ## Usage Example
//!
//! ```rust
//! use adaptive_expressions::{Expression, Options, SimpleObjectMemory, Value};
//!
//! let expression = Expression::parse("user.age + 1").unwrap();
//! let mut memory = SimpleObjectMemory::new(
//!     Value::from_json_str(r#"{"user": {"age": 41}}"#).unwrap(),
//! );
//! let value = expression.try_evaluate(&mut memory, &Options::new()).unwrap();
//! assert_eq!(value, Value::Integer(42));
//! assert_eq!(expression.references(), vec!["user.age".to_string()]);
//! ```

pub mod evaluator;
pub mod expression_type;
pub mod return_type;

pub use evaluator::{EvaluateFn, ExpressionEvaluator, ValidateFn};
pub use expression_type::ExpressionType;
pub use return_type::ReturnType;

use std::{fmt, sync::Arc};

use serde::de::DeserializeOwned;

use crate::{
    config::Options,
    error::{Error, ExpressionResult},
    functions::{builtin, FunctionTable},
    memory::Memory,
    parser::ExpressionParser,
    value::Value,
};

/// Resolves a function name to its evaluator while binding.
pub type EvaluatorLookup<'a> = &'a dyn Fn(&str) -> Option<Arc<ExpressionEvaluator>>;

#[derive(Clone)]
pub struct Expression {
    pub evaluator: Arc<ExpressionEvaluator>,
    pub children: Vec<Expression>,
    /// Set only on constants.
    pub value: Option<Value>,
}

impl Expression {
    /// Builds a node without validating it.
    pub fn new(evaluator: Arc<ExpressionEvaluator>, children: Vec<Expression>) -> Self {
        Self {
            evaluator,
            children,
            value: None,
        }
    }

    /// Parses expression text using the global function table.
    pub fn parse(text: &str) -> ExpressionResult<Expression> {
        ExpressionParser::new().parse(text)
    }

    /// Parses expression text, resolving functions through `lookup`.
    pub fn parse_with_lookup(text: &str, lookup: EvaluatorLookup) -> ExpressionResult<Expression> {
        ExpressionParser::with_lookup(lookup).parse(text)
    }

    /// Creates and validates a node for a builtin or registered custom function.
    pub fn make_expression(
        expr_type: &str,
        children: Vec<Expression>,
    ) -> ExpressionResult<Expression> {
        let evaluator = FunctionTable::global().lookup(expr_type).ok_or_else(|| {
            Error::validation(format!(
                "{} does not have an evaluator, it's not a built-in function or a custom function.",
                expr_type
            ))
        })?;
        Self::make_with_evaluator(evaluator, children)
    }

    pub fn make_with_evaluator(
        evaluator: Arc<ExpressionEvaluator>,
        children: Vec<Expression>,
    ) -> ExpressionResult<Expression> {
        let expression = Expression::new(evaluator, children);
        expression.validate()?;
        Ok(expression)
    }

    pub fn constant<V: Into<Value>>(value: V) -> Expression {
        Expression {
            evaluator: builtin(ExpressionType::Constant),
            children: Vec::new(),
            value: Some(value.into()),
        }
    }

    /// `name`, or `instance.name` when an instance is given.
    pub fn accessor(name: &str, instance: Option<Expression>) -> Expression {
        let mut children = vec![Expression::constant(name)];
        children.extend(instance);
        Expression::new(builtin(ExpressionType::Accessor), children)
    }

    pub fn and(mut children: Vec<Expression>) -> Expression {
        if children.len() == 1 {
            return children.remove(0);
        }
        Expression::new(builtin(ExpressionType::And), children)
    }

    pub fn or(mut children: Vec<Expression>) -> Expression {
        if children.len() == 1 {
            return children.remove(0);
        }
        Expression::new(builtin(ExpressionType::Or), children)
    }

    pub fn not(child: Expression) -> Expression {
        Expression::new(builtin(ExpressionType::Not), vec![child])
    }

    pub fn equals(children: Vec<Expression>) -> Expression {
        Expression::new(builtin(ExpressionType::Equal), children)
    }

    /// Wraps a host closure. The closure sees the memory the expression is
    /// evaluated against.
    pub fn lambda<F>(f: F) -> Expression
    where
        F: Fn(&mut dyn Memory) -> ExpressionResult<Value> + Send + Sync + 'static,
    {
        let evaluator = ExpressionEvaluator::new(
            ExpressionType::Lambda.as_ref(),
            move |_, memory, _| f(memory),
            ReturnType::OBJECT,
            |_| Ok(()),
        );
        Expression::new(Arc::new(evaluator), Vec::new())
    }

    pub fn expr_type(&self) -> &str {
        &self.evaluator.expr_type
    }

    pub fn is(&self, expr_type: ExpressionType) -> bool {
        self.evaluator.expr_type == expr_type.as_ref()
    }

    pub fn is_constant(&self) -> bool {
        self.is(ExpressionType::Constant)
    }

    pub fn return_type(&self) -> ReturnType {
        match &self.value {
            Some(value) if self.is_constant() => ReturnType::of_value(value),
            _ => self.evaluator.return_type,
        }
    }

    /// Checks this node only; children are checked when they are built.
    pub fn validate(&self) -> ExpressionResult<()> {
        self.evaluator.validate(self)
    }

    pub fn validate_tree(&self) -> ExpressionResult<()> {
        for child in &self.children {
            child.validate_tree()?;
        }
        self.validate()
    }

    pub fn try_evaluate(&self, memory: &mut dyn Memory, options: &Options) -> ExpressionResult<Value> {
        self.evaluator.evaluate(self, memory, options)
    }

    /// Evaluates and converts the result through its JSON form.
    pub fn try_evaluate_as<T: DeserializeOwned>(
        &self,
        memory: &mut dyn Memory,
        options: &Options,
    ) -> ExpressionResult<T> {
        let value = self.try_evaluate(memory, options)?;
        serde_json::from_value::<T>(value.to_json()).map_err(|e| {
            tracing::debug!("conversion of {} failed: {}", self, e);
            Error::Conversion(format!(
                "'{}' is not of type {}",
                value,
                std::any::type_name::<T>()
            ))
        })
    }

    /// Structural equality. `&&` and `||` ignore child order.
    pub fn deep_equals(&self, other: &Expression) -> bool {
        if self.expr_type() != other.expr_type() || self.children.len() != other.children.len() {
            return false;
        }
        if self.is_constant() {
            return match (&self.value, &other.value) {
                (Some(a), Some(b)) => a.values_equal(b),
                (None, None) => true,
                _ => false,
            };
        }
        if self.is(ExpressionType::Lambda) {
            return Arc::ptr_eq(&self.evaluator, &other.evaluator);
        }
        if self.is(ExpressionType::And) || self.is(ExpressionType::Or) {
            return self
                .children
                .iter()
                .all(|child| other.children.iter().any(|o| child.deep_equals(o)));
        }
        self.children
            .iter()
            .zip(other.children.iter())
            .all(|(a, b)| a.deep_equals(b))
    }

    /// Static memory paths this expression reads.
    pub fn references(&self) -> Vec<String> {
        let mut refs = Vec::new();
        if let Some(path) = self.reference_walk(&mut refs) {
            add_reference(&mut refs, path);
        }
        refs
    }

    fn reference_walk(&self, refs: &mut Vec<String>) -> Option<String> {
        if self.is(ExpressionType::Accessor) {
            let name = self.children.first()?.value.as_ref()?.as_str()?.to_string();
            return match self.children.get(1) {
                None => Some(name),
                Some(instance) => instance
                    .reference_walk(refs)
                    .map(|path| format!("{}.{}", path, name)),
            };
        }

        if self.is(ExpressionType::Element) && self.children.len() == 2 {
            let mut path = self.children[0].reference_walk(refs);
            let index = &self.children[1];
            if let Some(base) = path.take() {
                match &index.value {
                    Some(Value::String(key)) if index.is_constant() => {
                        path = Some(format!("{}.{}", base, key))
                    }
                    Some(value) if index.is_constant() => {
                        path = Some(format!("{}[{}]", base, value))
                    }
                    _ => add_reference(refs, base),
                }
            }
            if let Some(index_path) = index.reference_walk(refs) {
                add_reference(refs, index_path);
            }
            return path;
        }

        if self.is_iteration() && self.children.len() >= 3 {
            if let Some(path) = self.children[0].reference_walk(refs) {
                add_reference(refs, path);
            }
            let mut body = Vec::new();
            if let Some(path) = self.children[2].reference_walk(&mut body) {
                add_reference(&mut body, path);
            }
            let iterator = self.children[1]
                .children
                .first()
                .and_then(|c| c.value.as_ref())
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            for path in body {
                let local = path == iterator
                    || path.starts_with(&format!("{}.", iterator))
                    || path.starts_with(&format!("{}[", iterator));
                if !local {
                    add_reference(refs, path);
                }
            }
            return None;
        }

        for child in &self.children {
            if let Some(path) = child.reference_walk(refs) {
                add_reference(refs, path);
            }
        }
        None
    }

    fn is_iteration(&self) -> bool {
        [
            ExpressionType::Foreach,
            ExpressionType::Select,
            ExpressionType::Where,
            ExpressionType::Any,
            ExpressionType::All,
        ]
        .iter()
        .any(|t| self.is(*t))
    }
}

fn add_reference(refs: &mut Vec<String>, path: String) {
    if !refs.contains(&path) {
        refs.push(path);
    }
}

/// `Display` for `f64` never uses exponents; a fraction is kept so the text
/// tokenizes as a float again.
fn positional_float(x: f64) -> String {
    let text = x.to_string();
    if x.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}

fn write_constant(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::String(s) => {
            let escaped = s
                .replace('\\', "\\\\")
                .replace('\'', "\\'")
                .replace('\n', "\\n")
                .replace('\r', "\\r")
                .replace('\t', "\\t");
            write!(f, "'{}'", escaped)
        }
        Value::Float(x) => write!(f, "{}", positional_float(*x)),
        Value::DateTime(_) | Value::Binary(_) => write!(f, "'{}'", value),
        Value::List(items) => {
            write!(f, "[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write_constant(f, item)?;
            }
            write!(f, "]")
        }
        Value::Object(_) => {
            write!(f, "json(")?;
            write_constant(f, &Value::String(value.to_json_string()))?;
            write!(f, ")")
        }
        other => write!(f, "{}", other),
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_constant() {
            return write_constant(f, self.value.as_ref().unwrap_or(&Value::Null));
        }

        if self.is(ExpressionType::Accessor) {
            if let Some(name) = self
                .children
                .first()
                .and_then(|c| c.value.as_ref())
                .and_then(Value::as_str)
            {
                return match self.children.get(1) {
                    None => write!(f, "{}", name),
                    Some(instance) => write!(f, "{}.{}", instance, name),
                };
            }
        }

        if self.is(ExpressionType::Element) && self.children.len() == 2 {
            return write!(f, "{}[{}]", self.children[0], self.children[1]);
        }

        let expr_type = self.expr_type();
        let infix = expr_type
            .chars()
            .next()
            .is_some_and(|c| !c.is_alphabetic())
            && self.children.len() >= 2;
        if !infix {
            write!(f, "{}", expr_type)?;
        }
        write!(f, "(")?;
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                if infix {
                    write!(f, " {} ", expr_type)?;
                } else {
                    write!(f, ", ")?;
                }
            }
            write!(f, "{}", child)?;
        }
        write!(f, ")")
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expression({})", self)
    }
}
