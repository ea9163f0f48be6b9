//! # Builtin Functions
//!
//! Every function callable from expression text is an [`ExpressionEvaluator`]
//! registered in the [`FunctionTable`]. The standard set is built once on first
//! use. Hosts may register custom functions next to it at runtime, but never
//! replace a standard one.
//!
//! Each submodule contributes one group of functions through an `evaluators()`
//! constructor. Shared validators, verifiers and `apply` helpers live in
//! [`utils`].

pub mod utils;

mod collection;
mod comparison;
mod conversion;
pub mod date_format;
pub mod datetime;
mod jpath;
pub mod locale;
mod logic;
mod math;
mod memory_access;
mod misc;
mod object;
mod string;
pub mod timezone;
mod type_check;
mod uri;

use std::{collections::HashMap, sync::Arc};

use dashmap::DashMap;
use lazy_static::lazy_static;

use crate::{
    config::Options,
    error::{Error, ExpressionResult},
    expression::{Expression, ExpressionEvaluator, ExpressionType, ReturnType},
    memory::Memory,
    value::Value,
};

const ALIASES: &[(&str, ExpressionType)] = &[
    ("add", ExpressionType::Add),
    ("sub", ExpressionType::Subtract),
    ("mul", ExpressionType::Multiply),
    ("div", ExpressionType::Divide),
    ("exp", ExpressionType::Power),
    ("mod", ExpressionType::Mod),
    ("and", ExpressionType::And),
    ("or", ExpressionType::Or),
    ("not", ExpressionType::Not),
    ("equals", ExpressionType::Equal),
    ("greater", ExpressionType::GreaterThan),
    ("greaterOrEquals", ExpressionType::GreaterThanOrEqual),
    ("less", ExpressionType::LessThan),
    ("lessOrEquals", ExpressionType::LessThanOrEqual),
    ("&", ExpressionType::Concat),
    ("??", ExpressionType::Coalesce),
];

fn constant(expression: &Expression, _: &mut dyn Memory, _: &Options) -> ExpressionResult<Value> {
    Ok(expression.value.clone().unwrap_or_default())
}

fn core_evaluators() -> Vec<ExpressionEvaluator> {
    vec![
        ExpressionEvaluator::new(
            ExpressionType::Constant.as_ref(),
            constant,
            ReturnType::OBJECT,
            |_| Ok(()),
        ),
        ExpressionEvaluator::new(
            ExpressionType::Lambda.as_ref(),
            |expression, _, _| {
                Err(Error::evaluation(format!(
                    "{} has no host closure attached.",
                    expression
                )))
            },
            ReturnType::OBJECT,
            |_| Ok(()),
        ),
    ]
}

fn standard_functions() -> HashMap<String, Arc<ExpressionEvaluator>> {
    let mut table = HashMap::new();
    let groups = [
        core_evaluators(),
        math::evaluators(),
        comparison::evaluators(),
        logic::evaluators(),
        string::evaluators(),
        collection::evaluators(),
        datetime::evaluators(),
        conversion::evaluators(),
        uri::evaluators(),
        object::evaluators(),
        memory_access::evaluators(),
        type_check::evaluators(),
        misc::evaluators(),
    ];
    for evaluator in groups.into_iter().flatten() {
        table.insert(evaluator.expr_type.clone(), Arc::new(evaluator));
    }
    for (alias, target) in ALIASES {
        if let Some(evaluator) = table.get(target.as_ref()).cloned() {
            table.insert(alias.to_string(), evaluator);
        }
    }
    tracing::debug!("built {} standard functions", table.len());
    table
}

lazy_static! {
    static ref GLOBAL: FunctionTable = FunctionTable::new();
}

/// Standard functions plus host-registered custom functions.
pub struct FunctionTable {
    standard: HashMap<String, Arc<ExpressionEvaluator>>,
    custom: DashMap<String, Arc<ExpressionEvaluator>>,
}

impl Default for FunctionTable {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionTable {
    pub fn new() -> Self {
        Self {
            standard: standard_functions(),
            custom: DashMap::new(),
        }
    }

    /// The process-wide table used by [`Expression::parse`].
    pub fn global() -> &'static FunctionTable {
        &GLOBAL
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<ExpressionEvaluator>> {
        self.standard
            .get(name)
            .cloned()
            .or_else(|| self.custom.get(name).map(|entry| entry.value().clone()))
    }

    pub fn is_standard(&self, name: &str) -> bool {
        self.standard.contains_key(name)
    }

    /// Registers an evaluator under its own type name.
    pub fn add_evaluator(&self, evaluator: ExpressionEvaluator) -> ExpressionResult<()> {
        let name = evaluator.expr_type.clone();
        if self.is_standard(&name) {
            return Err(Error::validation(format!(
                "You can't overwrite a built-in function: {}",
                name
            )));
        }
        tracing::debug!("registering custom function {}", name);
        self.custom.insert(name, Arc::new(evaluator));
        Ok(())
    }

    /// Registers a plain function over evaluated arguments.
    pub fn add_function<F>(&self, name: &str, function: F) -> ExpressionResult<()>
    where
        F: Fn(&[Value]) -> ExpressionResult<Value> + Send + Sync + 'static,
    {
        self.add_evaluator(ExpressionEvaluator::new(
            name,
            utils::apply_with_error(function, None),
            ReturnType::OBJECT,
            |_| Ok(()),
        ))
    }

    pub fn remove_function(&self, name: &str) -> bool {
        self.custom.remove(name).is_some()
    }

    pub fn clear_custom(&self) {
        self.custom.clear();
    }

    pub fn custom_count(&self) -> usize {
        self.custom.len()
    }
}

/// Evaluator of a standard function.
pub fn builtin(expr_type: ExpressionType) -> Arc<ExpressionEvaluator> {
    match GLOBAL.standard.get(expr_type.as_ref()) {
        Some(evaluator) => evaluator.clone(),
        None => {
            tracing::warn!("no evaluator registered for {}", expr_type);
            Arc::new(ExpressionEvaluator::new(
                expr_type.as_ref(),
                move |_, _, _| Err(Error::internal(format!("{} is not implemented", expr_type))),
                ReturnType::OBJECT,
                |_| Ok(()),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_type_has_an_evaluator() {
        let table = FunctionTable::new();
        for expr_type in ExpressionType::iter() {
            assert!(
                table.lookup(expr_type.as_ref()).is_some(),
                "missing evaluator for {}",
                expr_type
            );
        }
    }

    #[test]
    fn test_aliases_share_evaluators() {
        let table = FunctionTable::new();
        let add = table.lookup("add").unwrap();
        assert_eq!(add.expr_type, "+");
        assert!(Arc::ptr_eq(&add, &table.lookup("+").unwrap()));
        assert_eq!(table.lookup("??").unwrap().expr_type, "coalesce");
    }

    #[test]
    fn test_custom_functions() {
        let table = FunctionTable::new();
        assert!(table.add_function("concat", |_| Ok(Value::Null)).is_err());

        table
            .add_function("double", |args| {
                Ok(Value::Integer(args[0].as_i64().unwrap_or_default() * 2))
            })
            .unwrap();
        assert_eq!(table.lookup("double").unwrap().expr_type, "double");
        assert_eq!(table.custom_count(), 1);

        assert!(table.remove_function("double"));
        assert!(!table.remove_function("concat"));
        assert!(table.lookup("double").is_none());
        assert!(table.lookup("concat").is_some());
    }
}
