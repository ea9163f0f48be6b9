use std::{fmt, sync::Arc};

use super::{Expression, ReturnType};
use crate::{config::Options, error::ExpressionResult, memory::Memory, value::Value};

pub type EvaluateFn =
    Arc<dyn Fn(&Expression, &mut dyn Memory, &Options) -> ExpressionResult<Value> + Send + Sync>;

pub type ValidateFn = Arc<dyn Fn(&Expression) -> ExpressionResult<()> + Send + Sync>;

/// A named function: how to validate a call site and how to evaluate it.
#[derive(Clone)]
pub struct ExpressionEvaluator {
    pub expr_type: String,
    pub return_type: ReturnType,
    /// Type of the evaluator that computes the logical negation, if one exists.
    pub negation: Option<String>,
    evaluate: EvaluateFn,
    validator: ValidateFn,
}

impl ExpressionEvaluator {
    pub fn new<S, E, V>(expr_type: S, evaluate: E, return_type: ReturnType, validator: V) -> Self
    where
        S: Into<String>,
        E: Fn(&Expression, &mut dyn Memory, &Options) -> ExpressionResult<Value>
            + Send
            + Sync
            + 'static,
        V: Fn(&Expression) -> ExpressionResult<()> + Send + Sync + 'static,
    {
        Self {
            expr_type: expr_type.into(),
            return_type,
            negation: None,
            evaluate: Arc::new(evaluate),
            validator: Arc::new(validator),
        }
    }

    pub fn with_negation<S: Into<String>>(mut self, negation: S) -> Self {
        self.negation = Some(negation.into());
        self
    }

    pub fn evaluate(
        &self,
        expression: &Expression,
        memory: &mut dyn Memory,
        options: &Options,
    ) -> ExpressionResult<Value> {
        (self.evaluate)(expression, memory, options)
    }

    pub fn validate(&self, expression: &Expression) -> ExpressionResult<()> {
        (self.validator)(expression)
    }
}

impl fmt::Debug for ExpressionEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionEvaluator")
            .field("expr_type", &self.expr_type)
            .field("return_type", &self.return_type)
            .field("negation", &self.negation)
            .finish()
    }
}
