//! Pushes negations down to the predicates so that the expression only
//! contains `&&`, `||`, markers and (possibly negated) leaves.

use crate::{
    expression::{Expression, ExpressionType},
    functions::{builtin, FunctionTable},
    value::Value,
};

pub fn push_down_not(expression: &Expression) -> Expression {
    push(expression, false)
}

fn push(expression: &Expression, in_not: bool) -> Expression {
    let children = |negate: bool| -> Vec<Expression> {
        expression
            .children
            .iter()
            .map(|child| push(child, negate))
            .collect()
    };

    if expression.is(ExpressionType::And) || expression.is(ExpressionType::Or) {
        let is_and = expression.is(ExpressionType::And);
        let expr_type = if is_and != in_not {
            ExpressionType::And
        } else {
            ExpressionType::Or
        };
        return Expression::new(builtin(expr_type), children(in_not));
    }

    if expression.is(ExpressionType::Not) {
        return push(&expression.children[0], !in_not);
    }

    if expression.is(ExpressionType::Exists) {
        let expr_type = if in_not {
            ExpressionType::Equal
        } else {
            ExpressionType::NotEqual
        };
        return Expression::new(
            builtin(expr_type),
            vec![expression.children[0].clone(), Expression::constant(Value::Null)],
        );
    }

    // markers pass the negation through to their argument
    if expression.is(ExpressionType::Optional) || expression.is(ExpressionType::Ignore) {
        return Expression::new(expression.evaluator.clone(), children(in_not));
    }

    if !in_not {
        return expression.clone();
    }

    if let Some(Value::Boolean(b)) = expression.value.as_ref().filter(|_| expression.is_constant()) {
        return Expression::constant(!b);
    }

    match expression
        .evaluator
        .negation
        .as_deref()
        .and_then(|negation| FunctionTable::global().lookup(negation))
    {
        Some(negated) => Expression::new(negated, expression.children.clone()),
        None => Expression::not(expression.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(text: &str) -> String {
        push_down_not(&Expression::parse(text).unwrap()).to_string()
    }

    #[test]
    fn test_de_morgan() {
        assert_eq!(rewrite("!(a < 1 || b == 2)"), "((a >= 1) && (b != 2))");
        assert_eq!(rewrite("!(a > 1 && !(b <= 2))"), "((a <= 1) || (b <= 2))");
    }

    #[test]
    fn test_exists_and_markers() {
        assert_eq!(rewrite("!exists(a)"), "(a == null)");
        assert_eq!(rewrite("exists(a)"), "(a != null)");
        assert_eq!(rewrite("!optional(a == 1)"), "optional((a != 1))");
    }

    #[test]
    fn test_leaves_without_negation() {
        assert_eq!(rewrite("!contains(a, 'x')"), "!(contains(a, 'x'))");
        assert_eq!(rewrite("!true"), "false");
        assert_eq!(rewrite("a == 1"), "(a == 1)");
    }
}
