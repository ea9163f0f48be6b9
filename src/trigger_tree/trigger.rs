use std::fmt;

use super::{
    clause::Clause,
    quantifier::{Quantifier, QuantifierType},
    relationship::{Comparers, Optimizer, RelationshipType},
    rewrite::push_down_not,
};
use crate::{
    config::Options,
    expression::{Expression, ExpressionType},
    memory::Memory,
    value::Value,
};

/// An expression in disjunctive normal form paired with the action it fires.
pub struct Trigger<A> {
    original_expression: Expression,
    action: A,
    clauses: Vec<Clause>,
}

impl<A> Trigger<A> {
    pub(crate) fn new(
        expression: Expression,
        action: A,
        quantifiers: &[Quantifier],
        comparers: &Comparers,
        optimizers: &[std::sync::Arc<dyn Optimizer>],
    ) -> Self {
        let normal_form = push_down_not(&expression);
        let mut clauses = generate_clauses(&normal_form);
        remove_duplicated_predicates(&mut clauses);
        for clause in clauses.iter_mut() {
            for optimizer in optimizers {
                optimizer.optimize(clause);
            }
        }
        for quantifier in quantifiers {
            clauses = clauses
                .iter()
                .flat_map(|clause| expand_quantifier(quantifier, clause))
                .collect();
        }
        remove_duplicates(&mut clauses);
        mark_subsumed_clauses(&mut clauses, comparers);
        for clause in clauses.iter_mut() {
            clause.split_ignores();
        }
        tracing::trace!("{} generated {} clauses", expression, clauses.len());

        Self {
            original_expression: expression,
            action,
            clauses,
        }
    }

    pub fn original_expression(&self) -> &Expression {
        &self.original_expression
    }

    pub fn action(&self) -> &A {
        &self.action
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Compares the non-subsumed clauses of both triggers in both directions.
    pub fn relationship(&self, other: &Trigger<A>, comparers: &Comparers) -> RelationshipType {
        let first = clauses_relationship(self, other, comparers);
        let second = clauses_relationship(other, self, comparers);
        match (first, second) {
            (RelationshipType::Equal, RelationshipType::Equal) => RelationshipType::Equal,
            (RelationshipType::Equal, _) | (RelationshipType::Specializes, _) => {
                RelationshipType::Specializes
            }
            (_, RelationshipType::Equal) | (_, RelationshipType::Specializes) => {
                RelationshipType::Generalizes
            }
            _ => RelationshipType::Incomparable,
        }
    }

    /// True when one of this trigger's clauses produced `node_clause` and its
    /// ignored predicates hold.
    pub fn matches(&self, node_clause: &Clause, memory: &mut dyn Memory, options: &Options) -> bool {
        self.clauses
            .iter()
            .any(|clause| clause.matches(node_clause, memory, options))
    }

    pub(crate) fn write_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        write!(f, "{:indent$}", "", indent = indent)?;
        if self.clauses.is_empty() {
            return write!(f, "<Empty>");
        }
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                write!(f, "\n{:indent$}|| ", "", indent = indent)?;
            }
            write!(f, "{}", clause)?;
        }
        Ok(())
    }
}

impl<A> fmt::Display for Trigger<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

impl<A> fmt::Debug for Trigger<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Trigger({})", self.original_expression)
    }
}

/// Incomparable, Equal or Specializes: whether every clause of `trigger`
/// equals or specializes some clause of `other`.
fn clauses_relationship<A>(trigger: &Trigger<A>, other: &Trigger<A>, comparers: &Comparers) -> RelationshipType {
    let mut so_far = RelationshipType::Incomparable;
    for clause in trigger.clauses.iter().filter(|c| !c.subsumed) {
        let found = other
            .clauses
            .iter()
            .filter(|c| !c.subsumed)
            .map(|second| clause.relationship(second, comparers))
            .find(|r| matches!(r, RelationshipType::Equal | RelationshipType::Specializes));

        match found {
            Some(RelationshipType::Equal) => {
                if so_far == RelationshipType::Incomparable {
                    so_far = RelationshipType::Equal;
                }
            }
            Some(relation) => so_far = relation,
            None => return RelationshipType::Incomparable,
        }
    }
    so_far
}

fn generate_clauses(expression: &Expression) -> Vec<Clause> {
    if expression.is(ExpressionType::And) {
        let mut so_far: Option<Vec<Clause>> = None;
        for child in &expression.children {
            let clauses = generate_clauses(child);
            if clauses.is_empty() {
                // false in a conjunction
                return Vec::new();
            }
            so_far = Some(match so_far {
                None => clauses,
                Some(previous) => {
                    let mut combined = Vec::with_capacity(previous.len() * clauses.len());
                    for old in &previous {
                        for clause in &clauses {
                            let mut children = old.children.clone();
                            children.extend(clause.children.iter().cloned());
                            combined.push(Clause::new(children));
                        }
                    }
                    combined
                }
            });
        }
        return so_far.unwrap_or_default();
    }

    if expression.is(ExpressionType::Or) {
        return expression.children.iter().flat_map(generate_clauses).collect();
    }

    if expression.is(ExpressionType::Optional) {
        let mut clauses = vec![Clause::default()];
        if let Some(child) = expression.children.first() {
            clauses.extend(generate_clauses(child));
        }
        return clauses;
    }

    match (expression.is_constant(), &expression.value) {
        (true, Some(Value::Boolean(true))) => vec![Clause::default()],
        (true, Some(Value::Boolean(false))) => Vec::new(),
        _ => vec![Clause::new(vec![expression.clone()])],
    }
}

/// Keeps the last of each group of equal predicates.
fn remove_duplicated_predicates(clauses: &mut [Clause]) {
    for clause in clauses.iter_mut() {
        let children = clause
            .children
            .iter()
            .enumerate()
            .filter(|(p, predicate)| {
                !clause.children[p + 1..]
                    .iter()
                    .any(|later| predicate.deep_equals(later))
            })
            .map(|(_, predicate)| predicate.clone())
            .collect();
        *clause = Clause::new(children);
    }
}

/// Keeps the first of each group of equal predicates.
fn remove_duplicates(clauses: &mut [Clause]) {
    for clause in clauses.iter_mut() {
        let mut predicates: Vec<Expression> = Vec::with_capacity(clause.children.len());
        for predicate in clause.children.drain(..) {
            if !predicates.iter().any(|kept| kept.deep_equals(&predicate)) {
                predicates.push(predicate);
            }
        }
        clause.children = predicates;
    }
}

/// Drops clauses equal to an earlier one and marks the more specific clause
/// of each related pair as subsumed.
fn mark_subsumed_clauses(clauses: &mut Vec<Clause>, comparers: &Comparers) {
    let mut i = 0;
    while i < clauses.len() {
        if !clauses[i].subsumed {
            let mut j = i + 1;
            while j < clauses.len() {
                if clauses[j].subsumed {
                    j += 1;
                    continue;
                }
                match clauses[i].relationship(&clauses[j], comparers) {
                    RelationshipType::Equal => {
                        clauses.remove(j);
                        continue;
                    }
                    RelationshipType::Specializes => {
                        clauses[i].subsumed = true;
                        break;
                    }
                    RelationshipType::Generalizes => clauses[j].subsumed = true,
                    RelationshipType::Incomparable => {}
                }
                j += 1;
            }
        }
        i += 1;
    }
}

/// Replaces the bare accessor `variable` by `binding`.
fn substitute_variable(variable: &str, binding: &str, expression: &Expression) -> (Expression, bool) {
    let is_variable = expression.is(ExpressionType::Accessor)
        && expression.children.len() == 1
        && expression.children[0].is_constant()
        && expression.children[0].value.as_ref().and_then(Value::as_str) == Some(variable);
    if is_variable {
        return (Expression::accessor(binding, None), true);
    }

    let mut changed = false;
    let children: Vec<Expression> = expression
        .children
        .iter()
        .map(|child| {
            let (child, child_changed) = substitute_variable(variable, binding, child);
            changed |= child_changed;
            child
        })
        .collect();
    if changed {
        (Expression::new(expression.evaluator.clone(), children), true)
    } else {
        (expression.clone(), false)
    }
}

fn references_variable(variable: &str, predicate: &Expression) -> bool {
    substitute_variable(variable, "", predicate).1
}

fn expand_quantifier(quantifier: &Quantifier, clause: &Clause) -> Vec<Clause> {
    let variable = quantifier.variable.as_str();
    match quantifier.kind {
        QuantifierType::All => {
            let children = if quantifier.bindings.is_empty() {
                // vacuously true, so drop predicates over the variable
                clause
                    .children
                    .iter()
                    .filter(|predicate| !references_variable(variable, predicate))
                    .cloned()
                    .collect()
            } else {
                let mut children = Vec::new();
                for predicate in &clause.children {
                    for binding in &quantifier.bindings {
                        let (substituted, changed) = substitute_variable(variable, binding, predicate);
                        children.push(substituted);
                        if !changed {
                            break;
                        }
                    }
                }
                children
            };
            let mut expanded = Clause::for_node(clause);
            expanded.children = children;
            vec![expanded]
        }
        QuantifierType::Any => {
            if quantifier.bindings.is_empty() {
                return if clause
                    .children
                    .iter()
                    .any(|predicate| references_variable(variable, predicate))
                {
                    Vec::new()
                } else {
                    vec![clause.clone()]
                };
            }

            let mut expanded = Vec::new();
            for binding in &quantifier.bindings {
                let mut changed = false;
                let mut new_clause = Clause::for_node(clause);
                new_clause.children = clause
                    .children
                    .iter()
                    .map(|predicate| {
                        let (substituted, predicate_changed) =
                            substitute_variable(variable, binding, predicate);
                        changed |= predicate_changed;
                        substituted
                    })
                    .collect();
                if changed {
                    new_clause
                        .any_bindings
                        .insert(quantifier.variable.clone(), binding.clone());
                }
                expanded.push(new_clause);
                if !changed {
                    break;
                }
            }
            expanded
        }
    }
}
