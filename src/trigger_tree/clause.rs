use std::{collections::BTreeMap, fmt};

use super::relationship::{Comparers, RelationshipType};
use crate::{
    config::Options,
    expression::{Expression, ExpressionType},
    functions::builtin,
    memory::Memory,
};

/// A conjunction of predicates, one disjunct of a trigger's normal form.
#[derive(Clone, Debug, Default)]
pub struct Clause {
    pub children: Vec<Expression>,
    /// Quantifier variable to the binding that produced this clause.
    pub any_bindings: BTreeMap<String, String>,
    /// Set when another clause of the same trigger is more general.
    pub subsumed: bool,
    ignored: Option<Expression>,
}

impl Clause {
    pub fn new(children: Vec<Expression>) -> Self {
        Self {
            children,
            ..Default::default()
        }
    }

    /// Copy for a tree node: keeps predicates and bindings, drops ignores.
    pub(crate) fn for_node(clause: &Clause) -> Self {
        Self {
            children: clause.children.clone(),
            any_bindings: clause.any_bindings.clone(),
            ..Default::default()
        }
    }

    /// Predicates that must hold on match but do not take part in ordering.
    pub fn ignored(&self) -> Option<&Expression> {
        self.ignored.as_ref()
    }

    pub fn to_expression(&self) -> Expression {
        Expression::new(builtin(ExpressionType::And), self.children.clone())
    }

    /// Same predicates in any order.
    pub fn deep_equals(&self, other: &Clause) -> bool {
        self.to_expression().deep_equals(&other.to_expression())
    }

    /// Moves `ignore(x)` predicates out of the clause into [`Clause::ignored`].
    pub(crate) fn split_ignores(&mut self) {
        let (ignores, children): (Vec<_>, Vec<_>) = self
            .children
            .drain(..)
            .partition(|child| child.is(ExpressionType::Ignore));
        self.children = children;
        if !ignores.is_empty() {
            self.ignored = Some(Expression::and(
                ignores
                    .into_iter()
                    .filter_map(|ignore| ignore.children.into_iter().next())
                    .collect(),
            ));
        }
    }

    pub fn evaluate(&self, memory: &mut dyn Memory, options: &Options) -> bool {
        self.to_expression()
            .try_evaluate_as::<bool>(memory, options)
            .unwrap_or(false)
    }

    /// True when `clause` has the same predicates and this clause's ignored
    /// predicates hold.
    pub fn matches(&self, clause: &Clause, memory: &mut dyn Memory, options: &Options) -> bool {
        if !clause.deep_equals(self) {
            return false;
        }
        match &self.ignored {
            Some(ignored) => ignored
                .try_evaluate_as::<bool>(memory, options)
                .unwrap_or(false),
            None => true,
        }
    }

    pub fn relationship(&self, other: &Clause, comparers: &Comparers) -> RelationshipType {
        let swapped = other.children.len() < self.children.len();
        let (shorter, longer) = if swapped { (other, self) } else { (self, other) };
        let short_count = shorter.children.len();
        let long_count = longer.children.len();

        let mut so_far = RelationshipType::Incomparable;
        if short_count == 0 {
            so_far = if long_count == 0 {
                RelationshipType::Equal
            } else {
                RelationshipType::Generalizes
            };
        } else {
            for short in &shorter.children {
                let mut relation = RelationshipType::Incomparable;
                for long in &longer.children {
                    relation = predicate_relationship(short, long, comparers);
                    if relation != RelationshipType::Incomparable {
                        break;
                    }
                }

                if relation == RelationshipType::Incomparable {
                    so_far = RelationshipType::Incomparable;
                    break;
                }
                if so_far == RelationshipType::Incomparable {
                    so_far = relation;
                }
                if so_far == RelationshipType::Equal {
                    let keeps_going = relation == RelationshipType::Generalizes
                        || relation == RelationshipType::Equal
                        || (relation == RelationshipType::Specializes && short_count == long_count);
                    if !keeps_going {
                        break;
                    }
                    so_far = relation;
                } else if so_far != relation {
                    // mixed specialization and generalization
                    so_far = RelationshipType::Incomparable;
                    break;
                }
            }

            if short_count != long_count {
                so_far = match so_far {
                    RelationshipType::Equal | RelationshipType::Generalizes => {
                        RelationshipType::Generalizes
                    }
                    _ => RelationshipType::Incomparable,
                };
            }
            so_far = bindings_relationship(so_far, shorter, longer);
        }

        if swapped {
            so_far.swap()
        } else {
            so_far
        }
    }
}

fn predicate_relationship(
    predicate: &Expression,
    other: &Expression,
    comparers: &Comparers,
) -> RelationshipType {
    let (root, other_root) =
        if predicate.is(ExpressionType::Not) && other.is(ExpressionType::Not) {
            (&predicate.children[0], &other.children[0])
        } else {
            (predicate, other)
        };

    if root.expr_type() == other_root.expr_type() {
        if let Some(comparer) = comparers.get(root.expr_type()) {
            return comparer.relationship(root, other_root);
        }
    }
    if predicate.deep_equals(other) {
        RelationshipType::Equal
    } else {
        RelationshipType::Incomparable
    }
}

/// Clauses with equal predicates are ordered by their quantifier bindings:
/// the clause with more bindings is the more specific one.
fn bindings_relationship(so_far: RelationshipType, shorter: &Clause, longer: &Clause) -> RelationshipType {
    if so_far != RelationshipType::Equal {
        return so_far;
    }
    let (mut small, mut large) = (&shorter.any_bindings, &longer.any_bindings);
    let swapped = small.len() > large.len();
    if swapped {
        std::mem::swap(&mut small, &mut large);
    }
    if small.iter().any(|(key, value)| large.get(key) != Some(value)) {
        return RelationshipType::Incomparable;
    }
    let result = if small.len() < large.len() {
        RelationshipType::Generalizes
    } else {
        RelationshipType::Equal
    };
    if swapped {
        result.swap()
    } else {
        result
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.subsumed {
            write!(f, "*")?;
        }
        write!(f, "(")?;
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                write!(f, " && ")?;
            }
            write!(f, "{}", child)?;
        }
        write!(f, ")")?;
        if let Some(ignored) = &self.ignored {
            write!(f, " ignored({})", ignored)?;
        }
        for (key, value) in &self.any_bindings {
            write!(f, " {}->{}", key, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{memory::SimpleObjectMemory, value::Value};

    fn clause(predicates: &[&str]) -> Clause {
        Clause::new(
            predicates
                .iter()
                .map(|p| Expression::parse(p).unwrap())
                .collect(),
        )
    }

    #[test]
    fn test_relationship_by_predicate_count() {
        let comparers = Comparers::new();
        let general = clause(&["a == 1"]);
        let specific = clause(&["b == 2", "a == 1"]);
        assert_eq!(
            general.relationship(&specific, &comparers),
            RelationshipType::Generalizes
        );
        assert_eq!(
            specific.relationship(&general, &comparers),
            RelationshipType::Specializes
        );
        assert_eq!(
            specific.relationship(&clause(&["a == 1", "b == 2"]), &comparers),
            RelationshipType::Equal
        );
        assert_eq!(
            general.relationship(&clause(&["c == 1"]), &comparers),
            RelationshipType::Incomparable
        );
        assert_eq!(
            Clause::default().relationship(&general, &comparers),
            RelationshipType::Generalizes
        );
    }

    #[test]
    fn test_bindings_break_ties() {
        let comparers = Comparers::new();
        let mut first = clause(&["a == 1"]);
        first.any_bindings.insert("x".into(), "a".into());
        let mut second = clause(&["a == 1"]);
        second.any_bindings.insert("x".into(), "b".into());
        assert_eq!(
            first.relationship(&second, &comparers),
            RelationshipType::Incomparable
        );
        assert_eq!(
            first.relationship(&clause(&["a == 1"]), &comparers),
            RelationshipType::Specializes
        );
    }

    #[test]
    fn test_ignores_and_display() {
        let mut with_ignore = clause(&["a == 1", "ignore(b == 2)"]);
        with_ignore.split_ignores();
        assert_eq!(with_ignore.to_string(), "((a == 1)) ignored((b == 2))");

        let node_clause = Clause::for_node(&with_ignore);
        assert!(node_clause.ignored().is_none());

        let mut memory = SimpleObjectMemory::new(
            Value::from_json_str(r#"{"a": 1, "b": 2}"#).unwrap(),
        );
        let options = Options::new();
        assert!(node_clause.evaluate(&mut memory, &options));
        assert!(with_ignore.matches(&node_clause, &mut memory, &options));

        let mut other = SimpleObjectMemory::new(Value::from_json_str(r#"{"a": 1}"#).unwrap());
        assert!(!with_ignore.matches(&node_clause, &mut other, &options));
    }
}
