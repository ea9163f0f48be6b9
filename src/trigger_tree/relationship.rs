use std::{collections::HashMap, sync::Arc};

use strum_macros::Display;

use super::clause::Clause;
use crate::expression::Expression;

/// How one clause or trigger relates to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RelationshipType {
    /// More specific than the other.
    Specializes,
    Equal,
    /// More general than the other.
    Generalizes,
    Incomparable,
}

impl RelationshipType {
    /// The relationship seen from the other side.
    pub fn swap(self) -> Self {
        match self {
            RelationshipType::Specializes => RelationshipType::Generalizes,
            RelationshipType::Generalizes => RelationshipType::Specializes,
            other => other,
        }
    }
}

/// Compares two predicates of the same type, for example `x < 3` and `x < 5`.
#[mockall::automock]
pub trait PredicateComparer: Send + Sync {
    /// Expression type this comparer handles.
    fn predicate(&self) -> String;

    fn relationship(&self, predicate: &Expression, other: &Expression) -> RelationshipType;
}

/// Rewrites a clause in place before quantifiers are expanded.
#[mockall::automock]
pub trait Optimizer: Send + Sync {
    fn optimize(&self, clause: &mut Clause);
}

pub type Comparers = HashMap<String, Arc<dyn PredicateComparer>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap() {
        assert_eq!(RelationshipType::Specializes.swap(), RelationshipType::Generalizes);
        assert_eq!(RelationshipType::Generalizes.swap(), RelationshipType::Specializes);
        assert_eq!(RelationshipType::Equal.swap(), RelationshipType::Equal);
        assert_eq!(RelationshipType::Incomparable.to_string(), "Incomparable");
    }
}
