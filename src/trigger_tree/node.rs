use std::{fmt, sync::Arc};

use super::{clause::Clause, trigger::Trigger};

/// Index of a node in its tree.
pub type NodeId = usize;

/// One conjunction in the tree with the triggers that produced it.
///
/// `triggers` holds only the most specific triggers for the clause, while
/// `all_triggers` keeps every trigger so that removing one can promote the
/// next most specific.
pub struct Node<A> {
    clause: Clause,
    pub(crate) triggers: Vec<Arc<Trigger<A>>>,
    pub(crate) all_triggers: Vec<Arc<Trigger<A>>>,
    pub(crate) specializations: Vec<NodeId>,
}

impl<A> Node<A> {
    pub(crate) fn new(clause: &Clause, trigger: Option<Arc<Trigger<A>>>) -> Self {
        let triggers: Vec<_> = trigger.into_iter().collect();
        Self {
            clause: Clause::for_node(clause),
            all_triggers: triggers.clone(),
            triggers,
            specializations: Vec::new(),
        }
    }

    pub fn clause(&self) -> &Clause {
        &self.clause
    }

    pub fn triggers(&self) -> &[Arc<Trigger<A>>] {
        &self.triggers
    }

    pub fn all_triggers(&self) -> &[Arc<Trigger<A>>] {
        &self.all_triggers
    }

    /// Children, each more specific than this node and incomparable to each other.
    pub fn specializations(&self) -> &[NodeId] {
        &self.specializations
    }
}

impl<A> fmt::Display for Node<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.clause)
    }
}
