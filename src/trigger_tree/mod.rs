//! # Trigger Trees
//!
//! A [`TriggerTree`] indexes boolean trigger expressions so that evaluating
//! memory against many triggers returns only the most specific matches.
//!
//! Each trigger is rewritten to disjunctive normal form, expanded over its
//! [`Quantifier`]s and split into [`Clause`]s. Clauses live in a DAG rooted at
//! the empty clause, with more specific clauses below more general ones.
//! Matching walks the DAG depth first: a node only reports its own triggers
//! when none of its specializations matched.
//!
//! Disjunctions are treated as shorthand for several rules. With
//!
//! ```text
//! R1: a        R2: a && b        R3: (a && b) || (c && d)        R4: c
//! ```
//!
//! the node `a && b` holds R2 and R3, but only R2 is reported for it since it
//! is the more specific trigger. The node `c && d` still reports R3.
//!
//! ## Usage Example
//!
//! ```rust
//! use adaptive_expressions::{SimpleObjectMemory, TriggerTree, Value};
//!
//! let mut tree = TriggerTree::new();
//! tree.add_trigger_text("turn.intent == 'greet'", "hello", &[]).unwrap();
//! tree.add_trigger_text("turn.intent == 'greet' && user.name != null", "hello-name", &[])
//!     .unwrap();
//!
//! let mut memory = SimpleObjectMemory::new(
//!     Value::from_json_str(r#"{"turn": {"intent": "greet"}, "user": {"name": "Ada"}}"#).unwrap(),
//! );
//! let matches = tree.matches(&mut memory);
//! assert_eq!(matches.len(), 1);
//! assert_eq!(*matches[0].action(), "hello-name");
//! ```

pub mod clause;
pub mod node;
pub mod quantifier;
pub mod relationship;
pub mod rewrite;
pub mod trigger;

pub use clause::Clause;
pub use node::{Node, NodeId};
pub use quantifier::{Quantifier, QuantifierType};
pub use relationship::{Comparers, Optimizer, PredicateComparer, RelationshipType};
pub use trigger::Trigger;

use std::{
    collections::{HashMap, HashSet},
    fmt,
    fmt::Write,
    sync::Arc,
};

use crate::{config::Options, error::ExpressionResult, expression::Expression, memory::Memory};

const ROOT: NodeId = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    None,
    Found,
    Added,
    Inserted,
}

pub struct TriggerTree<A> {
    nodes: Vec<Node<A>>,
    // slots of nodes no longer reachable from the root, reused by new nodes
    free: Vec<NodeId>,
    comparers: Comparers,
    optimizers: Vec<Arc<dyn Optimizer>>,
    total_triggers: usize,
}

impl<A> Default for TriggerTree<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> TriggerTree<A> {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(&Clause::default(), None)],
            free: Vec::new(),
            comparers: Comparers::new(),
            optimizers: Vec::new(),
            total_triggers: 0,
        }
    }

    /// Registers a comparer under the expression type it handles.
    pub fn add_comparer(&mut self, comparer: Arc<dyn PredicateComparer>) {
        self.comparers.insert(comparer.predicate(), comparer);
    }

    pub fn add_optimizer(&mut self, optimizer: Arc<dyn Optimizer>) {
        self.optimizers.push(optimizer);
    }

    pub fn comparers(&self) -> &Comparers {
        &self.comparers
    }

    pub fn root(&self) -> &Node<A> {
        &self.nodes[ROOT]
    }

    /// Node by id. A slot freed by a removal holds an empty node until reused.
    pub fn node(&self, id: NodeId) -> Option<&Node<A>> {
        self.nodes.get(id)
    }

    pub fn total_triggers(&self) -> usize {
        self.total_triggers
    }

    /// Nodes reachable from the root, the root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Most specific triggers whose clauses hold in `memory`.
    pub fn matches(&self, memory: &mut dyn Memory) -> Vec<Arc<Trigger<A>>> {
        self.matches_with_options(memory, &Options::new())
    }

    pub fn matches_with_options(
        &self,
        memory: &mut dyn Memory,
        options: &Options,
    ) -> Vec<Arc<Trigger<A>>> {
        let mut found = Vec::new();
        self.match_node(ROOT, memory, options, &mut found, &mut HashMap::new());
        found
    }

    /// One line per node, indented by depth, with the node's trigger count.
    pub fn tree_to_string(&self, indent: usize) -> String {
        let mut out = String::new();
        self.write_node(&mut out, ROOT, indent);
        out
    }

    /// The DAG in Graphviz dot format.
    pub fn generate_graph(&self) -> String {
        let mut out = String::from("strict digraph TriggerTree {\n");
        self.write_graph(&mut out, ROOT, 0, &mut HashSet::new());
        out.push_str("}\n");
        out
    }

    /// First node whose children are not strictly more specific or not
    /// mutually incomparable.
    pub fn verify_tree(&self) -> Option<&Node<A>> {
        self.verify_node(ROOT, &mut HashSet::new())
            .map(|id| &self.nodes[id])
    }

    fn relationship(&self, node: NodeId, other: NodeId) -> RelationshipType {
        self.nodes[node]
            .clause()
            .relationship(self.nodes[other].clause(), &self.comparers)
    }

    fn match_node(
        &self,
        id: NodeId,
        memory: &mut dyn Memory,
        options: &Options,
        found: &mut Vec<Arc<Trigger<A>>>,
        matched: &mut HashMap<NodeId, bool>,
    ) -> bool {
        if let Some(result) = matched.get(&id) {
            return *result;
        }

        let node = &self.nodes[id];
        let mut result = false;
        for child in &node.specializations {
            if self.match_node(*child, memory, options, found, matched) {
                result = true;
            }
        }

        if !result && node.clause().evaluate(memory, options) {
            for trigger in &node.triggers {
                if trigger.matches(node.clause(), memory, options) {
                    if !found.iter().any(|t| Arc::ptr_eq(t, trigger)) {
                        found.push(trigger.clone());
                    }
                    result = true;
                }
            }
        }

        matched.insert(id, result);
        result
    }

    fn write_node(&self, out: &mut String, id: NodeId, indent: usize) {
        let node = &self.nodes[id];
        let _ = writeln!(
            out,
            "{:indent$}{} [{}]",
            "",
            node.clause(),
            node.triggers.len(),
            indent = indent
        );
        for child in &node.specializations {
            self.write_node(out, *child, indent + 2);
        }
    }

    fn write_graph(&self, out: &mut String, id: NodeId, indent: usize, visited: &mut HashSet<NodeId>) {
        if !visited.insert(id) {
            return;
        }
        let node = &self.nodes[id];
        let name = |node: &Node<A>| format!("\"{}\"", node.to_string().replace('"', "\\\""));
        let _ = write!(out, "{:indent$}{}", "", name(node), indent = indent);
        if node.specializations.is_empty() {
            out.push('\n');
        } else {
            out.push_str(" -> {\n");
            for child in &node.specializations {
                let _ = writeln!(out, "{:indent$}{}", "", name(&self.nodes[*child]), indent = indent + 2);
            }
            let _ = writeln!(out, "{:indent$}}}", "", indent = indent);
        }
        for child in &node.specializations {
            self.write_graph(out, *child, indent + 2, visited);
        }
    }

    fn verify_node(&self, id: NodeId, visited: &mut HashSet<NodeId>) -> Option<NodeId> {
        if !visited.insert(id) {
            return None;
        }
        let specializations = &self.nodes[id].specializations;
        for (i, first) in specializations.iter().enumerate() {
            if self.relationship(id, *first) != RelationshipType::Generalizes {
                return Some(id);
            }
            if let Some(bad) = self.verify_node(*first, visited) {
                return Some(bad);
            }
            for second in &specializations[i + 1..] {
                if self.relationship(*first, *second) != RelationshipType::Incomparable {
                    return Some(id);
                }
            }
        }
        None
    }
}

impl<A: PartialEq> TriggerTree<A> {
    /// Adds a trigger. It counts towards [`TriggerTree::total_triggers`] only
    /// if at least one of its clauses was not already present with an equal
    /// action.
    pub fn add_trigger(
        &mut self,
        expression: Expression,
        action: A,
        quantifiers: &[Quantifier],
    ) -> Arc<Trigger<A>> {
        let trigger = Arc::new(Trigger::new(
            expression,
            action,
            quantifiers,
            &self.comparers,
            &self.optimizers,
        ));
        tracing::debug!("adding trigger {}", trigger.original_expression());

        let mut added = false;
        for clause in trigger.clauses() {
            let id = self.allocate(Node::new(clause, Some(trigger.clone())));
            if self.add_node(ROOT, id, &mut HashMap::new()) == Operation::Added {
                added = true;
            }
        }
        if added {
            self.total_triggers += 1;
        }
        // clauses merged into equal nodes were never linked
        self.reclaim();
        trigger
    }

    pub fn add_trigger_text(
        &mut self,
        text: &str,
        action: A,
        quantifiers: &[Quantifier],
    ) -> ExpressionResult<Arc<Trigger<A>>> {
        let expression = Expression::parse(text)?;
        Ok(self.add_trigger(expression, action, quantifiers))
    }

    pub fn remove_trigger(&mut self, trigger: &Arc<Trigger<A>>) -> bool {
        tracing::debug!("removing trigger {}", trigger.original_expression());
        let mut removed = false;
        self.remove_from(ROOT, trigger, &mut HashSet::new(), &mut removed);
        if removed {
            self.total_triggers = self.total_triggers.saturating_sub(1);
            self.reclaim();
        }
        removed
    }

    fn allocate(&mut self, node: Node<A>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = node;
                id
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    /// Frees every node the root no longer reaches, dropping its triggers.
    fn reclaim(&mut self) {
        let mut reachable = HashSet::new();
        let mut stack = vec![ROOT];
        while let Some(id) = stack.pop() {
            if reachable.insert(id) {
                stack.extend(self.nodes[id].specializations.iter().copied());
            }
        }

        while self.nodes.len() > 1 && !reachable.contains(&(self.nodes.len() - 1)) {
            self.nodes.pop();
        }
        self.free.clear();
        for id in 1..self.nodes.len() {
            if !reachable.contains(&id) {
                self.nodes[id] = Node::new(&Clause::default(), None);
                self.free.push(id);
            }
        }
        tracing::trace!("{} live nodes, {} free slots", reachable.len(), self.free.len());
    }

    // Adding has to visit the whole DAG: a node incomparable to the new one
    // can still have a specialization that the new node generalizes.
    fn add_node(&mut self, id: NodeId, new: NodeId, ops: &mut HashMap<NodeId, Operation>) -> Operation {
        if let Some(op) = ops.get(&id) {
            return *op;
        }

        let trigger = self.nodes[new].triggers[0].clone();
        let relationship = self.relationship(id, new);
        tracing::trace!("{} {} {}", self.nodes[id], relationship, self.nodes[new]);

        let mut op = Operation::None;
        match relationship {
            RelationshipType::Equal => {
                let duplicate = self.nodes[id]
                    .all_triggers
                    .iter()
                    .any(|existing| existing.action() == trigger.action());
                op = Operation::Found;
                if !duplicate {
                    let existing = std::mem::take(&mut self.nodes[id].triggers);
                    let mut kept = Vec::with_capacity(existing.len() + 1);
                    let mut add = true;
                    let mut iter = existing.into_iter();
                    while let Some(current) = iter.next() {
                        match trigger.relationship(&current, &self.comparers) {
                            RelationshipType::Generalizes => {
                                tracing::trace!("trigger specialized by {}", current);
                                add = false;
                                kept.push(current);
                                kept.extend(iter.by_ref());
                                break;
                            }
                            RelationshipType::Specializes => {
                                tracing::trace!("trigger replaces {}", current);
                            }
                            _ => kept.push(current),
                        }
                    }
                    if add {
                        kept.push(trigger.clone());
                    }
                    let node = &mut self.nodes[id];
                    node.all_triggers.push(trigger);
                    node.triggers = kept;
                    op = Operation::Added;
                }
            }
            RelationshipType::Incomparable => {
                for child in self.nodes[id].specializations.clone() {
                    self.add_node(child, new, ops);
                }
            }
            RelationshipType::Specializes => {
                self.add_specialization(new, id);
                op = Operation::Inserted;
            }
            RelationshipType::Generalizes => {
                let mut found_one = false;
                let mut removals = Vec::new();
                for child in self.nodes[id].specializations.clone() {
                    let child_op = self.add_node(child, new, ops);
                    if child_op != Operation::None {
                        found_one = true;
                        if child_op == Operation::Inserted {
                            removals.push(child);
                            op = Operation::Added;
                        } else {
                            op = child_op;
                        }
                    }
                }

                let node = &mut self.nodes[id];
                if !removals.is_empty() {
                    node.specializations.retain(|child| !removals.contains(child));
                    node.specializations.push(new);
                }
                if !found_one {
                    node.specializations.push(new);
                    op = Operation::Added;
                }
            }
        }

        ops.insert(id, op);
        op
    }

    fn add_specialization(&mut self, id: NodeId, specialization: NodeId) -> bool {
        let mut removals = Vec::new();
        for child in self.nodes[id].specializations.clone() {
            match self.relationship(specialization, child) {
                RelationshipType::Equal | RelationshipType::Specializes => return false,
                RelationshipType::Generalizes => removals.push(child),
                RelationshipType::Incomparable => {}
            }
        }
        for removal in removals {
            // the specialization now owns the removed child
            self.nodes[id].specializations.retain(|child| *child != removal);
            self.add_specialization(specialization, removal);
        }
        self.nodes[id].specializations.push(specialization);
        true
    }

    fn remove_from(
        &mut self,
        id: NodeId,
        trigger: &Arc<Trigger<A>>,
        visited: &mut HashSet<NodeId>,
        removed: &mut bool,
    ) {
        if !visited.insert(id) {
            return;
        }

        let node = &mut self.nodes[id];
        if let Some(position) = node.all_triggers.iter().position(|t| Arc::ptr_eq(t, trigger)) {
            node.all_triggers.remove(position);
            *removed = true;
            if let Some(position) = node.triggers.iter().position(|t| Arc::ptr_eq(t, trigger)) {
                node.triggers.remove(position);
                // promote the next most specific triggers
                for candidate in self.nodes[id].all_triggers.clone() {
                    let covered = self.nodes[id].triggers.iter().any(|existing| {
                        matches!(
                            candidate.relationship(existing, &self.comparers),
                            RelationshipType::Equal | RelationshipType::Generalizes
                        )
                    });
                    if !covered {
                        self.nodes[id].triggers.push(candidate);
                    }
                }
            }
        }

        let mut empty_children = Vec::new();
        for child in self.nodes[id].specializations.clone() {
            self.remove_from(child, trigger, visited, removed);
            if self.nodes[child].triggers.is_empty() {
                empty_children.push(child);
            }
        }

        for child in empty_children {
            self.nodes[id].specializations.retain(|c| *c != child);
            for specialization in self.nodes[child].specializations.clone() {
                let covered = self.nodes[id]
                    .specializations
                    .iter()
                    .any(|parent| self.relationship(*parent, specialization) == RelationshipType::Generalizes);
                if !covered {
                    self.nodes[id].specializations.push(specialization);
                }
            }
        }
    }
}

impl<A> fmt::Display for TriggerTree<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TriggerTree with {} triggers", self.total_triggers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{memory::SimpleObjectMemory, value::Value};
    use pretty_assertions::assert_eq;
    use relationship::MockPredicateComparer;

    fn memory(json: &str) -> SimpleObjectMemory {
        SimpleObjectMemory::new(Value::from_json_str(json).unwrap())
    }

    fn actions(tree: &TriggerTree<&'static str>, json: &str) -> Vec<&'static str> {
        let mut found: Vec<_> = tree
            .matches(&mut memory(json))
            .iter()
            .map(|t| *t.action())
            .collect();
        found.sort();
        found
    }

    fn tree() -> TriggerTree<&'static str> {
        let mut tree = TriggerTree::new();
        tree.add_trigger_text("a == 1", "R1", &[]).unwrap();
        tree.add_trigger_text("a == 1 && b == 2", "R2", &[]).unwrap();
        tree.add_trigger_text("(a == 1 && b == 2) || c == 3", "R3", &[])
            .unwrap();
        tree
    }

    #[test]
    fn test_most_specific_wins() {
        let tree = tree();
        assert_eq!(tree.total_triggers(), 3);
        assert_eq!(actions(&tree, r#"{"a": 1, "b": 2}"#), vec!["R2"]);
        assert_eq!(actions(&tree, r#"{"a": 1}"#), vec!["R1"]);
        assert_eq!(actions(&tree, r#"{"c": 3}"#), vec!["R3"]);
        assert_eq!(actions(&tree, r#"{"a": 1, "c": 3}"#), vec!["R1", "R3"]);
        assert!(actions(&tree, r#"{"a": 2}"#).is_empty());
        assert!(tree.verify_tree().is_none());
    }

    #[test]
    fn test_tree_to_string() {
        let mut tree = TriggerTree::new();
        tree.add_trigger_text("a == 1", 1, &[]).unwrap();
        tree.add_trigger_text("a == 1 && b == 2", 2, &[]).unwrap();
        assert_eq!(
            tree.tree_to_string(0),
            "() [0]\n  ((a == 1)) [1]\n    ((a == 1) && (b == 2)) [1]\n"
        );
        assert_eq!(tree.to_string(), "TriggerTree with 2 triggers");
        assert!(tree.generate_graph().starts_with("strict digraph TriggerTree {\n\"()\" -> {"));
    }

    #[test]
    fn test_duplicate_action_is_not_counted() {
        let mut tree = TriggerTree::new();
        tree.add_trigger_text("a == 1", 1, &[]).unwrap();
        tree.add_trigger_text("a == 1", 1, &[]).unwrap();
        assert_eq!(tree.total_triggers(), 1);
        tree.add_trigger_text("a == 1", 2, &[]).unwrap();
        assert_eq!(tree.total_triggers(), 2);
        assert_eq!(tree.node(1).map(|n| n.all_triggers().len()), Some(2));
    }

    #[test]
    fn test_remove_trigger() {
        let mut tree = tree();
        let r2 = tree.root().specializations()[0];
        let r2 = tree.node(r2).unwrap().specializations()[0];
        let r2 = tree.node(r2).unwrap().triggers()[0].clone();
        assert_eq!(*r2.action(), "R2");

        assert!(tree.remove_trigger(&r2));
        assert!(!tree.remove_trigger(&r2));
        assert_eq!(tree.total_triggers(), 2);
        assert_eq!(actions(&tree, r#"{"a": 1, "b": 2}"#), vec!["R3"]);
        assert!(tree.verify_tree().is_none());
    }

    #[test]
    fn test_nodes_are_reclaimed() {
        let mut tree = TriggerTree::new();
        for i in 0..50 {
            let trigger = tree.add_trigger_text("a == 1", i, &[]).unwrap();
            assert!(tree.remove_trigger(&trigger));
        }
        assert_eq!(tree.total_triggers(), 0);
        assert_eq!(tree.node_count(), 1);
        assert!(tree.node(1).is_none());

        // merged clauses do not take a slot
        tree.add_trigger_text("a == 1", 1, &[]).unwrap();
        tree.add_trigger_text("a == 1", 2, &[]).unwrap();
        tree.add_trigger_text("a == 1 || b == 1", 3, &[]).unwrap();
        assert_eq!(tree.node_count(), 3);

        let inner = tree.add_trigger_text("a == 1 && c == 1", 4, &[]).unwrap();
        tree.add_trigger_text("a == 1 && c == 1 && d == 1", 5, &[]).unwrap();
        assert_eq!(tree.node_count(), 5);
        assert!(tree.remove_trigger(&inner));
        assert_eq!(tree.node_count(), 4);
        let found = tree.matches(&mut memory(r#"{"a": 1, "c": 1, "d": 1}"#));
        assert_eq!(found.iter().map(|t| *t.action()).collect::<Vec<_>>(), vec![5]);
        assert!(tree.verify_tree().is_none());
    }

    #[test]
    fn test_remove_rehomes_children() {
        let mut tree = TriggerTree::new();
        let general = tree.add_trigger_text("a == 1", 1, &[]).unwrap();
        tree.add_trigger_text("a == 1 && b == 2", 2, &[]).unwrap();
        assert!(tree.remove_trigger(&general));
        assert_eq!(
            tree.tree_to_string(0),
            "() [0]\n  ((a == 1) && (b == 2)) [1]\n"
        );
        assert!(tree.matches(&mut memory(r#"{"a": 1}"#)).is_empty());
    }

    #[test]
    fn test_quantified_and_ignored_triggers() {
        let mut tree = TriggerTree::new();
        tree.add_trigger_text("x == 1", "any", &[Quantifier::any("x", ["a", "b"])])
            .unwrap();
        tree.add_trigger_text("c == 1 && ignore(d == 2)", "ignore", &[])
            .unwrap();

        assert_eq!(actions(&tree, r#"{"b": 1}"#), vec!["any"]);
        assert!(actions(&tree, r#"{"c": 1}"#).is_empty());
        assert_eq!(actions(&tree, r#"{"c": 1, "d": 2}"#), vec!["ignore"]);
    }

    #[test]
    fn test_custom_comparer() {
        let mut comparer = MockPredicateComparer::new();
        comparer.expect_predicate().return_const("<".to_string());
        comparer.expect_relationship().returning(|predicate, other| {
            let bound = |e: &Expression| e.children[1].value.as_ref().and_then(Value::as_i64);
            match bound(predicate).cmp(&bound(other)) {
                std::cmp::Ordering::Less => RelationshipType::Specializes,
                std::cmp::Ordering::Equal => RelationshipType::Equal,
                std::cmp::Ordering::Greater => RelationshipType::Generalizes,
            }
        });

        let mut tree = TriggerTree::new();
        tree.add_comparer(Arc::new(comparer));
        tree.add_trigger_text("x < 5", "wide", &[]).unwrap();
        tree.add_trigger_text("x < 3", "narrow", &[]).unwrap();

        assert_eq!(tree.tree_to_string(0), "() [0]\n  ((x < 5)) [1]\n    ((x < 3)) [1]\n");
        assert_eq!(actions(&tree, r#"{"x": 1}"#), vec!["narrow"]);
        assert_eq!(actions(&tree, r#"{"x": 4}"#), vec!["wide"]);
    }
}
