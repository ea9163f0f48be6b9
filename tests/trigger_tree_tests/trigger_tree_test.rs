use adaptive_expressions::{
    Expression, Quantifier, SimpleObjectMemory, TriggerTree, Value,
};
use pretty_assertions::assert_eq;

fn memory(json: &str) -> SimpleObjectMemory {
    SimpleObjectMemory::new(Value::from_json_str(json).unwrap())
}

fn matched(tree: &TriggerTree<&'static str>, json: &str) -> Vec<&'static str> {
    let mut actions: Vec<_> = tree
        .matches(&mut memory(json))
        .iter()
        .map(|trigger| *trigger.action())
        .collect();
    actions.sort();
    actions
}

fn rules() -> TriggerTree<&'static str> {
    let mut tree = TriggerTree::new();
    for (text, action) in [
        ("a == 1", "R1"),
        ("a == 1 && b == 1", "R2"),
        ("(a == 1 && b == 1) || (c == 1 && d == 1)", "R3"),
        ("c == 1", "R4"),
    ] {
        tree.add_trigger_text(text, action, &[]).unwrap();
    }
    tree
}

#[test]
fn test_most_specific_rules_win() {
    let tree = rules();
    assert_eq!(tree.total_triggers(), 4);
    assert!(tree.verify_tree().is_none());

    assert_eq!(matched(&tree, r#"{"a": 1}"#), vec!["R1"]);
    assert_eq!(matched(&tree, r#"{"a": 1, "b": 1}"#), vec!["R2"]);
    assert_eq!(matched(&tree, r#"{"c": 1, "d": 1}"#), vec!["R3"]);
    assert_eq!(matched(&tree, r#"{"c": 1}"#), vec!["R4"]);
    assert_eq!(matched(&tree, r#"{"a": 1, "c": 1}"#), vec!["R1", "R4"]);
    assert!(matched(&tree, r#"{"b": 1}"#).is_empty());
}

#[test]
fn test_remove_promotes_next_trigger() {
    let mut tree = TriggerTree::new();
    tree.add_trigger_text("a == 1", "general", &[]).unwrap();
    let specific = tree
        .add_trigger_text("a == 1 && b == 1", "specific", &[])
        .unwrap();
    let memory_json = r#"{"a": 1, "b": 1}"#;
    assert_eq!(matched(&tree, memory_json), vec!["specific"]);

    assert!(tree.remove_trigger(&specific));
    assert!(!tree.remove_trigger(&specific));
    assert_eq!(tree.total_triggers(), 1);
    assert_eq!(matched(&tree, memory_json), vec!["general"]);
    assert!(tree.verify_tree().is_none());
}

#[test]
fn test_all_quantifier_expands_bindings() {
    let mut tree = TriggerTree::new();
    let expression = Expression::parse("x == 'red'").unwrap();
    let quantifier = Quantifier::all("x", vec!["color", "shade"]);
    let trigger = tree.add_trigger(expression, "both", &[quantifier]);
    assert_eq!(trigger.clauses().len(), 1);

    assert_eq!(matched(&tree, r#"{"color": "red", "shade": "red"}"#), vec!["both"]);
    assert!(matched(&tree, r#"{"color": "red", "shade": "blue"}"#).is_empty());
}

#[test]
fn test_any_quantifier_matches_either_binding() {
    let mut tree = TriggerTree::new();
    let expression = Expression::parse("x == 'red'").unwrap();
    let quantifier = Quantifier::any("x", vec!["color", "shade"]);
    let trigger = tree.add_trigger(expression, "either", &[quantifier]);
    assert_eq!(trigger.clauses().len(), 2);

    assert_eq!(matched(&tree, r#"{"shade": "red"}"#), vec!["either"]);
    assert!(matched(&tree, r#"{"color": "blue"}"#).is_empty());
}

#[test]
fn test_negated_triggers() {
    let mut tree = TriggerTree::new();
    tree.add_trigger_text("!(a == 1 || b == 1)", "neither", &[]).unwrap();
    assert_eq!(matched(&tree, r#"{"a": 2, "b": 2}"#), vec!["neither"]);
    assert!(matched(&tree, r#"{"a": 1, "b": 2}"#).is_empty());
}

#[test]
fn test_graph_lists_every_node() {
    let tree = rules();
    let graph = tree.generate_graph();
    assert!(graph.starts_with("strict digraph"));
    assert!(graph.contains("(a == 1)"));
    assert!(graph.contains("(c == 1)"));
    assert!(graph.trim_end().ends_with('}'));
}
