use adaptive_expressions::{Expression, Options, SimpleObjectMemory, Value};
use proptest::prelude::*;

fn quote(raw: &str) -> String {
    format!("'{}'", raw.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn float() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..1000, 0u32..1000).prop_map(|(a, b)| format!("{}.{}", a, b)),
        (1u32..1000).prop_map(|n| format!("0.0000000{}", n)),
        (1u32..1000).prop_map(|n| format!("{}000000000000000000000.5", n)),
    ]
}

fn leaf() -> impl Strategy<Value = String> {
    prop_oneof![
        (0i64..1000).prop_map(|n| n.to_string()),
        (1i64..1000).prop_map(|n| format!("-{}", n)),
        float(),
        float().prop_map(|x| format!("-{}", x)),
        prop::sample::select(vec!["a", "b", "user.age", "items[0]"]).prop_map(String::from),
        "[a-z]{0,6}".prop_map(|s| quote(&s)),
        "[a-z'\"\\\\ ]{0,6}".prop_map(|s| quote(&s)),
    ]
}

fn expression_text() -> impl Strategy<Value = String> {
    leaf().prop_recursive(4, 32, 3, |inner| {
        let op = prop::sample::select(vec!["+", "-", "*", "==", "!=", "<", ">=", "&&", "||", "&"]);
        prop_oneof![
            (inner.clone(), op, inner.clone()).prop_map(|(l, op, r)| format!("({} {} {})", l, op, r)),
            inner.clone().prop_map(|e| format!("!({})", e)),
            prop::collection::vec(inner, 1..3).prop_map(|args| format!("concat({})", args.join(", "))),
        ]
    })
}

proptest! {
    #[test]
    fn test_display_reparses_to_same_tree(text in expression_text()) {
        // Type validation rejects some combinations, such as `'x' * 1`.
        if let Ok(expression) = Expression::parse(&text) {
            let shown = expression.to_string();
            let reparsed = Expression::parse(&shown)
                .unwrap_or_else(|e| panic!("{} reparsing {} failed: {}", text, shown, e));
            prop_assert_eq!(reparsed.to_string(), shown);
            prop_assert!(reparsed.deep_equals(&expression));
        }
    }

    #[test]
    fn test_quoted_strings_survive_display(raw in "[a-z'\"\\\\\t\n ]{0,8}") {
        let shown = Expression::parse(&quote(&raw)).unwrap().to_string();
        prop_assert_eq!(evaluate(&shown), Value::String(raw));
    }

    #[test]
    fn test_floats_survive_display(x in prop_oneof![1e-12f64..1e-6, 1e15f64..1e22, -1e3f64..1e3]) {
        let shown = Expression::constant(Value::Float(x)).to_string();
        prop_assert!(!shown.contains('e'), "{} printed as {}", x, shown);
        prop_assert_eq!(evaluate(&shown), Value::Float(x));
    }
}

fn evaluate(text: &str) -> Value {
    let mut memory = SimpleObjectMemory::new(Value::Null);
    Expression::parse(text)
        .and_then(|e| e.try_evaluate(&mut memory, &Options::default()))
        .unwrap_or_else(|e| panic!("{} failed: {}", text, e))
}
