mod bad_expression_test;
mod evaluation_test;
mod null_substitution_test;
mod roundtrip_test;

use adaptive_expressions::{Expression, ExpressionResult, Options, SimpleObjectMemory, Value};

pub const SCOPE: &str = r#"{
    "one": 1,
    "two": 2,
    "hello": "hello",
    "nullObj": null,
    "bag": {"three": 3.0, "name": "mybag", "list": [1, 2, 3]},
    "items": ["zero", "one", "two"],
    "nums": [1, 2, 3],
    "timestamp": "2018-03-15T13:00:00.000Z",
    "user": {"name": "Ada", "age": 36, "lists": {"todo": ["a", "b"]}}
}"#;

pub fn scope() -> SimpleObjectMemory {
    SimpleObjectMemory::new(Value::from_json_str(SCOPE).expect("valid scope"))
}

pub fn try_eval(text: &str, options: &Options) -> ExpressionResult<Value> {
    Expression::parse(text)?.try_evaluate(&mut scope(), options)
}

pub fn eval(text: &str) -> Value {
    try_eval(text, &Options::new()).unwrap_or_else(|e| panic!("{} failed: {}", text, e))
}

pub fn json(text: &str) -> Value {
    Value::from_json_str(text).expect("valid json")
}
