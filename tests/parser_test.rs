use std::sync::Arc;

use adaptive_expressions::{
    analyzer::parsers::parse_root,
    ast::{BinaryOperator, Syntax},
    preprocessor::{Preprocessor, StringPreprocessor, TokenPreprocessor},
    tokenizer::token::Tokenizer,
    Expression, ExpressionEvaluator, ExpressionParser, FunctionTable, Options, ReturnType,
    SimpleObjectMemory, Value,
};
use pretty_assertions::assert_eq;

fn syntax(text: &str) -> Syntax {
    let text = StringPreprocessor::new().process(text);
    let spans = Tokenizer::new().tokenize(&text).unwrap();
    let tokens = TokenPreprocessor::new().process(spans);
    parse_root(&tokens).unwrap()
}

#[test]
fn test_pipeline_stages() {
    assert_eq!(
        syntax("= one + two"),
        Syntax::Binary {
            op: BinaryOperator::Add,
            left: Box::new(Syntax::Identifier("one".to_string())),
            right: Box::new(Syntax::Identifier("two".to_string())),
        }
    );
    assert_eq!(
        syntax("user.name"),
        Syntax::Member {
            instance: Box::new(Syntax::Identifier("user".to_string())),
            property: "name".to_string(),
        }
    );
    assert_eq!(
        syntax("length('abc')"),
        Syntax::Call {
            name: "length".to_string(),
            args: vec![Syntax::String("abc".to_string())],
        }
    );
}

#[test]
fn test_custom_lookup() {
    let shout = Arc::new(ExpressionEvaluator::new(
        "shout",
        |expression: &Expression, memory: &mut dyn adaptive_expressions::Memory, options: &Options| {
            let value = expression.children[0].try_evaluate(memory, options)?;
            Ok(Value::String(format!("{}!", value)))
        },
        ReturnType::STRING,
        |_| Ok(()),
    ));
    let lookup = move |name: &str| match name {
        "shout" => Some(shout.clone()),
        other => FunctionTable::global().lookup(other),
    };
    let parser = ExpressionParser::with_lookup(&lookup);
    let expression = parser.parse("shout(toUpper(name))").unwrap();

    let mut memory = SimpleObjectMemory::new(Value::from_json_str(r#"{"name": "ada"}"#).unwrap());
    let value = expression.try_evaluate(&mut memory, &Options::new()).unwrap();
    assert_eq!(value, Value::from("ADA!"));

    assert!(ExpressionParser::new().parse("shout(name)").is_err());
}

#[test]
fn test_registered_function() {
    FunctionTable::global()
        .add_function("twice", |args| {
            Ok(Value::Integer(args[0].as_i64().unwrap_or_default() * 2))
        })
        .unwrap();
    let expression = Expression::parse("twice(21)").unwrap();
    let value = expression
        .try_evaluate(&mut SimpleObjectMemory::new(Value::Null), &Options::new())
        .unwrap();
    assert_eq!(value, Value::Integer(42));
    assert!(FunctionTable::global().remove_function("twice"));

    assert!(FunctionTable::global()
        .add_function("length", |_| Ok(Value::Null))
        .is_err());
}
