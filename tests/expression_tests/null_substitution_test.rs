use super::{scope, try_eval};
use adaptive_expressions::{Expression, ExpressionConfig, Options, Value};
use pretty_assertions::assert_eq;

fn undefined() -> Options {
    Options::new().with_null_substitution(|path| Value::String(format!("{} is undefined", path)))
}

fn eval_with(text: &str, options: &Options) -> Value {
    try_eval(text, options).unwrap_or_else(|e| panic!("{} failed: {}", text, e))
}

#[test]
fn test_accessors_are_substituted() {
    let options = undefined();
    assert_eq!(eval_with("user.nick", &options), Value::from("user.nick is undefined"));
    assert_eq!(eval_with("nullObj", &options), Value::from("nullObj is undefined"));
    assert_eq!(eval_with("user.name", &options), Value::from("Ada"));
    assert_eq!(
        eval_with("`${user.nick} here`", &options),
        Value::from("user.nick is undefined here")
    );
    assert_eq!(
        eval_with("concat('hi ', user.nick)", &options),
        Value::from("hi user.nick is undefined")
    );
}

#[test]
fn test_boolean_contexts_see_raw_values() {
    let options = undefined();
    assert_eq!(eval_with("exists(user.nick)", &options), Value::Boolean(false));
    assert_eq!(eval_with("user.nick == null", &options), Value::Boolean(true));
    assert_eq!(eval_with("!user.nick", &options), Value::Boolean(true));
    assert_eq!(eval_with("user.nick > 1", &options), Value::Boolean(false));
}

#[test]
fn test_without_substitution_yields_null() {
    assert_eq!(try_eval("user.nick", &Options::new()).unwrap(), Value::Null);
}

#[test]
fn test_substitution_from_config() {
    let config = ExpressionConfig::from_json_str(
        r#"{"null_substitution": "<{path}>", "default_locale": "fr-FR"}"#,
    )
    .unwrap();
    let options = config.to_options();
    assert_eq!(options.locale.as_deref(), Some("fr-FR"));

    let expression = Expression::parse("user.lists.done").unwrap();
    let value = expression.try_evaluate(&mut scope(), &options).unwrap();
    assert_eq!(value, Value::from("<user.lists.done>"));
}
