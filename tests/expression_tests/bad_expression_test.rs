use super::try_eval;
use adaptive_expressions::{Error, Expression, Options};

#[test]
fn test_parse_errors() {
    let inputs = [
        "a +",
        "func(",
        "'unclosed",
        "(1 + 2",
        "[1, 2",
        "1 2",
        "`${one`",
    ];
    for input in inputs {
        assert!(
            Expression::parse(input).is_err(),
            "{:?} should not parse",
            input
        );
    }
}

#[test]
fn test_validation_errors() {
    let inputs = [
        "length(1, 2)",
        "nope(1)",
        "foreach(items, 'x', x)",
        "if(true)",
    ];
    for input in inputs {
        let err = Expression::parse(input).unwrap_err();
        assert!(
            !err.is_evaluation(),
            "{:?} should fail before evaluation, got {:?}",
            input,
            err
        );
    }
}

#[test]
fn test_evaluation_errors() {
    let inputs = [
        "1 / 0",
        "mod(5, 0)",
        "1 + nullObj",
        "int('abc')",
        "json('{')",
        "one / 0",
        "items[hello]",
        "addDays('not a date', 1)",
        "range(1, 0)",
        "range(1, 1000001)",
        "range(2147483647, 2)",
        "range(2147483648, 1)",
    ];
    for input in inputs {
        match try_eval(input, &Options::new()) {
            Err(e) => assert!(e.is_evaluation(), "{:?} failed with {:?}", input, e),
            Ok(value) => panic!("{:?} evaluated to {}", input, value),
        }
    }
}

#[test]
fn test_unknown_function_message_names_function() {
    match Expression::parse("nope(1)") {
        Err(Error::Validation(message)) => assert!(message.contains("nope"), "{}", message),
        other => panic!("unexpected result {:?}", other.map(|e| e.to_string())),
    }
}
