use super::{eval, json, scope};
use adaptive_expressions::{Expression, Memory, Options, SimpleObjectMemory, Value};
use pretty_assertions::assert_eq;

fn check(cases: &[(&str, &str)]) {
    for (text, expected) in cases {
        assert_eq!(eval(text), json(expected), "evaluating {}", text);
    }
}

#[test]
fn test_arithmetic() {
    check(&[
        ("1 + 2 * 3", "7"),
        ("one + two", "3"),
        ("(one + two) * 2", "6"),
        ("10 / 4", "2"),
        ("10.0 / 4", "2.5"),
        ("7 % 3", "1"),
        ("2 ^ 3", "8.0"),
        ("-one + 5", "4"),
        ("1 + 'a'", "\"1a\""),
        ("max(1, 5, 3)", "5"),
        ("min(nums)", "1"),
        ("sum(nums)", "6"),
        ("average(nums)", "2.0"),
        ("round(2.5)", "2.0"),
        ("range(1, 3)", "[1, 2, 3]"),
    ]);
}

#[test]
fn test_comparison_and_logic() {
    check(&[
        ("one == 1", "true"),
        ("1 == 1.0", "true"),
        ("one != 1", "false"),
        ("two > one && one < two", "true"),
        ("one == 2 || two == 2", "true"),
        ("!(one == 1)", "false"),
        ("exists(nullObj)", "false"),
        ("exists(one)", "true"),
        ("nullObj == null", "true"),
        ("nullObj > 1", "false"),
        ("empty('')", "true"),
        ("empty(items)", "false"),
        ("if(one > 0, 'pos', 'neg')", "\"pos\""),
        ("contains(items, 'one')", "true"),
        ("contains('hello', 'ell')", "true"),
    ]);
}

#[test]
fn test_strings() {
    check(&[
        ("concat('a', nullObj, 'b')", "\"ab\""),
        ("'a' & 1", "\"a1\""),
        ("length(hello)", "5"),
        ("toUpper(hello)", "\"HELLO\""),
        ("substring('hello', 1, 3)", "\"ell\""),
        ("replace('hello', 'l', 'L')", "\"heLLo\""),
        ("indexOf('hello', 'l')", "2"),
        ("endsWith('hello', 'lo')", "true"),
        ("trim('  a ')", "\"a\""),
        ("addOrdinal(11)", "\"11th\""),
        ("`${hello} ${user.name}`", "\"hello Ada\""),
        ("isMatch('abc', '^a.c$')", "true"),
    ]);
}

#[test]
fn test_collections_and_lambdas() {
    check(&[
        ("count(items)", "3"),
        ("join(items, ',')", "\"zero,one,two\""),
        ("first(items)", "\"zero\""),
        ("last(nums)", "3"),
        ("skip(nums, 1)", "[2, 3]"),
        ("take(nums, 2)", "[1, 2]"),
        ("reverse(nums)", "[3, 2, 1]"),
        ("union(nums, createArray(4))", "[1, 2, 3, 4]"),
        ("foreach(nums, x, x * 10)", "[10, 20, 30]"),
        ("foreach(nums, x, x + one)", "[2, 3, 4]"),
        ("where(nums, x, x > 1)", "[2, 3]"),
        ("[1, 'a', one]", "[1, \"a\", 1]"),
    ]);
}

#[test]
fn test_memory_paths() {
    check(&[
        ("user.lists.todo[1]", "\"b\""),
        ("user.lists['todo'][0]", "\"a\""),
        ("bag.list[5]", "null"),
        ("bag.three", "3.0"),
        ("items[one]", "\"one\""),
        ("missing.path", "null"),
    ]);
}

#[test]
fn test_quoted_keys_in_paths() {
    let mut memory = SimpleObjectMemory::new(json(
        r#"{"a": {"it's": {"b": 7}, "back\\slash": "x", "say \"hi\"": [1, 2]}}"#,
    ));
    for (text, expected) in [
        (r#"a["it's"].b"#, "7"),
        (r"a['it\'s'].b", "7"),
        (r"a['back\\slash']", "\"x\""),
        (r#"a['say "hi"'][1]"#, "2"),
    ] {
        let value = Expression::parse(text)
            .and_then(|e| e.try_evaluate(&mut memory, &Options::new()))
            .unwrap_or_else(|e| panic!("{} failed: {}", text, e));
        assert_eq!(value, json(expected), "evaluating {}", text);
    }
}

#[test]
fn test_range_at_integer_limit() {
    check(&[
        ("range(2147483647, 1)", "[2147483647]"),
        ("count(range(-3, 5))", "5"),
        ("range(-2147483648, 2)", "[-2147483648, -2147483647]"),
    ]);
}

#[test]
fn test_objects_and_conversions() {
    check(&[
        ("json('{\"a\": 1}').a", "1"),
        ("setProperty(json('{}'), 'a', 1)", "{\"a\": 1}"),
        ("merge(json('{\"a\": 1}'), json('{\"b\": 2}'))", "{\"a\": 1, \"b\": 2}"),
        ("jPath(bag, '$.list[0]')", "1"),
        ("coalesce(nullObj, 'x')", "\"x\""),
        ("int('10')", "10"),
        ("float('1.5')", "1.5"),
        ("string(user.age)", "\"36\""),
        ("isInteger(1)", "true"),
        ("isString(one)", "false"),
        ("base64('hello')", "\"aGVsbG8=\""),
        ("base64ToString('aGVsbG8=')", "\"hello\""),
        ("uriHost('https://example.com:8080/a?b=1')", "\"example.com\""),
        ("uriPort('https://example.com:8080/a?b=1')", "8080"),
    ]);
}

#[test]
fn test_dates() {
    check(&[
        ("addDays(timestamp, 1)", "\"2018-03-16T13:00:00.000Z\""),
        ("year(timestamp)", "2018"),
        ("dayOfWeek(timestamp)", "4"),
        ("formatDateTime(timestamp, 'yyyy-MM-dd')", "\"2018-03-15\""),
        ("getTimeOfDay(timestamp)", "\"afternoon\""),
    ]);
}

#[test]
fn test_set_path_to_value_writes_memory() {
    let mut memory = scope();
    let expression = Expression::parse("setPathToValue(user.name, 'Bob')").unwrap();
    let result = expression.try_evaluate(&mut memory, &Options::new()).unwrap();
    assert_eq!(result, Value::from("Bob"));
    assert_eq!(memory.get_value("user.name"), Value::from("Bob"));
}

#[test]
fn test_typed_evaluation() {
    let expression = Expression::parse("count(items) + 1").unwrap();
    let count: i64 = expression
        .try_evaluate_as(&mut scope(), &Options::new())
        .unwrap();
    assert_eq!(count, 4);

    let not_a_bool = Expression::parse("hello")
        .unwrap()
        .try_evaluate_as::<bool>(&mut scope(), &Options::new());
    assert!(not_a_bool.is_err());
}

#[test]
fn test_references() {
    let expression = Expression::parse("user.name == 'Ada' && foreach(items, x, x.id) != null").unwrap();
    assert_eq!(
        expression.references(),
        vec!["user.name".to_string(), "items".to_string()]
    );
}
