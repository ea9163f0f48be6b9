use adaptive_expressions::{Expression, Options, SimpleObjectMemory, TriggerTree, Value};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const SOURCE: &str = "user.age >= 18 && contains(user.roles, 'admin') || join(foreach(items, x, x * 2), ',') == '2,4,6'";

fn memory() -> SimpleObjectMemory {
    SimpleObjectMemory::new(
        Value::from_json_str(r#"{"user": {"age": 36, "roles": ["admin"]}, "items": [1, 2, 3]}"#)
            .unwrap(),
    )
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse", |b| b.iter(|| Expression::parse(black_box(SOURCE)).unwrap()));
}

fn bench_evaluate(c: &mut Criterion) {
    let expression = Expression::parse(SOURCE).unwrap();
    let options = Options::new();
    let mut memory = memory();
    c.bench_function("evaluate", |b| {
        b.iter(|| expression.try_evaluate(&mut memory, &options).unwrap())
    });
}

fn bench_trigger_matches(c: &mut Criterion) {
    let mut tree = TriggerTree::new();
    for i in 0..50 {
        tree.add_trigger_text(&format!("user.age > {} && contains(user.roles, 'admin')", i), i, &[])
            .unwrap();
        tree.add_trigger_text(&format!("user.age > {}", i), i + 100, &[]).unwrap();
    }
    let mut memory = memory();
    c.bench_function("trigger matches", |b| b.iter(|| tree.matches(&mut memory)));
}

criterion_group!(benches, bench_parse, bench_evaluate, bench_trigger_matches);
criterion_main!(benches);
