use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use schemorm::{Filter, PredicateCompiler, RenderMode, StatementBuilder};
use serde_json::{Map, Value, json};

/// A filter with `n` equality keys and one `or` of `n` comparison fragments.
fn build_filter_json(n: usize) -> Value {
    let mut map = Map::new();
    for i in 0..n {
        map.insert(format!("col{i}"), json!(format!("value{i}")));
    }
    let fragments: Vec<Value> = (0..n)
        .map(|i| json!({ format!("num{i}"): { ">": i } }))
        .collect();
    map.insert("or".to_string(), Value::Array(fragments));
    Value::Object(map)
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter/parse");

    for n in [1, 5, 10, 50] {
        let raw = build_filter_json(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &raw, |b, raw| {
            b.iter(|| black_box(Filter::from_json(raw).unwrap()));
        });
    }

    group.finish();
}

fn bench_compile(c: &mut Criterion) {
    for mode in [RenderMode::Verbatim, RenderMode::Hardened] {
        let mut group = c.benchmark_group(format!("filter/compile/{mode:?}"));
        let compiler = PredicateCompiler::new(mode);

        for n in [1, 5, 10, 50] {
            let filter = Filter::from_json(&build_filter_json(n)).unwrap();
            group.bench_with_input(BenchmarkId::from_parameter(n), &filter, |b, filter| {
                b.iter(|| black_box(compiler.compile_where(filter).unwrap()));
            });
        }

        group.finish();
    }
}

fn bench_delete_statement(c: &mut Criterion) {
    let builder = StatementBuilder::hardened();
    let filter = Filter::from_json(&build_filter_json(10)).unwrap();

    c.bench_function("statement/delete_10", |b| {
        b.iter(|| black_box(builder.build_delete("person", &filter).unwrap()));
    });
}

criterion_group!(benches, bench_parse, bench_compile, bench_delete_statement);
criterion_main!(benches);
