#![allow(clippy::unwrap_used)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use lpath_core::{Compiler, Evaluator, JsonPath, query};
use serde_json::{Value, json};

/// A bookstore with `books` entries
fn store(books: usize) -> Value {
    let book: Vec<Value> = (0..books)
        .map(|i| {
            let mut entry = json!({
                "category": if i % 3 == 0 { "reference" } else { "fiction" },
                "author": format!("Author {i}"),
                "title": format!("Title {i}"),
                "price": 5.0 + (i % 20) as f64,
            });
            if i % 2 == 0 {
                entry["isbn"] = json!(format!("0-{i:04}"));
            }
            entry
        })
        .collect();
    json!({
        "store": {
            "book": book,
            "bicycle": {"color": "red", "price": 19.95}
        },
        "limit": 10
    })
}

/// Nested `{"a": {"value": n, "a": {...}}}` of the given depth
fn deep(depth: usize) -> Value {
    let mut value = json!({"value": depth});
    for n in (0..depth).rev() {
        value = json!({"value": n, "a": value});
    }
    value
}

fn bench_basic_selectors(c: &mut Criterion) {
    let json = store(4);

    let mut group = c.benchmark_group("basic_selectors");

    let queries = [
        ("root", "$"),
        ("property", "$.store"),
        ("nested", "$.store.book"),
        ("index", "$.store.book[0]"),
        ("negative_index", "$.store.book[-1]"),
        ("wildcard", "$.store.book[*]"),
        ("union", "$.store.book[0,2]['title','price']"),
    ];

    for (name, query_str) in queries {
        group.bench_with_input(BenchmarkId::new("small", name), &query_str, |b, q| {
            b.iter(|| query(black_box(*q), black_box(&json)))
        });
    }

    group.finish();
}

fn bench_advanced_selectors(c: &mut Criterion) {
    let json = store(4);

    let mut group = c.benchmark_group("advanced_selectors");

    let queries = [
        ("slice", "$.store.book[0:2]"),
        ("reverse_slice", "$.store.book[::-1]"),
        ("descendant", "$..author"),
        ("compound", "$.store.book[*].author"),
    ];

    for (name, query_str) in queries {
        group.bench_with_input(BenchmarkId::new("small", name), &query_str, |b, q| {
            b.iter(|| query(black_box(*q), black_box(&json)))
        });
    }

    group.finish();
}

fn bench_filters(c: &mut Criterion) {
    let json = store(4);

    let mut group = c.benchmark_group("filters");

    let queries = [
        ("existence", "$.store.book[?(@.isbn)]"),
        ("comparison", "$.store.book[?(@.price < 10)]"),
        (
            "logical",
            "$.store.book[?(@.price < 10 && @.category == 'fiction')]",
        ),
        ("arithmetic", "$.store.book[?(@.price * 2 > $.limit)]"),
    ];

    for (name, query_str) in queries {
        group.bench_with_input(BenchmarkId::new("small", name), &query_str, |b, q| {
            b.iter(|| query(black_box(*q), black_box(&json)))
        });
    }

    group.finish();
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    let compiler = Compiler::new();

    let queries = [
        ("simple", "$.store.book[0].title"),
        (
            "filter",
            "$.store.book[?((@.price < 10 && @.category == 'fiction') || !@.isbn)]",
        ),
        (
            "nested_filter",
            concat!(
                "$['library']..books[?(@.pages > 100 && (@.edition == 'Second'))]",
                ".authors[?(@.country == 'US')][0:3:1]"
            ),
        ),
    ];

    for (name, query_str) in queries {
        group.bench_with_input(BenchmarkId::new("compile", name), &query_str, |b, q| {
            b.iter(|| compiler.compile(black_box(q)))
        });
    }

    group.finish();
}

fn bench_by_json_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("json_size");
    let path = JsonPath::parse("$..price").unwrap();

    for (name, books) in [("small", 4), ("medium", 400), ("large", 40_000)] {
        let json = store(books);
        group.throughput(Throughput::Elements(books as u64));
        group.bench_function(name, |b| b.iter(|| path.query(black_box(&json))));
    }

    group.finish();
}

fn bench_descendant_chains(c: &mut Criterion) {
    let json = deep(64);

    let mut group = c.benchmark_group("descendant_chains");

    let queries = [
        ("single", "$..value"),
        ("double", "$..a..value"),
        ("triple", "$..a..a..value"),
    ];

    for (name, query_str) in queries {
        group.bench_with_input(BenchmarkId::new("deep", name), &query_str, |b, q| {
            b.iter(|| query(black_box(*q), black_box(&json)))
        });
    }

    group.finish();
}

fn bench_mutation(c: &mut Criterion) {
    let json = store(400);
    let evaluator = Evaluator::new();

    let mut group = c.benchmark_group("mutation");

    let set_path = JsonPath::parse("$.store.book[?(@.price > 20)].price").unwrap();
    group.bench_function("set", |b| {
        b.iter_batched(
            || json.clone(),
            |mut doc| evaluator.set(&set_path, &mut doc, || json!(0)),
            criterion::BatchSize::LargeInput,
        )
    });

    let remove_path = JsonPath::parse("$.store.book[?(!@.isbn)]").unwrap();
    group.bench_function("remove", |b| {
        b.iter_batched(
            || json.clone(),
            |mut doc| evaluator.remove(&remove_path, &mut doc),
            criterion::BatchSize::LargeInput,
        )
    });

    group.finish();
}

fn bench_comparison(c: &mut Criterion) {
    let json = store(4);

    let mut group = c.benchmark_group("comparison");

    // === Property access ===

    // with parsing (includes parse time)
    group.bench_function("lpath/property", |b| {
        b.iter(|| query(black_box("$.store.book"), black_box(&json)))
    });

    // pre-parsed
    let property = JsonPath::parse("$.store.book").unwrap();
    group.bench_function("lpath_parsed/property", |b| {
        b.iter(|| property.query(black_box(&json)))
    });

    // === Filter query ===

    group.bench_function("lpath/filter", |b| {
        b.iter(|| query(black_box("$.store.book[?(@.price < 10)]"), black_box(&json)))
    });

    let filter = JsonPath::parse("$.store.book[?(@.price < 10)]").unwrap();
    group.bench_function("lpath_parsed/filter", |b| {
        b.iter(|| filter.query(black_box(&json)))
    });

    // === Descendant query ===

    group.bench_function("lpath/descendant", |b| {
        b.iter(|| query(black_box("$..price"), black_box(&json)))
    });

    let descendant = JsonPath::parse("$..price").unwrap();
    group.bench_function("lpath_parsed/descendant", |b| {
        b.iter(|| descendant.query(black_box(&json)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_basic_selectors,
    bench_advanced_selectors,
    bench_filters,
    bench_compile,
    bench_by_json_size,
    bench_descendant_chains,
    bench_mutation,
    bench_comparison,
);
criterion_main!(benches);
