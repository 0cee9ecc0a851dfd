//! Criterion measurements of named binding on its own (compile, `IN` expansion and rebind)
//! and of a full single-row lookup through an in-memory `SQLite` executor.

use std::hint::black_box;
use std::sync::LazyLock;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sql_named_ext::prelude::*;
use tokio::runtime::Runtime;

// Dedicated runtime for the async lookup path.
static TOKIO_RUNTIME: LazyLock<Runtime> =
    LazyLock::new(|| Runtime::new().expect("create tokio runtime"));

/// Resolve how many rows the lookup table holds.
fn row_count() -> usize {
    std::env::var("BENCH_ROWS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(1000)
}

fn bench_bind(c: &mut Criterion) {
    let mut group = c.benchmark_group("bind_named");
    let simple = "SELECT id, name FROM users WHERE id = :id AND name <> :name";
    let params = named_params! { "id" => 42, "name" => "bob" };

    for style in [PlaceholderStyle::Question, PlaceholderStyle::Dollar] {
        group.bench_with_input(
            BenchmarkId::new("scalar", format!("{style:?}")),
            &style,
            |b, &style| b.iter(|| bind_named(black_box(simple), Some(&params), style)),
        );
    }

    let in_query = "SELECT id FROM users WHERE id IN (:ids) AND flag = :flag";
    for width in [1_usize, 16, 256] {
        let params = named_params! {
            "ids" => ParamValue::list((0..width).map(|i| i as i64)),
            "flag" => true,
        };
        group.throughput(Throughput::Elements(width as u64));
        group.bench_with_input(BenchmarkId::new("in_list", width), &params, |b, params| {
            b.iter(|| bind_named(black_box(in_query), Some(params), PlaceholderStyle::Dollar));
        });
    }
    group.finish();
}

fn bench_sqlite_lookup(c: &mut Criterion) {
    let rows = row_count();
    let db = TOKIO_RUNTIME.block_on(async {
        let db = SqliteExecutor::open_in_memory()
            .await
            .expect("open in-memory sqlite");
        db.execute_batch(&format!(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
             WITH RECURSIVE seq(n) AS (SELECT 1 UNION ALL SELECT n + 1 FROM seq LIMIT {rows})
             INSERT INTO users (id, name) SELECT n, 'user-' || n FROM seq;"
        ))
        .await
        .expect("seed sqlite");
        db
    });
    let ctx = ExecContext::new();

    let mut group = c.benchmark_group("sqlite_named_get");
    group.throughput(Throughput::Elements(1));
    group.bench_function("by_id", |b| {
        let mut next = 0_usize;
        b.to_async(&*TOKIO_RUNTIME).iter(|| {
            next = next % rows + 1;
            let params = named_params! { "id" => next as i64 };
            let (db, ctx) = (&db, &ctx);
            async move {
                let mut name = String::new();
                named_get(ctx, db, &mut name, "SELECT name FROM users WHERE id = :id", Some(&params))
                    .await
                    .expect("lookup");
                black_box(name)
            }
        });
    });
    group.finish();
}

criterion_group!(benches, bench_bind, bench_sqlite_lookup);
criterion_main!(benches);
