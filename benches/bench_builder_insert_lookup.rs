//! Criterion comparison of point lookups and single-row inserts through raw
//! `rusqlite` and through the builders, inline and on the worker thread.

use std::hint::black_box;
use std::path::Path;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rusqlite::{Connection, params};
use sqlite_wrapper::prelude::*;
use tempfile::TempDir;

/// Resolve how many rows to seed and look up per iteration.
fn row_count() -> usize {
    std::env::var("BENCH_ROWS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(1000)
}

fn seed(path: &Path, rows: usize) -> rusqlite::Result<()> {
    let mut conn = Connection::open(path)?;
    conn.execute_batch(
        "CREATE TABLE items (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, score REAL);",
    )?;
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare("INSERT INTO items (name, score) VALUES (?1, ?2)")?;
        for i in 0..rows {
            stmt.execute(params![format!("item-{i}"), i as f64 * 0.5])?;
        }
    }
    tx.commit()
}

fn open(path: &Path, separate_thread: bool) -> Database {
    Database::builder(path.to_string_lossy().into_owned())
        .separate_thread(separate_thread)
        .journal_wal(true)
        .open()
        .expect("open database")
}

fn bench_lookup(c: &mut Criterion) {
    let rows = row_count();
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("lookup.db");
    seed(&path, rows).expect("seed dataset");

    let mut group = c.benchmark_group("point_lookup");
    group.throughput(Throughput::Elements(rows as u64));

    group.bench_with_input(BenchmarkId::new("rusqlite", rows), &rows, |b, &rows| {
        let conn = Connection::open(&path).expect("open rusqlite");
        b.iter(|| {
            let mut stmt = conn
                .prepare_cached("SELECT name FROM items WHERE id = ?1")
                .expect("prepare");
            for id in 1..=rows as i64 {
                let name: String = stmt.query_row([id], |row| row.get(0)).expect("lookup");
                black_box(name);
            }
        });
    });

    for (label, separate_thread) in [("builder_inline", false), ("builder_worker", true)] {
        group.bench_with_input(BenchmarkId::new(label, rows), &rows, |b, &rows| {
            let db = open(&path, separate_thread);
            let items = db.table("items").expect("items table");
            b.iter(|| {
                for id in 1..=rows as i64 {
                    let name = items
                        .get(["name"])
                        .where_("id")
                        .and_then(|cond| cond.eq(id))
                        .and_then(|get| get.run())
                        .expect("lookup");
                    black_box(name);
                }
            });
        });
    }
    group.finish();
}

fn bench_insert(c: &mut Criterion) {
    let rows = row_count();
    let mut group = c.benchmark_group("insert");
    group.throughput(Throughput::Elements(rows as u64));

    for (label, separate_thread, await_completion) in [
        ("inline", false, true),
        ("worker_wait", true, true),
        ("worker_detached", true, false),
    ] {
        group.bench_with_input(BenchmarkId::new(label, rows), &rows, |b, &rows| {
            let dir = TempDir::new().expect("tempdir");
            let db = Database::builder(dir.path().join("insert").to_string_lossy().into_owned())
                .separate_thread(separate_thread)
                .await_completion(await_completion)
                .journal_wal(true)
                .open()
                .expect("open database");
            let items = db
                .create(
                    "items",
                    [
                        ("id", ColumnSpec::autoincrement()),
                        ("name", ColumnSpec::not_null(BaseType::Text)),
                    ],
                    false,
                )
                .and_then(|create| create.run())
                .expect("create items");
            b.iter(|| {
                for i in 0..rows {
                    items
                        .add([("name", format!("item-{i}"))])
                        .and_then(|add| add.run())
                        .expect("insert");
                }
                db.wait_for_queue().expect("drain queue");
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_lookup, bench_insert);
criterion_main!(benches);
