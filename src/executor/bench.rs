use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use std::sync::Arc;

use shelfdb::executor::Executor;
use shelfdb::query::{OrderBy, Query, SortColumn, SortDirection};
use shelfdb::redirect::redirect;
use shelfdb::storage::MemoryEngine;

// Workload configuration
const TABLE: &str = "Books_0";
const PRELOAD_RECORDS: u32 = 1_000;

fn executor_with_records(count: u32) -> Executor {
    let executor = Executor::new(Arc::new(MemoryEngine::new()));
    let create = redirect(&Query::create_table(), Some(TABLE)).unwrap();
    executor.execute_ddl(&create).unwrap();

    let mut rng = rand::thread_rng();
    for i in 0..count {
        let name = format!("book-{}", rng.gen_range(0..count));
        let insert = redirect(&Query::insert(Some(&name), i % 97), Some(TABLE)).unwrap();
        executor.execute_insert(&insert).unwrap();
    }
    executor
}

// Single-statement insert transactions
pub fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("Executor");
    let executor = executor_with_records(0);
    let mut rng = rand::thread_rng();

    group.bench_function("insert", |b| {
        b.iter(|| {
            let stock = rng.gen_range(0..10_000);
            let insert = redirect(&Query::insert(None, stock), Some(TABLE)).unwrap();
            executor.execute_insert(&insert).unwrap()
        });
    });

    group.finish();
}

// Point lookups by random id
pub fn bench_select_by_id(c: &mut Criterion) {
    let mut group = c.benchmark_group("Executor");
    let executor = executor_with_records(PRELOAD_RECORDS);
    let mut rng = rand::thread_rng();

    group.bench_function("select_by_id", |b| {
        b.iter(|| {
            let id = rng.gen_range(1..=PRELOAD_RECORDS);
            let select = redirect(&Query::select_by_id(id), Some(TABLE)).unwrap();
            executor.query_records(&select).unwrap()
        });
    });

    group.finish();
}

// Full ordered scan of the preloaded table
pub fn bench_select_ordered(c: &mut Criterion) {
    let mut group = c.benchmark_group("Executor");
    let executor = executor_with_records(PRELOAD_RECORDS);
    let order = OrderBy::new(SortColumn::Stock, SortDirection::Descending);
    let select = redirect(&Query::select_ordered(order), Some(TABLE)).unwrap();

    group.bench_function("select_ordered", |b| {
        b.iter(|| executor.query_records(&select).unwrap());
    });

    group.finish();
}

// Updates against random ids
pub fn bench_update_stock(c: &mut Criterion) {
    let mut group = c.benchmark_group("Executor");
    let executor = executor_with_records(PRELOAD_RECORDS);
    let mut rng = rand::thread_rng();

    group.bench_function("update_stock", |b| {
        b.iter(|| {
            let id = rng.gen_range(1..=PRELOAD_RECORDS);
            let update = redirect(&Query::update_stock(id, rng.gen_range(0..500)), Some(TABLE)).unwrap();
            executor.execute_update(&update).unwrap()
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_insert,
    bench_select_by_id,
    bench_select_ordered,
    bench_update_stock
);
criterion_main!(benches);
