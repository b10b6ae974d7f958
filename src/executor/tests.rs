use super::*;
use crate::query::{OrderBy, Query, SortColumn, SortDirection};
use crate::redirect::redirect;
use crate::storage::{MemoryEngine, StorageError, StorageResult};
use crate::types::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

const TABLE: &str = "Books_0";

fn bind(query: Query) -> BoundStatement {
    redirect(&query, Some(TABLE)).unwrap()
}

fn setup() -> (Arc<MemoryEngine>, Executor) {
    let engine = Arc::new(MemoryEngine::new());
    let executor = Executor::new(engine.clone());
    executor.execute_ddl(&bind(Query::create_table())).unwrap();
    (engine, executor)
}

fn snapshot(executor: &Executor) -> Vec<Book> {
    executor.query_records(&bind(Query::select_all())).unwrap()
}

/// Wraps the memory engine and fails commits on demand
struct FlakyEngine {
    inner: MemoryEngine,
    fail_commit: AtomicBool,
    rollbacks: AtomicUsize,
    released: AtomicUsize,
}

impl FlakyEngine {
    fn new() -> Self {
        Self {
            inner: MemoryEngine::new(),
            fail_commit: AtomicBool::new(false),
            rollbacks: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
        }
    }
}

struct FlakySession<'a> {
    inner: Box<dyn Session + 'a>,
    engine: &'a FlakyEngine,
}

impl StorageEngine for FlakyEngine {
    fn open_session(&self) -> StorageResult<Box<dyn Session + '_>> {
        Ok(Box::new(FlakySession {
            inner: self.inner.open_session()?,
            engine: self,
        }))
    }

    fn name(&self) -> &str {
        "flaky"
    }

    fn shutdown(&self) {
        self.inner.shutdown();
    }
}

impl Session for FlakySession<'_> {
    fn begin(&mut self) -> StorageResult<()> {
        self.inner.begin()
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> StorageResult<ResultSet> {
        self.inner.execute(sql, params)
    }

    fn commit(&mut self) -> StorageResult<()> {
        if self.engine.fail_commit.load(Ordering::SeqCst) {
            return Err(StorageError::Transaction("commit refused".to_string()));
        }
        self.inner.commit()
    }

    fn rollback(&mut self) -> StorageResult<()> {
        self.engine.rollbacks.fetch_add(1, Ordering::SeqCst);
        self.inner.rollback()
    }

    fn in_transaction(&self) -> bool {
        self.inner.in_transaction()
    }
}

impl Drop for FlakySession<'_> {
    fn drop(&mut self) {
        self.engine.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_insert_then_find() {
    let (_engine, executor) = setup();
    let id = executor
        .execute_insert(&bind(Query::insert(Some("Alice"), 5)))
        .unwrap();
    assert_eq!(id, 1);

    let found = executor.query_records(&bind(Query::select_by_id(id))).unwrap();
    assert_eq!(found, vec![Book::new(1, "Alice", 5)]);

    let missing = executor.query_records(&bind(Query::select_by_id(99))).unwrap();
    assert!(missing.is_empty());
}

#[test]
fn test_insert_without_name_uses_default() {
    let (_engine, executor) = setup();
    let id = executor.execute_insert(&bind(Query::insert(None, 3))).unwrap();
    let found = executor.query_records(&bind(Query::select_by_id(id))).unwrap();
    assert_eq!(found[0].name(), "UNKNOWN");
    assert_eq!(found[0].stock(), 3);
}

#[test]
fn test_update_missing_entry_rolls_back() {
    let (_engine, executor) = setup();
    executor
        .execute_insert(&bind(Query::insert(Some("Alice"), 5)))
        .unwrap();
    let before = snapshot(&executor);

    let result = executor.execute_update(&bind(Query::update_stock(42, 9)));
    assert_eq!(
        result,
        Err(ExecError::NoRowsAffected {
            table: TABLE.to_string()
        })
    );
    let result = executor.execute_update(&bind(Query::delete(42)));
    assert!(matches!(result, Err(ExecError::NoRowsAffected { .. })));

    assert_eq!(snapshot(&executor), before);
}

#[test]
fn test_update_and_delete_existing_entry() {
    let (_engine, executor) = setup();
    let id = executor
        .execute_insert(&bind(Query::insert(Some("Alice"), 5)))
        .unwrap();

    assert_eq!(
        executor.execute_update(&bind(Query::update_name(id, "Alicia"))),
        Ok(1)
    );
    assert_eq!(
        executor.execute_update(&bind(Query::update_stock(id, 0))),
        Ok(1)
    );
    assert_eq!(snapshot(&executor), vec![Book::new(id, "Alicia", 0)]);

    assert_eq!(executor.execute_update(&bind(Query::delete(id))), Ok(1));
    assert!(snapshot(&executor).is_empty());
}

#[test]
fn test_storage_error_is_reported() {
    let (_engine, executor) = setup();
    let stmt = redirect(&Query::select_all(), Some("Books_404")).unwrap();
    let err = executor.query_records(&stmt).unwrap_err();
    assert!(matches!(
        err.storage_error(),
        Some(StorageError::TableNotFound(_))
    ));
}

#[test]
fn test_sessions_released_on_every_path() {
    let (engine, executor) = setup();
    executor
        .execute_insert(&bind(Query::insert(Some("a"), 1)))
        .unwrap();
    let _ = executor.execute_update(&bind(Query::delete(77)));
    let _ = executor.query_records(&redirect(&Query::select_all(), Some("Nope")).unwrap());

    assert_eq!(engine.active_sessions(), 0);
    assert_eq!(engine.sessions_opened(), 4);
}

#[test]
fn test_failed_closure_rolls_back_everything() {
    let (_engine, executor) = setup();
    let result: ExecResult<()> = executor.transaction(|session| {
        let insert = bind(Query::insert(Some("first"), 1));
        session
            .execute(insert.sql(), insert.params())
            .map_err(|e| ExecError::storage(insert.sql(), e))?;
        Err(ExecError::UnexpectedResult("abort".to_string()))
    });
    assert!(result.is_err());
    assert!(snapshot(&executor).is_empty());
}

#[test]
fn test_failed_commit_rolls_back_and_releases() {
    let engine = Arc::new(FlakyEngine::new());
    let executor = Executor::new(engine.clone());
    executor.execute_ddl(&bind(Query::create_table())).unwrap();

    engine.fail_commit.store(true, Ordering::SeqCst);
    let result = executor.execute_insert(&bind(Query::insert(Some("lost"), 1)));
    assert!(matches!(
        result,
        Err(ExecError::Storage { ref statement, .. }) if statement == "COMMIT"
    ));
    assert_eq!(engine.rollbacks.load(Ordering::SeqCst), 1);

    engine.fail_commit.store(false, Ordering::SeqCst);
    assert!(snapshot(&executor).is_empty());
    assert_eq!(engine.released.load(Ordering::SeqCst), 3);
    assert_eq!(engine.inner.active_sessions(), 0);
}

#[test]
fn test_ordered_query_and_count() {
    let (_engine, executor) = setup();
    for (name, stock) in [("b", 4), ("a", 4), ("c", 9)] {
        executor
            .execute_insert(&bind(Query::insert(Some(name), stock)))
            .unwrap();
    }

    let by_stock = executor
        .query_records(&bind(Query::select_ordered(OrderBy::new(
            SortColumn::Stock,
            SortDirection::Descending,
        ))))
        .unwrap();
    let ids: Vec<RecordId> = by_stock.iter().map(Book::id).collect();
    assert_eq!(ids, vec![3, 1, 2]);

    let by_name = executor
        .query_records(&bind(Query::select_ordered(OrderBy::new(
            SortColumn::Name,
            SortDirection::Ascending,
        ))))
        .unwrap();
    let names: Vec<&str> = by_name.iter().map(Book::name).collect();
    assert_eq!(names, vec!["a", "b", "c"]);

    assert_eq!(executor.query_count(&bind(Query::count())), Ok(3));
}

#[test]
fn test_closed_engine_reports_error() {
    let (engine, executor) = setup();
    engine.shutdown();
    let err = executor.query_count(&bind(Query::count())).unwrap_err();
    assert_eq!(err.storage_error(), Some(&StorageError::EngineClosed));
}
