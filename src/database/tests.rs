use super::*;
use crate::catalog::error::CatalogError;
use crate::executor::ExecError;
use crate::query::{OrderBy, OrderSpec, QueryError, SortColumn, SortDirection};
use crate::redirect::RedirectError;
use crate::storage::StorageError;
use crate::table::Table;

fn open() -> Database {
    Database::open(Config::default()).unwrap()
}

fn open_with_table() -> (Database, String) {
    let db = open();
    let name = db.create_table().unwrap();
    db.select_table(&name).unwrap();
    (db, name)
}

fn ordered(column: SortColumn, direction: SortDirection) -> SelectMode {
    SelectMode::Ordered(OrderBy::new(column, direction).into())
}

#[test]
fn test_create_does_not_select() {
    let db = open();
    assert_eq!(db.create_table().unwrap(), "Books_0");
    assert_eq!(db.current_table_name(), None);
    assert_eq!(db.create_table().unwrap(), "Books_1");
}

#[test]
fn test_record_operations_need_selection() {
    let db = open();
    db.create_table().unwrap();
    assert_eq!(
        db.insert_entry(Some("x"), 1),
        Err(DatabaseError::Catalog(CatalogError::NoTableSelected))
    );
    assert!(db.select_entries(SelectMode::All).is_err());
    assert!(db.delete_entry(1).is_err());
}

#[test]
fn test_select_unknown_table_keeps_selection() {
    let (db, name) = open_with_table();
    let result = db.select_table("Books_99");
    assert!(matches!(
        result,
        Err(DatabaseError::Catalog(CatalogError::TableNotFound(_)))
    ));
    assert_eq!(db.current_table_name(), Some(name));
}

#[test]
fn test_insert_and_find() {
    let (db, _) = open_with_table();
    let alice = db.insert_entry(Some("Alice"), 5).unwrap();
    let unnamed = db.insert_entry(None, 3).unwrap();
    assert_eq!((alice, unnamed), (1, 2));

    assert_eq!(db.find_entry(alice).unwrap(), Some(Book::new(1, "Alice", 5)));
    assert_eq!(db.find_entry(unnamed).unwrap(), Some(Book::new(2, "UNKNOWN", 3)));
    assert_eq!(db.find_entry(3).unwrap(), None);
}

#[test]
fn test_edit_entries() {
    let (db, _) = open_with_table();
    let id = db.insert_entry(Some("Draft"), 1).unwrap();
    db.update_entry_name(id, "Final").unwrap();
    db.update_entry_stock(id, 40).unwrap();
    assert_eq!(db.find_entry(id).unwrap(), Some(Book::new(id, "Final", 40)));
}

#[test]
fn test_missing_entry_changes_nothing() {
    let (db, name) = open_with_table();
    db.insert_entry(Some("Alice"), 5).unwrap();
    db.insert_entry(Some("Bob"), 2).unwrap();
    let before = db.select_entries(SelectMode::All).unwrap();

    let expected = Err(DatabaseError::Exec(ExecError::NoRowsAffected { table: name }));
    assert_eq!(db.update_entry_name(9, "x"), expected);
    assert_eq!(db.update_entry_stock(9, 1), expected);
    assert_eq!(db.delete_entry(9), expected);

    assert_eq!(db.select_entries(SelectMode::All).unwrap(), before);
}

#[test]
fn test_ordered_selects() {
    let (db, _) = open_with_table();
    for (name, stock) in [("delta", 3), ("alpha", 8), ("charlie", 3), ("bravo", 1)] {
        db.insert_entry(Some(name), stock).unwrap();
    }

    let stocks: Vec<u32> = db
        .select_entries(ordered(SortColumn::Stock, SortDirection::Descending))
        .unwrap()
        .iter()
        .map(Book::stock)
        .collect();
    assert_eq!(stocks, vec![8, 3, 3, 1]);

    let names: Vec<String> = db
        .select_entries(ordered(SortColumn::Name, SortDirection::Descending))
        .unwrap()
        .into_iter()
        .map(|book| book.name().to_string())
        .collect();
    assert_eq!(names, vec!["delta", "charlie", "bravo", "alpha"]);

    // Ties are broken the same way every time
    let first = db
        .select_entries(ordered(SortColumn::Stock, SortDirection::Ascending))
        .unwrap();
    let second = db
        .select_entries(ordered(SortColumn::Stock, SortDirection::Ascending))
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(first[1].id(), 1);
    assert_eq!(first[2].id(), 3);
}

#[test]
fn test_incomplete_ordering_not_executed() {
    let (db, _) = open_with_table();
    let mode = SelectMode::Ordered(OrderSpec::new(SortColumn::Stock, None));
    assert_eq!(
        db.select_entries(mode),
        Err(DatabaseError::Query(QueryError::IncompleteOrdering(
            SortColumn::Stock
        )))
    );
}

#[test]
fn test_drop_clears_selection() {
    let (db, name) = open_with_table();
    db.insert_entry(Some("gone"), 1).unwrap();

    assert_eq!(db.drop_current_table().unwrap(), name);
    assert_eq!(db.current_table_name(), None);
    assert!(db.list_tables().is_empty());
    assert_eq!(
        db.drop_current_table(),
        Err(DatabaseError::Catalog(CatalogError::NoTableSelected))
    );
    assert_eq!(db.create_table().unwrap(), "Books_1");
}

#[test]
fn test_list_tables_counts_and_marks_current() {
    let db = open();
    let first = db.create_table().unwrap();
    let second = db.create_table().unwrap();
    db.select_table(&second).unwrap();
    db.insert_entry(None, 1).unwrap();
    db.insert_entry(None, 2).unwrap();

    let listing = db.list_tables();
    assert_eq!(
        listing,
        vec![
            TableSummary {
                name: first,
                row_count: Ok(0),
                is_current: false,
            },
            TableSummary {
                name: second,
                row_count: Ok(2),
                is_current: true,
            },
        ]
    );
}

#[test]
fn test_list_tables_survives_failed_count() {
    let engine = Arc::new(MemoryEngine::new());
    let db = Database::with_engine(Config::default(), engine.clone()).unwrap();
    let first = db.create_table().unwrap();
    let second = db.create_table().unwrap();

    // Remove the first table behind the registry's back
    {
        let mut session = engine.open_session().unwrap();
        session.begin().unwrap();
        session.execute(&format!("DROP TABLE {}", first), &[]).unwrap();
        session.commit().unwrap();
    }

    let listing = db.list_tables();
    assert_eq!(listing.len(), 2);
    match &listing[0].row_count {
        Err(DatabaseError::Exec(err)) => {
            assert!(matches!(
                err.storage_error(),
                Some(StorageError::TableNotFound(_))
            ));
        }
        other => panic!("expected a failed count, got {:?}", other),
    }
    assert_eq!(listing[1].name, second);
    assert_eq!(listing[1].row_count, Ok(0));
}

#[test]
fn test_failed_create_does_not_advance() {
    let engine = Arc::new(MemoryEngine::new());
    let db = Database::with_engine(Config::default(), engine.clone()).unwrap();
    engine.shutdown();

    assert!(matches!(db.create_table(), Err(DatabaseError::Exec(_))));
    assert_eq!(db.catalog().peek_next_index(), 0);
    assert!(db.list_tables().is_empty());
}

#[test]
fn test_closed_engine_is_initialization_failure() {
    let engine = Arc::new(MemoryEngine::new());
    engine.shutdown();
    let result = Database::with_engine(Config::default(), engine);
    assert!(matches!(result, Err(DatabaseError::Initialization(_))));
}

#[test]
fn test_invalid_config_is_initialization_failure() {
    let config = Config {
        table_prefix: "bad prefix".to_string(),
        ..Config::default()
    };
    let err = Database::open(config).err().unwrap();
    assert!(err.is_fatal());
}

#[test]
fn test_custom_prefix() {
    let config = Config {
        table_prefix: "Shelf_".to_string(),
        first_table_index: 10,
        ..Config::default()
    };
    let db = Database::open(config).unwrap();
    assert_eq!(db.create_table().unwrap(), "Shelf_10");
}

#[test]
fn test_redirect_error_is_reported() {
    // Registered names are always valid identifiers, so exercise the
    // redirector directly through the error conversion
    let err = DatabaseError::from(RedirectError::NoTarget);
    assert_eq!(err.to_string(), "No table selected to run the statement against");
}

#[test]
fn test_tables_share_book_schema() {
    let engine = Arc::new(MemoryEngine::new());
    let db = Database::with_engine(Config::default(), engine.clone()).unwrap();
    for _ in 0..3 {
        let name = db.create_table().unwrap();
        let schema = engine.table_schema(&name).unwrap();
        assert!(schema.same_shape(&Table::book_schema(name)));
    }
}

#[test]
fn test_exhausted_table_counter_is_reported() {
    let engine = Arc::new(MemoryEngine::new());
    let config = Config {
        first_table_index: u64::MAX,
        ..Config::default()
    };
    let db = Database::with_engine(config, engine.clone()).unwrap();

    let result = db.create_table();
    assert!(matches!(
        result,
        Err(DatabaseError::Catalog(CatalogError::InvalidArgument(_)))
    ));
    assert!(db.list_tables().is_empty());
    assert_eq!(engine.table_count(), 0);
}

#[test]
fn test_largest_id_is_looked_up_exactly() {
    let (db, _) = open_with_table();
    db.insert_entry(Some("near the top"), 1).unwrap();
    assert_eq!(db.find_entry(RecordId::MAX).unwrap(), None);
    assert!(db.delete_entry(RecordId::MAX).is_err());
    assert_eq!(db.count_entries().unwrap(), 1);
}
