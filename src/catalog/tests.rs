use super::*;
use std::sync::Arc;
use std::thread;

fn ok(_: &str) -> CatalogResult<()> {
    Ok(())
}

fn new_catalog() -> Catalog {
    Catalog::new("Books_", 0).unwrap()
}

#[test]
fn test_catalog_mints_sequential_names() {
    let catalog = new_catalog();
    assert_eq!(catalog.peek_next_index(), 0);

    assert_eq!(catalog.create_table(ok).unwrap(), "Books_0");
    assert_eq!(catalog.create_table(ok).unwrap(), "Books_1");
    assert_eq!(catalog.peek_next_index(), 2);
    assert_eq!(catalog.table_count(), 2);
}

#[test]
fn test_catalog_failed_create_leaves_state() {
    let catalog = new_catalog();
    let result: CatalogResult<String> =
        catalog.create_table(|_| Err(CatalogError::InvalidArgument("engine down".to_string())));
    assert!(result.is_err());
    assert_eq!(catalog.peek_next_index(), 0);
    assert_eq!(catalog.table_count(), 0);

    assert_eq!(catalog.create_table(ok).unwrap(), "Books_0");
}

#[test]
fn test_catalog_select_table() {
    let catalog = new_catalog();
    let name = catalog.create_table(ok).unwrap();
    assert_eq!(catalog.current_table_name(), None);

    catalog.select_table(&name).unwrap();
    assert_eq!(catalog.current_table_name(), Some(name.clone()));

    let result = catalog.select_table("Books_42");
    assert!(matches!(result, Err(CatalogError::TableNotFound(_))));
    assert_eq!(catalog.current_table_name(), Some(name));
}

#[test]
fn test_catalog_select_is_exact() {
    let catalog = new_catalog();
    catalog.create_table(ok).unwrap();
    assert!(catalog.select_table("books_0").is_err());
    assert!(catalog.select_table("").is_err());
    assert_eq!(catalog.current_table_name(), None);
}

#[test]
fn test_catalog_drop_current_table() {
    let catalog = new_catalog();
    let name = catalog.create_table(ok).unwrap();
    catalog.select_table(&name).unwrap();

    let dropped = catalog.drop_current_table(ok).unwrap();
    assert_eq!(dropped, name);
    assert!(!catalog.table_exists(&name));
    assert_eq!(catalog.current_table_name(), None);

    // Names are never reused after a drop
    assert_eq!(catalog.create_table(ok).unwrap(), "Books_1");
}

#[test]
fn test_catalog_drop_without_selection() {
    let catalog = new_catalog();
    catalog.create_table(ok).unwrap();

    let mut touched = false;
    let result: CatalogResult<String> = catalog.drop_current_table(|_| {
        touched = true;
        Ok(())
    });
    assert_eq!(result, Err(CatalogError::NoTableSelected));
    assert!(!touched);
    assert_eq!(catalog.table_count(), 1);
}

#[test]
fn test_catalog_failed_drop_keeps_table() {
    let catalog = new_catalog();
    let name = catalog.create_table(ok).unwrap();
    catalog.select_table(&name).unwrap();

    let result: CatalogResult<String> =
        catalog.drop_current_table(|_| Err(CatalogError::InvalidArgument("locked".to_string())));
    assert!(result.is_err());
    assert!(catalog.table_exists(&name));
    assert_eq!(catalog.current_table_name(), Some(name));
}

#[test]
fn test_catalog_list_tables_in_creation_order() {
    let catalog = new_catalog();
    for _ in 0..12 {
        catalog.create_table(ok).unwrap();
    }

    let names: Vec<String> = catalog
        .list_tables()
        .iter()
        .map(|entry| entry.name().to_string())
        .collect();
    assert_eq!(names.len(), 12);
    assert_eq!(names[0], "Books_0");
    assert_eq!(names[2], "Books_2");
    assert_eq!(names[11], "Books_11");
}

#[test]
fn test_catalog_require_current() {
    let catalog = new_catalog();
    assert_eq!(catalog.require_current(), Err(CatalogError::NoTableSelected));

    let name = catalog.create_table(ok).unwrap();
    catalog.select_table(&name).unwrap();
    assert_eq!(catalog.require_current(), Ok(name));
}

#[test]
fn test_catalog_custom_prefix_and_start() {
    let catalog = Catalog::new("Shelf_", 7).unwrap();
    assert_eq!(catalog.create_table(ok).unwrap(), "Shelf_7");
}

#[test]
fn test_catalog_rejects_bad_prefix() {
    assert!(matches!(
        Catalog::new("", 0),
        Err(CatalogError::InvalidArgument(_))
    ));
    assert!(Catalog::new("1books", 0).is_err());
    assert!(Catalog::new("Books-", 0).is_err());
    assert!(Catalog::new("Books; DROP", 0).is_err());
}

#[test]
fn test_catalog_concurrent_creates_unique() {
    let catalog = Arc::new(new_catalog());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let catalog = Arc::clone(&catalog);
            thread::spawn(move || {
                (0..10)
                    .map(|_| catalog.create_table(ok).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut all = Vec::new();
    for handle in handles {
        all.extend(handle.join().unwrap());
    }
    all.sort();
    all.dedup();
    assert_eq!(all.len(), 80);
    assert_eq!(catalog.peek_next_index(), 80);
}

#[test]
fn test_catalog_exhausted_counter_is_rejected() {
    let catalog = Catalog::new("Books_", u64::MAX).unwrap();

    let mut touched = false;
    let result: CatalogResult<String> = catalog.create_table(|_| {
        touched = true;
        Ok(())
    });
    assert!(matches!(result, Err(CatalogError::InvalidArgument(_))));
    assert!(!touched);
    assert_eq!(catalog.table_count(), 0);
    assert_eq!(catalog.peek_next_index(), u64::MAX);
}

#[test]
fn test_catalog_last_index_is_usable() {
    let catalog = Catalog::new("Books_", u64::MAX - 1).unwrap();
    let name = catalog.create_table(ok).unwrap();
    assert_eq!(name, format!("Books_{}", u64::MAX - 1));
    assert!(catalog.create_table(ok).is_err());
    assert_eq!(catalog.list_tables().len(), 1);
}
