use crate::catalog::error::{CatalogError, CatalogResult};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;

pub mod error;

/// A registered table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    name: String,
    index: u64,
}

impl TableEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Counter value the name was minted from
    pub fn index(&self) -> u64 {
        self.index
    }
}

/// Table registry
///
/// Tracks which tables exist, which one is selected, and mints new table
/// names from a counter that only moves forward. Storage work (creating or
/// dropping the physical table) is supplied by the caller as a closure, and
/// the registry only changes its own state when that work succeeds.
pub struct Catalog {
    prefix: String,
    name_cache: RwLock<HashMap<String, TableEntry>>,
    next_index: Mutex<u64>,
    current: RwLock<Option<String>>,
}

impl Catalog {
    pub fn new(prefix: impl Into<String>, first_index: u64) -> CatalogResult<Self> {
        let prefix = prefix.into();
        let valid = prefix
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(CatalogError::InvalidArgument(format!(
                "table prefix must be an identifier: {:?}",
                prefix
            )));
        }

        Ok(Self {
            prefix,
            name_cache: RwLock::new(HashMap::new()),
            next_index: Mutex::new(first_index),
            current: RwLock::new(None),
        })
    }

    /// Counter value the next `create_table` call will mint from
    pub fn peek_next_index(&self) -> u64 {
        *self.next_index.lock()
    }

    fn table_name(&self, index: u64) -> String {
        format!("{}{}", self.prefix, index)
    }

    /// Mint a new table name and register it once `materialize` succeeds
    ///
    /// On failure the counter is not advanced and nothing is registered.
    /// An exhausted counter is rejected before `materialize` runs.
    pub fn create_table<F, E>(&self, materialize: F) -> Result<String, E>
    where
        F: FnOnce(&str) -> Result<(), E>,
        E: From<CatalogError>,
    {
        let mut next = self.next_index.lock();
        let index = *next;
        let following = index.checked_add(1).ok_or_else(|| {
            CatalogError::InvalidArgument("table index exhausted".to_string())
        })?;
        let name = self.table_name(index);

        if self.name_cache.read().contains_key(&name) {
            return Err(CatalogError::TableAlreadyExists(name).into());
        }

        materialize(&name)?;

        self.name_cache.write().insert(
            name.clone(),
            TableEntry {
                name: name.clone(),
                index,
            },
        );
        *next = following;

        tracing::info!(table = %name, "table created");
        Ok(name)
    }

    /// Make `name` the current table; unknown names leave the selection as is
    pub fn select_table(&self, name: &str) -> CatalogResult<()> {
        let mut current = self.current.write();
        if !self.name_cache.read().contains_key(name) {
            return Err(CatalogError::TableNotFound(name.to_string()));
        }
        *current = Some(name.to_string());
        tracing::debug!(table = name, "table selected");
        Ok(())
    }

    /// Drop the current table through `destroy`, then unregister it
    ///
    /// The selection is cleared on success; the returned name tells the
    /// caller which table went away. Nothing is touched when no registered
    /// table is selected.
    pub fn drop_current_table<F, E>(&self, destroy: F) -> Result<String, E>
    where
        F: FnOnce(&str) -> Result<(), E>,
        E: From<CatalogError>,
    {
        let mut current = self.current.write();
        let name = current.clone().ok_or(CatalogError::NoTableSelected)?;
        if !self.name_cache.read().contains_key(&name) {
            return Err(CatalogError::TableDoesNotExist(name).into());
        }

        destroy(&name)?;

        self.name_cache.write().remove(&name);
        *current = None;
        tracing::info!(table = %name, "table dropped, selection cleared");
        Ok(name)
    }

    /// Registered tables in creation order
    pub fn list_tables(&self) -> Vec<TableEntry> {
        let mut entries: Vec<TableEntry> = self.name_cache.read().values().cloned().collect();
        entries.sort_by_key(|entry| entry.index);
        entries
    }

    pub fn current_table_name(&self) -> Option<String> {
        self.current.read().clone()
    }

    /// Current table, or the reason there is none
    pub fn require_current(&self) -> CatalogResult<String> {
        let current = self.current.read();
        let name = current.as_ref().ok_or(CatalogError::NoTableSelected)?;
        if !self.name_cache.read().contains_key(name) {
            return Err(CatalogError::TableDoesNotExist(name.clone()));
        }
        Ok(name.clone())
    }

    pub fn table_exists(&self, name: &str) -> bool {
        self.name_cache.read().contains_key(name)
    }

    pub fn table_count(&self) -> usize {
        self.name_cache.read().len()
    }
}
