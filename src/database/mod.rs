//! Database facade
//!
//! Owns the storage engine, the table registry and the executor, and
//! exposes the table lifecycle and record operations against the
//! currently selected table.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::executor::Executor;
use crate::query::{Query, SelectMode};
use crate::record::Book;
use crate::redirect::{BoundStatement, redirect};
use crate::storage::{MemoryEngine, StorageEngine};
use crate::types::RecordId;

pub mod error;

pub use error::{DatabaseError, DatabaseResult};

/// One row of the table listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    pub name: String,
    /// Counted independently per table
    pub row_count: DatabaseResult<u64>,
    pub is_current: bool,
}

pub struct Database {
    config: Config,
    catalog: Catalog,
    executor: Executor,
}

impl Database {
    /// Open over a fresh in-memory engine
    pub fn open(config: Config) -> DatabaseResult<Self> {
        Self::with_engine(config, Arc::new(MemoryEngine::new()))
    }

    pub fn with_engine(config: Config, engine: Arc<dyn StorageEngine>) -> DatabaseResult<Self> {
        config
            .validate()
            .map_err(|e| DatabaseError::Initialization(e.to_string()))?;
        let catalog = Catalog::new(config.table_prefix.clone(), config.first_table_index)
            .map_err(|e| DatabaseError::Initialization(e.to_string()))?;

        // The engine must be able to hand out a session before we accept work
        engine
            .open_session()
            .map_err(|e| DatabaseError::Initialization(e.to_string()))?;

        tracing::info!(engine = engine.name(), prefix = %config.table_prefix, "database opened");
        Ok(Self {
            config,
            catalog,
            executor: Executor::new(engine),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Create the next table; the selection is not changed
    pub fn create_table(&self) -> DatabaseResult<String> {
        self.catalog.create_table(|name| -> DatabaseResult<()> {
            let stmt = redirect(&Query::create_table(), Some(name))?;
            self.executor.execute_ddl(&stmt)?;
            Ok(())
        })
    }

    pub fn select_table(&self, name: &str) -> DatabaseResult<()> {
        if let Err(e) = self.catalog.select_table(name) {
            tracing::warn!(table = name, "select rejected");
            return Err(e.into());
        }
        Ok(())
    }

    /// Drop the selected table and clear the selection
    pub fn drop_current_table(&self) -> DatabaseResult<String> {
        self.catalog.drop_current_table(|name| -> DatabaseResult<()> {
            let stmt = redirect(&Query::drop_table(), Some(name))?;
            self.executor.execute_ddl(&stmt)?;
            Ok(())
        })
    }

    /// Every table with its row count, in creation order
    pub fn list_tables(&self) -> Vec<TableSummary> {
        let current = self.catalog.current_table_name();
        self.catalog
            .list_tables()
            .into_iter()
            .map(|entry| {
                let row_count = redirect(&Query::count(), Some(entry.name()))
                    .map_err(DatabaseError::from)
                    .and_then(|stmt| Ok(self.executor.query_count(&stmt)?));
                if let Err(e) = &row_count {
                    tracing::warn!(table = entry.name(), error = %e, "row count failed");
                }
                TableSummary {
                    is_current: current.as_deref() == Some(entry.name()),
                    name: entry.name().to_string(),
                    row_count,
                }
            })
            .collect()
    }

    pub fn current_table_name(&self) -> Option<String> {
        self.catalog.current_table_name()
    }

    fn bind(&self, query: &Query) -> DatabaseResult<BoundStatement> {
        let current = self.catalog.require_current()?;
        Ok(redirect(query, Some(&current))?)
    }

    /// Add a record to the selected table, returning its id
    pub fn insert_entry(&self, name: Option<&str>, stock: u32) -> DatabaseResult<RecordId> {
        let stmt = self.bind(&Query::insert(name, stock))?;
        let id = self.executor.execute_insert(&stmt)?;
        tracing::debug!(table = stmt.table(), id, "entry added");
        Ok(id)
    }

    pub fn find_entry(&self, id: RecordId) -> DatabaseResult<Option<Book>> {
        let stmt = self.bind(&Query::select_by_id(id))?;
        Ok(self.executor.query_records(&stmt)?.into_iter().next())
    }

    pub fn update_entry_name(&self, id: RecordId, name: &str) -> DatabaseResult<()> {
        let stmt = self.bind(&Query::update_name(id, name))?;
        self.executor.execute_update(&stmt)?;
        Ok(())
    }

    pub fn update_entry_stock(&self, id: RecordId, stock: u32) -> DatabaseResult<()> {
        let stmt = self.bind(&Query::update_stock(id, stock))?;
        self.executor.execute_update(&stmt)?;
        Ok(())
    }

    pub fn delete_entry(&self, id: RecordId) -> DatabaseResult<()> {
        let stmt = self.bind(&Query::delete(id))?;
        self.executor.execute_update(&stmt)?;
        Ok(())
    }

    /// Records of the selected table
    ///
    /// An ordering without a direction is rejected before anything runs.
    pub fn select_entries(&self, mode: SelectMode) -> DatabaseResult<Vec<Book>> {
        let query = Query::select(mode)?;
        let stmt = self.bind(&query)?;
        Ok(self.executor.query_records(&stmt)?)
    }

    pub fn count_entries(&self) -> DatabaseResult<u64> {
        let stmt = self.bind(&Query::count())?;
        Ok(self.executor.query_count(&stmt)?)
    }

    /// Discard every table; later storage calls fail
    pub fn shutdown(&self) {
        self.executor.engine().shutdown();
        tracing::info!("database shut down");
    }
}
