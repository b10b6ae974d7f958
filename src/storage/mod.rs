//! Storage engine capability
//!
//! The registry and executor only talk to storage through these traits:
//! an engine hands out sessions, a session runs SQL statements inside a
//! begin/commit/rollback protocol. [`MemoryEngine`] is the in-process
//! implementation.

use crate::types::{RecordId, Value};

pub mod error;
pub mod memory;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryEngine;

/// Outcome of one executed statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultSet {
    /// Rows returned by a query, column names in table order
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    },
    /// Rows changed by INSERT/UPDATE/DELETE
    Affected {
        rows: u64,
        last_insert_id: Option<RecordId>,
    },
    /// DDL completed
    Empty,
}

impl ResultSet {
    /// Affected row count; 0 for queries and DDL
    pub fn affected_rows(&self) -> u64 {
        match self {
            ResultSet::Affected { rows, .. } => *rows,
            _ => 0,
        }
    }

    pub fn last_insert_id(&self) -> Option<RecordId> {
        match self {
            ResultSet::Affected { last_insert_id, .. } => *last_insert_id,
            _ => None,
        }
    }

    /// Consume into returned rows; empty for non-queries
    pub fn into_rows(self) -> Vec<Vec<Value>> {
        match self {
            ResultSet::Rows { rows, .. } => rows,
            _ => Vec::new(),
        }
    }
}

/// A storage engine that can open sessions
pub trait StorageEngine: Send + Sync {
    /// Open a fresh session; it is released when dropped
    fn open_session(&self) -> StorageResult<Box<dyn Session + '_>>;

    /// Short engine name for logs
    fn name(&self) -> &str;

    /// Discard all state; later sessions fail with [`StorageError::EngineClosed`]
    fn shutdown(&self);
}

/// One connection-scoped unit of work against the engine
///
/// Dropping a session with an open transaction rolls it back.
pub trait Session {
    fn begin(&mut self) -> StorageResult<()>;

    /// Parse and run one statement with positional `?` parameters
    fn execute(&mut self, sql: &str, params: &[Value]) -> StorageResult<ResultSet>;

    fn commit(&mut self) -> StorageResult<()>;

    fn rollback(&mut self) -> StorageResult<()>;

    /// Whether a transaction is open
    fn in_transaction(&self) -> bool;
}
