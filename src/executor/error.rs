//! Executor error definitions

use thiserror::Error;

use crate::record::RecordError;
use crate::storage::StorageError;

/// Failures of one transactional operation
///
/// Every variant means the transaction was rolled back and nothing it
/// attempted is visible.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    /// The engine refused or failed a statement
    #[error("{statement} failed: {source}")]
    Storage {
        statement: String,
        source: StorageError,
    },
    /// An update or delete matched no record
    #[error("No such entry in table {table}")]
    NoRowsAffected { table: String },
    /// The engine returned a result of the wrong shape
    #[error("Unexpected result: {0}")]
    UnexpectedResult(String),
    /// A returned row is not a book record
    #[error(transparent)]
    Decode(#[from] RecordError),
}

impl ExecError {
    pub(crate) fn storage(statement: impl Into<String>, source: StorageError) -> Self {
        ExecError::Storage {
            statement: statement.into(),
            source,
        }
    }

    /// Underlying engine error, if any
    pub fn storage_error(&self) -> Option<&StorageError> {
        match self {
            ExecError::Storage { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type for executor operations
pub type ExecResult<T> = Result<T, ExecError>;
