//! Storage engine error definitions

use crate::sql::SqlError;
use crate::types::{ColumnType, Value};
use thiserror::Error;

/// Storage engine error types
///
/// Represents every failure a statement can hit inside the engine:
/// malformed statements, missing tables, constraint violations, and
/// misuse of the session/transaction protocol.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Statement could not be parsed
    #[error(transparent)]
    Sql(#[from] SqlError),
    /// Table not found
    #[error("Table not found: {0}")]
    TableNotFound(String),
    /// Table already exists
    #[error("Table already exists: {0}")]
    TableAlreadyExists(String),
    /// Column not found in table
    #[error("Column not found: {0}")]
    ColumnNotFound(String),
    /// Value does not fit the column type
    #[error("Type mismatch for column {column}: expected {expected}, got {value}")]
    TypeMismatch {
        column: String,
        expected: ColumnType,
        value: Value,
    },
    /// NULL written to a NOT NULL column
    #[error("NULL not allowed for column {0}")]
    NotNull(String),
    /// Duplicate primary key
    #[error("Unique constraint violated on {column}: {value}")]
    DuplicateKey { column: String, value: Value },
    /// Wrong number of bound parameters
    #[error("Statement expects {expected} parameter(s), got {actual}")]
    ParameterCount { expected: usize, actual: usize },
    /// Invalid table definition
    #[error("Invalid table definition: {0}")]
    InvalidDefinition(String),
    /// Session used outside the begin/commit protocol
    #[error("Transaction error: {0}")]
    Transaction(String),
    /// Engine was shut down
    #[error("Storage engine is closed")]
    EngineClosed,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::TableNotFound("Books_3".to_string());
        assert_eq!(err.to_string(), "Table not found: Books_3");

        let err = StorageError::ParameterCount {
            expected: 2,
            actual: 1,
        };
        assert_eq!(err.to_string(), "Statement expects 2 parameter(s), got 1");
    }

    #[test]
    fn test_storage_error_from_sql() {
        let err: StorageError = SqlError::SyntaxError("Expected FROM".to_string()).into();
        assert_eq!(err.to_string(), "Syntax error: Expected FROM");
    }
}
