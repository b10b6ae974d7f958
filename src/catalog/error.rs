//! Catalog error definitions

use thiserror::Error;

/// Catalog error types
///
/// Invalid-selection conditions of the table registry. All of them leave
/// the registry unchanged and can be corrected by the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Named table is not registered
    #[error("No such table available: {0}")]
    TableNotFound(String),
    /// No table is currently selected
    #[error("No table selected")]
    NoTableSelected,
    /// Selected table is no longer registered
    #[error("This table does not exist: {0}")]
    TableDoesNotExist(String),
    /// Minted name is already registered
    #[error("Table already exists: {0}")]
    TableAlreadyExists(String),
    /// Invalid argument provided
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
