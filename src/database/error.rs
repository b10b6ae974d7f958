//! Database error definitions

use thiserror::Error;

use crate::catalog::error::CatalogError;
use crate::executor::ExecError;
use crate::query::QueryError;
use crate::redirect::RedirectError;

/// Errors surfaced by [`super::Database`]
///
/// Everything except [`DatabaseError::Initialization`] is recoverable and
/// leaves the database as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DatabaseError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Redirect(#[from] RedirectError),
    #[error(transparent)]
    Exec(#[from] ExecError),
    /// Storage could not be brought up
    #[error("Failed to initialize the database: {0}")]
    Initialization(String),
}

impl DatabaseError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, DatabaseError::Initialization(_))
    }
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_initialization_is_fatal() {
        assert!(DatabaseError::Initialization("no engine".to_string()).is_fatal());
        assert!(!DatabaseError::from(CatalogError::NoTableSelected).is_fatal());
        assert!(!DatabaseError::from(RedirectError::NoTarget).is_fatal());
    }

    #[test]
    fn test_messages_pass_through() {
        let err = DatabaseError::from(CatalogError::TableNotFound("Books_7".to_string()));
        assert_eq!(err.to_string(), "No such table available: Books_7");
    }
}
