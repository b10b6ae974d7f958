//! Transactional executor
//!
//! Runs statements against a [`StorageEngine`] inside a transaction: a
//! fresh session per call, commit on success, rollback on any failure.
//! The session is released when it goes out of scope on every path.

use std::sync::Arc;

use crate::record::Book;
use crate::redirect::BoundStatement;
use crate::storage::{ResultSet, Session, StorageEngine};
use crate::types::RecordId;

pub mod error;

pub use error::{ExecError, ExecResult};

pub struct Executor {
    engine: Arc<dyn StorageEngine>,
}

impl Executor {
    pub fn new(engine: Arc<dyn StorageEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<dyn StorageEngine> {
        &self.engine
    }

    /// Run `f` inside one transaction
    ///
    /// Commits when `f` returns `Ok`. Rolls back when `f` or the commit
    /// fails, and returns that failure.
    pub fn transaction<F, T>(&self, f: F) -> ExecResult<T>
    where
        F: FnOnce(&mut dyn Session) -> ExecResult<T>,
    {
        let mut session = self
            .engine
            .open_session()
            .map_err(|e| ExecError::storage("OPEN SESSION", e))?;
        session
            .begin()
            .map_err(|e| ExecError::storage("BEGIN", e))?;
        tracing::debug!(engine = self.engine.name(), "transaction started");

        let outcome = match f(session.as_mut()) {
            Ok(value) => session
                .commit()
                .map(|()| value)
                .map_err(|e| ExecError::storage("COMMIT", e)),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(value) => {
                tracing::debug!("transaction committed");
                Ok(value)
            }
            Err(e) => {
                if session.in_transaction() {
                    if let Err(rb) = session.rollback() {
                        tracing::warn!(error = %rb, "rollback failed");
                    }
                }
                tracing::warn!(error = %e, "transaction rolled back");
                Err(e)
            }
        }
    }

    /// Run one statement in its own transaction
    pub fn execute(&self, stmt: &BoundStatement) -> ExecResult<ResultSet> {
        self.transaction(|session| run(session, stmt))
    }

    /// Run a statement that returns nothing (DDL)
    pub fn execute_ddl(&self, stmt: &BoundStatement) -> ExecResult<()> {
        self.execute(stmt).map(|_| ())
    }

    /// Insert one record and return its assigned id
    pub fn execute_insert(&self, stmt: &BoundStatement) -> ExecResult<RecordId> {
        self.transaction(|session| {
            run(session, stmt)?.last_insert_id().ok_or_else(|| {
                ExecError::UnexpectedResult(format!("no id assigned by {}", stmt.sql()))
            })
        })
    }

    /// Update or delete; matching nothing fails and rolls back
    pub fn execute_update(&self, stmt: &BoundStatement) -> ExecResult<u64> {
        self.transaction(|session| match run(session, stmt)?.affected_rows() {
            0 => Err(ExecError::NoRowsAffected {
                table: stmt.table().to_string(),
            }),
            rows => Ok(rows),
        })
    }

    /// Run a select and decode the rows as books, in returned order
    pub fn query_records(&self, stmt: &BoundStatement) -> ExecResult<Vec<Book>> {
        self.transaction(|session| match run(session, stmt)? {
            ResultSet::Rows { rows, .. } => rows
                .iter()
                .map(|row| Book::from_row(row).map_err(ExecError::from))
                .collect(),
            other => Err(ExecError::UnexpectedResult(format!(
                "expected rows, got {:?}",
                other
            ))),
        })
    }

    /// Run a `COUNT(*)` select
    pub fn query_count(&self, stmt: &BoundStatement) -> ExecResult<u64> {
        self.transaction(|session| {
            let rows = run(session, stmt)?.into_rows();
            rows.first()
                .and_then(|row| row.first())
                .and_then(|value| value.as_integer())
                .and_then(|n| u64::try_from(n).ok())
                .ok_or_else(|| ExecError::UnexpectedResult(format!("no count from {}", stmt.sql())))
        })
    }
}

fn run(session: &mut dyn Session, stmt: &BoundStatement) -> ExecResult<ResultSet> {
    tracing::debug!(sql = stmt.sql(), params = stmt.params().len(), "executing");
    session
        .execute(stmt.sql(), stmt.params())
        .map_err(|e| ExecError::storage(stmt.sql(), e))
}
