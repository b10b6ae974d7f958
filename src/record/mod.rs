//! Record model
//!
//! One row of a book table. Rows travel between the engine and callers in
//! a fixed field order: identifier, name, stock.

use crate::types::{DEFAULT_BOOK_NAME, RecordId, Value};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while decoding an engine row into a [`Book`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Row does not have the three book columns
    #[error("Expected 3 columns, found {0}")]
    ColumnCount(usize),
    /// Column value has the wrong type or is NULL where a value is required
    #[error("Unexpected value for column {column}: {value}")]
    UnexpectedValue { column: &'static str, value: Value },
    /// Stored stock is below zero
    #[error("Negative stock value: {0}")]
    NegativeStock(i64),
}

/// Result type for record decoding
pub type RecordResult<T> = Result<T, RecordError>;

/// A stored book entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    id: RecordId,
    name: String,
    stock: u32,
}

impl Book {
    pub fn new(id: RecordId, name: impl Into<String>, stock: u32) -> Self {
        Self {
            id,
            name: name.into(),
            stock,
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    /// Decode an engine row laid out as (BOOK_ID, BOOK_NAME, BOOK_STOCK)
    ///
    /// A NULL name decodes to the default name.
    pub fn from_row(row: &[Value]) -> RecordResult<Self> {
        let [id, name, stock] = row else {
            return Err(RecordError::ColumnCount(row.len()));
        };

        let id = id
            .as_integer()
            .and_then(|n| RecordId::try_from(n).ok())
            .ok_or_else(|| RecordError::UnexpectedValue {
                column: "id",
                value: id.clone(),
            })?;

        let name = match name {
            Value::Text(s) => s.clone(),
            Value::Null => DEFAULT_BOOK_NAME.to_string(),
            other => {
                return Err(RecordError::UnexpectedValue {
                    column: "name",
                    value: other.clone(),
                });
            }
        };

        let raw_stock = stock.as_integer().ok_or_else(|| RecordError::UnexpectedValue {
            column: "stock",
            value: stock.clone(),
        })?;
        if raw_stock < 0 {
            return Err(RecordError::NegativeStock(raw_stock));
        }
        let stock = u32::try_from(raw_stock).map_err(|_| RecordError::UnexpectedValue {
            column: "stock",
            value: Value::Integer(raw_stock),
        })?;

        Ok(Self { id, name, stock })
    }

    /// Values in stable field order
    pub fn to_row(&self) -> Vec<Value> {
        vec![
            Value::from(self.id),
            Value::Text(self.name.clone()),
            Value::from(self.stock),
        ]
    }
}

/// A book that has not been stored yet; the engine assigns its identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    name: String,
    stock: u32,
}

impl NewBook {
    /// Build a new entry, falling back to the default name when none is given
    pub fn new(name: Option<&str>, stock: u32) -> Self {
        Self {
            name: name.unwrap_or(DEFAULT_BOOK_NAME).to_string(),
            stock,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }
}
