//! Query template engine
//!
//! Every statement is written once against the [`TABLE_PLACEHOLDER`]
//! designator and carries its parameters alongside the text. Templates are
//! turned into runnable statements by [`crate::redirect`].

use std::fmt;

use thiserror::Error;

use crate::record::NewBook;
use crate::types::{ID_COLUMN, NAME_COLUMN, RecordId, STOCK_COLUMN, TABLE_PLACEHOLDER, Value};

/// Query template error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// An order-by column was chosen but no direction
    #[error("Ordering by {0} was not completed with a direction")]
    IncompleteOrdering(SortColumn),
}

/// Result type for template construction
pub type QueryResult<T> = Result<T, QueryError>;

/// A statement template with positional parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    sql: String,
    params: Vec<Value>,
}

impl Query {
    fn new(sql: String, params: Vec<Value>) -> Self {
        Self { sql, params }
    }

    /// Template text, still naming the placeholder table
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Fixed three-column book schema, idempotent
    pub fn create_table() -> Self {
        Self::new(
            format!(
                "CREATE TABLE IF NOT EXISTS {} ({} BIGINT PRIMARY KEY AUTO_INCREMENT, {} VARCHAR(255), {} INTEGER)",
                TABLE_PLACEHOLDER, ID_COLUMN, NAME_COLUMN, STOCK_COLUMN
            ),
            Vec::new(),
        )
    }

    /// Idempotent drop
    pub fn drop_table() -> Self {
        Self::new(
            format!("DROP TABLE IF EXISTS {}", TABLE_PLACEHOLDER),
            Vec::new(),
        )
    }

    /// Insert a record; a missing name is stored as `UNKNOWN`
    pub fn insert(name: Option<&str>, stock: u32) -> Self {
        Self::insert_book(&NewBook::new(name, stock))
    }

    pub fn insert_book(book: &NewBook) -> Self {
        Self::new(
            format!(
                "INSERT INTO {} ({}, {}) VALUES (?, ?)",
                TABLE_PLACEHOLDER, NAME_COLUMN, STOCK_COLUMN
            ),
            vec![Value::from(book.name()), Value::from(book.stock())],
        )
    }

    pub fn select_by_id(id: RecordId) -> Self {
        Self::new(
            format!(
                "SELECT * FROM {} WHERE {} = ?",
                TABLE_PLACEHOLDER, ID_COLUMN
            ),
            vec![Value::from(id)],
        )
    }

    pub fn select_all() -> Self {
        Self::new(
            format!("SELECT * FROM {}", TABLE_PLACEHOLDER),
            Vec::new(),
        )
    }

    /// All records ordered by `order`, ties broken by ascending id
    pub fn select_ordered(order: OrderBy) -> Self {
        Self::new(
            format!(
                "SELECT * FROM {} ORDER BY {} {}, {} ASC",
                TABLE_PLACEHOLDER,
                order.column.column_name(),
                order.direction.keyword(),
                ID_COLUMN
            ),
            Vec::new(),
        )
    }

    /// Select-all, optionally ordered
    ///
    /// An ordering with a column but no direction is rejected rather than
    /// falling back to the default order.
    pub fn select(mode: SelectMode) -> QueryResult<Self> {
        match mode {
            SelectMode::All => Ok(Self::select_all()),
            SelectMode::Ordered(spec) => Ok(Self::select_ordered(spec.complete()?)),
        }
    }

    pub fn update_name(id: RecordId, name: &str) -> Self {
        Self::new(
            format!(
                "UPDATE {} SET {} = ? WHERE {} = ?",
                TABLE_PLACEHOLDER, NAME_COLUMN, ID_COLUMN
            ),
            vec![Value::from(name), Value::from(id)],
        )
    }

    pub fn update_stock(id: RecordId, stock: u32) -> Self {
        Self::new(
            format!(
                "UPDATE {} SET {} = ? WHERE {} = ?",
                TABLE_PLACEHOLDER, STOCK_COLUMN, ID_COLUMN
            ),
            vec![Value::from(stock), Value::from(id)],
        )
    }

    pub fn delete(id: RecordId) -> Self {
        Self::new(
            format!(
                "DELETE FROM {} WHERE {} = ?",
                TABLE_PLACEHOLDER, ID_COLUMN
            ),
            vec![Value::from(id)],
        )
    }

    /// Row count of the table
    pub fn count() -> Self {
        Self::new(
            format!("SELECT COUNT(*) AS total FROM {}", TABLE_PLACEHOLDER),
            Vec::new(),
        )
    }
}

/// Column a select can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortColumn {
    Name,
    Stock,
}

impl SortColumn {
    pub fn column_name(&self) -> &'static str {
        match self {
            SortColumn::Name => NAME_COLUMN,
            SortColumn::Stock => STOCK_COLUMN,
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortColumn::Name => write!(f, "name"),
            SortColumn::Stock => write!(f, "stock"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// A completed ordering choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }
}

/// An ordering choice as collected from the caller, possibly unfinished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSpec {
    pub column: SortColumn,
    pub direction: Option<SortDirection>,
}

impl OrderSpec {
    pub fn new(column: SortColumn, direction: Option<SortDirection>) -> Self {
        Self { column, direction }
    }

    pub fn complete(self) -> QueryResult<OrderBy> {
        self.direction
            .map(|direction| OrderBy::new(self.column, direction))
            .ok_or(QueryError::IncompleteOrdering(self.column))
    }
}

impl From<OrderBy> for OrderSpec {
    fn from(order: OrderBy) -> Self {
        Self::new(order.column, Some(order.direction))
    }
}

/// How records are listed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectMode {
    /// Storage order
    #[default]
    All,
    Ordered(OrderSpec),
}
