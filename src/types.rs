//! Global type definitions
//!
//! Value types, constants, and type aliases shared by the registry,
//! the statement layer and the storage engine.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Record identifier type (assigned by the storage engine)
///
/// Same range as validated caller input, so every id converts to a
/// [`Value`] without loss.
pub type RecordId = u32;

/// Table designator used by statement templates, resolved before execution
pub const TABLE_PLACEHOLDER: &str = "BOOKS";

/// Default prefix for minted table names
pub const DEFAULT_TABLE_PREFIX: &str = "Books_";

/// Name stored when a record is added without one
pub const DEFAULT_BOOK_NAME: &str = "UNKNOWN";

/// Identifier column of every book table
pub const ID_COLUMN: &str = "BOOK_ID";

/// Text column of every book table
pub const NAME_COLUMN: &str = "BOOK_NAME";

/// Integer column of every book table
pub const STOCK_COLUMN: &str = "BOOK_STOCK";

/// Largest stock or identifier accepted from callers (32-bit signed max)
pub const MAX_INPUT_VALUE: u32 = i32::MAX as u32;

/// Column data types understood by the storage engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    /// 64-bit signed integer
    BigInt,
    /// 32-bit signed integer
    Integer,
    /// Unbounded text
    Text,
}

impl ColumnType {
    /// Check whether a value can be stored in a column of this type
    ///
    /// NULL is accepted here; nullability is checked against the column.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (ColumnType::BigInt, Value::Integer(_)) => true,
            (ColumnType::Integer, Value::Integer(n)) => i32::try_from(*n).is_ok(),
            (ColumnType::Text, Value::Text(_)) => true,
            _ => false,
        }
    }

    /// SQL spelling of the type
    pub fn sql_name(&self) -> &'static str {
        match self {
            ColumnType::BigInt => "BIGINT",
            ColumnType::Integer => "INTEGER",
            ColumnType::Text => "TEXT",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

/// A single cell value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    Null,
    Integer(i64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Integer(_) => 1,
            Value::Text(_) => 2,
        }
    }
}

// NULL sorts first, then integers, then text.
impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}
