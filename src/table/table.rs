//! Table structure for storing table metadata

use crate::table::Column;
use crate::types::{ColumnType, ID_COLUMN, NAME_COLUMN, STOCK_COLUMN};

/// Table metadata structure
///
/// Stores basic metadata for a table including:
/// - table_name: Physical name the engine knows the table by
/// - columns: Column definitions for the table schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Table name
    pub table_name: String,
    /// Column definitions
    pub columns: Vec<Column>,
}

impl Table {
    /// Create a new table with columns
    pub fn with_columns(table_name: String, columns: Vec<Column>) -> Self {
        Self {
            table_name,
            columns,
        }
    }

    /// The fixed three-column schema shared by every book table
    pub fn book_schema(table_name: String) -> Self {
        Self::with_columns(
            table_name,
            vec![
                Column::identity(ID_COLUMN.to_string(), ColumnType::BigInt, 0),
                Column::new(NAME_COLUMN.to_string(), ColumnType::Text, true, 1),
                Column::new(STOCK_COLUMN.to_string(), ColumnType::Integer, true, 2),
            ],
        )
    }

    /// Get table name
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Get column by name (case-insensitive)
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.matches(name))
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.matches(name))
    }

    /// Get all columns
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in ordinal order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name().to_string()).collect()
    }

    /// Get column count
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Index of the auto-increment column, if any
    pub fn auto_increment_index(&self) -> Option<usize> {
        self.columns.iter().position(|c| c.is_auto_increment())
    }

    /// Check whether two tables share the same column layout
    pub fn same_shape(&self, other: &Table) -> bool {
        self.columns == other.columns
    }
}
