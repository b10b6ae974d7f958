//! TableBuilder for fluent table construction
//!
//! Provides a builder pattern for creating tables with:
//! - Column definition with automatic ordinals
//! - Validation before build (names, duplicates, identity column)

use crate::table::{Column, Table};
use std::collections::HashSet;

/// Builder for constructing Table instances
///
/// # Example
/// ```
/// use shelfdb::table::{TableBuilder, Column};
/// use shelfdb::types::ColumnType;
///
/// let table = TableBuilder::new("Books_0".to_string())
///     .column(Column::identity("BOOK_ID".to_string(), ColumnType::BigInt, 0))
///     .column(Column::new("BOOK_NAME".to_string(), ColumnType::Text, true, 0))
///     .try_build()
///     .unwrap();
/// assert_eq!(table.column_count(), 2);
/// ```
#[derive(Debug)]
pub struct TableBuilder {
    table_name: String,
    columns: Vec<Column>,
}

impl TableBuilder {
    /// Create a new table builder with required fields
    pub fn new(table_name: String) -> Self {
        Self {
            table_name,
            columns: Vec::new(),
        }
    }

    /// Add a single column
    ///
    /// Automatically assigns ordinal based on current column count
    pub fn column(mut self, column: Column) -> Self {
        let ordinal = self.columns.len() as u32;
        self.columns.push(column.at_ordinal(ordinal));
        self
    }

    /// Add multiple columns at once
    pub fn columns(mut self, columns: Vec<Column>) -> Self {
        for col in columns {
            let ordinal = self.columns.len() as u32;
            self.columns.push(col.at_ordinal(ordinal));
        }
        self
    }

    /// Build with validation
    pub fn try_build(self) -> Result<Table, String> {
        if self.table_name.is_empty() {
            return Err("table_name cannot be empty".to_string());
        }

        if self.columns.is_empty() {
            return Err(format!("table {} has no columns", self.table_name));
        }

        let mut seen = HashSet::new();
        for col in &self.columns {
            if !seen.insert(col.name().to_string()) {
                return Err(format!("duplicate column: {}", col.name()));
            }
        }

        if self.columns.iter().filter(|c| c.is_auto_increment()).count() > 1 {
            return Err("only one auto-increment column is allowed".to_string());
        }

        Ok(Table::with_columns(self.table_name, self.columns))
    }
}
