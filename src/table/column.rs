//! Column structure for table schema definition

use crate::types::ColumnType;

/// Column metadata structure
///
/// Represents a single column in a table schema with:
/// - name: Column identifier (stored upper-case, SQL identifiers are case-insensitive)
/// - column_type: Data type
/// - nullable: Whether NULL values are allowed
/// - ordinal: Position in table schema (0-indexed)
/// - primary_key / auto_increment: identity column flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name
    name: String,
    /// Column data type
    column_type: ColumnType,
    /// Whether NULL values are allowed
    nullable: bool,
    /// Column position in table (0-indexed)
    ordinal: u32,
    /// Part of the primary key
    primary_key: bool,
    /// Value assigned by the engine on insert
    auto_increment: bool,
}

impl Column {
    /// Create a new column
    ///
    /// # Arguments
    /// * `name` - Column name
    /// * `column_type` - Data type
    /// * `nullable` - Whether NULL is allowed
    /// * `ordinal` - Position in table schema
    pub fn new(name: String, column_type: ColumnType, nullable: bool, ordinal: u32) -> Self {
        Self {
            name: name.to_ascii_uppercase(),
            column_type,
            nullable,
            ordinal,
            primary_key: false,
            auto_increment: false,
        }
    }

    /// Create an auto-incrementing primary key column
    pub fn identity(name: String, column_type: ColumnType, ordinal: u32) -> Self {
        Self {
            primary_key: true,
            auto_increment: true,
            ..Self::new(name, column_type, false, ordinal)
        }
    }

    /// Mark the column as primary key (implies NOT NULL)
    pub fn with_primary_key(mut self, primary_key: bool) -> Self {
        self.primary_key = primary_key;
        if primary_key {
            self.nullable = false;
        }
        self
    }

    /// Mark the column as auto-incrementing
    pub fn with_auto_increment(mut self, auto_increment: bool) -> Self {
        self.auto_increment = auto_increment;
        self
    }

    /// Copy of this column at another position
    pub fn at_ordinal(&self, ordinal: u32) -> Self {
        Self {
            ordinal,
            ..self.clone()
        }
    }

    /// Get column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get column type
    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    /// Check if column is nullable
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Get column ordinal (position in table)
    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn is_auto_increment(&self) -> bool {
        self.auto_increment
    }

    /// Case-insensitive name match
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}
