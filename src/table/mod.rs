//! Table module for physical table schemas
//!
//! This module implements the schema side of book tables:
//! - Column metadata (type, nullability, identity flags)
//! - Table metadata holding the ordered column list
//! - Builder with validation, used when the engine materializes a table

pub mod builder;
pub mod column;
pub mod table;

pub use builder::TableBuilder;
pub use column::Column;
pub use table::Table;

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
