//! Shelfdb library
//!
//! Identically shaped in-memory book tables: a registry of tables, query
//! templates redirected to the selected table, and a transactional executor
//! over a pluggable storage engine.

// Global type definitions
pub mod types;

// Record model and caller input
pub mod record;
pub mod validate;

// Storage engine and its statement layer
pub mod sql;
pub mod storage;
pub mod table;

// Registry, templates and execution
pub mod catalog;
pub mod executor;
pub mod query;
pub mod redirect;

// Facade and shell boundary
pub mod command;
pub mod config;
pub mod database;
pub mod logging;

// Re-export the main entry points for easier access
pub use command::{Command, Reply};
pub use config::Config;
pub use database::{Database, DatabaseError, DatabaseResult};
pub use record::Book;
