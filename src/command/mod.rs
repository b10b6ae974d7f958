//! Shell boundary
//!
//! Turns one line of input into a [`Command`], and runs commands against a
//! [`Database`] producing a [`Reply`]. Per-command failures come back as
//! [`Reply::Failed`] and never end the session.

use thiserror::Error;

use crate::database::{Database, DatabaseError, TableSummary};
use crate::query::{OrderSpec, SelectMode, SortColumn, SortDirection};
use crate::record::Book;
use crate::types::RecordId;
use crate::validate::{InputError, check_non_negative};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,
    #[error("Unknown command: {0}")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error(transparent)]
    Input(#[from] InputError),
}

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateTable,
    ListTables,
    SelectTable(String),
    ShowCurrent,
    EditCurrent,
    DropCurrent,
    AddRecord { name: Option<String>, stock: u32 },
    FindRecord(RecordId),
    RenameRecord { id: RecordId, name: String },
    RestockRecord { id: RecordId, stock: u32 },
    DeleteRecord(RecordId),
    SelectRecords(SelectMode),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    TableCreated(String),
    Tables(Vec<TableSummary>),
    TableSelected(String),
    Current(Option<String>),
    /// Editing the named table
    Editing(String),
    TableDropped(String),
    RecordAdded(RecordId),
    Record(Option<Book>),
    RecordUpdated(RecordId),
    RecordDeleted(RecordId),
    Records(Vec<Book>),
    Quit,
    /// Recoverable failure, nothing changed
    Failed(String),
}

const ADD_USAGE: &str = "add [name] <stock>";
const SELECT_USAGE: &str = "select <table>";
const FIND_USAGE: &str = "find <id>";
const RENAME_USAGE: &str = "rename <id> <name>";
const RESTOCK_USAGE: &str = "restock <id> <stock>";
const DELETE_USAGE: &str = "delete <id>";
const SHOW_USAGE: &str = "show [name|stock] [asc|desc]";

impl Command {
    /// Parse one input line
    ///
    /// The first word picks the command, case-insensitively. Names may
    /// contain spaces; ids and stock values must be in `0..=2147483647`.
    pub fn parse(line: &str) -> CommandResult<Command> {
        let mut words = line.split_whitespace();
        let Some(keyword) = words.next() else {
            return Err(CommandError::Empty);
        };
        let args: Vec<&str> = words.collect();

        match keyword.to_ascii_lowercase().as_str() {
            "create" => Ok(Command::CreateTable),
            "list" => Ok(Command::ListTables),
            "current" => Ok(Command::ShowCurrent),
            "edit" => Ok(Command::EditCurrent),
            "drop" => Ok(Command::DropCurrent),
            "quit" | "exit" => Ok(Command::Quit),
            "select" => match args.as_slice() {
                [name] => Ok(Command::SelectTable((*name).to_string())),
                _ => Err(CommandError::Usage(SELECT_USAGE)),
            },
            "add" => match args.split_last() {
                Some((stock, [])) => Ok(Command::AddRecord {
                    name: None,
                    stock: check_non_negative(stock)?,
                }),
                Some((stock, name)) => Ok(Command::AddRecord {
                    name: Some(name.join(" ")),
                    stock: check_non_negative(stock)?,
                }),
                None => Err(CommandError::Usage(ADD_USAGE)),
            },
            "find" => match args.as_slice() {
                [id] => Ok(Command::FindRecord(parse_id(id)?)),
                _ => Err(CommandError::Usage(FIND_USAGE)),
            },
            "rename" => match args.split_first() {
                Some((id, name)) if !name.is_empty() => Ok(Command::RenameRecord {
                    id: parse_id(id)?,
                    name: name.join(" "),
                }),
                _ => Err(CommandError::Usage(RENAME_USAGE)),
            },
            "restock" => match args.as_slice() {
                [id, stock] => Ok(Command::RestockRecord {
                    id: parse_id(id)?,
                    stock: check_non_negative(stock)?,
                }),
                _ => Err(CommandError::Usage(RESTOCK_USAGE)),
            },
            "delete" => match args.as_slice() {
                [id] => Ok(Command::DeleteRecord(parse_id(id)?)),
                _ => Err(CommandError::Usage(DELETE_USAGE)),
            },
            "show" => parse_show(&args).map(Command::SelectRecords),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn parse_id(input: &str) -> CommandResult<RecordId> {
    Ok(check_non_negative(input)?)
}

fn parse_show(args: &[&str]) -> CommandResult<SelectMode> {
    let (column, direction) = match args {
        [] => return Ok(SelectMode::All),
        [column] => (*column, None),
        [column, direction] => (*column, Some(*direction)),
        _ => return Err(CommandError::Usage(SHOW_USAGE)),
    };

    let column = match column.to_ascii_lowercase().as_str() {
        "name" => SortColumn::Name,
        "stock" => SortColumn::Stock,
        _ => return Err(CommandError::Usage(SHOW_USAGE)),
    };
    let direction = match direction.map(str::to_ascii_lowercase).as_deref() {
        None => None,
        Some("asc") => Some(SortDirection::Ascending),
        Some("desc") => Some(SortDirection::Descending),
        Some(_) => return Err(CommandError::Usage(SHOW_USAGE)),
    };
    // A missing direction is passed through and rejected when run
    Ok(SelectMode::Ordered(OrderSpec::new(column, direction)))
}

impl Database {
    /// Run one command; errors are absorbed into [`Reply::Failed`]
    pub fn dispatch(&self, command: Command) -> Reply {
        let outcome = match command {
            Command::CreateTable => self.create_table().map(Reply::TableCreated),
            Command::ListTables => Ok(Reply::Tables(self.list_tables())),
            Command::SelectTable(name) => self
                .select_table(&name)
                .map(|()| Reply::TableSelected(name)),
            Command::ShowCurrent => Ok(Reply::Current(self.current_table_name())),
            Command::EditCurrent => self
                .catalog()
                .require_current()
                .map(Reply::Editing)
                .map_err(DatabaseError::from),
            Command::DropCurrent => self.drop_current_table().map(Reply::TableDropped),
            Command::AddRecord { name, stock } => self
                .insert_entry(name.as_deref(), stock)
                .map(Reply::RecordAdded),
            Command::FindRecord(id) => self.find_entry(id).map(Reply::Record),
            Command::RenameRecord { id, name } => self
                .update_entry_name(id, &name)
                .map(|()| Reply::RecordUpdated(id)),
            Command::RestockRecord { id, stock } => self
                .update_entry_stock(id, stock)
                .map(|()| Reply::RecordUpdated(id)),
            Command::DeleteRecord(id) => self.delete_entry(id).map(|()| Reply::RecordDeleted(id)),
            Command::SelectRecords(mode) => self.select_entries(mode).map(Reply::Records),
            Command::Quit => Ok(Reply::Quit),
        };

        outcome.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "command failed");
            Reply::Failed(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
