//! Shelfdb console shell

// Use jemalloc as global allocator
#[global_allocator]
static GLOBAL: jemallocator::Jemalloc = jemallocator::Jemalloc;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use shelfdb::command::CommandError;
use shelfdb::database::TableSummary;
use shelfdb::{Book, Command, Config, Database, Reply, logging};

#[derive(Parser, Debug)]
#[command(
    name = "shelfdb",
    version,
    about = "Manage in-memory book tables from the console"
)]
struct Cli {
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter, overrides the configured one (RUST_LOG still wins)
    #[arg(long)]
    log: Option<String>,
}

const HELP: &str = "\
Commands:
  create                         create a new table
  list                           show all tables and their row counts
  select <table>                 select a table as current
  current                        show the selected table name
  edit                           check that a table is selected for editing
  drop                           delete the selected table
  add [name] <stock>             add a book to the selected table
  find <id>                      show one book
  rename <id> <name>             change a book's name
  restock <id> <stock>           change a book's stock
  delete <id>                    delete a book
  show [name|stock] [asc|desc]   list books, optionally ordered
  quit                           leave";

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };

    let filter = cli.log.as_deref().unwrap_or(&config.log_filter);
    if let Err(e) = logging::init(filter) {
        eprintln!("Failed to start logging: {}", e);
    }

    let database = match Database::open(config) {
        Ok(database) => database,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let width = database.config().name_width;
    let result = run_shell(&database, io::stdin().lock(), &mut io::stdout().lock(), width);
    database.shutdown();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("I/O error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_shell<R: BufRead, W: Write>(
    database: &Database,
    input: R,
    out: &mut W,
    width: usize,
) -> io::Result<()> {
    writeln!(out, "Welcome to the book database")?;
    writeln!(out, "{}", HELP)?;
    prompt(out)?;

    for line in input.lines() {
        let line = line?;
        match Command::parse(&line) {
            Ok(command) => {
                let reply = database.dispatch(command);
                if reply == Reply::Quit {
                    break;
                }
                render(out, &reply, width)?;
            }
            Err(CommandError::Empty) => {}
            Err(CommandError::Unknown(word)) => {
                eprintln!("Unknown command: {}", word);
                writeln!(out, "{}", HELP)?;
            }
            Err(e) => eprintln!("{}", e),
        }
        prompt(out)?;
    }
    Ok(())
}

fn prompt<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "> ")?;
    out.flush()
}

fn render<W: Write>(out: &mut W, reply: &Reply, width: usize) -> io::Result<()> {
    match reply {
        Reply::TableCreated(name) => writeln!(out, "Created table {}", name),
        Reply::Tables(tables) => render_tables(out, tables),
        Reply::TableSelected(name) => writeln!(out, "Selected table {}", name),
        Reply::Current(Some(name)) => writeln!(out, "Current table: {}", name),
        Reply::Current(None) => writeln!(out, "No table selected"),
        Reply::Editing(name) => writeln!(out, "Editing table {}", name),
        Reply::TableDropped(name) => {
            writeln!(out, "Dropped table {}, no table is selected now", name)
        }
        Reply::RecordAdded(id) => writeln!(out, "Added entry {}", id),
        Reply::Record(Some(book)) => render_book(out, book, width),
        Reply::Record(None) => writeln!(out, "No such entry"),
        Reply::RecordUpdated(id) => writeln!(out, "Updated entry {}", id),
        Reply::RecordDeleted(id) => writeln!(out, "Deleted entry {}", id),
        Reply::Records(books) if books.is_empty() => writeln!(out, "The table is empty"),
        Reply::Records(books) => books
            .iter()
            .try_for_each(|book| render_book(out, book, width)),
        Reply::Quit => Ok(()),
        Reply::Failed(message) => {
            eprintln!("{}", message);
            Ok(())
        }
    }
}

fn render_tables<W: Write>(out: &mut W, tables: &[TableSummary]) -> io::Result<()> {
    if tables.is_empty() {
        return writeln!(out, "No tables");
    }
    for table in tables {
        let marker = if table.is_current { "*" } else { " " };
        match &table.row_count {
            Ok(count) => writeln!(out, "{} {} | {} rows", marker, table.name, count)?,
            Err(e) => writeln!(out, "{} {} | count failed: {}", marker, table.name, e)?,
        }
    }
    Ok(())
}

fn render_book<W: Write>(out: &mut W, book: &Book, width: usize) -> io::Result<()> {
    let name: String = book.name().chars().take(width).collect();
    writeln!(
        out,
        "| {} | {:<width$} | {} |",
        book.id(),
        name,
        book.stock(),
        width = width
    )
}
