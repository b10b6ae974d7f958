//! In-memory storage engine
//!
//! Every table lives behind its own mutex. A transaction that touches a
//! table holds that table's lock until it commits or rolls back and works
//! on a staged copy, so concurrent writers to one table are serialized and
//! nobody observes a half-applied statement. DDL is staged per session and
//! published at commit.

use crate::sql::{self, InsertStmt, Projection, SelectStmt, Statement, UpdateStmt};
use crate::storage::{ResultSet, Session, StorageEngine, StorageError, StorageResult};
use crate::table::{Column, Table, TableBuilder};
use crate::types::{RecordId, Value};
use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex, RwLock};
use std::cmp::Ordering as CmpOrdering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

/// Physical table: schema plus rows in insertion order
#[derive(Debug, Clone)]
struct MemTable {
    schema: Table,
    rows: Vec<Vec<Value>>,
    next_auto: i64,
}

impl MemTable {
    fn new(schema: Table) -> Self {
        Self {
            schema,
            rows: Vec::new(),
            next_auto: 1,
        }
    }

    fn column_index(&self, name: &str) -> StorageResult<usize> {
        self.schema
            .column_index(name)
            .ok_or_else(|| StorageError::ColumnNotFound(name.to_string()))
    }

    /// Validate a full row against types, nullability and key uniqueness.
    /// `skip` excludes the row being replaced by an update.
    fn check_row(&self, row: &[Value], skip: Option<usize>) -> StorageResult<()> {
        for (col, value) in self.schema.columns().iter().zip(row) {
            if value.is_null() {
                if !col.is_nullable() {
                    return Err(StorageError::NotNull(col.name().to_string()));
                }
                continue;
            }
            if !col.column_type().accepts(value) {
                return Err(StorageError::TypeMismatch {
                    column: col.name().to_string(),
                    expected: col.column_type(),
                    value: value.clone(),
                });
            }
        }

        for (idx, col) in self.schema.columns().iter().enumerate() {
            if !col.is_primary_key() {
                continue;
            }
            let clash = self
                .rows
                .iter()
                .enumerate()
                .any(|(pos, existing)| Some(pos) != skip && existing[idx] == row[idx]);
            if clash {
                return Err(StorageError::DuplicateKey {
                    column: col.name().to_string(),
                    value: row[idx].clone(),
                });
            }
        }
        Ok(())
    }

    fn insert_row(&mut self, columns: &[String], values: Vec<Value>) -> StorageResult<Option<RecordId>> {
        let width = self.schema.column_count();
        let mut row = vec![Value::Null; width];
        let mut supplied = vec![false; width];

        if columns.is_empty() {
            if values.len() != width {
                return Err(StorageError::InvalidDefinition(format!(
                    "table {} has {} columns, {} values given",
                    self.schema.table_name(),
                    width,
                    values.len()
                )));
            }
            for (idx, value) in values.into_iter().enumerate() {
                row[idx] = value;
                supplied[idx] = true;
            }
        } else {
            for (name, value) in columns.iter().zip(values) {
                let idx = self.column_index(name)?;
                if supplied[idx] {
                    return Err(StorageError::InvalidDefinition(format!(
                        "column {} assigned twice",
                        name
                    )));
                }
                row[idx] = value;
                supplied[idx] = true;
            }
        }

        let mut assigned = None;
        let mut next_auto = self.next_auto;
        if let Some(idx) = self.schema.auto_increment_index() {
            if row[idx].is_null() {
                row[idx] = Value::Integer(next_auto);
                assigned = RecordId::try_from(next_auto).ok();
                next_auto += 1;
            } else if let Some(explicit) = row[idx].as_integer() {
                next_auto = next_auto.max(explicit.saturating_add(1));
                assigned = RecordId::try_from(explicit).ok();
            }
        }

        // A rejected row does not consume an id
        self.check_row(&row, None)?;
        self.rows.push(row);
        self.next_auto = next_auto;
        Ok(assigned)
    }

    fn matching(&self, filter: Option<&(usize, Value)>) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| filter.is_none_or(|(idx, value)| row[*idx] == *value))
            .map(|(pos, _)| pos)
            .collect()
    }

    fn resolve_filter(&self, filter: Option<(String, Value)>) -> StorageResult<Option<(usize, Value)>> {
        filter
            .map(|(column, value)| -> StorageResult<(usize, Value)> {
                Ok((self.column_index(&column)?, value))
            })
            .transpose()
    }

    fn select(&self, sel: &SelectStmt, filter: Option<(String, Value)>) -> StorageResult<ResultSet> {
        let filter = self.resolve_filter(filter)?;
        let positions = self.matching(filter.as_ref());

        if sel.projection == Projection::CountAll {
            return Ok(ResultSet::Rows {
                columns: vec!["COUNT(*)".to_string()],
                rows: vec![vec![Value::Integer(positions.len() as i64)]],
            });
        }

        let keys = sel
            .order_by
            .iter()
            .map(|item| -> StorageResult<(usize, bool)> {
                Ok((self.column_index(&item.column)?, item.descending))
            })
            .collect::<StorageResult<Vec<_>>>()?;

        let mut rows: Vec<&Vec<Value>> = positions.iter().map(|&pos| &self.rows[pos]).collect();
        // Stable sort keeps insertion order among full ties
        rows.sort_by(|a, b| {
            for &(idx, descending) in &keys {
                let ord = a[idx].cmp(&b[idx]);
                let ord = if descending { ord.reverse() } else { ord };
                if ord != CmpOrdering::Equal {
                    return ord;
                }
            }
            CmpOrdering::Equal
        });

        Ok(ResultSet::Rows {
            columns: self.schema.column_names(),
            rows: rows.into_iter().cloned().collect(),
        })
    }

    fn update(
        &mut self,
        set: Vec<(String, Value)>,
        filter: Option<(String, Value)>,
    ) -> StorageResult<u64> {
        let filter = self.resolve_filter(filter)?;
        let assignments = set
            .into_iter()
            .map(|(column, value)| -> StorageResult<(usize, Value)> {
                Ok((self.column_index(&column)?, value))
            })
            .collect::<StorageResult<Vec<_>>>()?;

        let positions = self.matching(filter.as_ref());
        let mut replaced = Vec::with_capacity(positions.len());
        for &pos in &positions {
            let mut row = self.rows[pos].clone();
            for (idx, value) in &assignments {
                row[*idx] = value.clone();
            }
            self.check_row(&row, Some(pos))?;
            replaced.push((pos, row));
        }

        let count = replaced.len() as u64;
        for (pos, row) in replaced {
            self.rows[pos] = row;
        }
        Ok(count)
    }

    fn delete(&mut self, filter: Option<(String, Value)>) -> StorageResult<u64> {
        let filter = self.resolve_filter(filter)?;
        let before = self.rows.len();
        match filter {
            Some((idx, value)) => self.rows.retain(|row| row[idx] != value),
            None => self.rows.clear(),
        }
        Ok((before - self.rows.len()) as u64)
    }
}

fn table_key(name: &str) -> String {
    name.to_ascii_uppercase()
}

type SharedTable = Arc<Mutex<MemTable>>;

/// In-memory storage engine
pub struct MemoryEngine {
    tables: RwLock<HashMap<String, SharedTable>>,
    closed: AtomicBool,
    sessions_opened: AtomicU64,
    active_sessions: AtomicUsize,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            closed: AtomicBool::new(false),
            sessions_opened: AtomicU64::new(0),
            active_sessions: AtomicUsize::new(0),
        }
    }

    /// Number of committed tables
    pub fn table_count(&self) -> usize {
        self.tables.read().len()
    }

    /// Check whether a committed table exists (case-insensitive)
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.read().contains_key(&table_key(name))
    }

    /// Committed schema of a table
    pub fn table_schema(&self, name: &str) -> Option<Table> {
        self.shared_table(&table_key(name))
            .map(|shared| shared.lock().schema.clone())
    }

    /// Total sessions handed out since creation
    pub fn sessions_opened(&self) -> u64 {
        self.sessions_opened.load(Ordering::Relaxed)
    }

    /// Sessions currently alive
    pub fn active_sessions(&self) -> usize {
        self.active_sessions.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn shared_table(&self, key: &str) -> Option<SharedTable> {
        self.tables.read().get(key).cloned()
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageEngine for MemoryEngine {
    fn open_session(&self) -> StorageResult<Box<dyn Session + '_>> {
        if self.is_closed() {
            return Err(StorageError::EngineClosed);
        }
        let id = self.sessions_opened.fetch_add(1, Ordering::Relaxed) + 1;
        self.active_sessions.fetch_add(1, Ordering::AcqRel);
        tracing::trace!(session = id, "session opened");
        Ok(Box::new(MemorySession::new(self, id)))
    }

    fn name(&self) -> &str {
        "memory"
    }

    fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);
        let dropped = {
            let mut tables = self.tables.write();
            let count = tables.len();
            tables.clear();
            count
        };
        tracing::info!(tables = dropped, "memory engine shut down");
    }
}

/// Existing table held exclusively by a transaction
struct LockedTable {
    guard: ArcMutexGuard<RawMutex, MemTable>,
    staged: MemTable,
}

/// Session over a [`MemoryEngine`]
pub struct MemorySession<'a> {
    engine: &'a MemoryEngine,
    id: u64,
    active: bool,
    created: HashMap<String, MemTable>,
    dropped: HashSet<String>,
    locked: HashMap<String, LockedTable>,
}

impl<'a> MemorySession<'a> {
    fn new(engine: &'a MemoryEngine, id: u64) -> Self {
        Self {
            engine,
            id,
            active: false,
            created: HashMap::new(),
            dropped: HashSet::new(),
            locked: HashMap::new(),
        }
    }

    fn ensure_usable(&self) -> StorageResult<()> {
        if self.engine.is_closed() {
            return Err(StorageError::EngineClosed);
        }
        Ok(())
    }

    fn exists(&self, key: &str) -> bool {
        if self.created.contains_key(key) {
            return true;
        }
        if self.dropped.contains(key) {
            return false;
        }
        self.engine.tables.read().contains_key(key)
    }

    /// Mutable staged view of a table, taking its lock on first touch
    fn table_mut(&mut self, name: &str) -> StorageResult<&mut MemTable> {
        let key = table_key(name);
        if self.created.contains_key(&key) {
            return self
                .created
                .get_mut(&key)
                .ok_or_else(|| StorageError::TableNotFound(name.to_string()));
        }
        if self.dropped.contains(&key) {
            return Err(StorageError::TableNotFound(name.to_string()));
        }
        if !self.locked.contains_key(&key) {
            let shared = self
                .engine
                .shared_table(&key)
                .ok_or_else(|| StorageError::TableNotFound(name.to_string()))?;
            let guard = shared.lock_arc();
            let staged = (*guard).clone();
            tracing::trace!(session = self.id, table = name, "table locked");
            self.locked.insert(key.clone(), LockedTable { guard, staged });
        }
        self.locked
            .get_mut(&key)
            .map(|locked| &mut locked.staged)
            .ok_or_else(|| StorageError::TableNotFound(name.to_string()))
    }

    /// Read a table as this transaction sees it
    fn with_table<R>(
        &self,
        name: &str,
        f: impl FnOnce(&MemTable) -> StorageResult<R>,
    ) -> StorageResult<R> {
        let key = table_key(name);
        if let Some(table) = self.created.get(&key) {
            return f(table);
        }
        if self.dropped.contains(&key) {
            return Err(StorageError::TableNotFound(name.to_string()));
        }
        if let Some(locked) = self.locked.get(&key) {
            return f(&locked.staged);
        }
        let shared = self
            .engine
            .shared_table(&key)
            .ok_or_else(|| StorageError::TableNotFound(name.to_string()))?;
        let table = shared.lock();
        f(&*table)
    }

    fn create_table(&mut self, ct: &sql::CreateTableStmt) -> StorageResult<ResultSet> {
        let key = table_key(&ct.table_name);
        if self.exists(&key) {
            if ct.if_not_exists {
                return Ok(ResultSet::Empty);
            }
            return Err(StorageError::TableAlreadyExists(ct.table_name.clone()));
        }

        let columns = ct
            .columns
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                Column::new(col.name.clone(), col.data_type, col.nullable, idx as u32)
                    .with_primary_key(col.primary_key)
                    .with_auto_increment(col.auto_increment)
            })
            .collect();
        let schema = TableBuilder::new(ct.table_name.clone())
            .columns(columns)
            .try_build()
            .map_err(StorageError::InvalidDefinition)?;

        self.created.insert(key, MemTable::new(schema));
        Ok(ResultSet::Empty)
    }

    fn drop_table(&mut self, dt: &sql::DropTableStmt) -> StorageResult<ResultSet> {
        let key = table_key(&dt.table_name);
        if !self.exists(&key) {
            if dt.if_exists {
                return Ok(ResultSet::Empty);
            }
            return Err(StorageError::TableNotFound(dt.table_name.clone()));
        }

        if self.created.remove(&key).is_none() {
            self.locked.remove(&key);
            self.dropped.insert(key);
        }
        Ok(ResultSet::Empty)
    }

    fn insert(&mut self, ins: &InsertStmt, params: &[Value]) -> StorageResult<ResultSet> {
        let values = ins
            .values
            .iter()
            .map(|expr| expr.eval(params))
            .collect::<Result<Vec<_>, _>>()?;
        let table = self.table_mut(&ins.table_name)?;
        let id = table.insert_row(&ins.columns, values)?;
        Ok(ResultSet::Affected {
            rows: 1,
            last_insert_id: id,
        })
    }

    fn select(&mut self, sel: &SelectStmt, params: &[Value]) -> StorageResult<ResultSet> {
        let filter = bind_condition(sel.where_clause.as_ref(), params)?;
        self.with_table(&sel.from, |table| table.select(sel, filter))
    }

    fn update(&mut self, upd: &UpdateStmt, params: &[Value]) -> StorageResult<ResultSet> {
        let set = upd
            .set
            .iter()
            .map(|(column, expr)| -> StorageResult<(String, Value)> {
                Ok((column.clone(), expr.eval(params)?))
            })
            .collect::<StorageResult<Vec<_>>>()?;
        let filter = bind_condition(upd.where_clause.as_ref(), params)?;
        let rows = self.table_mut(&upd.table_name)?.update(set, filter)?;
        Ok(ResultSet::Affected {
            rows,
            last_insert_id: None,
        })
    }

    fn delete(&mut self, del: &sql::DeleteStmt, params: &[Value]) -> StorageResult<ResultSet> {
        let filter = bind_condition(del.where_clause.as_ref(), params)?;
        let rows = self.table_mut(&del.table_name)?.delete(filter)?;
        Ok(ResultSet::Affected {
            rows,
            last_insert_id: None,
        })
    }

    fn discard(&mut self) {
        self.created.clear();
        self.dropped.clear();
        // Dropping the guards releases the table locks
        self.locked.clear();
        self.active = false;
    }
}

fn bind_condition(
    condition: Option<&sql::Condition>,
    params: &[Value],
) -> StorageResult<Option<(String, Value)>> {
    condition
        .map(|c| -> StorageResult<(String, Value)> { Ok((c.column.clone(), c.value.eval(params)?)) })
        .transpose()
}

impl Session for MemorySession<'_> {
    fn begin(&mut self) -> StorageResult<()> {
        self.ensure_usable()?;
        if self.active {
            return Err(StorageError::Transaction(
                "transaction already in progress".to_string(),
            ));
        }
        self.active = true;
        Ok(())
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> StorageResult<ResultSet> {
        self.ensure_usable()?;
        if !self.active {
            return Err(StorageError::Transaction("no active transaction".to_string()));
        }

        let stmt = sql::parse(sql)?;
        let expected = stmt.param_count();
        if expected != params.len() {
            return Err(StorageError::ParameterCount {
                expected,
                actual: params.len(),
            });
        }

        tracing::trace!(session = self.id, sql, "execute");
        match &stmt {
            Statement::CreateTable(ct) => self.create_table(ct),
            Statement::DropTable(dt) => self.drop_table(dt),
            Statement::Insert(ins) => self.insert(ins, params),
            Statement::Select(sel) => self.select(sel, params),
            Statement::Update(upd) => self.update(upd, params),
            Statement::Delete(del) => self.delete(del, params),
        }
    }

    fn commit(&mut self) -> StorageResult<()> {
        self.ensure_usable()?;
        if !self.active {
            return Err(StorageError::Transaction("no active transaction".to_string()));
        }

        {
            let mut tables = self.engine.tables.write();
            for key in self.dropped.drain() {
                tables.remove(&key);
            }
            for (key, table) in self.created.drain() {
                tables
                    .entry(key)
                    .or_insert_with(|| Arc::new(Mutex::new(table)));
            }
        }
        for (_, locked) in self.locked.drain() {
            let LockedTable { mut guard, staged } = locked;
            *guard = staged;
        }

        self.active = false;
        Ok(())
    }

    fn rollback(&mut self) -> StorageResult<()> {
        self.discard();
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        self.active
    }
}

impl Drop for MemorySession<'_> {
    fn drop(&mut self) {
        if self.active {
            tracing::debug!(session = self.id, "session released with open transaction, rolling back");
            self.discard();
        }
        self.engine.active_sessions.fetch_sub(1, Ordering::AcqRel);
        tracing::trace!(session = self.id, "session closed");
    }
}
