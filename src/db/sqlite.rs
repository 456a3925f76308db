use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::Connection as SqliteConn;
use serde_json::Value;

use crate::db::{quote_ident, Row, Store};
use crate::logger::debug;

/// Tables the local fixture database carries; columns mirror the hosted schema.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS events (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    host_name TEXT NOT NULL DEFAULT '',
    host_email TEXT NOT NULL,
    date TEXT,
    location TEXT,
    slug TEXT,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);
CREATE TABLE IF NOT EXISTS rsvps (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    event_id TEXT NOT NULL REFERENCES events(id),
    guest_name TEXT NOT NULL,
    guest_email TEXT,
    guest_phone TEXT,
    attendance_status TEXT NOT NULL,
    number_of_guests INTEGER NOT NULL DEFAULT 0,
    has_plusone INTEGER NOT NULL DEFAULT 0,
    plusone_name TEXT,
    meal_choices TEXT NOT NULL DEFAULT '[]',
    message TEXT,
    created_at TEXT NOT NULL
);
"#;

pub struct Sqlite {
    conn: SqliteConn,
}

impl Sqlite {
    pub fn open(path: &Path) -> Result<Self> {
        let path = expand_path(path).ok_or_else(|| anyhow!("cannot expand file path"))?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        debug!(path = %path.display(), "sqlite: opening file");
        let conn = SqliteConn::open(&path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        Ok(Self { conn })
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            conn: SqliteConn::open_in_memory()?,
        })
    }

    /// Create the `events` and `rsvps` tables when missing.
    pub fn create_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    pub fn count(&self, table: &str, column: &str, value: &str) -> Result<usize> {
        let q = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ?1",
            quote_ident(table),
            quote_ident(column)
        );
        let n: i64 = self.conn.query_row(&q, [value], |row| row.get(0))?;
        Ok(n as usize)
    }

    fn read_rows(stmt: &mut rusqlite::Statement<'_>, params: &[SqlValue]) -> Result<Vec<Row>> {
        let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();
        let mut rows = stmt.query(rusqlite::params_from_iter(params.iter()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut map = Row::new();
            for (i, name) in columns.iter().enumerate() {
                map.insert(name.clone(), to_json(row.get_ref(i)?));
            }
            out.push(map);
        }
        Ok(out)
    }
}

impl Store for Sqlite {
    fn select_eq(&mut self, table: &str, column: &str, value: &str) -> Result<Vec<Row>> {
        let q = format!(
            "SELECT * FROM {} WHERE {} = ?1",
            quote_ident(table),
            quote_ident(column)
        );
        let mut stmt = self.conn.prepare(&q)?;
        let rows = Self::read_rows(&mut stmt, &[SqlValue::Text(value.to_string())])?;
        debug!(table, rows = rows.len(), "sqlite: selected");
        Ok(rows)
    }

    fn insert(&mut self, table: &str, row: &Row) -> Result<Row> {
        if row.is_empty() {
            return Err(anyhow!("refusing to insert an empty row into {}", table));
        }
        let columns = row.keys().map(|c| quote_ident(c)).collect::<Vec<_>>().join(", ");
        let placeholders = (1..=row.len()).map(|i| format!("?{}", i)).collect::<Vec<_>>().join(", ");
        let q = format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
            quote_ident(table),
            columns,
            placeholders
        );
        let params = row.values().map(to_sql).collect::<Vec<_>>();
        let mut stmt = self.conn.prepare(&q)?;
        let mut inserted = Self::read_rows(&mut stmt, &params)?;
        debug!(table, "sqlite: inserted");
        inserted
            .pop()
            .ok_or_else(|| anyhow!("insert into {} returned no rows", table))
    }
}

// Booleans become integers and nested values JSON text.
fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
    }
}

fn to_json(cell: ValueRef<'_>) -> Value {
    match cell {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(format!("<blob {} bytes>", b.len())),
    }
}

fn expand_path(path: &Path) -> Option<PathBuf> {
    let mut expanded_path = PathBuf::new();
    let mut path_iter = path.iter();
    if path.starts_with("~") {
        path_iter.next()?;
        expanded_path = expanded_path.join(dirs_next::home_dir()?);
    }
    for path in path_iter {
        let path = path.to_str()?;
        expanded_path = if cfg!(unix) && path.starts_with('$') {
            expanded_path.join(std::env::var(path.strip_prefix('$')?).unwrap_or_default())
        } else {
            expanded_path.join(path)
        }
    }
    Some(expanded_path)
}
