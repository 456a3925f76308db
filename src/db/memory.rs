use anyhow::{anyhow, Result};
use serde_json::Value;

use crate::db::{Row, Store};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Select { table: String, column: String, value: String },
    Insert { table: String },
}

/// Store double that keeps rows in memory and records every call.
#[derive(Default)]
pub struct MemoryStore {
    pub tables: std::collections::BTreeMap<String, Vec<Row>>,
    pub calls: Vec<Call>,
    /// Fail the insert with this 1-based index.
    pub fail_insert_at: Option<usize>,
    inserts: usize,
}

impl MemoryStore {
    pub fn with_event(id: &str, title: &str, host_email: &str) -> Self {
        let mut store = Self::default();
        let mut event = Row::new();
        event.insert("id".into(), Value::from(id));
        event.insert("title".into(), Value::from(title));
        event.insert("host_email".into(), Value::from(host_email));
        store.tables.entry("events".into()).or_default().push(event);
        store
    }

    pub fn rows(&self, table: &str) -> &[Row] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn insert_calls(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, Call::Insert { .. })).count()
    }

    pub fn select_calls(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, Call::Select { .. })).count()
    }
}

impl Store for MemoryStore {
    fn select_eq(&mut self, table: &str, column: &str, value: &str) -> Result<Vec<Row>> {
        self.calls.push(Call::Select {
            table: table.into(),
            column: column.into(),
            value: value.into(),
        });
        Ok(self
            .rows(table)
            .iter()
            .filter(|row| row.get(column).and_then(Value::as_str) == Some(value))
            .cloned()
            .collect())
    }

    fn insert(&mut self, table: &str, row: &Row) -> Result<Row> {
        self.calls.push(Call::Insert { table: table.into() });
        self.inserts += 1;
        if self.fail_insert_at == Some(self.inserts) {
            return Err(anyhow!("simulated outage on insert {}", self.inserts));
        }
        let mut stored = row.clone();
        let id = self.rows(table).len() + 1;
        stored.insert("id".into(), Value::from(id));
        self.tables.entry(table.into()).or_default().push(stored.clone());
        Ok(stored)
    }
}
