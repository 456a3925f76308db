use anyhow::{anyhow, Context, Result};

use crate::db::{quote_ident, Row, Store};
use crate::logger::debug;

/// A direct connection to the database behind the hosted service.
pub struct Postgres {
    client: postgres::Client,
}

impl Postgres {
    pub fn connect(url: &str) -> Result<Self> {
        debug!("postgres: connecting");
        let client = postgres::Client::connect(url, postgres::NoTls)
            .context("failed to connect to postgres")?;
        debug!("postgres: connected");
        Ok(Self { client })
    }
}

impl Store for Postgres {
    fn select_eq(&mut self, table: &str, column: &str, value: &str) -> Result<Vec<Row>> {
        let q = select_eq_sql(table, column);
        let rows = self.client.query(q.as_str(), &[&value])?;
        let rows = rows
            .into_iter()
            .map(|r| parse_row(&r.get::<_, String>(0)))
            .collect::<Result<Vec<_>>>()?;
        debug!(table, rows = rows.len(), "postgres: selected");
        Ok(rows)
    }

    fn insert(&mut self, table: &str, row: &Row) -> Result<Row> {
        if row.is_empty() {
            return Err(anyhow!("refusing to insert an empty row into {}", table));
        }
        let payload = serde_json::to_string(row)?;
        let q = insert_sql(table, row.keys());
        let stored = self
            .client
            .query_one(q.as_str(), &[&payload])
            .with_context(|| format!("insert into {} failed", table))?;
        debug!(table, "postgres: inserted");
        parse_row(&stored.get::<_, String>(0))
    }
}

fn select_eq_sql(table: &str, column: &str) -> String {
    format!(
        "SELECT row_to_json(t)::text FROM {} t WHERE t.{}::text = $1",
        quote_ident(table),
        quote_ident(column)
    )
}

// Only the given columns are written so that column defaults (ids) still apply.
fn insert_sql<'a>(table: &str, columns: impl Iterator<Item = &'a String>) -> String {
    let table = quote_ident(table);
    let columns = columns.map(|c| quote_ident(c)).collect::<Vec<_>>().join(", ");
    format!(
        "INSERT INTO {table} ({columns}) \
         SELECT {columns} FROM json_populate_record(NULL::{table}, $1::text::json) \
         RETURNING row_to_json({table}.*)::text",
        table = table,
        columns = columns
    )
}

fn parse_row(text: &str) -> Result<Row> {
    match serde_json::from_str(text)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(anyhow!("expected a json object, got {}", other)),
    }
}
