mod postgres;
mod sqlite;
mod supabase;

#[cfg(test)]
pub(crate) mod memory;

use anyhow::Result;

use crate::config::StoreSettings;
use crate::logger::debug;

pub use self::postgres::Postgres;
pub use self::sqlite::Sqlite;
pub use self::supabase::Supabase;

/// A row as exchanged with every backend: column name to JSON value.
pub type Row = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum StoreType {
    #[default]
    Supabase,
    Postgres,
    Sqlite,
}

/// The two primitives the seeder needs from a backend.
pub trait Store {
    /// Rows of `table` whose `column` equals `value`, in store order.
    fn select_eq(&mut self, table: &str, column: &str, value: &str) -> Result<Vec<Row>>;
    /// Insert one row and return it as stored.
    fn insert(&mut self, table: &str, row: &Row) -> Result<Row>;
}

impl<S: Store + ?Sized> Store for Box<S> {
    fn select_eq(&mut self, table: &str, column: &str, value: &str) -> Result<Vec<Row>> {
        (**self).select_eq(table, column, value)
    }
    fn insert(&mut self, table: &str, row: &Row) -> Result<Row> {
        (**self).insert(table, row)
    }
}

pub fn open(settings: &StoreSettings) -> Result<Box<dyn Store>> {
    debug!(store = ?settings.store_type(), "opening store");
    Ok(match settings {
        StoreSettings::Supabase { url, key } => Box::new(Supabase::new(url, key)?),
        StoreSettings::Postgres { url } => Box::new(Postgres::connect(url)?),
        StoreSettings::Sqlite { path } => Box::new(Sqlite::open(path)?),
    })
}

/// Quote an SQL identifier, doubling embedded quotes.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
