use anyhow::{anyhow, Context, Result};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

use crate::db::{Row, Store};
use crate::logger::debug;

/// The managed service's REST interface (PostgREST under `/rest/v1`).
pub struct Supabase {
    client: Client,
    rest_url: String,
}

impl Supabase {
    pub fn new(url: &str, key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let apikey = HeaderValue::from_str(key).context("service role key is not a valid header value")?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", key))
            .context("service role key is not a valid header value")?;
        headers.insert("apikey", apikey);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context("failed to build http client")?;

        Ok(Self {
            client,
            rest_url: rest_url(url),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_url, table)
    }
}

impl Store for Supabase {
    fn select_eq(&mut self, table: &str, column: &str, value: &str) -> Result<Vec<Row>> {
        debug!(table, column, "supabase: select");
        let request = self
            .client
            .get(self.table_url(table))
            .query(&select_eq_query(column, value));
        let rows: Vec<Row> = send(request)?
            .json()
            .with_context(|| format!("unexpected response body from {}", table))?;
        debug!(table, rows = rows.len(), "supabase: selected");
        Ok(rows)
    }

    fn insert(&mut self, table: &str, row: &Row) -> Result<Row> {
        debug!(table, "supabase: insert");
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(row);
        let mut rows: Vec<Row> = send(request)?
            .json()
            .with_context(|| format!("unexpected response body from {}", table))?;
        if rows.is_empty() {
            return Err(anyhow!("insert into {} returned no rows", table));
        }
        Ok(rows.swap_remove(0))
    }
}

fn send(request: RequestBuilder) -> Result<Response> {
    let response = request.send().context("request to supabase failed")?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(anyhow!("supabase responded {}: {}", status, body))
}

fn rest_url(url: &str) -> String {
    format!("{}/rest/v1", url.trim_end_matches('/'))
}

fn select_eq_query(column: &str, value: &str) -> Vec<(String, String)> {
    vec![
        ("select".to_string(), "*".to_string()),
        (column.to_string(), format!("eq.{}", value)),
    ]
}
