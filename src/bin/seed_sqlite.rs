use anyhow::Result;
use serde_json::json;

use rsvp_seed::db::{Sqlite, Store};
use rsvp_seed::rsvp::{EVENTS_TABLE, RSVPS_TABLE};

const EVENT_ID: &str = "00000000-0000-4000-8000-000000000001";
const HOST_EMAIL: &str = "flormontana@etsy.com";

fn main() -> Result<()> {
    let path = std::path::Path::new("dev/sqlite");
    std::fs::create_dir_all(path)?;
    let db_path = path.join("rsvp.db");
    let mut store = Sqlite::open(&db_path)?;
    store.create_schema()?;

    if store.select_eq(EVENTS_TABLE, "id", EVENT_ID)?.is_empty() {
        let event = json!({
            "id": EVENT_ID,
            "title": "Sarah & Michael's Wedding",
            "host_name": "Sarah & Michael",
            "host_email": HOST_EMAIL,
            "date": "2026-06-20T16:00:00Z",
            "location": "Rosewood Gardens",
            "slug": "sarah-michael-wedding",
        });
        if let serde_json::Value::Object(row) = event {
            store.insert(EVENTS_TABLE, &row)?;
        }
    }
    let existing = store.count(RSVPS_TABLE, "event_id", EVENT_ID)?;
    println!("Seeded SQLite at {} (host {}, {} rsvps so far)", db_path.display(), HOST_EMAIL, existing);
    println!("Run: rsvp-seed --store sqlite --sqlite-path {}", db_path.display());
    Ok(())
}
