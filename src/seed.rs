use std::io::Write;

use anyhow::anyhow;
use rand::Rng;

use crate::dataset::Dataset;
use crate::db::{Row, Store};
use crate::error::SeedError;
use crate::logger::{debug, error, info, warn};
use crate::rsvp::{AttendanceStatus, NewRsvp, EVENTS_TABLE, RSVPS_TABLE};
use crate::timestamp::TimestampGenerator;

/// The event the seeded rows point at.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetEvent {
    pub id: String,
    pub title: String,
}

impl TargetEvent {
    fn from_row(row: &Row) -> anyhow::Result<Self> {
        let id = match row.get("id") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => return Err(anyhow!("event row has no usable id")),
        };
        let title = row
            .get("title")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string();
        Ok(Self { id, title })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub attending: usize,
    pub not_attending: usize,
    pub pending: usize,
    /// Seats across attending rows.
    pub headcount: u32,
}

impl SeedSummary {
    pub fn total(&self) -> usize {
        self.attending + self.not_attending + self.pending
    }
}

/// Inserts one RSVP row per guest, one request at a time.
///
/// Nothing wraps the inserts: the first failure stops the run and the
/// rows written before it stay in the store.
pub struct Seeder<'a, S: Store + ?Sized, R: Rng, W: Write> {
    store: &'a mut S,
    timestamps: TimestampGenerator<R>,
    out: W,
    committed: usize,
}

impl<'a, S: Store + ?Sized, R: Rng, W: Write> Seeder<'a, S, R, W> {
    pub fn new(store: &'a mut S, timestamps: TimestampGenerator<R>, out: W) -> Self {
        Self {
            store,
            timestamps,
            out,
            committed: 0,
        }
    }

    pub fn run(&mut self, dataset: &Dataset, host_email: &str) -> Result<SeedSummary, SeedError> {
        let event = self.find_event(host_email)?;

        let mut summary = SeedSummary::default();

        self.pass_header(dataset.attending.len(), "attending");
        for guest in &dataset.attending {
            let rsvp = NewRsvp::attending(&event.id, guest, self.timestamps.next_timestamp());
            self.insert(&rsvp)?;
            self.say(format_args!(
                "  ✓ {} ({}, {} guests)",
                guest.name,
                AttendanceStatus::Attending.label(),
                guest.guests
            ));
            summary.attending += 1;
            summary.headcount += guest.guests;
        }

        self.pass_header(dataset.not_attending.len(), "not attending");
        for guest in &dataset.not_attending {
            let rsvp = NewRsvp::not_attending(&event.id, guest, self.timestamps.next_timestamp());
            self.insert(&rsvp)?;
            self.say(format_args!("  ✓ {} ({})", guest.name, AttendanceStatus::NotAttending.label()));
            summary.not_attending += 1;
        }

        self.pass_header(dataset.pending.len(), "pending");
        for guest in &dataset.pending {
            let rsvp = NewRsvp::pending(&event.id, guest, self.timestamps.next_timestamp());
            self.insert(&rsvp)?;
            self.say(format_args!("  ✓ {} ({})", guest.name, AttendanceStatus::Pending.label()));
            summary.pending += 1;
        }

        self.report(&summary);
        info!(event_id = %event.id, rows = summary.total(), "seed complete");
        Ok(summary)
    }

    pub fn find_event(&mut self, host_email: &str) -> Result<TargetEvent, SeedError> {
        self.say(format_args!("Finding event for {}...", host_email));
        let rows = self
            .store
            .select_eq(EVENTS_TABLE, "host_email", host_email)
            .map_err(SeedError::Lookup)?;
        let Some(first) = rows.first() else {
            return Err(SeedError::EventNotFound {
                host_email: host_email.to_string(),
            });
        };
        if rows.len() > 1 {
            warn!(host_email, matches = rows.len(), "several events share this host; using the first");
        }
        let event = TargetEvent::from_row(first).map_err(SeedError::Lookup)?;
        self.say(format_args!("Found event: {} (ID: {})", event.title, event.id));
        info!(event_id = %event.id, "target event located");
        Ok(event)
    }

    fn insert(&mut self, rsvp: &NewRsvp) -> Result<(), SeedError> {
        let failed = |cause: anyhow::Error, committed: usize| SeedError::InsertFailed {
            guest: rsvp.guest_name.clone(),
            status: rsvp.attendance_status,
            committed,
            cause,
        };
        let row = rsvp.to_row().map_err(|e| failed(e, self.committed))?;
        match self.store.insert(RSVPS_TABLE, &row) {
            Ok(_) => {
                self.committed += 1;
                debug!(guest = %rsvp.guest_name, status = %rsvp.attendance_status, "rsvp inserted");
                Ok(())
            }
            Err(e) => {
                error!(guest = %rsvp.guest_name, committed = self.committed, "insert failed: {:#}", e);
                Err(failed(e, self.committed))
            }
        }
    }

    fn pass_header(&mut self, count: usize, label: &str) {
        self.say(format_args!("\nInserting {} {} guests...", count, label));
    }

    fn report(&mut self, summary: &SeedSummary) {
        self.say(format_args!("\n✅ Successfully seeded {} RSVP records!", summary.total()));
        self.say(format_args!(
            "   - {} Attending ({} total guests)",
            summary.attending, summary.headcount
        ));
        self.say(format_args!("   - {} Not Attending", summary.not_attending));
        self.say(format_args!("   - {} Pending", summary.pending));
    }

    // A closed stdout must not turn a finished insert into a failure.
    fn say(&mut self, line: std::fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "{}", line) {
            debug!("report line dropped: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::{Call, MemoryStore};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    const HOST: &str = "flormontana@etsy.com";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap()
    }

    fn stamps(seed: u64) -> TimestampGenerator<StdRng> {
        TimestampGenerator::with_rng(now(), StdRng::seed_from_u64(seed))
    }

    fn wedding_store() -> MemoryStore {
        MemoryStore::with_event("evt-42", "Sarah & Michael's Wedding", HOST)
    }

    fn seed(store: &mut MemoryStore, seed: u64) -> (Result<SeedSummary, SeedError>, String) {
        let dataset = Dataset::builtin().unwrap();
        let mut out = Vec::new();
        let result = Seeder::new(store, stamps(seed), &mut out).run(&dataset, HOST);
        (result, String::from_utf8(out).unwrap())
    }

    fn rows_with_status<'s>(store: &'s MemoryStore, status: &'s str) -> impl Iterator<Item = &'s Row> {
        store
            .rows(RSVPS_TABLE)
            .iter()
            .filter(move |r| r["attendance_status"] == json!(status))
    }

    #[test]
    fn inserts_one_row_per_guest_for_the_event() {
        let mut store = wedding_store();
        let (result, _) = seed(&mut store, 1);
        let summary = result.unwrap();

        assert_eq!(summary, SeedSummary { attending: 30, not_attending: 8, pending: 7, headcount: 47 });
        assert_eq!(store.select_calls(), 1);
        assert_eq!(store.insert_calls(), 45);
        assert!(store.rows(RSVPS_TABLE).iter().all(|r| r["event_id"] == json!("evt-42")));
        assert_eq!(
            store.calls[0],
            Call::Select { table: "events".into(), column: "host_email".into(), value: HOST.into() }
        );
    }

    #[test]
    fn attending_rows_are_consistent() {
        let mut store = wedding_store();
        seed(&mut store, 2).0.unwrap();
        let attending: Vec<_> = rows_with_status(&store, "attending").collect();
        assert_eq!(attending.len(), 30);
        for row in attending {
            let guests = row["number_of_guests"].as_u64().unwrap();
            assert!(guests > 0);
            assert_eq!(row["meal_choices"].as_array().unwrap().len() as u64, guests);
            let has_plusone = row["has_plusone"].as_bool().unwrap();
            assert_eq!(has_plusone, !row["plusone_name"].is_null());
        }
    }

    #[test]
    fn declined_and_pending_rows_are_empty() {
        let mut store = wedding_store();
        seed(&mut store, 3).0.unwrap();
        let others: Vec<_> = rows_with_status(&store, "not_attending")
            .chain(rows_with_status(&store, "pending"))
            .collect();
        assert_eq!(others.len(), 15);
        for row in others {
            assert_eq!(row["number_of_guests"], json!(0));
            assert_eq!(row["has_plusone"], json!(false));
            assert_eq!(row["meal_choices"], json!([]));
        }
        assert!(rows_with_status(&store, "pending").all(|r| r["message"] == json!("")));
    }

    #[test]
    fn created_at_values_fall_in_window() {
        let mut store = wedding_store();
        seed(&mut store, 4).0.unwrap();
        let start = now() - Duration::days(14);
        let end = start + Duration::days(14) + Duration::hours(23);
        for row in store.rows(RSVPS_TABLE) {
            let ts = DateTime::parse_from_rfc3339(row["created_at"].as_str().unwrap()).unwrap();
            assert!(ts >= start && ts <= end, "{ts}");
        }
    }

    #[test]
    fn same_seed_gives_same_rows() {
        let mut a = wedding_store();
        let mut b = wedding_store();
        seed(&mut a, 99).0.unwrap();
        seed(&mut b, 99).0.unwrap();
        assert_eq!(a.rows(RSVPS_TABLE), b.rows(RSVPS_TABLE));
    }

    #[test]
    fn missing_event_stops_before_inserts() {
        let mut store = MemoryStore::with_event("evt-1", "Someone Else", "other@example.com");
        let (result, out) = seed(&mut store, 5);
        let err = result.unwrap_err();
        assert!(matches!(err, SeedError::EventNotFound { ref host_email } if host_email == HOST));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(store.select_calls(), 1);
        assert_eq!(store.insert_calls(), 0);
        assert_eq!(out, format!("Finding event for {}...\n", HOST));
    }

    #[test]
    fn insert_failure_keeps_earlier_rows() {
        let mut store = wedding_store();
        store.fail_insert_at = Some(32);
        let (result, out) = seed(&mut store, 6);
        match result.unwrap_err() {
            SeedError::InsertFailed { guest, status, committed, .. } => {
                assert_eq!(committed, 31);
                assert_eq!(status, AttendanceStatus::NotAttending);
                assert_eq!(guest, "Natalie Adams");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.rows(RSVPS_TABLE).len(), 31);
        assert_eq!(store.insert_calls(), 32);
        assert!(!out.contains("Successfully seeded"));
    }

    #[test]
    fn seeding_twice_doubles_rows() {
        let mut store = wedding_store();
        seed(&mut store, 7).0.unwrap();
        seed(&mut store, 8).0.unwrap();
        assert_eq!(store.rows(RSVPS_TABLE).len(), 90);
    }

    #[test]
    fn reports_progress_and_summary() {
        let mut store = wedding_store();
        let (_, out) = seed(&mut store, 10);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "Finding event for flormontana@etsy.com...");
        assert_eq!(lines[1], "Found event: Sarah & Michael's Wedding (ID: evt-42)");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "Inserting 30 attending guests...");
        assert_eq!(lines[4], "  ✓ Emma Thompson (Attending, 2 guests)");
        assert!(out.contains("\nInserting 8 not attending guests...\n  ✓ Andrew Green (Not Attending)\n"));
        assert!(out.contains("\nInserting 7 pending guests...\n  ✓ Tyler Turner (Pending)\n"));
        assert!(out.ends_with(
            "\n✅ Successfully seeded 45 RSVP records!\n   - 30 Attending (47 total guests)\n   - 8 Not Attending\n   - 7 Pending\n"
        ));
    }

    #[test]
    fn seeds_sqlite_store_through_trait_object() {
        let sqlite = crate::db::Sqlite::in_memory().unwrap();
        sqlite.create_schema().unwrap();
        let mut store: Box<dyn Store> = Box::new(sqlite);
        let event = json!({ "id": "evt-7", "title": "Garden Wedding", "host_email": HOST });
        store.insert(EVENTS_TABLE, event.as_object().unwrap()).unwrap();

        let dataset = Dataset::builtin().unwrap();
        for round in 0..2 {
            let summary = Seeder::new(&mut store, stamps(round), std::io::sink())
                .run(&dataset, HOST)
                .unwrap();
            assert_eq!(summary.total(), 45);
        }

        let rows = store.select_eq(RSVPS_TABLE, "event_id", "evt-7").unwrap();
        assert_eq!(rows.len(), 90);
        let emma = rows.iter().find(|r| r["guest_name"] == json!("Emma Thompson")).unwrap();
        assert_eq!(emma["meal_choices"], json!("[\"Chicken\",\"Beef\"]"));
        assert_eq!(emma["has_plusone"], json!(1));
    }

    #[test]
    fn numeric_event_ids_are_accepted() {
        let mut row = Row::new();
        row.insert("id".into(), json!(7));
        row.insert("title".into(), json!("Party"));
        assert_eq!(
            TargetEvent::from_row(&row).unwrap(),
            TargetEvent { id: "7".into(), title: "Party".into() }
        );
        assert!(TargetEvent::from_row(&Row::new()).is_err());
    }
}
