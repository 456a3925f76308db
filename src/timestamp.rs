use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const WINDOW_DAYS: i64 = 14;
const MAX_HOUR_OFFSET: i64 = 23;

/// Spreads `created_at` values over the two weeks before `now`.
///
/// Every value is `now - 14d + d days + h hours` with `d` in `0..=14` and
/// `h` in `0..=23`, so the latest possible value lies 23 hours past `now`.
pub struct TimestampGenerator<R: Rng = StdRng> {
    base: DateTime<Utc>,
    rng: R,
}

impl TimestampGenerator<StdRng> {
    /// Seeded from `seed` when given, from OS entropy otherwise.
    pub fn new(now: DateTime<Utc>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(now, rng)
    }
}

impl<R: Rng> TimestampGenerator<R> {
    pub fn with_rng(now: DateTime<Utc>, rng: R) -> Self {
        Self {
            base: now - Duration::days(WINDOW_DAYS),
            rng,
        }
    }

    pub fn next_datetime(&mut self) -> DateTime<Utc> {
        let days = self.rng.gen_range(0..=WINDOW_DAYS);
        let hours = self.rng.gen_range(0..=MAX_HOUR_OFFSET);
        self.base + Duration::days(days) + Duration::hours(hours)
    }

    pub fn next_timestamp(&mut self) -> String {
        self.next_datetime()
            .to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    /// Inclusive bounds of every value this generator can produce.
    pub fn window(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            self.base,
            self.base + Duration::days(WINDOW_DAYS) + Duration::hours(MAX_HOUR_OFFSET),
        )
    }
}
