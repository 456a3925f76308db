use thiserror::Error;

use crate::rsvp::AttendanceStatus;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("{0}")]
    MissingConfiguration(String),
    #[error("invalid guest list: {0}")]
    InvalidDataset(String),
    #[error("No event found for {host_email}")]
    EventNotFound { host_email: String },
    #[error("event lookup failed: {0:#}")]
    Lookup(anyhow::Error),
    #[error("failed to insert {status} rsvp for {guest} after {committed} committed rows: {cause:#}")]
    InsertFailed {
        guest: String,
        status: AttendanceStatus,
        committed: usize,
        cause: anyhow::Error,
    },
}

impl SeedError {
    /// Process exit code; a partial seed is kept apart from failed preconditions.
    pub fn exit_code(&self) -> u8 {
        match self {
            SeedError::InsertFailed { .. } => 2,
            _ => 1,
        }
    }
}
