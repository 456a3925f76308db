use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::SeedError;

const BUILTIN_GUESTS: &str = include_str!("../data/guests.yaml");

#[derive(Debug, Clone, Deserialize)]
pub struct AttendingGuest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub guests: u32,
    #[serde(default)]
    pub plusone: bool,
    #[serde(default)]
    pub plusone_name: Option<String>,
    #[serde(default)]
    pub meal: Vec<String>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecliningGuest {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PendingGuest {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// The guest list for one event, grouped by response.
#[derive(Debug, Clone, Deserialize)]
pub struct Dataset {
    pub host_email: String,
    #[serde(default)]
    pub attending: Vec<AttendingGuest>,
    #[serde(default)]
    pub not_attending: Vec<DecliningGuest>,
    #[serde(default)]
    pub pending: Vec<PendingGuest>,
}

impl Dataset {
    /// The sample wedding guest list shipped with the binary.
    pub fn builtin() -> Result<Self, SeedError> {
        Self::from_yaml(BUILTIN_GUESTS)
    }

    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let data = read(path).map_err(|e| SeedError::InvalidDataset(format!("{:#}", e)))?;
        Self::from_yaml(&data)
    }

    pub fn from_yaml(data: &str) -> Result<Self, SeedError> {
        let dataset: Dataset = serde_yaml::from_str(data)
            .map_err(|e| SeedError::InvalidDataset(format!("failed to parse guest list: {}", e)))?;
        dataset.validate()?;
        Ok(dataset)
    }

    pub fn validate(&self) -> Result<(), SeedError> {
        if self.host_email.trim().is_empty() {
            return Err(SeedError::InvalidDataset("host_email must not be empty".into()));
        }
        for guest in &self.attending {
            if guest.guests == 0 {
                return Err(invalid(guest, "an attending guest needs at least one seat"));
            }
            if guest.meal.len() != guest.guests as usize {
                return Err(invalid(
                    guest,
                    &format!("{} meal choices for {} guests", guest.meal.len(), guest.guests),
                ));
            }
            let named = guest
                .plusone_name
                .as_deref()
                .is_some_and(|n| !n.trim().is_empty());
            if guest.plusone != named {
                return Err(invalid(guest, "plusone must be set exactly when plusone_name is given"));
            }
        }
        Ok(())
    }

    pub fn total(&self) -> usize {
        self.attending.len() + self.not_attending.len() + self.pending.len()
    }

    /// Seats taken by attending guests, plus-ones and children included.
    pub fn headcount(&self) -> u32 {
        self.attending.iter().map(|g| g.guests).sum()
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn invalid(guest: &AttendingGuest, reason: &str) -> SeedError {
    SeedError::InvalidDataset(format!("{}: {}", guest.name, reason))
}
