use serde::{Deserialize, Serialize};

use crate::dataset::{AttendingGuest, DecliningGuest, PendingGuest};

pub const EVENTS_TABLE: &str = "events";
pub const RSVPS_TABLE: &str = "rsvps";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    #[serde(rename = "attending")]
    Attending,
    #[serde(rename = "not_attending")]
    NotAttending,
    #[serde(rename = "pending")]
    Pending,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Attending => "attending",
            AttendanceStatus::NotAttending => "not_attending",
            AttendanceStatus::Pending => "pending",
        }
    }

    /// Label used in the progress report.
    pub fn label(&self) -> &'static str {
        match self {
            AttendanceStatus::Attending => "Attending",
            AttendanceStatus::NotAttending => "Not Attending",
            AttendanceStatus::Pending => "Pending",
        }
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the `rsvps` table as it is submitted to the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRsvp {
    pub event_id: String,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: String,
    pub attendance_status: AttendanceStatus,
    pub number_of_guests: u32,
    pub has_plusone: bool,
    // Declined and pending rows omit the key entirely; attending rows send
    // an explicit null when there is no plus-one.
    #[serde(skip_serializing_if = "PlusOne::is_omitted")]
    pub plusone_name: PlusOne,
    pub meal_choices: Vec<String>,
    pub message: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlusOne {
    Omitted,
    Named(Option<String>),
}

impl PlusOne {
    fn is_omitted(&self) -> bool {
        matches!(self, PlusOne::Omitted)
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            PlusOne::Named(Some(name)) => Some(name.as_str()),
            _ => None,
        }
    }
}

impl Serialize for PlusOne {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.name() {
            Some(name) => serializer.serialize_some(name),
            None => serializer.serialize_none(),
        }
    }
}

impl NewRsvp {
    pub fn attending(event_id: &str, guest: &AttendingGuest, created_at: String) -> Self {
        Self {
            event_id: event_id.to_string(),
            guest_name: guest.name.clone(),
            guest_email: guest.email.clone(),
            guest_phone: guest.phone.clone(),
            attendance_status: AttendanceStatus::Attending,
            number_of_guests: guest.guests,
            has_plusone: guest.plusone,
            plusone_name: PlusOne::Named(guest.plusone_name.clone()),
            meal_choices: guest.meal.clone(),
            message: guest.message.clone(),
            created_at,
        }
    }

    pub fn not_attending(event_id: &str, guest: &DecliningGuest, created_at: String) -> Self {
        Self {
            event_id: event_id.to_string(),
            guest_name: guest.name.clone(),
            guest_email: guest.email.clone(),
            guest_phone: guest.phone.clone(),
            attendance_status: AttendanceStatus::NotAttending,
            number_of_guests: 0,
            has_plusone: false,
            plusone_name: PlusOne::Omitted,
            meal_choices: Vec::new(),
            message: guest.message.clone(),
            created_at,
        }
    }

    pub fn pending(event_id: &str, guest: &PendingGuest, created_at: String) -> Self {
        Self {
            event_id: event_id.to_string(),
            guest_name: guest.name.clone(),
            guest_email: guest.email.clone(),
            guest_phone: guest.phone.clone(),
            attendance_status: AttendanceStatus::Pending,
            number_of_guests: 0,
            has_plusone: false,
            plusone_name: PlusOne::Omitted,
            meal_choices: Vec::new(),
            message: String::new(),
            created_at,
        }
    }

    /// Convert into the loosely typed row shape the stores accept.
    pub fn to_row(&self) -> anyhow::Result<crate::db::Row> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(map),
            other => Err(anyhow::anyhow!("rsvp serialized to non-object: {}", other)),
        }
    }
}
