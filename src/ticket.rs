use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Workflow stage of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Pending,
    InProgress,
    Done,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::InProgress => "In Progress",
            Status::Done => "Done",
        }
    }

    /// Parses the value a selector writes back (the display label).
    pub fn from_value(s: &str) -> Option<Self> {
        Status::all().iter().copied().find(|status| status.as_str() == s)
    }

    /// All statuses in display order.
    pub fn all() -> &'static [Status] {
        &[Status::Pending, Status::InProgress, Status::Done]
    }
}

/// Urgency classification, independent of the `is_urgent` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    pub fn from_value(s: &str) -> Option<Self> {
        Priority::all()
            .iter()
            .copied()
            .find(|priority| priority.as_str() == s)
    }

    pub fn all() -> &'static [Priority] {
        &[Priority::Low, Priority::Medium, Priority::High]
    }
}

/// A maintenance/incident report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub title: String,
    pub description: String,
    pub incident_date: NaiveDate,
    #[serde(default)]
    pub is_urgent: bool,
    pub status: Status,
    pub priority: Priority,
    pub requester: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub responsible: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// A typed update to exactly one ticket attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    Title(String),
    Description(String),
    IncidentDate(NaiveDate),
    IsUrgent(bool),
    Status(Status),
    Priority(Priority),
    Requester(String),
    Location(String),
    Responsible(String),
}

impl Ticket {
    /// Read a ticket from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read ticket file: {}", path.display()))?;
        let ticket: Ticket = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse ticket file: {}", path.display()))?;
        Ok(ticket)
    }

    pub fn apply(&mut self, change: FieldChange) {
        match change {
            FieldChange::Title(v) => self.title = v,
            FieldChange::Description(v) => self.description = v,
            FieldChange::IncidentDate(d) => self.incident_date = d,
            FieldChange::IsUrgent(b) => self.is_urgent = b,
            FieldChange::Status(s) => self.status = s,
            FieldChange::Priority(p) => self.priority = p,
            FieldChange::Requester(v) => self.requester = v,
            FieldChange::Location(v) => self.location = Some(v),
            FieldChange::Responsible(v) => self.responsible = Some(v),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_ticket() -> Ticket {
    Ticket {
        title: "Broken window".to_string(),
        description: "Second floor, east wing".to_string(),
        incident_date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
        is_urgent: false,
        status: Status::Pending,
        priority: Priority::Medium,
        requester: "Ana".to_string(),
        location: Some("Building A".to_string()),
        responsible: None,
        image: Some("https://example.com/window.jpg".to_string()),
    }
}
