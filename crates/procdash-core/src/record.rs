use crate::error::Result;
use crate::paths;
use crate::reorder::{Orderable, SortValue};
use crate::sla::SlaCalculator;
use crate::types::{DocumentKind, DocumentStatus, ProjectStatus};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Column keys a document list can be sorted by.
pub const DOCUMENT_SORT_KEYS: &[&str] = &[
    "number", "title", "project", "pic", "value", "status", "received", "finish", "created",
];

/// Column keys a project list can be sorted by.
pub const PROJECT_SORT_KEYS: &[&str] = &["name", "client", "status", "budget", "start", "end"];

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A BQ or RAB document tracked through receipt and completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub kind: DocumentKind,
    #[serde(default)]
    pub number: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    pub status: DocumentStatus,
    #[serde(default)]
    pub received_date: Option<NaiveDate>,
    #[serde(default)]
    pub finish_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(id: impl Into<String>, kind: DocumentKind, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            kind,
            number: String::new(),
            title: title.into(),
            project: None,
            pic: None,
            value: None,
            status: DocumentStatus::Draft,
            received_date: None,
            finish_date: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<()> {
        paths::validate_id(&self.id)?;
        if let Some(project) = &self.project {
            paths::validate_id(project)?;
        }
        Ok(())
    }

    /// Move to `status`, filling in the dates the new status implies.
    pub fn set_status(&mut self, status: DocumentStatus, today: NaiveDate) {
        match status {
            DocumentStatus::Draft => {
                self.received_date = None;
                self.finish_date = None;
            }
            DocumentStatus::Received | DocumentStatus::InProgress | DocumentStatus::Review => {
                self.received_date.get_or_insert(today);
                self.finish_date = None;
            }
            DocumentStatus::Finished => {
                self.received_date.get_or_insert(today);
                self.finish_date.get_or_insert(today);
            }
            DocumentStatus::Cancelled => {}
        }
        self.status = status;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn sla(&self, calc: &SlaCalculator) -> Option<u32> {
        calc.for_dates(self.received_date, self.finish_date)
    }
}

fn text(s: &str) -> Option<SortValue> {
    if s.is_empty() {
        None
    } else {
        Some(SortValue::from(s))
    }
}

impl Orderable for Document {
    fn id(&self) -> &str {
        &self.id
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        match key {
            "number" => text(&self.number),
            "title" => text(&self.title),
            "project" => self.project.as_deref().and_then(text),
            "pic" => self.pic.as_deref().and_then(text),
            "value" => self.value.map(SortValue::from),
            "status" => Some(SortValue::Number(self.status as u8 as f64)),
            "received" => self.received_date.map(SortValue::from),
            "finish" => self.finish_date.map(SortValue::from),
            "created" => Some(SortValue::Number(self.created_at.timestamp_millis() as f64)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub status: ProjectStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            client: None,
            location: None,
            status: ProjectStatus::Planning,
            budget: None,
            start_date: None,
            end_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Orderable for Project {
    fn id(&self) -> &str {
        &self.id
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        match key {
            "name" => text(&self.name),
            "client" => self.client.as_deref().and_then(text),
            "status" => Some(SortValue::from(self.status.as_str())),
            "budget" => self.budget.map(SortValue::from),
            "start" => self.start_date.map(SortValue::from),
            "end" => self.end_date.map(SortValue::from),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
