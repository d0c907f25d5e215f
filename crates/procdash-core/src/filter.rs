use crate::error::{ProcError, Result};
use crate::record::Document;
use crate::reorder::SortState;
use crate::types::{DocumentStatus, SortDirection};
use chrono::NaiveDate;
use serde::Serialize;

/// List-screen filter over documents. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentFilter {
    pub status: Option<DocumentStatus>,
    pub project: Option<String>,
    pub pic: Option<String>,
    pub query: Option<String>,
    pub received_from: Option<NaiveDate>,
    pub received_to: Option<NaiveDate>,
    pub open_only: bool,
}

impl DocumentFilter {
    pub fn is_empty(&self) -> bool {
        *self == DocumentFilter::default()
    }

    pub fn matches(&self, doc: &Document) -> bool {
        if let Some(status) = self.status {
            if doc.status != status {
                return false;
            }
        }
        if self.open_only && !doc.status.is_open() {
            return false;
        }
        if let Some(project) = &self.project {
            if doc.project.as_deref() != Some(project.as_str()) {
                return false;
            }
        }
        if let Some(pic) = &self.pic {
            let matches_pic = doc
                .pic
                .as_deref()
                .is_some_and(|p| p.eq_ignore_ascii_case(pic));
            if !matches_pic {
                return false;
            }
        }
        if self.received_from.is_some() || self.received_to.is_some() {
            let Some(received) = doc.received_date else {
                return false;
            };
            if self.received_from.is_some_and(|from| received < from) {
                return false;
            }
            if self.received_to.is_some_and(|to| received > to) {
                return false;
            }
        }
        if let Some(query) = &self.query {
            let q = query.to_lowercase();
            let hit = [
                Some(doc.number.as_str()),
                Some(doc.title.as_str()),
                doc.pic.as_deref(),
                doc.notes.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&q));
            if !hit {
                return false;
            }
        }
        true
    }
}

/// Parse `key`, `key:asc` or `key:desc` against the allowed keys.
pub fn parse_sort_spec(spec: &str, allowed: &[&str]) -> Result<SortState> {
    let (key, dir) = match spec.split_once(':') {
        Some((k, d)) => (k.trim(), d.trim()),
        None => (spec.trim(), "asc"),
    };
    let direction = match dir {
        "asc" => SortDirection::Asc,
        "desc" => SortDirection::Desc,
        _ => return Err(ProcError::InvalidSortSpec(spec.to_string())),
    };
    if key.is_empty() || !allowed.contains(&key) {
        return Err(ProcError::InvalidSortSpec(spec.to_string()));
    }
    Ok(SortState::new(key, direction))
}
