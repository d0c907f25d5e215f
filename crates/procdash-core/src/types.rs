use crate::error::ProcError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// DocumentKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Bq,
    Rab,
}

impl DocumentKind {
    pub fn all() -> &'static [DocumentKind] {
        &[DocumentKind::Bq, DocumentKind::Rab]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Bq => "bq",
            DocumentKind::Rab => "rab",
        }
    }

    /// Long-form label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Bq => "Bill of Quantity",
            DocumentKind::Rab => "Rencana Anggaran Biaya",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentKind {
    type Err = ProcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bq" | "boq" => Ok(DocumentKind::Bq),
            "rab" => Ok(DocumentKind::Rab),
            _ => Err(ProcError::InvalidKind(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// DocumentStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Draft,
    Received,
    InProgress,
    Review,
    Finished,
    Cancelled,
}

impl DocumentStatus {
    pub fn all() -> &'static [DocumentStatus] {
        &[
            DocumentStatus::Draft,
            DocumentStatus::Received,
            DocumentStatus::InProgress,
            DocumentStatus::Review,
            DocumentStatus::Finished,
            DocumentStatus::Cancelled,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Received => "received",
            DocumentStatus::InProgress => "in_progress",
            DocumentStatus::Review => "review",
            DocumentStatus::Finished => "finished",
            DocumentStatus::Cancelled => "cancelled",
        }
    }

    /// Still somewhere in the pipeline: not finished and not cancelled.
    pub fn is_open(self) -> bool {
        match self {
            DocumentStatus::Draft
            | DocumentStatus::Received
            | DocumentStatus::InProgress
            | DocumentStatus::Review => true,
            DocumentStatus::Finished | DocumentStatus::Cancelled => false,
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentStatus {
    type Err = ProcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(DocumentStatus::Draft),
            "received" => Ok(DocumentStatus::Received),
            "in_progress" | "in-progress" => Ok(DocumentStatus::InProgress),
            "review" => Ok(DocumentStatus::Review),
            "finished" | "done" => Ok(DocumentStatus::Finished),
            "cancelled" | "canceled" => Ok(DocumentStatus::Cancelled),
            _ => Err(ProcError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planning,
    Active,
    OnHold,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Planning => "planning",
            ProjectStatus::Active => "active",
            ProjectStatus::OnHold => "on_hold",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = ProcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planning" => Ok(ProjectStatus::Planning),
            "active" => Ok(ProjectStatus::Active),
            "on_hold" | "on-hold" => Ok(ProjectStatus::OnHold),
            "completed" => Ok(ProjectStatus::Completed),
            "cancelled" | "canceled" => Ok(ProjectStatus::Cancelled),
            _ => Err(ProcError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// SortDirection / MoveDirection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    Up,
    Down,
}

impl fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveDirection::Up => f.write_str("up"),
            MoveDirection::Down => f.write_str("down"),
        }
    }
}

impl std::str::FromStr for MoveDirection {
    type Err = ProcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(MoveDirection::Up),
            "down" => Ok(MoveDirection::Down),
            _ => Err(ProcError::InvalidDirection(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_roundtrip() {
        for &status in DocumentStatus::all() {
            let parsed: DocumentStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("approved".parse::<DocumentStatus>().is_err());
    }

    #[test]
    fn open_statuses() {
        assert!(DocumentStatus::Review.is_open());
        assert!(!DocumentStatus::Finished.is_open());
        assert!(!DocumentStatus::Cancelled.is_open());
    }

    #[test]
    fn kind_accepts_boq_alias() {
        assert_eq!("BoQ".parse::<DocumentKind>().unwrap(), DocumentKind::Bq);
        assert!("invoice".parse::<DocumentKind>().is_err());
    }

    #[test]
    fn status_yaml_is_snake_case() {
        let yaml = serde_yaml::to_string(&DocumentStatus::InProgress).unwrap();
        assert_eq!(yaml.trim(), "in_progress");
    }
}
