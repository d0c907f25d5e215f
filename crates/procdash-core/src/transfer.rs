//! Import and export of document lists as JSON or YAML.

use crate::error::{ProcError, Result};
use crate::record::Document;
use crate::sla::{SlaBand, SlaCalculator};
use crate::types::{DocumentKind, DocumentStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Json,
    Yaml,
}

impl ExportFormat {
    /// Guess from a file extension; defaults to YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => ExportFormat::Json,
            _ => ExportFormat::Yaml,
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ProcError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "json" => Ok(ExportFormat::Json),
            "yaml" | "yml" => Ok(ExportFormat::Yaml),
            _ => Err(ProcError::InvalidValue(format!("unknown format '{s}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    /// Keep existing documents; skip incoming ids that already exist.
    Append,
    /// Replace the whole collection with the incoming list.
    Replace,
}

/// Flat reporting row: a document with its computed SLA.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub no: usize,
    pub id: String,
    pub kind: DocumentKind,
    pub number: String,
    pub title: String,
    pub project: Option<String>,
    pub pic: Option<String>,
    pub value: Option<f64>,
    pub status: DocumentStatus,
    pub received_date: Option<NaiveDate>,
    pub finish_date: Option<NaiveDate>,
    pub sla_days: Option<u32>,
    pub sla_band: SlaBand,
}

/// Rows in the given (already sorted) order, numbered from 1.
pub fn export_rows(docs: &[Document], calc: &SlaCalculator, target_days: u32) -> Vec<ExportRow> {
    docs.iter()
        .enumerate()
        .map(|(i, d)| {
            let sla = d.sla(calc);
            ExportRow {
                no: i + 1,
                id: d.id.clone(),
                kind: d.kind,
                number: d.number.clone(),
                title: d.title.clone(),
                project: d.project.clone(),
                pic: d.pic.clone(),
                value: d.value,
                status: d.status,
                received_date: d.received_date,
                finish_date: d.finish_date,
                sla_days: sla,
                sla_band: SlaBand::classify(sla, target_days),
            }
        })
        .collect()
}

pub fn export_documents(docs: &[Document], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(docs)?),
        ExportFormat::Yaml => Ok(serde_yaml::to_string(docs)?),
    }
}

pub fn export_report(rows: &[ExportRow], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
        ExportFormat::Yaml => Ok(serde_yaml::to_string(rows)?),
    }
}

/// Parse a document list and check ids and duplicates within the batch.
pub fn import_documents(text: &str, format: ExportFormat) -> Result<Vec<Document>> {
    let docs: Vec<Document> = match format {
        ExportFormat::Json => serde_json::from_str(text)?,
        ExportFormat::Yaml => serde_yaml::from_str(text)?,
    };
    let mut seen = HashSet::new();
    for doc in &docs {
        doc.validate()?;
        if !seen.insert(doc.id.as_str()) {
            return Err(ProcError::Import(format!("duplicate id '{}' in input", doc.id)));
        }
    }
    Ok(docs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holiday::HolidayCalendar;

    fn docs() -> Vec<Document> {
        let mut a = Document::new("bq-1", DocumentKind::Bq, "Gedung A");
        a.received_date = NaiveDate::from_ymd_opt(2024, 8, 12);
        a.finish_date = NaiveDate::from_ymd_opt(2024, 8, 23);
        let b = Document::new("bq-2", DocumentKind::Bq, "Gedung B");
        vec![a, b]
    }

    #[test]
    fn json_export_imports_back() {
        let original = docs();
        let text = export_documents(&original, ExportFormat::Json).unwrap();
        let back = import_documents(&text, ExportFormat::Json).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn duplicate_ids_rejected_on_import() {
        let mut list = docs();
        list[1].id = "bq-1".into();
        let text = export_documents(&list, ExportFormat::Yaml).unwrap();
        assert!(matches!(
            import_documents(&text, ExportFormat::Yaml),
            Err(ProcError::Import(_))
        ));
    }

    #[test]
    fn report_rows_carry_sla() {
        let calc = SlaCalculator::new(HolidayCalendar::weekends_only());
        let rows = export_rows(&docs(), &calc, 5);
        assert_eq!(rows[0].no, 1);
        // Mon 12 .. Fri 23 Aug: 10 workdays
        assert_eq!(rows[0].sla_days, Some(9));
        assert_eq!(rows[0].sla_band, SlaBand::Late);
        assert_eq!(rows[1].sla_days, None);
        assert_eq!(rows[1].sla_band, SlaBand::NotApplicable);
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("out.json")), ExportFormat::Json);
        assert_eq!(ExportFormat::from_path(Path::new("out.yaml")), ExportFormat::Yaml);
    }
}
