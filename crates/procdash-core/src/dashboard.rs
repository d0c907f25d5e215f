//! Derived dashboard figures. Every function is a pure fold over a document
//! slice; callers recompute when the store revision changes.

use crate::record::Document;
use crate::sla::{SlaBand, SlaCalculator};
use crate::types::DocumentStatus;
use chrono::Datelike;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

pub const UNASSIGNED: &str = "(unassigned)";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub status: DocumentStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthCount {
    /// `YYYY-MM`
    pub month: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SlaSummary {
    pub measured: usize,
    pub average: Option<f64>,
    pub min: Option<u32>,
    pub max: Option<u32>,
    pub on_target: usize,
    pub late: usize,
    pub target_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectValue {
    pub project: String,
    pub documents: usize,
    pub total_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PicLoad {
    pub pic: String,
    pub open: usize,
}

pub fn status_counts(docs: &[Document]) -> Vec<StatusCount> {
    DocumentStatus::all()
        .iter()
        .map(|&status| StatusCount {
            status,
            count: docs.iter().filter(|d| d.status == status).count(),
        })
        .collect()
}

pub fn monthly_received(docs: &[Document]) -> Vec<MonthCount> {
    let mut months: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for d in docs {
        if let Some(r) = d.received_date {
            *months.entry((r.year(), r.month())).or_insert(0) += 1;
        }
    }
    months
        .into_iter()
        .map(|((y, m), count)| MonthCount {
            month: format!("{y:04}-{m:02}"),
            count,
        })
        .collect()
}

pub fn sla_summary(docs: &[Document], calc: &SlaCalculator, target_days: u32) -> SlaSummary {
    let mut summary = SlaSummary {
        target_days,
        ..SlaSummary::default()
    };
    let mut total: u64 = 0;
    for d in docs {
        let sla = d.sla(calc);
        match SlaBand::classify(sla, target_days) {
            SlaBand::OnTarget => summary.on_target += 1,
            SlaBand::Late => summary.late += 1,
            SlaBand::NotApplicable => continue,
        }
        if let Some(days) = sla {
            summary.measured += 1;
            total += u64::from(days);
            summary.min = Some(summary.min.map_or(days, |m| m.min(days)));
            summary.max = Some(summary.max.map_or(days, |m| m.max(days)));
        }
    }
    if summary.measured > 0 {
        summary.average = Some(total as f64 / summary.measured as f64);
    }
    summary
}

/// Document count and summed value per project, largest value first.
pub fn value_by_project(docs: &[Document]) -> Vec<ProjectValue> {
    let mut by: HashMap<&str, (usize, f64)> = HashMap::new();
    for d in docs {
        let key = d.project.as_deref().unwrap_or(UNASSIGNED);
        let entry = by.entry(key).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += d.value.unwrap_or(0.0);
    }
    let mut out: Vec<ProjectValue> = by
        .into_iter()
        .map(|(project, (documents, total_value))| ProjectValue {
            project: project.to_string(),
            documents,
            total_value,
        })
        .collect();
    out.sort_by(|a, b| {
        b.total_value
            .total_cmp(&a.total_value)
            .then_with(|| a.project.cmp(&b.project))
    });
    out
}

/// Open documents per person in charge, busiest first.
pub fn pic_workload(docs: &[Document]) -> Vec<PicLoad> {
    let mut by: HashMap<&str, usize> = HashMap::new();
    for d in docs.iter().filter(|d| d.status.is_open()) {
        *by.entry(d.pic.as_deref().unwrap_or(UNASSIGNED)).or_insert(0) += 1;
    }
    let mut out: Vec<PicLoad> = by
        .into_iter()
        .map(|(pic, open)| PicLoad {
            pic: pic.to_string(),
            open,
        })
        .collect();
    out.sort_by(|a, b| b.open.cmp(&a.open).then_with(|| a.pic.cmp(&b.pic)));
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub total: usize,
    pub statuses: Vec<StatusCount>,
    pub monthly: Vec<MonthCount>,
    pub sla: SlaSummary,
    pub projects: Vec<ProjectValue>,
    pub workload: Vec<PicLoad>,
}

impl Dashboard {
    pub fn build(docs: &[Document], calc: &SlaCalculator, target_days: u32) -> Self {
        Self {
            total: docs.len(),
            statuses: status_counts(docs),
            monthly: monthly_received(docs),
            sla: sla_summary(docs, calc, target_days),
            projects: value_by_project(docs),
            workload: pic_workload(docs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holiday::HolidayCalendar;
    use crate::types::DocumentKind;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn docs() -> Vec<Document> {
        let mut a = Document::new("a", DocumentKind::Rab, "A");
        a.status = DocumentStatus::Finished;
        a.received_date = date(2024, 8, 12);
        a.finish_date = date(2024, 8, 14); // 2
        a.project = Some("p1".into());
        a.value = Some(100.0);
        a.pic = Some("Rina".into());

        let mut b = Document::new("b", DocumentKind::Rab, "B");
        b.status = DocumentStatus::Finished;
        b.received_date = date(2024, 8, 12);
        b.finish_date = date(2024, 8, 26); // 10
        b.project = Some("p2".into());
        b.value = Some(300.0);

        let mut c = Document::new("c", DocumentKind::Rab, "C");
        c.status = DocumentStatus::InProgress;
        c.received_date = date(2024, 9, 2);
        c.pic = Some("Rina".into());
        c.value = Some(50.0);
        c.project = Some("p1".into());

        vec![a, b, c]
    }

    #[test]
    fn status_counts_are_zero_filled() {
        let counts = status_counts(&docs());
        assert_eq!(counts.len(), DocumentStatus::all().len());
        let finished = counts
            .iter()
            .find(|c| c.status == DocumentStatus::Finished)
            .unwrap();
        assert_eq!(finished.count, 2);
        assert!(counts
            .iter()
            .any(|c| c.status == DocumentStatus::Draft && c.count == 0));
    }

    #[test]
    fn months_are_sorted() {
        let months = monthly_received(&docs());
        assert_eq!(
            months,
            vec![
                MonthCount { month: "2024-08".into(), count: 2 },
                MonthCount { month: "2024-09".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn sla_summary_against_target() {
        let calc = SlaCalculator::new(HolidayCalendar::weekends_only());
        let s = sla_summary(&docs(), &calc, 5);
        assert_eq!(s.measured, 2);
        assert_eq!(s.on_target, 1);
        assert_eq!(s.late, 1);
        assert_eq!(s.min, Some(2));
        assert_eq!(s.max, Some(10));
        assert_eq!(s.average, Some(6.0));
    }

    #[test]
    fn project_values_largest_first() {
        let v = value_by_project(&docs());
        assert_eq!(v[0].project, "p2");
        assert_eq!(v[1].project, "p1");
        assert_eq!(v[1].documents, 2);
        assert!((v[1].total_value - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn workload_counts_open_only() {
        let w = pic_workload(&docs());
        assert_eq!(w, vec![PicLoad { pic: "Rina".into(), open: 1 }]);
    }

    #[test]
    fn empty_dashboard() {
        let d = Dashboard::build(&[], &SlaCalculator::default(), 5);
        assert_eq!(d.total, 0);
        assert!(d.sla.average.is_none());
        assert!(d.monthly.is_empty());
    }
}
