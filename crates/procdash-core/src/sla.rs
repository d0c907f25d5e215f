//! SLA turnaround in working days.
//!
//! The count walks every calendar day of `[received, finish]` inclusive,
//! keeps the workdays, and drops one for the received day itself, so a
//! same-day turnaround reports 0.

use crate::holiday::HolidayCalendar;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

/// Parse an ISO `YYYY-MM-DD` date. A full RFC 3339 timestamp is accepted and
/// truncated to its date part.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Workdays elapsed between two dates, or `None` when `finish < received`.
pub fn sla_between(received: NaiveDate, finish: NaiveDate, cal: &HolidayCalendar) -> Option<u32> {
    if finish < received {
        return None;
    }
    let workdays = received
        .iter_days()
        .take_while(|d| *d <= finish)
        .filter(|d| cal.is_workday(*d))
        .count() as u32;
    Some(workdays.saturating_sub(1))
}

/// String-level entry point used by views: missing or unparseable input
/// yields `None`, rendered as `-`.
pub fn calculate_sla(
    received: Option<&str>,
    finish: Option<&str>,
    cal: &HolidayCalendar,
) -> Option<u32> {
    let received = parse_date(received?)?;
    let finish = parse_date(finish?)?;
    sla_between(received, finish, cal)
}

pub fn format_sla(sla: Option<u32>) -> String {
    match sla {
        Some(days) => days.to_string(),
        None => "-".to_string(),
    }
}

// ---------------------------------------------------------------------------
// SlaCalculator
// ---------------------------------------------------------------------------

/// Calendar plus a per-(received, finish) memo.
#[derive(Debug)]
pub struct SlaCalculator {
    calendar: HolidayCalendar,
    memo: RefCell<HashMap<(NaiveDate, NaiveDate), Option<u32>>>,
}

impl SlaCalculator {
    pub fn new(calendar: HolidayCalendar) -> Self {
        Self {
            calendar,
            memo: RefCell::new(HashMap::new()),
        }
    }

    pub fn calendar(&self) -> &HolidayCalendar {
        &self.calendar
    }

    pub fn between(&self, received: NaiveDate, finish: NaiveDate) -> Option<u32> {
        if let Some(hit) = self.memo.borrow().get(&(received, finish)) {
            return *hit;
        }
        let sla = sla_between(received, finish, &self.calendar);
        self.memo.borrow_mut().insert((received, finish), sla);
        sla
    }

    pub fn for_dates(&self, received: Option<NaiveDate>, finish: Option<NaiveDate>) -> Option<u32> {
        self.between(received?, finish?)
    }

    pub fn calculate(&self, received: Option<&str>, finish: Option<&str>) -> Option<u32> {
        let received = parse_date(received?)?;
        let finish = parse_date(finish?)?;
        self.between(received, finish)
    }

    pub fn memo_len(&self) -> usize {
        self.memo.borrow().len()
    }
}

impl Default for SlaCalculator {
    fn default() -> Self {
        Self::new(HolidayCalendar::default())
    }
}

// ---------------------------------------------------------------------------
// SlaBand
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaBand {
    OnTarget,
    Late,
    NotApplicable,
}

impl SlaBand {
    pub fn classify(sla: Option<u32>, target_days: u32) -> Self {
        match sla {
            Some(days) if days <= target_days => SlaBand::OnTarget,
            Some(_) => SlaBand::Late,
            None => SlaBand::NotApplicable,
        }
    }
}

impl fmt::Display for SlaBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SlaBand::OnTarget => "on_target",
            SlaBand::Late => "late",
            SlaBand::NotApplicable => "n/a",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holiday::Holiday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn same_workday_is_zero() {
        let cal = HolidayCalendar::indonesia();
        assert_eq!(calculate_sla(Some("2024-08-12"), Some("2024-08-12"), &cal), Some(0));
    }

    #[test]
    fn weekend_only_range_is_zero() {
        let cal = HolidayCalendar::indonesia();
        assert_eq!(calculate_sla(Some("2024-08-10"), Some("2024-08-11"), &cal), Some(0));
    }

    #[test]
    fn full_week_counts_four_elapsed_days() {
        let cal = HolidayCalendar::weekends_only();
        // Sunday through Saturday: Mon..Fri are workdays.
        assert_eq!(calculate_sla(Some("2024-08-11"), Some("2024-08-17"), &cal), Some(4));
    }

    #[test]
    fn holiday_mid_range_is_excluded() {
        let plain = HolidayCalendar::weekends_only();
        let national = HolidayCalendar::indonesia();
        // Mon 6 May .. Fri 10 May 2024; 9th is Ascension, 10th collective leave.
        assert_eq!(calculate_sla(Some("2024-05-06"), Some("2024-05-10"), &plain), Some(4));
        assert_eq!(calculate_sla(Some("2024-05-06"), Some("2024-05-10"), &national), Some(2));
    }

    #[test]
    fn adding_a_holiday_strictly_decreases() {
        let base = HolidayCalendar::weekends_only();
        let with = base.with_extra(&[date(2024, 3, 13)]);
        let without = sla_between(date(2024, 3, 11), date(2024, 3, 15), &base).unwrap();
        let fewer = sla_between(date(2024, 3, 11), date(2024, 3, 15), &with).unwrap();
        assert_eq!(fewer + 1, without);
    }

    #[test]
    fn finish_before_received_is_none() {
        let cal = HolidayCalendar::indonesia();
        assert_eq!(calculate_sla(Some("2024-08-15"), Some("2024-08-14"), &cal), None);
    }

    #[test]
    fn missing_or_garbage_is_none() {
        let cal = HolidayCalendar::indonesia();
        assert_eq!(calculate_sla(None, Some("2024-08-14"), &cal), None);
        assert_eq!(calculate_sla(Some("2024-08-14"), None, &cal), None);
        assert_eq!(calculate_sla(Some("14/08/2024"), Some("2024-08-15"), &cal), None);
        assert_eq!(calculate_sla(Some(""), Some("2024-08-15"), &cal), None);
    }

    #[test]
    fn timestamp_input_keeps_date_part() {
        assert_eq!(parse_date("2024-08-12T09:30:00+07:00"), Some(date(2024, 8, 12)));
        assert_eq!(parse_date(" 2024-08-12 "), Some(date(2024, 8, 12)));
    }

    #[test]
    fn holiday_start_day_still_floors_at_zero() {
        let cal = HolidayCalendar::new(
            "test",
            vec![Holiday {
                date: date(2024, 8, 12),
                name: "x".into(),
            }],
        );
        assert_eq!(sla_between(date(2024, 8, 12), date(2024, 8, 12), &cal), Some(0));
    }

    #[test]
    fn result_is_never_negative_over_a_year() {
        let cal = HolidayCalendar::indonesia();
        let start = date(2024, 1, 1);
        for offset in 0..366 {
            let finish = start + chrono::Duration::days(offset);
            assert!(sla_between(start, finish, &cal).is_some());
        }
    }

    #[test]
    fn calculator_memoizes() {
        let calc = SlaCalculator::new(HolidayCalendar::weekends_only());
        assert_eq!(calc.calculate(Some("2024-08-12"), Some("2024-08-16")), Some(4));
        assert_eq!(calc.calculate(Some("2024-08-12"), Some("2024-08-16")), Some(4));
        assert_eq!(calc.memo_len(), 1);
        assert_eq!(calc.for_dates(None, Some(date(2024, 8, 16))), None);
    }

    #[test]
    fn band_classification() {
        assert_eq!(SlaBand::classify(Some(3), 5), SlaBand::OnTarget);
        assert_eq!(SlaBand::classify(Some(5), 5), SlaBand::OnTarget);
        assert_eq!(SlaBand::classify(Some(6), 5), SlaBand::Late);
        assert_eq!(SlaBand::classify(None, 5), SlaBand::NotApplicable);
        assert_eq!(format_sla(None), "-");
    }
}
