//! Holiday calendar used by the SLA workday count.
//!
//! Weekends (Saturday and Sunday) are always non-working days. On top of that
//! a calendar carries a fixed table of dated holidays. The built-in table is
//! the Indonesian national holiday list plus government collective leave
//! (cuti bersama) for the operating years.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use std::collections::BTreeMap;

/// A single dated non-working day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
}

// (year, month, day, name)
const INDONESIA: &[(i32, u32, u32, &str)] = &[
    // 2024
    (2024, 1, 1, "Tahun Baru Masehi"),
    (2024, 2, 8, "Isra Mi'raj"),
    (2024, 2, 9, "Cuti bersama Imlek"),
    (2024, 2, 10, "Tahun Baru Imlek"),
    (2024, 3, 11, "Hari Suci Nyepi"),
    (2024, 3, 12, "Cuti bersama Nyepi"),
    (2024, 3, 29, "Wafat Isa Almasih"),
    (2024, 3, 31, "Hari Paskah"),
    (2024, 4, 8, "Cuti bersama Idul Fitri"),
    (2024, 4, 9, "Cuti bersama Idul Fitri"),
    (2024, 4, 10, "Idul Fitri"),
    (2024, 4, 11, "Idul Fitri"),
    (2024, 4, 12, "Cuti bersama Idul Fitri"),
    (2024, 4, 15, "Cuti bersama Idul Fitri"),
    (2024, 5, 1, "Hari Buruh"),
    (2024, 5, 9, "Kenaikan Isa Almasih"),
    (2024, 5, 10, "Cuti bersama Kenaikan"),
    (2024, 5, 23, "Hari Raya Waisak"),
    (2024, 5, 24, "Cuti bersama Waisak"),
    (2024, 6, 1, "Hari Lahir Pancasila"),
    (2024, 6, 17, "Idul Adha"),
    (2024, 6, 18, "Cuti bersama Idul Adha"),
    (2024, 7, 7, "Tahun Baru Islam"),
    (2024, 8, 17, "Hari Kemerdekaan"),
    (2024, 9, 16, "Maulid Nabi Muhammad"),
    (2024, 12, 25, "Hari Raya Natal"),
    (2024, 12, 26, "Cuti bersama Natal"),
    // 2025
    (2025, 1, 1, "Tahun Baru Masehi"),
    (2025, 1, 27, "Isra Mi'raj"),
    (2025, 1, 28, "Cuti bersama Imlek"),
    (2025, 1, 29, "Tahun Baru Imlek"),
    (2025, 3, 28, "Cuti bersama Nyepi"),
    (2025, 3, 29, "Hari Suci Nyepi"),
    (2025, 3, 31, "Idul Fitri"),
    (2025, 4, 1, "Idul Fitri"),
    (2025, 4, 2, "Cuti bersama Idul Fitri"),
    (2025, 4, 3, "Cuti bersama Idul Fitri"),
    (2025, 4, 4, "Cuti bersama Idul Fitri"),
    (2025, 4, 7, "Cuti bersama Idul Fitri"),
    (2025, 4, 18, "Wafat Isa Almasih"),
    (2025, 4, 20, "Hari Paskah"),
    (2025, 5, 1, "Hari Buruh"),
    (2025, 5, 12, "Hari Raya Waisak"),
    (2025, 5, 13, "Cuti bersama Waisak"),
    (2025, 5, 29, "Kenaikan Isa Almasih"),
    (2025, 5, 30, "Cuti bersama Kenaikan"),
    (2025, 6, 1, "Hari Lahir Pancasila"),
    (2025, 6, 6, "Idul Adha"),
    (2025, 6, 9, "Cuti bersama Idul Adha"),
    (2025, 6, 27, "Tahun Baru Islam"),
    (2025, 8, 17, "Hari Kemerdekaan"),
    (2025, 8, 18, "Cuti bersama Kemerdekaan"),
    (2025, 9, 5, "Maulid Nabi Muhammad"),
    (2025, 12, 25, "Hari Raya Natal"),
    (2025, 12, 26, "Cuti bersama Natal"),
];

/// An immutable set of dated holidays. Weekends are implied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayCalendar {
    name: String,
    holidays: BTreeMap<NaiveDate, String>,
}

impl HolidayCalendar {
    pub fn new(name: impl Into<String>, holidays: impl IntoIterator<Item = Holiday>) -> Self {
        Self {
            name: name.into(),
            holidays: holidays.into_iter().map(|h| (h.date, h.name)).collect(),
        }
    }

    /// Weekends only, no dated holidays.
    pub fn weekends_only() -> Self {
        Self::new("Weekends Only", Vec::new())
    }

    /// Built-in Indonesian national holidays and collective leave.
    pub fn indonesia() -> Self {
        let holidays = INDONESIA.iter().filter_map(|&(y, m, d, name)| {
            NaiveDate::from_ymd_opt(y, m, d).map(|date| Holiday {
                date,
                name: name.to_string(),
            })
        });
        Self::new("Indonesia", holidays)
    }

    /// Copy of this calendar with additional dates. Existing names win.
    pub fn with_extra(&self, dates: &[NaiveDate]) -> Self {
        let mut holidays = self.holidays.clone();
        for &date in dates {
            holidays
                .entry(date)
                .or_insert_with(|| "Configured holiday".to_string());
        }
        Self {
            name: self.name.clone(),
            holidays,
        }
    }

    /// Copy of this calendar with the given dates removed.
    pub fn without(&self, dates: &[NaiveDate]) -> Self {
        let mut holidays = self.holidays.clone();
        for date in dates {
            holidays.remove(date);
        }
        Self {
            name: self.name.clone(),
            holidays,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.holidays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty()
    }

    pub fn is_weekend(&self, date: NaiveDate) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains_key(&date)
    }

    pub fn is_workday(&self, date: NaiveDate) -> bool {
        !self.is_weekend(date) && !self.is_holiday(date)
    }

    pub fn holiday_name(&self, date: NaiveDate) -> Option<&str> {
        self.holidays.get(&date).map(String::as_str)
    }

    /// Holidays falling in `year`, in date order.
    pub fn holidays_in(&self, year: i32) -> Vec<Holiday> {
        self.holidays
            .iter()
            .filter(|(date, _)| date.year() == year)
            .map(|(date, name)| Holiday {
                date: *date,
                name: name.clone(),
            })
            .collect()
    }

    /// Every year that has at least one dated holiday.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.holidays.keys().map(|d| d.year()).collect();
        years.dedup();
        years
    }
}

impl Default for HolidayCalendar {
    fn default() -> Self {
        Self::indonesia()
    }
}
