use crate::error::{ProcError, Result};
use crate::holiday::HolidayCalendar;
use crate::paths;
use crate::sla::SlaCalculator;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// SlaConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaConfig {
    #[serde(default = "default_target_days")]
    pub target_days: u32,
    #[serde(default = "default_builtin")]
    pub builtin_holidays: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_holidays: Vec<NaiveDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed_holidays: Vec<NaiveDate>,
}

fn default_target_days() -> u32 {
    5
}

fn default_builtin() -> bool {
    true
}

impl Default for SlaConfig {
    fn default() -> Self {
        Self {
            target_days: default_target_days(),
            builtin_holidays: default_builtin(),
            extra_holidays: Vec::new(),
            removed_holidays: Vec::new(),
        }
    }
}

impl SlaConfig {
    pub fn calendar(&self) -> HolidayCalendar {
        let base = if self.builtin_holidays {
            HolidayCalendar::indonesia()
        } else {
            HolidayCalendar::weekends_only()
        };
        base.with_extra(&self.extra_holidays)
            .without(&self.removed_holidays)
    }

    pub fn calculator(&self) -> SlaCalculator {
        SlaCalculator::new(self.calendar())
    }
}

// ---------------------------------------------------------------------------
// DisplayConfig / ProjectConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Maximum rows printed by list commands; unlimited when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: ProjectConfig,
    #[serde(default)]
    pub sla: SlaConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

fn default_version() -> u32 {
    1
}

impl Config {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            project: ProjectConfig {
                name: project_name.into(),
                description: None,
            },
            sla: SlaConfig::default(),
            display: DisplayConfig::default(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(ProcError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.sla.target_days == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "sla.target_days is 0: only same-day turnaround counts as on target"
                    .to_string(),
            });
        }

        for date in &self.sla.extra_holidays {
            if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("extra holiday {date} falls on a weekend and has no effect"),
                });
            }
            if self.sla.removed_holidays.contains(date) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("{date} is listed in both extra_holidays and removed_holidays"),
                });
            }
        }

        let mut extra = self.sla.extra_holidays.clone();
        extra.sort();
        if extra.windows(2).any(|w| w[0] == w[1]) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "sla.extra_holidays contains duplicate dates".to_string(),
            });
        }

        if self.display.page_size == Some(0) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "display.page_size must be at least 1".to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::new("test-project");
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.project.name, "test-project");
        assert_eq!(parsed.sla.target_days, 5);
        assert!(parsed.sla.builtin_holidays);
    }

    #[test]
    fn minimal_yaml_fills_defaults() {
        let cfg: Config = serde_yaml::from_str("project:\n  name: x\n").unwrap();
        assert_eq!(cfg.version, 1);
        assert_eq!(cfg.sla.target_days, 5);
        assert!(cfg.display.page_size.is_none());
    }

    #[test]
    fn load_missing_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(Config::load(dir.path()), Err(ProcError::NotInitialized)));
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::new("p");
        cfg.sla.extra_holidays.push(date(2024, 3, 15));
        cfg.save(dir.path()).unwrap();
        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.sla.extra_holidays, vec![date(2024, 3, 15)]);
    }

    #[test]
    fn calendar_honours_extra_and_removed() {
        let mut cfg = SlaConfig::default();
        cfg.extra_holidays.push(date(2024, 3, 15));
        cfg.removed_holidays.push(date(2024, 8, 17));
        let cal = cfg.calendar();
        assert!(cal.is_holiday(date(2024, 3, 15)));
        assert!(!cal.is_holiday(date(2024, 8, 17)));
        assert!(cal.is_holiday(date(2024, 5, 9)));

        cfg.builtin_holidays = false;
        assert!(!cfg.calendar().is_holiday(date(2024, 5, 9)));
    }

    #[test]
    fn validate_clean_config() {
        assert!(Config::new("p").validate().is_empty());
    }

    #[test]
    fn validate_flags_weekend_and_conflicts() {
        let mut cfg = Config::new("p");
        cfg.sla.target_days = 0;
        cfg.sla.extra_holidays = vec![date(2024, 8, 10), date(2024, 3, 15)];
        cfg.sla.removed_holidays = vec![date(2024, 3, 15)];
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 3);
        assert!(warnings.iter().any(|w| w.level == WarnLevel::Error));
        assert!(warnings.iter().any(|w| w.message.contains("weekend")));
    }
}
