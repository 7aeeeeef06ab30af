use crate::domain::errors::{DomainError, DomainResult};
use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Id of the window materialized for the default scope
pub const DEFAULT_BUSINESS_HOUR_ID: &str = "default";

const ALL_WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusinessHourType {
    /// Applies to every department without a custom window
    Default,
    /// Applies to the listed departments only
    Custom,
}

/// Scope whose availability is gated by business hours
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BusinessHourScope {
    Default,
    Department(String),
}

impl BusinessHourScope {
    pub fn for_department(department_id: Option<&str>) -> Self {
        match department_id {
            Some(dep) => BusinessHourScope::Department(dep.to_string()),
            None => BusinessHourScope::Default,
        }
    }
}

impl std::fmt::Display for BusinessHourScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BusinessHourScope::Default => write!(f, "default"),
            BusinessHourScope::Department(id) => write!(f, "department:{}", id),
        }
    }
}

/// Open interval for one weekday, in the window's timezone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub day: Weekday,
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl DaySchedule {
    pub fn new(day: Weekday, open: NaiveTime, close: NaiveTime) -> Self {
        Self { day, open, close }
    }

    /// Half-open `[open, close)`; a close at 23:59 runs through midnight
    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.open && (time < self.close || self.close >= end_of_day())
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessHour {
    pub id: String,
    pub name: String,
    pub kind: BusinessHourType,
    #[serde(default)]
    pub departments: Vec<String>,
    pub timezone: String, // IANA timezone (e.g., "America/Sao_Paulo")
    pub schedule: Vec<DaySchedule>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl BusinessHour {
    pub fn new(
        name: String,
        kind: BusinessHourType,
        timezone: String,
        schedule: Vec<DaySchedule>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            kind,
            departments: Vec::new(),
            timezone,
            schedule,
            active: true,
            created_at: Utc::now(),
        }
    }

    pub fn with_department(mut self, department_id: impl Into<String>) -> Self {
        self.departments.push(department_id.into());
        self
    }

    /// Default scope window open the whole week, used when nothing is configured
    pub fn default_all_week() -> Self {
        let schedule = ALL_WEEK
            .iter()
            .map(|day| DaySchedule::new(*day, NaiveTime::MIN, end_of_day()))
            .collect();

        Self {
            id: DEFAULT_BUSINESS_HOUR_ID.to_string(),
            name: String::new(),
            kind: BusinessHourType::Default,
            departments: Vec::new(),
            timezone: "UTC".to_string(),
            schedule,
            active: true,
            created_at: Utc::now(),
        }
    }

    pub fn is_default(&self) -> bool {
        self.kind == BusinessHourType::Default
    }

    pub fn tz(&self) -> DomainResult<Tz> {
        self.timezone.parse::<Tz>().map_err(|_| {
            DomainError::Configuration(format!(
                "Business hour {} has invalid timezone: {}",
                self.id, self.timezone
            ))
        })
    }

    /// Reject windows that cannot be evaluated
    pub fn validate(&self) -> DomainResult<()> {
        self.tz()?;

        if self.kind == BusinessHourType::Custom {
            if self.name.trim().is_empty() {
                return Err(DomainError::Configuration(
                    "Custom business hour requires a name".to_string(),
                ));
            }
            if self.departments.is_empty() {
                return Err(DomainError::Configuration(format!(
                    "Custom business hour {} has no departments",
                    self.id
                )));
            }
        }

        let mut seen = HashSet::new();
        for day in &self.schedule {
            if !seen.insert(day.day) {
                return Err(DomainError::Configuration(format!(
                    "Business hour {} lists {} twice",
                    self.id, day.day
                )));
            }
            if day.open >= day.close {
                return Err(DomainError::Configuration(format!(
                    "Business hour {} opens after it closes on {}",
                    self.id, day.day
                )));
            }
        }

        Ok(())
    }

    /// Whether `now` falls in an open interval, evaluated in the window's timezone
    pub fn is_open_at(&self, now: DateTime<Utc>) -> DomainResult<bool> {
        if !self.active {
            return Ok(false);
        }

        let local = now.with_timezone(&self.tz()?);
        let weekday = local.weekday();

        Ok(self
            .schedule
            .iter()
            .filter(|s| s.day == weekday)
            .any(|s| s.contains(local.time())))
    }
}
