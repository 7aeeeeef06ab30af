use crate::domain::entities::{BusinessHour, BusinessHourScope, BusinessHourType};
use crate::domain::errors::DomainResult;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Per-scope open/closed state computed from every configured window at one instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilitySnapshot {
    pub computed_at: DateTime<Utc>,
    default_open: bool,
    departments: HashMap<String, bool>,
}

impl AvailabilitySnapshot {
    /// Full re-evaluation; fails on the first window that cannot be evaluated
    pub fn compute(windows: &[BusinessHour], now: DateTime<Utc>) -> DomainResult<Self> {
        let mut default_open = false;
        let mut departments: HashMap<String, bool> = HashMap::new();

        for window in windows {
            window.validate()?;
            let open = window.is_open_at(now)?;

            match window.kind {
                BusinessHourType::Default => default_open |= open,
                BusinessHourType::Custom => {
                    for dep in &window.departments {
                        *departments.entry(dep.clone()).or_insert(false) |= open;
                    }
                }
            }
        }

        Ok(Self {
            computed_at: now,
            default_open,
            departments,
        })
    }

    /// Departments without a custom window follow the default scope
    pub fn is_open(&self, scope: &BusinessHourScope) -> bool {
        match scope {
            BusinessHourScope::Default => self.default_open,
            BusinessHourScope::Department(dep) => self
                .departments
                .get(dep)
                .copied()
                .unwrap_or(self.default_open),
        }
    }

    /// Every explicitly evaluated scope with its state
    pub fn scopes(&self) -> Vec<(BusinessHourScope, bool)> {
        let mut scopes = vec![(BusinessHourScope::Default, self.default_open)];
        let mut deps: Vec<_> = self.departments.iter().collect();
        deps.sort();
        scopes.extend(
            deps.into_iter()
                .map(|(dep, open)| (BusinessHourScope::Department(dep.clone()), *open)),
        );
        scopes
    }

    /// Scopes whose state differs from `previous`
    pub fn changes_since(&self, previous: &AvailabilitySnapshot) -> Vec<(BusinessHourScope, bool)> {
        let mut changed: Vec<_> = self
            .scopes()
            .into_iter()
            .filter(|(scope, open)| previous.is_open(scope) != *open)
            .collect();

        // Departments that lost their custom window and now follow the default
        let mut dropped: Vec<_> = previous
            .departments
            .keys()
            .filter(|dep| !self.departments.contains_key(*dep))
            .map(|dep| BusinessHourScope::Department(dep.clone()))
            .filter(|scope| previous.is_open(scope) != self.is_open(scope))
            .collect();
        dropped.sort_by_key(|scope| scope.to_string());
        changed.extend(dropped.into_iter().map(|scope| {
            let open = self.is_open(&scope);
            (scope, open)
        }));

        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::DaySchedule;
    use chrono::{NaiveTime, TimeZone, Weekday};

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn sales_window() -> BusinessHour {
        BusinessHour::new(
            "Sales".to_string(),
            BusinessHourType::Custom,
            "UTC".to_string(),
            vec![DaySchedule::new(Weekday::Mon, hm(9, 0), hm(17, 0))],
        )
        .with_department("sales")
    }

    #[test]
    fn test_departments_inherit_default_scope() {
        // Monday 2026-10-19 20:00 UTC
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 20, 0, 0).unwrap();
        let snapshot =
            AvailabilitySnapshot::compute(&[BusinessHour::default_all_week(), sales_window()], now)
                .unwrap();

        assert!(snapshot.is_open(&BusinessHourScope::Default));
        assert!(!snapshot.is_open(&BusinessHourScope::for_department(Some("sales"))));
        assert!(snapshot.is_open(&BusinessHourScope::for_department(Some("support"))));
    }

    #[test]
    fn test_malformed_window_fails_evaluation() {
        let mut broken = sales_window();
        broken.timezone = "Mars/Olympus_Mons".to_string();
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0).unwrap();

        assert!(AvailabilitySnapshot::compute(&[broken], now).is_err());
    }

    #[test]
    fn test_changes_since_reports_flipped_scopes() {
        let windows = [BusinessHour::default_all_week(), sales_window()];
        let morning = Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0).unwrap();
        let evening = Utc.with_ymd_and_hms(2026, 10, 19, 18, 0, 0).unwrap();

        let before = AvailabilitySnapshot::compute(&windows, morning).unwrap();
        let after = AvailabilitySnapshot::compute(&windows, evening).unwrap();

        assert_eq!(
            after.changes_since(&before),
            vec![(BusinessHourScope::Department("sales".to_string()), false)]
        );
        assert!(after.changes_since(&after).is_empty());
    }
}
