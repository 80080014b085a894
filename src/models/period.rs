//! Period kinds, their windows and the configured limits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PeriodKind {
    Month,
    Year,
}

impl PeriodKind {
    pub const ALL: [PeriodKind; 2] = [PeriodKind::Month, PeriodKind::Year];

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodKind::Month => "month",
            PeriodKind::Year => "year",
        }
    }
}

/// Time range a period sum is taken over. Derived from a reference instant,
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodWindow {
    pub kind: PeriodKind,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl PeriodWindow {
    /// Same half-open test the ledger scan applies: `start <= t < end`.
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant >= self.start && *instant < self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodLimit {
    pub kind: PeriodKind,
    pub max_weight: f64,
}

/// One limit per period kind, fixed for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodLimits {
    month: PeriodLimit,
    year: PeriodLimit,
}

impl PeriodLimits {
    pub fn new(month_max: f64, year_max: f64) -> Self {
        Self {
            month: PeriodLimit {
                kind: PeriodKind::Month,
                max_weight: month_max,
            },
            year: PeriodLimit {
                kind: PeriodKind::Year,
                max_weight: year_max,
            },
        }
    }

    pub fn for_kind(&self, kind: PeriodKind) -> &PeriodLimit {
        match kind {
            PeriodKind::Month => &self.month,
            PeriodKind::Year => &self.year,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn limits_are_looked_up_by_their_own_kind() {
        let limits = PeriodLimits::new(1_000.0, 12_000.0);
        assert_eq!(limits.for_kind(PeriodKind::Month).max_weight, 1_000.0);
        assert_eq!(limits.for_kind(PeriodKind::Year).max_weight, 12_000.0);
        assert_eq!(limits.for_kind(PeriodKind::Year).kind, PeriodKind::Year);
    }

    #[test]
    fn window_contains_start_but_not_end() {
        let window = PeriodWindow {
            kind: PeriodKind::Month,
            start: Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 59).unwrap(),
        };
        assert!(window.contains(&window.start));
        assert!(!window.contains(&window.end));
        assert!(window.contains(&Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap()));
    }
}
