//! Period window arithmetic.
//!
//! Boundaries are built the way a `Date(year, month, day, h, m, s)` constructor
//! builds them: the day number is counted from the first of the month and may
//! run outside it. Day 0 therefore lands on the last day of the previous month
//! and day 31 of a short month spills into the next one.
//!
//! | reference  | kind  | start               | end                 |
//! |------------|-------|---------------------|---------------------|
//! | 2024-03-15 | month | 2024-02-29 00:00:00 | 2024-03-31 23:59:59 |
//! | 2023-02-10 | month | 2023-01-31 00:00:00 | 2023-03-03 23:59:59 |
//! | 2024-xx-xx | year  | 2023-12-31 00:00:00 | 2024-12-31 23:59:59 |

use chrono::{
    DateTime, Datelike, Duration, LocalResult, Months, NaiveDate, NaiveDateTime, NaiveTime,
    Offset, TimeZone, Utc,
};

use crate::models::{PeriodKind, PeriodWindow};

const END_OF_DAY_SECS: i64 = 23 * 3600 + 59 * 60 + 59;

/// Window for `kind` around `reference`, computed in the reference's zone.
pub fn window_for<Tz: TimeZone>(kind: PeriodKind, reference: &DateTime<Tz>) -> PeriodWindow {
    let tz = reference.timezone();
    let today = reference.naive_local().date();

    let (start, end) = match kind {
        PeriodKind::Month => {
            let first = today - Duration::days(i64::from(today.day0()));
            (day_of(first, 0), day_of(first, 31))
        }
        PeriodKind::Year => {
            let january = today - Duration::days(i64::from(today.ordinal0()));
            let december = january + Months::new(11);
            (day_of(january, 0), day_of(december, 31))
        }
    };

    PeriodWindow {
        kind,
        start: resolve(&tz, start_of_day(start)),
        end: resolve(&tz, start_of_day(end) + Duration::seconds(END_OF_DAY_SECS)),
    }
}

/// Day number `day` counted from `first_of_month` (day 1), allowed to overflow.
fn day_of(first_of_month: NaiveDate, day: i64) -> NaiveDate {
    first_of_month + Duration::days(day - 1)
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Maps a wall-clock time in `tz` to UTC. Repeated local times take the
/// earlier instant; skipped ones use the offset in force before the gap.
fn resolve<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(instant) => instant.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => {
            let offset = tz.offset_from_utc_datetime(&local).fix();
            let utc = local - Duration::seconds(i64::from(offset.local_minus_utc()));
            Utc.from_utc_datetime(&utc)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn month_window_in_leap_march() {
        let window = window_for(PeriodKind::Month, &utc(2024, 3, 15, 10, 0, 0));
        assert_eq!(window.kind, PeriodKind::Month);
        assert_eq!(window.start, utc(2024, 2, 29, 0, 0, 0));
        assert_eq!(window.end, utc(2024, 3, 31, 23, 59, 59));
    }

    #[test]
    fn month_window_overflows_short_february() {
        let window = window_for(PeriodKind::Month, &utc(2023, 2, 10, 10, 0, 0));
        assert_eq!(window.start, utc(2023, 1, 31, 0, 0, 0));
        assert_eq!(window.end, utc(2023, 3, 3, 23, 59, 59));
    }

    #[test]
    fn month_window_for_thirty_day_month_ends_on_next_first() {
        let window = window_for(PeriodKind::Month, &utc(2024, 4, 30, 23, 0, 0));
        assert_eq!(window.start, utc(2024, 3, 31, 0, 0, 0));
        assert_eq!(window.end, utc(2024, 5, 1, 23, 59, 59));
    }

    #[test]
    fn january_month_window_starts_in_previous_year() {
        let window = window_for(PeriodKind::Month, &utc(2025, 1, 1, 0, 0, 0));
        assert_eq!(window.start, utc(2024, 12, 31, 0, 0, 0));
        assert_eq!(window.end, utc(2025, 1, 31, 23, 59, 59));
    }

    #[test]
    fn year_window_is_the_same_for_any_day_of_the_year() {
        for reference in [
            utc(2024, 1, 1, 0, 0, 0),
            utc(2024, 2, 29, 12, 0, 0),
            utc(2024, 12, 31, 23, 59, 58),
        ] {
            let window = window_for(PeriodKind::Year, &reference);
            assert_eq!(window.kind, PeriodKind::Year);
            assert_eq!(window.start, utc(2023, 12, 31, 0, 0, 0));
            assert_eq!(window.end, utc(2024, 12, 31, 23, 59, 59));
        }
    }

    #[test]
    fn boundaries_follow_the_reference_zone() {
        let cet = FixedOffset::east_opt(3600).unwrap();
        let reference = cet.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        let window = window_for(PeriodKind::Month, &reference);
        assert_eq!(window.start, utc(2024, 2, 28, 23, 0, 0));
        assert_eq!(window.end, utc(2024, 3, 31, 22, 59, 59));
    }

    #[test]
    fn reference_in_window_except_last_second_of_long_month() {
        let inside = utc(2024, 1, 31, 23, 59, 58);
        assert!(window_for(PeriodKind::Month, &inside).contains(&inside));

        let at_end = utc(2024, 1, 31, 23, 59, 59);
        assert!(!window_for(PeriodKind::Month, &at_end).contains(&at_end));
    }
}
