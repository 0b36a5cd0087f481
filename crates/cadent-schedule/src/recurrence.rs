// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Next-run computation for recurrence rules.
//!
//! [`next_run`] is a pure function from a rule and "now" to the next
//! eligible timestamp strictly after "now", with the rule's clock time
//! applied. Calendar math uses `chrono` date arithmetic so month ends
//! clamp instead of overflowing (Jan 31 + 1 month = Feb 28/29).

use chrono::{DateTime, Datelike, Days, Duration, Months, NaiveDate, Utc};
use tracing::warn;

use cadent_core::types::{RecurrenceRule, RecurrenceType};

/// Compute the next run strictly after `now` for `rule`.
///
/// Returns `None` when the recurrence ends: `once` rules, rules whose
/// next occurrence falls past `end_date`, and rules with a malformed
/// `time_of_day` (logged, treated as ended rather than guessed at).
pub fn next_run(rule: &RecurrenceRule, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if rule.kind == RecurrenceType::Once {
        return None;
    }

    let Some((hour, minute)) = rule.time_parts() else {
        warn!(time_of_day = %rule.time_of_day, "invalid time_of_day in recurrence rule");
        return None;
    };

    let interval = rule.interval.max(1);
    let today = now.date_naive();

    let date = match rule.kind {
        RecurrenceType::Once => unreachable!("handled above"),
        RecurrenceType::Daily => today.checked_add_days(Days::new(u64::from(interval)))?,
        RecurrenceType::Weekly => next_weekly_date(rule, today, interval)?,
        RecurrenceType::Monthly => today.checked_add_months(Months::new(interval))?,
        RecurrenceType::Yearly => today.checked_add_months(Months::new(12 * interval))?,
    };

    let mut candidate = date.and_hms_opt(hour, minute, 0)?.and_utc();

    // Clock-skew guard: never hand back a timestamp at or before `now`,
    // which would re-fire the item on the very next dispatch cycle.
    if candidate <= now {
        candidate += Duration::days(1);
    }

    if let Some(end) = rule.end_date
        && candidate > end
    {
        return None;
    }

    Some(candidate)
}

/// Weekly stepping: with an explicit weekday selection, scan forward
/// day-by-day (at most 7 steps) to the next selected weekday; without
/// one, jump a whole number of weeks, which keeps the current weekday.
fn next_weekly_date(rule: &RecurrenceRule, today: NaiveDate, interval: u32) -> Option<NaiveDate> {
    if let Some(days) = rule.days_of_week.as_deref()
        && !days.is_empty()
    {
        for step in 1..=7u64 {
            let date = today.checked_add_days(Days::new(step))?;
            let weekday = date.weekday().num_days_from_sunday() as u8;
            if days.contains(&weekday) {
                return Some(date);
            }
        }
        // Only reachable when every selected value is out of the 0..=6
        // range; fall through to the week jump.
    }

    today.checked_add_days(Days::new(7 * u64::from(interval)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike, Weekday};

    fn rule(json: &str) -> RecurrenceRule {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn once_has_no_next_run() {
        let r = rule(r#"{"type": "once", "timeOfDay": "09:00"}"#);
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
        assert_eq!(next_run(&r, now), None);
    }

    #[test]
    fn daily_advances_by_interval_days_at_configured_time() {
        let r = rule(r#"{"type": "daily", "interval": 3, "timeOfDay": "08:15"}"#);
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
        let next = next_run(&r, now).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 5, 8, 15, 0).unwrap());
    }

    #[test]
    fn weekly_scan_lands_on_next_selected_weekday() {
        // 2026-03-03 is a Tuesday. Selected days: Monday (1) and Wednesday (3).
        let r = rule(r#"{"type": "weekly", "interval": 1, "timeOfDay": "09:00", "daysOfWeek": [1, 3]}"#);
        let now = Utc.with_ymd_and_hms(2026, 3, 3, 10, 0, 0).unwrap();
        let next = next_run(&r, now).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 4, 9, 0, 0).unwrap());
        assert_eq!(next.weekday(), Weekday::Wed);
    }

    #[test]
    fn weekly_without_selection_jumps_whole_weeks() {
        let r = rule(r#"{"type": "weekly", "interval": 2, "timeOfDay": "09:00"}"#);
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
        let next = next_run(&r, now).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 16, 9, 0, 0).unwrap());
    }

    #[test]
    fn weekly_selection_always_yields_selected_weekday_strictly_after_now() {
        let r = rule(r#"{"type": "weekly", "timeOfDay": "14:30", "daysOfWeek": [0, 2, 5]}"#);
        // Property over a spread of starting instants, including ones on
        // selected weekdays before and after the configured time.
        for day in 1..=21 {
            for hour in [0, 9, 14, 23] {
                let now = Utc.with_ymd_and_hms(2026, 3, day, hour, 45, 0).unwrap();
                let next = next_run(&r, now).unwrap();
                assert!(next > now, "next {next} not after now {now}");
                let weekday = next.weekday().num_days_from_sunday() as u8;
                assert!([0u8, 2, 5].contains(&weekday), "weekday {weekday} not selected");
                assert_eq!((next.hour(), next.minute()), (14, 30));
            }
        }
    }

    #[test]
    fn monthly_clamps_to_month_end() {
        let r = rule(r#"{"type": "monthly", "interval": 1, "timeOfDay": "09:00"}"#);
        let now = Utc.with_ymd_and_hms(2026, 1, 31, 10, 0, 0).unwrap();
        let next = next_run(&r, now).unwrap();
        // 2026 is not a leap year: Jan 31 + 1 month clamps to Feb 28.
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 2, 28, 9, 0, 0).unwrap());
    }

    #[test]
    fn yearly_honors_interval() {
        let r = rule(r#"{"type": "yearly", "interval": 2, "timeOfDay": "09:00"}"#);
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
        let next = next_run(&r, now).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2028, 3, 2, 9, 0, 0).unwrap());
    }

    #[test]
    fn result_is_strictly_in_the_future() {
        // A daily rule evaluated just before midnight still lands strictly
        // after now even though the target clock time is earlier in the day.
        let r = rule(r#"{"type": "daily", "interval": 1, "timeOfDay": "00:00"}"#);
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 23, 59, 0).unwrap();
        let next = next_run(&r, now).unwrap();
        assert!(next > now);
    }

    #[test]
    fn recomputation_from_own_output_is_period_stable() {
        let r = rule(r#"{"type": "daily", "interval": 2, "timeOfDay": "07:00"}"#);
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
        let first = next_run(&r, now).unwrap();
        let second = next_run(&r, first).unwrap();
        assert_eq!(second - first, Duration::days(2));

        let weekly = rule(r#"{"type": "weekly", "timeOfDay": "09:00", "daysOfWeek": [1]}"#);
        let first = next_run(&weekly, now).unwrap();
        let second = next_run(&weekly, first).unwrap();
        assert_eq!(second - first, Duration::days(7));
    }

    #[test]
    fn end_date_terminates_the_recurrence() {
        let r = rule(
            r#"{"type": "daily", "interval": 1, "timeOfDay": "09:00", "endDate": "2026-03-03T00:00:00Z"}"#,
        );
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
        assert_eq!(next_run(&r, now), None);

        let open = rule(r#"{"type": "daily", "interval": 1, "timeOfDay": "09:00"}"#);
        assert!(next_run(&open, now).is_some());
    }

    #[test]
    fn malformed_time_of_day_ends_the_recurrence() {
        let mut r = rule(r#"{"type": "daily", "timeOfDay": "09:00"}"#);
        r.time_of_day = "24:99".into();
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
        assert_eq!(next_run(&r, now), None);
    }
}
