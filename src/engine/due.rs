//! Due-date resolution and due-status preview.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Days-until-due at or below which a due date is "soon".
const SOON_DAYS: i64 = 5;

/// The number of days in a calendar month.
pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    let first_of_next = if month >= 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(31)
}

/// A date in the given month with the day clamped into the month's range.
pub(crate) fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let day = day.clamp(1, days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
}

/// The instant at which a calendar date begins, in UTC.
pub(crate) fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Computes the default due date for a debt from the plan's pay date.
///
/// The pay date is taken as a day-of-month in `now`'s current UTC month,
/// clamped to the month's length (pay date 31 in February becomes the 28th or
/// 29th). If that day has already begun relative to `now` it rolls forward to
/// the next month and clamps again, so the result is never in the past.
///
/// Returns `None` when `pay_date` is outside `[1, 31]`. Never panics.
///
/// The roll-forward comparison is against the full instant, not the calendar
/// day: computed at any time other than exactly midnight UTC on the pay day
/// itself, the candidate is already "in the past" and rolls to next month.
pub fn default_debt_due_date(pay_date: i64, now: DateTime<Utc>) -> Option<NaiveDate> {
    if !(1..=31).contains(&pay_date) {
        return None;
    }
    let day = pay_date as u32;
    let today = now.date_naive();
    let (year, month) = (today.year(), today.month());
    match clamped_date(year, month, day) {
        Some(candidate) if midnight_utc(candidate) >= now => Some(candidate),
        _ => {
            let (next_year, next_month) = if month >= 12 {
                (year + 1, 1)
            } else {
                (year, month + 1)
            };
            clamped_date(next_year, next_month, day)
        }
    }
}

/// String form of [`default_debt_due_date`]: `YYYY-MM-DD`, or the empty string
/// when no due date is computable.
pub fn default_debt_due_date_iso(pay_date: i64, now: DateTime<Utc>) -> String {
    default_debt_due_date(pay_date, now)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Calendar days from `today` until `due`. Negative when overdue.
pub fn days_until(due: NaiveDate, today: NaiveDate) -> i64 {
    due.signed_duration_since(today).num_days()
}

/// Urgency tier for an upcoming due date.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DueUrgency {
    /// Settled; date math does not apply.
    Paid,
    /// Due today or already overdue.
    OverdueOrToday,
    /// Due within the next five days.
    Soon,
    #[default]
    Later,
}

serde_plain::derive_display_from_serialize!(DueUrgency);

/// Display-ready due-status metadata for a debt or expense.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DuePreview {
    pub due_date: Option<NaiveDate>,
    pub days_until_due: Option<i64>,
    pub urgency: DueUrgency,
    pub label: String,
}

/// Derives the due preview for an item.
///
/// A `paid` item short-circuits to the fixed "Paid" state regardless of date
/// math. Otherwise the explicit due date wins; when absent, the default from
/// [`default_debt_due_date`] is used. When neither is computable the preview
/// degrades to [`DueUrgency::Later`] with a "No due date" label.
pub fn due_preview(
    paid: bool,
    explicit_due: Option<NaiveDate>,
    pay_date: i64,
    now: DateTime<Utc>,
) -> DuePreview {
    if paid {
        return DuePreview {
            due_date: explicit_due,
            days_until_due: None,
            urgency: DueUrgency::Paid,
            label: "Paid".to_string(),
        };
    }
    let due = explicit_due.or_else(|| default_debt_due_date(pay_date, now));
    let Some(due) = due else {
        return DuePreview {
            due_date: None,
            days_until_due: None,
            urgency: DueUrgency::Later,
            label: "No due date".to_string(),
        };
    };
    let days = days_until(due, now.date_naive());
    let urgency = if days <= 0 {
        DueUrgency::OverdueOrToday
    } else if days <= SOON_DAYS {
        DueUrgency::Soon
    } else {
        DueUrgency::Later
    };
    let label = match days {
        d if d < 0 => "Overdue".to_string(),
        0 => "Due today".to_string(),
        1 => "Due tomorrow".to_string(),
        d => format!("Due in {d} days"),
    };
    DuePreview {
        due_date: Some(due),
        days_until_due: Some(days),
        urgency,
        label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn instant(y: i32, m: u32, d: u32, hh: u32, mm: u32, ss: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, hh, mm, ss).unwrap()
    }

    #[test]
    fn test_leap_year_clamp() {
        let now = instant(2024, 2, 15, 0, 0, 0);
        assert_eq!(default_debt_due_date_iso(31, now), "2024-02-29");

        let now = instant(2023, 2, 15, 0, 0, 0);
        assert_eq!(default_debt_due_date_iso(31, now), "2023-02-28");
    }

    #[test]
    fn test_out_of_range_pay_date_is_sentinel() {
        let now = instant(2024, 6, 10, 12, 0, 0);
        assert_eq!(default_debt_due_date_iso(0, now), "");
        assert_eq!(default_debt_due_date_iso(32, now), "");
        assert_eq!(default_debt_due_date_iso(-5, now), "");
        assert_eq!(default_debt_due_date(0, now), None);
    }

    #[test]
    fn test_roll_forward_when_candidate_instant_has_passed() {
        // One second past midnight on the 1st: the clamped candidate's instant
        // is already earlier than now, so the date rolls to the next month.
        let now = instant(2024, 3, 1, 0, 0, 1);
        assert_eq!(default_debt_due_date_iso(1, now), "2024-04-01");
    }

    #[test]
    fn test_exactly_midnight_does_not_roll() {
        let now = instant(2024, 3, 1, 0, 0, 0);
        assert_eq!(default_debt_due_date_iso(1, now), "2024-03-01");
    }

    #[test]
    fn test_future_day_in_current_month() {
        let now = instant(2024, 3, 10, 23, 59, 59);
        assert_eq!(default_debt_due_date_iso(27, now), "2024-03-27");
    }

    #[test]
    fn test_december_rolls_into_january() {
        let now = instant(2024, 12, 20, 0, 0, 0);
        assert_eq!(default_debt_due_date_iso(5, now), "2025-01-05");
    }

    #[test]
    fn test_roll_forward_reclamps_against_next_month() {
        // Jan 31 has begun, so pay date 31 rolls into February and clamps.
        let now = instant(2024, 1, 31, 8, 0, 0);
        assert_eq!(default_debt_due_date_iso(31, now), "2024-02-29");
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(2024, 4), 30);
    }

    #[test]
    fn test_due_preview_paid_short_circuits() {
        let now = instant(2024, 3, 10, 0, 0, 0);
        let overdue = NaiveDate::from_ymd_opt(2020, 1, 1);
        let preview = due_preview(true, overdue, 27, now);
        assert_eq!(preview.urgency, DueUrgency::Paid);
        assert_eq!(preview.label, "Paid");
        assert_eq!(preview.days_until_due, None);
    }

    #[test]
    fn test_due_preview_tiers() {
        let now = instant(2024, 3, 10, 0, 0, 0);
        let date = |d| NaiveDate::from_ymd_opt(2024, 3, d);

        let preview = due_preview(false, date(8), 27, now);
        assert_eq!(preview.urgency, DueUrgency::OverdueOrToday);
        assert_eq!(preview.label, "Overdue");

        let preview = due_preview(false, date(10), 27, now);
        assert_eq!(preview.urgency, DueUrgency::OverdueOrToday);
        assert_eq!(preview.label, "Due today");

        let preview = due_preview(false, date(11), 27, now);
        assert_eq!(preview.urgency, DueUrgency::Soon);
        assert_eq!(preview.label, "Due tomorrow");

        let preview = due_preview(false, date(15), 27, now);
        assert_eq!(preview.urgency, DueUrgency::Soon);

        let preview = due_preview(false, date(16), 27, now);
        assert_eq!(preview.urgency, DueUrgency::Later);
        assert_eq!(preview.label, "Due in 6 days");
    }

    #[test]
    fn test_due_preview_falls_back_to_default_due_date() {
        let now = instant(2024, 3, 10, 0, 0, 0);
        let preview = due_preview(false, None, 27, now);
        assert_eq!(preview.due_date, NaiveDate::from_ymd_opt(2024, 3, 27));
        assert_eq!(preview.days_until_due, Some(17));
        assert_eq!(preview.urgency, DueUrgency::Later);
    }

    #[test]
    fn test_due_preview_without_computable_date() {
        let now = instant(2024, 3, 10, 0, 0, 0);
        let preview = due_preview(false, None, 0, now);
        assert_eq!(preview.due_date, None);
        assert_eq!(preview.urgency, DueUrgency::Later);
        assert_eq!(preview.label, "No due date");
    }
}
