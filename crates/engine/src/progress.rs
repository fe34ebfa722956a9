//! Savings scheme funding progress.
//!
//! Progress is recomputed from the budgets whose months overlap the
//! scheme's range; nothing here touches storage. Calendar granularity is
//! whole months: both the end date and the as-of date are normalized to
//! the last day of their month before day counts are taken.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::util::{last_day_of_month, months_between};

/// Income and spend totals for one budgeted month.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MonthTotals {
    pub income_minor: i64,
    pub spent_minor: i64,
}

/// Result of a progress computation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchemeProgress {
    /// Funding progress in whole percent, 0..=100.
    pub progress: i64,
    pub total_income_minor: i64,
    pub saved_minor: i64,
    pub total_spent_minor: i64,
    /// True when at least one month in the range has a budget.
    pub active: bool,
}

/// Computes funding progress for a scheme.
///
/// `months` maps `YYYY-MM` keys to the totals of the user's budgets; only
/// months inside `start..=end` contribute. Savings for a month are
/// `income - spent`; once the accumulated savings reach
/// `min_amount_minor` the scheme is fully funded.
///
/// Below the target, progress is the saved percentage scaled by the
/// elapsed share of the scheme's duration
/// (`saved_pct / time_pct * 100`). Early in a scheme this amplifies small
/// savings; that is the established product behavior and is kept as-is.
pub fn compute(
    start_date: NaiveDate,
    end_date: NaiveDate,
    min_amount_minor: i64,
    months: &HashMap<String, MonthTotals>,
    today: NaiveDate,
) -> SchemeProgress {
    let as_of = if today > end_date { end_date } else { today };
    let end = last_day_of_month(end_date);
    let as_of = last_day_of_month(as_of);

    let total_days = (end - start_date).num_days() + 1;
    let elapsed_days = (as_of - start_date).num_days() + 1;

    let mut result = SchemeProgress::default();
    for month in months_between(start_date, end_date) {
        let Some(totals) = months.get(&month) else {
            continue;
        };
        result.active = true;
        result.total_income_minor += totals.income_minor;
        result.total_spent_minor += totals.spent_minor;
        result.saved_minor += totals.income_minor - totals.spent_minor;
    }

    result.progress = if result.saved_minor >= min_amount_minor {
        100
    } else {
        let saved_pct = percent(result.saved_minor, min_amount_minor);
        let time_pct = percent(elapsed_days, total_days);
        if time_pct <= 0.0 {
            0
        } else {
            (saved_pct / time_pct * 100.0).clamp(0.0, 100.0).round() as i64
        }
    };

    result
}

fn percent(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn month_totals(entries: &[(&str, i64, i64)]) -> HashMap<String, MonthTotals> {
        entries
            .iter()
            .map(|(month, income_minor, spent_minor)| {
                (
                    month.to_string(),
                    MonthTotals {
                        income_minor: *income_minor,
                        spent_minor: *spent_minor,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn no_overlapping_budgets_is_inactive_zero() {
        let result = compute(
            date(2024, 1, 1),
            date(2024, 3, 1),
            30_000,
            &HashMap::new(),
            date(2024, 2, 15),
        );
        assert!(!result.active);
        assert_eq!(result.progress, 0);
        assert_eq!(result.saved_minor, 0);
        assert_eq!(result.total_income_minor, 0);
    }

    #[test]
    fn savings_at_target_is_fully_funded() {
        // Jan and Feb each save 300: 600 total against a 300 target.
        let months = month_totals(&[("2024-01", 50_000, 20_000), ("2024-02", 50_000, 20_000)]);
        let result = compute(date(2024, 1, 1), date(2024, 3, 1), 30_000, &months, date(2024, 2, 10));
        assert!(result.active);
        assert_eq!(result.progress, 100);
        assert_eq!(result.saved_minor, 60_000);
        assert_eq!(result.total_income_minor, 100_000);
        assert_eq!(result.total_spent_minor, 40_000);
    }

    #[test]
    fn partial_progress_scales_saved_share_by_elapsed_share() {
        // 2024 is a leap year: Jan 1 through Dec 31 is 366 days, Jan 1
        // through Mar 31 is 91. saved_pct = 10, time_pct = 91/366*100,
        // progress = 10 / time_pct * 100 = 40.2 -> 40.
        let months = month_totals(&[("2024-01", 30_000, 18_000)]);
        let result = compute(
            date(2024, 1, 1),
            date(2024, 12, 1),
            120_000,
            &months,
            date(2024, 3, 15),
        );
        assert!(result.active);
        assert_eq!(result.saved_minor, 12_000);
        assert_eq!(result.progress, 40);
    }

    #[test]
    fn as_of_is_clamped_to_scheme_end() {
        // Evaluated long after the scheme ended; elapsed == total.
        let months = month_totals(&[("2024-01", 30_000, 24_000)]);
        let result = compute(
            date(2024, 1, 1),
            date(2024, 2, 1),
            30_000,
            &months,
            date(2026, 8, 5),
        );
        // saved_pct = 20, time_pct = 100 -> progress 20.
        assert_eq!(result.progress, 20);
    }

    #[test]
    fn overspending_floors_progress_at_zero() {
        let months = month_totals(&[("2024-01", 10_000, 25_000)]);
        let result = compute(
            date(2024, 1, 1),
            date(2024, 6, 1),
            50_000,
            &months,
            date(2024, 3, 1),
        );
        assert!(result.active);
        assert_eq!(result.saved_minor, -15_000);
        assert_eq!(result.progress, 0);
    }

    #[test]
    fn scheme_starting_in_the_future_reports_zero() {
        let months = month_totals(&[("2030-01", 50_000, 0)]);
        let result = compute(
            date(2030, 1, 1),
            date(2030, 6, 1),
            1_000_000,
            &months,
            date(2024, 1, 1),
        );
        // Elapsed share is non-positive; nothing meaningful to scale.
        assert_eq!(result.progress, 0);
    }
}
