//! Internal helpers for parsing, calendar math and name normalization.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use chrono::{Datelike, NaiveDate};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::KeyNotFound(format!("invalid {label} id")))
}

/// Parse a `YYYY-MM` month into the first day of that month.
pub(crate) fn parse_month(month: &str) -> ResultEngine<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
        .map_err(|_| EngineError::InvalidMonth(month.to_string()))
}

/// `YYYY-MM` key for a date.
pub(crate) fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Last calendar day of the month `date` falls in.
pub(crate) fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = match date.month() {
        12 => (date.year() + 1, 1),
        m => (date.year(), m + 1),
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(date)
}

/// Every `YYYY-MM` month from `start`'s month through `end`'s month.
///
/// Empty when `end` precedes `start`.
pub(crate) fn months_between(start: NaiveDate, end: NaiveDate) -> Vec<String> {
    let mut months = Vec::new();
    let Some(mut cursor) = NaiveDate::from_ymd_opt(start.year(), start.month(), 1) else {
        return months;
    };
    let last = last_day_of_month(end);

    while cursor <= last {
        months.push(month_key(cursor));
        let next = match cursor.month() {
            12 => NaiveDate::from_ymd_opt(cursor.year() + 1, 1, 1),
            m => NaiveDate::from_ymd_opt(cursor.year(), m + 1, 1),
        };
        match next {
            Some(date) => cursor = date,
            None => break,
        }
    }
    months
}

/// Case- and accent-insensitive key for category names.
///
/// NFKD fold, combining marks stripped, non-alphanumeric runs collapsed to
/// single spaces. Returns `None` when nothing alphanumeric remains.
pub(crate) fn normalize_category_key(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut out = String::new();
    let mut prev_space = false;
    for ch in trimmed.nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    let normalized = out.trim();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn parse_month_accepts_year_month() {
        assert_eq!(parse_month("2024-01").unwrap(), date(2024, 1, 1));
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("not-a-month").is_err());
    }

    #[test]
    fn last_day_handles_leap_years() {
        assert_eq!(last_day_of_month(date(2024, 2, 10)), date(2024, 2, 29));
        assert_eq!(last_day_of_month(date(2023, 2, 1)), date(2023, 2, 28));
        assert_eq!(last_day_of_month(date(2024, 12, 31)), date(2024, 12, 31));
    }

    #[test]
    fn months_between_spans_year_boundary() {
        assert_eq!(
            months_between(date(2023, 11, 15), date(2024, 2, 1)),
            vec!["2023-11", "2023-12", "2024-01", "2024-02"]
        );
        assert!(months_between(date(2024, 3, 1), date(2024, 1, 1)).is_empty());
    }

    #[test]
    fn normalize_folds_case_and_accents() {
        assert_eq!(normalize_category_key("Food"), Some("food".to_string()));
        assert_eq!(normalize_category_key("  Café  "), Some("cafe".to_string()));
        assert_eq!(normalize_category_key("Rent & Bills"), Some("rent bills".to_string()));
        assert_eq!(normalize_category_key("   "), None);
    }
}
