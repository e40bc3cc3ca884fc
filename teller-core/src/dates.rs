//! Calendar-date parsing with statement-period year inference.
//!
//! Statement rows carry `MM/DD` (occasionally `MM/DD/YY` or `MM/DD/YYYY`);
//! the statement period supplies the missing year, including across a
//! December–January boundary.

use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static DATE_MD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})(?:/(\d{2,4}))?$").unwrap());

/// The statement's reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl StatementPeriod {
    /// Year a `MM/DD` row inside this period belongs to. Cross-year periods
    /// assign months >= the start month to the start year, the rest to the
    /// end year.
    pub fn year_for_month(&self, month: u32) -> i32 {
        if self.start.year() == self.end.year() {
            self.end.year()
        } else if month >= self.start.month() {
            self.start.year()
        } else {
            self.end.year()
        }
    }
}

/// True when the cell is a `MM/DD`-shaped token (with optional year).
pub fn is_date_like(cell: &str) -> bool {
    DATE_MD_RE.is_match(cell.trim())
}

/// Parse `MM/DD`, `MM/DD/YY`, or `MM/DD/YYYY` into a calendar date.
///
/// Year precedence: explicit year in the cell, then the statement period,
/// then `assume_year`, then the current year. Two-digit years split at 50.
pub fn parse_statement_date(
    raw: &str,
    period: Option<&StatementPeriod>,
    assume_year: Option<i32>,
) -> Option<NaiveDate> {
    let caps = DATE_MD_RE.captures(raw.trim())?;
    let month: u32 = caps[1].parse().ok()?;
    let day: u32 = caps[2].parse().ok()?;

    let year = match caps.get(3) {
        Some(y) => {
            let mut y: i32 = y.as_str().parse().ok()?;
            if y < 100 {
                y += if y < 50 { 2000 } else { 1900 };
            }
            y
        }
        None => match period {
            Some(p) => p.year_for_month(month),
            None => assume_year.unwrap_or_else(|| Utc::now().year()),
        },
    };

    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(start: (i32, u32, u32), end: (i32, u32, u32)) -> StatementPeriod {
        StatementPeriod {
            start: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
        }
    }

    #[test]
    fn test_same_year_period() {
        let p = period((2025, 4, 22), (2025, 5, 21));
        let d = parse_statement_date("05/05", Some(&p), None).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2025, 5, 5).unwrap());
    }

    #[test]
    fn test_cross_year_period() {
        let p = period((2024, 12, 15), (2025, 1, 14));
        // December belongs to the start year, January to the end year.
        let dec = parse_statement_date("12/20", Some(&p), None).unwrap();
        let jan = parse_statement_date("01/05", Some(&p), None).unwrap();
        assert_eq!(dec.year(), 2024);
        assert_eq!(jan.year(), 2025);
    }

    #[test]
    fn test_explicit_year_wins() {
        let p = period((2025, 4, 22), (2025, 5, 21));
        let d = parse_statement_date("04/24/2019", Some(&p), None).unwrap();
        assert_eq!(d.year(), 2019);
    }

    #[test]
    fn test_two_digit_year_split() {
        assert_eq!(
            parse_statement_date("04/24/25", None, None).unwrap().year(),
            2025
        );
        assert_eq!(
            parse_statement_date("04/24/99", None, None).unwrap().year(),
            1999
        );
    }

    #[test]
    fn test_assume_year_without_period() {
        let d = parse_statement_date("07/04", None, Some(2023)).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2023, 7, 4).unwrap());
    }

    #[test]
    fn test_invalid_dates_are_none() {
        assert!(parse_statement_date("13/40", None, Some(2025)).is_none());
        assert!(parse_statement_date("not a date", None, Some(2025)).is_none());
    }

    #[test]
    fn test_is_date_like() {
        assert!(is_date_like("04/22"));
        assert!(is_date_like("4/2/2025"));
        assert!(!is_date_like("200.00"));
        assert!(!is_date_like("Check #9338"));
    }
}
