//! Pay period and reporting window types.
//!
//! A [`Period`] is a calendar month keyed as `YYYY-MM`; it identifies the one
//! salary record an employee may have per month. A [`DateWindow`] is an
//! inclusive, optionally open-ended range of dates used to filter expenses.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

/// A calendar month, written `YYYY-MM`.
///
/// Periods order chronologically, so `2024-12 < 2025-01`.
///
/// # Examples
///
/// ```
/// use church_ledger::models::Period;
///
/// let march: Period = "2025-03".parse().unwrap();
/// assert_eq!(march.year(), 2025);
/// assert_eq!(march.month(), 3);
/// assert_eq!(march.to_string(), "2025-03");
///
/// assert!("2025-3".parse::<Period>().is_err());
/// assert!("2025-13".parse::<Period>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Creates a period, validating the month.
    pub fn new(year: i32, month: u32) -> LedgerResult<Self> {
        if !(1..=9999).contains(&year) {
            return Err(LedgerError::InvalidPeriod {
                value: format!("{}-{:02}", year, month),
                message: "year must have four digits".to_string(),
            });
        }
        if !(1..=12).contains(&month) {
            return Err(LedgerError::InvalidPeriod {
                value: format!("{:04}-{}", year, month),
                message: "month must be between 01 and 12".to_string(),
            });
        }
        Ok(Self { year, month })
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month, 1 through 12.
    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let malformed = || LedgerError::InvalidPeriod {
            value: raw.to_string(),
            message: "expected format YYYY-MM".to_string(),
        };

        let (year, month) = raw.split_once('-').ok_or_else(malformed)?;
        if year.len() != 4
            || month.len() != 2
            || !year.bytes().all(|b| b.is_ascii_digit())
            || !month.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(malformed());
        }

        let year: i32 = year.parse().map_err(|_| malformed())?;
        let month: u32 = month.parse().map_err(|_| malformed())?;
        Period::new(year, month)
    }
}

impl TryFrom<String> for Period {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}

/// Checks that an optional range of ordered values is not inverted.
pub(crate) fn ensure_ordered<T: PartialOrd + fmt::Display>(
    start: Option<&T>,
    end: Option<&T>,
) -> LedgerResult<()> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(LedgerError::InvalidPeriod {
            value: format!("{}..{}", start, end),
            message: "end must not be before start".to_string(),
        }),
        _ => Ok(()),
    }
}

/// An inclusive date range; either bound may be open.
///
/// # Examples
///
/// ```
/// use church_ledger::models::DateWindow;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
/// let window = DateWindow::new(Some(start), Some(end)).unwrap();
///
/// assert!(window.contains(end));
/// assert!(!window.contains(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()));
/// assert!(DateWindow::new(Some(end), Some(start)).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl DateWindow {
    /// Creates a window, rejecting `end < start` with `InvalidPeriod`.
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> LedgerResult<Self> {
        ensure_ordered(start.as_ref(), end.as_ref())?;
        Ok(Self { start, end })
    }

    /// A window that admits every date.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// The inclusive lower bound, if any.
    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    /// The inclusive upper bound, if any.
    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    /// Returns true if `date` falls inside the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_valid_period() {
        let period: Period = "2024-11".parse().unwrap();
        assert_eq!(period.year(), 2024);
        assert_eq!(period.month(), 11);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let period: Period = " 2024-01 ".parse().unwrap();
        assert_eq!(period.to_string(), "2024-01");
    }

    #[test]
    fn test_parse_rejects_malformed_values() {
        for raw in ["", "2024", "2024-1", "24-01", "2024/01", "2024-001", "abcd-ef", "2024-00"] {
            let err = raw.parse::<Period>().unwrap_err();
            assert!(
                matches!(err, LedgerError::InvalidPeriod { .. }),
                "expected InvalidPeriod for {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_periods_order_chronologically() {
        let december: Period = "2024-12".parse().unwrap();
        let january: Period = "2025-01".parse().unwrap();
        assert!(december < january);
    }

    #[test]
    fn test_period_serde_uses_string_form() {
        let period: Period = "2025-06".parse().unwrap();
        assert_eq!(serde_json::to_value(period).unwrap(), serde_json::json!("2025-06"));

        let parsed: Period = serde_json::from_str("\"2025-06\"").unwrap();
        assert_eq!(parsed, period);
        assert!(serde_json::from_str::<Period>("\"June\"").is_err());
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let window = DateWindow::new(Some(date(2025, 1, 10)), Some(date(2025, 1, 20))).unwrap();
        assert!(window.contains(date(2025, 1, 10)));
        assert!(window.contains(date(2025, 1, 20)));
        assert!(!window.contains(date(2025, 1, 9)));
        assert!(!window.contains(date(2025, 1, 21)));
    }

    #[test]
    fn test_open_ended_windows() {
        let from = DateWindow::new(Some(date(2025, 1, 10)), None).unwrap();
        assert!(from.contains(date(2030, 1, 1)));
        assert!(!from.contains(date(2025, 1, 9)));

        let until = DateWindow::new(None, Some(date(2025, 1, 10))).unwrap();
        assert!(until.contains(date(1999, 1, 1)));
        assert!(DateWindow::unbounded().contains(date(1, 1, 1)));
    }

    #[test]
    fn test_inverted_window_is_invalid_period() {
        let err = DateWindow::new(Some(date(2025, 2, 1)), Some(date(2025, 1, 1))).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidPeriod { .. }));
    }

    #[test]
    fn test_single_day_window_is_valid() {
        let day = date(2025, 5, 5);
        assert!(DateWindow::new(Some(day), Some(day)).is_ok());
    }
}
