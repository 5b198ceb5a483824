//! Canonical month keys.
//!
//! Every time axis in the engine is keyed by [`CanonicalMonth`]. Raw column
//! labels arrive as ISO dates, `YYYY-MM` strings, `YYYY年MM月` text or
//! spreadsheet serial day numbers; all of them collapse to the same key as
//! long as they fall in the same calendar month.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::numeric::Cell;

const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

/// Largest serial day number accepted as a spreadsheet date (9999-12-31).
const MAX_SERIAL_DAY: f64 = 2_958_465.0;

/// A calendar month, the sole temporal key of every panel.
///
/// Ordering is chronological. The date form of a canonical month is the last
/// calendar day of that month, see [`CanonicalMonth::end_date`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalMonth {
    year: i32,
    month: u32,
}

impl CanonicalMonth {
    /// Creates a canonical month, rejecting months outside 1..=12.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) || !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(ModelError::InvalidMonth { year, month });
        }
        Ok(Self { year, month })
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn is_january(self) -> bool {
        self.month == 1
    }

    /// Canonical month containing the given date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Last calendar day of the month.
    pub fn end_date(self) -> NaiveDate {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|first| first.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Shifts the month by `delta` calendar months.
    ///
    /// Returns `None` when the result leaves the supported calendar.
    pub fn offset(self, delta: i32) -> Option<Self> {
        let index = self.year * 12 + (self.month as i32 - 1) + delta;
        let year = index.div_euclid(12);
        let month = index.rem_euclid(12) as u32 + 1;
        Self::new(year, month).ok()
    }

    /// The previous calendar month.
    pub fn pred(self) -> Option<Self> {
        self.offset(-1)
    }

    /// January of the same year.
    pub fn year_start(self) -> Self {
        Self {
            year: self.year,
            month: 1,
        }
    }

    /// Parses a raw time label into a canonical month.
    ///
    /// All-digit labels (optionally with one decimal point) are spreadsheet
    /// serial day numbers. Text labels must start with a four digit year
    /// followed by a month number, separated by `-`, `/`, `.` or `年`.
    /// Anything else yields `None`.
    pub fn parse_label(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if is_serial_like(trimmed) {
            return trimmed.parse::<f64>().ok().and_then(Self::from_serial);
        }
        parse_year_month(trimmed)
    }

    /// Converts a spreadsheet serial day number (origin 1899-12-30).
    pub fn from_serial(serial: f64) -> Option<Self> {
        if !serial.is_finite() || !(1.0..=MAX_SERIAL_DAY).contains(&serial) {
            return None;
        }
        let origin = NaiveDate::from_ymd_opt(1899, 12, 30)?;
        let date = origin.checked_add_days(Days::new(serial.floor() as u64))?;
        Some(Self::from_date(date))
    }

    /// Canonicalizes a raw header cell.
    pub fn from_cell(cell: &Cell) -> Option<Self> {
        match cell {
            Cell::Empty => None,
            Cell::Number(value) => Self::from_serial(*value),
            Cell::Text(text) => Self::parse_label(text),
        }
    }
}

fn is_serial_like(value: &str) -> bool {
    let mut dots = 0usize;
    let mut digits = 0usize;
    for ch in value.chars() {
        match ch {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return false,
        }
    }
    digits > 0 && dots <= 1
}

fn parse_year_month(value: &str) -> Option<CanonicalMonth> {
    let mut chars = value.char_indices().peekable();
    let mut year_end = 0usize;
    while let Some((idx, ch)) = chars.peek().copied() {
        if !ch.is_ascii_digit() {
            break;
        }
        year_end = idx + ch.len_utf8();
        chars.next();
    }
    if year_end != 4 {
        return None;
    }
    let (_, separator) = chars.next()?;
    if !matches!(separator, '-' | '/' | '.' | '年') {
        return None;
    }
    let rest = &value[year_end + separator.len_utf8()..];
    let month_digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    if month_digits.is_empty() || month_digits.len() > 2 {
        return None;
    }
    let year = value[..year_end].parse::<i32>().ok()?;
    let month = month_digits.parse::<u32>().ok()?;
    CanonicalMonth::new(year, month).ok()
}

impl fmt::Display for CanonicalMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for CanonicalMonth {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_label(s).ok_or_else(|| ModelError::InvalidMonthLabel {
            label: s.to_string(),
        })
    }
}

impl TryFrom<String> for CanonicalMonth {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<CanonicalMonth> for String {
    fn from(value: CanonicalMonth) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(year: i32, month: u32) -> CanonicalMonth {
        CanonicalMonth::new(year, month).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_month() {
        assert!(CanonicalMonth::new(2024, 0).is_err());
        assert!(CanonicalMonth::new(2024, 13).is_err());
        assert!(CanonicalMonth::new(2024, 12).is_ok());
    }

    #[test]
    fn test_end_date() {
        assert_eq!(
            month(2024, 2).end_date(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            month(2023, 12).end_date(),
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()
        );
    }

    #[test]
    fn test_offset_crosses_years() {
        assert_eq!(month(2024, 1).pred(), Some(month(2023, 12)));
        assert_eq!(month(2023, 12).offset(1), Some(month(2024, 1)));
        assert_eq!(month(2024, 3).offset(-12), Some(month(2023, 3)));
        assert_eq!(month(1, 1).pred(), None);
    }

    #[test]
    fn test_parse_text_labels() {
        assert_eq!(CanonicalMonth::parse_label("2023-12"), Some(month(2023, 12)));
        assert_eq!(
            CanonicalMonth::parse_label("2023-12-01"),
            Some(month(2023, 12))
        );
        assert_eq!(
            CanonicalMonth::parse_label("2023-12-31 00:00:00"),
            Some(month(2023, 12))
        );
        assert_eq!(CanonicalMonth::parse_label("2024/3"), Some(month(2024, 3)));
        assert_eq!(CanonicalMonth::parse_label("2024年3月"), Some(month(2024, 3)));
        assert_eq!(CanonicalMonth::parse_label("Unnamed: 1"), None);
        assert_eq!(CanonicalMonth::parse_label(""), None);
        assert_eq!(CanonicalMonth::parse_label("2024-13"), None);
    }

    #[test]
    fn test_parse_serial_labels() {
        // 45291 = 2023-12-31, 45260 = 2023-11-30
        assert_eq!(CanonicalMonth::parse_label("45291"), Some(month(2023, 12)));
        assert_eq!(
            CanonicalMonth::parse_label("45260.0"),
            Some(month(2023, 11))
        );
        assert_eq!(CanonicalMonth::from_serial(f64::NAN), None);
        assert_eq!(CanonicalMonth::from_serial(0.0), None);
    }

    #[test]
    fn test_same_month_labels_compare_equal() {
        let a = CanonicalMonth::parse_label("2023-12-01").unwrap();
        let b = CanonicalMonth::parse_label("45291").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_display_and_from_str() {
        assert_eq!(month(2024, 7).to_string(), "2024-07");
        assert_eq!("2024-07".parse::<CanonicalMonth>().unwrap(), month(2024, 7));
        assert!("July".parse::<CanonicalMonth>().is_err());
    }
}
