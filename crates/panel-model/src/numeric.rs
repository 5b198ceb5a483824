//! Raw cells and explicit numeric coercion.

use serde::{Deserialize, Serialize};

/// A raw cell value as read from an extract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    /// Builds a cell from raw text, mapping blank strings to [`Cell::Empty`].
    pub fn from_text(value: &str) -> Self {
        if value.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(text) => text.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Text form of the cell; numbers are rendered without trailing zeros.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(text) => text.clone(),
            Cell::Number(value) => {
                if value.fract() == 0.0 && value.abs() < 1e15 {
                    format!("{}", *value as i64)
                } else {
                    value.to_string()
                }
            }
        }
    }
}

/// A numeric observation that is either a finite value or explicitly missing.
///
/// A parsed zero is `Value(0.0)`, never `Missing`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum Numeric {
    Value(f64),
    #[default]
    Missing,
}

impl Numeric {
    /// Total parse of a raw string.
    ///
    /// Thousands separators, ASCII spaces, no-break spaces (U+00A0) and
    /// ideographic spaces (U+3000) are removed before parsing. Empty input,
    /// non-numeric text, `NaN` and infinities are `Missing`.
    pub fn parse(raw: &str) -> Self {
        let cleaned: String = raw
            .chars()
            .filter(|ch| !matches!(ch, ',' | ' ' | '\u{00A0}' | '\u{3000}' | '\t'))
            .collect();
        if cleaned.is_empty() {
            return Numeric::Missing;
        }
        match cleaned.parse::<f64>() {
            Ok(value) => Self::from_f64(value),
            Err(_) => Numeric::Missing,
        }
    }

    pub fn from_cell(cell: &Cell) -> Self {
        match cell {
            Cell::Empty => Numeric::Missing,
            Cell::Number(value) => Self::from_f64(*value),
            Cell::Text(text) => Self::parse(text),
        }
    }

    /// Wraps a float, treating non-finite values as missing.
    pub fn from_f64(value: f64) -> Self {
        if value.is_finite() {
            Numeric::Value(value)
        } else {
            Numeric::Missing
        }
    }

    pub fn from_option(value: Option<f64>) -> Self {
        value.map_or(Numeric::Missing, Self::from_f64)
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Numeric::Value(value) => Some(value),
            Numeric::Missing => None,
        }
    }

    pub fn is_missing(self) -> bool {
        matches!(self, Numeric::Missing)
    }
}

impl From<Option<f64>> for Numeric {
    fn from(value: Option<f64>) -> Self {
        Self::from_option(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tolerates_separators() {
        assert_eq!(Numeric::parse("1,234.5"), Numeric::Value(1234.5));
        assert_eq!(Numeric::parse(" 12 345 "), Numeric::Value(12345.0));
        assert_eq!(Numeric::parse("1\u{00A0}000"), Numeric::Value(1000.0));
        assert_eq!(Numeric::parse("-3.5"), Numeric::Value(-3.5));
    }

    #[test]
    fn test_parse_missing_inputs() {
        assert_eq!(Numeric::parse(""), Numeric::Missing);
        assert_eq!(Numeric::parse("   "), Numeric::Missing);
        assert_eq!(Numeric::parse("-"), Numeric::Missing);
        assert_eq!(Numeric::parse("n/a"), Numeric::Missing);
        assert_eq!(Numeric::parse("NaN"), Numeric::Missing);
        assert_eq!(Numeric::parse("inf"), Numeric::Missing);
    }

    #[test]
    fn test_zero_is_not_missing() {
        assert_eq!(Numeric::parse("0"), Numeric::Value(0.0));
        assert!(!Numeric::parse("0").is_missing());
    }

    #[test]
    fn test_from_cell() {
        assert_eq!(Numeric::from_cell(&Cell::Empty), Numeric::Missing);
        assert_eq!(Numeric::from_cell(&Cell::Number(4.0)), Numeric::Value(4.0));
        assert_eq!(
            Numeric::from_cell(&Cell::Number(f64::NAN)),
            Numeric::Missing
        );
        assert_eq!(
            Numeric::from_cell(&Cell::Text("7".into())),
            Numeric::Value(7.0)
        );
    }

    #[test]
    fn test_cell_as_text() {
        assert_eq!(Cell::Number(45291.0).as_text(), "45291");
        assert_eq!(Cell::Number(1.5).as_text(), "1.5");
        assert_eq!(Cell::Empty.as_text(), "");
        assert!(Cell::from_text("  ").is_empty());
    }
}
