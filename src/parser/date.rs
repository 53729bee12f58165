use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid date: '{0}'")]
pub struct InvalidDate(pub String);

/// A calendar date where month and day may be unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PartialDate {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl PartialDate {
    #[must_use]
    pub const fn unknown() -> Self {
        Self {
            year: None,
            month: None,
            day: None,
        }
    }

    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        self.year.is_none() && self.month.is_none() && self.day.is_none()
    }

    /// `None` when nothing about the date is known.
    #[must_use]
    pub const fn known(self) -> Option<Self> {
        if self.is_unknown() { None } else { Some(self) }
    }

    /// Parses the AniDB date forms `""`, `YYYY`, `YYYY-MM` and `YYYY-MM-DD`.
    pub fn parse(raw: &str) -> Result<Self, InvalidDate> {
        static YEAR: OnceLock<Regex> = OnceLock::new();
        static YEAR_MONTH: OnceLock<Regex> = OnceLock::new();

        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self::unknown());
        }

        let year_re = YEAR.get_or_init(|| Regex::new(r"^(\d{4})$").expect("valid regex"));
        if let Some(caps) = year_re.captures(raw) {
            return Ok(Self {
                year: caps[1].parse().ok(),
                ..Self::unknown()
            });
        }

        let year_month_re = YEAR_MONTH
            .get_or_init(|| Regex::new(r"^(\d{4})-(\d{2})$").expect("valid regex"));
        if let Some(caps) = year_month_re.captures(raw) {
            return Ok(Self {
                year: caps[1].parse().ok(),
                month: caps[2].parse().ok(),
                day: None,
            });
        }

        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| InvalidDate(raw.to_string()))?;
        Ok(Self {
            year: Some(date.year()),
            month: Some(date.month()),
            day: Some(date.day()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_unknown() {
        let date = PartialDate::parse("").unwrap();
        assert!(date.is_unknown());
        assert_eq!(date.known(), None);
    }

    #[test]
    fn test_year_only() {
        let date = PartialDate::parse("1999").unwrap();
        assert_eq!(date.year, Some(1999));
        assert_eq!(date.month, None);
        assert_eq!(date.day, None);
    }

    #[test]
    fn test_year_month() {
        let date = PartialDate::parse("2007-04").unwrap();
        assert_eq!(
            date,
            PartialDate {
                year: Some(2007),
                month: Some(4),
                day: None
            }
        );
    }

    #[test]
    fn test_full_date() {
        let date = PartialDate::parse("2014-10-05").unwrap();
        assert_eq!(date.year, Some(2014));
        assert_eq!(date.month, Some(10));
        assert_eq!(date.day, Some(5));
    }

    #[test]
    fn test_invalid_calendar_date() {
        assert_eq!(
            PartialDate::parse("2021-02-30"),
            Err(InvalidDate("2021-02-30".to_string()))
        );
        assert!(PartialDate::parse("soon").is_err());
    }

    #[test]
    fn test_serializes_missing_parts_as_null() {
        let date = PartialDate::parse("2007-04").unwrap();
        let json = serde_json::to_value(date).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"year": 2007, "month": 4, "day": null})
        );
    }
}
