use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::error::{BotError, Result};

// H:MM or HH:MM immediately followed by AM/PM, any case.
static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2})(?i:(am|pm))$").expect("valid time regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meridiem {
    Am,
    Pm,
}

/// A validated wall-clock time. Display renders the normalized form the
/// store persists: minute zero-padded, period uppercased ("1:05 PM").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventTime {
    pub hour: u32,
    pub minute: u32,
    pub period: Meridiem,
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let period = match self.period {
            Meridiem::Am => "AM",
            Meridiem::Pm => "PM",
        };
        write!(f, "{}:{:02} {}", self.hour, self.minute, period)
    }
}

/// Parses `MM/DD/YYYY` or `MM-DD-YYYY` into a calendar date. The two
/// separators are interchangeable; anything else is rejected.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let normalized = input.trim().replace('-', "/");
    NaiveDate::parse_from_str(&normalized, "%m/%d/%Y").map_err(|_| {
        BotError::Validation(format!(
            "Event date '{input}' does not match format 'MM/DD/YYYY'."
        ))
    })
}

/// Parses `H:MM`/`HH:MM` plus an `AM`/`PM` designator, hour in [1,12] and
/// minute in [0,59].
pub fn parse_time(input: &str) -> Result<EventTime> {
    let input = input.trim();
    let invalid = || {
        BotError::Validation(format!(
            "Event time '{input}' does not match format 'HH:MM AM/PM'."
        ))
    };

    let caps = TIME_RE.captures(input).ok_or_else(invalid)?;
    let hour: u32 = caps[1].parse().map_err(|_| invalid())?;
    let minute: u32 = caps[2].parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&hour) || minute > 59 {
        return Err(invalid());
    }
    let period = if caps[3].eq_ignore_ascii_case("am") {
        Meridiem::Am
    } else {
        Meridiem::Pm
    };

    Ok(EventTime {
        hour,
        minute,
        period,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_both_separators() {
        let slashed = parse_date("01/10/2030").unwrap();
        let dashed = parse_date("01-10-2030").unwrap();
        assert_eq!(slashed, dashed);
        assert_eq!(slashed, NaiveDate::from_ymd_opt(2030, 1, 10).unwrap());
    }

    #[test]
    fn parse_date_accepts_unpadded_fields() {
        let date = parse_date("1/5/2030").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2030, 1, 5).unwrap());
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert!(parse_date("not a date").is_err());
        assert!(parse_date("13/01/2030").is_err());
        assert!(parse_date("02/30/2030").is_err());
        assert!(parse_date("01/10").is_err());
    }

    #[test]
    fn parse_time_normalizes_case_and_minutes() {
        assert_eq!(parse_time("1:05pm").unwrap().to_string(), "1:05 PM");
        assert_eq!(parse_time("1:05PM").unwrap().to_string(), "1:05 PM");
        assert_eq!(parse_time("09:00am").unwrap().to_string(), "9:00 AM");
    }

    #[test]
    fn parse_time_rejects_out_of_range() {
        assert!(parse_time("13:00AM").is_err());
        assert!(parse_time("0:30PM").is_err());
        assert!(parse_time("9:60AM").is_err());
        assert!(parse_time("9 AM").is_err());
        assert!(parse_time("9:00").is_err());
    }
}
