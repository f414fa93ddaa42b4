//! Date-range computation for the calendar listing command.

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::{BotError, Result};

/// Which slice of the calendar a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOption {
    All,
    Week,
    Month,
}

impl RangeOption {
    pub fn from_flag(flag: &str) -> Option<Self> {
        match flag {
            "-a" => Some(RangeOption::All),
            "-w" => Some(RangeOption::Week),
            "-m" => Some(RangeOption::Month),
            _ => None,
        }
    }
}

/// A resolved listing window: the date bounds (none for all-time), a title
/// for the reply, and the message to show when nothing matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarWindow {
    pub range: Option<(NaiveDate, NaiveDate)>,
    pub title: String,
    pub empty_message: String,
}

/// Monday on/before `now` through the following Sunday.
pub fn week_range(now: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = now - Duration::days(i64::from(now.weekday().num_days_from_monday()));
    (start, start + Duration::days(6))
}

/// First through last day of the given month. The end bound is the month's
/// actual last day, including the December rollover.
pub fn month_range(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month_start = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((start, next_month_start - Duration::days(1)))
}

/// Resolve a range option (and optional explicit target month) into a
/// listing window. A target month earlier than the current month is rejected
/// since the query has no year-rollover support.
pub fn resolve(
    option: RangeOption,
    target_month: Option<u32>,
    now: NaiveDate,
) -> Result<CalendarWindow> {
    match option {
        RangeOption::All => Ok(CalendarWindow {
            range: None,
            title: "Calendar - All events".to_string(),
            empty_message:
                "There is currently no event on record. Start adding with `.add_event`!"
                    .to_string(),
        }),
        RangeOption::Week => {
            let (start, end) = week_range(now);
            Ok(CalendarWindow {
                range: Some((start, end)),
                title: format!("Calendar - Week of {}", start.format("%m/%d/%Y")),
                empty_message: "There is currently no event on record for the current week."
                    .to_string(),
            })
        }
        RangeOption::Month => {
            let month = target_month.unwrap_or_else(|| now.month());
            if !(1..=12).contains(&month) {
                return Err(BotError::Validation(format!(
                    "'{month}' is not a valid month (expected 1-12)."
                )));
            }
            if month < now.month() {
                return Err(BotError::Validation(format!(
                    "Month {month} has already passed; only the current or a later month of this year can be viewed."
                )));
            }
            let (start, end) = month_range(now.year(), month).ok_or_else(|| {
                BotError::Validation(format!("'{month}' is not a valid month (expected 1-12)."))
            })?;
            Ok(CalendarWindow {
                range: Some((start, end)),
                title: format!("Calendar - {}", start.format("%B %Y")),
                empty_message: format!(
                    "There is currently no event on record for {}.",
                    start.format("%B")
                ),
            })
        }
    }
}
