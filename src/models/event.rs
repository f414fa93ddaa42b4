use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A calendar entry. `name` is the unique key (case-insensitive); `time` is
/// the normalized wall-clock form produced by the time validator.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Event {
    pub name: String,
    pub date: NaiveDate,
    pub time: String,
    pub location: Option<String>,
    pub contact: String,
}

impl Event {
    /// Field rows for record-style replies, in display order.
    pub fn display_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("Name".to_string(), self.name.clone()),
            ("Date".to_string(), self.date.format("%m/%d/%Y").to_string()),
            ("Time".to_string(), self.time.clone()),
        ];
        if let Some(location) = &self.location {
            fields.push(("Location".to_string(), location.clone()));
        }
        fields.push(("Contact".to_string(), self.contact.clone()));
        fields
    }

    /// One calendar listing row: name, date, time, [location,] contact.
    pub fn listing_row(&self) -> String {
        let mut row = format!(
            "{}, {}, {}",
            self.name,
            self.date.format("%m/%d/%Y"),
            self.time
        );
        if let Some(location) = &self.location {
            row.push_str(&format!(", {location}"));
        }
        row.push_str(&format!(", {}", self.contact));
        row
    }
}

/// Per-field overrides for a partial update; `None` leaves the stored value
/// untouched.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EventPatch {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub contact: Option<String>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.location.is_none()
            && self.contact.is_none()
    }

    pub fn apply(&self, existing: &Event) -> Event {
        Event {
            name: self.name.clone().unwrap_or_else(|| existing.name.clone()),
            date: self.date.unwrap_or(existing.date),
            time: self.time.clone().unwrap_or_else(|| existing.time.clone()),
            location: self.location.clone().or_else(|| existing.location.clone()),
            contact: self
                .contact
                .clone()
                .unwrap_or_else(|| existing.contact.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Event {
        Event {
            name: "Standup".to_string(),
            date: NaiveDate::from_ymd_opt(2030, 1, 10).unwrap(),
            time: "9:00 AM".to_string(),
            location: Some("Room 2".to_string()),
            contact: "Alice".to_string(),
        }
    }

    #[test]
    fn patch_apply_merges_only_supplied_fields() {
        let patch = EventPatch {
            time: Some("10:30 AM".to_string()),
            ..EventPatch::default()
        };
        let merged = patch.apply(&sample());
        assert_eq!(merged.time, "10:30 AM");
        assert_eq!(merged.name, "Standup");
        assert_eq!(merged.date, sample().date);
        assert_eq!(merged.location.as_deref(), Some("Room 2"));
        assert_eq!(merged.contact, "Alice");
    }

    #[test]
    fn listing_row_includes_location_when_present() {
        assert_eq!(
            sample().listing_row(),
            "Standup, 01/10/2030, 9:00 AM, Room 2, Alice"
        );
    }
}
