//! Command parsing and dispatch: one handler per user-facing verb.
//!
//! Every handler validates its arguments before touching the store, then
//! produces a presentation-agnostic [`Reply`]. Errors never escape
//! [`CommandService::execute`]; they become user-facing text.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::calendar::{self, RangeOption};
use crate::error::{BotError, Result};
use crate::models::event::{Event, EventPatch};
use crate::store::EventStore;
use crate::validate::{parse_date, parse_time};

const ADD_USAGE: &str = ".add_event <event_name> <event_date> <event_time> [location] <contact>";
const UPDATE_USAGE: &str =
    ".update_event <event_name> <name|date|time|location|contact=value> ...";
const DELETE_USAGE: &str = ".delete_event <event_name>";
const VIEW_USAGE: &str = ".view_event <event_name>";
const TODO_USAGE: &str = ".todo <contact>";
const CALENDAR_USAGE: &str = ".calendar [optional: <-a|-w|-m [month]>]";
const GENERIC_USAGE: &str = ".usage";

const STORAGE_FAILURE_REPLY: &str =
    "Something went wrong while accessing the event store. Please try again later.";

/// What a handler hands back to the transport for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Reply {
    /// Plain confirmation or error text.
    Text(String),
    /// A single record rendered as titled name/value fields.
    Record {
        title: String,
        fields: Vec<(String, String)>,
    },
    /// A filtered event list with its count.
    Listing {
        title: String,
        count: usize,
        rows: Vec<String>,
    },
    /// Farewell text; the transport should stop accepting commands after
    /// delivering it.
    Shutdown(String),
}

/// Static command reference, shared by the `usage` verb and the welcome
/// message.
pub fn usage_reply() -> Reply {
    let field = |name: &str, value: &str| (name.to_string(), value.to_string());
    Reply::Record {
        title: "Usage Menu for Bot Commands".to_string(),
        fields: vec![
            field("Display usage menu:", "`.usage`"),
            field("Add event:", &format!("`{ADD_USAGE}`")),
            field("Update event information:", &format!("`{UPDATE_USAGE}`")),
            field("Delete event:", &format!("`{DELETE_USAGE}`")),
            field("View details of a specific event:", &format!("`{VIEW_USAGE}`")),
            field("View todo list for a contact:", &format!("`{TODO_USAGE}`")),
            field(
                "View all events from entire/weekly/monthly calendar:",
                &format!("`{CALENDAR_USAGE}`"),
            ),
            field("Remove past events:", "`.refresh_calendar`"),
            field("Clear all events:", "`.clear_events`"),
            field("Count number of events:", "`.count_events`"),
            field("Exit to stop bot from running:", "`.exit`"),
        ],
    }
}

/// Dispatches command lines against the shared event store.
pub struct CommandService {
    store: Arc<Mutex<EventStore>>,
}

impl CommandService {
    pub fn new(store: Arc<Mutex<EventStore>>) -> Self {
        CommandService { store }
    }

    /// Current number of stored events (used by the ready handler).
    pub async fn stored_count(&self) -> Result<usize> {
        let mut store = self.store.lock().await;
        store.count()
    }

    /// Run one command line. All errors are converted to user-facing text;
    /// internal failures are logged and replaced with a generic reply.
    pub async fn execute(&self, input: &str, today: NaiveDate) -> Reply {
        match self.dispatch(input, today).await {
            Ok(reply) => reply,
            Err(err) if err.is_internal() => {
                log::error!("command '{input}' failed: {err}");
                Reply::Text(STORAGE_FAILURE_REPLY.to_string())
            }
            Err(err) => {
                log::warn!("command '{input}' rejected: {err}");
                Reply::Text(err.to_string())
            }
        }
    }

    async fn dispatch(&self, input: &str, today: NaiveDate) -> Result<Reply> {
        let mut parts = input.split_whitespace();
        let verb = parts
            .next()
            .ok_or(BotError::Usage(GENERIC_USAGE))?;
        let args: Vec<&str> = parts.collect();

        match verb {
            "add_event" => self.add_event(&args, today).await,
            "update_event" => self.update_event(&args).await,
            "delete_event" => self.delete_event(&args).await,
            "view_event" => self.view_event(&args).await,
            "todo" => self.todo(&args).await,
            "calendar" => self.calendar(&args, today).await,
            "refresh_calendar" => self.refresh_calendar(today).await,
            "clear_events" => self.clear_events().await,
            "count_events" => self.count_events().await,
            "usage" => Ok(usage_reply()),
            "exit" => self.exit().await,
            other => Err(BotError::Validation(format!(
                "Unknown command `{other}`. Try `.usage` for the command reference."
            ))),
        }
    }

    async fn add_event(&self, args: &[&str], today: NaiveDate) -> Result<Reply> {
        // Location is the single optional argument.
        let (name, raw_date, raw_time, location, contact) = match args {
            [name, date, time, contact] => (*name, *date, *time, None, *contact),
            [name, date, time, location, contact] => {
                (*name, *date, *time, Some(location.to_string()), *contact)
            }
            _ => return Err(BotError::Usage(ADD_USAGE)),
        };

        let date = parse_date(raw_date)?;
        let time = parse_time(raw_time)?;
        if date < today {
            return Err(BotError::Validation(
                "A past date cannot be used as an event date.".to_string(),
            ));
        }

        let event = Event {
            name: name.to_string(),
            date,
            time: time.to_string(),
            location,
            contact: contact.to_string(),
        };
        let mut store = self.store.lock().await;
        let total = store.create(&event)?;
        Ok(Reply::Text(format!(
            "Event {name} has been added. There are currently {total} events on record."
        )))
    }

    async fn update_event(&self, args: &[&str]) -> Result<Reply> {
        let [name, tokens @ ..] = args else {
            return Err(BotError::Usage(UPDATE_USAGE));
        };
        if tokens.is_empty() {
            return Err(BotError::Usage(UPDATE_USAGE));
        }

        let patch = build_patch(tokens)?;
        let mut store = self.store.lock().await;
        let updated = store.update(name, &patch)?;
        Ok(Reply::Record {
            title: "Updated event details".to_string(),
            fields: updated.display_fields(),
        })
    }

    async fn delete_event(&self, args: &[&str]) -> Result<Reply> {
        let [name] = args else {
            return Err(BotError::Usage(DELETE_USAGE));
        };
        let mut store = self.store.lock().await;
        let total = store.delete(name)?;
        Ok(Reply::Text(format!(
            "Event {name} has been deleted from record. There are currently {total} events on record."
        )))
    }

    async fn view_event(&self, args: &[&str]) -> Result<Reply> {
        let [name] = args else {
            return Err(BotError::Usage(VIEW_USAGE));
        };
        let store = self.store.lock().await;
        let event = store
            .find(name)?
            .ok_or_else(|| BotError::NotFound(name.to_string()))?;
        Ok(Reply::Record {
            title: "Event details".to_string(),
            fields: event.display_fields(),
        })
    }

    async fn todo(&self, args: &[&str]) -> Result<Reply> {
        let [contact] = args else {
            return Err(BotError::Usage(TODO_USAGE));
        };
        let store = self.store.lock().await;
        let events = store.list_by_contact(contact)?;
        if events.is_empty() {
            return Err(BotError::EmptyResult(format!(
                "There are no tasks on record for contact {contact}."
            )));
        }
        Ok(Reply::Listing {
            title: format!("Todo list for {contact}"),
            count: events.len(),
            rows: events.iter().map(Event::listing_row).collect(),
        })
    }

    async fn calendar(&self, args: &[&str], today: NaiveDate) -> Result<Reply> {
        let (option, target_month) = match args {
            [] => (RangeOption::All, None),
            [flag] => (
                RangeOption::from_flag(flag).ok_or(BotError::Usage(CALENDAR_USAGE))?,
                None,
            ),
            ["-m", month] => {
                let month: u32 = month.parse().map_err(|_| {
                    BotError::Validation(format!(
                        "'{month}' is not a valid month (expected 1-12)."
                    ))
                })?;
                (RangeOption::Month, Some(month))
            }
            _ => return Err(BotError::Usage(CALENDAR_USAGE)),
        };

        let window = calendar::resolve(option, target_month, today)?;
        let store = self.store.lock().await;
        let events = match window.range {
            Some((start, end)) => store.list_by_date_range(start, end)?,
            None => store.list_all()?,
        };
        if events.is_empty() {
            return Err(BotError::EmptyResult(window.empty_message));
        }
        Ok(Reply::Listing {
            title: window.title,
            count: events.len(),
            rows: events.iter().map(Event::listing_row).collect(),
        })
    }

    async fn refresh_calendar(&self, today: NaiveDate) -> Result<Reply> {
        let mut store = self.store.lock().await;
        let before = store.count()?;
        if before == 0 {
            return Ok(Reply::Text(
                "There is nothing to refresh; no events are on record.".to_string(),
            ));
        }
        let removed = store.purge_past(today)?;
        let after = store.count()?;
        if removed == 0 {
            return Ok(Reply::Text(format!(
                "Nothing to refresh. All {after} events on record are upcoming."
            )));
        }
        Ok(Reply::Text(format!(
            "Removed {removed} past events. Events on record: {before} -> {after}."
        )))
    }

    async fn clear_events(&self) -> Result<Reply> {
        let mut store = self.store.lock().await;
        store.clear()?;
        Ok(Reply::Text("Event list has been cleared.".to_string()))
    }

    async fn count_events(&self) -> Result<Reply> {
        let mut store = self.store.lock().await;
        let total = store.count()?;
        Ok(Reply::Text(format!(
            "There are currently {total} events on record."
        )))
    }

    async fn exit(&self) -> Result<Reply> {
        let mut store = self.store.lock().await;
        store.close()?;
        Ok(Reply::Shutdown(
            "I will now go offline. See you later!".to_string(),
        ))
    }
}

/// Turns `field=value` tokens into a partial update. Malformed tokens and
/// unknown fields are rejected; empty values leave the field unchanged.
fn build_patch(tokens: &[&str]) -> Result<EventPatch> {
    let mut patch = EventPatch::default();
    for token in tokens {
        let Some((field, value)) = token.split_once('=') else {
            return Err(BotError::Usage(UPDATE_USAGE));
        };
        if value.is_empty() {
            continue;
        }
        match field {
            "name" => patch.name = Some(value.to_string()),
            "date" => patch.date = Some(parse_date(value)?),
            "time" => patch.time = Some(parse_time(value)?.to_string()),
            "location" => patch.location = Some(value.to_string()),
            "contact" => patch.contact = Some(value.to_string()),
            _ => return Err(BotError::Usage(UPDATE_USAGE)),
        }
    }
    Ok(patch)
}
