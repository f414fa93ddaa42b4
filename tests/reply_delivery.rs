use std::sync::Arc;

use calendarBot::handlers::discord::BotHandler;
use calendarBot::handlers::discord_responder::ChannelResponder;
use calendarBot::service::command_service::{usage_reply, CommandService, Reply};
use calendarBot::store::EventStore;
use chrono::NaiveDate;
use tokio::sync::Mutex;

#[derive(Default)]
struct MockResponder {
    texts: Mutex<Vec<String>>,
    records: Mutex<Vec<(String, usize)>>,
    listings: Mutex<Vec<(String, usize, usize)>>,
}

#[serenity::async_trait]
impl ChannelResponder for MockResponder {
    async fn send_text(&self, content: &str) {
        let mut texts = self.texts.lock().await;
        texts.push(content.to_string());
    }

    async fn send_record(&self, title: &str, fields: &[(String, String)]) {
        let mut records = self.records.lock().await;
        records.push((title.to_string(), fields.len()));
    }

    async fn send_listing(&self, title: &str, count: usize, rows: &[String]) {
        let mut listings = self.listings.lock().await;
        listings.push((title.to_string(), count, rows.len()));
    }
}

fn service() -> CommandService {
    let store = Arc::new(Mutex::new(EventStore::in_memory().unwrap()));
    CommandService::new(store)
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
}

#[tokio::test]
async fn text_replies_go_out_as_plain_messages() {
    let responder = MockResponder::default();
    let reply = service().execute("count_events", today()).await;

    let shutdown = BotHandler::deliver(&responder, &reply).await;
    assert!(!shutdown);
    let texts = responder.texts.lock().await;
    assert_eq!(
        texts.last().map(String::as_str),
        Some("There are currently 0 events on record.")
    );
}

#[tokio::test]
async fn record_replies_become_field_embeds() {
    let responder = MockResponder::default();
    let shutdown = BotHandler::deliver(&responder, &usage_reply()).await;

    assert!(!shutdown);
    let records = responder.records.lock().await;
    let (title, field_count) = records.last().cloned().unwrap();
    assert_eq!(title, "Usage Menu for Bot Commands");
    assert_eq!(field_count, 11);
}

#[tokio::test]
async fn listing_replies_carry_count_and_rows() {
    let service = service();
    service
        .execute("add_event Standup 01/20/2025 9:00AM Alice", today())
        .await;
    let reply = service.execute("calendar -a", today()).await;

    let responder = MockResponder::default();
    BotHandler::deliver(&responder, &reply).await;
    let listings = responder.listings.lock().await;
    assert_eq!(
        listings.last().cloned(),
        Some(("Calendar - All events".to_string(), 1, 1))
    );
}

#[tokio::test]
async fn shutdown_reply_sends_farewell_then_requests_stop() {
    let responder = MockResponder::default();
    let reply = Reply::Shutdown("I will now go offline. See you later!".to_string());

    let shutdown = BotHandler::deliver(&responder, &reply).await;
    assert!(shutdown);
    let texts = responder.texts.lock().await;
    assert_eq!(
        texts.last().map(String::as_str),
        Some("I will now go offline. See you later!")
    );
}
