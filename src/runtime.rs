use std::sync::Arc;

use serenity::model::gateway::GatewayIntents;
use tokio::sync::Mutex;

use crate::handlers::discord::BotHandler;
use crate::service::command_service::CommandService;
use crate::store::EventStore;

pub async fn run_bot(store: Arc<Mutex<EventStore>>, token: String, server_id: u64) {
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let handler = BotHandler::new(CommandService::new(store), server_id);
    let mut client = serenity::Client::builder(token, intents)
        .event_handler(handler)
        .await
        .expect("Error creating Serenity client");

    if let Err(why) = client.start().await {
        log::error!("Client error: {why:?}");
    }
}
