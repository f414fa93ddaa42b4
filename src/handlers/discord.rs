use chrono::Local;
use serenity::all::GuildId;
use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;

use crate::handlers::discord_responder::{ChannelResponder, SerenityResponder};
use crate::service::command_service::{usage_reply, CommandService, Reply};

const COMMAND_PREFIX: char = '.';

/// Routes incoming Discord messages to the command service and delivers the
/// replies. One command runs to completion before the next is dispatched
/// because every handler serializes on the shared store lock.
pub struct BotHandler {
    service: CommandService,
    server_id: u64,
}

impl BotHandler {
    pub fn new(service: CommandService, server_id: u64) -> Self {
        BotHandler { service, server_id }
    }

    /// Render one reply through the responder. Returns true when the
    /// transport should shut down afterwards.
    pub async fn deliver(responder: &dyn ChannelResponder, reply: &Reply) -> bool {
        match reply {
            Reply::Text(text) => {
                responder.send_text(text).await;
                false
            }
            Reply::Record { title, fields } => {
                responder.send_record(title, fields).await;
                false
            }
            Reply::Listing { title, count, rows } => {
                responder.send_listing(title, *count, rows).await;
                false
            }
            Reply::Shutdown(text) => {
                responder.send_text(text).await;
                true
            }
        }
    }

    fn general_channel(&self, ctx: &Context) -> Option<serenity::all::ChannelId> {
        ctx.cache.guild(GuildId::new(self.server_id)).and_then(|guild| {
            guild
                .channels
                .iter()
                .find(|(_, channel)| channel.name == "general")
                .map(|(id, _)| *id)
        })
    }
}

#[async_trait]
impl EventHandler for BotHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        log::info!("{} has connected to Discord!", ready.user.name);
        match self.service.stored_count().await {
            Ok(count) => log::info!("There are {count} events on record."),
            Err(err) => log::error!("unable to count stored events: {err}"),
        }

        let Some(channel_id) = self.general_channel(&ctx) else {
            log::warn!("no 'general' channel found on server {}; skipping welcome", self.server_id);
            return;
        };
        let responder = SerenityResponder::new(&ctx, channel_id);
        responder
            .send_text("Hello! What can I help you with today?")
            .await;
        Self::deliver(&responder, &usage_reply()).await;
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        let Some(line) = msg.content.strip_prefix(COMMAND_PREFIX) else {
            return;
        };

        let today = Local::now().date_naive();
        let reply = self.service.execute(line, today).await;
        let responder = SerenityResponder::new(&ctx, msg.channel_id);
        let shutdown = Self::deliver(&responder, &reply).await;
        if shutdown {
            log::info!("exit requested; shutting down shard");
            ctx.shard.shutdown_clean();
        }
    }
}
