use serenity::all::{ChannelId, Colour};
use serenity::async_trait;
use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::prelude::Context;

// Embed accent carried over from the original bot.
fn embed_colour() -> Colour {
    Colour::from_rgb(115, 138, 219)
}

/// Delivery seam between command replies and the chat transport, so reply
/// rendering can be exercised in tests without a live Discord connection.
#[async_trait]
pub trait ChannelResponder: Send + Sync {
    async fn send_text(&self, content: &str);
    async fn send_record(&self, title: &str, fields: &[(String, String)]);
    async fn send_listing(&self, title: &str, count: usize, rows: &[String]);
}

pub struct SerenityResponder<'a> {
    ctx: &'a Context,
    channel_id: ChannelId,
}

impl<'a> SerenityResponder<'a> {
    pub fn new(ctx: &'a Context, channel_id: ChannelId) -> Self {
        Self { ctx, channel_id }
    }
}

#[async_trait]
impl ChannelResponder for SerenityResponder<'_> {
    async fn send_text(&self, content: &str) {
        if let Err(err) = self.channel_id.say(&self.ctx.http, content).await {
            log::error!("failed to send reply: {err:?}");
        }
    }

    async fn send_record(&self, title: &str, fields: &[(String, String)]) {
        let mut embed = CreateEmbed::new().title(title).colour(embed_colour());
        let mut first = true;
        for (name, value) in fields {
            embed = embed.field(name, value, first);
            first = false;
        }
        let message = CreateMessage::new().embed(embed);
        if let Err(err) = self.channel_id.send_message(&self.ctx.http, message).await {
            log::error!("failed to send record reply: {err:?}");
        }
    }

    async fn send_listing(&self, title: &str, count: usize, rows: &[String]) {
        let embed = CreateEmbed::new()
            .title(title)
            .colour(embed_colour())
            .field("Number of events", count.to_string(), true)
            .field("Event Name, Date, Time, Contact", rows.join("\n"), false);
        let message = CreateMessage::new().embed(embed);
        if let Err(err) = self.channel_id.send_message(&self.ctx.http, message).await {
            log::error!("failed to send listing reply: {err:?}");
        }
    }
}
