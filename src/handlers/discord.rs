use std::sync::Arc;

use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use tracing::{debug, info};

use crate::handlers::dispatcher::Dispatcher;
use crate::handlers::responder::SerenityResponder;

pub struct BotHandler {
    dispatcher: Arc<Dispatcher>,
}

impl BotHandler {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        BotHandler { dispatcher }
    }
}

#[async_trait]
impl EventHandler for BotHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, "connected to Discord");
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot || msg.content.trim().is_empty() {
            return;
        }
        debug!(channel_id = %msg.channel_id, author = %msg.author.id, "message received");
        let responder = SerenityResponder::new(&ctx.http, msg.channel_id);
        self.dispatcher
            .handle_message(&msg.channel_id.to_string(), &msg.content, &responder)
            .await;
    }
}
