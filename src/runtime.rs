use std::sync::Arc;

use serenity::model::gateway::GatewayIntents;
use tracing::{error, info};

use crate::clients::google_calendar_client::GoogleCalendarClient;
use crate::clients::monday_client::MondayClient;
use crate::config::Settings;
use crate::error::{BotError, Result};
use crate::handlers::discord::BotHandler;
use crate::handlers::dispatcher::Dispatcher;
use crate::service::assistant_service::GeminiService;

pub fn build_dispatcher(settings: &Settings) -> Dispatcher {
    Dispatcher::new(
        Arc::new(GeminiService::new(
            settings.gemini_api_key.clone(),
            settings.gemini_base_url.clone(),
        )),
        Arc::new(GoogleCalendarClient::new(
            settings.calendar_token.clone(),
            settings.calendar_base_url.clone(),
        )),
        Arc::new(MondayClient::new(
            settings.monday_api_key.clone(),
            settings.monday_api_url.clone(),
        )),
        settings.timezone,
    )
}

pub async fn run_api(settings: Settings) -> Result<()> {
    let token = settings
        .discord_token
        .clone()
        .ok_or_else(|| BotError::Config("DISCORD_TOKEN must be set for api mode".to_string()))?;
    let dispatcher = Arc::new(build_dispatcher(&settings));

    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;
    let mut client = serenity::Client::builder(token, intents)
        .event_handler(BotHandler::new(dispatcher))
        .await
        .map_err(|e| BotError::Transport(format!("Error creating Serenity client: {}", e)))?;

    info!(timezone = %settings.timezone, "starting Discord client");
    if let Err(why) = client.start().await {
        error!(error = ?why, "Discord client stopped");
        return Err(BotError::Transport(why.to_string()));
    }
    Ok(())
}
