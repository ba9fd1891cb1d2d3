use std::collections::HashMap;
use std::env;
use std::fs;

use chrono_tz::Tz;

use crate::clients::gemini_client::DEFAULT_GEMINI_BASE_URL;
use crate::clients::google_calendar_client::DEFAULT_CALENDAR_BASE_URL;
use crate::clients::monday_client::DEFAULT_MONDAY_API_URL;
use crate::error::{BotError, Result};

pub const DEFAULT_RUN_MODE: &str = "cli";
pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";

/// `KEY=VALUE` pairs from an optional file; lookups fall back to the environment.
#[derive(Debug, Default, Clone)]
pub struct AppConfig {
    values: HashMap<String, String>,
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| BotError::Config(format!("Unable to read {}: {}", path, e)))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut values = HashMap::new();
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(BotError::Config(format!(
                    "Invalid config line {}: {}",
                    idx + 1,
                    line
                )));
            };
            let key = key.trim();
            let mut value = value.trim().to_string();
            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = value[1..value.len() - 1].to_string();
            }
            values.insert(key.to_string(), value);
        }
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values
            .get(key)
            .cloned()
            .or_else(|| env::var(key).ok())
            .filter(|value| !value.is_empty())
    }

    fn require(&self, key: &str) -> Result<String> {
        self.get(key)
            .ok_or_else(|| BotError::Config(format!("{} must be set", key)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunMode {
    Api,
    Cli,
}

/// Credentials and endpoints for the external services.
#[derive(Debug, Clone)]
pub struct Settings {
    pub run_mode: RunMode,
    pub discord_token: Option<String>,
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub calendar_token: String,
    pub calendar_base_url: String,
    pub monday_api_key: String,
    pub monday_api_url: String,
    pub timezone: Tz,
}

impl Settings {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let run_mode = match config
            .get("RUN_MODE")
            .unwrap_or_else(|| DEFAULT_RUN_MODE.to_string())
            .as_str()
        {
            "api" => RunMode::Api,
            "cli" => RunMode::Cli,
            other => return Err(BotError::Config(format!("Invalid run mode {}", other))),
        };

        let discord_token = config.get("DISCORD_TOKEN");
        if run_mode == RunMode::Api && discord_token.is_none() {
            return Err(BotError::Config(
                "DISCORD_TOKEN must be set for api mode".to_string(),
            ));
        }

        let tz_name = config
            .get("BOT_TIMEZONE")
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone: Tz = tz_name
            .parse()
            .map_err(|_| BotError::Config(format!("Unknown time zone {}", tz_name)))?;

        Ok(Self {
            run_mode,
            discord_token,
            gemini_api_key: config.require("GEMINI_API_KEY")?,
            gemini_base_url: config
                .get("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            calendar_token: config.require("GOOGLE_CALENDAR_TOKEN")?,
            calendar_base_url: config
                .get("GOOGLE_CALENDAR_BASE_URL")
                .unwrap_or_else(|| DEFAULT_CALENDAR_BASE_URL.to_string()),
            monday_api_key: config.require("MONDAY_API_KEY")?,
            monday_api_url: config
                .get("MONDAY_API_URL")
                .unwrap_or_else(|| DEFAULT_MONDAY_API_URL.to_string()),
            timezone,
        })
    }
}
