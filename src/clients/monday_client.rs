use serde::{Deserialize, Serialize};
use serenity::async_trait;
use tracing::{error, info};

use crate::error::{BotError, Result};
use crate::models::board::Board;
use crate::service::board_service::BoardClient;

pub const DEFAULT_MONDAY_API_URL: &str = "https://api.monday.com/v2";

const BOARDS_QUERY: &str = "{
    boards(limit: 10) {
        name
        columns { id title }
        items_page(limit: 50) {
            items {
                name
                column_values { id text value }
            }
        }
    }
}";

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<BoardsData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct BoardsData {
    boards: Option<Vec<Board>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

pub struct MondayClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl MondayClient {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url,
            api_key,
        }
    }
}

#[async_trait]
impl BoardClient for MondayClient {
    async fn fetch_boards(&self) -> Result<Vec<Board>> {
        let response = self
            .http
            .post(&self.api_url)
            .header("Authorization", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&GraphQlRequest { query: BOARDS_QUERY })
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            error!(%status, body = %text, "Monday.com request failed");
            return Err(BotError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: GraphQlResponse = serde_json::from_str(&text)?;
        if let Some(first) = parsed.errors.first() {
            return Err(BotError::UnexpectedResponse(first.message.clone()));
        }
        let boards = parsed
            .data
            .and_then(|data| data.boards)
            .ok_or_else(|| BotError::UnexpectedResponse("Resposta inválida da API do Monday.com".to_string()))?;
        info!(count = boards.len(), "fetched Monday.com boards");
        Ok(boards)
    }
}
