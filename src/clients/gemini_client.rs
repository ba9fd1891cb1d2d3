use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{BotError, Result};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const GEMINI_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

pub async fn generate_content(
    http: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    prompt: &str,
    temperature: f32,
) -> Result<String> {
    let request = GenerateRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: prompt.to_string(),
            }],
        }],
        generation_config: GenerationConfig { temperature },
    };

    let url = format!(
        "{}/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        GEMINI_MODEL
    );
    let response = http
        .post(url)
        .query(&[("key", api_key)])
        .header("Content-Type", "application/json")
        .json(&request)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(BotError::RateLimited);
    }
    if !status.is_success() {
        error!(%status, body = %text, "Gemini request failed");
        return Err(BotError::Status {
            status: status.as_u16(),
            body: text,
        });
    }

    let parsed: GenerateResponse = serde_json::from_str(&text)?;
    let reply = parsed
        .candidates
        .first()
        .and_then(|candidate| candidate.content.parts.first())
        .map(|part| part.text.clone());

    match reply {
        Some(reply) => Ok(reply),
        None => {
            debug!(body = %text, "no candidates in Gemini response");
            Err(BotError::UnexpectedResponse(
                "No candidates in Gemini response".to_string(),
            ))
        }
    }
}
