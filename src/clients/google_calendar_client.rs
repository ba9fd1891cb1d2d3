use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serenity::async_trait;
use tracing::{error, info};

use crate::error::{BotError, Result};
use crate::service::calendar_service::{CalendarClient, EventQuery};

pub const DEFAULT_CALENDAR_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";
const MAX_RESULTS: &str = "250";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<EventDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<EventDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<Attendee>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    /// All-day events carry a `YYYY-MM-DD` date instead of `dateTime`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventDateTime {
    pub fn at(instant: DateTime<chrono_tz::Tz>) -> Self {
        Self {
            date_time: Some(instant.to_rfc3339()),
            date: None,
            time_zone: Some(instant.timezone().name().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    pub email: String,
}

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<GoogleEvent>,
}

pub struct GoogleCalendarClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl GoogleCalendarClient {
    pub fn new(access_token: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
        }
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            encode_path_segment(calendar_id)
        )
    }

    async fn read_body(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            error!(%status, body = %text, "Google Calendar request failed");
            return Err(BotError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }
}

#[async_trait]
impl CalendarClient for GoogleCalendarClient {
    async fn list_events(&self, calendar_id: &str, query: &EventQuery) -> Result<Vec<GoogleEvent>> {
        let mut params = vec![
            ("timeMin", query.time_min.to_rfc3339()),
            ("timeMax", query.time_max.to_rfc3339()),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
            ("maxResults", MAX_RESULTS.to_string()),
        ];
        if let Some(text) = &query.text {
            params.push(("q", text.clone()));
        }

        let response = self
            .http
            .get(self.events_url(calendar_id))
            .bearer_auth(&self.access_token)
            .query(&params)
            .send()
            .await?;
        let body = Self::read_body(response).await?;
        let list: EventList = serde_json::from_str(&body)?;
        Ok(list.items)
    }

    async fn insert_event(&self, calendar_id: &str, event: &GoogleEvent) -> Result<GoogleEvent> {
        info!(calendar_id, summary = ?event.summary, "inserting calendar event");
        let response = self
            .http
            .post(self.events_url(calendar_id))
            .bearer_auth(&self.access_token)
            .json(event)
            .send()
            .await?;
        let body = Self::read_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn patch_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        patch: &GoogleEvent,
    ) -> Result<GoogleEvent> {
        let url = format!("{}/{}", self.events_url(calendar_id), encode_path_segment(event_id));
        let response = self
            .http
            .patch(url)
            .bearer_auth(&self.access_token)
            .json(patch)
            .send()
            .await?;
        let body = Self::read_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<()> {
        let url = format!("{}/{}", self.events_url(calendar_id), encode_path_segment(event_id));
        let response = self
            .http
            .delete(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        Self::read_body(response).await?;
        Ok(())
    }
}

/// Calendar ids are e-mail addresses; `@` and friends must be escaped in the path.
fn encode_path_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}
