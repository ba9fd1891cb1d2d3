use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serenity::async_trait;
use tracing::info;

use crate::clients::google_calendar_client::{Attendee, EventDateTime, GoogleEvent};
use crate::error::{BotError, Result};
use crate::models::event::EventRecord;
use crate::models::interval::{Interval, WorkingWindow};
use crate::models::timestamp::{self, TimestampError, YearMonth};
use crate::service::busy_days::{self, DEFAULT_TOP_N};
use crate::service::free_time;

pub const DEFAULT_CALENDAR_ID: &str = "primary";
/// How far ahead title lookups (`/cancelmeeting 'Reunião'`) search.
pub const LOOKUP_HORIZON_DAYS: i64 = 90;

const UNTITLED: &str = "(sem título)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
    pub text: Option<String>,
}

#[async_trait]
pub trait CalendarClient: Send + Sync {
    async fn list_events(&self, calendar_id: &str, query: &EventQuery) -> Result<Vec<GoogleEvent>>;
    async fn insert_event(&self, calendar_id: &str, event: &GoogleEvent) -> Result<GoogleEvent>;
    async fn patch_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        patch: &GoogleEvent,
    ) -> Result<GoogleEvent>;
    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRequest {
    pub calendar_id: String,
    pub summary: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

pub struct CalendarService {
    client: Arc<dyn CalendarClient>,
    tz: Tz,
}

impl CalendarService {
    pub fn new(client: Arc<dyn CalendarClient>, tz: Tz) -> Self {
        Self { client, tz }
    }

    pub async fn events_between(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        text: Option<&str>,
    ) -> Result<Vec<EventRecord>> {
        let query = EventQuery {
            time_min,
            time_max,
            text: text.map(str::to_string),
        };
        let events = self.client.list_events(calendar_id, &query).await?;
        events
            .into_iter()
            .map(|event| to_record(event, self.tz).map_err(BotError::from))
            .collect()
    }

    async fn events_on(&self, calendar_id: &str, date: NaiveDate) -> Result<Vec<EventRecord>> {
        let start = timestamp::start_of_day(date, self.tz)?;
        let end = timestamp::start_of_day(date + Duration::days(1), self.tz)?;
        self.events_between(calendar_id, start, end, None).await
    }

    pub async fn day_agenda(&self, calendar_id: &str, date: NaiveDate) -> Result<String> {
        let events = self.events_on(calendar_id, date).await?;
        let day = timestamp::format_day(date);
        if events.is_empty() {
            return Ok(format!("Nenhum evento encontrado em {}.", day));
        }
        let mut body = format!("Eventos em {}:\n", day);
        for event in &events {
            body.push_str(&format!(
                "- {} às {}: {}\n",
                timestamp::format_time(event.start, self.tz),
                timestamp::format_time(event.end, self.tz),
                event.summary
            ));
        }
        Ok(body.trim_end().to_string())
    }

    pub async fn schedule(&self, request: &ScheduleRequest) -> Result<String> {
        let event = GoogleEvent {
            summary: Some(request.summary.clone()),
            start: Some(EventDateTime::at(request.start.with_timezone(&self.tz))),
            end: Some(EventDateTime::at(request.end.with_timezone(&self.tz))),
            ..Default::default()
        };
        let created = self.client.insert_event(&request.calendar_id, &event).await?;
        info!(
            calendar_id = %request.calendar_id,
            event_id = ?created.id,
            "event scheduled"
        );
        Ok("Evento agendado!".to_string())
    }

    /// Next event (from `now`) whose title matches, ignoring case.
    pub async fn find_upcoming(
        &self,
        calendar_id: &str,
        title: &str,
        now: DateTime<Utc>,
    ) -> Result<EventRecord> {
        let events = self
            .events_between(
                calendar_id,
                now,
                now + Duration::days(LOOKUP_HORIZON_DAYS),
                Some(title),
            )
            .await?;
        let wanted = title.trim().to_lowercase();
        events
            .into_iter()
            .find(|event| event.summary.trim().to_lowercase() == wanted)
            .ok_or_else(|| BotError::NotFound(title.to_string()))
    }

    pub async fn add_participant(
        &self,
        calendar_id: &str,
        title: &str,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let event = self.find_upcoming(calendar_id, title, now).await?;
        if event.attendees.iter().any(|a| a.eq_ignore_ascii_case(email)) {
            return Ok(format!("{} já participa de '{}'.", email, event.summary));
        }
        let mut attendees = event.attendees.clone();
        attendees.push(email.to_string());
        self.patch_attendees(calendar_id, &event, attendees).await?;
        Ok(format!("{} adicionado à reunião '{}'.", email, event.summary))
    }

    pub async fn remove_participant(
        &self,
        calendar_id: &str,
        title: &str,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let event = self.find_upcoming(calendar_id, title, now).await?;
        let attendees: Vec<String> = event
            .attendees
            .iter()
            .filter(|a| !a.eq_ignore_ascii_case(email))
            .cloned()
            .collect();
        if attendees.len() == event.attendees.len() {
            return Ok(format!("{} não participa de '{}'.", email, event.summary));
        }
        self.patch_attendees(calendar_id, &event, attendees).await?;
        Ok(format!("{} removido da reunião '{}'.", email, event.summary))
    }

    async fn patch_attendees(
        &self,
        calendar_id: &str,
        event: &EventRecord,
        attendees: Vec<String>,
    ) -> Result<()> {
        let patch = GoogleEvent {
            attendees: Some(attendees.into_iter().map(|email| Attendee { email }).collect()),
            ..Default::default()
        };
        self.client.patch_event(calendar_id, &event.id, &patch).await?;
        Ok(())
    }

    pub async fn cancel_meeting(
        &self,
        calendar_id: &str,
        title: &str,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let event = self.find_upcoming(calendar_id, title, now).await?;
        self.client.delete_event(calendar_id, &event.id).await?;
        info!(calendar_id, event_id = %event.id, "meeting canceled");
        Ok(format!(
            "Reunião '{}' de {} cancelada.",
            event.summary,
            timestamp::format_day(timestamp::local_date(event.start, self.tz))
        ))
    }

    /// Moves the meeting to `date` at `time`, keeping its duration.
    pub async fn edit_meeting(
        &self,
        calendar_id: &str,
        title: &str,
        date: NaiveDate,
        time: NaiveTime,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let event = self.find_upcoming(calendar_id, title, now).await?;
        let new_start = timestamp::local_to_utc(date.and_time(time), self.tz)?;
        let new_end = new_start + event.interval().duration();
        let patch = GoogleEvent {
            start: Some(EventDateTime::at(new_start.with_timezone(&self.tz))),
            end: Some(EventDateTime::at(new_end.with_timezone(&self.tz))),
            ..Default::default()
        };
        self.client.patch_event(calendar_id, &event.id, &patch).await?;
        Ok(format!(
            "Reunião '{}' remarcada para {} às {}.",
            event.summary,
            timestamp::format_day(date),
            timestamp::format_time(new_start, self.tz)
        ))
    }

    pub async fn free_time(&self, calendar_id: &str, date: NaiveDate) -> Result<String> {
        let window = WorkingWindow::for_day(date, self.tz)?;
        let events = self.events_on(calendar_id, date).await?;
        let busy: Vec<Interval> = events.iter().map(EventRecord::interval).collect();
        let free = free_time::free_intervals(&busy, &window);
        Ok(free_time::render_free_time(date, &free, self.tz))
    }

    pub async fn busy_days(&self, calendar_id: &str, month: YearMonth) -> Result<String> {
        let start = timestamp::start_of_day(month.first_day(), self.tz)?;
        let end = timestamp::start_of_day(month.next().first_day(), self.tz)?;
        // The API also returns events that started last month and run into this one.
        let events: Vec<EventRecord> = self
            .events_between(calendar_id, start, end, None)
            .await?
            .into_iter()
            .filter(|event| YearMonth::of(timestamp::local_date(event.start, self.tz)) == month)
            .collect();
        let ranked = busy_days::busiest_days(&events, DEFAULT_TOP_N, self.tz);
        Ok(busy_days::render_busy_days(month, &ranked))
    }

    /// Lists the day's meetings so the user can pick which to cancel.
    pub async fn clear_calendar(&self, calendar_id: &str, date: NaiveDate) -> Result<String> {
        let events = self.events_on(calendar_id, date).await?;
        let day = timestamp::format_day(date);
        if events.is_empty() {
            return Ok(format!("Nenhuma reunião para cancelar em {}.", day));
        }
        let mut body = format!("Reuniões em {} que podem ser canceladas:\n", day);
        for event in &events {
            body.push_str(&format!(
                "- {} ({})\n",
                event.summary,
                timestamp::format_time(event.start, self.tz)
            ));
        }
        body.push_str("Use /cancelmeeting 'título' para cancelar.");
        Ok(body)
    }
}

fn to_record(event: GoogleEvent, tz: Tz) -> std::result::Result<EventRecord, TimestampError> {
    let summary = event
        .summary
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| UNTITLED.to_string());
    let start = resolve(event.start.as_ref(), tz, &summary)?;
    let end = resolve(event.end.as_ref(), tz, &summary)?;
    Ok(EventRecord {
        id: event.id.unwrap_or_default(),
        summary,
        start,
        end,
        attendees: event
            .attendees
            .unwrap_or_default()
            .into_iter()
            .map(|a| a.email)
            .collect(),
    })
}

/// All-day events run from local midnight to the (exclusive) end date's midnight.
fn resolve(
    value: Option<&EventDateTime>,
    tz: Tz,
    summary: &str,
) -> std::result::Result<DateTime<Utc>, TimestampError> {
    let value = value.ok_or_else(|| TimestampError::Missing(summary.to_string()))?;
    if let Some(date_time) = &value.date_time {
        return timestamp::parse_rfc3339(date_time);
    }
    if let Some(date) = &value.date {
        return timestamp::start_of_day(timestamp::parse_all_day(date)?, tz);
    }
    Err(TimestampError::Missing(summary.to_string()))
}
