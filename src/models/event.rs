use chrono::{DateTime, Utc};

use crate::models::interval::Interval;

/// A calendar event as the bot sees it, after boundary parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub id: String,
    pub summary: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub attendees: Vec<String>,
}

impl EventRecord {
    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }
}
