use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::timestamp;

pub const DEFAULT_PRIORITY: &str = "Normal";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TaskItem {
    pub id: String,
    pub description: String,
    pub deadline: NaiveDate,
    pub responsible: String,
    pub priority: String,
    pub created_at: DateTime<Utc>,
}

impl TaskItem {
    pub fn new(description: &str, deadline: NaiveDate, responsible: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            description: description.to_string(),
            deadline,
            responsible: responsible.to_string(),
            priority: DEFAULT_PRIORITY.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn render_line(&self) -> String {
        format!(
            "- {} (Prazo: {}, Responsável: {}, Prioridade: {})",
            self.description,
            timestamp::format_day(self.deadline),
            self.responsible,
            self.priority
        )
    }
}

/// "alta" -> "Alta", "URGENTE" -> "Urgente".
pub fn capitalize_priority(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
