//! The `/schedule` dialogue: calendar e-mail, then title, then start, then end.
//!
//! Each step is a typed state carrying everything collected so far. Input that
//! does not parse leaves the state unchanged; `Cancel` ends the dialogue from
//! any state.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::models::timestamp;
use crate::service::calendar_service::{DEFAULT_CALENDAR_ID, ScheduleRequest};

pub const ASK_CALENDAR: &str =
    "Por favor, digite o e-mail do calendário onde o evento será agendado (ex.: 'brenamarq@gmail.com').";
pub const ASK_SUMMARY: &str = "Digite o nome da reunião (ex.: 'Reunião com equipe').";
pub const ASK_START: &str =
    "Digite o horário de início no formato 'DD/MM/YYYY HH:MM' (ex.: '21/03/2025 10:00').";
pub const ASK_END: &str =
    "Digite o horário de término no formato 'DD/MM/YYYY HH:MM' (ex.: '21/03/2025 11:00').";
pub const INVALID_CALENDAR: &str =
    "E-mail inválido! Digite um e-mail (ex.: 'brenamarq@gmail.com') ou 'primary'.";
pub const INVALID_SUMMARY: &str = "O nome da reunião não pode ficar vazio. Tente novamente.";
pub const INVALID_START: &str =
    "Formato inválido! Use 'DD/MM/YYYY HH:MM' (ex.: '21/03/2025 10:00'). Tente novamente.";
pub const INVALID_END: &str =
    "Formato inválido! Use 'DD/MM/YYYY HH:MM' (ex.: '21/03/2025 11:00'). Tente novamente.";
pub const END_BEFORE_START: &str =
    "O término precisa ser depois do início. Digite outro horário de término.";
pub const CANCELED: &str = "Agendamento cancelado.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleState {
    AwaitingCalendar,
    AwaitingSummary {
        calendar_id: String,
    },
    AwaitingStart {
        calendar_id: String,
        summary: String,
    },
    AwaitingEnd {
        calendar_id: String,
        summary: String,
        start: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueInput<'a> {
    Text(&'a str),
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Still collecting; `reply` is the next question or a format hint.
    Continue { state: ScheduleState, reply: String },
    Complete(ScheduleRequest),
    Canceled,
}

impl ScheduleState {
    pub fn begin() -> (Self, &'static str) {
        (ScheduleState::AwaitingCalendar, ASK_CALENDAR)
    }

    pub fn handle(self, input: DialogueInput<'_>, tz: Tz) -> Transition {
        let text = match input {
            DialogueInput::Cancel => return Transition::Canceled,
            DialogueInput::Text(text) => text.trim(),
        };

        match self {
            ScheduleState::AwaitingCalendar => {
                if !is_calendar_id(text) {
                    return stay(ScheduleState::AwaitingCalendar, INVALID_CALENDAR);
                }
                stay(
                    ScheduleState::AwaitingSummary {
                        calendar_id: text.to_string(),
                    },
                    ASK_SUMMARY,
                )
            }
            ScheduleState::AwaitingSummary { calendar_id } => {
                if text.is_empty() {
                    return stay(ScheduleState::AwaitingSummary { calendar_id }, INVALID_SUMMARY);
                }
                stay(
                    ScheduleState::AwaitingStart {
                        calendar_id,
                        summary: text.to_string(),
                    },
                    ASK_START,
                )
            }
            ScheduleState::AwaitingStart {
                calendar_id,
                summary,
            } => match timestamp::parse_local_datetime(text, tz) {
                Ok(start) => stay(
                    ScheduleState::AwaitingEnd {
                        calendar_id,
                        summary,
                        start,
                    },
                    ASK_END,
                ),
                Err(_) => stay(
                    ScheduleState::AwaitingStart {
                        calendar_id,
                        summary,
                    },
                    INVALID_START,
                ),
            },
            ScheduleState::AwaitingEnd {
                calendar_id,
                summary,
                start,
            } => {
                let state = |calendar_id: String, summary: String| ScheduleState::AwaitingEnd {
                    calendar_id,
                    summary,
                    start,
                };
                match timestamp::parse_local_datetime(text, tz) {
                    Ok(end) if end > start => Transition::Complete(ScheduleRequest {
                        calendar_id,
                        summary,
                        start,
                        end,
                    }),
                    Ok(_) => stay(state(calendar_id, summary), END_BEFORE_START),
                    Err(_) => stay(state(calendar_id, summary), INVALID_END),
                }
            }
        }
    }
}

fn stay(state: ScheduleState, reply: &str) -> Transition {
    Transition::Continue {
        state,
        reply: reply.to_string(),
    }
}

fn is_calendar_id(text: &str) -> bool {
    if text == DEFAULT_CALENDAR_ID {
        return true;
    }
    match text.split_once('@') {
        Some((user, domain)) => !user.is_empty() && domain.contains('.') && !text.contains(' '),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::Sao_Paulo;

    fn feed(state: ScheduleState, text: &str) -> Transition {
        state.handle(DialogueInput::Text(text), Sao_Paulo)
    }

    fn next_state(transition: Transition) -> ScheduleState {
        match transition {
            Transition::Continue { state, .. } => state,
            other => panic!("expected Continue, got {:?}", other),
        }
    }

    #[test]
    fn collects_all_fields_in_order() {
        let (state, prompt) = ScheduleState::begin();
        assert_eq!(prompt, ASK_CALENDAR);
        let state = next_state(feed(state, "brenamarq@gmail.com"));
        let state = next_state(feed(state, "Reunião com equipe"));
        let state = next_state(feed(state, "21/03/2025 10:00"));
        let done = feed(state, "21/03/2025 11:00");
        assert_eq!(
            done,
            Transition::Complete(ScheduleRequest {
                calendar_id: "brenamarq@gmail.com".to_string(),
                summary: "Reunião com equipe".to_string(),
                start: Utc.with_ymd_and_hms(2025, 3, 21, 13, 0, 0).unwrap(),
                end: Utc.with_ymd_and_hms(2025, 3, 21, 14, 0, 0).unwrap(),
            })
        );
    }

    #[test]
    fn invalid_input_keeps_state() {
        let state = ScheduleState::AwaitingStart {
            calendar_id: "primary".to_string(),
            summary: "1:1".to_string(),
        };
        match feed(state.clone(), "amanhã 10h") {
            Transition::Continue { state: kept, reply } => {
                assert_eq!(kept, state);
                assert_eq!(reply, INVALID_START);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            next_state(feed(ScheduleState::AwaitingCalendar, "not-an-email")),
            ScheduleState::AwaitingCalendar
        );
    }

    #[test]
    fn end_must_follow_start() {
        let start = Utc.with_ymd_and_hms(2025, 3, 21, 13, 0, 0).unwrap();
        let state = ScheduleState::AwaitingEnd {
            calendar_id: "primary".to_string(),
            summary: "1:1".to_string(),
            start,
        };
        match feed(state, "21/03/2025 09:00") {
            Transition::Continue { reply, .. } => assert_eq!(reply, END_BEFORE_START),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn cancel_is_valid_from_every_state() {
        let start = Utc.with_ymd_and_hms(2025, 3, 21, 13, 0, 0).unwrap();
        let states = vec![
            ScheduleState::AwaitingCalendar,
            ScheduleState::AwaitingSummary {
                calendar_id: "primary".to_string(),
            },
            ScheduleState::AwaitingStart {
                calendar_id: "primary".to_string(),
                summary: "x".to_string(),
            },
            ScheduleState::AwaitingEnd {
                calendar_id: "primary".to_string(),
                summary: "x".to_string(),
                start,
            },
        ];
        for state in states {
            assert_eq!(state.handle(DialogueInput::Cancel, Sao_Paulo), Transition::Canceled);
        }
    }
}
