use std::sync::Arc;

use chrono::TimeZone;
use chrono_tz::America::Sao_Paulo;
use tokio::sync::Mutex;
use visionBot::clients::google_calendar_client::{Attendee, EventDateTime, GoogleEvent};
use visionBot::error::{BotError, Result};
use visionBot::handlers::dispatcher::{CALENDAR_DATA_FAILURE, Dispatcher, LOOKS_LIKE_COMMAND};
use visionBot::handlers::responder::ChatResponder;
use visionBot::models::board::Board;
use visionBot::service::assistant_service::{GenerativeClient, RATE_LIMITED_REPLY};
use visionBot::service::board_service::BoardClient;
use visionBot::service::calendar_service::{CalendarClient, EventQuery};
use visionBot::service::schedule_flow;

struct FakeGenerative {
    response: std::result::Result<String, String>,
    prompts: Mutex<Vec<(String, f32)>>,
}

impl FakeGenerative {
    fn replying(text: &str) -> Self {
        Self {
            response: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn rate_limited() -> Self {
        Self {
            response: Err("429".to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[serenity::async_trait]
impl GenerativeClient for FakeGenerative {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String> {
        self.prompts.lock().await.push((prompt.to_string(), temperature));
        match &self.response {
            Ok(body) => Ok(body.clone()),
            Err(_) => Err(BotError::RateLimited),
        }
    }
}

#[derive(Default)]
struct FakeCalendar {
    events: Vec<GoogleEvent>,
    queries: Mutex<Vec<EventQuery>>,
    listed_calendars: Mutex<Vec<String>>,
    inserted: Mutex<Vec<(String, GoogleEvent)>>,
    patched: Mutex<Vec<(String, GoogleEvent)>>,
    deleted: Mutex<Vec<String>>,
}

impl FakeCalendar {
    fn with_events(events: Vec<GoogleEvent>) -> Self {
        Self {
            events,
            ..Default::default()
        }
    }
}

#[serenity::async_trait]
impl CalendarClient for FakeCalendar {
    async fn list_events(&self, calendar_id: &str, query: &EventQuery) -> Result<Vec<GoogleEvent>> {
        self.queries.lock().await.push(query.clone());
        self.listed_calendars
            .lock()
            .await
            .push(calendar_id.to_string());
        Ok(self.events.clone())
    }

    async fn insert_event(&self, calendar_id: &str, event: &GoogleEvent) -> Result<GoogleEvent> {
        self.inserted
            .lock()
            .await
            .push((calendar_id.to_string(), event.clone()));
        Ok(GoogleEvent {
            id: Some("new-event".to_string()),
            ..event.clone()
        })
    }

    async fn patch_event(
        &self,
        _calendar_id: &str,
        event_id: &str,
        patch: &GoogleEvent,
    ) -> Result<GoogleEvent> {
        self.patched
            .lock()
            .await
            .push((event_id.to_string(), patch.clone()));
        Ok(patch.clone())
    }

    async fn delete_event(&self, _calendar_id: &str, event_id: &str) -> Result<()> {
        self.deleted.lock().await.push(event_id.to_string());
        Ok(())
    }
}

struct FakeBoards;

#[serenity::async_trait]
impl BoardClient for FakeBoards {
    async fn fetch_boards(&self) -> Result<Vec<Board>> {
        Ok(vec![serde_json::from_str(
            r#"{"name":"Tarefas","columns":[{"id":"s","title":"Status"}],
                "items_page":{"items":[{"name":"Deploy","column_values":[{"id":"s","text":"Feito"}]}]}}"#,
        )?])
    }
}

#[derive(Default)]
struct MockResponder {
    replies: Mutex<Vec<String>>,
    typing: Mutex<usize>,
}

impl MockResponder {
    async fn last(&self) -> String {
        self.replies.lock().await.last().cloned().unwrap_or_default()
    }
}

#[serenity::async_trait]
impl ChatResponder for MockResponder {
    async fn typing(&self) {
        *self.typing.lock().await += 1;
    }

    async fn say(&self, content: &str) {
        self.replies.lock().await.push(content.to_string());
    }
}

fn timed(id: &str, summary: &str, start: &str, end: &str) -> GoogleEvent {
    GoogleEvent {
        id: Some(id.to_string()),
        summary: Some(summary.to_string()),
        start: Some(EventDateTime {
            date_time: Some(start.to_string()),
            ..Default::default()
        }),
        end: Some(EventDateTime {
            date_time: Some(end.to_string()),
            ..Default::default()
        }),
        attendees: None,
    }
}

fn dispatcher_with(
    generative: Arc<FakeGenerative>,
    calendar: Arc<FakeCalendar>,
) -> Dispatcher {
    Dispatcher::new(generative, calendar, Arc::new(FakeBoards), Sao_Paulo)
}

#[tokio::test]
async fn free_time_merges_overlapping_meetings() {
    let calendar = Arc::new(FakeCalendar::with_events(vec![
        timed("a", "Daily", "2025-06-02T09:00:00-03:00", "2025-06-02T10:00:00-03:00"),
        timed("b", "Review", "2025-06-02T09:30:00-03:00", "2025-06-02T11:00:00-03:00"),
    ]));
    let dispatcher = dispatcher_with(Arc::new(FakeGenerative::replying("")), calendar.clone());
    let responder = MockResponder::default();

    dispatcher
        .handle_message("chat", "/freetime 02/06/2025", &responder)
        .await;

    assert_eq!(
        responder.last().await,
        "Horários livres em 02/06/2025:\n- 08:00 às 09:00\n- 11:00 às 18:00"
    );
    let queries = calendar.queries.lock().await;
    assert_eq!(
        queries[0].time_min,
        chrono::Utc.with_ymd_and_hms(2025, 6, 2, 3, 0, 0).unwrap()
    );
    assert_eq!(
        queries[0].time_max,
        chrono::Utc.with_ymd_and_hms(2025, 6, 3, 3, 0, 0).unwrap()
    );
}

#[tokio::test]
async fn free_time_reports_fully_booked_day() {
    let calendar = Arc::new(FakeCalendar::with_events(vec![timed(
        "a",
        "Offsite",
        "2025-06-02T07:00:00-03:00",
        "2025-06-02T19:00:00-03:00",
    )]));
    let dispatcher = dispatcher_with(Arc::new(FakeGenerative::replying("")), calendar);
    let responder = MockResponder::default();

    dispatcher
        .handle_message("chat", "/freetime 02/06/2025", &responder)
        .await;

    assert!(responder.last().await.starts_with("Nenhum horário livre em 02/06/2025"));
}

#[tokio::test]
async fn busy_days_ranks_month_with_tie_break() {
    let calendar = Arc::new(FakeCalendar::with_events(vec![
        timed("1", "A", "2025-06-01T09:00:00-03:00", "2025-06-01T10:00:00-03:00"),
        timed("2", "B", "2025-06-01T11:00:00-03:00", "2025-06-01T12:00:00-03:00"),
        timed("3", "C", "2025-06-01T14:00:00-03:00", "2025-06-01T15:00:00-03:00"),
        timed("4", "D", "2025-06-02T09:00:00-03:00", "2025-06-02T10:00:00-03:00"),
        timed("5", "E", "2025-06-03T09:00:00-03:00", "2025-06-03T10:00:00-03:00"),
        timed("6", "F", "2025-06-03T10:00:00-03:00", "2025-06-03T11:00:00-03:00"),
        timed("7", "G", "2025-06-03T16:00:00-03:00", "2025-06-03T17:00:00-03:00"),
    ]));
    let dispatcher = dispatcher_with(Arc::new(FakeGenerative::replying("")), calendar.clone());
    let responder = MockResponder::default();

    dispatcher
        .handle_message("chat", "/busydays 06/2025", &responder)
        .await;

    assert_eq!(
        responder.last().await,
        "Dias mais ocupados em 06/2025:\n- 01/06: 3 reuniões\n- 03/06: 3 reuniões\n- 02/06: 1 reunião"
    );
    let queries = calendar.queries.lock().await;
    assert_eq!(
        queries[0].time_max,
        chrono::Utc.with_ymd_and_hms(2025, 7, 1, 3, 0, 0).unwrap()
    );
}

#[tokio::test]
async fn busy_days_without_events_says_so() {
    let dispatcher = dispatcher_with(
        Arc::new(FakeGenerative::replying("")),
        Arc::new(FakeCalendar::default()),
    );
    let responder = MockResponder::default();

    dispatcher
        .handle_message("chat", "/busydays 02/2026", &responder)
        .await;

    assert_eq!(responder.last().await, "Nenhuma reunião encontrada em 02/2026.");
}

#[tokio::test]
async fn malformed_calendar_timestamp_is_reported_not_fatal() {
    let calendar = Arc::new(FakeCalendar::with_events(vec![timed(
        "a",
        "Quebrado",
        "02/06/2025 09:00",
        "2025-06-02T10:00:00-03:00",
    )]));
    let dispatcher = dispatcher_with(Arc::new(FakeGenerative::replying("")), calendar);
    let responder = MockResponder::default();

    dispatcher
        .handle_message("chat", "/freetime 02/06/2025", &responder)
        .await;
    assert_eq!(responder.last().await, CALENDAR_DATA_FAILURE);

    dispatcher.handle_message("chat", "/tasklist", &responder).await;
    assert!(responder.last().await.contains("Nenhuma tarefa por enquanto!"));
}

#[tokio::test]
async fn schedule_dialogue_inserts_event() {
    let calendar = Arc::new(FakeCalendar::default());
    let dispatcher = dispatcher_with(Arc::new(FakeGenerative::replying("")), calendar.clone());
    let responder = MockResponder::default();

    for message in [
        "/schedule",
        "ana@gmail.com",
        "Reunião com equipe",
        "21/03/2025 10:00",
        "21/03/2025 11:00",
    ] {
        dispatcher.handle_message("chat", message, &responder).await;
    }

    let replies = responder.replies.lock().await.clone();
    assert_eq!(replies[0], schedule_flow::ASK_CALENDAR);
    assert_eq!(replies[1], schedule_flow::ASK_SUMMARY);
    assert_eq!(replies[2], schedule_flow::ASK_START);
    assert_eq!(replies[3], schedule_flow::ASK_END);
    assert_eq!(replies[4], "Agendando reunião…");
    assert_eq!(replies[5], "Evento agendado!");

    let inserted = calendar.inserted.lock().await;
    let (calendar_id, event) = &inserted[0];
    assert_eq!(calendar_id, "ana@gmail.com");
    assert_eq!(event.summary.as_deref(), Some("Reunião com equipe"));
    let start = event.start.as_ref().unwrap();
    assert_eq!(start.date_time.as_deref(), Some("2025-03-21T10:00:00-03:00"));
    assert_eq!(start.time_zone.as_deref(), Some("America/Sao_Paulo"));
}

#[tokio::test]
async fn schedule_dialogue_can_be_canceled_and_is_per_chat() {
    let generative = Arc::new(FakeGenerative::replying("Use a Matriz Eisenhower."));
    let calendar = Arc::new(FakeCalendar::default());
    let dispatcher = dispatcher_with(generative.clone(), calendar.clone());
    let responder = MockResponder::default();

    dispatcher.handle_message("chat-a", "/schedule", &responder).await;
    dispatcher
        .handle_message("chat-b", "Estou sobrecarregado", &responder)
        .await;
    assert_eq!(responder.last().await, "Use a Matriz Eisenhower.");

    dispatcher.handle_message("chat-a", "primary", &responder).await;
    dispatcher.handle_message("chat-a", "/cancel", &responder).await;
    assert_eq!(responder.last().await, schedule_flow::CANCELED);

    dispatcher
        .handle_message("chat-a", "Reunião com equipe", &responder)
        .await;
    assert_eq!(responder.last().await, "Use a Matriz Eisenhower.");
    assert!(calendar.inserted.lock().await.is_empty());
    assert_eq!(generative.prompts.lock().await.len(), 2);
}

#[tokio::test]
async fn cancel_meeting_deletes_matching_event() {
    let calendar = Arc::new(FakeCalendar::with_events(vec![
        timed("x", "Daily", "2099-06-02T09:00:00-03:00", "2099-06-02T09:15:00-03:00"),
        timed("y", "Reunião com equipe", "2099-06-03T14:00:00-03:00", "2099-06-03T15:00:00-03:00"),
    ]));
    let dispatcher = dispatcher_with(Arc::new(FakeGenerative::replying("")), calendar.clone());
    let responder = MockResponder::default();

    dispatcher
        .handle_message("chat", "/cancelmeeting 'reunião com equipe'", &responder)
        .await;

    assert_eq!(*calendar.deleted.lock().await, vec!["y".to_string()]);
    assert_eq!(
        responder.last().await,
        "Reunião 'Reunião com equipe' de 03/06/2099 cancelada."
    );

    dispatcher
        .handle_message("chat", "/cancelmeeting Inexistente", &responder)
        .await;
    assert_eq!(responder.last().await, "Reunião 'Inexistente' não encontrada.");
}

#[tokio::test]
async fn edit_meeting_keeps_duration() {
    let calendar = Arc::new(FakeCalendar::with_events(vec![timed(
        "y",
        "1:1",
        "2099-06-03T14:00:00-03:00",
        "2099-06-03T14:45:00-03:00",
    )]));
    let dispatcher = dispatcher_with(Arc::new(FakeGenerative::replying("")), calendar.clone());
    let responder = MockResponder::default();

    dispatcher
        .handle_message("chat", "/editmeeting 1:1 05/06/2099 16:30", &responder)
        .await;

    let patched = calendar.patched.lock().await;
    let (event_id, patch) = &patched[0];
    assert_eq!(event_id, "y");
    assert_eq!(
        patch.start.as_ref().unwrap().date_time.as_deref(),
        Some("2099-06-05T16:30:00-03:00")
    );
    assert_eq!(
        patch.end.as_ref().unwrap().date_time.as_deref(),
        Some("2099-06-05T17:15:00-03:00")
    );
    assert_eq!(
        responder.last().await,
        "Reunião '1:1' remarcada para 05/06/2099 às 16:30."
    );
}

#[tokio::test]
async fn add_participant_appends_attendee() {
    let mut event = timed("y", "Planning", "2099-06-03T14:00:00-03:00", "2099-06-03T15:00:00-03:00");
    event.attendees = Some(vec![Attendee {
        email: "ana@gmail.com".to_string(),
    }]);
    let calendar = Arc::new(FakeCalendar::with_events(vec![event]));
    let dispatcher = dispatcher_with(Arc::new(FakeGenerative::replying("")), calendar.clone());
    let responder = MockResponder::default();

    dispatcher
        .handle_message("chat", "/addparticipant Planning joao@gmail.com", &responder)
        .await;

    let patched = calendar.patched.lock().await;
    let emails: Vec<String> = patched[0]
        .1
        .attendees
        .clone()
        .unwrap()
        .into_iter()
        .map(|a| a.email)
        .collect();
    assert_eq!(emails, vec!["ana@gmail.com", "joao@gmail.com"]);
    assert_eq!(
        responder.last().await,
        "joao@gmail.com adicionado à reunião 'Planning'."
    );
}

#[tokio::test]
async fn tasks_are_kept_per_chat() {
    let dispatcher = dispatcher_with(
        Arc::new(FakeGenerative::replying("")),
        Arc::new(FakeCalendar::default()),
    );
    let responder = MockResponder::default();

    dispatcher
        .handle_message("chat-a", "/addtask 'Revisar código' 28/03/2025 joao", &responder)
        .await;
    assert_eq!(
        responder.last().await,
        "Tarefa adicionada: \"Revisar código\" com prazo até 28/03/2025."
    );
    dispatcher
        .handle_message("chat-a", "/prioritizetask 'Revisar código' alta", &responder)
        .await;
    assert_eq!(
        responder.last().await,
        "A tarefa \"Revisar código\" foi marcada como prioridade Alta."
    );

    dispatcher.handle_message("chat-b", "/tasklist", &responder).await;
    assert!(responder.last().await.contains("Nenhuma tarefa por enquanto!"));

    dispatcher.handle_message("chat-a", "/tasklist", &responder).await;
    assert!(responder.last().await.contains(
        "- Revisar código (Prazo: 28/03/2025, Responsável: joao, Prioridade: Alta)"
    ));

    dispatcher
        .handle_message("chat-b", "/removetask 'Revisar código'", &responder)
        .await;
    assert_eq!(responder.last().await, "Tarefa \"Revisar código\" não encontrada.");
}

#[tokio::test]
async fn ask_uses_persona_prompt_and_reports_rate_limit() {
    let generative = Arc::new(FakeGenerative::rate_limited());
    let dispatcher = dispatcher_with(generative.clone(), Arc::new(FakeCalendar::default()));
    let responder = MockResponder::default();

    dispatcher
        .handle_message("chat", "/ask Como organizo minha semana?", &responder)
        .await;

    assert_eq!(responder.last().await, RATE_LIMITED_REPLY);
    assert_eq!(*responder.typing.lock().await, 1);
    let prompts = generative.prompts.lock().await;
    let (prompt, temperature) = &prompts[0];
    assert!(prompt.starts_with("Você é o Vision"));
    assert!(prompt.ends_with("Pergunta do usuário: Como organizo minha semana?"));
    assert_eq!(*temperature, 0.7);
}

#[tokio::test]
async fn unknown_and_malformed_commands_get_help() {
    let dispatcher = dispatcher_with(
        Arc::new(FakeGenerative::replying("")),
        Arc::new(FakeCalendar::default()),
    );
    let responder = MockResponder::default();

    dispatcher.handle_message("chat", "/dance", &responder).await;
    assert_eq!(responder.last().await, LOOKS_LIKE_COMMAND);

    dispatcher
        .handle_message("chat", "/busydays junho", &responder)
        .await;
    assert_eq!(
        responder.last().await,
        "Formato inválido! Use 'MM/YYYY' (ex.: '06/2025')."
    );
}

#[tokio::test]
async fn monday_summary_lists_items() {
    let dispatcher = dispatcher_with(
        Arc::new(FakeGenerative::replying("")),
        Arc::new(FakeCalendar::default()),
    );
    let responder = MockResponder::default();

    dispatcher.handle_message("chat", "/monday", &responder).await;

    let reply = responder.last().await;
    assert!(reply.starts_with("Oi! Aqui está um resumo dos seus projetos no Monday.com:"));
    assert!(reply.contains("   - Deploy (Status: Feito)"));
}

#[tokio::test]
async fn busy_days_ignores_events_started_last_month() {
    let calendar = Arc::new(FakeCalendar::with_events(vec![
        timed("v", "Virada", "2025-05-31T23:00:00-03:00", "2025-06-01T01:00:00-03:00"),
        timed("d", "Daily", "2025-06-10T09:00:00-03:00", "2025-06-10T09:15:00-03:00"),
    ]));
    let dispatcher = dispatcher_with(Arc::new(FakeGenerative::replying("")), calendar);
    let responder = MockResponder::default();

    dispatcher
        .handle_message("chat", "/busydays 06/2025", &responder)
        .await;

    let reply = responder.last().await;
    assert!(!reply.contains("31/05"));
    assert_eq!(reply, "Dias mais ocupados em 06/2025:\n- 10/06: 1 reunião");
}

fn planning_with(emails: &[&str]) -> GoogleEvent {
    let mut event = timed("p", "Planning", "2099-06-03T14:00:00-03:00", "2099-06-03T15:00:00-03:00");
    event.attendees = Some(
        emails
            .iter()
            .map(|email| Attendee {
                email: email.to_string(),
            })
            .collect(),
    );
    event
}

#[tokio::test]
async fn remove_participant_patches_remaining_attendees() {
    let calendar = Arc::new(FakeCalendar::with_events(vec![planning_with(&[
        "ana@gmail.com",
        "joao@gmail.com",
    ])]));
    let dispatcher = dispatcher_with(Arc::new(FakeGenerative::replying("")), calendar.clone());
    let responder = MockResponder::default();

    dispatcher
        .handle_message("chat", "/removeparticipant Planning ana@gmail.com", &responder)
        .await;

    assert_eq!(
        responder.last().await,
        "ana@gmail.com removido da reunião 'Planning'."
    );
    let patched = calendar.patched.lock().await;
    let (event_id, patch) = &patched[0];
    assert_eq!(event_id, "p");
    let emails: Vec<String> = patch
        .attendees
        .clone()
        .unwrap()
        .into_iter()
        .map(|a| a.email)
        .collect();
    assert_eq!(emails, vec!["joao@gmail.com"]);
}

#[tokio::test]
async fn participant_changes_without_effect_do_not_patch() {
    let calendar = Arc::new(FakeCalendar::with_events(vec![planning_with(&["ana@gmail.com"])]));
    let dispatcher = dispatcher_with(Arc::new(FakeGenerative::replying("")), calendar.clone());
    let responder = MockResponder::default();

    dispatcher
        .handle_message("chat", "/removeparticipant Planning bia@gmail.com", &responder)
        .await;
    assert_eq!(
        responder.last().await,
        "bia@gmail.com não participa de 'Planning'."
    );

    dispatcher
        .handle_message("chat", "/addparticipant Planning Ana@Gmail.com", &responder)
        .await;
    assert_eq!(
        responder.last().await,
        "Ana@Gmail.com já participa de 'Planning'."
    );

    assert!(calendar.patched.lock().await.is_empty());
}

fn busy_day() -> Vec<GoogleEvent> {
    vec![
        timed("a", "Daily", "2025-06-02T09:00:00-03:00", "2025-06-02T10:00:00-03:00"),
        timed("b", "Review", "2025-06-02T14:00:00-03:00", "2025-06-02T15:00:00-03:00"),
    ]
}

#[tokio::test]
async fn get_event_lists_agenda_of_given_calendar() {
    let calendar = Arc::new(FakeCalendar::with_events(busy_day()));
    let dispatcher = dispatcher_with(Arc::new(FakeGenerative::replying("")), calendar.clone());
    let responder = MockResponder::default();

    dispatcher
        .handle_message("chat", "/getevent ana@gmail.com 02/06/2025", &responder)
        .await;

    assert_eq!(
        responder.last().await,
        "Eventos em 02/06/2025:\n- 09:00 às 10:00: Daily\n- 14:00 às 15:00: Review"
    );
    assert_eq!(*calendar.listed_calendars.lock().await, vec!["ana@gmail.com"]);
    assert_eq!(
        calendar.queries.lock().await[0].time_min,
        chrono::Utc.with_ymd_and_hms(2025, 6, 2, 3, 0, 0).unwrap()
    );
}

#[tokio::test]
async fn get_event_on_empty_day() {
    let dispatcher = dispatcher_with(
        Arc::new(FakeGenerative::replying("")),
        Arc::new(FakeCalendar::default()),
    );
    let responder = MockResponder::default();

    dispatcher
        .handle_message("chat", "/getevent ana@gmail.com 02/06/2025", &responder)
        .await;

    assert_eq!(responder.last().await, "Nenhum evento encontrado em 02/06/2025.");
}

#[tokio::test]
async fn clear_calendar_lists_cancelable_meetings() {
    let calendar = Arc::new(FakeCalendar::with_events(busy_day()));
    let dispatcher = dispatcher_with(Arc::new(FakeGenerative::replying("")), calendar.clone());
    let responder = MockResponder::default();

    dispatcher
        .handle_message("chat", "/clearcalendar 02/06/2025", &responder)
        .await;

    assert_eq!(
        responder.last().await,
        "Reuniões em 02/06/2025 que podem ser canceladas:\n- Daily (09:00)\n- Review (14:00)\nUse /cancelmeeting 'título' para cancelar."
    );
    assert!(calendar.deleted.lock().await.is_empty());
}

#[tokio::test]
async fn clear_calendar_on_empty_day() {
    let dispatcher = dispatcher_with(
        Arc::new(FakeGenerative::replying("")),
        Arc::new(FakeCalendar::default()),
    );
    let responder = MockResponder::default();

    dispatcher
        .handle_message("chat", "/clearcalendar 02/06/2025", &responder)
        .await;

    assert_eq!(responder.last().await, "Nenhuma reunião para cancelar em 02/06/2025.");
}
