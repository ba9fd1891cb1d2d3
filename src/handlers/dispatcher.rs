use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use chrono_tz::Tz;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{error, info, instrument};

use crate::error::BotError;
use crate::handlers::responder::ChatResponder;
use crate::models::timestamp::{self, YearMonth};
use crate::service::assistant_service::{AssistantService, DEFAULT_TEMPERATURE, GenerativeClient};
use crate::service::board_service::{BoardClient, BoardService};
use crate::service::calendar_service::{
    CalendarClient, CalendarService, DEFAULT_CALENDAR_ID, ScheduleRequest,
};
use crate::service::routing::{Command, Route, route_message};
use crate::service::schedule_flow::{self, DialogueInput, ScheduleState, Transition};
use crate::service::task_service::{ChatId, TaskStore};

pub const WELCOME: &str = "Olá! Eu sou Vision, sua IA executiva para gestão de tempo e projetos.\n\n\
Organize sua rotina com comandos simples (ex.: \"/schedule\", \"/tasklist\") e receba conselhos personalizados \
enviando mensagens sem \"/\". Estou aqui para otimizar seu dia!\n\n\
Comandos disponíveis:\n\
• Para falar comigo diretamente me mande mensagem a qualquer momento, é só escrever que te respondo.\n\
• \"/ask\" - Faça uma pergunta direta\n\
• \"/schedule\" - Agende eventos\n\
• \"/getevent\" - Veja sua agenda do dia\n\
• \"/monday\" - Resumo do Monday.com\n\
• \"/addparticipant\" - Adicione participantes a reuniões\n\
• \"/removeparticipant\" - Remova participantes\n\
• \"/cancelmeeting\" - Cancele uma reunião\n\
• \"/editmeeting\" - Edite data/hora de reuniões\n\
• \"/tasklist\" - Liste tarefas pendentes\n\
• \"/addtask\" - Adicione uma tarefa\n\
• \"/removetask\" - Remova uma tarefa\n\
• \"/prioritizetask\" - Defina prioridades\n\
• \"/freetime\" - Veja horários livres\n\
• \"/busydays\" - Dias mais ocupados do mês\n\
• \"/clearcalendar\" - Liste reuniões para cancelar\n\n\
Experimente agora! Como posso ajudar você hoje?";

pub const LOOKS_LIKE_COMMAND: &str =
    "Isso parece um comando! Use os comandos disponíveis como /schedule ou /tasklist.";
pub const NOTHING_TO_CANCEL: &str = "Nenhum agendamento em andamento.";
pub const SCHEDULING: &str = "Agendando reunião…";
pub const CALENDAR_FAILURE: &str =
    "Ocorreu um erro ao consultar o Google Calendar. Por favor, tente novamente.";
pub const CALENDAR_DATA_FAILURE: &str =
    "O calendário retornou um horário inválido. Por favor, tente novamente mais tarde.";

/// Routes every chat message to the right service and replies through the
/// transport. Messages from one chat are handled one at a time; different
/// chats run concurrently.
///
/// A `/schedule` dialogue stays in `dialogues` until it completes or the chat
/// sends `/cancel`; abandoned dialogues are kept for the life of the process.
pub struct Dispatcher {
    assistant: AssistantService,
    calendar: CalendarService,
    boards: BoardService,
    tz: Tz,
    tasks: Mutex<TaskStore>,
    dialogues: Mutex<HashMap<ChatId, ScheduleState>>,
    chat_locks: Mutex<HashMap<ChatId, Arc<Mutex<()>>>>,
}

impl Dispatcher {
    pub fn new(
        generative: Arc<dyn GenerativeClient>,
        calendar: Arc<dyn CalendarClient>,
        boards: Arc<dyn BoardClient>,
        tz: Tz,
    ) -> Self {
        Self {
            assistant: AssistantService::new(generative),
            calendar: CalendarService::new(calendar, tz),
            boards: BoardService::new(boards),
            tz,
            tasks: Mutex::new(TaskStore::new()),
            dialogues: Mutex::new(HashMap::new()),
            chat_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn lock_chat(&self, chat_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.chat_locks.lock().await;
            locks.entry(chat_id.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Drops the chat's lock entry once no turn holds or awaits it.
    async fn release_chat(&self, chat_id: &str, turn: OwnedMutexGuard<()>) {
        drop(turn);
        let mut locks = self.chat_locks.lock().await;
        if locks.get(chat_id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(chat_id);
        }
    }

    #[instrument(skip(self, text, responder))]
    pub async fn handle_message(&self, chat_id: &str, text: &str, responder: &dyn ChatResponder) {
        let turn = self.lock_chat(chat_id).await;
        self.handle_turn(chat_id, text, responder).await;
        self.release_chat(chat_id, turn).await;
    }

    #[cfg(test)]
    async fn tracked_chats(&self) -> usize {
        self.chat_locks.lock().await.len()
    }

    async fn handle_turn(&self, chat_id: &str, text: &str, responder: &dyn ChatResponder) {
        match route_message(text) {
            Route::Text(text) => {
                let dialogue = self.dialogues.lock().await.remove(chat_id);
                match dialogue {
                    Some(state) => {
                        self.advance_dialogue(chat_id, state, DialogueInput::Text(&text), responder)
                            .await
                    }
                    None => {
                        responder.typing().await;
                        let reply = self.assistant.advise(&text, DEFAULT_TEMPERATURE).await;
                        responder.say(&reply).await;
                    }
                }
            }
            Route::Command(command) => self.run_command(chat_id, command, responder).await,
        }
    }

    async fn advance_dialogue(
        &self,
        chat_id: &str,
        state: ScheduleState,
        input: DialogueInput<'_>,
        responder: &dyn ChatResponder,
    ) {
        match state.handle(input, self.tz) {
            Transition::Continue { state, reply } => {
                self.dialogues.lock().await.insert(chat_id.to_string(), state);
                responder.say(&reply).await;
            }
            Transition::Canceled => {
                info!(chat_id, "scheduling dialogue canceled");
                responder.say(schedule_flow::CANCELED).await;
            }
            Transition::Complete(request) => self.schedule(request, responder).await,
        }
    }

    async fn schedule(&self, request: ScheduleRequest, responder: &dyn ChatResponder) {
        info!(
            calendar_id = %request.calendar_id,
            summary = %request.summary,
            start = %request.start,
            end = %request.end,
            "scheduling event"
        );
        responder.typing().await;
        responder.say(SCHEDULING).await;
        match self.calendar.schedule(&request).await {
            Ok(reply) => responder.say(&reply).await,
            Err(err) => {
                error!(error = %err, "failed to schedule event");
                responder.say(&format!("Erro ao agendar: {}", err)).await;
            }
        }
    }

    async fn run_command(&self, chat_id: &str, command: Command, responder: &dyn ChatResponder) {
        let now = Utc::now();
        let today = timestamp::local_date(now, self.tz);
        let reply = match command {
            Command::Start => WELCOME.to_string(),
            Command::Invalid { reply } => reply,
            Command::Unknown { name } => {
                info!(chat_id, command = %name, "unknown command");
                LOOKS_LIKE_COMMAND.to_string()
            }
            Command::Ask { question } => {
                responder.typing().await;
                self.assistant.advise(&question, DEFAULT_TEMPERATURE).await
            }
            Command::Schedule => {
                let (state, prompt) = ScheduleState::begin();
                self.dialogues.lock().await.insert(chat_id.to_string(), state);
                prompt.to_string()
            }
            Command::Cancel => {
                let dialogue = self.dialogues.lock().await.remove(chat_id);
                match dialogue {
                    Some(state) => {
                        self.advance_dialogue(chat_id, state, DialogueInput::Cancel, responder)
                            .await;
                        return;
                    }
                    None => NOTHING_TO_CANCEL.to_string(),
                }
            }
            Command::TaskList => self.tasks.lock().await.render(chat_id),
            Command::AddTask {
                description,
                deadline,
                responsible,
            } => {
                let mut tasks = self.tasks.lock().await;
                let task = tasks.add(chat_id, &description, deadline, &responsible);
                format!(
                    "Tarefa adicionada: \"{}\" com prazo até {}.",
                    task.description,
                    timestamp::format_day(task.deadline)
                )
            }
            Command::RemoveTask { description } => {
                let removed = self.tasks.lock().await.remove(chat_id, &description);
                if removed > 0 {
                    format!("A tarefa \"{}\" foi removida da sua lista.", description)
                } else {
                    format!("Tarefa \"{}\" não encontrada.", description)
                }
            }
            Command::PrioritizeTask {
                description,
                priority,
            } => {
                let mut tasks = self.tasks.lock().await;
                match tasks.prioritize(chat_id, &description, &priority) {
                    Some(task) => format!(
                        "A tarefa \"{}\" foi marcada como prioridade {}.",
                        task.description, task.priority
                    ),
                    None => format!("Tarefa \"{}\" não encontrada.", description),
                }
            }
            Command::Monday => {
                responder.typing().await;
                self.boards.summary().await
            }
            Command::GetEvent { calendar_id, date } => {
                responder.typing().await;
                calendar_reply(
                    self.calendar
                        .day_agenda(&calendar_id, date.unwrap_or(today))
                        .await,
                )
            }
            Command::AddParticipant { title, email } => {
                responder.typing().await;
                calendar_reply(
                    self.calendar
                        .add_participant(DEFAULT_CALENDAR_ID, &title, &email, now)
                        .await,
                )
            }
            Command::RemoveParticipant { title, email } => {
                responder.typing().await;
                calendar_reply(
                    self.calendar
                        .remove_participant(DEFAULT_CALENDAR_ID, &title, &email, now)
                        .await,
                )
            }
            Command::CancelMeeting { title } => {
                responder.typing().await;
                calendar_reply(
                    self.calendar
                        .cancel_meeting(DEFAULT_CALENDAR_ID, &title, now)
                        .await,
                )
            }
            Command::EditMeeting { title, date, time } => {
                responder.typing().await;
                calendar_reply(
                    self.calendar
                        .edit_meeting(DEFAULT_CALENDAR_ID, &title, date, time, now)
                        .await,
                )
            }
            Command::FreeTime { date } => {
                responder.typing().await;
                let date = date.unwrap_or(today + Duration::days(1));
                calendar_reply(self.calendar.free_time(DEFAULT_CALENDAR_ID, date).await)
            }
            Command::BusyDays { month } => {
                responder.typing().await;
                let month = month.unwrap_or_else(|| YearMonth::of(today));
                calendar_reply(self.calendar.busy_days(DEFAULT_CALENDAR_ID, month).await)
            }
            Command::ClearCalendar { date } => {
                responder.typing().await;
                calendar_reply(
                    self.calendar
                        .clear_calendar(DEFAULT_CALENDAR_ID, date.unwrap_or(today))
                        .await,
                )
            }
        };
        responder.say(&reply).await;
    }
}

fn calendar_reply(result: Result<String, BotError>) -> String {
    match result {
        Ok(reply) => reply,
        Err(BotError::NotFound(title)) => format!("Reunião '{}' não encontrada.", title),
        Err(BotError::Timestamp(err)) => {
            error!(error = %err, "calendar returned an unparseable timestamp");
            CALENDAR_DATA_FAILURE.to_string()
        }
        Err(err) => {
            error!(error = %err, "calendar request failed");
            CALENDAR_FAILURE.to_string()
        }
    }
}
