use chrono::{NaiveDate, NaiveTime};

use crate::models::timestamp::{self, YearMonth};
use crate::service::calendar_service::DEFAULT_CALENDAR_ID;

pub const USAGE_ASK: &str = "Uso: /ask 'sua pergunta'\nExemplo: /ask 'Qual é o sentido da vida?'";
pub const USAGE_GET_EVENT: &str = "Uso: /getevent [email] [data]\nExemplo: /getevent 'brenamarq@gmail.com' '28/03/2025'\nOu apenas /getevent para o dia atual.";
pub const USAGE_ADD_PARTICIPANT: &str = "Uso: /addparticipant 'título' 'participante'\nExemplo: /addparticipant 'Reunião com equipe' 'joao@gmail.com'";
pub const USAGE_REMOVE_PARTICIPANT: &str = "Uso: /removeparticipant 'título' 'participante'\nExemplo: /removeparticipant 'Reunião com equipe' 'joao@gmail.com'";
pub const USAGE_CANCEL_MEETING: &str =
    "Uso: /cancelmeeting 'título'\nExemplo: /cancelmeeting 'Reunião com equipe'";
pub const USAGE_EDIT_MEETING: &str = "Uso: /editmeeting 'título' 'nova_data' 'novo_horário'\nExemplo: /editmeeting 'Reunião com equipe' '28/03/2025' '14:00'";
pub const USAGE_ADD_TASK: &str = "Uso: /addtask 'descrição' 'prazo' 'responsável'\nExemplo: /addtask 'Revisar código' '28/03/2025' 'joao'";
pub const USAGE_REMOVE_TASK: &str = "Uso: /removetask 'descrição'\nExemplo: /removetask 'Revisar código'";
pub const USAGE_PRIORITIZE_TASK: &str = "Uso: /prioritizetask 'descrição' 'prioridade'\nExemplo: /prioritizetask 'Revisar código' 'alta'";

pub const INVALID_DATE: &str = "Formato inválido! Use 'DD/MM/YYYY' (ex.: '28/03/2025').";
pub const INVALID_EVENT_DATE: &str = "Formato de data inválido! Use 'DD/MM/YYYY' (ex.: '28/03/2025').";
pub const INVALID_MONTH: &str = "Formato inválido! Use 'MM/YYYY' (ex.: '06/2025').";
pub const INVALID_EDIT: &str = "Formato inválido! Use 'DD/MM/YYYY' para data e 'HH:MM' para horário.";
pub const INVALID_DEADLINE: &str = "Formato de prazo inválido! Use 'DD/MM/YYYY' (ex.: '28/03/2025').";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Ask { question: String },
    Schedule,
    Cancel,
    GetEvent { calendar_id: String, date: Option<NaiveDate> },
    AddParticipant { title: String, email: String },
    RemoveParticipant { title: String, email: String },
    CancelMeeting { title: String },
    EditMeeting { title: String, date: NaiveDate, time: NaiveTime },
    TaskList,
    AddTask { description: String, deadline: NaiveDate, responsible: String },
    RemoveTask { description: String },
    PrioritizeTask { description: String, priority: String },
    FreeTime { date: Option<NaiveDate> },
    BusyDays { month: Option<YearMonth> },
    ClearCalendar { date: Option<NaiveDate> },
    Monday,
    /// A `/word` the bot does not know.
    Unknown { name: String },
    /// Known command with bad arguments; carries the reply to send.
    Invalid { reply: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Command(Command),
    Text(String),
}

pub fn route_message(text: &str) -> Route {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Route::Text(trimmed.to_string());
    };
    let (word, remainder) = match rest.split_once(char::is_whitespace) {
        Some((word, remainder)) => (word, remainder.trim()),
        None => (rest, ""),
    };
    // "/freetime@VisionBot" from group chats
    let name = word.split('@').next().unwrap_or(word).to_lowercase();
    Route::Command(parse_command(&name, remainder))
}

fn parse_command(name: &str, remainder: &str) -> Command {
    let args = tokenize_args(remainder);
    match name {
        "start" | "help" => Command::Start,
        "ask" => {
            let question = strip_quotes(remainder);
            if question.is_empty() {
                invalid(USAGE_ASK)
            } else {
                Command::Ask { question }
            }
        }
        "schedule" => Command::Schedule,
        "cancel" => Command::Cancel,
        "getevent" => parse_get_event(&args),
        "addparticipant" => match split_last(&args) {
            Some((title, email)) => Command::AddParticipant { title, email },
            None => invalid(USAGE_ADD_PARTICIPANT),
        },
        "removeparticipant" => match split_last(&args) {
            Some((title, email)) => Command::RemoveParticipant { title, email },
            None => invalid(USAGE_REMOVE_PARTICIPANT),
        },
        "cancelmeeting" => match joined(&args) {
            Some(title) => Command::CancelMeeting { title },
            None => invalid(USAGE_CANCEL_MEETING),
        },
        "editmeeting" => parse_edit_meeting(&args),
        "tasklist" => Command::TaskList,
        "addtask" => parse_add_task(&args),
        "removetask" => match joined(&args) {
            Some(description) => Command::RemoveTask { description },
            None => invalid(USAGE_REMOVE_TASK),
        },
        "prioritizetask" => match split_last(&args) {
            Some((description, priority)) => Command::PrioritizeTask {
                description,
                priority,
            },
            None => invalid(USAGE_PRIORITIZE_TASK),
        },
        "freetime" => match args.first() {
            None => Command::FreeTime { date: None },
            Some(raw) => match timestamp::parse_day(raw) {
                Ok(date) => Command::FreeTime { date: Some(date) },
                Err(_) => invalid(INVALID_DATE),
            },
        },
        "busydays" => match args.first() {
            None => Command::BusyDays { month: None },
            Some(raw) => match timestamp::parse_month(raw) {
                Ok(month) => Command::BusyDays { month: Some(month) },
                Err(_) => invalid(INVALID_MONTH),
            },
        },
        "clearcalendar" => match args.first() {
            None => Command::ClearCalendar { date: None },
            Some(raw) => match timestamp::parse_day(raw) {
                Ok(date) => Command::ClearCalendar { date: Some(date) },
                Err(_) => invalid(INVALID_DATE),
            },
        },
        "monday" => Command::Monday,
        other => Command::Unknown {
            name: other.to_string(),
        },
    }
}

fn parse_get_event(args: &[String]) -> Command {
    match args {
        [] => Command::GetEvent {
            calendar_id: DEFAULT_CALENDAR_ID.to_string(),
            date: None,
        },
        [single] => match timestamp::parse_day(single) {
            Ok(date) => Command::GetEvent {
                calendar_id: DEFAULT_CALENDAR_ID.to_string(),
                date: Some(date),
            },
            Err(_) => Command::GetEvent {
                calendar_id: single.clone(),
                date: None,
            },
        },
        [calendar_id, raw_date] => match timestamp::parse_day(raw_date) {
            Ok(date) => Command::GetEvent {
                calendar_id: calendar_id.clone(),
                date: Some(date),
            },
            Err(_) => invalid(INVALID_EVENT_DATE),
        },
        _ => invalid(USAGE_GET_EVENT),
    }
}

fn parse_edit_meeting(args: &[String]) -> Command {
    if args.len() < 3 {
        return invalid(USAGE_EDIT_MEETING);
    }
    let (title_parts, tail) = args.split_at(args.len() - 2);
    let date = timestamp::parse_day(&tail[0]);
    let time = timestamp::parse_time(&tail[1]);
    match (date, time) {
        (Ok(date), Ok(time)) => Command::EditMeeting {
            title: title_parts.join(" "),
            date,
            time,
        },
        _ => invalid(INVALID_EDIT),
    }
}

fn parse_add_task(args: &[String]) -> Command {
    if args.len() < 3 {
        return invalid(USAGE_ADD_TASK);
    }
    let (description_parts, tail) = args.split_at(args.len() - 2);
    match timestamp::parse_day(&tail[0]) {
        Ok(deadline) => Command::AddTask {
            description: description_parts.join(" "),
            deadline,
            responsible: tail[1].clone(),
        },
        Err(_) => invalid(INVALID_DEADLINE),
    }
}

fn invalid(reply: &str) -> Command {
    Command::Invalid {
        reply: reply.to_string(),
    }
}

/// Free text keeps apostrophes; only a fully quoted remainder is unwrapped.
fn strip_quotes(remainder: &str) -> String {
    let trimmed = remainder.trim();
    for quote in ['\'', '"'] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return trimmed[1..trimmed.len() - 1].trim().to_string();
        }
    }
    trimmed.to_string()
}

fn joined(args: &[String]) -> Option<String> {
    if args.is_empty() {
        None
    } else {
        Some(args.join(" "))
    }
}

/// Everything but the last argument (joined) and the last argument. Lets
/// unquoted multi-word titles through: `/addparticipant Daily do time ana@x.com`.
fn split_last(args: &[String]) -> Option<(String, String)> {
    match args {
        [] | [_] => None,
        [head @ .., last] => Some((head.join(" "), last.clone())),
    }
}

/// Splits on whitespace; single or double quotes group words into one argument.
pub fn tokenize_args(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_token = false;

    for c in input.chars() {
        match quote {
            Some(q) if c == q => {
                quote = None;
            }
            Some(_) => current.push(c),
            None if c == '\'' || c == '"' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    args.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        args.push(current);
    }
    args
}
