use std::collections::HashMap;

use chrono::NaiveDate;

use crate::models::task::{TaskItem, capitalize_priority};

pub type ChatId = String;

/// In-memory task lists, one per chat. Nothing is persisted.
#[derive(Debug, Default)]
pub struct TaskStore {
    lists: HashMap<ChatId, Vec<TaskItem>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self, chat_id: &str) -> &[TaskItem] {
        self.lists.get(chat_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn add(
        &mut self,
        chat_id: &str,
        description: &str,
        deadline: NaiveDate,
        responsible: &str,
    ) -> &TaskItem {
        let list = self.lists.entry(chat_id.to_string()).or_default();
        list.push(TaskItem::new(description, deadline, responsible));
        &list[list.len() - 1]
    }

    /// Removes every task with this description; returns how many went away.
    pub fn remove(&mut self, chat_id: &str, description: &str) -> usize {
        let Some(list) = self.lists.get_mut(chat_id) else {
            return 0;
        };
        let before = list.len();
        list.retain(|task| task.description != description);
        let removed = before - list.len();
        if list.is_empty() {
            self.lists.remove(chat_id);
        }
        removed
    }

    pub fn prioritize(&mut self, chat_id: &str, description: &str, priority: &str) -> Option<&TaskItem> {
        let task = self
            .lists
            .get_mut(chat_id)?
            .iter_mut()
            .find(|task| task.description == description)?;
        task.priority = capitalize_priority(priority);
        Some(task)
    }

    pub fn render(&self, chat_id: &str) -> String {
        let tasks = self.list(chat_id);
        if tasks.is_empty() {
            return "Aqui estão suas tarefas pendentes:\nNenhuma tarefa por enquanto!".to_string();
        }
        let mut body = String::from("Aqui estão suas tarefas pendentes:\n");
        for task in tasks {
            body.push_str(&task.render_line());
            body.push('\n');
        }
        body.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deadline() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 28).unwrap()
    }

    #[test]
    fn tasks_are_isolated_per_chat() {
        let mut store = TaskStore::new();
        store.add("chat-a", "Revisar código", deadline(), "joao");
        assert_eq!(store.list("chat-a").len(), 1);
        assert!(store.list("chat-b").is_empty());
        assert!(store.render("chat-b").ends_with("Nenhuma tarefa por enquanto!"));
    }

    #[test]
    fn renders_and_prioritizes() {
        let mut store = TaskStore::new();
        store.add("c", "Revisar código", deadline(), "joao");
        let updated = store.prioritize("c", "Revisar código", "ALTA").unwrap();
        assert_eq!(updated.priority, "Alta");
        assert!(store.prioritize("c", "Outra", "alta").is_none());
        assert_eq!(
            store.render("c"),
            "Aqui estão suas tarefas pendentes:\n- Revisar código (Prazo: 28/03/2025, Responsável: joao, Prioridade: Alta)"
        );
    }

    #[test]
    fn remove_reports_count() {
        let mut store = TaskStore::new();
        store.add("c", "Deploy", deadline(), "ana");
        store.add("c", "Deploy", deadline(), "bia");
        store.add("c", "Testes", deadline(), "ana");
        assert_eq!(store.remove("c", "Deploy"), 2);
        assert_eq!(store.remove("c", "Deploy"), 0);
        assert_eq!(store.remove("other", "Testes"), 0);
        assert_eq!(store.list("c").len(), 1);
    }
}
