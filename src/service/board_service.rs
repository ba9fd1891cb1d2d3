use std::sync::Arc;

use serenity::async_trait;
use tracing::error;

use crate::error::Result;
use crate::models::board::{Board, BoardItem};

#[async_trait]
pub trait BoardClient: Send + Sync {
    async fn fetch_boards(&self) -> Result<Vec<Board>>;
}

const SKIPPED_BOARD: &str = "Introdução";

pub struct BoardService {
    client: Arc<dyn BoardClient>,
}

impl BoardService {
    pub fn new(client: Arc<dyn BoardClient>) -> Self {
        Self { client }
    }

    pub async fn summary(&self) -> String {
        match self.client.fetch_boards().await {
            Ok(boards) => render_board_summary(&boards),
            Err(err) => {
                error!(error = %err, "failed to fetch project boards");
                format!("Oops! Algo deu errado ao consultar o Monday.com: {}", err)
            }
        }
    }
}

pub fn render_board_summary(boards: &[Board]) -> String {
    let mut summary = String::from("Oi! Aqui está um resumo dos seus projetos no Monday.com:\n\n");
    for board in boards {
        if board.name == SKIPPED_BOARD {
            continue;
        }
        summary.push_str(&format!("📋 *{}*:\n", board.name));
        let items = board.items();
        if items.is_empty() {
            summary.push_str("   - Nada por aqui ainda!\n\n");
            continue;
        }
        for item in items {
            summary.push_str(&format!("   - {} ({})\n", item.name, item_details(board, item)));
        }
        summary.push('\n');
    }
    summary.trim_end().to_string()
}

fn item_details(board: &Board, item: &BoardItem) -> String {
    let column = |titles: &[&str], fallback: &str| {
        board
            .column_text(item, titles)
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string())
    };
    match board.name.as_str() {
        "Sprints" => format!(
            "Cronograma: {}, Meta: {}",
            column(&["Timeline"], "Sem cronograma"),
            column(&["Goal", "Meta"], "Sem meta")
        ),
        "Épicos" => format!(
            "Responsável: {}, Fase: {}",
            column(&["Person", "Owner"], "Sem proprietário"),
            column(&["Phase", "Fase"], "Sem fase")
        ),
        "Retrospectivas" => format!(
            "Recorrente: {}, Tipo: {}",
            column(&["Recurring", "Recorrente"], "Não especificado"),
            column(&["Type", "Tipo"], "Sem tipo")
        ),
        _ => format!("Status: {}", column(&["Status"], "Sem status")),
    }
}
