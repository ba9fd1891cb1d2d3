use clap::{Parser, Subcommand};
use inquire::Text;
use tracing::info;

use crate::config::Settings;
use crate::handlers::dispatcher::Dispatcher;
use crate::handlers::responder::ConsoleResponder;
use crate::runtime::build_dispatcher;

const CONSOLE_CHAT_ID: &str = "console";

#[derive(Parser)]
#[command(about = "Vision, executive assistant bot")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session; type messages or /commands, `/quit` to leave
    Repl {},
    /// Send a single message, e.g. `send "/freetime 28/03/2025"`
    Send { text: String },
}

pub async fn cli(settings: Settings) {
    // Fine to exit on bad arguments here
    let cli = Cli::parse();
    let dispatcher = build_dispatcher(&settings);
    match &cli.command {
        Commands::Send { text } => {
            dispatcher
                .handle_message(CONSOLE_CHAT_ID, text, &ConsoleResponder)
                .await;
        }
        Commands::Repl {} => repl(&dispatcher).await,
    }
}

async fn repl(dispatcher: &Dispatcher) {
    info!("starting console session");
    loop {
        let line = match Text::new("Você:").prompt() {
            Ok(line) => line,
            Err(err) => {
                println!("Encerrando: {}", err);
                return;
            }
        };
        if matches!(line.trim(), "/quit" | "/exit") {
            return;
        }
        if line.trim().is_empty() {
            continue;
        }
        dispatcher
            .handle_message(CONSOLE_CHAT_ID, &line, &ConsoleResponder)
            .await;
    }
}
