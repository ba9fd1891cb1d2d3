#![allow(non_snake_case)]

use std::env;
use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use visionBot::cli;
use visionBot::config::{AppConfig, RunMode, Settings};
use visionBot::runtime;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match env::var("CONFIG_FILE") {
        Ok(path) => match AppConfig::from_file(&path) {
            Ok(config) => config,
            Err(err) => {
                error!(error = %err, "falling back to environment");
                AppConfig::default()
            }
        },
        Err(_) => AppConfig::default(),
    };

    let settings = match Settings::from_config(&config) {
        Ok(settings) => settings,
        Err(err) => {
            error!(error = %err, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    match settings.run_mode {
        RunMode::Api => {
            if let Err(err) = runtime::run_api(settings).await {
                error!(error = %err, "bot stopped");
                return ExitCode::FAILURE;
            }
        }
        RunMode::Cli => cli::cli(settings).await,
    }
    ExitCode::SUCCESS
}
