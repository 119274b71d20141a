use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;

mod app;
mod client;
mod config;
mod error;
mod handler;
mod logging;
mod tui;
mod ui;

#[cfg(test)]
mod test_support;

use app::{App, CONNECT_ERROR};
use client::ChatClient;
use config::Config;

#[derive(Parser)]
#[command(name = "chatline", version)]
#[command(about = "Terminal chat client for a local JSON chat backend")]
struct Cli {
    /// Backend base URL (default: saved config, then http://localhost:8000)
    #[arg(long, env = "CHATLINE_ENDPOINT", global = true)]
    endpoint: Option<String>,

    /// Remember --endpoint as the default
    #[arg(long, requires = "endpoint")]
    save: bool,

    /// Log file for the interactive client
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// trace, debug, info, warn or error
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one message and print the reply
    Send {
        /// Message text, sent as typed
        message: String,
    },
    /// Check that the backend is up
    Ping,
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(endpoint) = &cli.endpoint {
        if cli.save {
            Config::save_endpoint(endpoint)?;
        }
        config.endpoint = Some(endpoint.clone());
    }
    if cli.log_file.is_some() {
        config.log_file = cli.log_file;
    }
    if cli.log_level.is_some() {
        config.log_level = cli.log_level;
    }

    match cli.command {
        None => run_tui(&config).await,
        Some(Commands::Send { message }) => send_once(&config, &message).await,
        Some(Commands::Ping) => ping(&config).await,
        Some(Commands::Config) => {
            let mut effective = config.clone();
            effective.endpoint = Some(config.endpoint().to_string());
            effective.log_file = config.log_file.clone().or_else(Config::default_log_file);
            println!("{}", serde_json::to_string_pretty(&effective)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_tui(config: &Config) -> Result<ExitCode> {
    let level = logging::parse_level(config.log_level.as_deref(), Level::INFO);
    if let Some(path) = config.log_file.clone().or_else(Config::default_log_file) {
        // Still usable without a log; the terminal isn't taken over yet
        if let Err(err) = logging::init_file(&path, level) {
            eprintln!("logging disabled: {err:#}");
        }
    }

    let mut app = App::new(ChatClient::new(config.endpoint()));
    tracing::info!(endpoint = app.client.base_url(), "starting chat client");
    app.probe_backend();

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result?;

    tracing::info!("chat client exited");
    Ok(ExitCode::SUCCESS)
}

async fn run_loop(
    terminal: &mut tui::Tui,
    app: &mut App,
    events: &mut tui::EventHandler,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await,
            None => break,
        }
    }
    Ok(())
}

async fn send_once(config: &Config, message: &str) -> Result<ExitCode> {
    logging::init_stderr(logging::parse_level(config.log_level.as_deref(), Level::WARN))?;

    let mut app = App::new(ChatClient::new(config.endpoint()));
    app.draft = message.to_string();
    if !app.submit() {
        return Ok(ExitCode::SUCCESS);
    }
    app.settle().await;

    if !app.response.is_empty() {
        println!("{}", app.response);
    }
    if app.response == CONNECT_ERROR {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

async fn ping(config: &Config) -> Result<ExitCode> {
    logging::init_stderr(logging::parse_level(config.log_level.as_deref(), Level::WARN))?;

    let client = ChatClient::new(config.endpoint());
    match client.health().await {
        Ok(message) => {
            println!("online: {message}");
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            println!("offline: {err}");
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_send_subcommand_parses() {
        let cli = Cli::parse_from(["chatline", "--endpoint", "http://h:1", "send", "hi there"]);
        assert_eq!(cli.endpoint.as_deref(), Some("http://h:1"));
        assert!(matches!(cli.command, Some(Commands::Send { ref message }) if message == "hi there"));
    }

    #[test]
    fn test_no_subcommand_runs_tui() {
        let cli = Cli::parse_from(["chatline"]);
        assert!(cli.command.is_none());
        assert!(!cli.save);
    }
}
