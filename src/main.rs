//! persona-relay binary: HTTP server, interactive chat, one-shot questions.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use persona_relay::config::{load_dotenv, AppConfig, Secrets};
use persona_relay::core::{ChatService, Turn};
use persona_relay::notify::{notifier_from_secrets, Notifier};
use persona_relay::persona::Persona;
use persona_relay::providers::gemini::GeminiProvider;
use persona_relay::{logging, server};

/// Persona chat front-end relaying to Gemini.
#[derive(Debug, Parser)]
#[command(name = "persona-relay", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP chat API.
    Serve {
        /// Listen address, overrides config.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Interactive chat on stdin/stdout.
    Chat,
    /// Ask one question and print the answer.
    Ask {
        /// The message to send.
        message: String,
        /// Prior history as JSON, in any supported shape.
        #[arg(long)]
        history: Option<String>,
    },
    /// Print the rendered system prompt.
    Prompt,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    load_dotenv();
    let config = AppConfig::load().context("failed to load configuration")?;

    match cli.command {
        Command::Serve { bind } => {
            let _guard = logging::init_production(&config.server.logs_dir)?;
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let state = build_state(&config);
            server::run(&bind, state).await
        }
        Command::Chat => {
            logging::init_cli();
            let state = build_state(&config);
            run_repl(&state.chat).await
        }
        Command::Ask { message, history } => {
            logging::init_cli();
            let history = match history {
                Some(raw) => serde_json::from_str(&raw).context("--history must be valid JSON")?,
                None => Value::Null,
            };
            let state = build_state(&config);
            println!("{}", state.chat.chat(&message, &history).await);
            Ok(())
        }
        Command::Prompt => {
            logging::init_cli();
            print!("{}", Persona::load(&config.persona).system_prompt());
            Ok(())
        }
    }
}

/// Load documents and secrets once and wire the collaborators together.
fn build_state(config: &AppConfig) -> server::AppState {
    let secrets = Secrets::from_env();
    secrets.log_presence();

    let persona = Persona::load(&config.persona);
    let provider = GeminiProvider::new(
        secrets.google_api_key().map(str::to_owned),
        config.model.base_url.clone(),
        Duration::from_secs(config.model.timeout_secs),
    );
    if !provider.has_api_key() {
        tracing::warn!("no Gemini API key found; set GOOGLE_API_KEY or GEMINI_API_KEY");
    }

    let chat = ChatService::new(
        Arc::new(provider),
        persona.system_prompt(),
        config.model.id.clone(),
    );
    let notifier: Arc<dyn Notifier> = notifier_from_secrets(&secrets);
    info!(persona = %persona.name, model = %config.model.id, "chat service ready");

    server::AppState {
        chat,
        notifier,
        persona_name: persona.name,
    }
}

/// Line-oriented chat loop. History is kept as `[user, assistant]` pairs.
async fn run_repl(chat: &ChatService) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut turns: Vec<Turn> = Vec::new();

    stdout
        .write_all(b"Type a message, /reset to clear history, /quit to exit.\n")
        .await?;

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let message = line.trim();
        match message {
            "" => continue,
            "/quit" | "/exit" => break,
            "/reset" => {
                turns.clear();
                stdout.write_all(b"(history cleared)\n").await?;
                continue;
            }
            _ => {}
        }

        let history = Value::Array(turns.iter().map(Turn::to_pair).collect());
        let outcome = chat.respond(message, &history).await;
        let keep = outcome.is_reply();
        let answer = outcome.into_text();
        stdout.write_all(format!("{answer}\n").as_bytes()).await?;
        if keep {
            turns.push(Turn::new(message, answer));
        }
    }

    Ok(())
}
