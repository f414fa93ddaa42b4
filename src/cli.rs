use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::Text;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::service::command_service::{CommandService, Reply};
use crate::store::EventStore;

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single calendar command and print the reply as JSON.
    Exec { line: Vec<String> },
    /// Interactive prompt loop accepting the same verbs as the bot.
    Repl {},
}

pub async fn cli(store: Arc<Mutex<EventStore>>) {
    // Fine to panic here
    let cli = Cli::parse();
    let service = CommandService::new(store);
    match &cli.command {
        Commands::Exec { line } => {
            let input = line.join(" ");
            let reply = service
                .execute(strip_prefix(&input), Local::now().date_naive())
                .await;
            match serde_json::to_string_pretty(&reply) {
                Ok(json) => println!("{json}"),
                Err(err) => println!("Failed to encode reply: {err}"),
            }
        }
        Commands::Repl {} => run_repl(&service).await,
    }
}

async fn run_repl(service: &CommandService) {
    loop {
        let line = match Text::new("calendar>").prompt() {
            Ok(line) => line,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }
        let reply = service
            .execute(strip_prefix(line.trim()), Local::now().date_naive())
            .await;
        let done = print_reply(&reply);
        if done {
            break;
        }
    }
}

// The bot form of every command starts with '.'; accept it here too.
fn strip_prefix(input: &str) -> &str {
    input.strip_prefix('.').unwrap_or(input)
}

fn print_reply(reply: &Reply) -> bool {
    match reply {
        Reply::Text(text) => {
            println!("{text}");
            false
        }
        Reply::Record { title, fields } => {
            println!("{title}");
            for (name, value) in fields {
                println!("  {name} {value}");
            }
            false
        }
        Reply::Listing { title, count, rows } => {
            println!("{title} ({count} events)");
            for row in rows {
                println!("  {row}");
            }
            false
        }
        Reply::Shutdown(text) => {
            println!("{text}");
            true
        }
    }
}
