#![allow(non_snake_case)]

mod calendar;
mod cli;
mod config;
mod error;
mod handlers;
mod models;
mod runtime;
mod service;
mod store;
mod validate;

use std::env;
use std::path::Path;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::store::EventStore;

const DEFAULT_RUN_MODE: &str = "bot";
const DEFAULT_DB_PATH: &str = "./data/events.db";

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = match env::var("CONFIG_FILE") {
        Ok(path) => AppConfig::from_file(&path).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    };

    let get_prop = |key: &str| -> Option<String> {
        config.get(key).or_else(|| env::var(key).ok())
    };

    let db_path = get_prop("EVENTS_DB_PATH").unwrap_or(DEFAULT_DB_PATH.to_string());
    let store = EventStore::open(Path::new(&db_path)).expect("Unable to open event database.");
    let shared_store = Arc::new(tokio::sync::Mutex::new(store));

    let run_mode = get_prop("RUN_MODE").unwrap_or(DEFAULT_RUN_MODE.to_string());
    if run_mode == "bot" {
        let token = get_prop("DISCORD_TOKEN").expect("DISCORD_TOKEN must be set for bot mode");
        let server_id = get_prop("SERVER_ID")
            .expect("SERVER_ID must be set for bot mode")
            .parse::<u64>()
            .expect("SERVER_ID must be a numeric guild id");
        runtime::run_bot(shared_store, token, server_id).await;
    } else if run_mode == "cli" {
        cli::cli(shared_store).await;
    } else {
        log::error!("Invalid run mode {run_mode}");
    }
}
