use std::env;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error};

use voterdb_cli::cli::{Cli, Command};
use voterdb_cli::output::ErrorResponse;
use voterdb_cli::{execute, logger, wards};
use voterdb_core::config::Config;
use voterdb_core::wards::WardRegistry;
use voterdb_pg::PgVoterStore;
use voterdb_search::MemoryStore;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli).await {
        Ok(out) => {
            println!("{out}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err:#}");
            if cli.command.wants_json() {
                println!("{}", serde_json::to_string_pretty(&ErrorResponse::new(&err)).unwrap_or_default());
            } else {
                eprintln!("Error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<String> {
    let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
    let config = Config::load_from(&cli.config_dir, &env_name).context("loading configuration")?;
    let settings = config.settings()?;
    logger::init(&settings.log)?;
    debug!(env = %env_name, config_dir = %cli.config_dir.display(), "configuration loaded");

    if let Command::Wards { set } = &cli.command {
        return wards(&WardRegistry::new(&settings.wards), set.as_deref());
    }

    match &cli.data {
        Some(path) => {
            let store = MemoryStore::from_json_file(path)?.with_similarity_threshold(settings.search.similarity_threshold);
            debug!(path = %path.display(), voters = store.len(), "using in-memory roll");
            execute(store, &settings, &cli.command).await
        }
        None => {
            let store = PgVoterStore::connect(&settings.database, false)
                .await
                .context("connecting to the voter database")?;
            execute(store, &settings, &cli.command).await
        }
    }
}
