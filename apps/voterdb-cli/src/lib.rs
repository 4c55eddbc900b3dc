//! voterdb-cli
//!
//! Command handling behind the `voterdb` binary, kept in a library so the
//! commands can run against an in-memory roll in tests.
pub mod cli;
pub mod logger;
pub mod output;

use anyhow::Context;
use tracing::info;

use voterdb_core::config::Settings;
use voterdb_core::error::Error;
use voterdb_core::types::SearchRequest;
use voterdb_core::wards::WardRegistry;
use voterdb_search::{FuzzyVoterSearch, VoterStore};

use crate::cli::{Command, DetailsFormat, Format};
use crate::output::{DetailsResponse, SearchResponse, WardsResponse};

/// Runs `command` against `store` and renders its output.
pub async fn execute<S: VoterStore>(store: S, settings: &Settings, command: &Command) -> anyhow::Result<String> {
    let registry = WardRegistry::new(&settings.wards);
    match command {
        Command::Search(args) => {
            let ward = registry.validate(&args.ward)?;
            let search = FuzzyVoterSearch::new(store, settings.search.clone());
            let request = SearchRequest { method: args.method, query: args.query_text(), ward };
            let records = search.search(&request).await.context("searching voters")?;
            info!(%ward, method = ?args.method, matches = records.len(), "search complete");

            Ok(match args.format {
                Format::Json => serde_json::to_string_pretty(&SearchResponse::new(&records))?,
                Format::Chat => output::chat_list(&records, ward, args.lang, args.top),
                Format::Table => output::table(&records),
            })
        }
        Command::Details(args) => {
            let ward = registry.validate(&args.ward)?;
            let search = FuzzyVoterSearch::new(store, settings.search.clone());
            let details = search
                .voter_details(&args.epic, ward)
                .await
                .context("looking up voter")?
                .ok_or_else(|| Error::NotFound(format!("EPIC {} in ward {ward}", args.epic.trim())))?;

            Ok(match args.format {
                DetailsFormat::Json => serde_json::to_string_pretty(&DetailsResponse::new(&details))?,
                DetailsFormat::Slip => output::slip(&details),
            })
        }
        Command::Wards { set } => wards(&registry, set.as_deref()),
    }
}

/// Lists the valid wards, or the members of one named set.
pub fn wards(registry: &WardRegistry, set: Option<&str>) -> anyhow::Result<String> {
    let body = match set {
        Some(name) => {
            let wards = registry
                .resolve_set(name)
                .ok_or_else(|| Error::InvalidWard(format!("unknown ward set '{name}'")))?;
            WardsResponse { success: true, set: Some(name.to_string()), wards: wards.to_vec(), sets: Vec::new() }
        }
        None => WardsResponse {
            success: true,
            set: None,
            wards: registry.valid_wards().to_vec(),
            sets: registry.set_names().map(str::to_string).collect(),
        },
    };
    Ok(serde_json::to_string_pretty(&body)?)
}
