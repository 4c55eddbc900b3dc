//! Runs against a live roll. Set DATABASE_URL and pass `--ignored`.

use voterdb_core::config::{DatabaseSettings, SearchSettings};
use voterdb_core::error::Error;
use voterdb_core::types::Ward;
use voterdb_pg::PgVoterStore;
use voterdb_search::{FuzzyVoterSearch, VoterStore};

fn settings_from_env() -> Option<DatabaseSettings> {
    let url = std::env::var("DATABASE_URL").ok()?;
    Some(DatabaseSettings { url: Some(url), ..DatabaseSettings::default() })
}

#[tokio::test]
async fn missing_url_is_a_configuration_error() {
    let err = PgVoterStore::connect(&DatabaseSettings::default(), true).await.err().unwrap();
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[tokio::test]
async fn unreachable_server_is_a_connectivity_error() {
    let settings = DatabaseSettings {
        url: Some("postgres://voterdb@127.0.0.1:1/voterdb".to_string()),
        max_connections: 1,
        acquire_timeout_secs: 1,
    };
    let store = PgVoterStore::connect(&settings, true).await.unwrap();
    let err = store.has_trigram_support().await.unwrap_err();
    assert!(err.is_connectivity(), "{err}");

    let search = FuzzyVoterSearch::new(store, SearchSettings::default());
    assert!(search.search_by_name("Ram Kumar", Ward(146)).await.is_err());
}

#[tokio::test]
#[ignore]
async fn live_name_search_stays_in_ward() {
    let Some(settings) = settings_from_env() else { return };
    let store = PgVoterStore::connect(&settings, false).await.unwrap();
    let search = FuzzyVoterSearch::new(store, SearchSettings::default());

    let results = search.search_by_name("Ram Kumar", Ward(146)).await.unwrap();
    assert!(results.len() <= 50);
    assert!(results.iter().all(|r| r.ward_no == Some(Ward(146))));
}

#[tokio::test]
#[ignore]
async fn live_epic_lookup_is_case_insensitive() {
    let Some(settings) = settings_from_env() else { return };
    let store = PgVoterStore::connect(&settings, false).await.unwrap();
    let search = FuzzyVoterSearch::new(store, SearchSettings::default());

    let upper = search.search_by_epic("NCT6342834", Ward(146), 50).await.unwrap();
    let lower = search.search_by_epic("nct6342834", Ward(146), 50).await.unwrap();
    assert_eq!(upper, lower);
}
