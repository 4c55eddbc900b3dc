//! Layered configuration.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (`__` separates nested keys, e.g. `APP_SEARCH__LIMIT=20`). `DATABASE_URL`
//! is honoured as an alias for `database.url`.
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::Path;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_from(Path::new("."), &env_name)
    }

    pub fn load_from(dir: &Path, env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(dir.join("config.toml")));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file(dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment
            .merge(Env::raw().only(&["DATABASE_URL"]).map(|_| "database.url".into()))
            .merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.validate_for_env(env_name)?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn settings(&self) -> anyhow::Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))
    }

    fn validate_for_env(&self, env: &str) -> anyhow::Result<()> {
        let settings = self.settings()?;
        settings.search.validate()?;
        match env {
            "prod" | "production" => {
                if settings.database.url.is_none() {
                    anyhow::bail!("database.url (or DATABASE_URL) is required in production");
                }
            }
            "dev" | "development" => {}
            "test" | "testing" => {}
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub search: SearchSettings,
    pub wards: WardSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self { url: None, max_connections: 5, acquire_timeout_secs: 10 }
    }
}

/// Tuning knobs for name search. The defaults reproduce the ranking the
/// web route and the chat bot have always shipped with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Hard cap on returned rows, also the datastore-side candidate cap.
    pub limit: usize,
    /// Trigram-tier candidates scoring below this are dropped.
    pub min_score: f64,
    /// Multi-word trigram queries need at least this many matched words.
    pub word_floor: u32,
    /// Whole-query similarity needed for the typo-tolerant branch.
    pub whole_similarity_threshold: f64,
    /// Threshold of the `%` operator (`pg_trgm.similarity_threshold`).
    pub similarity_threshold: f64,
    pub trigram_weights: TrigramWeights,
    pub pattern_weights: PatternWeights,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            limit: 50,
            min_score: 0.2,
            word_floor: 2,
            whole_similarity_threshold: 0.3,
            similarity_threshold: 0.3,
            trigram_weights: TrigramWeights::default(),
            pattern_weights: PatternWeights::default(),
        }
    }
}

impl SearchSettings {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.limit == 0 {
            anyhow::bail!("search.limit must be greater than zero");
        }
        for (name, value) in [
            ("search.min_score", self.min_score),
            ("search.whole_similarity_threshold", self.whole_similarity_threshold),
            ("search.similarity_threshold", self.similarity_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                anyhow::bail!("{} must be within [0, 1], got {}", name, value);
            }
        }
        Ok(())
    }
}

/// Score contributions of the trigram tier. The composite score is the
/// maximum of all applicable contributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrigramWeights {
    pub exact_full_name: f64,
    pub exact_relation_name: f64,
    /// Containment bonus for the first word; later words lose `word_decay` each.
    pub word_base: f64,
    pub word_decay: f64,
    /// Subtracted from the word bonus when only the relation name contains it.
    pub relation_word_penalty: f64,
    pub all_words: f64,
    pub three_of_three: f64,
    pub two_of_three: f64,
    pub two_thirds: f64,
    pub half: f64,
    pub at_least_two: f64,
}

impl Default for TrigramWeights {
    fn default() -> Self {
        Self {
            exact_full_name: 0.95,
            exact_relation_name: 0.85,
            word_base: 0.6,
            word_decay: 0.05,
            relation_word_penalty: 0.1,
            all_words: 1.0,
            three_of_three: 0.9,
            two_of_three: 0.5,
            two_thirds: 0.5,
            half: 0.3,
            at_least_two: 0.2,
        }
    }
}

/// Additive hit weights of the pattern tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternWeights {
    pub whole_full_name: f64,
    pub first_word_full_name: f64,
    pub whole_relation_name: f64,
    pub first_word_relation_name: f64,
    pub word_full_name: f64,
    pub word_relation_name: f64,
    pub word_decay: f64,
}

impl Default for PatternWeights {
    fn default() -> Self {
        Self {
            whole_full_name: 10.0,
            first_word_full_name: 8.0,
            whole_relation_name: 7.0,
            first_word_relation_name: 6.0,
            word_full_name: 5.0,
            word_relation_name: 4.0,
            word_decay: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WardSettings {
    pub valid: Vec<u32>,
    /// Named groups of wards served together, keyed by canonical set name.
    pub sets: BTreeMap<String, Vec<u32>>,
}

pub const DEFAULT_WARDS: [u32; 8] = [140, 141, 143, 144, 145, 146, 147, 148];

impl Default for WardSettings {
    fn default() -> Self {
        let mut sets = BTreeMap::new();
        sets.insert("165".to_string(), vec![165]);
        sets.insert("168".to_string(), vec![168]);
        sets.insert("170".to_string(), vec![170]);
        sets.insert("multiple".to_string(), DEFAULT_WARDS.to_vec());
        Self { valid: DEFAULT_WARDS.to_vec(), sets }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Text }
    }
}
