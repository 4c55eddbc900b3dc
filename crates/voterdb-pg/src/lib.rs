//! voterdb-pg
//!
//! [`VoterStore`] over the Postgres voter roll (`public."Voter"` joined to
//! `"PartNo"` for ward membership). Plans come pre-rendered from
//! voterdb-search; every parameter is bound as text and every column is
//! selected as text, so schema drift in column types does not break decoding.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::debug;

use voterdb_core::config::DatabaseSettings;
use voterdb_core::error::{Error, Result};
use voterdb_core::types::{parse_age, PollingStation, ScoredCandidate, VoterRecord, Ward};
use voterdb_search::params::ParamKey;
use voterdb_search::plan::SelectPlan;
use voterdb_search::VoterStore;

const TRIGRAM_PROBE: &str = "SELECT EXISTS(SELECT 1 FROM pg_extension WHERE extname = 'pg_trgm')";

const POLLING_STATION: &str = "\
SELECT booth_name::text AS booth_name, english_booth_address::text AS english_booth_address
FROM \"PartNo\"
WHERE part_no::text = $1
LIMIT 1";

#[derive(Clone, Debug, sqlx::FromRow)]
struct CandidateRow {
    epic_number: String,
    full_name: String,
    relation_name: Option<String>,
    relation_type: Option<String>,
    age: Option<String>,
    gender: Option<String>,
    part_no: Option<String>,
    sr_no: Option<String>,
    address: Option<String>,
    house_number: Option<String>,
    pincode: Option<String>,
    ac_no: Option<String>,
    match_score: Option<f64>,
    words_matched: Option<i64>,
}

impl CandidateRow {
    fn into_candidate(self, ward: Option<Ward>) -> ScoredCandidate {
        let record = VoterRecord {
            epic_number: self.epic_number,
            full_name: self.full_name,
            relation_name: self.relation_name,
            relation_type: self.relation_type,
            age: parse_age(self.age.as_deref()),
            gender: self.gender,
            ward_no: ward,
            part_no: self.part_no,
            sr_no: self.sr_no,
            address: self.address,
            house_number: self.house_number,
            pincode: self.pincode,
            ac_no: self.ac_no,
        };
        ScoredCandidate {
            record,
            match_score: self.match_score.unwrap_or(0.0),
            words_matched: self
                .words_matched
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0),
        }
    }
}

#[derive(Clone, Debug, sqlx::FromRow)]
struct StationRow {
    booth_name: Option<String>,
    english_booth_address: Option<String>,
}

#[derive(Clone)]
pub struct PgVoterStore {
    pool: PgPool,
}

impl PgVoterStore {
    /// Opens a pool against `settings.url`. With `lazy`, no connection is
    /// made until the first query.
    pub async fn connect(settings: &DatabaseSettings, lazy: bool) -> Result<Self> {
        let url = settings
            .url
            .as_deref()
            .ok_or_else(|| Error::InvalidConfig("database.url (or DATABASE_URL) is not set".to_string()))?;
        let options = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs));
        let pool = if lazy {
            options.connect_lazy(url).map_err(classify)?
        } else {
            options.connect(url).await.map_err(classify)?
        };
        debug!(max_connections = settings.max_connections, lazy, "postgres pool ready");
        Ok(Self { pool })
    }
}

impl VoterStore for PgVoterStore {
    async fn has_trigram_support(&self) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(TRIGRAM_PROBE)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
    }

    async fn fetch(&self, plan: &SelectPlan) -> Result<Vec<ScoredCandidate>> {
        let rendered = plan.to_sql()?;
        debug!(plan = plan.label, binds = rendered.binds.len(), limit = plan.limit, "running candidate query");

        let mut query = sqlx::query_as::<_, CandidateRow>(&rendered.sql);
        for value in &rendered.binds {
            query = query.bind(value.as_str());
        }
        let rows = query.fetch_all(&self.pool).await.map_err(classify)?;

        let ward = plan.params.get(ParamKey::Ward).ok().and_then(|w| w.parse::<Ward>().ok());
        Ok(rows.into_iter().map(|row| row.into_candidate(ward)).collect())
    }

    async fn polling_station(&self, part_no: &str) -> Result<Option<PollingStation>> {
        let row = sqlx::query_as::<_, StationRow>(POLLING_STATION)
            .bind(part_no)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)?;
        Ok(row.map(|r| PollingStation { booth_name: r.booth_name, english_booth_address: r.english_booth_address }))
    }
}

/// Separates "the database is unreachable" from "this statement failed".
/// Only the former stops a name search; the latter lets it fall back.
pub fn classify(err: sqlx::Error) -> Error {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => Error::Connection(err.to_string()),
        sqlx::Error::Configuration(_) => Error::InvalidConfig(err.to_string()),
        other => Error::Query(other.to_string()),
    }
}
