use tracing::{debug, instrument, warn};

use voterdb_core::config::SearchSettings;
use voterdb_core::error::{Error, Result};
use voterdb_core::types::{SearchMethod, SearchRequest, VoterDetails, VoterRecord, Ward};

use crate::lookup;
use crate::query::SearchQuery;
use crate::rank;
use crate::store::VoterStore;
use crate::tier::{Capabilities, Tier};

/// Why a tier produced no answer.
#[derive(Debug)]
pub enum AttemptError {
    /// The datastore lacks what the tier needs; try the next one.
    Unsupported,
    /// The tier's query failed; try the next one.
    Recoverable(Error),
    /// The datastore is gone; stop.
    Fatal(Error),
}

impl From<Error> for AttemptError {
    fn from(err: Error) -> Self {
        if err.is_connectivity() {
            AttemptError::Fatal(err)
        } else {
            AttemptError::Recoverable(err)
        }
    }
}

/// Ward-scoped voter search over any [`VoterStore`].
///
/// Name searches walk [`Tier::ALL`] until one tier answers. Tier failures are
/// logged and absorbed; only connectivity errors reach the caller.
pub struct FuzzyVoterSearch<S> {
    store: S,
    settings: SearchSettings,
}

impl<S: VoterStore> FuzzyVoterSearch<S> {
    pub fn new(store: S, settings: SearchSettings) -> Self {
        Self { store, settings }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    #[instrument(skip(self, request), fields(method = ?request.method, ward = %request.ward))]
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<VoterRecord>> {
        match request.method {
            SearchMethod::Name => self.search_by_name(&request.query, request.ward).await,
            SearchMethod::Epic => self.search_by_epic(&request.query, request.ward, self.settings.limit).await,
            SearchMethod::Booth => self.search_by_booth(&request.query, request.ward).await,
            SearchMethod::House => self.search_by_house(&request.query, request.ward).await,
        }
    }

    /// Ranked, de-duplicated name matches; at most `settings.limit` rows.
    #[instrument(skip(self))]
    pub async fn search_by_name(&self, text: &str, ward: Ward) -> Result<Vec<VoterRecord>> {
        let Some(query) = SearchQuery::new(text, ward) else {
            return Ok(Vec::new());
        };
        let caps = self.capabilities().await?;

        let mut last_error = None;
        for tier in Tier::ALL {
            match self.attempt(tier, &query, caps).await {
                Ok(records) => {
                    debug!(%tier, words = query.word_count(), matches = records.len(), "name search answered");
                    return Ok(records);
                }
                Err(AttemptError::Unsupported) => {}
                Err(AttemptError::Recoverable(err)) => {
                    warn!(%tier, error = %err, "search tier failed, falling back");
                    last_error = Some(err);
                }
                Err(AttemptError::Fatal(err)) => return Err(err),
            }
        }
        Err(last_error.unwrap_or_else(|| Error::Operation("no search tier applies".to_string())))
    }

    /// Runs a single tier.
    pub async fn attempt(
        &self,
        tier: Tier,
        query: &SearchQuery,
        caps: Capabilities,
    ) -> std::result::Result<Vec<VoterRecord>, AttemptError> {
        if !tier.applies(caps) {
            return Err(AttemptError::Unsupported);
        }
        let plan = tier.plan(query, &self.settings);
        let candidates = self.store.fetch(&plan).await?;
        Ok(tier.finalize(&self.settings, candidates))
    }

    /// Probes the datastore. A probe that fails for any reason other than
    /// connectivity leaves only the substring tier.
    pub async fn capabilities(&self) -> Result<Capabilities> {
        match self.store.has_trigram_support().await {
            Ok(available) => {
                debug!(trigram = available, "datastore capabilities");
                Ok(Capabilities::with_trigram(available))
            }
            Err(err) if err.is_connectivity() => Err(err),
            Err(err) => {
                warn!(error = %err, "trigram detection failed");
                Ok(Capabilities::unknown())
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn search_by_epic(&self, epic: &str, ward: Ward, limit: usize) -> Result<Vec<VoterRecord>> {
        if epic.trim().is_empty() {
            return Ok(Vec::new());
        }
        let plan = lookup::epic_plan(epic, ward, limit);
        let rows = self.store.fetch(&plan).await?;
        Ok(rank::finalize(rows, &plan.order, |_| true, plan.limit))
    }

    #[instrument(skip(self))]
    pub async fn search_by_booth(&self, part_no: &str, ward: Ward) -> Result<Vec<VoterRecord>> {
        if part_no.trim().is_empty() {
            return Ok(Vec::new());
        }
        let plan = lookup::booth_plan(part_no, ward, self.settings.limit);
        let rows = self.store.fetch(&plan).await?;
        Ok(rank::finalize(rows, &plan.order, |_| true, plan.limit))
    }

    #[instrument(skip(self))]
    pub async fn search_by_house(&self, house: &str, ward: Ward) -> Result<Vec<VoterRecord>> {
        if house.trim().is_empty() {
            return Ok(Vec::new());
        }
        let plan = lookup::house_plan(house, ward, self.settings.limit);
        let rows = self.store.fetch(&plan).await?;
        Ok(rank::finalize(rows, &plan.order, |_| true, plan.limit))
    }

    /// One voter by EPIC number with the polling station resolved.
    pub async fn voter_details(&self, epic: &str, ward: Ward) -> Result<Option<VoterDetails>> {
        let Some(record) = self.search_by_epic(epic, ward, 1).await?.into_iter().next() else {
            return Ok(None);
        };
        let station = match record.part_no.as_deref() {
            Some(part_no) => self.store.polling_station(part_no).await?,
            None => None,
        };
        Ok(Some(VoterDetails::resolve(record, ward, station)))
    }
}
