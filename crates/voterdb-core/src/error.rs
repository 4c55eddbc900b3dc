use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid ward number: {0}")]
    InvalidWard(String),

    #[error("Invalid search method '{0}'. Use 1 for name, 2 for EPIC or 3 for booth")]
    InvalidSearchMethod(String),

    #[error("Unbound query parameter: {0}")]
    UnboundParameter(String),

    /// The datastore rejected or failed a single statement. Search tiers
    /// recover from this by falling back to a simpler strategy.
    #[error("Query failed: {0}")]
    Query(String),

    /// The datastore itself is unreachable.
    #[error("Datastore connection failed: {0}")]
    Connection(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Error::Connection(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
