use crate::store::StoreError;

/// Failures that reject a whole document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    #[error("the document is empty")]
    EmptyContent,
    #[error("the document contains no log lines")]
    NoValidLines,
    #[error("log contains already processed matches: {}", .0.join(", "))]
    AlreadyProcessed(Vec<String>),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Problems with single lines or matches, ingestion carries on after these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SoftError {
    #[error("Unknown event format: {line}")]
    UnknownEventFormat { line: String },
    #[error("Match {match_id} exceeded player limit: {players} players (max {max})")]
    PlayerLimitExceeded {
        match_id: String,
        players: usize,
        max: usize,
    },
}
