use crate::classifier::{self, Classified};
use crate::error::{IngestError, SoftError};
use crate::lifecycle::{IngestContext, MatchLifecycleTracker};
use crate::store::Store;

pub const MAX_PLAYERS_PER_MATCH: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    /// Matches with more distinct players than this are closed as invalid.
    pub max_players_per_match: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_players_per_match: MAX_PLAYERS_PER_MATCH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// Non-blank lines seen, recognised or not.
    pub processed: usize,
    /// `None` instead of an empty list.
    pub errors: Option<Vec<SoftError>>,
}

impl IngestReport {
    pub fn messages(&self) -> Option<Vec<String>> {
        self.errors
            .as_ref()
            .map(|errors| errors.iter().map(|e| e.to_string()).collect())
    }
}

impl From<IngestReport> for common::UploadResult {
    fn from(report: IngestReport) -> Self {
        Self {
            processed: report.processed,
            errors: report.messages(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogIngestionEngine {
    config: IngestConfig,
}

impl LogIngestionEngine {
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Processes a whole document against `store`.
    ///
    /// Records are written as lines are processed, so callers wanting
    /// all-or-nothing behaviour run this inside a transaction and roll back
    /// on `Err`. [`IngestError::AlreadyProcessed`] is only reported once the
    /// whole document has been read.
    #[tracing::instrument(name = "Ingest", skip(self, store, content), fields(bytes = content.len()))]
    pub fn ingest<S>(&self, store: &mut S, content: &str) -> Result<IngestReport, IngestError>
    where
        S: Store + ?Sized,
    {
        if content.trim().is_empty() {
            return Err(IngestError::EmptyContent);
        }

        let tracker = MatchLifecycleTracker::new(self.config.max_players_per_match);
        let mut ctx = IngestContext::new();
        let mut processed = 0;

        for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            processed += 1;

            match classifier::classify(line) {
                Classified::Ignored => {
                    tracing::debug!(line, "Ignoring line without timestamp");
                }
                Classified::Event { timestamp, event } => {
                    tracing::trace!(?timestamp, ?event, "Classified line");
                    tracker.apply(store, &mut ctx, line, timestamp, event)?;
                }
            };
        }

        if processed == 0 {
            return Err(IngestError::NoValidLines);
        }

        if !ctx.already_processed.is_empty() {
            return Err(IngestError::AlreadyProcessed(ctx.already_processed));
        }

        if let Some(open) = ctx.active_match() {
            tracing::info!(match_id = %open.external_id, "Document ended with an open match");
        }

        tracing::info!(processed, soft_errors = ctx.soft_errors.len(), "Ingested document");

        Ok(IngestReport {
            processed,
            errors: if ctx.soft_errors.is_empty() {
                None
            } else {
                Some(ctx.soft_errors)
            },
        })
    }
}
