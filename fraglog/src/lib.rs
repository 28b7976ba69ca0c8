//! Ingestion of game server kill logs and the statistics built on top.

pub mod classifier;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod resolver;
pub mod statistics;
pub mod store;

pub use engine::{IngestConfig, IngestReport, LogIngestionEngine, MAX_PLAYERS_PER_MATCH};
pub use error::{IngestError, SoftError};
pub use statistics::StatisticsAggregator;
pub use store::{MemoryStore, Store, StoreError};
