//! Collection Pipeline
//!
//! One collection cycle runs the external `pgbackrest` tool, classifies the
//! process result, decodes the JSON payload, applies stanza filtering and
//! republishes the metric set. Every abort path is contained within the
//! cycle and surfaced through a single structured log line; previously
//! published values stay untouched on failure.
//!
//! # Architecture
//!
//! - [`CommandExecutor`]: capability to run the tool, replaceable in tests
//! - [`Classification`]: hard failure / success with warning / clean success
//! - [`StanzaSelection`]: include/exclude filtering with conflict detection
//! - [`BackrestCollector`]: composes the stages into one cycle

mod backrest;
mod command;
mod filter;
mod info;

pub use backrest::{BackrestCollector, CollectOutcome};
pub use command::{Classification, CommandExecutor, PgBackRestExecutor, ProcessOutput, classify};
pub use filter::{StanzaRequest, StanzaSelection};
pub use info::{
    ArchiveInfo, BackupInfo, BackupSize, DbInfo, DbRef, ParsedPayload, RepoInfo, StanzaInfo,
    StanzaStatus, TimeBounds, WalBounds, parse_payload,
};

use thiserror::Error;

/// Errors that abort a collection cycle.
///
/// All variants are contained within one cycle; the scrape handler logs and
/// drops them, so they never crash the process and never leave the metric
/// set partially updated.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// The tool could not be spawned at all.
    #[error("failed to spawn pgbackrest: {0}")]
    Spawn(#[from] std::io::Error),

    /// The tool ran and reported a non-zero exit status.
    #[error("{status}: {stderr}")]
    Exec { status: String, stderr: String },

    /// The payload did not decode as a stanza array.
    #[error("json decode error: {0}")]
    Parse(#[from] serde_json::Error),
}
