//! Collection cycle orchestration.
//!
//! Composes process execution, exit classification, payload decoding,
//! stanza filtering and metric publication into one cycle. The cycle is
//! strictly sequential; each stage may short-circuit it with a single
//! structured log line, leaving the metric set in its prior state.

use std::sync::Arc;

use crate::collector::command::{Classification, CommandExecutor, classify};
use crate::collector::filter::{StanzaRequest, StanzaSelection};
use crate::collector::info::{ParsedPayload, StanzaInfo, parse_payload};
use crate::collector::CollectorError;
use crate::config::BackrestConfig;
use crate::metrics::MetricSet;

/// Name of the external tool binary.
const PGBACKREST_COMMAND: &str = "pgbackrest";

/// Outcome of one collection cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectOutcome {
    /// The metric set was reset and repopulated for this many stanzas.
    Collected { stanzas: usize },
    /// The tool returned an empty result set; previous values persist.
    NoData,
    /// Conflict filtering removed every requested stanza; nothing was
    /// executed and the metric set is unchanged.
    SkippedAll,
}

/// Orchestrates collection cycles against an injected [`CommandExecutor`].
pub struct BackrestCollector {
    executor: Arc<dyn CommandExecutor>,
    metrics: Arc<MetricSet>,
    config: BackrestConfig,
}

impl BackrestCollector {
    pub fn new(
        executor: Arc<dyn CommandExecutor>,
        metrics: Arc<MetricSet>,
        config: BackrestConfig,
    ) -> Self {
        Self {
            executor,
            metrics,
            config,
        }
    }

    /// Run one collection cycle.
    ///
    /// Side effects are limited to logging and the metric set. The metric
    /// set is only touched after every requested invocation has executed
    /// and decoded cleanly, so an abort never leaves it partially updated.
    pub async fn collect(&self) -> Result<CollectOutcome, CollectorError> {
        let selection = StanzaSelection::resolve(
            &self.config.stanzas_include,
            &self.config.stanzas_exclude,
        );
        if selection.is_empty() {
            return Ok(CollectOutcome::SkippedAll);
        }

        let mut collected: Vec<StanzaInfo> = Vec::new();
        for request in selection.requests() {
            let args = self.info_args(request);
            let output = match self.executor.run(PGBACKREST_COMMAND, &args).await {
                Ok(output) => output,
                Err(err) => {
                    tracing::error!(err = %err, "data collection failed");
                    return Err(CollectorError::Spawn(err));
                }
            };

            let stdout = match classify(&output) {
                Classification::Clean => output.stdout,
                Classification::Warning(message) => {
                    tracing::info!(err = %message, "pgBackRest message");
                    output.stdout
                }
                Classification::Failure { status, stderr } => {
                    let detail = format!("{status}: {stderr}");
                    tracing::error!(err = %detail, "data collection failed");
                    return Err(CollectorError::Exec { status, stderr });
                }
            };

            match parse_payload(&stdout) {
                Ok(ParsedPayload::Stanzas(stanzas)) => collected.extend(stanzas),
                Ok(ParsedPayload::Empty) => {}
                Err(err) => {
                    tracing::error!(err = %err, "payload parse failed");
                    return Err(CollectorError::Parse(err));
                }
            }
        }

        if collected.is_empty() {
            tracing::info!("no backup data returned");
            return Ok(CollectOutcome::NoData);
        }

        let stanzas = self
            .metrics
            .update(&collected, &selection, self.config.verbose_wal);
        tracing::debug!(stanzas, "collection cycle complete");
        Ok(CollectOutcome::Collected { stanzas })
    }

    /// Arguments for one `info` invocation. Stable; asserted by tests
    /// through the executor double.
    fn info_args(&self, request: &StanzaRequest) -> Vec<String> {
        let mut args = vec!["info".to_string(), "--output=json".to_string()];
        if let Some(ref config) = self.config.config {
            args.push(format!("--config={config}"));
        }
        if let Some(ref include_path) = self.config.config_include_path {
            args.push(format!("--config-include-path={include_path}"));
        }
        if let StanzaRequest::Named(name) = request {
            args.push(format!("--stanza={name}"));
        }
        args
    }
}
