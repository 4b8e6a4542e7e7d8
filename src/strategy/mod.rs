//! Processing strategy module for transfer files
//!
//! This module defines the Strategy pattern for complete transfer processing
//! pipelines: reading requests from CSV, driving each through the
//! orchestrator, and collecting the final ledger and event store state. This
//! allows different processing implementations (sequential, concurrent
//! batch) to be selected at runtime.
//!
//! Both strategies produce the same balances and the same outcome for every
//! request; only the assignment order of event ids may differ.

use crate::cli::StrategyType;
use crate::core::{AccountLedger, OrchestratorConfig, TransferEventStore, TransferOrchestrator};
use crate::io::{write_balances_csv, write_events_csv, write_outcomes_csv};
use crate::types::{Account, TransferError, TransferEvent, TransferOutcome};
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub mod r#async;
pub mod lanes;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Collaborators and settings shared by every transfer of one run
#[derive(Clone)]
pub struct TransferPipeline {
    ledger: Arc<dyn AccountLedger>,
    events: Arc<dyn TransferEventStore>,
    config: OrchestratorConfig,
}

impl fmt::Debug for TransferPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TransferPipeline {
    pub fn new(
        ledger: Arc<dyn AccountLedger>,
        events: Arc<dyn TransferEventStore>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            ledger,
            events,
            config,
        }
    }

    /// Orchestrator over this pipeline's collaborators
    pub fn orchestrator(&self) -> TransferOrchestrator {
        TransferOrchestrator::new(
            Arc::clone(&self.ledger),
            Arc::clone(&self.events),
            self.config.clone(),
        )
    }

    /// Wait for outstanding event recordings, then snapshot both stores
    ///
    /// Must be called from inside the runtime the transfers ran on.
    pub(crate) async fn finish(
        &self,
        orchestrator: &TransferOrchestrator,
        outcomes: Vec<TransferOutcome>,
    ) -> Result<RunReport, TransferError> {
        orchestrator.drain().await;

        let accounts = self.ledger.list_accounts().await?;
        let events = self.events.list_events().await?;

        let report = RunReport {
            outcomes,
            accounts,
            events,
        };
        info!(
            requests = report.outcomes.len(),
            succeeded = report.succeeded(),
            failed = report.outcomes.len() - report.succeeded(),
            events = report.events.len(),
            "Transfer run complete"
        );
        Ok(report)
    }
}

/// Everything a run produced
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// One outcome per readable request, in file order
    pub outcomes: Vec<TransferOutcome>,

    /// Final ledger state
    pub accounts: Vec<Account>,

    /// Recorded events, in insertion order
    pub events: Vec<TransferEvent>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn write_balances(&self, output: &mut dyn Write) -> Result<(), TransferError> {
        write_balances_csv(&self.accounts, output)
    }

    pub fn write_outcomes(&self, output: &mut dyn Write) -> Result<(), TransferError> {
        write_outcomes_csv(&self.outcomes, output)
    }

    pub fn write_events(&self, output: &mut dyn Write) -> Result<(), TransferError> {
        write_events_csv(&self.events, output)
    }
}

/// Processing strategy trait for complete transfer pipelines
///
/// Each strategy reads transfer requests from a CSV file, runs every one
/// through an orchestrator built from `pipeline`, and reports the outcomes
/// together with the final state of both collaborators.
pub trait ProcessingStrategy: Send + Sync {
    /// Process the transfer file at `input_path`
    ///
    /// # Returns
    ///
    /// * `Ok(RunReport)` once every readable request has an outcome
    /// * `Err(TransferError)` if a fatal error occurred (file not found,
    ///   runtime creation, a collaborator failing to list its state)
    ///
    /// Unreadable rows are logged and skipped; they get no outcome.
    fn process(
        &self,
        input_path: &Path,
        pipeline: &TransferPipeline,
    ) -> Result<RunReport, TransferError>;
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `config` - Optional configuration for async batch processing (ignored for sync)
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config))
        }
    }
}
