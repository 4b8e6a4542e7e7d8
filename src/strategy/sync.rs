//! Sequential processing strategy
//!
//! Runs transfers one at a time in file order on a single-threaded tokio
//! runtime. Requests are streamed through `SyncReader`, so memory stays
//! proportional to the number of outcomes, not the file size.

use crate::io::sync_reader::SyncReader;
use crate::strategy::{ProcessingStrategy, RunReport, TransferPipeline};
use crate::types::TransferError;
use std::path::Path;
use tracing::warn;

/// Sequential processing strategy
///
/// # Examples
///
/// ```no_run
/// use rust_transfer_orchestrator::core::OrchestratorConfig;
/// use rust_transfer_orchestrator::ledger::{InMemoryAccountLedger, InMemoryEventStore};
/// use rust_transfer_orchestrator::strategy::{
///     ProcessingStrategy, SyncProcessingStrategy, TransferPipeline,
/// };
/// use std::path::Path;
/// use std::sync::Arc;
///
/// let pipeline = TransferPipeline::new(
///     Arc::new(InMemoryAccountLedger::new()),
///     Arc::new(InMemoryEventStore::new()),
///     OrchestratorConfig::default(),
/// );
/// let report = SyncProcessingStrategy
///     .process(Path::new("transfers.csv"), &pipeline)
///     .expect("Processing failed");
/// println!("{} transfers succeeded", report.succeeded());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(
        &self,
        input_path: &Path,
        pipeline: &TransferPipeline,
    ) -> Result<RunReport, TransferError> {
        let reader = SyncReader::new(input_path)?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| TransferError::runtime(format!("Failed to create tokio runtime: {}", e)))?;

        runtime.block_on(async {
            let orchestrator = pipeline.orchestrator();
            let mut outcomes = Vec::new();

            for result in reader {
                match result {
                    Ok(request) => outcomes.push(orchestrator.transfer(request).await),
                    Err(e) => warn!(error = %e, "Skipping transfer record"),
                }
            }

            pipeline.finish(&orchestrator, outcomes).await
        })
    }
}
