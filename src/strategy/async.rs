//! Asynchronous batch processing strategy
//!
//! Processes transfers in batches on a multi-threaded tokio runtime.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent)
//!     ├── AsyncReader (batch CSV reading)
//!     ├── lanes::partition_into_lanes (account-conflict partitioning)
//!     └── TransferOrchestrator (one clone per lane task)
//! ```
//!
//! # Parallelism
//!
//! - Batches are processed sequentially, so a request never overtakes an
//!   earlier request from a previous batch
//! - Within a batch, each lane runs on its own task; lanes touch disjoint
//!   accounts, so concurrent lanes never conflict at the ledger
//! - Within a lane, requests run in file order
//!
//! Outcomes are reassembled into file order before being reported.

use crate::core::TransferOrchestrator;
use crate::io::async_reader::AsyncReader;
use crate::strategy::lanes::partition_into_lanes;
use crate::strategy::{ProcessingStrategy, RunReport, TransferPipeline};
use crate::types::{FailureReason, TransferError, TransferOutcome, TransferRequest};
use std::path::Path;
use tracing::{debug, error, warn};

/// Configuration for batch processing
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of transfer requests per batch
    pub batch_size: usize,
    /// Number of runtime worker threads driving lanes
    pub max_concurrent: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// Zero values fall back to the defaults with a warning.
    pub fn new(batch_size: usize, max_concurrent: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                batch_size,
                default = default.batch_size,
                "Invalid batch_size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent = if max_concurrent == 0 {
            warn!(
                max_concurrent,
                default = default.max_concurrent,
                "Invalid max_concurrent, using default"
            );
            default.max_concurrent
        } else {
            max_concurrent
        };

        Self {
            batch_size,
            max_concurrent,
        }
    }
}

/// Asynchronous batch processing strategy
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }
}

/// Run one batch, lanes concurrently, and return outcomes in batch order
pub(crate) async fn process_batch(
    orchestrator: &TransferOrchestrator,
    batch: Vec<TransferRequest>,
) -> Vec<TransferOutcome> {
    let lanes = partition_into_lanes(&batch);
    debug!(requests = batch.len(), lanes = lanes.len(), "Processing batch");

    let mut tasks = Vec::with_capacity(lanes.len());
    for lane in &lanes {
        let orchestrator = orchestrator.clone();
        let requests: Vec<(usize, TransferRequest)> =
            lane.iter().map(|&index| (index, batch[index].clone())).collect();

        tasks.push(tokio::spawn(async move {
            let mut results = Vec::with_capacity(requests.len());
            for (index, request) in requests {
                results.push((index, orchestrator.transfer(request).await));
            }
            results
        }));
    }

    let mut outcomes: Vec<Option<TransferOutcome>> = vec![None; batch.len()];
    for (lane, task) in lanes.iter().zip(tasks) {
        match task.await {
            Ok(results) => {
                for (index, outcome) in results {
                    outcomes[index] = Some(outcome);
                }
            }
            Err(e) => error!(error = %e, lane_size = lane.len(), "Lane task failed"),
        }
    }

    // A lane that died leaves holes; those requests get an internal error
    outcomes
        .into_iter()
        .zip(batch.iter())
        .map(|(outcome, request)| {
            outcome.unwrap_or_else(|| {
                TransferOutcome::failure(request, vec![FailureReason::InternalError])
            })
        })
        .collect()
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    fn process(
        &self,
        input_path: &Path,
        pipeline: &TransferPipeline,
    ) -> Result<RunReport, TransferError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent)
            .enable_time()
            .build()
            .map_err(|e| TransferError::runtime(format!("Failed to create tokio runtime: {}", e)))?;

        runtime.block_on(async {
            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| match e.kind() {
                    std::io::ErrorKind::NotFound => TransferError::FileNotFound {
                        path: input_path.display().to_string(),
                    },
                    _ => TransferError::IoError {
                        message: format!(
                            "Failed to open file '{}': {}",
                            input_path.display(),
                            e
                        ),
                    },
                })?;

            // Wrap tokio file in a compatibility layer for csv-async
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            let orchestrator = pipeline.orchestrator();
            let mut outcomes = Vec::new();

            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                // Wait for the whole batch before reading the next one
                outcomes.extend(process_batch(&orchestrator, batch).await);
            }

            pipeline.finish(&orchestrator, outcomes).await
        })
    }
}
