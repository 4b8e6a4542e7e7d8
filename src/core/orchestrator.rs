//! Transfer orchestration
//!
//! This module provides `TransferOrchestrator`, which drives one transfer
//! through the account ledger and the event store:
//!
//! ```text
//! RECEIVED -> ACCOUNTS_FETCHED -> VALIDATED -> MUTATED -> COMMITTED
//!                                                          ├── EVENT_RECORDED
//!                                                          └── EVENT_RECORD_FAILED
//! ```
//!
//! Any abort before `COMMITTED` is reported to the caller as a failure. From
//! `COMMITTED` on, the caller is told the transfer succeeded; the event
//! states are only visible in logs.
//!
//! # Failure policy
//!
//! - Fetch error: one `LEDGER_UNAVAILABLE`
//! - Validation failures: returned as-is, nothing written
//! - Write error or rejection: one `LEDGER_WRITE_FAILED`
//! - Anything unexpected before the commit: one `INTERNAL_ERROR`, full error
//!   logged
//! - Event record error, timeout or panic: logged on the reconciliation
//!   target with the full payload, outcome untouched
//!
//! Nothing is retried here. Retrying is the caller's call.
//!
//! # Concurrency
//!
//! The orchestrator holds no account state and takes no locks; correctness
//! of concurrent transfers comes from the ledger's conditional write. From
//! the ledger write onwards, the work runs on its own tokio task: dropping
//! the caller's future cannot abandon a write that may commit.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use super::mutator;
use super::traits::{AccountLedger, TransferEventStore};
use super::validator::{self, find_account};
use crate::types::{
    Account, BalanceUpdate, EventStoreError, FailureReason, LedgerError, TransferError,
    TransferEventDraft, TransferOutcome, TransferRequest, WriteOutcome,
};

/// Tracing target for events that must be reconciled by hand
pub const RECONCILIATION_TARGET: &str = "transfer_orchestrator::reconciliation";

/// Default bound on one event record call
pub const DEFAULT_EVENT_TIMEOUT: Duration = Duration::from_secs(2);

/// Default bound on the account fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Orchestrator settings
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Upper bound on one event record attempt
    pub event_timeout: Duration,

    /// Upper bound on the account fetch
    ///
    /// There is deliberately no write timeout: a write that has been issued
    /// is always awaited to completion.
    pub fetch_timeout: Duration,

    /// Record events on a detached task instead of before returning
    ///
    /// Detached recordings are tracked; call [`TransferOrchestrator::drain`]
    /// before shutdown.
    pub detach_event_recording: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            event_timeout: DEFAULT_EVENT_TIMEOUT,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            detach_event_recording: false,
        }
    }
}

/// Lifecycle of a single transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStage {
    Received,
    AccountsFetched,
    Validated,
    Mutated,
    Committed,
    EventRecorded,
    EventRecordFailed,
}

impl TransferStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStage::Received => "RECEIVED",
            TransferStage::AccountsFetched => "ACCOUNTS_FETCHED",
            TransferStage::Validated => "VALIDATED",
            TransferStage::Mutated => "MUTATED",
            TransferStage::Committed => "COMMITTED",
            TransferStage::EventRecorded => "EVENT_RECORDED",
            TransferStage::EventRecordFailed => "EVENT_RECORD_FAILED",
        }
    }

    /// Whether the balance mutation has taken effect
    pub fn is_committed(&self) -> bool {
        matches!(
            self,
            TransferStage::Committed
                | TransferStage::EventRecorded
                | TransferStage::EventRecordFailed
        )
    }
}

impl fmt::Display for TransferStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stateless transfer coordinator over an account ledger and an event store
///
/// Cloning is cheap and clones share the same collaborators, so one
/// orchestrator can be handed to any number of concurrent tasks.
#[derive(Clone)]
pub struct TransferOrchestrator {
    ledger: Arc<dyn AccountLedger>,
    events: Arc<dyn TransferEventStore>,
    config: OrchestratorConfig,
    recordings: TaskTracker,
}

impl fmt::Debug for TransferOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferOrchestrator")
            .field("config", &self.config)
            .field("pending_recordings", &self.recordings.len())
            .finish_non_exhaustive()
    }
}

impl TransferOrchestrator {
    pub fn new(
        ledger: Arc<dyn AccountLedger>,
        events: Arc<dyn TransferEventStore>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            ledger,
            events,
            config,
            recordings: TaskTracker::new(),
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Execute one transfer and report the caller-visible outcome
    pub async fn transfer(&self, request: TransferRequest) -> TransferOutcome {
        self.execute(request).await.0
    }

    /// Wait for every detached event recording to finish
    pub async fn drain(&self) {
        self.recordings.close();
        self.recordings.wait().await;
        self.recordings.reopen();
    }

    /// Execute one transfer, also reporting the last stage reached
    pub(crate) async fn execute(&self, request: TransferRequest) -> (TransferOutcome, TransferStage) {
        debug!(
            stage = %TransferStage::Received,
            source = %request.source_account_id,
            destination = %request.dest_account_id,
            amount = %request.amount,
            "Transfer received"
        );

        let accounts = match self.fetch_accounts(&request).await {
            Ok(accounts) => accounts,
            Err(e) => {
                error!(request = %request, error = %e, "Account fetch failed");
                let outcome =
                    TransferOutcome::failure(&request, vec![FailureReason::LedgerUnavailable]);
                return (outcome, TransferStage::Received);
            }
        };
        debug!(stage = %TransferStage::AccountsFetched, fetched = accounts.len());

        let failures = validator::validate(&request, &accounts);
        if !failures.is_empty() {
            let codes: Vec<&str> = failures.iter().map(|f| f.code()).collect();
            info!(request = %request, failures = ?codes, "Transfer rejected by validation");
            let reasons = failures.into_iter().map(FailureReason::from).collect();
            return (
                TransferOutcome::failure(&request, reasons),
                TransferStage::AccountsFetched,
            );
        }
        debug!(stage = %TransferStage::Validated);

        let updates = match prepare_updates(&request, &accounts) {
            Ok(updates) => updates,
            Err(e) => {
                error!(request = %request, error = %e, "Balance mutation failed");
                let outcome =
                    TransferOutcome::failure(&request, vec![FailureReason::InternalError]);
                return (outcome, TransferStage::Validated);
            }
        };
        debug!(stage = %TransferStage::Mutated);

        // Past this point the write is issued on its own task and always
        // runs to completion, even if this future is dropped.
        let this = self.clone();
        let committed_request = request.clone();
        let commit = tokio::spawn(async move { this.commit(committed_request, updates).await });

        match commit.await {
            Ok(result) => result,
            Err(e) => {
                error!(request = %request, error = %e, "Commit task failed");
                let outcome =
                    TransferOutcome::failure(&request, vec![FailureReason::InternalError]);
                (outcome, TransferStage::Mutated)
            }
        }
    }

    async fn fetch_accounts(&self, request: &TransferRequest) -> Result<Vec<Account>, LedgerError> {
        let ids = request.account_ids();
        match tokio::time::timeout(self.config.fetch_timeout, self.ledger.fetch_accounts(&ids))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(LedgerError::timeout(
                "fetch_accounts",
                self.config.fetch_timeout.as_millis() as u64,
            )),
        }
    }

    async fn commit(
        &self,
        request: TransferRequest,
        updates: Vec<BalanceUpdate>,
    ) -> (TransferOutcome, TransferStage) {
        match self.ledger.write_accounts(&updates).await {
            Ok(WriteOutcome::Applied) => {}
            Ok(WriteOutcome::Rejected(failures)) => {
                let codes: Vec<String> = failures.iter().map(|f| f.to_string()).collect();
                warn!(request = %request, failures = ?codes, "Ledger rejected balance write");
                let outcome =
                    TransferOutcome::failure(&request, vec![FailureReason::LedgerWriteFailed]);
                return (outcome, TransferStage::Mutated);
            }
            Err(e) => {
                error!(request = %request, error = %e, "Balance write failed");
                let outcome =
                    TransferOutcome::failure(&request, vec![FailureReason::LedgerWriteFailed]);
                return (outcome, TransferStage::Mutated);
            }
        }

        // Point of no return
        let outcome = TransferOutcome::success(&request);
        info!(stage = %TransferStage::Committed, request = %request, "Transfer committed");

        let draft = TransferEventDraft::from(&request);
        if self.config.detach_event_recording {
            let this = self.clone();
            self.recordings.spawn(async move {
                this.record_event_isolated(draft).await;
            });
            return (outcome, TransferStage::Committed);
        }

        let stage = self.record_event_isolated(draft).await;
        (outcome, stage)
    }

    /// Run the event record attempt on its own task
    ///
    /// A panicking event store client ends up on the reconciliation log like
    /// any other recording failure and never reaches the committed outcome.
    async fn record_event_isolated(&self, draft: TransferEventDraft) -> TransferStage {
        let this = self.clone();
        let attempt = draft.clone();
        match tokio::spawn(async move { this.record_event(attempt).await }).await {
            Ok(stage) => stage,
            Err(e) => {
                let error = EventStoreError::Aborted {
                    message: e.to_string(),
                };
                log_unrecorded_event(&draft, &error);
                TransferStage::EventRecordFailed
            }
        }
    }

    /// Single bounded attempt to record the event of a committed transfer
    async fn record_event(&self, draft: TransferEventDraft) -> TransferStage {
        let timeout = self.config.event_timeout;
        let result = match tokio::time::timeout(timeout, self.events.record_event(&draft)).await {
            Ok(result) => result,
            Err(_) => Err(EventStoreError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            }),
        };

        match result {
            Ok(event_id) => {
                debug!(stage = %TransferStage::EventRecorded, event_id = %event_id);
                TransferStage::EventRecorded
            }
            Err(e) => {
                log_unrecorded_event(&draft, &e);
                TransferStage::EventRecordFailed
            }
        }
    }
}

/// Build the conditional batch write for a validated request
fn prepare_updates(
    request: &TransferRequest,
    accounts: &[Account],
) -> Result<Vec<BalanceUpdate>, TransferError> {
    let source = find_account(accounts, &request.source_account_id).ok_or_else(|| {
        TransferError::inconsistent_state("validated source account missing from fetch")
    })?;
    let dest = find_account(accounts, &request.dest_account_id).ok_or_else(|| {
        TransferError::inconsistent_state("validated destination account missing from fetch")
    })?;

    let (new_source, new_dest) = mutator::apply(request, source, dest)?;

    Ok(vec![
        BalanceUpdate::from_account(source, new_source),
        BalanceUpdate::from_account(dest, new_dest),
    ])
}

/// Emit the reconciliation record for an event that was not stored
fn log_unrecorded_event(draft: &TransferEventDraft, error: &EventStoreError) {
    let payload = serde_json::to_string(draft).unwrap_or_else(|_| format!("{:?}", draft));
    error!(
        target: RECONCILIATION_TARGET,
        stage = %TransferStage::EventRecordFailed,
        source = %draft.source_account_id,
        destination = %draft.dest_account_id,
        amount = %draft.amount,
        payload = %payload,
        error = %error,
        "Transfer committed but event not recorded"
    );
}
