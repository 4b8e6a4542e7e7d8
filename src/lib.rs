//! Transfer Orchestrator Library
//!
//! # Overview
//!
//! Moves funds between two accounts held by an account ledger, and records
//! each committed transfer in an append-only event store. Each transfer is
//! fetched, validated, mutated, written atomically and then recorded:
//!
//! - Validation reports every failed business rule at once, in a fixed order
//! - The balance write is a conditional batch write; the ledger re-checks
//!   funds and rejects stale balances, so concurrent transfers never
//!   overdraw or lose an update
//! - Event recording is best-effort: once the write has committed, the
//!   caller is told the transfer succeeded, and a failed recording is only
//!   logged for reconciliation
//!
//! # Architecture
//!
//! - [`types`] - Accounts, requests, outcomes, failure codes and errors
//! - [`core`] - Business logic components:
//!   - [`core::traits`] - Account ledger and event store contracts
//!   - [`core::validator`] - Ordered business-rule checks
//!   - [`core::mutator`] - Exact decimal debit and credit
//!   - [`core::orchestrator`] - The transfer state machine
//! - [`ledger`] - In-process ledger and event store
//! - [`io`] - CSV input and report output
//! - [`strategy`] - Sequential and concurrent batch pipelines
//! - [`cli`] - CLI arguments parsing
//! - [`logging`] - Tracing subscriber setup
//!
//! # Failure Codes
//!
//! | Code | Raised when |
//! | --- | --- |
//! | `SOURCE_DEST_SAME` | source and destination are the same account |
//! | `ACCOUNT_LOOKUP_INCOMPLETE` | the ledger did not return exactly the two accounts |
//! | `UNKNOWN_SOURCE` | source account does not exist |
//! | `UNKNOWN_DESTINATION` | destination account does not exist |
//! | `NON_POSITIVE_AMOUNT` | amount is zero or negative |
//! | `INSUFFICIENT_FUNDS` | source balance is below the amount |
//! | `LEDGER_UNAVAILABLE` | accounts could not be fetched |
//! | `LEDGER_WRITE_FAILED` | the balance write errored or was rejected |
//! | `INTERNAL_ERROR` | anything unexpected |

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod ledger;
pub mod logging;
pub mod strategy;
pub mod types;

pub use core::{AccountLedger, OrchestratorConfig, TransferEventStore, TransferOrchestrator};
pub use ledger::{InMemoryAccountLedger, InMemoryEventStore};
pub use types::{
    Account, AccountId, FailureReason, TransferError, TransferEvent, TransferOutcome,
    TransferRequest, ValidationFailure,
};
