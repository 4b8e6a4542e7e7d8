//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account snapshots and balance write entries
//! - `transfer`: Transfer requests, events, outcomes and failure codes
//! - `error`: Error types for the ledger, event store and pipeline

pub mod account;
pub mod error;
pub mod transfer;

pub use account::{Account, AccountId, BalanceUpdate, WriteFailure, WriteOutcome};
pub use error::{EventStoreError, LedgerError, TransferError};
pub use transfer::{
    EventId, FailureReason, TransferEvent, TransferEventDraft, TransferOutcome, TransferRequest,
    ValidationFailure,
};
