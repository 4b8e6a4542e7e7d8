//! Error types for the transfer orchestrator
//!
//! This module defines the errors raised at the two collaborator boundaries
//! and by the surrounding CSV pipeline. None of these reach a transfer caller
//! directly: the orchestrator maps them onto failure reason codes.
//!
//! # Error Categories
//!
//! - **Ledger Errors**: the account ledger could not be reached or could not
//!   evaluate a request
//! - **Event Store Errors**: the event store could not record an event
//! - **Pipeline Errors**: file I/O, CSV parsing, seed data and arithmetic

use rust_decimal::Decimal;
use thiserror::Error;

/// Failure of an account ledger call
///
/// Any of these means the call produced no result. A write that returns one
/// of these errors may still have been applied by a remote ledger; the
/// in-process ledger applies nothing when it errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// The ledger could not be reached
    #[error("Account ledger unavailable: {message}")]
    Unavailable {
        /// Description of the transport or service failure
        message: String,
    },

    /// The call did not complete in time
    #[error("Account ledger {operation} timed out after {timeout_ms}ms")]
    Timeout {
        /// Operation that timed out
        operation: String,
        /// Configured timeout in milliseconds
        timeout_ms: u64,
    },

    /// A row lock was poisoned by a panicking writer
    #[error("Account {account_id} is unavailable: row lock poisoned")]
    LockPoisoned {
        /// Account whose row lock is poisoned
        account_id: String,
    },
}

impl LedgerError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        LedgerError::Unavailable {
            message: message.into(),
        }
    }

    pub fn timeout(operation: &str, timeout_ms: u64) -> Self {
        LedgerError::Timeout {
            operation: operation.to_string(),
            timeout_ms,
        }
    }

    pub fn lock_poisoned(account_id: &str) -> Self {
        LedgerError::LockPoisoned {
            account_id: account_id.to_string(),
        }
    }
}

/// Failure of a transfer event store call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EventStoreError {
    /// The event store could not be reached
    #[error("Event store unavailable: {message}")]
    Unavailable {
        /// Description of the transport or service failure
        message: String,
    },

    /// The event store refused the event
    #[error("Event store rejected event: {reason}")]
    Rejected {
        /// Reason given by the store
        reason: String,
    },

    /// The call did not complete in time
    #[error("Event store call timed out after {timeout_ms}ms")]
    Timeout {
        /// Configured timeout in milliseconds
        timeout_ms: u64,
    },

    /// The call died without returning, e.g. the client panicked
    #[error("Event store call aborted: {message}")]
    Aborted {
        /// What ended the call
        message: String,
    },
}

impl EventStoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        EventStoreError::Unavailable {
            message: message.into(),
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        EventStoreError::Rejected {
            reason: reason.into(),
        }
    }
}

/// Main error type for the transfer pipeline
///
/// Covers everything outside a single transfer's outcome: loading seed
/// accounts, reading transfer requests, writing reports, and the
/// unexpected conditions the orchestrator folds into `INTERNAL_ERROR`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransferError {
    /// File not found at the specified path
    ///
    /// This is a fatal error that prevents processing from starting.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    ///
    /// Recoverable for transfer files (the record is skipped), fatal for
    /// the accounts seed file.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// Amount field could not be parsed as an exact decimal
    #[error("Invalid amount '{amount}'{}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    InvalidAmount {
        /// The invalid amount string
        amount: String,
        /// Line number (if available)
        line: Option<u64>,
    },

    /// An account id was listed twice in the seed file
    #[error("Duplicate account '{account_id}' in accounts file")]
    DuplicateAccount {
        /// The duplicated account id
        account_id: String,
    },

    /// A seeded balance was negative
    #[error("Account '{account_id}' has negative opening balance {balance}")]
    NegativeOpeningBalance {
        /// The account id
        account_id: String,
        /// The rejected balance
        balance: Decimal,
    },

    /// Arithmetic overflow would occur
    #[error("Arithmetic overflow in {operation} for account {account_id}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account affected
        account_id: String,
    },

    /// Data the orchestrator relies on contradicted an earlier check
    #[error("Inconsistent state: {message}")]
    InconsistentState {
        /// What was inconsistent
        message: String,
    },

    /// The async runtime could not be created or a task failed
    #[error("Runtime error: {message}")]
    Runtime {
        /// Description of the runtime failure
        message: String,
    },

    /// Account ledger failure outside a transfer
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Event store failure outside a transfer
    #[error(transparent)]
    EventStore(#[from] EventStoreError),
}

impl From<std::io::Error> for TransferError {
    fn from(error: std::io::Error) -> Self {
        TransferError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for TransferError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        TransferError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

impl TransferError {
    pub fn arithmetic_overflow(operation: &str, account_id: &str) -> Self {
        TransferError::ArithmeticOverflow {
            operation: operation.to_string(),
            account_id: account_id.to_string(),
        }
    }

    pub fn invalid_amount(amount: &str, line: Option<u64>) -> Self {
        TransferError::InvalidAmount {
            amount: amount.to_string(),
            line,
        }
    }

    pub fn duplicate_account(account_id: &str) -> Self {
        TransferError::DuplicateAccount {
            account_id: account_id.to_string(),
        }
    }

    pub fn inconsistent_state(message: impl Into<String>) -> Self {
        TransferError::InconsistentState {
            message: message.into(),
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        TransferError::Runtime {
            message: message.into(),
        }
    }
}
