//! Account-related types for the transfer orchestrator
//!
//! This module defines the Account structure held by the account ledger and
//! the balance update entries submitted in a conditional batch write.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account identifier
///
/// Unique string key assigned by the account ledger.
pub type AccountId = String;

/// Account state as returned by the account ledger
///
/// The orchestrator only ever holds transient copies of this struct,
/// fetched per request. The ledger remains the system of record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// The account identifier
    pub id: AccountId,

    /// Current balance
    ///
    /// Exact decimal, never negative after a committed mutation.
    pub balance: Decimal,
}

impl Account {
    /// Create an account snapshot with the given balance
    pub fn new(id: impl Into<AccountId>, balance: Decimal) -> Self {
        Account {
            id: id.into(),
            balance,
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.id, self.balance)
    }
}

/// One entry of a conditional batch balance write
///
/// `expected_balance` is the balance the new value was computed from. The
/// ledger applies the entry only if the row still holds that balance when the
/// write lands, which turns the write into a read-modify-write that cannot
/// lose a concurrent update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceUpdate {
    /// Account to update
    pub account_id: AccountId,

    /// Balance observed when the new balance was computed
    pub expected_balance: Decimal,

    /// Balance to store
    pub new_balance: Decimal,
}

impl BalanceUpdate {
    /// Build the update that moves `account` to `new_balance`
    pub fn from_account(account: &Account, new_balance: Decimal) -> Self {
        BalanceUpdate {
            account_id: account.id.clone(),
            expected_balance: account.balance,
            new_balance,
        }
    }
}

/// Reason the ledger refused one entry of a batch write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteFailure {
    /// The row no longer holds the balance the update was computed from
    StaleBalance { account_id: AccountId },

    /// Applying the entry would leave the balance negative
    InsufficientFunds { account_id: AccountId },

    /// No such account
    UnknownAccount { account_id: AccountId },

    /// The same account appears more than once in one batch
    DuplicateEntry { account_id: AccountId },
}

impl WriteFailure {
    /// Stable wire code
    pub fn code(&self) -> &'static str {
        match self {
            WriteFailure::StaleBalance { .. } => "STALE_BALANCE",
            WriteFailure::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            WriteFailure::UnknownAccount { .. } => "UNKNOWN_ACCOUNT",
            WriteFailure::DuplicateEntry { .. } => "DUPLICATE_ENTRY",
        }
    }

    pub fn account_id(&self) -> &str {
        match self {
            WriteFailure::StaleBalance { account_id }
            | WriteFailure::InsufficientFunds { account_id }
            | WriteFailure::UnknownAccount { account_id }
            | WriteFailure::DuplicateEntry { account_id } => account_id,
        }
    }
}

impl fmt::Display for WriteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.account_id())
    }
}

/// Result of a batch write that reached the ledger
///
/// `Rejected` means the ledger evaluated the batch and applied none of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Applied,
    Rejected(Vec<WriteFailure>),
}

impl WriteOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, WriteOutcome::Applied)
    }
}
