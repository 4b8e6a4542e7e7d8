//! Boundary traits for the two remote collaborators
//!
//! The orchestrator is written only against these traits, so the same
//! orchestration runs over an in-process store, an RPC client or a queue.
//! Implementations must be `Send + Sync` so one orchestrator can serve any
//! number of concurrent transfers.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::types::{
    Account, AccountId, BalanceUpdate, EventId, EventStoreError, LedgerError, TransferEvent,
    TransferEventDraft, WriteOutcome,
};

/// System of record for account balances
///
/// # Consistency contract
///
/// - `fetch_accounts` reads at read-committed or stronger: it never returns a
///   balance from a write that has not committed.
/// - `write_accounts` is atomic across every entry of one call, and
///   re-validates each entry under its own isolation when it lands. An entry
///   whose `expected_balance` no longer matches, whose `new_balance` is
///   negative, or whose account does not exist rejects the whole batch.
#[async_trait]
pub trait AccountLedger: Send + Sync {
    /// Fetch the subset of `ids` that exist
    ///
    /// Missing ids are absent from the result, not an error.
    async fn fetch_accounts(&self, ids: &[AccountId]) -> Result<Vec<Account>, LedgerError>;

    /// Apply a batch of balance updates, all or nothing
    async fn write_accounts(&self, updates: &[BalanceUpdate]) -> Result<WriteOutcome, LedgerError>;

    /// Every account, ordered by id
    async fn list_accounts(&self) -> Result<Vec<Account>, LedgerError>;
}

/// Append-only log of committed transfers
#[async_trait]
pub trait TransferEventStore: Send + Sync {
    /// Append an event and return the identifier the store assigned to it
    async fn record_event(&self, draft: &TransferEventDraft) -> Result<EventId, EventStoreError>;

    /// Every recorded event in insertion order
    async fn list_events(&self) -> Result<Vec<TransferEvent>, EventStoreError>;
}

/// Total balance across a set of accounts
///
/// Used by tests and the CLI summary to check conservation.
pub fn total_balance(accounts: &[Account]) -> Decimal {
    accounts.iter().map(|account| account.balance).sum()
}
