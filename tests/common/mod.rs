//! Collaborator doubles and log capture shared by integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_transfer_orchestrator::core::{AccountLedger, TransferEventStore};
use rust_transfer_orchestrator::ledger::InMemoryAccountLedger;
use rust_transfer_orchestrator::types::{
    Account, AccountId, BalanceUpdate, EventId, EventStoreError, LedgerError, TransferEvent,
    TransferEventDraft, WriteFailure, WriteOutcome,
};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Ledger seeded with `{S: 1000, D: 2000}`
pub fn seeded_ledger() -> InMemoryAccountLedger {
    ledger_with(&[("S", 1000), ("D", 2000)])
}

pub fn ledger_with(accounts: &[(&str, i64)]) -> InMemoryAccountLedger {
    InMemoryAccountLedger::with_accounts(
        accounts
            .iter()
            .map(|(id, balance)| Account::new(*id, Decimal::new(*balance, 0))),
    )
    .expect("seed accounts are valid")
}

/// What a ledger double does on `write_accounts`
#[derive(Debug, Clone, Copy)]
pub enum WriteBehaviour {
    Reject,
    Fail,
    Panic,
}

/// Ledger whose fetch and list are real but whose write misbehaves
pub struct FaultyWriteLedger {
    pub inner: InMemoryAccountLedger,
    pub behaviour: WriteBehaviour,
}

impl FaultyWriteLedger {
    pub fn new(behaviour: WriteBehaviour) -> Self {
        Self {
            inner: seeded_ledger(),
            behaviour,
        }
    }
}

#[async_trait]
impl AccountLedger for FaultyWriteLedger {
    async fn fetch_accounts(&self, ids: &[AccountId]) -> Result<Vec<Account>, LedgerError> {
        self.inner.fetch_accounts(ids).await
    }

    async fn write_accounts(&self, updates: &[BalanceUpdate]) -> Result<WriteOutcome, LedgerError> {
        match self.behaviour {
            WriteBehaviour::Reject => Ok(WriteOutcome::Rejected(vec![WriteFailure::StaleBalance {
                account_id: updates[0].account_id.clone(),
            }])),
            WriteBehaviour::Fail => Err(LedgerError::unavailable("connection reset")),
            WriteBehaviour::Panic => panic!("ledger driver bug"),
        }
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, LedgerError> {
        self.inner.list_accounts().await
    }
}

/// Ledger that cannot be reached at all
pub struct UnreachableLedger;

#[async_trait]
impl AccountLedger for UnreachableLedger {
    async fn fetch_accounts(&self, _: &[AccountId]) -> Result<Vec<Account>, LedgerError> {
        Err(LedgerError::unavailable("connection refused"))
    }

    async fn write_accounts(&self, _: &[BalanceUpdate]) -> Result<WriteOutcome, LedgerError> {
        Err(LedgerError::unavailable("connection refused"))
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, LedgerError> {
        Err(LedgerError::unavailable("connection refused"))
    }
}

/// Ledger whose fetch never completes
pub struct HangingLedger;

#[async_trait]
impl AccountLedger for HangingLedger {
    async fn fetch_accounts(&self, _: &[AccountId]) -> Result<Vec<Account>, LedgerError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Vec::new())
    }

    async fn write_accounts(&self, _: &[BalanceUpdate]) -> Result<WriteOutcome, LedgerError> {
        Ok(WriteOutcome::Applied)
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, LedgerError> {
        Ok(Vec::new())
    }
}

/// Event store that cannot be reached
pub struct UnreachableEventStore;

#[async_trait]
impl TransferEventStore for UnreachableEventStore {
    async fn record_event(&self, _: &TransferEventDraft) -> Result<EventId, EventStoreError> {
        Err(EventStoreError::unavailable("connection refused"))
    }

    async fn list_events(&self) -> Result<Vec<TransferEvent>, EventStoreError> {
        Err(EventStoreError::unavailable("connection refused"))
    }
}

/// Event store whose client panics on every record call
pub struct PanickingEventStore;

#[async_trait]
impl TransferEventStore for PanickingEventStore {
    async fn record_event(&self, _: &TransferEventDraft) -> Result<EventId, EventStoreError> {
        panic!("event client bug")
    }

    async fn list_events(&self) -> Result<Vec<TransferEvent>, EventStoreError> {
        Ok(Vec::new())
    }
}

/// In-memory sink for a scoped tracing subscriber
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().expect("log buffer poisoned");
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Subscriber writing plain-text lines into this buffer
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
        let sink = self.clone();
        tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .with_target(true)
            .finish()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| io::Error::other("log buffer poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
