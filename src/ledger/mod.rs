//! In-process collaborators
//!
//! Reference implementations of the two boundary contracts in
//! [`crate::core::traits`]. The CLI runs against them; tests use them as the
//! system of record to check conservation and event causality.
//!
//! - `account_ledger` - account balances with row locks and conditional batch writes
//! - `event_store` - append-only transfer event log

pub mod account_ledger;
pub mod event_store;

pub use account_ledger::InMemoryAccountLedger;
pub use event_store::InMemoryEventStore;
