//! Core business logic module
//!
//! This module contains the transfer processing components:
//! - `traits` - Contracts of the account ledger and transfer event store
//! - `validator` - Ordered, non-short-circuiting business-rule checks
//! - `mutator` - Exact decimal debit and credit
//! - `orchestrator` - Fetch, validate, mutate, commit, record

pub mod mutator;
pub mod orchestrator;
pub mod traits;
pub mod validator;

pub use orchestrator::{
    OrchestratorConfig, TransferOrchestrator, TransferStage, RECONCILIATION_TARGET,
};
pub use traits::{total_balance, AccountLedger, TransferEventStore};
