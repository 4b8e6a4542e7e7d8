//! In-process account ledger
//!
//! This module provides `InMemoryAccountLedger`, an owned account store that
//! honours the `AccountLedger` consistency contract without a database.
//!
//! # Design
//!
//! Each account row is a `Mutex<Decimal>` held behind an `Arc` in a `DashMap`.
//! The map only guards row lookup; the row mutex plays the part of a database
//! row lock. DashMap shard locks are released before any row lock is taken,
//! so two rows that happen to share a shard never deadlock.
//!
//! # Isolation
//!
//! - Reads lock one row at a time and copy the committed value
//!   (read committed).
//! - A batch write locks every row it touches in ascending id order, checks
//!   each entry against the locked value, and only then applies all entries
//!   (repeatable read for the rows involved, all-or-nothing across them).
//!   Ordered acquisition rules out lock cycles between concurrent writers.
//!
//! # Blocking
//!
//! Row locks are `std::sync::Mutex`, taken inside the async trait methods.
//! Critical sections are a compare and an assignment with no `.await` while a
//! guard is held, so a contended lock parks a tokio worker only for that long.
//! That is fine for an in-process ledger; a ledger whose row locks can be
//! held across I/O needs async locks instead.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::core::traits::AccountLedger;
use crate::types::{
    Account, AccountId, BalanceUpdate, LedgerError, TransferError, WriteFailure, WriteOutcome,
};

type Row = Arc<Mutex<Decimal>>;

/// Thread-safe account store with row-level locking
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
#[derive(Debug, Default)]
pub struct InMemoryAccountLedger {
    rows: DashMap<AccountId, Row>,
}

impl InMemoryAccountLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
        }
    }

    /// Create a ledger seeded with `accounts`
    ///
    /// Fails on a duplicated id or a negative opening balance.
    pub fn with_accounts<I>(accounts: I) -> Result<Self, TransferError>
    where
        I: IntoIterator<Item = Account>,
    {
        let ledger = Self::new();
        for account in accounts {
            ledger.open_account(account.id, account.balance)?;
        }
        Ok(ledger)
    }

    /// Open a new account with an opening balance
    pub fn open_account(
        &self,
        id: impl Into<AccountId>,
        balance: Decimal,
    ) -> Result<(), TransferError> {
        let id = id.into();
        if balance < Decimal::ZERO {
            return Err(TransferError::NegativeOpeningBalance {
                account_id: id,
                balance,
            });
        }

        match self.rows.entry(id) {
            Entry::Occupied(entry) => Err(TransferError::duplicate_account(entry.key())),
            Entry::Vacant(entry) => {
                debug!(account = %entry.key(), balance = %balance, "Account opened");
                entry.insert(Arc::new(Mutex::new(balance)));
                Ok(())
            }
        }
    }

    /// Committed balance of one account
    pub fn balance(&self, id: &str) -> Result<Option<Decimal>, LedgerError> {
        match self.row(id) {
            Some(row) => read_row(id, &row).map(Some),
            None => Ok(None),
        }
    }

    /// Number of accounts
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn row(&self, id: &str) -> Option<Row> {
        // Clone the Arc so the shard lock is released before the row is locked
        self.rows.get(id).map(|row| Arc::clone(row.value()))
    }
}

fn read_row(id: &str, row: &Row) -> Result<Decimal, LedgerError> {
    row.lock()
        .map(|balance| *balance)
        .map_err(|_| LedgerError::lock_poisoned(id))
}

#[async_trait]
impl AccountLedger for InMemoryAccountLedger {
    async fn fetch_accounts(&self, ids: &[AccountId]) -> Result<Vec<Account>, LedgerError> {
        let mut seen = HashSet::new();
        let mut accounts = Vec::with_capacity(ids.len());

        for id in ids {
            if !seen.insert(id.as_str()) {
                continue;
            }
            if let Some(row) = self.row(id) {
                accounts.push(Account::new(id.clone(), read_row(id, &row)?));
            }
        }

        Ok(accounts)
    }

    async fn write_accounts(&self, updates: &[BalanceUpdate]) -> Result<WriteOutcome, LedgerError> {
        let mut failures = Vec::new();
        let mut seen = HashSet::new();
        let mut rows = Vec::with_capacity(updates.len());

        for update in updates {
            if !seen.insert(update.account_id.as_str()) {
                failures.push(WriteFailure::DuplicateEntry {
                    account_id: update.account_id.clone(),
                });
                continue;
            }
            match self.row(&update.account_id) {
                Some(row) => rows.push((update, row)),
                None => failures.push(WriteFailure::UnknownAccount {
                    account_id: update.account_id.clone(),
                }),
            }
        }

        if !failures.is_empty() {
            warn!(?failures, "Balance write rejected before locking");
            return Ok(WriteOutcome::Rejected(failures));
        }

        // Ascending id order for every writer
        rows.sort_by(|(a, _), (b, _)| a.account_id.cmp(&b.account_id));

        let mut locked = Vec::with_capacity(rows.len());
        for (update, row) in &rows {
            let guard = row
                .lock()
                .map_err(|_| LedgerError::lock_poisoned(&update.account_id))?;
            locked.push((*update, guard));
        }

        for (update, current) in &locked {
            if **current != update.expected_balance {
                failures.push(WriteFailure::StaleBalance {
                    account_id: update.account_id.clone(),
                });
            } else if update.new_balance < Decimal::ZERO {
                failures.push(WriteFailure::InsufficientFunds {
                    account_id: update.account_id.clone(),
                });
            }
        }

        if !failures.is_empty() {
            debug!(?failures, "Balance write rejected under lock");
            return Ok(WriteOutcome::Rejected(failures));
        }

        for (update, current) in locked.iter_mut() {
            **current = update.new_balance;
        }

        debug!(entries = locked.len(), "Balance write applied");
        Ok(WriteOutcome::Applied)
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, LedgerError> {
        let rows: Vec<(AccountId, Row)> = self
            .rows
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();

        let mut accounts = rows
            .into_iter()
            .map(|(id, row)| read_row(&id, &row).map(|balance| Account::new(id, balance)))
            .collect::<Result<Vec<_>, _>>()?;

        accounts.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(accounts)
    }
}
