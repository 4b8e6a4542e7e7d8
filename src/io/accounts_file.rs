//! Accounts seed file loading
//!
//! Unlike the transfer file, the seed file is all-or-nothing: a single bad
//! row aborts the run, since a ledger missing an account would turn every
//! transfer touching it into an `UNKNOWN_*` failure.

use crate::io::csv_format::{convert_account_record, AccountCsvRecord};
use crate::io::sync_reader::open_csv;
use crate::ledger::InMemoryAccountLedger;
use crate::types::{Account, TransferError};
use std::path::Path;
use tracing::info;

/// Read every account of a seed file, in file order
pub fn read_accounts(path: &Path) -> Result<Vec<Account>, TransferError> {
    let mut reader = open_csv(path)?;
    let mut accounts = Vec::new();

    for (index, row) in reader.deserialize::<AccountCsvRecord>().enumerate() {
        let line = index as u64 + 2;
        let record = row?;
        accounts.push(convert_account_record(record, Some(line))?);
    }

    Ok(accounts)
}

/// Build a ledger holding the accounts of a seed file
///
/// # Errors
///
/// Returns the first unreadable row, duplicated id or negative balance.
pub fn load_ledger(path: &Path) -> Result<InMemoryAccountLedger, TransferError> {
    let accounts = read_accounts(path)?;
    let count = accounts.len();
    let ledger = InMemoryAccountLedger::with_accounts(accounts)?;

    info!(path = %path.display(), accounts = count, "Ledger seeded");
    Ok(ledger)
}
