//! I/O module
//!
//! Handles CSV parsing and output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (record conversion, report serialization)
//! - `accounts_file` - Accounts seed file loading
//! - `sync_reader` - Synchronous transfer reader with iterator interface
//! - `async_reader` - Asynchronous transfer reader with batch reading interface

pub mod accounts_file;
pub mod async_reader;
pub mod csv_format;
pub mod sync_reader;

pub use accounts_file::{load_ledger, read_accounts};
pub use async_reader::AsyncReader;
pub use csv_format::{
    convert_account_record, convert_transfer_record, write_balances_csv, write_events_csv,
    write_outcomes_csv, AccountCsvRecord, TransferCsvRecord,
};
pub use sync_reader::SyncReader;
