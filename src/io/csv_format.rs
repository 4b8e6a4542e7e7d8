//! CSV format handling for accounts, transfer requests and reports
//!
//! This module centralizes all CSV format concerns, providing:
//! - Record structures for deserialization of the two input files
//! - Conversion from CSV records to domain types
//! - Serialization of balances, transfer outcomes and recorded events
//!
//! All functions are pure (no file I/O) for easy testing.
//!
//! # Formats
//!
//! ```text
//! accounts:  account,balance
//! transfers: source,destination,amount
//! outcomes:  seq,source,destination,amount,success,failure_reasons
//! events:    event_id,source,destination,amount
//! ```
//!
//! `failure_reasons` holds the reason codes in order, separated by `;`.

use crate::types::{Account, TransferError, TransferEvent, TransferOutcome, TransferRequest};
use csv::Writer;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// Row of the accounts seed file
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AccountCsvRecord {
    pub account: String,
    pub balance: String,
}

/// Row of the transfer request file
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TransferCsvRecord {
    pub source: String,
    pub destination: String,
    pub amount: String,
}

/// Parse an exact decimal amount, trimming surrounding whitespace
fn parse_decimal(raw: &str, line: Option<u64>) -> Result<Decimal, TransferError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TransferError::invalid_amount(raw, line));
    }
    Decimal::from_str(trimmed).map_err(|_| TransferError::invalid_amount(raw, line))
}

/// Convert an accounts file row to an Account
///
/// Only the shape of the row is checked here; the ledger rejects negative
/// opening balances and duplicate ids when the account is opened.
///
/// # Arguments
///
/// * `record` - The deserialized CSV row
/// * `line` - Line number of the row, used in error messages
pub fn convert_account_record(
    record: AccountCsvRecord,
    line: Option<u64>,
) -> Result<Account, TransferError> {
    let id = record.account.trim();
    if id.is_empty() {
        return Err(TransferError::ParseError {
            line,
            message: "account id is empty".to_string(),
        });
    }

    let balance = parse_decimal(&record.balance, line)?;
    Ok(Account::new(id, balance))
}

/// Convert a transfer file row to a TransferRequest
///
/// Any well-formed decimal is accepted, including zero and negative
/// amounts: rejecting those is the validator's job, and it reports them as
/// `NON_POSITIVE_AMOUNT` outcomes rather than unreadable rows.
///
/// # Arguments
///
/// * `record` - The deserialized CSV row
/// * `line` - Line number of the row, used in error messages
///
/// # Returns
///
/// * `Ok(TransferRequest)` - Successfully converted request
/// * `Err(TransferError::InvalidAmount)` - The amount is not a decimal
pub fn convert_transfer_record(
    record: TransferCsvRecord,
    line: Option<u64>,
) -> Result<TransferRequest, TransferError> {
    let amount = parse_decimal(&record.amount, line)?;

    Ok(TransferRequest::new(
        record.source.trim(),
        record.destination.trim(),
        amount,
    ))
}

/// Write account balances to CSV format
///
/// Writes accounts with columns: account, balance.
/// Accounts are sorted by id for deterministic output.
///
/// # Arguments
///
/// * `accounts` - Slice of accounts to write
/// * `output` - Mutable reference to a writer for outputting CSV
pub fn write_balances_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), TransferError> {
    let mut writer = Writer::from_writer(output);
    writer.write_record(["account", "balance"])?;

    let mut sorted_accounts = accounts.to_vec();
    sorted_accounts.sort_by(|a, b| a.id.cmp(&b.id));

    for account in sorted_accounts {
        writer.write_record(&[account.id, format!("{:.4}", account.balance)])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write per-request outcomes to CSV format
///
/// Outcomes are written in the order given, numbered from 1. Strategies
/// pass them in input order, so `seq` matches the request's position among
/// the readable rows of the transfer file.
pub fn write_outcomes_csv(
    outcomes: &[TransferOutcome],
    output: &mut dyn Write,
) -> Result<(), TransferError> {
    let mut writer = Writer::from_writer(output);
    writer.write_record([
        "seq",
        "source",
        "destination",
        "amount",
        "success",
        "failure_reasons",
    ])?;

    for (index, outcome) in outcomes.iter().enumerate() {
        writer.write_record(&[
            (index + 1).to_string(),
            outcome.source_account_id().to_string(),
            outcome.dest_account_id().to_string(),
            outcome.amount().to_string(),
            outcome.is_success().to_string(),
            outcome.failure_codes().join(";"),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write recorded transfer events to CSV format, in event id order
pub fn write_events_csv(events: &[TransferEvent], output: &mut dyn Write) -> Result<(), TransferError> {
    let mut writer = Writer::from_writer(output);
    writer.write_record(["event_id", "source", "destination", "amount"])?;

    let mut sorted_events = events.to_vec();
    sorted_events.sort_by_key(|event| event.event_id);

    for event in sorted_events {
        writer.write_record(&[
            event.event_id.to_string(),
            event.source_account_id,
            event.dest_account_id,
            event.amount.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EventId, FailureReason, ValidationFailure};
    use rstest::rstest;

    fn transfer_record(source: &str, destination: &str, amount: &str) -> TransferCsvRecord {
        TransferCsvRecord {
            source: source.to_string(),
            destination: destination.to_string(),
            amount: amount.to_string(),
        }
    }

    #[rstest]
    #[case::whole("500", Decimal::new(500, 0))]
    #[case::fractional("100.1234", Decimal::new(1001234, 4))]
    #[case::whitespace("  0.10  ", Decimal::new(10, 2))]
    #[case::zero("0", Decimal::ZERO)]
    #[case::negative("-5", Decimal::new(-5, 0))]
    fn test_convert_transfer_record_amounts(#[case] amount: &str, #[case] expected: Decimal) {
        let request = convert_transfer_record(transfer_record("S", "D", amount), Some(2)).unwrap();

        assert_eq!(request.amount, expected);
        assert_eq!(request.source_account_id, "S");
        assert_eq!(request.dest_account_id, "D");
    }

    #[rstest]
    #[case::not_a_number("abc")]
    #[case::empty("")]
    #[case::whitespace("   ")]
    fn test_convert_transfer_record_invalid_amount(#[case] amount: &str) {
        let result = convert_transfer_record(transfer_record("S", "D", amount), Some(4));

        assert!(matches!(
            result,
            Err(TransferError::InvalidAmount { line: Some(4), .. })
        ));
    }

    #[test]
    fn test_convert_transfer_record_trims_ids() {
        let request =
            convert_transfer_record(transfer_record("  S ", " D", "1"), None).unwrap();

        assert_eq!(request.source_account_id, "S");
        assert_eq!(request.dest_account_id, "D");
    }

    #[rstest]
    #[case::valid("acc-1", "100.50", Ok(Account::new("acc-1", Decimal::new(10050, 2))))]
    #[case::negative_is_parsed("acc-1", "-1", Ok(Account::new("acc-1", Decimal::new(-1, 0))))]
    fn test_convert_account_record(
        #[case] account: &str,
        #[case] balance: &str,
        #[case] expected: Result<Account, TransferError>,
    ) {
        let record = AccountCsvRecord {
            account: account.to_string(),
            balance: balance.to_string(),
        };

        assert_eq!(convert_account_record(record, Some(2)), expected);
    }

    #[test]
    fn test_convert_account_record_rejects_empty_id() {
        let record = AccountCsvRecord {
            account: " ".to_string(),
            balance: "1".to_string(),
        };

        let result = convert_account_record(record, Some(3));

        assert!(matches!(result, Err(TransferError::ParseError { line: Some(3), .. })));
    }

    #[rstest]
    #[case::sorted_by_id(
        vec![
            Account::new("D", Decimal::new(2500, 0)),
            Account::new("S", Decimal::new(500, 0)),
            Account::new("A", Decimal::ZERO),
        ],
        "account,balance\nA,0.0000\nD,2500.0000\nS,500.0000\n"
    )]
    #[case::four_decimal_precision(
        vec![Account::new("S", Decimal::new(1001234, 4))],
        "account,balance\nS,100.1234\n"
    )]
    #[case::empty(vec![], "account,balance\n")]
    fn test_write_balances_csv(#[case] accounts: Vec<Account>, #[case] expected_output: &str) {
        let mut output = Vec::new();
        write_balances_csv(&accounts, &mut output).unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), expected_output);
    }

    #[test]
    fn test_write_outcomes_csv() {
        let ok = TransferRequest::new("S", "D", Decimal::new(500, 0));
        let bad = TransferRequest::new("S", "S", Decimal::ZERO);
        let outcomes = vec![
            TransferOutcome::success(&ok),
            TransferOutcome::failure(
                &bad,
                vec![
                    FailureReason::Validation(ValidationFailure::SourceDestSame),
                    FailureReason::Validation(ValidationFailure::AccountLookupIncomplete),
                ],
            ),
        ];

        let mut output = Vec::new();
        write_outcomes_csv(&outcomes, &mut output).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "seq,source,destination,amount,success,failure_reasons\n\
             1,S,D,500,true,\n\
             2,S,S,0,false,SOURCE_DEST_SAME;ACCOUNT_LOOKUP_INCOMPLETE\n"
        );
    }

    #[test]
    fn test_write_events_csv_orders_by_id() {
        let events = vec![
            TransferEvent {
                event_id: EventId(2),
                source_account_id: "D".to_string(),
                dest_account_id: "S".to_string(),
                amount: Decimal::new(7, 0),
            },
            TransferEvent {
                event_id: EventId(1),
                source_account_id: "S".to_string(),
                dest_account_id: "D".to_string(),
                amount: Decimal::new(500, 0),
            },
        ];

        let mut output = Vec::new();
        write_events_csv(&events, &mut output).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "event_id,source,destination,amount\n1,S,D,500\n2,D,S,7\n"
        );
    }
}
