//! Transfer validation
//!
//! Pure checks of a transfer request against the accounts the ledger returned
//! for it. Every check runs; the caller gets the complete failure set in one
//! round trip, in a fixed order.

use rust_decimal::Decimal;

use crate::types::{Account, TransferRequest, ValidationFailure};

/// Number of distinct accounts a well-formed transfer touches
const EXPECTED_ACCOUNTS: usize = 2;

/// Validate `request` against `accounts`
///
/// Failures are returned in this order:
/// 1. `SOURCE_DEST_SAME`
/// 2. `ACCOUNT_LOOKUP_INCOMPLETE` (anything other than exactly two matching accounts)
/// 3. `UNKNOWN_SOURCE`
/// 4. `UNKNOWN_DESTINATION`
/// 5. `NON_POSITIVE_AMOUNT`
/// 6. `INSUFFICIENT_FUNDS`, only evaluated when the source was found
///
/// An empty result means the transfer may proceed to the balance mutator.
pub fn validate(request: &TransferRequest, accounts: &[Account]) -> Vec<ValidationFailure> {
    let mut failures = Vec::new();

    if request.source_account_id == request.dest_account_id {
        failures.push(ValidationFailure::SourceDestSame);
    }

    let matching = accounts
        .iter()
        .filter(|account| {
            account.id == request.source_account_id || account.id == request.dest_account_id
        })
        .count();
    if matching != EXPECTED_ACCOUNTS || accounts.len() != EXPECTED_ACCOUNTS {
        failures.push(ValidationFailure::AccountLookupIncomplete);
    }

    let source = find_account(accounts, &request.source_account_id);
    if source.is_none() {
        failures.push(ValidationFailure::UnknownSource);
    }

    if find_account(accounts, &request.dest_account_id).is_none() {
        failures.push(ValidationFailure::UnknownDestination);
    }

    if request.amount <= Decimal::ZERO {
        failures.push(ValidationFailure::NonPositiveAmount);
    }

    // Skipped for an unknown source: UNKNOWN_SOURCE already covers it
    if let Some(source) = source {
        if source.balance < request.amount {
            failures.push(ValidationFailure::InsufficientFunds);
        }
    }

    failures
}

/// Find an account by id among fetched accounts
///
/// Ids compare exactly, the same way the ledger keys its rows.
pub fn find_account<'a>(accounts: &'a [Account], id: &str) -> Option<&'a Account> {
    accounts.iter().find(|account| account.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use crate::types::ValidationFailure::*;

    fn accounts(entries: &[(&str, i64)]) -> Vec<Account> {
        entries
            .iter()
            .map(|(id, balance)| Account::new(*id, Decimal::new(*balance, 0)))
            .collect()
    }

    fn request(source: &str, dest: &str, amount: i64) -> TransferRequest {
        TransferRequest::new(source, dest, Decimal::new(amount, 0))
    }

    #[rstest]
    #[case::valid(request("S", "D", 500), &[("S", 1000), ("D", 2000)], vec![])]
    #[case::exact_balance(request("S", "D", 1000), &[("S", 1000), ("D", 2000)], vec![])]
    #[case::same_account(
        request("S", "S", 100),
        &[("S", 1000)],
        vec![SourceDestSame, AccountLookupIncomplete]
    )]
    #[case::zero_amount(
        request("S", "D", 0),
        &[("S", 1000), ("D", 2000)],
        vec![NonPositiveAmount]
    )]
    #[case::negative_amount(
        request("S", "D", -5),
        &[("S", 1000), ("D", 2000)],
        vec![NonPositiveAmount]
    )]
    #[case::insufficient(
        request("S", "D", 3000),
        &[("S", 1000), ("D", 2000)],
        vec![InsufficientFunds]
    )]
    #[case::unknown_source(
        request("X", "D", 100),
        &[("D", 2000)],
        vec![AccountLookupIncomplete, UnknownSource]
    )]
    #[case::unknown_destination(
        request("S", "X", 100),
        &[("S", 1000)],
        vec![AccountLookupIncomplete, UnknownDestination]
    )]
    #[case::unknown_destination_insufficient(
        request("S", "X", 5000),
        &[("S", 1000)],
        vec![AccountLookupIncomplete, UnknownDestination, InsufficientFunds]
    )]
    #[case::nothing_found(
        request("X", "Y", 0),
        &[],
        vec![AccountLookupIncomplete, UnknownSource, UnknownDestination, NonPositiveAmount]
    )]
    #[case::ids_differing_only_in_case(
        request("S", "s", 100),
        &[("S", 1000), ("s", 0)],
        vec![]
    )]
    #[case::case_mismatched_destination(
        request("S", "d", 100),
        &[("S", 1000)],
        vec![AccountLookupIncomplete, UnknownDestination]
    )]
    #[case::unrelated_extra_account(
        request("S", "D", 100),
        &[("S", 1000), ("D", 2000), ("Z", 10)],
        vec![AccountLookupIncomplete]
    )]
    fn test_validate_failure_sequence(
        #[case] request: TransferRequest,
        #[case] fetched: &[(&str, i64)],
        #[case] expected: Vec<ValidationFailure>,
    ) {
        assert_eq!(validate(&request, &accounts(fetched)), expected);
    }

    #[test]
    fn test_validate_collects_every_failure() {
        // Same account, zero amount, nothing fetched
        let failures = validate(&request("S", "S", 0), &[]);

        assert_eq!(
            failures,
            vec![
                SourceDestSame,
                AccountLookupIncomplete,
                UnknownSource,
                UnknownDestination,
                NonPositiveAmount,
            ]
        );
    }

    #[test]
    fn test_validate_is_idempotent() {
        let fetched = accounts(&[("D", 2000)]);
        let request = request("X", "D", -1);

        let first = validate(&request, &fetched);
        let second = validate(&request, &fetched);

        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn test_validate_handles_fractional_balances() {
        let fetched = vec![
            Account::new("S", Decimal::new(10001, 4)),
            Account::new("D", Decimal::ZERO),
        ];

        assert!(validate(&TransferRequest::new("S", "D", Decimal::new(10001, 4)), &fetched).is_empty());
        assert_eq!(
            validate(&TransferRequest::new("S", "D", Decimal::new(10002, 4)), &fetched),
            vec![InsufficientFunds]
        );
    }

    #[test]
    fn test_find_account() {
        let fetched = accounts(&[("S", 1), ("D", 2)]);
        assert_eq!(find_account(&fetched, "D").map(|a| a.balance), Some(Decimal::new(2, 0)));
        assert!(find_account(&fetched, "X").is_none());
    }
}
