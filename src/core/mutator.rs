//! Balance mutation for validated transfers

use rust_decimal::Decimal;

use crate::types::{Account, TransferError, TransferRequest};

/// Compute the post-transfer balances of source and destination
///
/// Only called once validation produced zero failures. Uses checked decimal
/// arithmetic; an overflow is reported rather than wrapped, and the
/// orchestrator treats it as an internal error.
///
/// # Returns
///
/// `(new_source_balance, new_dest_balance)`
pub fn apply(
    request: &TransferRequest,
    source: &Account,
    dest: &Account,
) -> Result<(Decimal, Decimal), TransferError> {
    let new_source = source
        .balance
        .checked_sub(request.amount)
        .ok_or_else(|| TransferError::arithmetic_overflow("debit", &source.id))?;

    let new_dest = dest
        .balance
        .checked_add(request.amount)
        .ok_or_else(|| TransferError::arithmetic_overflow("credit", &dest.id))?;

    Ok((new_source, new_dest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::whole(1000, 2000, 500, 500, 2500)]
    #[case::drain(1000, 0, 1000, 0, 1000)]
    #[case::small(1, 1, 1, 0, 2)]
    fn test_apply_moves_amount(
        #[case] source: i64,
        #[case] dest: i64,
        #[case] amount: i64,
        #[case] expected_source: i64,
        #[case] expected_dest: i64,
    ) {
        let request = TransferRequest::new("S", "D", Decimal::new(amount, 0));
        let (new_source, new_dest) = apply(
            &request,
            &Account::new("S", Decimal::new(source, 0)),
            &Account::new("D", Decimal::new(dest, 0)),
        )
        .unwrap();

        assert_eq!(new_source, Decimal::new(expected_source, 0));
        assert_eq!(new_dest, Decimal::new(expected_dest, 0));
        assert_eq!(
            new_source + new_dest,
            Decimal::new(source, 0) + Decimal::new(dest, 0)
        );
    }

    #[test]
    fn test_apply_is_exact_over_many_transfers() {
        // 0.1 is not representable in binary floating point
        let tenth = Decimal::new(1, 1);
        let mut source = Account::new("S", Decimal::ONE);
        let mut dest = Account::new("D", Decimal::ZERO);
        let request = TransferRequest::new("S", "D", tenth);

        for _ in 0..10 {
            let (s, d) = apply(&request, &source, &dest).unwrap();
            source.balance = s;
            dest.balance = d;
        }

        assert_eq!(source.balance, Decimal::ZERO);
        assert_eq!(dest.balance, Decimal::ONE);
    }

    #[test]
    fn test_apply_reports_overflow() {
        let request = TransferRequest::new("S", "D", Decimal::ONE);
        let result = apply(
            &request,
            &Account::new("S", Decimal::ONE),
            &Account::new("D", Decimal::MAX),
        );

        assert_eq!(
            result,
            Err(TransferError::arithmetic_overflow("credit", "D"))
        );
    }
}
