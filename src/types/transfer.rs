//! Transfer-related types for the transfer orchestrator
//!
//! This module defines the caller-facing request and outcome shapes, the
//! recorded transfer event, and the closed set of failure reason codes.

use super::account::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// A request to move `amount` from one account to another
///
/// Immutable input. The orchestrator never persists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    /// Account to debit
    pub source_account_id: AccountId,

    /// Account to credit
    pub dest_account_id: AccountId,

    /// Amount to move, must be strictly positive
    pub amount: Decimal,
}

impl TransferRequest {
    pub fn new(
        source_account_id: impl Into<AccountId>,
        dest_account_id: impl Into<AccountId>,
        amount: Decimal,
    ) -> Self {
        TransferRequest {
            source_account_id: source_account_id.into(),
            dest_account_id: dest_account_id.into(),
            amount,
        }
    }

    /// The ids to fetch from the ledger, deduplicated
    pub fn account_ids(&self) -> Vec<AccountId> {
        if self.source_account_id == self.dest_account_id {
            vec![self.source_account_id.clone()]
        } else {
            vec![self.source_account_id.clone(), self.dest_account_id.clone()]
        }
    }
}

impl fmt::Display for TransferRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} ({})",
            self.source_account_id, self.dest_account_id, self.amount
        )
    }
}

/// Identifier assigned by the event store on insert
///
/// Assignment order is creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payload of a transfer event before the event store assigns its id
///
/// This is also the payload written to the reconciliation log when
/// recording fails, so it serializes to a self-contained JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferEventDraft {
    pub source_account_id: AccountId,
    pub dest_account_id: AccountId,
    pub amount: Decimal,
}

impl From<&TransferRequest> for TransferEventDraft {
    fn from(request: &TransferRequest) -> Self {
        TransferEventDraft {
            source_account_id: request.source_account_id.clone(),
            dest_account_id: request.dest_account_id.clone(),
            amount: request.amount,
        }
    }
}

/// A recorded transfer
///
/// Append-only. Exists only for transfers whose balance mutation has
/// already committed at the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferEvent {
    pub event_id: EventId,
    pub source_account_id: AccountId,
    pub dest_account_id: AccountId,
    pub amount: Decimal,
}

impl TransferEvent {
    pub fn from_draft(event_id: EventId, draft: TransferEventDraft) -> Self {
        TransferEvent {
            event_id,
            source_account_id: draft.source_account_id,
            dest_account_id: draft.dest_account_id,
            amount: draft.amount,
        }
    }
}

/// Business-rule failures produced by the transfer validator
///
/// Variant order matches the order in which the validator evaluates its
/// checks, and therefore the order of the returned failure list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationFailure {
    /// Source and destination are the same account
    SourceDestSame,

    /// The ledger did not return exactly two matching accounts
    AccountLookupIncomplete,

    /// Source account not present among the fetched accounts
    UnknownSource,

    /// Destination account not present among the fetched accounts
    UnknownDestination,

    /// Amount is zero or negative
    NonPositiveAmount,

    /// Source balance is below the requested amount
    InsufficientFunds,
}

impl ValidationFailure {
    /// Stable wire code
    pub fn code(&self) -> &'static str {
        match self {
            ValidationFailure::SourceDestSame => "SOURCE_DEST_SAME",
            ValidationFailure::AccountLookupIncomplete => "ACCOUNT_LOOKUP_INCOMPLETE",
            ValidationFailure::UnknownSource => "UNKNOWN_SOURCE",
            ValidationFailure::UnknownDestination => "UNKNOWN_DESTINATION",
            ValidationFailure::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            ValidationFailure::InsufficientFunds => "INSUFFICIENT_FUNDS",
        }
    }

    /// Human-readable description for operators and clients
    pub fn description(&self) -> &'static str {
        match self {
            ValidationFailure::SourceDestSame => {
                "Source and destination account numbers can not be same."
            }
            ValidationFailure::AccountLookupIncomplete => "Invalid account numbers.",
            ValidationFailure::UnknownSource => "Invalid source account number.",
            ValidationFailure::UnknownDestination => "Invalid destination account number.",
            ValidationFailure::NonPositiveAmount => "Negative or zero fund transfer not allowed.",
            ValidationFailure::InsufficientFunds => "Insufficient funds for transfer.",
        }
    }
}

/// Every reason a transfer can be reported as failed to the caller
///
/// Best-effort failures (event recording) are absent on purpose: they
/// never reach the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// Business-rule failure, recoverable by correcting the request
    Validation(ValidationFailure),

    /// The account fetch failed at the ledger boundary
    LedgerUnavailable,

    /// The balance write errored or was rejected; nothing was applied
    LedgerWriteFailed,

    /// Unclassified failure inside the orchestrator
    InternalError,
}

impl FailureReason {
    /// Stable wire code
    pub fn code(&self) -> &'static str {
        match self {
            FailureReason::Validation(failure) => failure.code(),
            FailureReason::LedgerUnavailable => "LEDGER_UNAVAILABLE",
            FailureReason::LedgerWriteFailed => "LEDGER_WRITE_FAILED",
            FailureReason::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Human-readable description for operators and clients
    pub fn description(&self) -> &'static str {
        match self {
            FailureReason::Validation(failure) => failure.description(),
            FailureReason::LedgerUnavailable => "Error getting account information.",
            FailureReason::LedgerWriteFailed => "Error updating account information.",
            FailureReason::InternalError => {
                "Internal server error. Please try again after sometime."
            }
        }
    }

    /// Whether this failure came from a collaborator rather than a business rule
    pub fn is_boundary(&self) -> bool {
        !matches!(self, FailureReason::Validation(_))
    }
}

impl From<ValidationFailure> for FailureReason {
    fn from(failure: ValidationFailure) -> Self {
        FailureReason::Validation(failure)
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}

impl Serialize for FailureReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// Caller-visible result of a transfer
///
/// Every field reflects the same request. `failure_reasons` is empty if and
/// only if `success` is true; the constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOutcome {
    source_account_id: AccountId,
    dest_account_id: AccountId,
    amount: Decimal,
    success: bool,
    failure_reasons: Vec<FailureReason>,
}

impl TransferOutcome {
    /// Outcome for a committed transfer
    pub fn success(request: &TransferRequest) -> Self {
        TransferOutcome {
            source_account_id: request.source_account_id.clone(),
            dest_account_id: request.dest_account_id.clone(),
            amount: request.amount,
            success: true,
            failure_reasons: Vec::new(),
        }
    }

    /// Outcome for a transfer aborted before commit
    ///
    /// An empty `reasons` list is replaced by `INTERNAL_ERROR` so a failed
    /// outcome always explains itself.
    pub fn failure(request: &TransferRequest, reasons: Vec<FailureReason>) -> Self {
        let failure_reasons = if reasons.is_empty() {
            vec![FailureReason::InternalError]
        } else {
            reasons
        };

        TransferOutcome {
            source_account_id: request.source_account_id.clone(),
            dest_account_id: request.dest_account_id.clone(),
            amount: request.amount,
            success: false,
            failure_reasons,
        }
    }

    pub fn source_account_id(&self) -> &str {
        &self.source_account_id
    }

    pub fn dest_account_id(&self) -> &str {
        &self.dest_account_id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn failure_reasons(&self) -> &[FailureReason] {
        &self.failure_reasons
    }

    /// Failure codes as the caller-facing list of strings
    pub fn failure_codes(&self) -> Vec<&'static str> {
        self.failure_reasons.iter().map(|r| r.code()).collect()
    }
}
