//! In-process transfer event store
//!
//! Append-only: events are never updated or removed. Identifiers are assigned
//! under the same lock as the append, so id order and insertion order agree.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::debug;

use crate::core::traits::TransferEventStore;
use crate::types::{EventId, EventStoreError, TransferEvent, TransferEventDraft};

/// Thread-safe append-only event log
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: RwLock<Vec<TransferEvent>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded events
    ///
    /// Counts through a poisoned lock: appends are a single push, so the log
    /// is never left half-written and the count stays exact.
    pub fn len(&self) -> usize {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reject drafts that could never describe a committed transfer
fn check_draft(draft: &TransferEventDraft) -> Result<(), EventStoreError> {
    if draft.source_account_id.is_empty() || draft.dest_account_id.is_empty() {
        return Err(EventStoreError::rejected("account id is empty"));
    }
    if draft.source_account_id == draft.dest_account_id {
        return Err(EventStoreError::rejected(
            "source and destination are the same account",
        ));
    }
    if draft.amount <= Decimal::ZERO {
        return Err(EventStoreError::rejected("amount is not positive"));
    }
    Ok(())
}

#[async_trait]
impl TransferEventStore for InMemoryEventStore {
    async fn record_event(&self, draft: &TransferEventDraft) -> Result<EventId, EventStoreError> {
        check_draft(draft)?;

        let mut events = self
            .events
            .write()
            .map_err(|_| EventStoreError::unavailable("event log lock poisoned"))?;

        let event_id = EventId(events.len() as u64 + 1);
        events.push(TransferEvent::from_draft(event_id, draft.clone()));

        debug!(event_id = %event_id, "Transfer event recorded");
        Ok(event_id)
    }

    async fn list_events(&self) -> Result<Vec<TransferEvent>, EventStoreError> {
        self.events
            .read()
            .map(|events| events.clone())
            .map_err(|_| EventStoreError::unavailable("event log lock poisoned"))
    }
}
