//! The `tuples-updated` event.
//!
//! A ledger transaction carries at most one event, so every tuple made
//! runnable during an invocation is collected into an [`EventBatch`] and
//! flushed once, when the invocation is about to return.

use serde::{Deserialize, Serialize};

use crate::traits::Ledger;
use crate::view::{TesttupleView, TraintupleView};
use crate::Result;

/// Event name under which runnable tuples are announced.
pub const EVENT_TUPLES_UPDATED: &str = "tuples-updated";

/// Payload of the `tuples-updated` event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TuplesEvent {
    pub traintuples: Vec<TraintupleView>,
    pub testtuples: Vec<TesttupleView>,
}

impl TuplesEvent {
    pub fn is_empty(&self) -> bool {
        self.traintuples.is_empty() && self.testtuples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.traintuples.len() + self.testtuples.len()
    }

    pub fn to_payload(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_payload(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Accumulates runnable tuples for one invocation.
#[derive(Debug, Default)]
pub struct EventBatch {
    event: TuplesEvent,
}

impl EventBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_traintuple(&mut self, view: TraintupleView) {
        self.event.traintuples.push(view);
    }

    pub fn push_testtuple(&mut self, view: TesttupleView) {
        self.event.testtuples.push(view);
    }

    pub fn merge(&mut self, other: EventBatch) {
        self.event.traintuples.extend(other.event.traintuples);
        self.event.testtuples.extend(other.event.testtuples);
    }

    pub fn event(&self) -> &TuplesEvent {
        &self.event
    }

    /// Set the batch as the transaction's event. Consumes the batch.
    pub fn flush<L: Ledger + ?Sized>(self, ledger: &mut L) -> Result<TuplesEvent> {
        ledger.set_event(EVENT_TUPLES_UPDATED, self.event.to_payload()?)?;
        Ok(self.event)
    }
}
