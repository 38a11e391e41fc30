//! Committed in-memory ledger state.

use std::collections::BTreeMap;

use tracing::debug;
use tuple_ledger_core::Result;

use crate::snapshot::{self, SnapshotV1};
use crate::transaction::{Changeset, LedgerEvent, Transaction};

/// Outcome of a committed invocation.
#[derive(Debug)]
pub struct Invocation<T> {
    pub value: T,
    /// Event set by the invocation, if any
    pub event: Option<LedgerEvent>,
}

/// Committed key/value state plus the events of committed invocations.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryLedger {
    pub(crate) state: BTreeMap<String, Vec<u8>>,
    pub(crate) events: Vec<LedgerEvent>,
    pub(crate) height: u64,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a unit of work submitted by `creator`.
    ///
    /// The transaction borrows committed state; hand its [`Changeset`] to
    /// [`MemoryLedger::commit`] to apply it, or drop it to discard.
    pub fn begin(&self, creator: impl Into<String>) -> Transaction<'_> {
        Transaction::new(&self.state, creator)
    }

    /// Apply a finished transaction. Returns the event it carried.
    pub fn commit(&mut self, changes: Changeset) -> Option<LedgerEvent> {
        let writes = changes.writes.len();
        for (key, value) in changes.writes {
            match value {
                Some(value) => {
                    self.state.insert(key, value);
                }
                None => {
                    self.state.remove(&key);
                }
            }
        }
        self.height += 1;
        if let Some(event) = &changes.event {
            self.events.push(event.clone());
        }
        debug!(
            height = self.height,
            writes,
            event = ?changes.event.as_ref().map(|e| e.name.as_str()),
            "committed transaction"
        );
        changes.event
    }

    /// Run `f` in a transaction; commit on `Ok`, discard on `Err`.
    pub fn transact<T, F>(&mut self, creator: &str, f: F) -> Result<Invocation<T>>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<T>,
    {
        let (value, changes) = {
            let mut tx = self.begin(creator);
            match f(&mut tx) {
                Ok(value) => (value, tx.into_changeset()),
                Err(e) => {
                    debug!(creator, error = %e, "discarded transaction");
                    return Err(e);
                }
            }
        };
        let event = self.commit(changes);
        Ok(Invocation { value, event })
    }

    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.state.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Committed keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.state.keys().map(String::as_str)
    }

    /// Events of committed invocations, oldest first.
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    pub fn last_event(&self) -> Option<&LedgerEvent> {
        self.events.last()
    }

    /// Number of committed transactions.
    pub fn height(&self) -> u64 {
        self.height
    }

    /// Encode committed state into a versioned, checksummed snapshot.
    pub fn snapshot(&self) -> Result<Vec<u8>> {
        let body = SnapshotV1 {
            height: self.height,
            entries: self
                .state
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            events: self.events.clone(),
        };
        Ok(snapshot::encode(&body)?)
    }

    /// Rebuild a ledger from [`MemoryLedger::snapshot`] output.
    pub fn from_snapshot(bytes: &[u8]) -> Result<Self> {
        let body = snapshot::decode(bytes)?;
        Ok(Self {
            state: body.entries.into_iter().collect(),
            events: body.events,
            height: body.height,
        })
    }
}
