//! One invocation's unit of work.
//!
//! Writes are buffered in an overlay on top of a borrowed snapshot of
//! committed state. Reads and prefix scans see the overlay first. Nothing
//! reaches committed state until the [`Changeset`] is applied by the owner.

use std::collections::BTreeMap;
use std::ops::Bound;

use serde::{Deserialize, Serialize};
use tuple_ledger_core::traits::Ledger;
use tuple_ledger_core::{Error, Result};

/// Event attached to a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    pub name: String,
    pub payload: Vec<u8>,
}

/// Buffered effects of a finished transaction.
#[derive(Debug, Default)]
pub struct Changeset {
    /// `None` marks a deletion
    pub(crate) writes: BTreeMap<String, Option<Vec<u8>>>,
    pub(crate) event: Option<LedgerEvent>,
}

impl Changeset {
    pub fn write_count(&self) -> usize {
        self.writes.len()
    }

    pub fn event(&self) -> Option<&LedgerEvent> {
        self.event.as_ref()
    }
}

pub struct Transaction<'a> {
    base: &'a BTreeMap<String, Vec<u8>>,
    creator: String,
    changes: Changeset,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(base: &'a BTreeMap<String, Vec<u8>>, creator: impl Into<String>) -> Self {
        Self {
            base,
            creator: creator.into(),
            changes: Changeset::default(),
        }
    }

    /// Number of keys written or deleted so far.
    pub fn pending_writes(&self) -> usize {
        self.changes.writes.len()
    }

    pub fn pending_event(&self) -> Option<&LedgerEvent> {
        self.changes.event.as_ref()
    }

    pub fn into_changeset(self) -> Changeset {
        self.changes
    }
}

impl Ledger for Transaction<'_> {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self.changes.writes.get(key) {
            Some(buffered) => Ok(buffered.clone()),
            None => Ok(self.base.get(key).cloned()),
        }
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        if key.is_empty() {
            return Err(Error::Storage("empty key".to_string()));
        }
        self.changes.writes.insert(key.to_string(), Some(value));
        Ok(())
    }

    fn del_state(&mut self, key: &str) -> Result<()> {
        self.changes.writes.insert(key.to_string(), None);
        Ok(())
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let mut merged: BTreeMap<&str, bool> = self
            .base
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| (key.as_str(), true))
            .collect();

        for (key, value) in self
            .changes
            .writes
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix))
        {
            merged.insert(key.as_str(), value.is_some());
        }

        Ok(merged
            .into_iter()
            .filter(|(_, live)| *live)
            .map(|(key, _)| key.to_string())
            .collect())
    }

    fn tx_creator(&self) -> Result<String> {
        if self.creator.is_empty() {
            return Err(Error::Storage("transaction has no submitting identity".to_string()));
        }
        Ok(self.creator.clone())
    }

    fn set_event(&mut self, name: &str, payload: Vec<u8>) -> Result<()> {
        if let Some(existing) = &self.changes.event {
            return Err(Error::internal(format!(
                "event {} already set for this transaction",
                existing.name
            )));
        }
        self.changes.event = Some(LedgerEvent {
            name: name.to_string(),
            payload,
        });
        Ok(())
    }
}
