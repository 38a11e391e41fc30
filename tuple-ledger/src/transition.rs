//! Status transition engine.

use tracing::{info, warn};
use tuple_ledger_core::status::Status;
use tuple_ledger_core::traits::{Ledger, LedgerExt};
use tuple_ledger_core::tuple::Tuple;
use tuple_ledger_core::{Error, Result};

/// Who is driving a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusActor {
    /// The worker reports progress; the submitting identity must be the tuple's worker
    Worker,
    /// A parent's report propagates to its children
    Cascade,
}

/// Persist `tuple` under `key` with status `new`, moving its worker~status entry.
///
/// `tuple` is the caller's in-memory copy. Its status must still match the
/// stored record; other fields (perf, log, out model) are written as given.
/// Every check runs before the first write, ownership first.
pub fn commit_status_update<L, T>(
    ledger: &mut L,
    key: &str,
    tuple: &mut T,
    new: Status,
    actor: StatusActor,
) -> Result<()>
where
    L: Ledger + ?Sized,
    T: Tuple,
{
    if actor == StatusActor::Worker {
        let creator = ledger.tx_creator()?;
        if creator != tuple.worker() {
            return Err(Error::forbidden(format!(
                "{creator} is not allowed to update tuple ({})",
                tuple.worker()
            )));
        }
    }

    let old = tuple.status();
    if old == new {
        return Err(Error::bad_request(format!(
            "cannot update {} {key}: status already {new}",
            T::OBJECT
        )));
    }

    let stored: T = ledger.get_asset(key)?;
    if stored.status() != old {
        warn!(key, stored = %stored.status(), expected = %old, "stale {} status", T::OBJECT);
        return Err(Error::internal(format!(
            "stale {} {key}: stored status {}, expected {old}",
            T::OBJECT,
            stored.status()
        )));
    }

    old.check_transition(new)
        .map_err(|e| e.into_bad_request(format!("update {} {key} failed", T::OBJECT)))?;

    let old_attributes = tuple.worker_status_attributes(old, key).map(str::to_string);
    tuple.set_status(new);
    ledger.put_asset(key, &*tuple)?;
    let new_attributes = tuple.worker_status_attributes(new, key).map(str::to_string);
    ledger.update_index(T::WORKER_STATUS_INDEX, &old_attributes, &new_attributes)?;

    info!(key, from = %old, to = %new, ?actor, "{} status updated", T::OBJECT);
    Ok(())
}
