//! Dependency cascade.
//!
//! When a traintuple reaches `done` or `failed`, its waiting children are
//! re-evaluated. Traintuple children are found through the `inModel` index,
//! testtuple children through the `traintuple~certified` index. A child that
//! becomes `todo` is collected for the invocation's event. A traintuple child
//! failed by its parent cascades in turn, so failure reaches every descendant.

use tracing::{debug, warn};
use tuple_ledger_core::event::EventBatch;
use tuple_ledger_core::identity::{TESTTUPLE_OBJECT, TRAINTUPLE_OBJECT};
use tuple_ledger_core::index::IndexName;
use tuple_ledger_core::status::Status;
use tuple_ledger_core::traits::{Ledger, LedgerExt};
use tuple_ledger_core::tuple::{Model, Testtuple, Traintuple};
use tuple_ledger_core::{Error, Result};

use crate::query::{testtuple_view, traintuple_view};
use crate::transition::{commit_status_update, StatusActor};

/// Whether every parent of `child` other than `done_parent_key` is done.
pub fn is_ready<L: Ledger + ?Sized>(ledger: &L, child: &Traintuple, done_parent_key: &str) -> Result<bool> {
    for parent_key in child.in_model_keys.iter().filter(|k| *k != done_parent_key) {
        let parent: Traintuple = ledger.get_asset(parent_key)?;
        if parent.status != Status::Done {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Update the traintuples consuming `parent`'s model.
///
/// Each consumed `inModel` entry is removed. Children already failed are left
/// alone; any other child that is not waiting means the ledger is inconsistent.
/// Returns the children failed by this call so their own children can follow.
pub fn update_traintuple_children<L: Ledger + ?Sized>(
    ledger: &mut L,
    parent_key: &str,
    parent: &Traintuple,
    batch: &mut EventBatch,
) -> Result<Vec<(String, Traintuple)>> {
    let mut failed = Vec::new();
    let children =
        ledger.keys_by_index(IndexName::TraintupleInModel, &[TRAINTUPLE_OBJECT, parent_key])?;

    for child_key in children {
        let mut child: Traintuple = ledger.get_asset(&child_key)?;
        ledger.delete_index(
            IndexName::TraintupleInModel,
            &[TRAINTUPLE_OBJECT, parent_key, child_key.as_str()],
        )?;

        match child.status {
            Status::Failed => continue,
            Status::Waiting => {}
            other => {
                warn!(child = %child_key, status = %other, "traintuple child is not waiting");
                return Err(Error::internal(format!(
                    "traintuple {child_key} has invalid status : '{other}' instead of waiting"
                )));
            }
        }

        match parent.status {
            Status::Failed => {
                commit_status_update(ledger, &child_key, &mut child, Status::Failed, StatusActor::Cascade)?;
                debug!(parent = parent_key, child = %child_key, "traintuple failed by parent");
                failed.push((child_key, child));
            }
            Status::Done => {
                if !is_ready(ledger, &child, parent_key)? {
                    debug!(parent = parent_key, child = %child_key, "traintuple still waiting");
                    continue;
                }
                commit_status_update(ledger, &child_key, &mut child, Status::Todo, StatusActor::Cascade)?;
                batch.push_traintuple(traintuple_view(ledger, &child_key, &child)?);
            }
            _ => {}
        }
    }
    Ok(failed)
}

/// Update the testtuples evaluating `parent`'s model.
///
/// On success a waiting testtuple becomes `todo` and learns the model hash and
/// address. On failure every testtuple not already failed is failed.
pub fn update_testtuple_children<L: Ledger + ?Sized>(
    ledger: &mut L,
    parent_key: &str,
    parent: &Traintuple,
    batch: &mut EventBatch,
) -> Result<()> {
    let new_status = match parent.status {
        Status::Done => Status::Todo,
        Status::Failed => Status::Failed,
        _ => return Ok(()),
    };

    let children = ledger.keys_by_index(
        IndexName::TesttupleTraintupleCertified,
        &[TESTTUPLE_OBJECT, parent_key],
    )?;
    for child_key in children {
        let mut child: Testtuple = ledger.get_asset(&child_key)?;
        if child.status == Status::Failed {
            continue;
        }

        if new_status == Status::Todo {
            if child.status != Status::Waiting {
                warn!(child = %child_key, status = %child.status, "testtuple child is not waiting");
                return Err(Error::internal(format!(
                    "testtuple {child_key} has invalid status : '{}' instead of waiting",
                    child.status
                )));
            }
            let out_model = parent.out_model.as_ref().ok_or_else(|| {
                Error::internal(format!("traintuple {parent_key} is done without out model"))
            })?;
            child.model = Model::from_out_model(parent_key, out_model);
        }

        commit_status_update(ledger, &child_key, &mut child, new_status, StatusActor::Cascade)?;
        if new_status == Status::Todo {
            batch.push_testtuple(testtuple_view(ledger, &child_key, &child)?);
        }
    }
    Ok(())
}

/// Propagate a terminal status of `root` to all its descendants.
///
/// On success, traintuple children are updated before testtuple children; on
/// failure the order is reversed. Descendants failed along the way are
/// processed depth-first with an explicit stack.
pub fn propagate<L: Ledger + ?Sized>(
    ledger: &mut L,
    root_key: &str,
    root: &Traintuple,
) -> Result<EventBatch> {
    let mut batch = EventBatch::new();
    match root.status {
        Status::Done => {
            // children can only be failed on the failure path
            update_traintuple_children(ledger, root_key, root, &mut batch)?;
            update_testtuple_children(ledger, root_key, root, &mut batch)?;
        }
        Status::Failed => {
            let mut pending = vec![(root_key.to_string(), root.clone())];
            while let Some((key, traintuple)) = pending.pop() {
                update_testtuple_children(ledger, &key, &traintuple, &mut batch)?;
                pending.extend(update_traintuple_children(ledger, &key, &traintuple, &mut batch)?);
            }
        }
        _ => {}
    }
    Ok(batch)
}
