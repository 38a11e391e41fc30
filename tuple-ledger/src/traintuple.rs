//! Traintuple construction, federated-task linking and persistence.

use tracing::debug;
use tuple_ledger_core::assets::{Algo, Objective};
use tuple_ledger_core::identity::TRAINTUPLE_OBJECT;
use tuple_ledger_core::index::IndexName;
use tuple_ledger_core::status::Status;
use tuple_ledger_core::traits::{Ledger, LedgerExt};
use tuple_ledger_core::tuple::{Dataset, Traintuple};
use tuple_ledger_core::{Error, Result};

use crate::config::ContractConfig;
use crate::dataset::resolve_dataset;
use crate::input::TraintupleInput;

/// Build a traintuple from the fields that do not depend on other tuples.
///
/// The creator is the submitting identity and the worker is the owner of the
/// data manager. Only train samples are accepted.
pub fn set_from_input<L: Ledger + ?Sized>(
    ledger: &L,
    config: &ContractConfig,
    input: &TraintupleInput,
) -> Result<Traintuple> {
    let creator = ledger.tx_creator()?;

    ledger
        .get_asset::<Algo>(&input.algo_key)
        .map_err(|e| e.into_bad_request(format!("could not retrieve algo with key {}", input.algo_key)))?;
    ledger
        .get_asset::<Objective>(&input.objective_key)
        .map_err(|e| {
            e.into_bad_request(format!(
                "could not retrieve objective with key {}",
                input.objective_key
            ))
        })?;

    let resolved = resolve_dataset(ledger, &input.data_manager_key, &input.data_sample_keys)?;
    if !resolved.train_only {
        return Err(Error::bad_request(
            "not possible to create a traintuple with test only data",
        ));
    }

    Ok(Traintuple {
        creator,
        permissions: config.default_permissions.clone(),
        tag: input.tag.clone(),
        algo_key: input.algo_key.clone(),
        objective_key: input.objective_key.clone(),
        dataset: Dataset {
            data_manager_key: input.data_manager_key.clone(),
            data_sample_keys: input.data_sample_keys.clone(),
            worker: resolved.worker,
        },
        ..Traintuple::default()
    })
}

/// Record parents in order and derive the initial status.
///
/// The traintuple waits while any parent has no out model.
pub fn set_from_parents<L: Ledger + ?Sized>(
    ledger: &L,
    traintuple: &mut Traintuple,
    in_models: &[String],
) -> Result<()> {
    let mut status = Status::Todo;
    for parent_key in in_models {
        let parent: Traintuple = ledger.get_asset(parent_key).map_err(|e| {
            e.into_bad_request(format!("could not retrieve parent traintuple with key {parent_key}"))
        })?;
        if parent.out_model.is_none() {
            status = Status::Waiting;
        }
        traintuple.in_model_keys.push(parent_key.clone());
    }
    traintuple.status = status;
    Ok(())
}

/// Attach the traintuple to a federated-learning task.
///
/// - neither rank nor task: nothing to do
/// - rank without task: starts a new task keyed by this traintuple, rank must be 0
/// - rank and task: joins an existing task, same algo, free (worker, rank) slot
/// - task without rank: rejected
pub fn add_to_fl_task<L: Ledger + ?Sized>(
    ledger: &L,
    traintuple: &mut Traintuple,
    input: &TraintupleInput,
    key: &str,
) -> Result<()> {
    let rank = match (input.rank, input.fl_task()) {
        (None, None) => return Ok(()),
        (None, Some(_)) => {
            return Err(Error::bad_request(
                "invalid inputs, a FLTask should have a rank",
            ))
        }
        (Some(rank), _) => rank,
    };

    let Some(fl_task) = input.fl_task() else {
        if rank != 0 {
            return Err(Error::bad_request(
                "invalid inputs, a new FLTask should have a rank 0",
            ));
        }
        traintuple.rank = Some(rank);
        traintuple.fl_task = Some(key.to_string());
        return Ok(());
    };

    let members = ledger.keys_by_index(IndexName::TraintupleFlTask, &[TRAINTUPLE_OBJECT, fl_task])?;
    if members.is_empty() {
        return Err(Error::bad_request(format!("cannot find the FLTask {fl_task}")));
    }
    for member_key in &members {
        let member: Traintuple = ledger.get_asset(member_key)?;
        if member.algo_key != traintuple.algo_key {
            return Err(Error::bad_request(format!(
                "previous traintuple for FLTask {fl_task} does not have the same algo key {}",
                traintuple.algo_key
            )));
        }
    }

    let rank_str = rank.to_string();
    let taken = ledger.keys_by_index(
        IndexName::TraintupleFlTask,
        &[
            TRAINTUPLE_OBJECT,
            fl_task,
            traintuple.dataset.worker.as_str(),
            rank_str.as_str(),
        ],
    )?;
    if !taken.is_empty() {
        return Err(Error::bad_request(format!(
            "FLTask {fl_task} with worker {} rank {rank} already exists",
            traintuple.dataset.worker
        )));
    }

    traintuple.rank = Some(rank);
    traintuple.fl_task = Some(fl_task.to_string());
    Ok(())
}

/// Write the record, then every index entry.
///
/// A parent that already has an out model is not indexed as pending: the
/// cascade never visits this traintuple on its behalf.
pub fn save<L: Ledger + ?Sized>(ledger: &mut L, traintuple: &Traintuple, key: &str) -> Result<()> {
    ledger.put_asset(key, traintuple)?;
    for (index, attributes) in traintuple.index_entries(key) {
        if index == IndexName::TraintupleInModel {
            let parent: Traintuple = ledger.get_asset(&attributes[1])?;
            if parent.out_model.is_some() {
                continue;
            }
        }
        ledger.create_index(index, &attributes)?;
    }
    debug!(key, status = %traintuple.status, "traintuple saved");
    Ok(())
}
