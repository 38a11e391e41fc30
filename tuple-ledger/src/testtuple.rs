//! Testtuple construction and persistence.

use tracing::debug;
use tuple_ledger_core::assets::{DataManager, Objective};
use tuple_ledger_core::status::Status;
use tuple_ledger_core::traits::{Ledger, LedgerExt};
use tuple_ledger_core::tuple::{Model, Testtuple, Traintuple, TtDataset};
use tuple_ledger_core::{Error, Result};

use crate::config::ContractConfig;
use crate::dataset::resolve_dataset;

/// Evaluation data as requested by the caller. Empty fields mean "not provided".
#[derive(Debug, Clone, Copy)]
pub struct EvaluationRequest<'a> {
    pub data_manager_key: &'a str,
    pub data_sample_keys: &'a [String],
    pub tag: &'a str,
}

/// Bind a new testtuple to its traintuple.
///
/// Copies algo and objective, references the model, and derives the status:
/// `todo` if the traintuple is done, `waiting` while it runs, rejected if it failed.
pub fn set_from_traintuple<L: Ledger + ?Sized>(ledger: &L, traintuple_key: &str) -> Result<Testtuple> {
    let traintuple: Traintuple = ledger.get_asset(traintuple_key).map_err(|e| {
        e.into_bad_request(format!("could not retrieve traintuple with key {traintuple_key}"))
    })?;

    let status = match traintuple.status {
        Status::Done => Status::Todo,
        Status::Failed => {
            return Err(Error::bad_request(format!(
                "could not register this testtuple, the traintuple {traintuple_key} has a failed status"
            )))
        }
        _ => Status::Waiting,
    };
    let model = match &traintuple.out_model {
        Some(out_model) => Model::from_out_model(traintuple_key, out_model),
        None => Model::pending(traintuple_key),
    };

    Ok(Testtuple {
        algo_key: traintuple.algo_key,
        objective_key: traintuple.objective_key,
        model,
        status,
        ..Testtuple::default()
    })
}

/// Fill creator, tag, evaluation dataset and certification.
///
/// `testtuple.objective_key` must already be set. The dataset is either the
/// caller's (data manager and samples together) or the objective's own test
/// dataset; the testtuple is certified when the two coincide.
pub fn set_from_input<L: Ledger + ?Sized>(
    ledger: &L,
    config: &ContractConfig,
    testtuple: &mut Testtuple,
    request: EvaluationRequest<'_>,
) -> Result<()> {
    testtuple.creator = ledger.tx_creator()?;
    testtuple.permissions = config.default_permissions.clone();
    testtuple.tag = request.tag.to_string();

    let objective: Objective = ledger.get_asset(&testtuple.objective_key).map_err(|e| {
        e.into_bad_request(format!(
            "could not retrieve objective with key {}",
            testtuple.objective_key
        ))
    })?;
    let objective_dataset = objective.test_dataset.map(|mut dataset| {
        dataset.data_sample_keys.sort();
        dataset
    });

    let has_manager = !request.data_manager_key.is_empty();
    let has_samples = !request.data_sample_keys.is_empty();
    let (data_manager_key, data_sample_keys, certified) = match (has_manager, has_samples) {
        (true, true) => {
            resolve_dataset(ledger, request.data_manager_key, request.data_sample_keys)?;
            let mut samples = request.data_sample_keys.to_vec();
            samples.sort();
            let certified = objective_dataset.as_ref().is_some_and(|reference| {
                reference.data_manager_key == request.data_manager_key
                    && reference.data_sample_keys == samples
            });
            (request.data_manager_key.to_string(), samples, certified)
        }
        (true, false) | (false, true) => {
            return Err(Error::bad_request(
                "invalid input: dataManagerKey and dataSampleKey should be provided together",
            ))
        }
        (false, false) => match objective_dataset {
            Some(reference) => (reference.data_manager_key, reference.data_sample_keys, true),
            None => {
                return Err(Error::bad_request(format!(
                    "can not create a certified testtuple, no data associated with objective {}",
                    testtuple.objective_key
                )))
            }
        },
    };

    let data_manager: DataManager = ledger.get_asset(&data_manager_key).map_err(|e| {
        e.into_bad_request(format!("could not retrieve dataManager with key {data_manager_key}"))
    })?;

    testtuple.certified = certified;
    testtuple.dataset = TtDataset {
        worker: data_manager.owner,
        data_sample_keys,
        opener_hash: data_manager_key,
        perf: 0.0,
    };
    Ok(())
}

/// Write the record, then every index entry.
pub fn save<L: Ledger + ?Sized>(ledger: &mut L, testtuple: &Testtuple, key: &str) -> Result<()> {
    ledger.put_asset(key, testtuple)?;
    for (index, attributes) in testtuple.index_entries(key) {
        ledger.create_index(index, &attributes)?;
    }
    debug!(key, status = %testtuple.status, certified = testtuple.certified, "testtuple saved");
    Ok(())
}
