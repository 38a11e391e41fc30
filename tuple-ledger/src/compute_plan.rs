//! Compute plans: a batch of linked traintuples forming one federated task,
//! plus the testtuples evaluating them.

use std::collections::HashMap;

use tracing::info;
use tuple_ledger_core::event::EventBatch;
use tuple_ledger_core::identity::{unique_key, TESTTUPLE_OBJECT, TRAINTUPLE_OBJECT};
use tuple_ledger_core::status::Status;
use tuple_ledger_core::traits::Ledger;
use tuple_ledger_core::tuple::{Model, Testtuple};
use tuple_ledger_core::{Error, Result};

use crate::config::ContractConfig;
use crate::input::{ComputePlanInput, ComputePlanOutput, TraintupleInput};
use crate::query::traintuple_view;
use crate::testtuple::{self, EvaluationRequest};
use crate::traintuple;

/// Create every tuple of a plan.
///
/// Training steps are processed in order and may only reference earlier
/// steps. The first step's key names the federated task and each step's rank
/// is its position. Steps without parents start `todo` and are collected for
/// the event; the others wait. Testtuples always start `waiting`.
pub fn create_compute_plan<L: Ledger + ?Sized>(
    ledger: &mut L,
    config: &ContractConfig,
    input: &ComputePlanInput,
) -> Result<(ComputePlanOutput, EventBatch)> {
    if input.traintuples.is_empty() {
        return Err(Error::bad_request("a compute plan needs at least one traintuple"));
    }

    let mut output = ComputePlanOutput::default();
    let mut batch = EventBatch::new();
    let mut keys_by_id: HashMap<&str, String> = HashMap::new();

    for (rank, step) in input.traintuples.iter().enumerate() {
        if keys_by_id.contains_key(step.id.as_str()) {
            return Err(Error::bad_request(format!(
                "traintuple ID {} is used more than once",
                step.id
            )));
        }

        let step_input = TraintupleInput {
            algo_key: input.algo_key.clone(),
            objective_key: input.objective_key.clone(),
            data_manager_key: step.data_manager_key.clone(),
            data_sample_keys: step.data_sample_keys.clone(),
            tag: step.tag.clone(),
            ..TraintupleInput::default()
        };
        let mut tt = traintuple::set_from_input(&*ledger, config, &step_input)?;

        for model_id in &step.in_models_ids {
            let parent_key = keys_by_id.get(model_id.as_str()).ok_or_else(|| {
                Error::bad_request(format!(
                    "traintuple ID {}: model ID {model_id} not found, check traintuple list order",
                    step.id
                ))
            })?;
            tt.in_model_keys.push(parent_key.clone());
        }

        let key = unique_key(&*ledger, TRAINTUPLE_OBJECT, &tt.key_elements())?;
        if rank == 0 {
            output.fl_task = key.clone();
        }
        tt.fl_task = Some(output.fl_task.clone());
        tt.rank = Some(rank as u32);

        if step.in_models_ids.is_empty() {
            tt.status = Status::Todo;
            traintuple::save(ledger, &tt, &key)?;
            batch.push_traintuple(traintuple_view(&*ledger, &key, &tt)?);
        } else {
            tt.status = Status::Waiting;
            traintuple::save(ledger, &tt, &key)?;
        }

        keys_by_id.insert(step.id.as_str(), key.clone());
        output.traintuple_keys.push(key);
    }

    for (index, step) in input.testtuples.iter().enumerate() {
        let traintuple_key = keys_by_id.get(step.traintuple_id.as_str()).ok_or_else(|| {
            Error::bad_request(format!(
                "testtuple index {index}: traintuple ID {} not found",
                step.traintuple_id
            ))
        })?;

        let mut te = Testtuple {
            model: Model::pending(traintuple_key.as_str()),
            algo_key: input.algo_key.clone(),
            objective_key: input.objective_key.clone(),
            ..Testtuple::default()
        };
        testtuple::set_from_input(
            &*ledger,
            config,
            &mut te,
            EvaluationRequest {
                data_manager_key: &step.data_manager_key,
                data_sample_keys: &step.data_sample_keys,
                tag: &step.tag,
            },
        )?;
        te.status = Status::Waiting;

        let key = unique_key(&*ledger, TESTTUPLE_OBJECT, &te.key_elements())?;
        testtuple::save(ledger, &te, &key)?;
        output.testtuple_keys.push(key);
    }

    info!(
        fl_task = %output.fl_task,
        traintuples = output.traintuple_keys.len(),
        testtuples = output.testtuple_keys.len(),
        "compute plan created"
    );
    Ok((output, batch))
}
