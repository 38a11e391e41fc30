//! Read-side projections.

use tuple_ledger_core::assets::{Algo, Objective};
use tuple_ledger_core::identity::{TESTTUPLE_OBJECT, TRAINTUPLE_OBJECT};
use tuple_ledger_core::index::IndexName;
use tuple_ledger_core::status::Status;
use tuple_ledger_core::traits::{Ledger, LedgerExt};
use tuple_ledger_core::tuple::{Model, Testtuple, Traintuple};
use tuple_ledger_core::view::{
    AlgoView, ModelDetails, ModelView, ObjectiveView, TesttupleView, TraintupleDatasetView,
    TraintupleView,
};
use tuple_ledger_core::Result;

/// Project a traintuple, resolving its algo, objective and parent models.
pub fn traintuple_view<L: Ledger + ?Sized>(
    ledger: &L,
    key: &str,
    traintuple: &Traintuple,
) -> Result<TraintupleView> {
    let algo: Algo = ledger.get_asset(&traintuple.algo_key)?;
    let objective: Objective = ledger.get_asset(&traintuple.objective_key)?;

    let mut in_models = Vec::with_capacity(traintuple.in_model_keys.len());
    for parent_key in &traintuple.in_model_keys {
        let parent: Traintuple = ledger.get_asset(parent_key)?;
        in_models.push(match &parent.out_model {
            Some(out_model) => Model::from_out_model(parent_key.as_str(), out_model),
            None => Model::pending(parent_key.as_str()),
        });
    }

    Ok(TraintupleView {
        key: key.to_string(),
        creator: traintuple.creator.clone(),
        algo: AlgoView::from(&algo),
        objective: ObjectiveView::new(&traintuple.objective_key, &objective),
        dataset: TraintupleDatasetView {
            data_manager_key: traintuple.dataset.data_manager_key.clone(),
            data_sample_keys: traintuple.dataset.data_sample_keys.clone(),
            worker: traintuple.dataset.worker.clone(),
            perf: traintuple.perf,
        },
        in_models,
        out_model: traintuple.out_model.clone(),
        log: traintuple.log.clone(),
        permissions: traintuple.permissions.clone(),
        status: traintuple.status,
        tag: traintuple.tag.clone(),
        rank: traintuple.rank,
        fl_task: traintuple.fl_task.clone(),
    })
}

pub fn testtuple_view<L: Ledger + ?Sized>(
    ledger: &L,
    key: &str,
    testtuple: &Testtuple,
) -> Result<TesttupleView> {
    let algo: Algo = ledger.get_asset(&testtuple.algo_key)?;
    let objective: Objective = ledger.get_asset(&testtuple.objective_key)?;

    Ok(TesttupleView {
        key: key.to_string(),
        creator: testtuple.creator.clone(),
        algo: AlgoView::from(&algo),
        objective: ObjectiveView::new(&testtuple.objective_key, &objective),
        dataset: testtuple.dataset.clone(),
        model: testtuple.model.clone(),
        certified: testtuple.certified,
        log: testtuple.log.clone(),
        permissions: testtuple.permissions.clone(),
        status: testtuple.status,
        tag: testtuple.tag.clone(),
    })
}

pub fn query_traintuple<L: Ledger + ?Sized>(ledger: &L, key: &str) -> Result<TraintupleView> {
    let traintuple: Traintuple = ledger.get_asset(key)?;
    traintuple_view(ledger, key, &traintuple)
}

/// Every traintuple, in key order.
pub fn query_traintuples<L: Ledger + ?Sized>(ledger: &L) -> Result<Vec<TraintupleView>> {
    // the algo index orders by algo first
    let mut keys = ledger.keys_by_index(IndexName::TraintupleAlgo, &[TRAINTUPLE_OBJECT])?;
    keys.sort_unstable();
    keys.iter()
        .map(|key| query_traintuple(ledger, key))
        .collect()
}

pub fn query_testtuple<L: Ledger + ?Sized>(ledger: &L, key: &str) -> Result<TesttupleView> {
    let testtuple: Testtuple = ledger.get_asset(key)?;
    testtuple_view(ledger, key, &testtuple)
}

/// Every testtuple, grouped by traintuple.
pub fn query_testtuples<L: Ledger + ?Sized>(ledger: &L) -> Result<Vec<TesttupleView>> {
    ledger
        .keys_by_index(IndexName::TesttupleTraintupleCertified, &[TESTTUPLE_OBJECT])?
        .iter()
        .map(|key| query_testtuple(ledger, key))
        .collect()
}

/// A traintuple with its certified testtuple and every other evaluation.
pub fn query_model_details<L: Ledger + ?Sized>(ledger: &L, key: &str) -> Result<ModelDetails> {
    let traintuple = query_traintuple(ledger, key)?;

    let mut details = ModelDetails {
        traintuple,
        testtuple: None,
        non_certified_testtuples: Vec::new(),
    };
    for testtuple_key in
        ledger.keys_by_index(IndexName::TesttupleTraintupleCertified, &[TESTTUPLE_OBJECT, key])?
    {
        let view = query_testtuple(ledger, &testtuple_key)?;
        if view.certified {
            details.testtuple = Some(view);
        } else {
            details.non_certified_testtuples.push(view);
        }
    }
    Ok(details)
}

/// Every traintuple paired with its first certified testtuple.
pub fn query_models<L: Ledger + ?Sized>(ledger: &L) -> Result<Vec<ModelView>> {
    let mut models = Vec::new();
    for key in ledger.keys_by_index(IndexName::TraintupleAlgo, &[TRAINTUPLE_OBJECT])? {
        let traintuple = query_traintuple(ledger, &key)?;
        let certified = ledger.keys_by_index(
            IndexName::TesttupleTraintupleCertified,
            &[TESTTUPLE_OBJECT, key.as_str(), "true"],
        )?;
        let testtuple = match certified.first() {
            Some(testtuple_key) => Some(query_testtuple(ledger, testtuple_key)?),
            None => None,
        };
        models.push(ModelView { traintuple, testtuple });
    }
    Ok(models)
}

/// Traintuples assigned to `worker` currently in `status`.
pub fn query_worker_traintuples<L: Ledger + ?Sized>(
    ledger: &L,
    worker: &str,
    status: Status,
) -> Result<Vec<TraintupleView>> {
    ledger
        .keys_by_index(
            IndexName::TraintupleWorkerStatus,
            &[TRAINTUPLE_OBJECT, worker, status.as_str()],
        )?
        .iter()
        .map(|key| query_traintuple(ledger, key))
        .collect()
}

/// Testtuples assigned to `worker` currently in `status`.
pub fn query_worker_testtuples<L: Ledger + ?Sized>(
    ledger: &L,
    worker: &str,
    status: Status,
) -> Result<Vec<TesttupleView>> {
    ledger
        .keys_by_index(
            IndexName::TesttupleWorkerStatus,
            &[TESTTUPLE_OBJECT, worker, status.as_str()],
        )?
        .iter()
        .map(|key| query_testtuple(ledger, key))
        .collect()
}
