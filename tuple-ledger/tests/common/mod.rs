//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use tuple_ledger::prelude::*;

pub const ALGO: &str = "algo-sgd";
pub const OTHER_ALGO: &str = "algo-adam";
pub const OBJECTIVE: &str = "objective-accuracy";
/// Owned by org1, holds the objective's test dataset
pub const DM1: &str = "dm-org1";
/// Owned by org2
pub const DM2: &str = "dm-org2";

pub const TRAIN1: &str = "sample-train-1";
pub const TRAIN2: &str = "sample-train-2";
pub const TEST1: &str = "sample-test-1";
pub const TEST2: &str = "sample-test-2";
pub const TRAIN_ORG2: &str = "sample-train-org2";

pub const ORG1: &str = "org1";
pub const ORG2: &str = "org2";

pub fn seeded_ledger() -> MemoryLedger {
    let mut ledger = MemoryLedger::new();
    ledger
        .transact(ORG1, |tx| {
            tx.put_asset(ALGO, &Algo::new("sgd", HashDress::new("h-sgd", "http://algo/sgd"), ORG1))?;
            tx.put_asset(
                OTHER_ALGO,
                &Algo::new("adam", HashDress::new("h-adam", "http://algo/adam"), ORG1),
            )?;
            tx.put_asset(
                OBJECTIVE,
                &Objective::new(
                    "accuracy",
                    HashDress::new("h-desc", "http://objective/desc"),
                    HashDressName {
                        name: "accuracy".to_string(),
                        hash: "h-metrics".to_string(),
                        storage_address: "http://objective/metrics".to_string(),
                    },
                    ORG1,
                )
                .with_test_dataset(DM1, &[TEST1, TEST2]),
            )?;
            tx.put_asset(DM1, &DataManager::new("dm1", HashDress::new("h-op1", "http://dm1"), ORG1))?;
            tx.put_asset(DM2, &DataManager::new("dm2", HashDress::new("h-op2", "http://dm2"), ORG2))?;
            tx.put_asset(TRAIN1, &DataSample::new(&[DM1], ORG1, false))?;
            tx.put_asset(TRAIN2, &DataSample::new(&[DM1], ORG1, false))?;
            tx.put_asset(TEST1, &DataSample::new(&[DM1], ORG1, true))?;
            tx.put_asset(TEST2, &DataSample::new(&[DM1], ORG1, true))?;
            tx.put_asset(TRAIN_ORG2, &DataSample::new(&[DM2], ORG2, false))
        })
        .unwrap();
    ledger
}

pub fn traintuple_input() -> TraintupleInput {
    TraintupleInput::new(ALGO, OBJECTIVE, DM1, &[TRAIN1, TRAIN2])
}

pub fn create_traintuple(
    ledger: &mut MemoryLedger,
    config: &ContractConfig,
    input: &TraintupleInput,
) -> Result<String> {
    let contract = Contract::new(config);
    Ok(ledger
        .transact(ORG1, |tx| contract.create_traintuple(tx, input))?
        .value
        .key)
}

pub fn success_train(key: &str, model_hash: &str) -> LogSuccessTrainInput {
    LogSuccessTrainInput {
        key: key.to_string(),
        log: "trained".to_string(),
        out_model: HashDress::new(model_hash, format!("http://models/{model_hash}")),
        perf: 0.9,
    }
}

pub fn fail(key: &str) -> LogFailInput {
    LogFailInput {
        key: key.to_string(),
        log: "crashed".to_string(),
    }
}

/// Decode the `tuples-updated` event of the last committed invocation.
pub fn last_event(ledger: &MemoryLedger) -> TuplesEvent {
    let event = ledger.last_event().expect("an invocation set no event");
    assert_eq!(event.name, EVENT_TUPLES_UPDATED);
    TuplesEvent::from_payload(&event.payload).unwrap()
}

pub fn traintuple(ledger: &MemoryLedger, key: &str) -> Traintuple {
    ledger.begin(ORG1).get_asset(key).unwrap()
}

pub fn testtuple(ledger: &MemoryLedger, key: &str) -> Testtuple {
    ledger.begin(ORG1).get_asset(key).unwrap()
}

/// Keys of `worker`'s traintuples in `status`, read through the index.
pub fn worker_traintuples(ledger: &MemoryLedger, worker: &str, status: Status) -> Vec<String> {
    ledger
        .begin(ORG1)
        .keys_by_index(
            IndexName::TraintupleWorkerStatus,
            &[TRAINTUPLE_OBJECT, worker, status.as_str()],
        )
        .unwrap()
}

pub fn worker_testtuples(ledger: &MemoryLedger, worker: &str, status: Status) -> Vec<String> {
    ledger
        .begin(ORG1)
        .keys_by_index(
            IndexName::TesttupleWorkerStatus,
            &[TESTTUPLE_OBJECT, worker, status.as_str()],
        )
        .unwrap()
}
