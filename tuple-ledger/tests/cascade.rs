//! Completion and failure propagation across dependent tuples.

mod common;

use common::*;
use tuple_ledger::prelude::*;

struct Chain {
    a: String,
    b: String,
    c: String,
    /// Certified evaluation of `b`
    test_b: String,
    /// Certified evaluation of `c`
    test_c: String,
}

/// a (org1) -> b (org1) -> c (org2), each later step evaluated.
fn chain(ledger: &mut MemoryLedger) -> Chain {
    let config = ContractConfig::default();
    let contract = Contract::new(&config);
    let input = ComputePlanInput {
        algo_key: ALGO.to_string(),
        objective_key: OBJECTIVE.to_string(),
        traintuples: vec![
            ComputePlanTraintuple::new("a", DM1, &[TRAIN1]),
            ComputePlanTraintuple::new("b", DM1, &[TRAIN2]).with_in_models(&["a"]),
            ComputePlanTraintuple::new("c", DM2, &[TRAIN_ORG2]).with_in_models(&["b"]),
        ],
        testtuples: vec![
            ComputePlanTesttuple::certified("b"),
            ComputePlanTesttuple::certified("c"),
        ],
    };
    let output = ledger
        .transact(ORG1, |tx| contract.create_compute_plan(tx, &input))
        .unwrap()
        .value;
    Chain {
        a: output.traintuple_keys[0].clone(),
        b: output.traintuple_keys[1].clone(),
        c: output.traintuple_keys[2].clone(),
        test_b: output.testtuple_keys[0].clone(),
        test_c: output.testtuple_keys[1].clone(),
    }
}

fn log_fail_train(ledger: &mut MemoryLedger, worker: &str, key: &str) -> Result<TraintupleView> {
    let config = ContractConfig::default();
    let contract = Contract::new(&config);
    Ok(ledger
        .transact(worker, |tx| contract.log_fail_train(tx, &fail(key)))?
        .value)
}

fn log_train(ledger: &mut MemoryLedger, worker: &str, key: &str) -> Result<TraintupleView> {
    let config = ContractConfig::default();
    let contract = Contract::new(&config);
    ledger.transact(worker, |tx| contract.log_start_train(tx, key))?;
    Ok(ledger
        .transact(worker, |tx| contract.log_success_train(tx, &success_train(key, key)))?
        .value)
}

#[test]
fn success_releases_children_and_moves_their_index_entries() {
    let mut ledger = seeded_ledger();
    let chain = chain(&mut ledger);
    assert_eq!(worker_traintuples(&ledger, ORG1, Status::Waiting), vec![chain.b.clone()]);

    log_train(&mut ledger, ORG1, &chain.a).unwrap();

    assert_eq!(traintuple(&ledger, &chain.b).status, Status::Todo);
    assert!(worker_traintuples(&ledger, ORG1, Status::Waiting).is_empty());
    assert_eq!(worker_traintuples(&ledger, ORG1, Status::Todo), vec![chain.b.clone()]);
    // grandchildren wait for their own parent
    assert_eq!(traintuple(&ledger, &chain.c).status, Status::Waiting);
    assert_eq!(testtuple(&ledger, &chain.test_b).status, Status::Waiting);

    let event = last_event(&ledger);
    assert_eq!(event.len(), 1);
    assert_eq!(event.traintuples[0].key, chain.b);
    assert_eq!(event.traintuples[0].status, Status::Todo);
}

#[test]
fn failure_reaches_every_descendant() {
    let mut ledger = seeded_ledger();
    let chain = chain(&mut ledger);

    // org1 fails the root; org2's traintuple follows without org2 submitting
    let failed = log_fail_train(&mut ledger, ORG1, &chain.a).unwrap();
    assert_eq!(failed.status, Status::Failed);

    for key in [&chain.a, &chain.b, &chain.c] {
        assert_eq!(traintuple(&ledger, key).status, Status::Failed, "traintuple {key}");
    }
    for key in [&chain.test_b, &chain.test_c] {
        assert_eq!(testtuple(&ledger, key).status, Status::Failed, "testtuple {key}");
    }

    assert_eq!(worker_traintuples(&ledger, ORG1, Status::Failed).len(), 2);
    assert_eq!(worker_traintuples(&ledger, ORG2, Status::Failed), vec![chain.c.clone()]);
    assert!(worker_traintuples(&ledger, ORG2, Status::Waiting).is_empty());
    assert_eq!(worker_testtuples(&ledger, ORG1, Status::Failed).len(), 2);

    // failures are not announced as work to pick up
    assert!(last_event(&ledger).is_empty());
}

#[test]
fn already_failed_descendants_are_left_alone() {
    let mut ledger = seeded_ledger();
    let chain = chain(&mut ledger);

    // b is failed by its worker while still waiting, taking c and both evaluations with it
    log_fail_train(&mut ledger, ORG1, &chain.b).unwrap();
    assert_eq!(traintuple(&ledger, &chain.c).status, Status::Failed);
    let c_before = traintuple(&ledger, &chain.c);

    log_fail_train(&mut ledger, ORG1, &chain.a).unwrap();
    assert_eq!(traintuple(&ledger, &chain.a).status, Status::Failed);
    assert_eq!(traintuple(&ledger, &chain.b).log, "crashed");
    assert_eq!(traintuple(&ledger, &chain.c), c_before);
}

#[test]
fn failing_a_done_traintuple_fails_its_released_evaluation() {
    let mut ledger = seeded_ledger();
    let chain = chain(&mut ledger);
    log_train(&mut ledger, ORG1, &chain.a).unwrap();
    log_train(&mut ledger, ORG1, &chain.b).unwrap();
    assert_eq!(testtuple(&ledger, &chain.test_b).status, Status::Todo);
    assert_eq!(traintuple(&ledger, &chain.c).status, Status::Todo);

    // c is todo and no longer indexed as a consumer of b
    log_fail_train(&mut ledger, ORG1, &chain.b).unwrap();
    assert_eq!(testtuple(&ledger, &chain.test_b).status, Status::Failed);
    assert_eq!(traintuple(&ledger, &chain.c).status, Status::Todo);
}

#[test]
fn child_created_after_its_parent_finished_survives_the_parent_failing() {
    let mut ledger = seeded_ledger();
    let config = ContractConfig::default();
    let parent = create_traintuple(&mut ledger, &config, &traintuple_input()).unwrap();
    log_train(&mut ledger, ORG1, &parent).unwrap();

    let input = TraintupleInput::new(ALGO, OBJECTIVE, DM1, &[TRAIN1]).with_in_models(&[parent.as_str()]);
    let child = create_traintuple(&mut ledger, &config, &input).unwrap();
    assert_eq!(traintuple(&ledger, &child).status, Status::Todo);
    assert_eq!(traintuple(&ledger, &child).in_model_keys, vec![parent.clone()]);
    let pending = ledger
        .begin(ORG1)
        .keys_by_index(IndexName::TraintupleInModel, &[TRAINTUPLE_OBJECT, parent.as_str()])
        .unwrap();
    assert!(pending.is_empty());

    let failed = log_fail_train(&mut ledger, ORG1, &parent).unwrap();
    assert_eq!(failed.status, Status::Failed);
    assert_eq!(traintuple(&ledger, &child).status, Status::Todo);
}

#[test]
fn inconsistent_child_aborts_the_whole_invocation() {
    let mut ledger = seeded_ledger();
    let chain = chain(&mut ledger);
    let config = ContractConfig::default();
    let contract = Contract::new(&config);
    ledger.transact(ORG1, |tx| contract.log_start_train(tx, &chain.a)).unwrap();

    // b claims to be running although its parent never finished
    ledger
        .transact(ORG1, |tx| {
            let mut b: Traintuple = tx.get_asset(&chain.b)?;
            b.status = Status::Doing;
            tx.put_asset(&chain.b, &b)
        })
        .unwrap();
    let before = ledger.clone();

    let err = ledger
        .transact(ORG1, |tx| contract.log_success_train(tx, &success_train(&chain.a, "ma")))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert_eq!(ledger, before);
    assert_eq!(traintuple(&ledger, &chain.a).status, Status::Doing);
}

#[test]
fn cascade_event_payload_is_json() {
    let mut ledger = seeded_ledger();
    let chain = chain(&mut ledger);
    log_train(&mut ledger, ORG1, &chain.a).unwrap();

    let event = ledger.last_event().unwrap();
    let payload: serde_json::Value = serde_json::from_slice(&event.payload).unwrap();
    assert_eq!(payload["traintuples"][0]["key"], chain.b.as_str());
    assert_eq!(payload["traintuples"][0]["status"], "todo");
    assert_eq!(payload["testtuples"].as_array().map(Vec::len), Some(0));
}
