use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

use tuple_ledger::prelude::*;

/// Ledger holding a compute plan of `depth` chained steps, all on org1.
fn chained_plan(depth: usize) -> (MemoryLedger, String) {
    let mut ledger = MemoryLedger::new();
    ledger
        .transact("org1", |tx| {
            tx.put_asset("algo", &Algo::new("algo", HashDress::new("a", "a"), "org1"))?;
            tx.put_asset(
                "objective",
                &Objective::new("objective", HashDress::new("d", "d"), HashDressName::default(), "org1")
                    .with_test_dataset("dm", &["test"]),
            )?;
            tx.put_asset("dm", &DataManager::new("dm", HashDress::new("o", "o"), "org1"))?;
            tx.put_asset("train", &DataSample::new(&["dm"], "org1", false))?;
            tx.put_asset("test", &DataSample::new(&["dm"], "org1", true))
        })
        .unwrap();

    let ids: Vec<String> = (0..depth).map(|i| format!("step-{i}")).collect();
    let traintuples = ids
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let step = ComputePlanTraintuple::new(id, "dm", &["train"]);
            match i.checked_sub(1) {
                Some(parent) => step.with_in_models(&[ids[parent].as_str()]),
                None => step,
            }
        })
        .collect();
    let testtuples = ids.iter().map(|id| ComputePlanTesttuple::certified(id)).collect();
    let input = ComputePlanInput {
        algo_key: "algo".to_string(),
        objective_key: "objective".to_string(),
        traintuples,
        testtuples,
    };

    let config = ContractConfig::default();
    let contract = Contract::new(&config);
    let output = ledger
        .transact("org1", |tx| contract.create_compute_plan(tx, &input))
        .unwrap()
        .value;
    (ledger, output.fl_task)
}

pub fn failure_cascade(c: &mut Criterion) {
    let config = ContractConfig::default();
    let contract = Contract::new(&config);
    let mut group = c.benchmark_group("log_fail_train cascade");
    for depth in [1usize, 10, 50] {
        let (ledger, root) = chained_plan(depth);
        let input = LogFailInput {
            key: root,
            log: "failed".to_string(),
        };
        group.bench_with_input(BenchmarkId::from_parameter(depth), &input, |b, input| {
            b.iter_batched(
                || ledger.clone(),
                |mut ledger| {
                    ledger
                        .transact("org1", |tx| contract.log_fail_train(tx, black_box(input)))
                        .unwrap()
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

pub fn success_release(c: &mut Criterion) {
    let config = ContractConfig::default();
    let contract = Contract::new(&config);
    let (mut ledger, root) = chained_plan(10);
    ledger
        .transact("org1", |tx| contract.log_start_train(tx, &root))
        .unwrap();
    let input = LogSuccessTrainInput {
        key: root,
        log: "done".to_string(),
        out_model: HashDress::new("m", "m"),
        perf: 0.5,
    };

    c.bench_function("log_success_train releases child", |b| {
        b.iter_batched(
            || ledger.clone(),
            |mut ledger| {
                ledger
                    .transact("org1", |tx| contract.log_success_train(tx, black_box(&input)))
                    .unwrap()
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, failure_cascade, success_release);
criterion_main!(benches);
