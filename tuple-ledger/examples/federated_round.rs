//! Federated training round demo.
//!
//! Demonstrates:
//! 1. Seeding algo, objective, data managers and samples for two organisations
//! 2. Submitting a compute plan that alternates between the organisations
//! 3. Workers polling their `todo` queue and reporting results
//! 4. Dependency cascade releasing the next step and the evaluations
//! 5. Snapshot + offline HTML report
//!
//! Run: `cargo run -p tuple-ledger --example federated_round`

use tracing_subscriber::EnvFilter;
use tuple_ledger::prelude::*;
use tuple_ledger::query;
use tuple_ledger::report;

const ORGS: [&str; 2] = ["org1", "org2"];

fn seed(ledger: &mut MemoryLedger) {
    ledger
        .transact("org1", |tx| {
            tx.put_asset("algo", &Algo::new("fedavg", HashDress::new("h-algo", "http://org1/algo"), "org1"))?;
            tx.put_asset(
                "objective",
                &Objective::new(
                    "auc",
                    HashDress::new("h-desc", "http://org1/objective"),
                    HashDressName {
                        name: "auc".to_string(),
                        hash: "h-metrics".to_string(),
                        storage_address: "http://org1/metrics".to_string(),
                    },
                    "org1",
                )
                .with_test_dataset("dm-org1", &["org1-test"]),
            )?;
            for org in ORGS {
                let dm = format!("dm-{org}");
                tx.put_asset(&dm, &DataManager::new(&dm, HashDress::new(format!("h-{dm}"), format!("http://{org}/opener")), org))?;
                tx.put_asset(&format!("{org}-train"), &DataSample::new(&[dm.as_str()], org, false))?;
            }
            tx.put_asset("org1-test", &DataSample::new(&["dm-org1"], "org1", true))
        })
        .unwrap();
}

fn plan(rounds: usize) -> ComputePlanInput {
    let mut traintuples = Vec::new();
    for round in 0..rounds {
        let org = ORGS[round % ORGS.len()];
        let id = format!("round-{round}");
        let step = ComputePlanTraintuple::new(&id, &format!("dm-{org}"), &[format!("{org}-train").as_str()]);
        traintuples.push(if round == 0 {
            step
        } else {
            step.with_in_models(&[format!("round-{}", round - 1).as_str()])
        });
    }
    ComputePlanInput {
        algo_key: "algo".to_string(),
        objective_key: "objective".to_string(),
        testtuples: vec![ComputePlanTesttuple::certified(&format!("round-{}", rounds - 1))],
        traintuples,
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("Tuple Ledger Federated Round Demo");
    println!("=================================\n");

    let config = ContractConfig::default();
    let contract = Contract::new(&config);
    let mut ledger = MemoryLedger::new();

    seed(&mut ledger);
    println!("✓ Assets seeded for {}", ORGS.join(", "));

    let output = ledger
        .transact("org1", |tx| contract.create_compute_plan(tx, &plan(4)))
        .unwrap()
        .value;
    println!(
        "✓ Compute plan submitted: fl task {} ({} traintuples, {} testtuples)",
        &output.fl_task[..12],
        output.traintuple_keys.len(),
        output.testtuple_keys.len()
    );

    // Each pass lets every worker run whatever is in its todo queue.
    let mut pass = 0;
    loop {
        let mut ran = 0;
        for org in ORGS {
            let todo = query::query_worker_traintuples(&ledger.begin(org), org, Status::Todo).unwrap();
            for tt in todo {
                ledger.transact(org, |tx| contract.log_start_train(tx, &tt.key)).unwrap();
                let model = HashDress::new(format!("model-{}", &tt.key[..8]), format!("http://{org}/models"));
                let done = ledger
                    .transact(org, |tx| {
                        contract.log_success_train(
                            tx,
                            &LogSuccessTrainInput {
                                key: tt.key.clone(),
                                log: format!("pass {pass}"),
                                out_model: model,
                                perf: 0.5 + 0.1 * pass as f32,
                            },
                        )
                    })
                    .unwrap();
                println!(
                    "✓ {org} trained rank {:?} -> released {} tuple(s)",
                    tt.rank,
                    done.event
                        .as_ref()
                        .and_then(|e| TuplesEvent::from_payload(&e.payload).ok())
                        .map(|e| e.len())
                        .unwrap_or(0)
                );
                ran += 1;
            }

            let todo = query::query_worker_testtuples(&ledger.begin(org), org, Status::Todo).unwrap();
            for te in todo {
                ledger.transact(org, |tx| contract.log_start_test(tx, &te.key)).unwrap();
                let evaluated = ledger
                    .transact(org, |tx| {
                        contract.log_success_test(
                            tx,
                            &LogSuccessTestInput {
                                key: te.key.clone(),
                                log: "evaluated".to_string(),
                                perf: 0.87,
                            },
                        )
                    })
                    .unwrap();
                println!(
                    "✓ {org} evaluated model {} -> perf {}",
                    evaluated.value.model.hash, evaluated.value.dataset.perf
                );
                ran += 1;
            }
        }
        if ran == 0 {
            break;
        }
        pass += 1;
    }

    let models = contract.query_models(&ledger.begin("org1")).unwrap();
    let certified = models.iter().filter(|m| m.testtuple.is_some()).count();
    println!("✓ {} models, {certified} with a certified evaluation", models.len());

    let base = std::env::temp_dir().join("tuple_ledger_federated_round");
    std::fs::create_dir_all(&base).unwrap();
    let snapshot = base.join("ledger.snap");
    std::fs::write(&snapshot, ledger.snapshot().unwrap()).unwrap();
    println!("✓ Snapshot written: {} (height {})", snapshot.display(), ledger.height());

    let html = base.join("report.html");
    let summary = report::generate_report(&snapshot, &html, Some(base.join("report.json"))).unwrap();
    println!("✓ Report generated: {} ({:?})", html.display(), summary.status_counts());
}
