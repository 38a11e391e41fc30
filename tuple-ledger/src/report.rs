//! Standalone HTML report of a ledger snapshot.
//!
//! Reads a file written by [`MemoryLedger::snapshot`], verifies it, and renders
//! every tuple grouped by federated task without needing a running ledger.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tuple_ledger_core::identity::hex_lower;
use tuple_ledger_core::view::{TesttupleView, TraintupleView};
use tuple_ledger_store::MemoryLedger;

use crate::query;

/// Creator used for the read-only transaction a report is built from.
const REPORT_READER: &str = "report";

/// Report data loaded from a snapshot file.
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerReport {
    #[serde(serialize_with = "serialize_path")]
    pub snapshot_path: PathBuf,
    pub snapshot_sha256: String,
    pub height: u64,
    pub events: usize,
    pub traintuples: Vec<TraintupleView>,
    pub testtuples: Vec<TesttupleView>,
}

fn serialize_path<S: serde::Serializer>(path: &PathBuf, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&path.display().to_string())
}

fn invalid_data(e: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e.to_string())
}

impl LedgerReport {
    /// Build a report from raw snapshot bytes.
    pub fn from_snapshot(snapshot_path: impl Into<PathBuf>, bytes: &[u8]) -> io::Result<Self> {
        let ledger = MemoryLedger::from_snapshot(bytes).map_err(invalid_data)?;
        let tx = ledger.begin(REPORT_READER);
        let traintuples = query::query_traintuples(&tx).map_err(invalid_data)?;
        let testtuples = query::query_testtuples(&tx).map_err(invalid_data)?;

        Ok(Self {
            snapshot_path: snapshot_path.into(),
            snapshot_sha256: hex_lower(&Sha256::digest(bytes)),
            height: ledger.height(),
            events: ledger.events().len(),
            traintuples,
            testtuples,
        })
    }

    /// Tuple counts per status, traintuples and testtuples together.
    pub fn status_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        let statuses = self
            .traintuples
            .iter()
            .map(|t| t.status)
            .chain(self.testtuples.iter().map(|t| t.status));
        for status in statuses {
            *counts.entry(status.to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Traintuples grouped by federated task and ordered by rank.
    ///
    /// Traintuples outside any federated task are grouped under `""`.
    pub fn fl_tasks(&self) -> BTreeMap<&str, Vec<&TraintupleView>> {
        let mut tasks: BTreeMap<&str, Vec<&TraintupleView>> = BTreeMap::new();
        for traintuple in &self.traintuples {
            tasks
                .entry(traintuple.fl_task.as_deref().unwrap_or(""))
                .or_default()
                .push(traintuple);
        }
        for members in tasks.values_mut() {
            members.sort_by_key(|t| t.rank);
        }
        tasks
    }
}

pub fn load_report(snapshot_path: impl AsRef<Path>) -> io::Result<LedgerReport> {
    let snapshot_path = snapshot_path.as_ref().to_path_buf();
    let bytes = fs::read(&snapshot_path)?;
    LedgerReport::from_snapshot(snapshot_path, &bytes)
}

/// Generate the HTML report, plus a JSON dump when `json_out` is given.
pub fn generate_report(
    snapshot_path: impl AsRef<Path>,
    html_out: impl AsRef<Path>,
    json_out: Option<impl AsRef<Path>>,
) -> io::Result<LedgerReport> {
    let report = load_report(&snapshot_path)?;
    fs::write(&html_out, render_html(&report))?;

    if let Some(json_path) = json_out {
        let json = serde_json::to_string_pretty(&report).map_err(io::Error::other)?;
        fs::write(json_path, json)?;
    }

    Ok(report)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\"', "&quot;")
        .replace('\'', "&#39;")
}

fn short_key(key: &str) -> &str {
    key.get(..12).unwrap_or(key)
}

fn render_traintuples(report: &LedgerReport) -> String {
    let mut out = String::new();
    for (fl_task, members) in report.fl_tasks() {
        let title = if fl_task.is_empty() {
            "standalone".to_string()
        } else {
            format!("fl task {}", short_key(fl_task))
        };
        out.push_str(&format!("<h3>{}</h3>", escape_html(&title)));
        out.push_str("<table><thead><tr><th>rank</th><th>key</th><th>worker</th><th>status</th><th>in models</th><th>perf</th><th>tag</th></tr></thead><tbody>");
        for t in members {
            let in_models = t
                .in_models
                .iter()
                .map(|m| short_key(&m.traintuple_key))
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!(
                "<tr><td>{}</td><td class=\"mono\">{}</td><td>{}</td><td class=\"st-{}\">{}</td><td class=\"mono\">{}</td><td>{}</td><td>{}</td></tr>",
                t.rank.map(|r| r.to_string()).unwrap_or_default(),
                escape_html(&t.key),
                escape_html(&t.dataset.worker),
                t.status,
                t.status,
                escape_html(&in_models),
                t.dataset.perf,
                escape_html(&t.tag),
            ));
        }
        out.push_str("</tbody></table>");
    }
    out
}

fn render_testtuples(report: &LedgerReport) -> String {
    let mut out = String::new();
    out.push_str("<table><thead><tr><th>key</th><th>model</th><th>worker</th><th>certified</th><th>status</th><th>perf</th><th>tag</th></tr></thead><tbody>");
    for t in &report.testtuples {
        out.push_str(&format!(
            "<tr><td class=\"mono\">{}</td><td class=\"mono\">{}</td><td>{}</td><td>{}</td><td class=\"st-{}\">{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&t.key),
            escape_html(short_key(&t.model.traintuple_key)),
            escape_html(&t.dataset.worker),
            t.certified,
            t.status,
            t.status,
            t.dataset.perf,
            escape_html(&t.tag),
        ));
    }
    out.push_str("</tbody></table>");
    out
}

pub fn render_html(report: &LedgerReport) -> String {
    let mut html = String::new();
    html.push_str("<!doctype html><html><head><meta charset=\"utf-8\"/>");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width,initial-scale=1\"/>");
    html.push_str("<title>Tuple Ledger Report</title>");
    html.push_str("<style>body{font:15px ui-sans-serif,system-ui,-apple-system,Segoe UI,Roboto,Helvetica,Arial,sans-serif;max-width:1100px;margin:24px auto;padding:0 16px;color:#111}h1,h2,h3{margin:18px 0 10px}code,.mono{font-family:ui-monospace,SFMono-Regular,Menlo,Monaco,monospace;font-size:13px}table{border-collapse:collapse;width:100%;margin:8px 0 16px}th,td{border:1px solid #ddd;padding:8px;vertical-align:top}th{background:#fafafa;text-align:left}section{margin:18px 0 22px}.st-failed{color:#b00020;font-weight:600}.st-done{color:#2e7d32}</style>");
    html.push_str("</head><body>");
    html.push_str("<h1>Tuple Ledger Report</h1>");

    html.push_str(&format!(
        "<p><strong>Snapshot:</strong> <code>{}</code><br/><strong>sha256:</strong> <code>{}</code><br/><strong>height:</strong> {} <strong>events:</strong> {}</p>",
        escape_html(&report.snapshot_path.display().to_string()),
        escape_html(&report.snapshot_sha256),
        report.height,
        report.events,
    ));

    html.push_str("<section><h2>Status</h2><table><thead><tr><th>status</th><th>tuples</th></tr></thead><tbody>");
    for (status, count) in report.status_counts() {
        html.push_str(&format!(
            "<tr><td class=\"st-{status}\">{status}</td><td>{count}</td></tr>"
        ));
    }
    html.push_str("</tbody></table></section>");

    html.push_str("<section><h2>Traintuples</h2>");
    if report.traintuples.is_empty() {
        html.push_str("<p>(no traintuples in this snapshot)</p>");
    } else {
        html.push_str(&render_traintuples(report));
    }
    html.push_str("</section>");

    html.push_str("<section><h2>Testtuples</h2>");
    html.push_str(&render_testtuples(report));
    html.push_str("</section>");

    html.push_str("</body></html>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};
    use tuple_ledger_core::assets::{Algo, DataManager, DataSample, HashDress, HashDressName, Objective};
    use tuple_ledger_core::status::Status;
    use tuple_ledger_core::traits::LedgerExt;

    use crate::input::{ComputePlanInput, ComputePlanTesttuple, ComputePlanTraintuple};
    use crate::{Contract, ContractConfig};

    fn temp_dir(prefix: &str) -> PathBuf {
        let pid = std::process::id();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let mut dir = std::env::temp_dir();
        dir.push(format!("tuple_ledger_{prefix}_{pid}_{nanos}"));
        dir
    }

    fn seeded() -> MemoryLedger {
        let mut ledger = MemoryLedger::new();
        ledger
            .transact("org1", |tx| {
                tx.put_asset("algo", &Algo::new("sgd", HashDress::new("a", "a"), "org1"))?;
                tx.put_asset(
                    "objective",
                    &Objective::new("acc", HashDress::new("d", "d"), HashDressName::default(), "org1")
                        .with_test_dataset("dm1", &["test1"]),
                )?;
                tx.put_asset("dm1", &DataManager::new("dm1", HashDress::new("o", "o"), "org1"))?;
                tx.put_asset("train1", &DataSample::new(&["dm1"], "org1", false))?;
                tx.put_asset("test1", &DataSample::new(&["dm1"], "org1", true))
            })
            .unwrap();

        let config = ContractConfig::default();
        let contract = Contract::new(&config);
        let plan = ComputePlanInput {
            algo_key: "algo".to_string(),
            objective_key: "objective".to_string(),
            traintuples: vec![
                ComputePlanTraintuple::new("a", "dm1", &["train1"]),
                ComputePlanTraintuple::new("b", "dm1", &["train1"]).with_in_models(&["a"]),
            ],
            testtuples: vec![ComputePlanTesttuple::certified("b")],
        };
        ledger
            .transact("org1", |tx| contract.create_compute_plan(tx, &plan))
            .unwrap();
        ledger
    }

    #[test]
    fn report_lists_every_tuple_with_counts() {
        let ledger = seeded();
        let bytes = ledger.snapshot().unwrap();
        let report = LedgerReport::from_snapshot("ledger.snap", &bytes).unwrap();

        assert_eq!(report.traintuples.len(), 2);
        assert_eq!(report.testtuples.len(), 1);
        assert_eq!(report.height, 2);
        assert_eq!(report.events, 1);
        assert_eq!(report.snapshot_sha256.len(), 64);

        let counts = report.status_counts();
        assert_eq!(counts.get(Status::Todo.as_str()), Some(&1));
        assert_eq!(counts.get(Status::Waiting.as_str()), Some(&2));
    }

    #[test]
    fn fl_task_members_are_ordered_by_rank() {
        let bytes = seeded().snapshot().unwrap();
        let report = LedgerReport::from_snapshot("ledger.snap", &bytes).unwrap();
        let tasks = report.fl_tasks();

        assert_eq!(tasks.len(), 1);
        let ranks: Vec<_> = tasks.values().next().unwrap().iter().map(|t| t.rank).collect();
        assert_eq!(ranks, vec![Some(0), Some(1)]);
    }

    #[test]
    fn corrupt_snapshot_is_invalid_data() {
        let mut bytes = seeded().snapshot().unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        let err = LedgerReport::from_snapshot("ledger.snap", &bytes).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn html_escapes_user_text() {
        assert_eq!(escape_html("<b a='1'>&"), "&lt;b a=&#39;1&#39;&gt;&amp;");
    }

    #[test]
    fn generate_report_writes_html_and_json() {
        let base = temp_dir("generate_report");
        let _ = fs::remove_dir_all(&base);
        fs::create_dir_all(&base).unwrap();

        let snapshot = base.join("ledger.snap");
        fs::write(&snapshot, seeded().snapshot().unwrap()).unwrap();
        let html_out = base.join("report.html");
        let json_out = base.join("report.json");

        let report = generate_report(&snapshot, &html_out, Some(&json_out)).unwrap();

        let html = fs::read_to_string(&html_out).unwrap();
        assert!(html.contains("Tuple Ledger Report"));
        assert!(html.contains(&report.traintuples[0].key));

        let json: serde_json::Value = serde_json::from_slice(&fs::read(&json_out).unwrap()).unwrap();
        assert_eq!(json["height"], 2);
        assert_eq!(json["traintuples"].as_array().unwrap().len(), 2);

        let _ = fs::remove_dir_all(&base);
    }
}
