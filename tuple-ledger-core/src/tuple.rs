//! Traintuple and testtuple records.

use serde::{Deserialize, Serialize};

use crate::assets::{AssetType, HashDress, PERMISSIONS_ALL};
use crate::identity::{TESTTUPLE_OBJECT, TRAINTUPLE_OBJECT};
use crate::index::IndexName;
use crate::status::Status;
use crate::traits::Asset;

/// Data a traintuple is trained on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub data_manager_key: String,
    pub data_sample_keys: Vec<String>,
    /// Owner of the data manager, the only identity allowed to report progress
    pub worker: String,
}

/// A training task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Traintuple {
    pub asset_type: AssetType,
    pub creator: String,
    pub permissions: String,
    pub tag: String,
    pub algo_key: String,
    pub objective_key: String,
    pub dataset: Dataset,
    /// Parent traintuples, in submission order
    pub in_model_keys: Vec<String>,
    /// Set when the task is done
    pub out_model: Option<HashDress>,
    pub perf: f32,
    pub log: String,
    pub status: Status,
    #[serde(rename = "fltask")]
    pub fl_task: Option<String>,
    pub rank: Option<u32>,
}

impl Default for Traintuple {
    fn default() -> Self {
        Self {
            asset_type: AssetType::Traintuple,
            creator: String::new(),
            permissions: PERMISSIONS_ALL.to_string(),
            tag: String::new(),
            algo_key: String::new(),
            objective_key: String::new(),
            dataset: Dataset::default(),
            in_model_keys: Vec::new(),
            out_model: None,
            perf: 0.0,
            log: String::new(),
            status: Status::Todo,
            fl_task: None,
            rank: None,
        }
    }
}

impl Traintuple {
    /// Identity-defining fields hashed into the key.
    pub fn key_elements(&self) -> Vec<&str> {
        let mut elements = vec![
            self.creator.as_str(),
            self.algo_key.as_str(),
            self.dataset.data_manager_key.as_str(),
        ];
        elements.extend(self.dataset.data_sample_keys.iter().map(String::as_str));
        elements.extend(self.in_model_keys.iter().map(String::as_str));
        elements
    }

    /// Every index entry of this record, in write order.
    pub fn index_entries(&self, key: &str) -> Vec<(IndexName, Vec<String>)> {
        let obj = TRAINTUPLE_OBJECT.to_string();
        let mut entries = vec![
            (
                IndexName::TraintupleAlgo,
                vec![obj.clone(), self.algo_key.clone(), key.to_string()],
            ),
            (
                IndexName::TraintupleWorkerStatus,
                vec![
                    obj.clone(),
                    self.dataset.worker.clone(),
                    self.status.to_string(),
                    key.to_string(),
                ],
            ),
        ];
        for parent in &self.in_model_keys {
            entries.push((
                IndexName::TraintupleInModel,
                vec![obj.clone(), parent.clone(), key.to_string()],
            ));
        }
        if let (Some(fl_task), Some(rank)) = (&self.fl_task, self.rank) {
            entries.push((
                IndexName::TraintupleFlTask,
                vec![
                    obj.clone(),
                    fl_task.clone(),
                    self.dataset.worker.clone(),
                    rank.to_string(),
                    key.to_string(),
                ],
            ));
        }
        if !self.tag.is_empty() {
            entries.push((
                IndexName::TraintupleTag,
                vec![obj, self.tag.clone(), key.to_string()],
            ));
        }
        entries
    }
}

impl Asset for Traintuple {
    const ASSET_TYPE: AssetType = AssetType::Traintuple;

    fn asset_type(&self) -> AssetType {
        self.asset_type
    }
}

/// Data a testtuple evaluates on, and the score it obtained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtDataset {
    pub worker: String,
    pub data_sample_keys: Vec<String>,
    /// Key of the data manager
    pub opener_hash: String,
    pub perf: f32,
}

/// Reference from a testtuple to the traintuple it evaluates.
///
/// `hash` and `storage_address` stay empty until the traintuple is done.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub traintuple_key: String,
    pub hash: String,
    pub storage_address: String,
}

impl Model {
    pub fn pending(traintuple_key: impl Into<String>) -> Self {
        Self {
            traintuple_key: traintuple_key.into(),
            ..Self::default()
        }
    }

    pub fn from_out_model(traintuple_key: impl Into<String>, out_model: &HashDress) -> Self {
        Self {
            traintuple_key: traintuple_key.into(),
            hash: out_model.hash.clone(),
            storage_address: out_model.storage_address.clone(),
        }
    }
}

/// An evaluation task bound to one traintuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Testtuple {
    pub asset_type: AssetType,
    pub creator: String,
    pub permissions: String,
    pub tag: String,
    pub algo_key: String,
    pub objective_key: String,
    pub dataset: TtDataset,
    pub model: Model,
    /// Evaluated on the objective's own test dataset
    pub certified: bool,
    pub status: Status,
    pub log: String,
}

impl Default for Testtuple {
    fn default() -> Self {
        Self {
            asset_type: AssetType::Testtuple,
            creator: String::new(),
            permissions: PERMISSIONS_ALL.to_string(),
            tag: String::new(),
            algo_key: String::new(),
            objective_key: String::new(),
            dataset: TtDataset::default(),
            model: Model::default(),
            certified: false,
            status: Status::Waiting,
            log: String::new(),
        }
    }
}

impl Testtuple {
    pub fn key_elements(&self) -> Vec<&str> {
        let mut elements = vec![
            self.model.traintuple_key.as_str(),
            self.dataset.opener_hash.as_str(),
            self.creator.as_str(),
        ];
        elements.extend(self.dataset.data_sample_keys.iter().map(String::as_str));
        elements
    }

    pub fn index_entries(&self, key: &str) -> Vec<(IndexName, Vec<String>)> {
        let obj = TESTTUPLE_OBJECT.to_string();
        let mut entries = vec![
            (
                IndexName::TesttupleAlgo,
                vec![obj.clone(), self.algo_key.clone(), key.to_string()],
            ),
            (
                IndexName::TesttupleWorkerStatus,
                vec![
                    obj.clone(),
                    self.dataset.worker.clone(),
                    self.status.to_string(),
                    key.to_string(),
                ],
            ),
            (
                IndexName::TesttupleTraintupleCertified,
                vec![
                    obj.clone(),
                    self.model.traintuple_key.clone(),
                    self.certified.to_string(),
                    key.to_string(),
                ],
            ),
        ];
        if !self.tag.is_empty() {
            entries.push((
                IndexName::TesttupleTag,
                vec![obj, self.tag.clone(), key.to_string()],
            ));
        }
        entries
    }
}

impl Asset for Testtuple {
    const ASSET_TYPE: AssetType = AssetType::Testtuple;

    fn asset_type(&self) -> AssetType {
        self.asset_type
    }
}

/// Behaviour shared by both tuple kinds for status bookkeeping.
pub trait Tuple: Asset {
    /// Object type label, first attribute of every index entry
    const OBJECT: &'static str;
    /// Index keyed by worker then status
    const WORKER_STATUS_INDEX: IndexName;

    fn status(&self) -> Status;
    fn set_status(&mut self, status: Status);
    fn worker(&self) -> &str;

    /// Attributes of the worker~status entry for `status`.
    fn worker_status_attributes<'a>(&'a self, status: Status, key: &'a str) -> [&'a str; 4] {
        [Self::OBJECT, self.worker(), status.as_str(), key]
    }
}

impl Tuple for Traintuple {
    const OBJECT: &'static str = TRAINTUPLE_OBJECT;
    const WORKER_STATUS_INDEX: IndexName = IndexName::TraintupleWorkerStatus;

    fn status(&self) -> Status {
        self.status
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    fn worker(&self) -> &str {
        &self.dataset.worker
    }
}

impl Tuple for Testtuple {
    const OBJECT: &'static str = TESTTUPLE_OBJECT;
    const WORKER_STATUS_INDEX: IndexName = IndexName::TesttupleWorkerStatus;

    fn status(&self) -> Status {
        self.status
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    fn worker(&self) -> &str {
        &self.dataset.worker
    }
}
