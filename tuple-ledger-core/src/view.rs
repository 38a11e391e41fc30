//! Public projections returned by operations and carried in events.

use serde::{Deserialize, Serialize};

use crate::assets::{Algo, HashDress, HashDressName, Objective};
use crate::status::Status;
use crate::tuple::{Model, TtDataset};

/// Algorithm as shown to clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgoView {
    pub name: String,
    pub hash: String,
    pub storage_address: String,
}

impl From<&Algo> for AlgoView {
    fn from(algo: &Algo) -> Self {
        Self {
            name: algo.name.clone(),
            hash: algo.hash.clone(),
            storage_address: algo.storage_address.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveView {
    pub key: String,
    pub metrics: HashDressName,
}

impl ObjectiveView {
    pub fn new(key: &str, objective: &Objective) -> Self {
        Self {
            key: key.to_string(),
            metrics: objective.metrics.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraintupleDatasetView {
    pub data_manager_key: String,
    pub data_sample_keys: Vec<String>,
    pub worker: String,
    pub perf: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraintupleView {
    pub key: String,
    pub creator: String,
    pub algo: AlgoView,
    pub objective: ObjectiveView,
    pub dataset: TraintupleDatasetView,
    /// One entry per parent, with the parent's out model once it is done
    pub in_models: Vec<Model>,
    pub out_model: Option<HashDress>,
    pub log: String,
    pub permissions: String,
    pub status: Status,
    pub tag: String,
    pub rank: Option<u32>,
    #[serde(rename = "fltask")]
    pub fl_task: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TesttupleView {
    pub key: String,
    pub creator: String,
    pub algo: AlgoView,
    pub objective: ObjectiveView,
    pub dataset: TtDataset,
    pub model: Model,
    pub certified: bool,
    pub log: String,
    pub permissions: String,
    pub status: Status,
    pub tag: String,
}

/// A traintuple with every evaluation of its model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDetails {
    pub traintuple: TraintupleView,
    pub testtuple: Option<TesttupleView>,
    pub non_certified_testtuples: Vec<TesttupleView>,
}

/// A traintuple with its certified evaluation, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelView {
    pub traintuple: TraintupleView,
    pub testtuple: Option<TesttupleView>,
}
