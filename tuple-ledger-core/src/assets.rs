//! Ancillary records read by the engine.
//!
//! Algorithms, objectives, data managers and data samples are registered
//! elsewhere; the tuple engine only reads them. Constructors exist so that
//! fixtures and demos can seed a ledger.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::traits::Asset;

/// Permission value meaning "visible to every organisation".
pub const PERMISSIONS_ALL: &str = "all";

/// Tag stored in every record under `assetType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssetType {
    Algo,
    Objective,
    DataManager,
    DataSample,
    Traintuple,
    Testtuple,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Algo => "algo",
            AssetType::Objective => "objective",
            AssetType::DataManager => "dataManager",
            AssetType::DataSample => "dataSample",
            AssetType::Traintuple => "traintuple",
            AssetType::Testtuple => "testtuple",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content hash plus the address it can be fetched from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashDress {
    pub hash: String,
    pub storage_address: String,
}

impl HashDress {
    pub fn new(hash: impl Into<String>, storage_address: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            storage_address: storage_address.into(),
        }
    }
}

/// [`HashDress`] with a display name, used for metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashDressName {
    pub name: String,
    pub hash: String,
    pub storage_address: String,
}

/// Training algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Algo {
    pub asset_type: AssetType,
    pub name: String,
    pub hash: String,
    pub storage_address: String,
    pub owner: String,
    pub permissions: String,
}

impl Algo {
    pub fn new(name: impl Into<String>, code: HashDress, owner: impl Into<String>) -> Self {
        Self {
            asset_type: AssetType::Algo,
            name: name.into(),
            hash: code.hash,
            storage_address: code.storage_address,
            owner: owner.into(),
            permissions: PERMISSIONS_ALL.to_string(),
        }
    }
}

impl Asset for Algo {
    const ASSET_TYPE: AssetType = AssetType::Algo;

    fn asset_type(&self) -> AssetType {
        self.asset_type
    }
}

/// Reference dataset an objective is evaluated on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveDataset {
    pub data_manager_key: String,
    pub data_sample_keys: Vec<String>,
}

/// Learning objective: what is measured and, optionally, on which data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Objective {
    pub asset_type: AssetType,
    pub name: String,
    pub description: HashDress,
    pub metrics: HashDressName,
    pub test_dataset: Option<ObjectiveDataset>,
    pub owner: String,
    pub permissions: String,
}

impl Objective {
    pub fn new(
        name: impl Into<String>,
        description: HashDress,
        metrics: HashDressName,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            asset_type: AssetType::Objective,
            name: name.into(),
            description,
            metrics,
            test_dataset: None,
            owner: owner.into(),
            permissions: PERMISSIONS_ALL.to_string(),
        }
    }

    pub fn with_test_dataset(mut self, data_manager_key: &str, data_sample_keys: &[&str]) -> Self {
        self.test_dataset = Some(ObjectiveDataset {
            data_manager_key: data_manager_key.to_string(),
            data_sample_keys: data_sample_keys.iter().map(|k| k.to_string()).collect(),
        });
        self
    }
}

impl Asset for Objective {
    const ASSET_TYPE: AssetType = AssetType::Objective;

    fn asset_type(&self) -> AssetType {
        self.asset_type
    }
}

/// Owner of a group of data samples; its owner is the worker training on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataManager {
    pub asset_type: AssetType,
    pub name: String,
    pub opener: HashDress,
    pub owner: String,
    pub permissions: String,
}

impl DataManager {
    pub fn new(name: impl Into<String>, opener: HashDress, owner: impl Into<String>) -> Self {
        Self {
            asset_type: AssetType::DataManager,
            name: name.into(),
            opener,
            owner: owner.into(),
            permissions: PERMISSIONS_ALL.to_string(),
        }
    }
}

impl Asset for DataManager {
    const ASSET_TYPE: AssetType = AssetType::DataManager;

    fn asset_type(&self) -> AssetType {
        self.asset_type
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSample {
    pub asset_type: AssetType,
    pub data_manager_keys: Vec<String>,
    pub owner: String,
    pub test_only: bool,
}

impl DataSample {
    pub fn new(data_manager_keys: &[&str], owner: impl Into<String>, test_only: bool) -> Self {
        Self {
            asset_type: AssetType::DataSample,
            data_manager_keys: data_manager_keys.iter().map(|k| k.to_string()).collect(),
            owner: owner.into(),
            test_only,
        }
    }

    pub fn belongs_to(&self, data_manager_key: &str) -> bool {
        self.data_manager_keys.iter().any(|k| k == data_manager_key)
    }
}

impl Asset for DataSample {
    const ASSET_TYPE: AssetType = AssetType::DataSample;

    fn asset_type(&self) -> AssetType {
        self.asset_type
    }
}
