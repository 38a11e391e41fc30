//! Operation arguments and results.
//!
//! Every type here deserializes from the JSON document a client submits, with
//! camelCase field names and missing fields defaulted.

use serde::{Deserialize, Serialize};
use tuple_ledger_core::assets::HashDress;

fn owned(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TraintupleInput {
    pub algo_key: String,
    pub objective_key: String,
    /// Parent traintuple keys
    pub in_models: Vec<String>,
    pub data_manager_key: String,
    pub data_sample_keys: Vec<String>,
    #[serde(rename = "flTask")]
    pub fl_task: Option<String>,
    pub rank: Option<u32>,
    pub tag: String,
}

impl TraintupleInput {
    pub fn new(algo_key: &str, objective_key: &str, data_manager_key: &str, samples: &[&str]) -> Self {
        Self {
            algo_key: algo_key.to_string(),
            objective_key: objective_key.to_string(),
            data_manager_key: data_manager_key.to_string(),
            data_sample_keys: owned(samples),
            ..Self::default()
        }
    }

    pub fn with_in_models(mut self, in_models: &[&str]) -> Self {
        self.in_models = owned(in_models);
        self
    }

    pub fn with_rank(mut self, rank: u32) -> Self {
        self.rank = Some(rank);
        self
    }

    pub fn with_fl_task(mut self, fl_task: &str) -> Self {
        self.fl_task = Some(fl_task.to_string());
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = tag.to_string();
        self
    }

    /// FL task id, treating an empty string as absent.
    pub(crate) fn fl_task(&self) -> Option<&str> {
        self.fl_task.as_deref().filter(|t| !t.is_empty())
    }
}

/// Evaluation data of a testtuple. Empty fields mean "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TesttupleInput {
    pub traintuple_key: String,
    pub data_manager_key: String,
    pub data_sample_keys: Vec<String>,
    pub tag: String,
}

impl TesttupleInput {
    /// Evaluate on the objective's own test dataset.
    pub fn certified(traintuple_key: &str) -> Self {
        Self {
            traintuple_key: traintuple_key.to_string(),
            ..Self::default()
        }
    }

    pub fn with_dataset(mut self, data_manager_key: &str, samples: &[&str]) -> Self {
        self.data_manager_key = data_manager_key.to_string();
        self.data_sample_keys = owned(samples);
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = tag.to_string();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComputePlanTraintuple {
    /// Plan-local identifier, referenced by later steps
    pub id: String,
    pub data_manager_key: String,
    pub data_sample_keys: Vec<String>,
    #[serde(rename = "inModelsIDs")]
    pub in_models_ids: Vec<String>,
    pub tag: String,
}

impl ComputePlanTraintuple {
    pub fn new(id: &str, data_manager_key: &str, samples: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            data_manager_key: data_manager_key.to_string(),
            data_sample_keys: owned(samples),
            ..Self::default()
        }
    }

    pub fn with_in_models(mut self, ids: &[&str]) -> Self {
        self.in_models_ids = owned(ids);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComputePlanTesttuple {
    #[serde(rename = "traintupleID")]
    pub traintuple_id: String,
    pub data_manager_key: String,
    pub data_sample_keys: Vec<String>,
    pub tag: String,
}

impl ComputePlanTesttuple {
    pub fn certified(traintuple_id: &str) -> Self {
        Self {
            traintuple_id: traintuple_id.to_string(),
            ..Self::default()
        }
    }

    pub fn with_dataset(mut self, data_manager_key: &str, samples: &[&str]) -> Self {
        self.data_manager_key = data_manager_key.to_string();
        self.data_sample_keys = owned(samples);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComputePlanInput {
    pub algo_key: String,
    pub objective_key: String,
    pub traintuples: Vec<ComputePlanTraintuple>,
    pub testtuples: Vec<ComputePlanTesttuple>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogSuccessTrainInput {
    pub key: String,
    pub log: String,
    pub out_model: HashDress,
    pub perf: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogSuccessTestInput {
    pub key: String,
    pub log: String,
    pub perf: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogFailInput {
    pub key: String,
    pub log: String,
}

/// Key of a created tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyOutput {
    pub key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputePlanOutput {
    pub traintuple_keys: Vec<String>,
    pub testtuple_keys: Vec<String>,
    #[serde(rename = "fltask")]
    pub fl_task: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traintuple_input_from_client_json() {
        let input: TraintupleInput = serde_json::from_str(
            r#"{"algoKey":"a","objectiveKey":"o","inModels":["p"],"dataManagerKey":"dm",
                "dataSampleKeys":["s1"],"flTask":"","rank":0}"#,
        )
        .unwrap();
        assert_eq!(input.in_models, vec!["p"]);
        assert_eq!(input.rank, Some(0));
        assert_eq!(input.fl_task(), None);
        assert_eq!(input.tag, "");
    }

    #[test]
    fn compute_plan_input_field_names() {
        let input: ComputePlanInput = serde_json::from_str(
            r#"{"algoKey":"a","objectiveKey":"o",
                "traintuples":[{"id":"1","dataManagerKey":"dm","dataSampleKeys":["s"],"inModelsIDs":[]}],
                "testtuples":[{"traintupleID":"1"}]}"#,
        )
        .unwrap();
        assert_eq!(input.traintuples[0].id, "1");
        assert_eq!(input.testtuples[0].traintuple_id, "1");
        assert!(input.testtuples[0].data_sample_keys.is_empty());
    }
}
