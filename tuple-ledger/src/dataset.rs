//! Dataset resolution: which worker owns a set of samples, and what kind they are.

use tuple_ledger_core::assets::{DataManager, DataSample};
use tuple_ledger_core::traits::{Ledger, LedgerExt};
use tuple_ledger_core::{Error, Result};

/// A validated (data manager, samples) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDataset {
    /// Owner of the data manager
    pub worker: String,
    /// No sample is test-only
    pub train_only: bool,
    /// Every sample is test-only
    pub test_only: bool,
}

/// Check that every sample exists and belongs to `data_manager_key`.
///
/// Missing records, an empty sample list, or a sample of another data
/// manager are caller errors.
pub fn resolve_dataset<L: Ledger + ?Sized>(
    ledger: &L,
    data_manager_key: &str,
    sample_keys: &[String],
) -> Result<ResolvedDataset> {
    let data_manager: DataManager = ledger
        .get_asset(data_manager_key)
        .map_err(|e| e.into_bad_request(format!("could not retrieve dataManager with key {data_manager_key}")))?;

    if sample_keys.is_empty() {
        return Err(Error::bad_request(format!(
            "no data sample provided for dataManager {data_manager_key}"
        )));
    }

    let mut train_only = true;
    let mut test_only = true;
    for sample_key in sample_keys {
        let sample: DataSample = ledger
            .get_asset(sample_key)
            .map_err(|e| e.into_bad_request(format!("could not retrieve dataSample with key {sample_key}")))?;
        if !sample.belongs_to(data_manager_key) {
            return Err(Error::bad_request(format!(
                "dataSample {sample_key} does not belong to dataManager {data_manager_key}"
            )));
        }
        train_only &= !sample.test_only;
        test_only &= sample.test_only;
    }

    Ok(ResolvedDataset {
        worker: data_manager.owner,
        train_only,
        test_only,
    })
}
