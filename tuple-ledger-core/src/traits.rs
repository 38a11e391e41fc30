//! Ledger seam and typed helpers.
//!
//! [`Ledger`] is the minimal key/value surface a backend exposes to the
//! engine. [`LedgerExt`] layers typed record access and composite index
//! maintenance on top of it and is implemented for every ledger.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::assets::AssetType;
use crate::index::{composite_key, primary_key_of, IndexName, INDEX_ENTRY_VALUE};
use crate::{Error, Result};

/// Transactional key/value store as seen by one invocation.
///
/// Reads observe the invocation's own writes. At most one event may be set.
pub trait Ledger {
    /// Read a value, `None` if the key is absent
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write a value
    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Delete a key (absent keys are ignored)
    fn del_state(&mut self, key: &str) -> Result<()>;

    /// All keys starting with `prefix`, in ascending key order
    fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>>;

    /// Identity that submitted the invocation
    fn tx_creator(&self) -> Result<String>;

    /// Attach the invocation's event
    fn set_event(&mut self, name: &str, payload: Vec<u8>) -> Result<()>;
}

/// A record stored under a primary key.
pub trait Asset: Serialize + DeserializeOwned {
    const ASSET_TYPE: AssetType;

    /// The tag carried by this value
    fn asset_type(&self) -> AssetType;
}

#[derive(Deserialize)]
struct AssetHeader {
    #[serde(rename = "assetType")]
    asset_type: Option<AssetType>,
}

/// Typed access on top of any [`Ledger`].
pub trait LedgerExt: Ledger {
    /// Load and decode a record, `NotFound` if absent or of another type.
    fn get_asset<T: Asset>(&self, key: &str) -> Result<T> {
        let bytes = self
            .get_state(key)?
            .ok_or_else(|| Error::not_found(format!("no element with key {key}")))?;

        let header: AssetHeader = serde_json::from_slice(&bytes)
            .map_err(|_| Error::not_found(format!("no {} with key {key}", T::ASSET_TYPE)))?;
        if header.asset_type != Some(T::ASSET_TYPE) {
            return Err(Error::not_found(format!(
                "no {} with key {key}",
                T::ASSET_TYPE
            )));
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn put_asset<T: Asset>(&mut self, key: &str, asset: &T) -> Result<()> {
        if asset.asset_type() != T::ASSET_TYPE {
            return Err(Error::internal(format!(
                "record tagged {} stored as {}",
                asset.asset_type(),
                T::ASSET_TYPE
            )));
        }
        let bytes = serde_json::to_vec(asset)?;
        self.put_state(key, bytes)
    }

    fn create_index<S: AsRef<str>>(&mut self, index: IndexName, attributes: &[S]) -> Result<()> {
        let key = composite_key(index, attributes)?;
        self.put_state(&key, INDEX_ENTRY_VALUE.to_vec())
    }

    fn delete_index<S: AsRef<str>>(&mut self, index: IndexName, attributes: &[S]) -> Result<()> {
        let key = composite_key(index, attributes)?;
        self.del_state(&key)
    }

    /// Move an entry: the new entry is written before the old one is removed.
    fn update_index<S: AsRef<str>>(&mut self, index: IndexName, old: &[S], new: &[S]) -> Result<()> {
        self.create_index(index, new)?;
        self.delete_index(index, old)
    }

    /// Primary keys indexed under a partial attribute list, in key order.
    fn keys_by_index<S: AsRef<str>>(&self, index: IndexName, partial: &[S]) -> Result<Vec<String>> {
        let prefix = composite_key(index, partial)?;
        self.scan_prefix(&prefix)?
            .iter()
            .map(|composite| primary_key_of(composite))
            .collect()
    }
}

impl<L: Ledger + ?Sized> LedgerExt for L {}
