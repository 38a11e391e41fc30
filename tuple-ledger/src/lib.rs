//! # Tuple Ledger
//!
//! State-machine core of a ledger-backed federated-learning task tracker.
//!
//! Training tasks (traintuples) and evaluation tasks (testtuples) are
//! content-addressed records in a key/value ledger. This crate builds them,
//! links them into federated tasks and compute plans, drives their status
//! transitions, and cascades completion or failure to dependent tasks while
//! keeping every secondary index consistent inside one transaction.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tuple_ledger::prelude::*;
//!
//! let config = ContractConfig::default();
//! let contract = Contract::new(&config);
//! let mut ledger = MemoryLedger::new();
//!
//! let created = ledger.transact("org1", |tx| {
//!     contract.create_traintuple(tx, &TraintupleInput::new("algo", "objective", "dm", &["s1"]))
//! })?;
//! println!("traintuple {}", created.value.key);
//! ```
//!
//! ## Crate Structure
//!
//! - [`tuple_ledger_core`]: status machine, keys, indexes, records, `Ledger` trait
//! - [`tuple_ledger_store`]: in-memory transactional backend and snapshots
//! - this crate: construction, transitions, cascades, compute plans, queries

#![forbid(unsafe_code)]

pub use tuple_ledger_core as core;
pub use tuple_ledger_store as store;

pub use tuple_ledger_core::{Error, ErrorKind, Result};

pub mod cascade;
pub mod compute_plan;
pub mod config;
pub mod contract;
pub mod dataset;
pub mod input;
pub mod query;
pub mod testtuple;
pub mod traintuple;
pub mod transition;

/// Offline report generator.
pub mod report;

pub use config::ContractConfig;
pub use contract::Contract;
pub use transition::StatusActor;

/// Prelude module for convenient imports
///
/// ```rust,ignore
/// use tuple_ledger::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::prelude::*;
    pub use crate::input::*;
    pub use crate::store::prelude::*;

    pub use crate::{Contract, ContractConfig, StatusActor};
}
