//! # Tuple Ledger Store
//!
//! In-memory transactional backend implementing
//! [`tuple_ledger_core::traits::Ledger`].
//!
//! - [`MemoryLedger`] holds committed state and the history of committed events
//! - [`Transaction`] is one invocation's unit of work: buffered writes visible to
//!   its own reads, a single event slot, applied only on commit
//! - [`snapshot`] encodes committed state into a versioned, checksummed blob

pub mod memory;
pub mod snapshot;
pub mod transaction;

pub use memory::{Invocation, MemoryLedger};
pub use snapshot::{SnapshotError, SNAPSHOT_SCHEMA_V1};
pub use transaction::{Changeset, LedgerEvent, Transaction};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::memory::{Invocation, MemoryLedger};
    pub use crate::transaction::{LedgerEvent, Transaction};
    pub use tuple_ledger_core::traits::{Ledger, LedgerExt};
}
