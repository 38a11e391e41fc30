//! # Tuple Ledger Core
//!
//! Domain types for the federated-learning tuple ledger.
//!
//! This crate is backend-agnostic and provides:
//! - The tuple status machine and its transition table
//! - Content-addressed key derivation for tuples
//! - Composite (secondary) index encoding
//! - Asset and tuple records as stored in the ledger
//! - Public projections and the `tuples-updated` event payload
//! - The [`traits::Ledger`] seam every storage backend implements

pub mod assets;
pub mod event;
pub mod identity;
pub mod index;
pub mod status;
pub mod traits;
pub mod tuple;
pub mod view;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::assets::*;
    pub use crate::event::*;
    pub use crate::identity::*;
    pub use crate::index::IndexName;
    pub use crate::status::*;
    pub use crate::traits::*;
    pub use crate::tuple::*;
    pub use crate::view::*;
    pub use crate::{Error, ErrorKind, Result};
}

/// Result type for tuple ledger operations
pub type Result<T> = core::result::Result<T, Error>;

/// Error type for tuple ledger operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Malformed or inconsistent input
    #[error("bad request: {0}")]
    BadRequest(String),
    /// A record already exists at the derived key
    #[error("conflict: {0}")]
    Conflict(String),
    /// Referenced key is absent or holds another asset type
    #[error("not found: {0}")]
    NotFound(String),
    /// Submitting identity is not allowed to act on the record
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Invariant violation, the ledger content is inconsistent
    #[error("internal error: {0}")]
    Internal(String),
    /// Backend failure
    #[error("storage error: {0}")]
    Storage(String),
    /// Record or payload (de)serialization failure
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Coarse classification of an [`Error`], stable for callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    Conflict,
    NotFound,
    Forbidden,
    Internal,
    Storage,
    Serialization,
}

impl Error {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Error::BadRequest(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Error::Conflict(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Error::Forbidden(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::BadRequest(_) => ErrorKind::BadRequest,
            Error::Conflict(_) => ErrorKind::Conflict,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Forbidden(_) => ErrorKind::Forbidden,
            Error::Internal(_) => ErrorKind::Internal,
            Error::Storage(_) => ErrorKind::Storage,
            Error::Serialization(_) => ErrorKind::Serialization,
        }
    }

    /// Rewrap a lookup failure as a bad request, keeping its message.
    ///
    /// Construction paths report missing references as caller errors.
    pub fn into_bad_request(self, context: impl core::fmt::Display) -> Self {
        match self {
            Error::NotFound(msg) | Error::BadRequest(msg) => {
                Error::BadRequest(format!("{context}: {msg}"))
            }
            other => other,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
