//! Binary snapshot of committed ledger state.
//!
//! Layout: a postcard-encoded envelope `{schema_version, checksum, body}`
//! where `body` is the postcard encoding of [`SnapshotV1`] and `checksum` is
//! the SHA-256 of `body`. Decoding checks the version before the checksum and
//! the checksum before touching the body.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::transaction::LedgerEvent;

/// Current snapshot schema.
pub const SNAPSHOT_SCHEMA_V1: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot encoding failed: {0}")]
    Encode(String),
    #[error("snapshot decoding failed: {0}")]
    Decode(String),
    #[error("unsupported snapshot schema version {0}")]
    UnsupportedVersion(u32),
    #[error("snapshot checksum mismatch")]
    ChecksumMismatch,
}

impl From<SnapshotError> for tuple_ledger_core::Error {
    fn from(e: SnapshotError) -> Self {
        tuple_ledger_core::Error::Storage(e.to_string())
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    schema_version: u32,
    checksum: [u8; 32],
    body: Vec<u8>,
}

/// Snapshot body, schema version 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotV1 {
    pub height: u64,
    /// Committed entries in ascending key order
    pub entries: Vec<(String, Vec<u8>)>,
    pub events: Vec<LedgerEvent>,
}

fn checksum(body: &[u8]) -> [u8; 32] {
    let digest = Sha256::digest(body);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[..]);
    out
}

pub fn encode(snapshot: &SnapshotV1) -> Result<Vec<u8>, SnapshotError> {
    let body = postcard::to_allocvec(snapshot).map_err(|e| SnapshotError::Encode(e.to_string()))?;
    let envelope = Envelope {
        schema_version: SNAPSHOT_SCHEMA_V1,
        checksum: checksum(&body),
        body,
    };
    postcard::to_allocvec(&envelope).map_err(|e| SnapshotError::Encode(e.to_string()))
}

pub fn decode(bytes: &[u8]) -> Result<SnapshotV1, SnapshotError> {
    let envelope: Envelope =
        postcard::from_bytes(bytes).map_err(|e| SnapshotError::Decode(e.to_string()))?;
    if envelope.schema_version != SNAPSHOT_SCHEMA_V1 {
        return Err(SnapshotError::UnsupportedVersion(envelope.schema_version));
    }
    if checksum(&envelope.body) != envelope.checksum {
        return Err(SnapshotError::ChecksumMismatch);
    }
    postcard::from_bytes(&envelope.body).map_err(|e| SnapshotError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SnapshotV1 {
        SnapshotV1 {
            height: 3,
            entries: vec![
                ("\u{0}traintuple~algo~key\u{0}a\u{0}".to_string(), vec![0]),
                ("k".to_string(), br#"{"assetType":"algo"}"#.to_vec()),
            ],
            events: vec![LedgerEvent {
                name: "tuples-updated".to_string(),
                payload: b"{}".to_vec(),
            }],
        }
    }

    #[test]
    fn decode_restores_encoded_snapshot() {
        let bytes = encode(&sample()).unwrap();
        assert_eq!(decode(&bytes).unwrap(), sample());
    }

    #[test]
    fn flipped_body_byte_fails_checksum() {
        let mut bytes = encode(&sample()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        assert_eq!(decode(&bytes), Err(SnapshotError::ChecksumMismatch));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let body = postcard::to_allocvec(&sample()).unwrap();
        let envelope = Envelope {
            schema_version: 2,
            checksum: checksum(&body),
            body,
        };
        let bytes = postcard::to_allocvec(&envelope).unwrap();
        assert_eq!(decode(&bytes), Err(SnapshotError::UnsupportedVersion(2)));
    }

    #[test]
    fn truncated_input_is_a_decode_error() {
        let bytes = encode(&sample()).unwrap();
        assert!(matches!(decode(&bytes[..4]), Err(SnapshotError::Decode(_))));
    }
}
