//! Content-addressed tuple identity.
//!
//! A tuple key is `sha256("<object_type>,<e1>,<e2>,...")` in lowercase hex, where
//! the elements are the identity-defining fields of the tuple sorted
//! lexicographically. Sorting makes the key independent of the order in which a
//! caller lists samples or parents, and makes two submissions of the same
//! logical task collide on the same key.

use sha2::{Digest, Sha256};

use crate::traits::Ledger;
use crate::{Error, Result};

/// Object type label hashed into traintuple keys.
pub const TRAINTUPLE_OBJECT: &str = "traintuple";
/// Object type label hashed into testtuple keys.
pub const TESTTUPLE_OBJECT: &str = "testtuple";

/// Lowercase hex encoding.
pub fn hex_lower(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0x0f) as usize] as char);
    }
    out
}

/// Derive the key of an object from its identity elements.
pub fn hash_for_key<S: AsRef<str>>(object_type: &str, elements: &[S]) -> String {
    let mut sorted: Vec<&str> = elements.iter().map(AsRef::as_ref).collect();
    sorted.sort_unstable();

    let mut hasher = Sha256::new();
    hasher.update(object_type.as_bytes());
    for element in sorted {
        hasher.update(b",");
        hasher.update(element.as_bytes());
    }
    hex_lower(&hasher.finalize())
}

/// Derive the key and fail with `Conflict` if the ledger already holds it.
pub fn unique_key<L, S>(ledger: &L, object_type: &str, elements: &[S]) -> Result<String>
where
    L: Ledger + ?Sized,
    S: AsRef<str>,
{
    let key = hash_for_key(object_type, elements);
    if ledger.get_state(&key)?.is_some() {
        return Err(Error::conflict(format!(
            "this {object_type} already exists (tkey: {key})"
        )));
    }
    Ok(key)
}
