//! Composite (secondary) index keys.
//!
//! An index entry is an empty-valued ledger key of the form
//! `\0<index>\0<attr1>\0<attr2>\0...\0`. It is a lookup path, not a value store:
//! the last attribute is always the key of the primary record. A prefix scan
//! over a partial attribute list yields every primary key indexed under it.

use core::fmt;

use crate::{Error, Result};

const SEPARATOR: char = '\u{0}';

/// Value stored under every index entry.
pub const INDEX_ENTRY_VALUE: &[u8] = &[0x00];

/// Every secondary index maintained for tuples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexName {
    TraintupleAlgo,
    TraintupleWorkerStatus,
    TraintupleInModel,
    TraintupleFlTask,
    TraintupleTag,
    TesttupleAlgo,
    TesttupleWorkerStatus,
    TesttupleTraintupleCertified,
    TesttupleTag,
}

impl IndexName {
    pub const fn as_str(&self) -> &'static str {
        match self {
            IndexName::TraintupleAlgo => "traintuple~algo~key",
            IndexName::TraintupleWorkerStatus => "traintuple~worker~status~key",
            IndexName::TraintupleInModel => "traintuple~inModel~key",
            IndexName::TraintupleFlTask => "traintuple~fltask~worker~rank~key",
            IndexName::TraintupleTag => "traintuple~tag~key",
            IndexName::TesttupleAlgo => "testtuple~algo~key",
            IndexName::TesttupleWorkerStatus => "testtuple~worker~status~key",
            IndexName::TesttupleTraintupleCertified => "testtuple~traintuple~certified~key",
            IndexName::TesttupleTag => "testtuple~tag~key",
        }
    }

    /// Number of attributes of a full entry (object type included, key included).
    pub const fn arity(&self) -> usize {
        match self {
            IndexName::TraintupleAlgo
            | IndexName::TraintupleInModel
            | IndexName::TraintupleTag
            | IndexName::TesttupleAlgo
            | IndexName::TesttupleTag => 3,
            IndexName::TraintupleWorkerStatus
            | IndexName::TesttupleWorkerStatus
            | IndexName::TesttupleTraintupleCertified => 4,
            IndexName::TraintupleFlTask => 5,
        }
    }
}

impl fmt::Display for IndexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encode a full or partial composite key.
///
/// Attributes may not contain the separator character.
pub fn composite_key<S: AsRef<str>>(index: IndexName, attributes: &[S]) -> Result<String> {
    let mut key = String::new();
    key.push(SEPARATOR);
    key.push_str(index.as_str());
    key.push(SEPARATOR);
    for attribute in attributes {
        let attribute = attribute.as_ref();
        if attribute.contains(SEPARATOR) {
            return Err(Error::bad_request(format!(
                "invalid attribute for index {index}: contains a null character"
            )));
        }
        key.push_str(attribute);
        key.push(SEPARATOR);
    }
    Ok(key)
}

/// Decode a composite key into its index name and attributes.
pub fn split_composite_key(key: &str) -> Option<(&str, Vec<&str>)> {
    let body = key.strip_prefix(SEPARATOR)?.strip_suffix(SEPARATOR)?;
    let mut parts = body.split(SEPARATOR);
    let index = parts.next()?;
    Some((index, parts.collect()))
}

/// The primary key an index entry points to (its last attribute).
pub fn primary_key_of(composite: &str) -> Result<String> {
    split_composite_key(composite)
        .and_then(|(_, attributes)| attributes.last().map(|k| k.to_string()))
        .ok_or_else(|| Error::internal(format!("malformed composite key {composite:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_key_layout() {
        let key = composite_key(IndexName::TraintupleAlgo, &["traintuple", "algo1", "tt1"]).unwrap();
        assert_eq!(key, "\u{0}traintuple~algo~key\u{0}traintuple\u{0}algo1\u{0}tt1\u{0}");
    }

    #[test]
    fn partial_key_is_prefix_of_full_key() {
        let full = composite_key(
            IndexName::TraintupleWorkerStatus,
            &["traintuple", "worker", "todo", "tt1"],
        )
        .unwrap();
        let partial =
            composite_key(IndexName::TraintupleWorkerStatus, &["traintuple", "worker"]).unwrap();
        assert!(full.starts_with(&partial));

        // "work" must not match "worker" entries
        let shorter = composite_key(IndexName::TraintupleWorkerStatus, &["traintuple", "work"]).unwrap();
        assert!(!full.starts_with(&shorter));
    }

    #[test]
    fn split_returns_attributes_and_primary_key() {
        let key = composite_key(
            IndexName::TesttupleTraintupleCertified,
            &["testtuple", "tt1", "true", "te1"],
        )
        .unwrap();
        let (index, attrs) = split_composite_key(&key).unwrap();
        assert_eq!(index, "testtuple~traintuple~certified~key");
        assert_eq!(attrs, vec!["testtuple", "tt1", "true", "te1"]);
        assert_eq!(primary_key_of(&key).unwrap(), "te1");
        assert_eq!(attrs.len(), IndexName::TesttupleTraintupleCertified.arity());
    }

    #[test]
    fn rejects_separator_in_attribute() {
        let result = composite_key(IndexName::TraintupleTag, &["traintuple", "bad\u{0}tag", "k"]);
        assert!(matches!(result, Err(Error::BadRequest(_))));
    }

    #[test]
    fn malformed_key_has_no_primary_key() {
        assert!(primary_key_of("plainkey").is_err());
    }
}
