//! Change-detection fingerprint of a free list

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use super::snapshot::FreeList;

const FIELD_SEP: u8 = 0x1f;
const RECORD_SEP: u8 = 0x1e;

/// SHA-256 (hex) of a free list, or the empty sentinel.
///
/// The sentinel is the empty string, which can never be the output of
/// the hex encoder for a 32-byte digest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fingerprint a free list. The list is already sorted by construction.
    pub fn of(free: &FreeList) -> Self {
        if free.is_empty() {
            return Self::empty();
        }

        let mut hasher = Sha256::new();
        for unit in free {
            hasher.update(unit.unit_type.as_bytes());
            hasher.update([FIELD_SEP]);
            hasher.update(unit.identifier.as_bytes());
            hasher.update([FIELD_SEP]);
            // Distinguish "no link" from an empty link
            match &unit.link {
                Some(link) => {
                    hasher.update(b"+");
                    hasher.update(link.as_bytes());
                }
                None => hasher.update(b"-"),
            }
            hasher.update([RECORD_SEP]);
        }
        Self(hex::encode(hasher.finalize()))
    }

    /// Short prefix for log lines
    pub fn short(&self) -> &str {
        if self.is_empty() {
            "-"
        } else {
            &self.0[..self.0.len().min(12)]
        }
    }
}

impl From<String> for Signature {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::unit::{UnitRecord, UnitStatus};

    fn free(t: &str, id: &str, link: Option<&str>) -> UnitRecord {
        let rec = UnitRecord::new(t, id, UnitStatus::Free);
        match link {
            Some(l) => rec.with_link(l),
            None => rec,
        }
    }

    #[test]
    fn test_empty_list_is_sentinel() {
        let sig = FreeList::default().signature();
        assert!(sig.is_empty());
        assert_eq!(sig, Signature::empty());
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let a = FreeList::from_unsorted(vec![
            free("Komfort-Apartment", "12", Some("/u/12")),
            free("Komfort L-Apartment", "3", None),
        ]);
        let b = FreeList::from_unsorted(vec![
            free("Komfort L-Apartment", "3", None),
            free("Komfort-Apartment", "12", Some("/u/12")),
        ]);
        assert_eq!(a.signature(), b.signature());
        assert_eq!(a.signature().as_str().len(), 64);
    }

    #[test]
    fn test_any_difference_changes_signature() {
        let base = FreeList::from_unsorted(vec![free("Komfort-Apartment", "12", Some("/u/12"))]);
        let other_link =
            FreeList::from_unsorted(vec![free("Komfort-Apartment", "12", Some("/u/13"))]);
        let no_link = FreeList::from_unsorted(vec![free("Komfort-Apartment", "12", None)]);
        let empty_link = FreeList::from_unsorted(vec![free("Komfort-Apartment", "12", Some(""))]);
        let added = FreeList::from_unsorted(vec![
            free("Komfort-Apartment", "12", Some("/u/12")),
            free("Komfort-Apartment", "14", None),
        ]);

        let sigs = [
            base.signature(),
            other_link.signature(),
            no_link.signature(),
            empty_link.signature(),
            added.signature(),
        ];
        for (i, a) in sigs.iter().enumerate() {
            assert!(!a.is_empty());
            for b in &sigs[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_field_boundaries_are_unambiguous() {
        let a = FreeList::from_unsorted(vec![free("ab", "c", None)]);
        let b = FreeList::from_unsorted(vec![free("a", "bc", None)]);
        assert_ne!(a.signature(), b.signature());
    }
}
