//! Reduction of raw unit records to a per-poll snapshot

use std::collections::{BTreeSet, HashSet};

use super::signature::Signature;
use super::unit::{UnitRecord, UnitStatus};

/// Per-status unit counts for the monitored types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub free: usize,
    pub reserved: usize,
    pub rented: usize,
    pub unknown: usize,
}

impl StatusCounts {
    fn record(&mut self, status: UnitStatus) {
        match status {
            UnitStatus::Free => self.free += 1,
            UnitStatus::Reserved => self.reserved += 1,
            UnitStatus::Rented => self.rented += 1,
            UnitStatus::Unknown => self.unknown += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.free + self.reserved + self.rented + self.unknown
    }
}

/// Free units sorted by (type, identifier)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreeList(Vec<UnitRecord>);

impl FreeList {
    /// Build a free list from records in any order.
    pub fn from_unsorted(mut units: Vec<UnitRecord>) -> Self {
        units.retain(|u| u.status == UnitStatus::Free);
        units.sort_by(|a, b| {
            a.unit_type
                .cmp(&b.unit_type)
                .then_with(|| a.identifier.cmp(&b.identifier))
                .then_with(|| a.link.cmp(&b.link))
        });
        Self(units)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UnitRecord> {
        self.0.iter()
    }

    pub fn signature(&self) -> Signature {
        Signature::of(self)
    }
}

impl<'a> IntoIterator for &'a FreeList {
    type Item = &'a UnitRecord;
    type IntoIter = std::slice::Iter<'a, UnitRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One poll's monitored, deduplicated units
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub units: Vec<UnitRecord>,
    pub counts: StatusCounts,
    pub free: FreeList,
}

impl Snapshot {
    /// Number of monitored units (after deduplication)
    pub fn monitored(&self) -> usize {
        self.units.len()
    }

    /// Units whose status could not be determined
    pub fn anomalies(&self) -> usize {
        self.counts.unknown
    }

    pub fn has_free(&self) -> bool {
        !self.free.is_empty()
    }
}

/// Filters raw records to the monitored types and summarizes them
#[derive(Debug, Clone)]
pub struct Aggregator {
    monitored: BTreeSet<String>,
}

impl Aggregator {
    pub fn new<I, S>(monitored: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            monitored: monitored.into_iter().map(Into::into).collect(),
        }
    }

    /// Reduce records (in document order) to a snapshot.
    ///
    /// The first record seen for a (type, identifier) key wins.
    pub fn aggregate(&self, records: Vec<UnitRecord>) -> Snapshot {
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut counts = StatusCounts::default();
        let mut units = Vec::new();

        for record in records {
            if !self.monitored.contains(&record.unit_type) {
                continue;
            }
            let key = (record.unit_type.clone(), record.identifier.clone());
            if !seen.insert(key) {
                continue;
            }
            counts.record(record.status);
            units.push(record);
        }

        let free = FreeList::from_unsorted(units.clone());

        Snapshot {
            units,
            counts,
            free,
        }
    }
}
