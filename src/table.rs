//! Concurrent satellite table
use std::collections::HashMap;

use dashmap::{mapref::entry::Entry, DashMap};
use hifitime::Epoch;
use itertools::Itertools;
use parking_lot::RwLock;

use crate::{
    band::Band,
    observation::SatelliteObservation,
    record::{SatelliteKey, SatelliteRecord},
    system::GnssSystem,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum MergeOutcome {
    Inserted,
    Merged,
}

/// Shared satellite state. Records merge atomically per identity, and
/// merges on distinct identities do not contend. Whole-table reads are
/// consistent at record granularity only: a listing taken while a
/// snapshot is being merged may mix records from both sides.
///
/// The per-system index is instantaneous: it is rebuilt from each
/// snapshot's own groupings, while the record table accumulates across
/// snapshots.
#[derive(Default)]
pub struct SatelliteTable {
    records: DashMap<SatelliteKey, SatelliteRecord>,
    by_system: RwLock<HashMap<GnssSystem, Vec<SatelliteKey>>>,
}

impl SatelliteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drops all records and the index. New detection sessions start here.
    pub fn clear(&self) {
        self.records.clear();
        self.by_system.write().clear();
    }

    pub fn get(&self, key: &SatelliteKey) -> Option<SatelliteRecord> {
        self.records.get(key).map(|rec| rec.value().clone())
    }

    /// All records, sorted by identity.
    pub fn records(&self) -> Vec<SatelliteRecord> {
        self.records
            .iter()
            .map(|rec| rec.value().clone())
            .sorted_by_key(|rec| rec.key)
            .collect()
    }

    /// Systems present in the latest snapshot.
    pub fn systems(&self) -> Vec<GnssSystem> {
        self.by_system.read().keys().copied().sorted().collect()
    }

    /// Records grouped under a system by the latest snapshot.
    pub fn system_members(&self, system: GnssSystem) -> Vec<SatelliteRecord> {
        let index = self.by_system.read();
        let Some(keys) = index.get(&system) else {
            return Vec::new();
        };
        keys.iter().filter_map(|key| self.get(key)).collect()
    }

    /// Epoch of the most recent merge, across all records.
    pub fn latest_detection(&self) -> Option<Epoch> {
        self.records
            .iter()
            .map(|rec| rec.value().last_detection)
            .max()
    }

    pub(crate) fn upsert(
        &self,
        key: SatelliteKey,
        obs: &SatelliteObservation,
        band: Band,
        epoch: Epoch,
    ) -> MergeOutcome {
        match self.records.entry(key) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().merge(obs, band, epoch);
                MergeOutcome::Merged
            },
            Entry::Vacant(entry) => {
                entry.insert(SatelliteRecord::from_observation(key, obs, band, epoch));
                MergeOutcome::Inserted
            },
        }
    }

    /// Replaces the per-system index with the given snapshot groupings.
    pub(crate) fn rebuild_index(&self, groups: HashMap<GnssSystem, Vec<SatelliteKey>>) {
        *self.by_system.write() = groups;
    }
}
