//! Live update publisher
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use hifitime::Epoch;
use tokio::sync::broadcast;

use crate::{
    engine::NavicSummary,
    record::SatelliteRecord,
    stats::{DiversityReport, PrimarySystem, SystemStats},
    system::GnssSystem,
};

/// Digest pushed to subscribers after each merged snapshot, for
/// consumers that want live updates rather than polling the queries.
#[derive(Debug, Clone)]
pub struct Digest {
    pub epoch: Epoch,
    pub total_satellites: usize,
    /// Systems present in the snapshot that produced this digest.
    pub systems: Vec<GnssSystem>,
    pub satellites: Vec<SatelliteRecord>,
    pub stats: BTreeMap<GnssSystem, SystemStats>,
    pub diversity: DiversityReport,
    pub navic: NavicSummary,
    pub primary: PrimarySystem,
    pub external: bool,
    pub enhanced_band_active: bool,
}

/// Non blocking [Digest] broadcast. `emit` never awaits: subscribers
/// that fall behind the channel capacity lag rather than stalling the
/// ingest path.
pub struct Publisher {
    tx: broadcast::Sender<Digest>,
    emitted: AtomicU64,
}

impl Publisher {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            emitted: AtomicU64::new(0),
        }
    }

    /// Emits to all subscribers, returning how many received it.
    pub(crate) fn emit(&self, digest: Digest) -> usize {
        self.emitted.fetch_add(1, Ordering::Relaxed);
        self.tx.send(digest).unwrap_or(0)
    }

    /// New receiver for all digests emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Digest> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Total digests emitted since creation.
    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }
}
