//! Satellite aggregation engine
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicBool, Ordering};

use hifitime::{Duration, Epoch};
use itertools::Itertools;
use log::{debug, info};
use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::{
    band::Band,
    cfg::Config,
    error::Error,
    observation::Snapshot,
    publisher::{Digest, Publisher},
    record::SatelliteKey,
    source::{ReceiverModeProvider, SnapshotSource},
    stats::{primary_system, system_statistics, DiversityReport},
    system::GnssSystem,
    table::{MergeOutcome, SatelliteTable},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// NavIC svid numbering on the broadcast interface.
const NAVIC_SVID_RANGE: RangeInclusive<u16> = 1..=14;

/// Confirmed NavIC summary for one ingested snapshot. Only IRNSS
/// observations inside the svid range and above the confirmation floor
/// count; the rest merge into the table but are not reported here.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavicSummary {
    pub confirmed: usize,
    pub used_in_fix: usize,
    pub with_signal: usize,
    pub average_cn0_dbhz: f64,
}

/// Outcome of one snapshot ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeReport {
    /// Sampling [Epoch] of the merged snapshot.
    pub epoch: Epoch,
    /// Producer's elapsed marker for the merged snapshot.
    pub elapsed: Duration,
    /// Observations carried by the snapshot.
    pub observed: usize,
    /// Records created by this snapshot.
    pub inserted: usize,
    /// Records updated by this snapshot.
    pub merged: usize,
    /// Systems present in this snapshot.
    pub systems: Vec<GnssSystem>,
    pub navic: NavicSummary,
    pub external: bool,
}

/// The aggregation engine: folds snapshots into the shared satellite
/// table and serves the read-only query surface over it.
///
/// One producer merges on its own cadence while readers query from
/// other threads; merges are atomic per identity and never block
/// merges on other identities. A single engine serves both internal
/// and external receivers, switched by its [ReceiverModeProvider].
pub struct Engine {
    /// Engine parametrization
    pub cfg: Config,
    /// Shared satellite state
    pub(crate) table: SatelliteTable,
    /// Live digest broadcast
    publisher: Publisher,
    /// Active receiver description
    mode: Box<dyn ReceiverModeProvider + Send + Sync>,
    /// Session gate: ingest holds the read side, open/stop the write side,
    /// so stopping synchronizes with in-flight merges.
    session_open: RwLock<bool>,
    /// Latches once any observation arrives on an L5 class carrier.
    enhanced_active: AtomicBool,
}

impl Engine {
    /// Create a new [Engine] for either receiver path.
    /// ## Input
    /// - cfg: engine [Config]
    /// - mode: [ReceiverModeProvider] describing the active receiver;
    ///   queried at every ingest, so a live provider may flip between
    ///   internal and external without rebuilding the engine.
    pub fn new(cfg: Config, mode: Box<dyn ReceiverModeProvider + Send + Sync>) -> Self {
        let publisher = Publisher::with_capacity(cfg.digest_capacity);
        Self {
            cfg,
            table: SatelliteTable::new(),
            publisher,
            mode,
            session_open: RwLock::new(false),
            enhanced_active: AtomicBool::new(false),
        }
    }

    /// True when an external receiver currently drives the snapshots.
    pub fn receiver_external(&self) -> bool {
        self.mode.is_external()
    }

    /// Vendor / device description of the active receiver.
    pub fn receiver_info(&self) -> String {
        self.mode.device_info()
    }

    pub fn enhanced_band_supported(&self) -> bool {
        self.mode.supports_enhanced_band()
    }

    /// True once any observation arrived on an L5 class carrier during
    /// the current session.
    pub fn enhanced_band_active(&self) -> bool {
        self.enhanced_active.load(Ordering::Relaxed)
    }

    /// Records currently held.
    pub fn total_satellites(&self) -> usize {
        self.table.len()
    }

    /// Epoch of the most recent merge.
    pub fn latest_detection(&self) -> Option<Epoch> {
        self.table.latest_detection()
    }

    /// New receiver for the digests published after each ingest.
    pub fn subscribe(&self) -> broadcast::Receiver<Digest> {
        self.publisher.subscribe()
    }

    /// The digest [Publisher] itself, for subscriber bookkeeping.
    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    pub(crate) fn open_session(&self, clear: bool) -> Result<(), Error> {
        if !self.mode.is_available() {
            return Err(Error::ReceiverUnavailable);
        }
        let mut open = self.session_open.write();
        if clear {
            self.table.clear();
            self.enhanced_active.store(false, Ordering::Relaxed);
        }
        *open = true;
        Ok(())
    }

    /// Closes the gate. Waits out in-flight merges: once this returns,
    /// every later [Engine::ingest] fails with [Error::SessionClosed].
    pub(crate) fn close_session(&self) {
        let mut open = self.session_open.write();
        *open = false;
    }

    /// Polls the source once and merges whatever it delivers. Source
    /// conditions ([Error::PermissionDenied], [Error::ReceiverUnavailable])
    /// surface before any merge is attempted.
    pub fn poll<S: SnapshotSource>(&self, source: &mut S) -> Result<MergeReport, Error> {
        let snapshot = source.next_snapshot()?;
        self.ingest(&snapshot)
    }

    /// Merges one snapshot into the satellite table.
    ///
    /// Per observation: resolve the system from the raw constellation id,
    /// infer the band, and upsert under the (system, svid, source)
    /// identity. Malformed fields are absorbed with defaults, never
    /// escalated. The per-system index is rebuilt from this snapshot
    /// alone. Ends by publishing a [Digest] to subscribers.
    pub fn ingest(&self, snapshot: &Snapshot) -> Result<MergeReport, Error> {
        let open = self.session_open.read();
        if !*open {
            return Err(Error::SessionClosed);
        }

        let external = self.mode.is_external();
        let enhanced = self.mode.supports_enhanced_band();

        let mut inserted = 0;
        let mut merged = 0;
        let mut groups: HashMap<GnssSystem, Vec<SatelliteKey>> = HashMap::new();

        let mut confirmed = 0;
        let mut confirmed_used = 0;
        let mut with_signal = 0;
        let mut signal_sum = 0.0_f64;

        for obs in &snapshot.observations {
            let obs = obs.sanitized();
            let system = obs.system();
            let band = Band::classify(obs.carrier_frequency_hz, system, enhanced);

            if obs.carrier_frequency_hz > 0.0 && band.includes_l5() {
                self.enhanced_active.store(true, Ordering::Relaxed);
            }

            let key = SatelliteKey {
                system,
                svid: obs.svid,
                external,
            };

            match self.table.upsert(key, &obs, band, snapshot.epoch) {
                MergeOutcome::Inserted => inserted += 1,
                MergeOutcome::Merged => merged += 1,
            }

            groups.entry(system).or_default().push(key);

            if system == GnssSystem::Irnss && NAVIC_SVID_RANGE.contains(&obs.svid) {
                if obs.cn0_dbhz >= self.cfg.navic_confirmation_cn0_dbhz {
                    confirmed += 1;
                    if obs.used_in_fix {
                        confirmed_used += 1;
                    }
                    if obs.cn0_dbhz > 0.0 {
                        with_signal += 1;
                        signal_sum += obs.cn0_dbhz;
                    }
                } else {
                    debug!(
                        "{} - {} below navic confirmation floor ({:.1} dB-Hz)",
                        snapshot.epoch, key, obs.cn0_dbhz
                    );
                }
            }
        }

        let systems = groups.keys().copied().sorted().collect::<Vec<_>>();
        self.table.rebuild_index(groups);

        let navic = NavicSummary {
            confirmed,
            used_in_fix: confirmed_used,
            with_signal,
            average_cn0_dbhz: if with_signal > 0 {
                signal_sum / with_signal as f64
            } else {
                0.0
            },
        };

        debug!(
            "{} - merged snapshot: {} observed, {} new, {} systems, {} confirmed navic",
            snapshot.epoch,
            snapshot.observations.len(),
            inserted,
            systems.len(),
            navic.confirmed,
        );

        let report = MergeReport {
            epoch: snapshot.epoch,
            elapsed: snapshot.elapsed,
            observed: snapshot.observations.len(),
            inserted,
            merged,
            systems,
            navic,
            external,
        };

        self.publish(&report);
        Ok(report)
    }

    fn publish(&self, report: &MergeReport) {
        let satellites = self.table.records();
        let stats = system_statistics(&satellites);
        let used = stats
            .iter()
            .map(|(system, stat)| (*system, stat.used))
            .collect();
        let diversity = DiversityReport::evaluate(self.table.systems(), satellites.len());

        let digest = Digest {
            epoch: report.epoch,
            total_satellites: satellites.len(),
            systems: report.systems.clone(),
            satellites,
            primary: primary_system(&used),
            stats,
            diversity,
            navic: report.navic.clone(),
            external: report.external,
            enhanced_band_active: self.enhanced_band_active(),
        };

        let receivers = self.publisher.emit(digest);
        if receivers > 0 {
            info!(
                "{} - digest published to {} subscriber(s)",
                report.epoch, receivers
            );
        }
    }
}
