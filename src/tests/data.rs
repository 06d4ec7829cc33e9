use std::collections::VecDeque;
use std::str::FromStr;

use crate::prelude::*;

pub fn t0() -> Epoch {
    Epoch::from_str("2020-06-25T00:00:00 GPST").unwrap()
}

/// Snapshot stamped `seconds` into the session.
pub fn snapshot(seconds: f64, observations: Vec<SatelliteObservation>) -> Snapshot {
    let elapsed = Duration::from_seconds(seconds);
    Snapshot::new(t0() + elapsed, elapsed, observations)
}

pub fn gps(svid: u16, cn0: f64) -> SatelliteObservation {
    SatelliteObservation::new(GnssSystem::Gps.id(), svid).with_signal(cn0)
}

pub fn glonass(svid: u16, cn0: f64) -> SatelliteObservation {
    SatelliteObservation::new(GnssSystem::Glonass.id(), svid).with_signal(cn0)
}

pub fn irnss(svid: u16, cn0: f64) -> SatelliteObservation {
    SatelliteObservation::new(GnssSystem::Irnss.id(), svid).with_signal(cn0)
}

pub fn internal_engine() -> Engine {
    Engine::new(Config::default(), Box::new(FixedReceiverMode::internal()))
}

pub fn external_engine() -> Engine {
    Engine::new(
        Config::default(),
        Box::new(FixedReceiverMode::external("u-blox (VID: 0x1546)")),
    )
}

/// Scripted producer: replays pre-built results in order, then keeps
/// reporting [Error::NoDataYet].
pub struct ScriptedSource {
    queue: VecDeque<Result<Snapshot, Error>>,
}

impl ScriptedSource {
    pub fn new<I: IntoIterator<Item = Result<Snapshot, Error>>>(items: I) -> Self {
        Self {
            queue: items.into_iter().collect(),
        }
    }

    pub fn of_snapshots<I: IntoIterator<Item = Snapshot>>(items: I) -> Self {
        Self::new(items.into_iter().map(Ok))
    }

    pub fn empty() -> Self {
        Self::new([])
    }
}

impl SnapshotSource for ScriptedSource {
    fn next_snapshot(&mut self) -> Result<Snapshot, Error> {
        self.queue.pop_front().unwrap_or(Err(Error::NoDataYet))
    }
}
