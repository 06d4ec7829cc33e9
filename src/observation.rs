//! Satellite observations and snapshots
use hifitime::{Duration, Epoch};

use crate::system::GnssSystem;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One satellite as seen in one reporting cycle. Ephemeral: the engine
/// folds these into persistent [SatelliteRecord](crate::prelude::SatelliteRecord)s.
/// Fields the receiver did not populate stay at their zero defaults.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SatelliteObservation {
    /// Raw numeric constellation identifier, as reported by the platform.
    pub constellation_id: u16,
    /// Per-constellation satellite number.
    pub svid: u16,
    /// Carrier to noise density ratio [dB-Hz]. 0 means no signal.
    pub cn0_dbhz: f64,
    /// Whether the position solution currently incorporates this satellite.
    pub used_in_fix: bool,
    /// Elevation [°], 0 to 90.
    pub elevation_deg: f64,
    /// Azimuth [°], 0 to 360.
    pub azimuth_deg: f64,
    pub has_ephemeris: bool,
    pub has_almanac: bool,
    /// Raw carrier frequency [Hz]. 0 when the receiver does not expose it.
    pub carrier_frequency_hz: f64,
}

impl SatelliteObservation {
    /// Minimal observation: identity only, everything else at the
    /// conservative defaults.
    pub fn new(constellation_id: u16, svid: u16) -> Self {
        Self {
            constellation_id,
            svid,
            ..Default::default()
        }
    }

    /// Copies and returns new [SatelliteObservation] with measured cn0 [dB-Hz].
    pub fn with_signal(&self, cn0_dbhz: f64) -> Self {
        let mut s = self.clone();
        s.cn0_dbhz = cn0_dbhz;
        s
    }

    /// Copies and returns new [SatelliteObservation] with elevation and
    /// azimuth angles [°].
    pub fn with_attitude(&self, elevation_deg: f64, azimuth_deg: f64) -> Self {
        let mut s = self.clone();
        s.elevation_deg = elevation_deg;
        s.azimuth_deg = azimuth_deg;
        s
    }

    /// Copies and returns new [SatelliteObservation] with the fix
    /// participation flag.
    pub fn with_used_in_fix(&self, used: bool) -> Self {
        let mut s = self.clone();
        s.used_in_fix = used;
        s
    }

    /// Copies and returns new [SatelliteObservation] with the measured
    /// carrier frequency [Hz].
    pub fn with_carrier_frequency_hz(&self, carrier_hz: f64) -> Self {
        let mut s = self.clone();
        s.carrier_frequency_hz = carrier_hz;
        s
    }

    /// Copies and returns new [SatelliteObservation] with orbital data
    /// availability flags.
    pub fn with_orbital_data(&self, ephemeris: bool, almanac: bool) -> Self {
        let mut s = self.clone();
        s.has_ephemeris = ephemeris;
        s.has_almanac = almanac;
        s
    }

    /// System this observation belongs to.
    pub fn system(&self) -> GnssSystem {
        GnssSystem::from_id(self.constellation_id)
    }

    /// Non finite numeric fields collapse to the conservative default.
    pub(crate) fn sanitized(&self) -> Self {
        let mut s = self.clone();
        for field in [
            &mut s.cn0_dbhz,
            &mut s.elevation_deg,
            &mut s.azimuth_deg,
            &mut s.carrier_frequency_hz,
        ] {
            if !field.is_finite() {
                *field = 0.0;
            }
        }
        s
    }
}

/// One reporting cycle's full list of visible satellites.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Snapshot {
    /// Absolute sampling [Epoch].
    pub epoch: Epoch,
    /// Elapsed marker since session start, stamped by the producer.
    pub elapsed: Duration,
    pub observations: Vec<SatelliteObservation>,
}

impl Snapshot {
    pub fn new(epoch: Epoch, elapsed: Duration, observations: Vec<SatelliteObservation>) -> Self {
        Self {
            epoch,
            elapsed,
            observations,
        }
    }
}
