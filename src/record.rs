//! Persistent satellite records
use hifitime::Epoch;

use crate::{band::Band, observation::SatelliteObservation, system::GnssSystem};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Record identity. The source flag is part of the identity: internal
/// and external receivers reuse the same svid numbering and must never
/// merge into one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SatelliteKey {
    pub system: GnssSystem,
    pub svid: u16,
    /// Observed through an external receiver.
    pub external: bool,
}

impl std::fmt::Display for SatelliteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        if self.external {
            write!(f, "{}_{}_EXT", self.system, self.svid)
        } else {
            write!(f, "{}_{}", self.system, self.svid)
        }
    }
}

/// Signal quality tier, bucketed on the running cn0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SignalStrength {
    Excellent,
    Good,
    Fair,
    Weak,
    Poor,
}

impl SignalStrength {
    pub fn from_cn0(cn0_dbhz: f64) -> Self {
        if cn0_dbhz >= 35.0 {
            Self::Excellent
        } else if cn0_dbhz >= 25.0 {
            Self::Good
        } else if cn0_dbhz >= 18.0 {
            Self::Fair
        } else if cn0_dbhz >= 10.0 {
            Self::Weak
        } else {
            Self::Poor
        }
    }

    /// Contribution to the weighted quality score.
    pub fn weight(&self) -> f64 {
        match self {
            Self::Excellent => 100.0,
            Self::Good => 80.0,
            Self::Fair => 60.0,
            Self::Weak => 40.0,
            Self::Poor => 20.0,
        }
    }
}

impl std::fmt::Display for SignalStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self {
            Self::Excellent => write!(f, "EXCELLENT"),
            Self::Good => write!(f, "GOOD"),
            Self::Fair => write!(f, "FAIR"),
            Self::Weak => write!(f, "WEAK"),
            Self::Poor => write!(f, "POOR"),
        }
    }
}

/// Role a satellite currently plays in positioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PositioningRole {
    /// In the fix with a strong signal.
    PrimaryPositioning,
    /// In the fix.
    Positioning,
    /// Usable signal, not in the fix.
    SignalAvailable,
    WeakSignal,
    NotUsed,
}

impl std::fmt::Display for PositioningRole {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self {
            Self::PrimaryPositioning => write!(f, "PRIMARY_POSITIONING"),
            Self::Positioning => write!(f, "POSITIONING"),
            Self::SignalAvailable => write!(f, "SIGNAL_AVAILABLE"),
            Self::WeakSignal => write!(f, "WEAK_SIGNAL"),
            Self::NotUsed => write!(f, "NOT_USED"),
        }
    }
}

/// Health diagnosis, checked in fixed priority order: signal presence
/// first, then orbital data availability, then signal quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HealthStatus {
    NoSignal,
    VeryWeak,
    Weak,
    NoEphemeris,
    NoAlmanac,
    Excellent,
    Good,
    Fair,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self {
            Self::NoSignal => write!(f, "NO_SIGNAL"),
            Self::VeryWeak => write!(f, "VERY_WEAK"),
            Self::Weak => write!(f, "WEAK"),
            Self::NoEphemeris => write!(f, "NO_EPHEMERIS"),
            Self::NoAlmanac => write!(f, "NO_ALMANAC"),
            Self::Excellent => write!(f, "EXCELLENT"),
            Self::Good => write!(f, "GOOD"),
            Self::Fair => write!(f, "FAIR"),
        }
    }
}

/// Persistent per-satellite state. One record exists per identity;
/// snapshots merge into it for the lifetime of the detection session.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SatelliteRecord {
    pub key: SatelliteKey,
    /// Running cn0 [dB-Hz]: each merge halves the weight of history.
    pub cn0_dbhz: f64,
    /// Latches true once seen in a fix. Only a table clear resets it.
    pub used_in_fix: bool,
    /// Running elevation [°].
    pub elevation_deg: f64,
    /// Running azimuth [°].
    pub azimuth_deg: f64,
    pub has_ephemeris: bool,
    pub has_almanac: bool,
    pub band: Band,
    /// Last known nonzero carrier [Hz], 0 while unknown.
    pub carrier_frequency_hz: f64,
    /// 1 on insertion, +1 per merge.
    pub detection_count: u32,
    /// Set at insertion, never touched by merges.
    pub first_detection: Epoch,
    pub last_detection: Epoch,
    /// Region tag, derived from the system at creation.
    pub flag: &'static str,
}

impl SatelliteRecord {
    pub(crate) fn from_observation(
        key: SatelliteKey,
        obs: &SatelliteObservation,
        band: Band,
        epoch: Epoch,
    ) -> Self {
        Self {
            key,
            cn0_dbhz: obs.cn0_dbhz,
            used_in_fix: obs.used_in_fix,
            elevation_deg: obs.elevation_deg,
            azimuth_deg: obs.azimuth_deg,
            has_ephemeris: obs.has_ephemeris,
            has_almanac: obs.has_almanac,
            band,
            carrier_frequency_hz: obs.carrier_frequency_hz,
            detection_count: 1,
            first_detection: epoch,
            last_detection: epoch,
            flag: key.system.flag(),
        }
    }

    /// Folds one observation into this record:
    /// - cn0, elevation, azimuth: `new = (old + incoming) / 2`, so
    ///   history loses weight geometrically and recency dominates;
    /// - used_in_fix: monotonic OR;
    /// - ephemeris/almanac flags: latest wins;
    /// - carrier and band: overwritten only when the incoming carrier
    ///   is nonzero, otherwise the last known values stay.
    pub(crate) fn merge(&mut self, obs: &SatelliteObservation, band: Band, epoch: Epoch) {
        self.detection_count += 1;
        self.cn0_dbhz = (self.cn0_dbhz + obs.cn0_dbhz) / 2.0;
        self.used_in_fix = self.used_in_fix || obs.used_in_fix;
        self.elevation_deg = (self.elevation_deg + obs.elevation_deg) / 2.0;
        self.azimuth_deg = (self.azimuth_deg + obs.azimuth_deg) / 2.0;
        self.has_ephemeris = obs.has_ephemeris;
        self.has_almanac = obs.has_almanac;

        if obs.carrier_frequency_hz > 0.0 {
            self.carrier_frequency_hz = obs.carrier_frequency_hz;
            self.band = band;
        }

        self.last_detection = epoch;
    }

    pub fn signal_strength(&self) -> SignalStrength {
        SignalStrength::from_cn0(self.cn0_dbhz)
    }

    pub fn positioning_role(&self) -> PositioningRole {
        if self.used_in_fix && self.cn0_dbhz > 25.0 {
            PositioningRole::PrimaryPositioning
        } else if self.used_in_fix {
            PositioningRole::Positioning
        } else if self.cn0_dbhz > 20.0 {
            PositioningRole::SignalAvailable
        } else if self.cn0_dbhz > 10.0 {
            PositioningRole::WeakSignal
        } else {
            PositioningRole::NotUsed
        }
    }

    pub fn health(&self) -> HealthStatus {
        if self.cn0_dbhz <= 0.0 {
            HealthStatus::NoSignal
        } else if self.cn0_dbhz < 10.0 {
            HealthStatus::VeryWeak
        } else if self.cn0_dbhz < 18.0 {
            HealthStatus::Weak
        } else if !self.has_ephemeris {
            HealthStatus::NoEphemeris
        } else if !self.has_almanac {
            HealthStatus::NoAlmanac
        } else if self.cn0_dbhz >= 25.0 {
            HealthStatus::Excellent
        } else if self.cn0_dbhz >= 18.0 {
            HealthStatus::Good
        } else {
            HealthStatus::Fair
        }
    }

    /// Conventional vehicle designation, like `GPS PRN-07`.
    pub fn name(&self) -> String {
        self.key.system.satellite_name(self.key.svid)
    }

    pub fn has_signal(&self) -> bool {
        self.cn0_dbhz > 0.0
    }

    /// True when the current band carries the L5 component.
    pub fn is_l5(&self) -> bool {
        self.band.includes_l5()
    }
}
