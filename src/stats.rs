//! System rollups, diversity and quality scoring
use std::collections::BTreeMap;

use crate::{
    record::{SatelliteRecord, SignalStrength},
    system::GnssSystem,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Distinct systems a full multi constellation receiver may track.
const DIVERSITY_SYSTEM_TARGET: f64 = 7.0;

/// Used-in-fix count declaring a system primary outright.
const DEDICATED_FIX_COUNT: usize = 4;

/// Per-system rollup over the satellite table.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SystemStats {
    pub count: usize,
    pub used: usize,
    /// Records with a nonzero signal.
    pub has_signal: usize,
    /// Mean cn0 [dB-Hz] over signal-bearing records only. Records at
    /// zero do not pull the average down; 0.0 when none carry signal.
    pub average_signal: f64,
}

pub(crate) fn system_statistics(
    records: &[SatelliteRecord],
) -> BTreeMap<GnssSystem, SystemStats> {
    let mut stats: BTreeMap<GnssSystem, SystemStats> = BTreeMap::new();
    let mut signal_sums: BTreeMap<GnssSystem, f64> = BTreeMap::new();

    for rec in records {
        let system = rec.key.system;
        let entry = stats.entry(system).or_default();
        entry.count += 1;
        if rec.used_in_fix {
            entry.used += 1;
        }
        if rec.has_signal() {
            entry.has_signal += 1;
            *signal_sums.entry(system).or_default() += rec.cn0_dbhz;
        }
    }

    for (system, entry) in stats.iter_mut() {
        if entry.has_signal > 0 {
            entry.average_signal = signal_sums[system] / entry.has_signal as f64;
        }
    }

    stats
}

/// Banded label over the diversity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DiversityLevel {
    Excellent,
    Good,
    Fair,
    Weak,
    Poor,
}

impl DiversityLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Excellent
        } else if score >= 60.0 {
            Self::Good
        } else if score >= 40.0 {
            Self::Fair
        } else if score >= 20.0 {
            Self::Weak
        } else {
            Self::Poor
        }
    }
}

impl std::fmt::Display for DiversityLevel {
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

/// Cross constellation diversity: how many distinct systems currently
/// contribute satellites.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DiversityReport {
    pub total_systems: usize,
    pub total_satellites: usize,
    pub systems: Vec<GnssSystem>,
    /// `(total_systems / 7) * 100`. Not clamped: an eighth cataloged
    /// system pushes the score past 100.
    pub score: f64,
    pub level: DiversityLevel,
}

impl DiversityReport {
    pub(crate) fn evaluate(systems: Vec<GnssSystem>, total_satellites: usize) -> Self {
        let total_systems = systems.len();
        let score = if total_systems > 0 && total_satellites > 0 {
            total_systems as f64 * 100.0 / DIVERSITY_SYSTEM_TARGET
        } else {
            0.0
        };
        Self {
            total_systems,
            total_satellites,
            systems,
            score,
            level: DiversityLevel::from_score(score),
        }
    }
}

/// Satellite counts per signal quality tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SignalDistribution {
    pub excellent: usize,
    pub good: usize,
    pub fair: usize,
    pub weak: usize,
    pub poor: usize,
}

impl SignalDistribution {
    pub(crate) fn add(&mut self, strength: SignalStrength) {
        match strength {
            SignalStrength::Excellent => self.excellent += 1,
            SignalStrength::Good => self.good += 1,
            SignalStrength::Fair => self.fair += 1,
            SignalStrength::Weak => self.weak += 1,
            SignalStrength::Poor => self.poor += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.excellent + self.good + self.fair + self.weak + self.poor
    }

    /// Weighted mean of the tier weights (100/80/60/40/20), capped at 100.
    /// 0.0 over an empty distribution.
    pub fn quality_score(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let weighted = self.excellent as f64 * SignalStrength::Excellent.weight()
            + self.good as f64 * SignalStrength::Good.weight()
            + self.fair as f64 * SignalStrength::Fair.weight()
            + self.weak as f64 * SignalStrength::Weak.weight()
            + self.poor as f64 * SignalStrength::Poor.weight();
        (weighted / total as f64).min(100.0)
    }
}

/// Outcome of primary positioning system election.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PrimarySystem {
    /// A system reached 4 used-in-fix satellites and can fix on its own.
    Dedicated(GnssSystem),
    /// Best contributor with fewer than 4 used satellites: the fix is
    /// cross-system.
    Hybrid(GnssSystem),
    /// No satellite is used in a fix.
    NoFix,
    /// Defensive fallback when no single system can be attributed.
    MultiGnss,
}

impl std::fmt::Display for PrimarySystem {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self {
            Self::Dedicated(system) => write!(f, "{}", fix_name(*system)),
            Self::Hybrid(system) => write!(f, "{}_HYBRID", fix_name(*system)),
            Self::NoFix => write!(f, "NO_FIX"),
            Self::MultiGnss => write!(f, "MULTI_GNSS"),
        }
    }
}

/// IRNSS is reported under its service name in fix labels.
fn fix_name(system: GnssSystem) -> String {
    match system {
        GnssSystem::Irnss => "NAVIC".to_string(),
        other => other.to_string(),
    }
}

/// Elects the primary positioning system from per-system used-in-fix
/// counts, in the fixed priority order IRNSS > GPS > GLONASS > GALILEO >
/// BEIDOU. Ties at the hybrid stage break by the same order.
pub(crate) fn primary_system(used: &BTreeMap<GnssSystem, usize>) -> PrimarySystem {
    let count = |system: &GnssSystem| used.get(system).copied().unwrap_or(0);

    for system in GnssSystem::FIX_PRIORITY {
        if count(&system) >= DEDICATED_FIX_COUNT {
            return PrimarySystem::Dedicated(system);
        }
    }

    let max_used = GnssSystem::FIX_PRIORITY
        .iter()
        .map(count)
        .max()
        .unwrap_or(0);
    if max_used == 0 {
        return PrimarySystem::NoFix;
    }

    for system in GnssSystem::FIX_PRIORITY {
        if count(&system) == max_used {
            return PrimarySystem::Hybrid(system);
        }
    }

    PrimarySystem::MultiGnss
}
