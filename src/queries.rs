//! Read-only projections over the satellite table.
//!
//! None of these mutate state: they are computed from whatever the table
//! holds when asked, stamped with the caller's query [Epoch] and the
//! current receiver-mode flags.
use std::collections::BTreeMap;

use hifitime::{Duration, Epoch};
use log::error;

use crate::{
    band::Band,
    engine::Engine,
    error::Error,
    record::{HealthStatus, PositioningRole, SatelliteKey, SatelliteRecord},
    stats::{
        primary_system, system_statistics, DiversityReport, PrimarySystem, SignalDistribution,
        SystemStats,
    },
    system::GnssSystem,
};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Full or filtered satellite listing with per-system rollups.
#[derive(Debug, Clone)]
pub struct SatelliteList {
    pub epoch: Epoch,
    pub external: bool,
    pub satellites: Vec<SatelliteRecord>,
    pub systems: BTreeMap<GnssSystem, SystemStats>,
}

/// Table-wide signal statistics.
#[derive(Debug, Clone)]
pub struct RangeStatistics {
    pub epoch: Epoch,
    pub external: bool,
    pub total_satellites: usize,
    pub with_signal: usize,
    pub used_in_fix: usize,
    /// Mean cn0 [dB-Hz] over signal-bearing records.
    pub average_signal: f64,
    pub systems: BTreeMap<GnssSystem, SystemStats>,
    pub primary: PrimarySystem,
    pub enhanced_band_active: bool,
}

/// One record enriched with its derived classifications.
#[derive(Debug, Clone)]
pub struct SatelliteDetail {
    pub record: SatelliteRecord,
    pub name: String,
    pub constellation: &'static str,
    pub band_description: &'static str,
    pub role: PositioningRole,
    pub health: HealthStatus,
    /// Time since first detection, zero if the query predates it.
    pub age: Duration,
}

#[derive(Debug, Clone)]
pub struct DetailedInfo {
    pub epoch: Epoch,
    pub external: bool,
    pub satellites: Vec<SatelliteDetail>,
}

/// Per-system counting summary.
#[derive(Debug, Clone)]
pub struct SatelliteSummary {
    pub epoch: Epoch,
    pub external: bool,
    pub total_satellites: usize,
    pub system_counts: BTreeMap<GnssSystem, usize>,
    pub system_used_counts: BTreeMap<GnssSystem, usize>,
    pub l5_by_system: BTreeMap<GnssSystem, usize>,
    pub total_l5: usize,
    pub primary: PrimarySystem,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SatelliteName {
    pub key: SatelliteKey,
    pub name: String,
    pub flag: &'static str,
    pub band: Band,
    pub l5: bool,
}

#[derive(Debug, Clone)]
pub struct NameReport {
    pub epoch: Epoch,
    pub external: bool,
    pub names: Vec<SatelliteName>,
    pub any_l5: bool,
}

/// Instantaneous per-system view: membership reflects the latest
/// snapshot only, while record details accumulate.
#[derive(Debug, Clone)]
pub struct ConstellationDetail {
    pub flag: &'static str,
    pub description: &'static str,
    pub count: usize,
    pub used: usize,
    pub average_signal: f64,
    pub l5_count: usize,
    /// Nominal catalog frequencies [MHz].
    pub nominal_frequencies_mhz: &'static [f64],
}

#[derive(Debug, Clone)]
pub struct ConstellationReport {
    pub epoch: Epoch,
    pub external: bool,
    pub systems: BTreeMap<GnssSystem, ConstellationDetail>,
}

/// Strength distribution over every record, signal-bearing or not.
#[derive(Debug, Clone)]
pub struct SignalAnalysis {
    pub epoch: Epoch,
    pub external: bool,
    pub distribution: SignalDistribution,
    pub with_signal: usize,
    pub average_signal: f64,
    pub l5_with_signal: usize,
    pub l5_average_signal: f64,
}

#[derive(Debug, Clone)]
pub struct SkyPosition {
    pub key: SatelliteKey,
    pub elevation_deg: f64,
    pub azimuth_deg: f64,
    pub cn0_dbhz: f64,
    pub used_in_fix: bool,
    pub band: Band,
}

#[derive(Debug, Clone)]
pub struct SkyReport {
    pub epoch: Epoch,
    pub external: bool,
    pub positions: Vec<SkyPosition>,
}

#[derive(Debug, Clone)]
pub struct CarrierInfo {
    pub key: SatelliteKey,
    pub band: Band,
    /// None while the receiver never exposed a carrier for this record.
    pub carrier_frequency_hz: Option<f64>,
    pub cn0_dbhz: f64,
    pub l5: bool,
}

#[derive(Debug, Clone)]
pub struct CarrierReport {
    pub epoch: Epoch,
    pub external: bool,
    pub enhanced_band_supported: bool,
    pub enhanced_band_active: bool,
    pub carriers: Vec<CarrierInfo>,
}

#[derive(Debug, Clone)]
pub struct EphemerisAlmanacStatus {
    pub epoch: Epoch,
    pub external: bool,
    pub total_satellites: usize,
    pub with_ephemeris: usize,
    pub with_almanac: usize,
    pub l5_with_ephemeris: usize,
    pub l5_with_almanac: usize,
    pub ephemeris_percentage: f64,
    pub almanac_percentage: f64,
}

/// How often and since when each identity has been seen.
#[derive(Debug, Clone)]
pub struct DetectionRecord {
    pub key: SatelliteKey,
    pub name: String,
    pub detection_count: u32,
    pub first_detection: Epoch,
    pub last_detection: Epoch,
    /// Time since first detection, zero if the query predates it.
    pub age: Duration,
    pub cn0_dbhz: f64,
    pub band: Band,
}

#[derive(Debug, Clone)]
pub struct DetectionHistory {
    pub epoch: Epoch,
    pub external: bool,
    pub entries: Vec<DetectionRecord>,
}

#[derive(Debug, Clone)]
pub struct DiversityOverview {
    pub epoch: Epoch,
    pub external: bool,
    pub report: DiversityReport,
    pub primary: PrimarySystem,
}

/// Signal quality histogram and weighted scores, over signal-bearing
/// records only.
#[derive(Debug, Clone)]
pub struct SignalQuality {
    pub epoch: Epoch,
    pub external: bool,
    pub total_satellites: usize,
    pub with_signal: usize,
    pub average_signal: f64,
    pub distribution: SignalDistribution,
    pub quality_score: f64,
    pub l5_distribution: SignalDistribution,
    pub l5_with_signal: usize,
    pub l5_average_signal: f64,
    pub l5_quality_score: f64,
}

fn age_at(t: Epoch, first_detection: Epoch) -> Duration {
    (t - first_detection).max(Duration::ZERO)
}

impl Engine {
    /// Every record currently held, with per-system rollups.
    pub fn all_satellites(&self, t: Epoch) -> SatelliteList {
        let satellites = self.table.records();
        let systems = system_statistics(&satellites);
        SatelliteList {
            epoch: t,
            external: self.receiver_external(),
            satellites,
            systems,
        }
    }

    /// Records above the in-range signal floor.
    /// [Error::NoDataYet] while the table is still empty.
    pub fn satellites_in_range(&self, t: Epoch) -> Result<SatelliteList, Error> {
        if self.table.is_empty() {
            return Err(Error::NoDataYet);
        }
        let satellites: Vec<_> = self
            .table
            .records()
            .into_iter()
            .filter(|rec| rec.cn0_dbhz > self.cfg.in_range_min_cn0_dbhz)
            .collect();
        let systems = system_statistics(&satellites);
        Ok(SatelliteList {
            epoch: t,
            external: self.receiver_external(),
            satellites,
            systems,
        })
    }

    /// Table-wide signal statistics and the primary system election.
    /// [Error::NoDataYet] while the table is still empty.
    pub fn range_statistics(&self, t: Epoch) -> Result<RangeStatistics, Error> {
        let records = self.table.records();
        if records.is_empty() {
            return Err(Error::NoDataYet);
        }

        let systems = system_statistics(&records);
        let used = systems
            .iter()
            .map(|(system, stat)| (*system, stat.used))
            .collect();

        let with_signal = records.iter().filter(|rec| rec.has_signal()).count();
        let used_in_fix = records.iter().filter(|rec| rec.used_in_fix).count();
        let average_signal = if with_signal > 0 {
            records
                .iter()
                .filter(|rec| rec.has_signal())
                .map(|rec| rec.cn0_dbhz)
                .sum::<f64>()
                / with_signal as f64
        } else {
            0.0
        };

        if !average_signal.is_finite() {
            error!("{} - non finite average over {} records", t, records.len());
            return Err(Error::InternalAggregation(
                "non finite average signal".to_string(),
            ));
        }

        Ok(RangeStatistics {
            epoch: t,
            external: self.receiver_external(),
            total_satellites: records.len(),
            with_signal,
            used_in_fix,
            average_signal,
            systems,
            primary: primary_system(&used),
            enhanced_band_active: self.enhanced_band_active(),
        })
    }

    /// Every record enriched with name, descriptions, positioning role,
    /// health status and detection age.
    /// [Error::NoDataYet] while the table is still empty.
    pub fn detailed_info(&self, t: Epoch) -> Result<DetailedInfo, Error> {
        let records = self.table.records();
        if records.is_empty() {
            return Err(Error::NoDataYet);
        }

        let satellites = records
            .into_iter()
            .map(|record| SatelliteDetail {
                name: record.name(),
                constellation: record.key.system.description(),
                band_description: record.band.description(),
                role: record.positioning_role(),
                health: record.health(),
                age: age_at(t, record.first_detection),
                record,
            })
            .collect();

        Ok(DetailedInfo {
            epoch: t,
            external: self.receiver_external(),
            satellites,
        })
    }

    /// Per-system counting summary, including the L5 breakdown.
    pub fn complete_summary(&self, t: Epoch) -> SatelliteSummary {
        let records = self.table.records();

        let mut system_counts: BTreeMap<GnssSystem, usize> = BTreeMap::new();
        let mut system_used_counts: BTreeMap<GnssSystem, usize> = BTreeMap::new();
        let mut l5_by_system: BTreeMap<GnssSystem, usize> = BTreeMap::new();

        for rec in &records {
            let system = rec.key.system;
            *system_counts.entry(system).or_default() += 1;
            if rec.used_in_fix {
                *system_used_counts.entry(system).or_default() += 1;
            }
            if rec.is_l5() {
                *l5_by_system.entry(system).or_default() += 1;
            }
        }

        SatelliteSummary {
            epoch: t,
            external: self.receiver_external(),
            total_satellites: records.len(),
            total_l5: l5_by_system.values().sum(),
            primary: primary_system(&system_used_counts),
            system_counts,
            system_used_counts,
            l5_by_system,
        }
    }

    /// Conventional vehicle designations for every record.
    pub fn satellite_names(&self, t: Epoch) -> NameReport {
        let names: Vec<_> = self
            .table
            .records()
            .into_iter()
            .map(|rec| SatelliteName {
                key: rec.key,
                name: rec.name(),
                flag: rec.flag,
                band: rec.band,
                l5: rec.is_l5(),
            })
            .collect();
        let any_l5 = names.iter().any(|name| name.l5);
        NameReport {
            epoch: t,
            external: self.receiver_external(),
            names,
            any_l5,
        }
    }

    /// Per-system details over the live index: membership reflects the
    /// latest snapshot only.
    pub fn constellation_details(&self, t: Epoch) -> ConstellationReport {
        let mut systems = BTreeMap::new();

        for system in self.table.systems() {
            let members = self.table.system_members(system);

            let used = members.iter().filter(|rec| rec.used_in_fix).count();
            let l5_count = members.iter().filter(|rec| rec.is_l5()).count();
            let with_signal = members.iter().filter(|rec| rec.has_signal()).count();
            let average_signal = if with_signal > 0 {
                members
                    .iter()
                    .filter(|rec| rec.has_signal())
                    .map(|rec| rec.cn0_dbhz)
                    .sum::<f64>()
                    / with_signal as f64
            } else {
                0.0
            };

            systems.insert(
                system,
                ConstellationDetail {
                    flag: system.flag(),
                    description: system.description(),
                    count: members.len(),
                    used,
                    average_signal,
                    l5_count,
                    nominal_frequencies_mhz: system.nominal_frequencies_mhz(),
                },
            );
        }

        ConstellationReport {
            epoch: t,
            external: self.receiver_external(),
            systems,
        }
    }

    /// Strength histogram over every record (silent records land in the
    /// POOR bucket), with overall and L5 subset averages.
    pub fn signal_analysis(&self, t: Epoch) -> SignalAnalysis {
        let records = self.table.records();

        let mut distribution = SignalDistribution::default();
        let mut with_signal = 0;
        let mut signal_sum = 0.0;
        let mut l5_with_signal = 0;
        let mut l5_signal_sum = 0.0;

        for rec in &records {
            distribution.add(rec.signal_strength());
            if rec.has_signal() {
                with_signal += 1;
                signal_sum += rec.cn0_dbhz;
                if rec.is_l5() {
                    l5_with_signal += 1;
                    l5_signal_sum += rec.cn0_dbhz;
                }
            }
        }

        SignalAnalysis {
            epoch: t,
            external: self.receiver_external(),
            distribution,
            with_signal,
            average_signal: mean(signal_sum, with_signal),
            l5_with_signal,
            l5_average_signal: mean(l5_signal_sum, l5_with_signal),
        }
    }

    /// Elevation/azimuth sky view of every record.
    pub fn sky_positions(&self, t: Epoch) -> SkyReport {
        let positions = self
            .table
            .records()
            .into_iter()
            .map(|rec| SkyPosition {
                key: rec.key,
                elevation_deg: rec.elevation_deg,
                azimuth_deg: rec.azimuth_deg,
                cn0_dbhz: rec.cn0_dbhz,
                used_in_fix: rec.used_in_fix,
                band: rec.band,
            })
            .collect();
        SkyReport {
            epoch: t,
            external: self.receiver_external(),
            positions,
        }
    }

    /// Band and carrier data for every record.
    pub fn carrier_info(&self, t: Epoch) -> CarrierReport {
        let carriers = self
            .table
            .records()
            .into_iter()
            .map(|rec| CarrierInfo {
                key: rec.key,
                band: rec.band,
                carrier_frequency_hz: (rec.carrier_frequency_hz > 0.0)
                    .then_some(rec.carrier_frequency_hz),
                cn0_dbhz: rec.cn0_dbhz,
                l5: rec.is_l5(),
            })
            .collect();
        CarrierReport {
            epoch: t,
            external: self.receiver_external(),
            enhanced_band_supported: self.enhanced_band_supported(),
            enhanced_band_active: self.enhanced_band_active(),
            carriers,
        }
    }

    /// Orbital data availability across the table.
    pub fn ephemeris_almanac_status(&self, t: Epoch) -> EphemerisAlmanacStatus {
        let records = self.table.records();
        let total = records.len();

        let with_ephemeris = records.iter().filter(|rec| rec.has_ephemeris).count();
        let with_almanac = records.iter().filter(|rec| rec.has_almanac).count();
        let l5_with_ephemeris = records
            .iter()
            .filter(|rec| rec.is_l5() && rec.has_ephemeris)
            .count();
        let l5_with_almanac = records
            .iter()
            .filter(|rec| rec.is_l5() && rec.has_almanac)
            .count();

        EphemerisAlmanacStatus {
            epoch: t,
            external: self.receiver_external(),
            total_satellites: total,
            with_ephemeris,
            with_almanac,
            l5_with_ephemeris,
            l5_with_almanac,
            ephemeris_percentage: percentage(with_ephemeris, total),
            almanac_percentage: percentage(with_almanac, total),
        }
    }

    /// Detection bookkeeping for every record.
    pub fn detection_history(&self, t: Epoch) -> DetectionHistory {
        let entries = self
            .table
            .records()
            .into_iter()
            .map(|rec| DetectionRecord {
                key: rec.key,
                name: rec.name(),
                detection_count: rec.detection_count,
                first_detection: rec.first_detection,
                last_detection: rec.last_detection,
                age: age_at(t, rec.first_detection),
                cn0_dbhz: rec.cn0_dbhz,
                band: rec.band,
            })
            .collect();
        DetectionHistory {
            epoch: t,
            external: self.receiver_external(),
            entries,
        }
    }

    /// Cross constellation diversity over the live index.
    pub fn diversity_report(&self, t: Epoch) -> DiversityOverview {
        let report = DiversityReport::evaluate(self.table.systems(), self.table.len());
        DiversityOverview {
            epoch: t,
            external: self.receiver_external(),
            report,
            primary: self.primary_system(),
        }
    }

    /// Quality histogram and weighted scores over signal-bearing records.
    pub fn signal_quality(&self, t: Epoch) -> Result<SignalQuality, Error> {
        let records = self.table.records();

        let mut distribution = SignalDistribution::default();
        let mut l5_distribution = SignalDistribution::default();
        let mut signal_sum = 0.0;
        let mut l5_signal_sum = 0.0;

        for rec in records.iter().filter(|rec| rec.has_signal()) {
            let strength = rec.signal_strength();
            distribution.add(strength);
            signal_sum += rec.cn0_dbhz;
            if rec.is_l5() {
                l5_distribution.add(strength);
                l5_signal_sum += rec.cn0_dbhz;
            }
        }

        let with_signal = distribution.total();
        let l5_with_signal = l5_distribution.total();
        let average_signal = mean(signal_sum, with_signal);

        if !average_signal.is_finite() {
            error!("{} - non finite quality aggregate", t);
            return Err(Error::InternalAggregation(
                "non finite quality aggregate".to_string(),
            ));
        }

        Ok(SignalQuality {
            epoch: t,
            external: self.receiver_external(),
            total_satellites: records.len(),
            with_signal,
            average_signal,
            quality_score: distribution.quality_score(),
            distribution,
            l5_with_signal,
            l5_average_signal: mean(l5_signal_sum, l5_with_signal),
            l5_quality_score: l5_distribution.quality_score(),
            l5_distribution,
        })
    }

    /// Primary positioning system election over the current table.
    pub fn primary_system(&self) -> PrimarySystem {
        let records = self.table.records();
        let mut used: BTreeMap<GnssSystem, usize> = BTreeMap::new();
        for rec in records.iter().filter(|rec| rec.used_in_fix) {
            *used.entry(rec.key.system).or_default() += 1;
        }
        primary_system(&used)
    }
}

fn mean(sum: f64, count: usize) -> f64 {
    if count > 0 {
        sum / count as f64
    } else {
        0.0
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total > 0 {
        part as f64 * 100.0 / total as f64
    } else {
        0.0
    }
}
