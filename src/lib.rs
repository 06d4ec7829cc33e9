#![doc = include_str!("../README.md")]

// private modules
mod band;
mod cfg;
mod engine;
mod error;
mod observation;
mod publisher;
mod queries;
mod record;
mod session;
mod source;
mod stats;
mod system;
mod table;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::band::Band;
    pub use crate::cfg::Config;
    pub use crate::engine::{Engine, MergeReport, NavicSummary};
    pub use crate::error::Error;
    pub use crate::observation::{SatelliteObservation, Snapshot};
    pub use crate::publisher::{Digest, Publisher};
    pub use crate::queries::{
        CarrierInfo, CarrierReport, ConstellationDetail, ConstellationReport, DetailedInfo,
        DetectionHistory, DetectionRecord, DiversityOverview, EphemerisAlmanacStatus, NameReport,
        RangeStatistics, SatelliteDetail, SatelliteList, SatelliteName, SatelliteSummary,
        SignalAnalysis, SignalQuality, SkyPosition, SkyReport,
    };
    pub use crate::record::{
        HealthStatus, PositioningRole, SatelliteKey, SatelliteRecord, SignalStrength,
    };
    pub use crate::session::{Session, SessionKind};
    pub use crate::source::{FixedReceiverMode, ReceiverModeProvider, SnapshotSource};
    pub use crate::stats::{
        DiversityLevel, DiversityReport, PrimarySystem, SignalDistribution, SystemStats,
    };
    pub use crate::system::GnssSystem;
    // re-export
    pub use hifitime::{Duration, Epoch};
}

// pub export
pub use error::Error;
