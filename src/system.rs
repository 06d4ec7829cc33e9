//! Constellation catalog
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Navigation systems a receiver may report, keyed by the platform's
/// numeric constellation identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GnssSystem {
    /// GPS (USA)
    #[default]
    Gps,
    /// SBAS augmentation vehicles
    Sbas,
    /// GLONASS (Russia)
    Glonass,
    /// QZSS (Japan)
    Qzss,
    /// BeiDou (China)
    Beidou,
    /// Galileo (Europe)
    Galileo,
    /// IRNSS / NavIC (India)
    Irnss,
    /// Identifier the catalog does not know. Id 0 is the platform's own
    /// "unknown" marker.
    Unknown(u16),
}

impl std::fmt::Display for GnssSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self {
            Self::Gps => write!(f, "GPS"),
            Self::Sbas => write!(f, "SBAS"),
            Self::Glonass => write!(f, "GLONASS"),
            Self::Qzss => write!(f, "QZSS"),
            Self::Beidou => write!(f, "BEIDOU"),
            Self::Galileo => write!(f, "GALILEO"),
            Self::Irnss => write!(f, "IRNSS"),
            Self::Unknown(0) => write!(f, "UNKNOWN"),
            Self::Unknown(id) => write!(f, "UNKNOWN_{}", id),
        }
    }
}

impl GnssSystem {
    /// Check order when electing a primary positioning system.
    pub const FIX_PRIORITY: [GnssSystem; 5] = [
        Self::Irnss,
        Self::Gps,
        Self::Glonass,
        Self::Galileo,
        Self::Beidou,
    ];

    /// Resolves the platform's numeric constellation identifier.
    pub fn from_id(id: u16) -> Self {
        match id {
            1 => Self::Gps,
            2 => Self::Sbas,
            3 => Self::Glonass,
            4 => Self::Qzss,
            5 => Self::Beidou,
            6 => Self::Galileo,
            7 => Self::Irnss,
            other => Self::Unknown(other),
        }
    }

    /// Numeric identifier this system is reported under.
    pub fn id(&self) -> u16 {
        match self {
            Self::Gps => 1,
            Self::Sbas => 2,
            Self::Glonass => 3,
            Self::Qzss => 4,
            Self::Beidou => 5,
            Self::Galileo => 6,
            Self::Irnss => 7,
            Self::Unknown(id) => *id,
        }
    }

    /// Region tag of the operating country or consortium.
    pub fn flag(&self) -> &'static str {
        match self {
            Self::Gps => "🇺🇸",
            Self::Glonass => "🇷🇺",
            Self::Galileo => "🇪🇺",
            Self::Beidou => "🇨🇳",
            Self::Irnss => "🇮🇳",
            Self::Qzss => "🇯🇵",
            Self::Sbas => "🌍",
            Self::Unknown(_) => "🌐",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Irnss => "Indian Regional Navigation Satellite System (NavIC)",
            Self::Gps => "Global Positioning System (USA)",
            Self::Glonass => "Global Navigation Satellite System (Russia)",
            Self::Galileo => "European Global Navigation Satellite System",
            Self::Beidou => "BeiDou Navigation Satellite System (China)",
            Self::Qzss => "Quasi-Zenith Satellite System (Japan)",
            Self::Sbas => "Satellite-Based Augmentation System",
            Self::Unknown(_) => "Unknown Navigation System",
        }
    }

    /// Nominal carrier frequencies broadcast by this system, in MHz.
    pub fn nominal_frequencies_mhz(&self) -> &'static [f64] {
        match self {
            Self::Gps | Self::Qzss => &[1575.42, 1227.60, 1176.45],
            Self::Glonass => &[1602.00, 1246.00, 1202.025],
            Self::Galileo => &[1575.42, 1207.14, 1176.45],
            Self::Beidou => &[1561.098, 1207.14, 1176.45],
            Self::Irnss => &[1176.45, 2492.028],
            Self::Sbas | Self::Unknown(_) => &[],
        }
    }

    /// Conventional per-system vehicle designation.
    pub fn satellite_name(&self, svid: u16) -> String {
        match self {
            Self::Irnss => format!("IRNSS-{:02}", svid),
            Self::Gps => format!("GPS PRN-{:02}", svid),
            Self::Glonass => format!("GLONASS Slot-{:02}", svid),
            Self::Galileo => format!("Galileo E{:02}", svid),
            Self::Beidou => format!("BeiDou C{:02}", svid),
            Self::Qzss => format!("QZSS-{:02}", svid),
            other => format!("{}-{:02}", other, svid),
        }
    }
}
