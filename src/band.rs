//! Frequency band inference
use crate::system::GnssSystem;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Acceptance window around known band centers [MHz].
const TOLERANCE_MHZ: f64 = 2.0;

/// Symbolic carrier band label, inferred from a measured carrier
/// frequency when the receiver exposes one, otherwise from the
/// constellation's static default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Band {
    /// L1 (GPS/QZSS/SBAS), 1575.42 MHz
    #[default]
    L1,
    /// L2 (GPS/QZSS), 1227.60 MHz
    L2,
    /// L5 (GPS/QZSS/IRNSS), 1176.45 MHz
    L5,
    /// S band (IRNSS), 2492.028 MHz
    S,
    /// G1 (GLONASS), 1602.0 MHz
    G1,
    /// G2 (GLONASS), 1246.0 MHz
    G2,
    /// E5 (Galileo), 1207.14 MHz
    E5,
    /// B3 (BeiDou), 1268.52 MHz
    B3,
    /// GPS/QZSS dual frequency default on enhanced receivers
    L1L5,
    /// IRNSS dual band default on enhanced receivers
    L5S,
    /// Galileo single frequency default
    E1,
    /// Galileo dual frequency default on enhanced receivers
    E1E5a,
    /// BeiDou single frequency default
    B1,
    /// BeiDou dual frequency default on enhanced receivers
    B1B2a,
    /// Carrier matched no catalog entry: rounded MHz value.
    Other(u16),
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self {
            Self::L1 => write!(f, "L1"),
            Self::L2 => write!(f, "L2"),
            Self::L5 => write!(f, "L5"),
            Self::S => write!(f, "S"),
            Self::G1 => write!(f, "G1"),
            Self::G2 => write!(f, "G2"),
            Self::E5 => write!(f, "E5"),
            Self::B3 => write!(f, "B3"),
            Self::L1L5 => write!(f, "L1/L5"),
            Self::L5S => write!(f, "L5/S"),
            Self::E1 => write!(f, "E1"),
            Self::E1E5a => write!(f, "E1/E5a"),
            Self::B1 => write!(f, "B1"),
            Self::B1B2a => write!(f, "B1/B2a"),
            Self::Other(mhz) => write!(f, "{} MHz", mhz),
        }
    }
}

impl Band {
    /// Known band centers [MHz], in match priority order: first match wins.
    const CENTERS: [(Band, f64); 8] = [
        (Band::L5, 1176.45),
        (Band::L1, 1575.42),
        (Band::L2, 1227.60),
        (Band::S, 2492.028),
        (Band::G1, 1602.0),
        (Band::G2, 1246.0),
        (Band::E5, 1207.14),
        (Band::B3, 1268.52),
    ];

    /// Infers the band label for an observation.
    /// A nonzero carrier frequency is matched against the known centers;
    /// without one the constellation's default applies, conditioned on
    /// whether the receiver exposes the enhanced (L5 class) band.
    /// Never fails: unmatched carriers synthesize an [Band::Other] label.
    pub fn classify(carrier_hz: f64, system: GnssSystem, enhanced: bool) -> Self {
        if carrier_hz > 0.0 {
            Self::from_carrier_hz(carrier_hz)
        } else {
            Self::constellation_default(system, enhanced)
        }
    }

    /// Matches a measured carrier [Hz] against the known band centers.
    pub fn from_carrier_hz(carrier_hz: f64) -> Self {
        let mhz = carrier_hz / 1.0E6;
        for (band, center_mhz) in Self::CENTERS {
            if (mhz - center_mhz).abs() <= TOLERANCE_MHZ {
                return band;
            }
        }
        Self::Other(mhz.round() as u16)
    }

    /// Static per-constellation default, for receivers that do not
    /// expose carrier frequencies.
    pub fn constellation_default(system: GnssSystem, enhanced: bool) -> Self {
        match system {
            GnssSystem::Irnss => {
                if enhanced {
                    Self::L5S
                } else {
                    Self::L5
                }
            },
            GnssSystem::Gps | GnssSystem::Qzss => {
                if enhanced {
                    Self::L1L5
                } else {
                    Self::L1
                }
            },
            GnssSystem::Galileo => {
                if enhanced {
                    Self::E1E5a
                } else {
                    Self::E1
                }
            },
            GnssSystem::Beidou => {
                if enhanced {
                    Self::B1B2a
                } else {
                    Self::B1
                }
            },
            GnssSystem::Glonass => Self::G1,
            _ => Self::L1,
        }
    }

    /// True when this label carries the L5 (1176.45 MHz) component.
    pub fn includes_l5(&self) -> bool {
        matches!(self, Self::L5 | Self::L1L5 | Self::L5S)
    }

    /// Center frequency [MHz] for single-band labels.
    pub fn center_frequency_mhz(&self) -> Option<f64> {
        Self::CENTERS
            .iter()
            .find(|(band, _)| band == self)
            .map(|(_, mhz)| *mhz)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::L1 => "Primary GNSS frequency (1575.42 MHz)",
            Self::L2 => "Secondary GNSS frequency (1227.60 MHz)",
            Self::L5 => "Enhanced safety-of-life frequency (1176.45 MHz) - High Accuracy",
            Self::S => "NavIC S-band (2492.028 MHz)",
            Self::G1 => "GLONASS primary frequency",
            Self::G2 => "GLONASS secondary frequency",
            Self::E5 => "Galileo enhanced frequency",
            Self::B3 => "BeiDou B3 frequency (1268.52 MHz)",
            Self::L1L5 => "GPS/QZSS dual frequency (L1 + L5)",
            Self::L5S => "NavIC dual band (L5 + S)",
            Self::E1 => "Galileo primary frequency",
            Self::E1E5a => "Galileo dual frequency (E1 + E5a)",
            Self::B1 => "BeiDou primary frequency",
            Self::B1B2a => "BeiDou dual frequency (B1 + B2a)",
            Self::Other(_) => "Unidentified carrier frequency",
        }
    }
}
