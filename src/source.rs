//! Collaborator interfaces
use crate::{error::Error, observation::Snapshot};

/// Produces visibility snapshots on its own cadence: the platform
/// location stack, a USB receiver bridge, or a replay in tests.
pub trait SnapshotSource {
    /// Next snapshot, or the condition preventing one.
    /// [Error::PermissionDenied] and [Error::ReceiverUnavailable] surface
    /// to the caller before any merge is attempted.
    fn next_snapshot(&mut self) -> Result<Snapshot, Error>;
}

/// Describes which receiver currently drives the snapshots. Queried at
/// every ingest: band inference and record identity both depend on it.
pub trait ReceiverModeProvider {
    /// True when an external (USB) receiver is active. External and
    /// internal observations of the same svid never merge.
    fn is_external(&self) -> bool;

    /// Vendor / device description of the active receiver.
    fn device_info(&self) -> String;

    /// True when the receiver exposes the enhanced (L5 class) band,
    /// which selects the dual-band constellation defaults.
    fn supports_enhanced_band(&self) -> bool;

    /// True when a receiver is up and able to deliver snapshots at all.
    fn is_available(&self) -> bool {
        true
    }
}

/// Fixed receiver description, for static setups and tests.
#[derive(Debug, Clone)]
pub struct FixedReceiverMode {
    pub external: bool,
    pub device_info: String,
    pub enhanced_band: bool,
    pub available: bool,
}

impl FixedReceiverMode {
    /// Internal chipset, no enhanced band.
    pub fn internal() -> Self {
        Self {
            external: false,
            device_info: "INTERNAL".to_string(),
            enhanced_band: false,
            available: true,
        }
    }

    /// External receiver with the given device description.
    /// External devices are assumed L5 capable.
    pub fn external(device_info: &str) -> Self {
        Self {
            external: true,
            device_info: device_info.to_string(),
            enhanced_band: true,
            available: true,
        }
    }

    /// No receiver at all: sessions refuse to open.
    pub fn unavailable() -> Self {
        Self {
            external: false,
            device_info: "NONE".to_string(),
            enhanced_band: false,
            available: false,
        }
    }
}

impl ReceiverModeProvider for FixedReceiverMode {
    fn is_external(&self) -> bool {
        self.external
    }

    fn device_info(&self) -> String {
        self.device_info.clone()
    }

    fn supports_enhanced_band(&self) -> bool {
        self.enhanced_band
    }

    fn is_available(&self) -> bool {
        self.available
    }
}
