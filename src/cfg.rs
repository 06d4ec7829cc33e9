//! Engine configuration
use hifitime::Duration;

#[cfg(feature = "serde")]
use serde::Deserialize;

fn default_navic_confirmation() -> f64 {
    15.0
}

fn default_in_range_floor() -> f64 {
    0.0
}

fn default_settle_time() -> Duration {
    Duration::from_seconds(3.0)
}

fn default_first_data_timeout() -> Duration {
    Duration::from_seconds(10.0)
}

fn default_digest_capacity() -> usize {
    64
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct Config {
    /// Signal floor [dB-Hz] above which an IRNSS observation counts as a
    /// confirmed NavIC sighting. Low confidence IRNSS reports are common
    /// false positives on mixed receivers; below the floor they are still
    /// merged into the table but excluded from confirmed reporting.
    #[cfg_attr(feature = "serde", serde(default = "default_navic_confirmation"))]
    pub navic_confirmation_cn0_dbhz: f64,

    /// cn0 [dB-Hz] above which a record counts as in range.
    /// Independent from the NavIC confirmation floor.
    #[cfg_attr(feature = "serde", serde(default = "default_in_range_floor"))]
    pub in_range_min_cn0_dbhz: f64,

    /// Producer warmup before a first-data wait may return early.
    #[cfg_attr(feature = "serde", serde(default = "default_settle_time"))]
    pub settle_time: Duration,

    /// Bounded wait before a first-data query gives up with
    /// [Error::NoDataYet](crate::Error::NoDataYet).
    #[cfg_attr(feature = "serde", serde(default = "default_first_data_timeout"))]
    pub first_data_timeout: Duration,

    /// Capacity of the live digest broadcast channel. Slow subscribers
    /// past this depth lag instead of stalling the ingest path.
    #[cfg_attr(feature = "serde", serde(default = "default_digest_capacity"))]
    pub digest_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            navic_confirmation_cn0_dbhz: default_navic_confirmation(),
            in_range_min_cn0_dbhz: default_in_range_floor(),
            settle_time: default_settle_time(),
            first_data_timeout: default_first_data_timeout(),
            digest_capacity: default_digest_capacity(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::Config;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.navic_confirmation_cn0_dbhz, 15.0);
        assert_eq!(cfg.in_range_min_cn0_dbhz, 0.0);
        assert_eq!(cfg.digest_capacity, 64);
    }

    #[test]
    #[cfg(feature = "serde")]
    fn partial_deserialization() {
        let cfg: Config = serde_json::from_str(
            r#"{
                "navic_confirmation_cn0_dbhz": 12.5
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.navic_confirmation_cn0_dbhz, 12.5);
        assert_eq!(cfg.in_range_min_cn0_dbhz, 0.0);
    }
}
