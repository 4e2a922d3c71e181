//! Quantitative link attributes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Quantitative attributes of the active link, when the platform reports them.
///
/// Metrics the platform does not provide hold [`LinkDetails::UNKNOWN`]
/// rather than being omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkDetails {
    /// Signal strength on the platform's scale (RSSI in dBm for Wi-Fi).
    pub strength: i32,
    /// Radio frequency in MHz.
    pub frequency: i32,
    /// Link speed in Mbps.
    pub link_speed: i32,
}

impl LinkDetails {
    /// Sentinel for metrics that are absent or unsupported.
    pub const UNKNOWN: i32 = -1;

    /// Details with every metric unknown.
    pub const fn unknown() -> Self {
        Self {
            strength: Self::UNKNOWN,
            frequency: Self::UNKNOWN,
            link_speed: Self::UNKNOWN,
        }
    }

    /// Signal strength, if known.
    pub fn strength(&self) -> Option<i32> {
        known(self.strength)
    }

    /// Frequency, if known.
    pub fn frequency(&self) -> Option<i32> {
        known(self.frequency)
    }

    /// Link speed, if known.
    pub fn link_speed(&self) -> Option<i32> {
        known(self.link_speed)
    }

    /// Whether every metric is unknown.
    pub fn is_unknown(&self) -> bool {
        *self == Self::unknown()
    }

    /// Serialize into the flat bridge mapping.
    pub fn to_dictionary(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("strength".into(), Value::from(self.strength));
        map.insert("frequency".into(), Value::from(self.frequency));
        map.insert("linkSpeed".into(), Value::from(self.link_speed));
        map
    }
}

impl Default for LinkDetails {
    fn default() -> Self {
        Self::unknown()
    }
}

fn known(value: i32) -> Option<i32> {
    (value != LinkDetails::UNKNOWN).then_some(value)
}
