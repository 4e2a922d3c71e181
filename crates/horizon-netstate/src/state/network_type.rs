//! Network transport classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The dominant transport of the current network path.
///
/// The lowercase string form (`"wifi"`, `"cellular"`, ...) is part of the
/// serialized state contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    /// No transport is available.
    #[default]
    None,
    /// Wireless LAN.
    Wifi,
    /// Mobile data.
    Cellular,
    /// Wired Ethernet.
    Ethernet,
    /// Bluetooth tethering (PAN).
    Bluetooth,
    /// Virtual private network.
    Vpn,
    /// The state could not be determined.
    Unknown,
}

impl NetworkType {
    /// Transport types in precedence order, highest first.
    ///
    /// When several transports are present at once, the first one in this
    /// list is the snapshot's `type`.
    pub const PRECEDENCE: [NetworkType; 5] = [
        NetworkType::Ethernet,
        NetworkType::Wifi,
        NetworkType::Cellular,
        NetworkType::Bluetooth,
        NetworkType::Vpn,
    ];

    /// The stable lowercase name of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkType::None => "none",
            NetworkType::Wifi => "wifi",
            NetworkType::Cellular => "cellular",
            NetworkType::Ethernet => "ethernet",
            NetworkType::Bluetooth => "bluetooth",
            NetworkType::Vpn => "vpn",
            NetworkType::Unknown => "unknown",
        }
    }

    /// Whether this type names a physical or virtual transport.
    pub fn is_transport(&self) -> bool {
        !matches!(self, NetworkType::None | NetworkType::Unknown)
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized network type name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized network type '{0}'")]
pub struct ParseNetworkTypeError(pub String);

impl FromStr for NetworkType {
    type Err = ParseNetworkTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(NetworkType::None),
            "wifi" => Ok(NetworkType::Wifi),
            "cellular" => Ok(NetworkType::Cellular),
            "ethernet" => Ok(NetworkType::Ethernet),
            "bluetooth" => Ok(NetworkType::Bluetooth),
            "vpn" => Ok(NetworkType::Vpn),
            "unknown" => Ok(NetworkType::Unknown),
            _ => Err(ParseNetworkTypeError(s.to_string())),
        }
    }
}
