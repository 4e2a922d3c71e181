//! Transport and capability flags.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::network_type::NetworkType;

/// Boolean transport and capability flags of the current network path.
///
/// Transport flags are not mutually exclusive (a VPN usually rides over Wi-Fi
/// or cellular). A `CapabilitySet` is always recomputed wholesale from a raw
/// signal; it is never patched field by field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CapabilitySet {
    pub has_transport_wifi: bool,
    pub has_transport_cellular: bool,
    pub has_transport_ethernet: bool,
    pub has_transport_bluetooth: bool,
    pub has_transport_vpn: bool,
    /// The path can reach the internet.
    pub has_capability_internet: bool,
    /// Internet reachability has been validated by the platform.
    pub has_capability_validated: bool,
    /// The path is gated by a captive portal.
    pub has_capability_captive_portal: bool,
}

impl CapabilitySet {
    /// Whether any transport flag is set.
    pub fn has_any_transport(&self) -> bool {
        self.has_transport_wifi
            || self.has_transport_cellular
            || self.has_transport_ethernet
            || self.has_transport_bluetooth
            || self.has_transport_vpn
    }

    /// Whether the flag for the given transport is set.
    ///
    /// `None` and `Unknown` have no flag and are never set.
    pub fn has_transport(&self, ty: NetworkType) -> bool {
        match ty {
            NetworkType::Wifi => self.has_transport_wifi,
            NetworkType::Cellular => self.has_transport_cellular,
            NetworkType::Ethernet => self.has_transport_ethernet,
            NetworkType::Bluetooth => self.has_transport_bluetooth,
            NetworkType::Vpn => self.has_transport_vpn,
            NetworkType::None | NetworkType::Unknown => false,
        }
    }

    /// Set the flag for the given transport. Non-transport types are ignored.
    pub fn with_transport(mut self, ty: NetworkType) -> Self {
        match ty {
            NetworkType::Wifi => self.has_transport_wifi = true,
            NetworkType::Cellular => self.has_transport_cellular = true,
            NetworkType::Ethernet => self.has_transport_ethernet = true,
            NetworkType::Bluetooth => self.has_transport_bluetooth = true,
            NetworkType::Vpn => self.has_transport_vpn = true,
            NetworkType::None | NetworkType::Unknown => {}
        }
        self
    }

    /// The highest-precedence transport present, or `NetworkType::None`.
    pub fn dominant_transport(&self) -> NetworkType {
        NetworkType::PRECEDENCE
            .into_iter()
            .find(|ty| self.has_transport(*ty))
            .unwrap_or(NetworkType::None)
    }

    /// Enforce the cross-field invariants.
    ///
    /// - validated implies internet: an unvalidated path keeps its internet
    ///   flag, but validation without internet is dropped.
    /// - without any transport there is no internet, validation or portal.
    pub fn normalized(mut self) -> Self {
        if !self.has_any_transport() {
            self.has_capability_internet = false;
            self.has_capability_validated = false;
            self.has_capability_captive_portal = false;
        }
        if !self.has_capability_internet {
            self.has_capability_validated = false;
        }
        self
    }

    /// Serialize into the flat bridge mapping (8 boolean entries).
    pub fn to_dictionary(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("hasTransportWifi".into(), Value::Bool(self.has_transport_wifi));
        map.insert("hasTransportCellular".into(), Value::Bool(self.has_transport_cellular));
        map.insert("hasTransportEthernet".into(), Value::Bool(self.has_transport_ethernet));
        map.insert("hasTransportBluetooth".into(), Value::Bool(self.has_transport_bluetooth));
        map.insert("hasTransportVpn".into(), Value::Bool(self.has_transport_vpn));
        map.insert("hasCapabilityInternet".into(), Value::Bool(self.has_capability_internet));
        map.insert("hasCapabilityValidated".into(), Value::Bool(self.has_capability_validated));
        map.insert(
            "hasCapabilityCaptivePortal".into(),
            Value::Bool(self.has_capability_captive_portal),
        );
        map
    }
}
