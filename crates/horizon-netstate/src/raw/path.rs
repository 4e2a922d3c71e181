//! Path-monitor style signal description.

use serde::{Deserialize, Serialize};

use crate::state::LinkDetails;

/// Overall status of a network path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PathStatus {
    /// The path is usable.
    Satisfied,
    /// The path is not usable.
    #[default]
    Unsatisfied,
    /// The path is not currently usable but may become so once a connection
    /// is established (for example after signing in to a captive portal).
    RequiresConnection,
    /// The platform reported a path it could not describe.
    Invalid,
}

/// Kind of interface carrying a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InterfaceKind {
    Wifi,
    Cellular,
    WiredEthernet,
    Bluetooth,
    Vpn,
    Loopback,
    Other,
}

/// A structured description of the current network path, as delivered by a
/// path monitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PathDescription {
    /// Overall path status.
    pub status: PathStatus,
    /// Interfaces used by the path, most preferred first.
    pub interfaces: Vec<InterfaceKind>,
    /// The path can route IPv4.
    pub supports_ipv4: bool,
    /// The path can route IPv6.
    pub supports_ipv6: bool,
    /// The path has working name resolution.
    pub supports_dns: bool,
    /// The path is considered expensive (cellular, personal hotspot).
    pub is_expensive: bool,
    /// The path is in a data-saving (constrained) mode.
    pub is_constrained: bool,
    /// Link metrics, if the platform reports them.
    pub link: LinkDetails,
}

impl PathDescription {
    /// A usable path over the given interfaces with IPv4 and DNS.
    pub fn satisfied(interfaces: impl IntoIterator<Item = InterfaceKind>) -> Self {
        Self {
            status: PathStatus::Satisfied,
            interfaces: interfaces.into_iter().collect(),
            supports_ipv4: true,
            supports_dns: true,
            ..Default::default()
        }
    }

    /// A path with no usable interface.
    pub fn unsatisfied() -> Self {
        Self::default()
    }

    /// Whether the path uses an interface of the given kind.
    pub fn uses(&self, kind: InterfaceKind) -> bool {
        self.interfaces.contains(&kind)
    }

    pub fn with_expensive(mut self, expensive: bool) -> Self {
        self.is_expensive = expensive;
        self
    }

    pub fn with_constrained(mut self, constrained: bool) -> Self {
        self.is_constrained = constrained;
        self
    }

    pub fn with_link(mut self, link: LinkDetails) -> Self {
        self.link = link;
        self
    }
}
