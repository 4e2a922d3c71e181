//! The immutable network state snapshot.

use serde::Serialize;
use serde_json::{Map, Value};

use super::capabilities::CapabilitySet;
use super::details::LinkDetails;
use super::network_type::NetworkType;

/// Cost classification of a path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LinkCost {
    /// Cellular or hotspot-like cost.
    pub expensive: bool,
    /// Data-cap-aware cost.
    pub metered: bool,
}

/// A point-in-time record of the host's network state.
///
/// Snapshots are immutable: every update produces a new instance, which the
/// monitor publishes behind an `Arc`. Listeners may keep a published snapshot
/// for as long as they like.
///
/// The constructors uphold the relationships between fields:
///
/// - `is_connected` is true exactly when some transport flag is set.
/// - `network_type` is the highest-precedence transport present
///   ([`NetworkType::PRECEDENCE`]), `None` without transports, or `Unknown`
///   when the state could not be determined.
/// - `is_internet_reachable` mirrors the internet capability, which
///   validation implies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSnapshot {
    is_connected: bool,
    is_internet_reachable: bool,
    #[serde(rename = "type")]
    network_type: NetworkType,
    is_expensive: bool,
    is_metered: bool,
    capabilities: CapabilitySet,
    details: LinkDetails,
}

impl NetworkSnapshot {
    /// Build a snapshot from derived capability flags.
    ///
    /// The capabilities are normalized first; cost flags are cleared when no
    /// transport is present.
    pub fn from_capabilities(
        capabilities: CapabilitySet,
        details: LinkDetails,
        cost: LinkCost,
    ) -> Self {
        Self::assemble(capabilities, details, cost, false)
    }

    /// Build a snapshot for a path that is up but whose link kind is not
    /// recognized: without transport flags its type is `Unknown` rather than
    /// `None`.
    pub(crate) fn from_unrecognized_link(
        capabilities: CapabilitySet,
        details: LinkDetails,
        cost: LinkCost,
    ) -> Self {
        Self::assemble(capabilities, details, cost, true)
    }

    fn assemble(
        capabilities: CapabilitySet,
        details: LinkDetails,
        cost: LinkCost,
        unrecognized_link: bool,
    ) -> Self {
        let capabilities = capabilities.normalized();
        let is_connected = capabilities.has_any_transport();
        let network_type = match capabilities.dominant_transport() {
            NetworkType::None if unrecognized_link => NetworkType::Unknown,
            ty => ty,
        };

        Self {
            is_connected,
            is_internet_reachable: capabilities.has_capability_internet,
            network_type,
            is_expensive: is_connected && cost.expensive,
            is_metered: is_connected && cost.metered,
            capabilities,
            details,
        }
    }

    /// The default state: disconnected, type `None`.
    ///
    /// This is what a monitor reports before it has ever been started.
    pub fn disconnected() -> Self {
        Self::from_capabilities(
            CapabilitySet::default(),
            LinkDetails::unknown(),
            LinkCost::default(),
        )
    }

    /// The fail-safe state for signals that could not be interpreted:
    /// disconnected, not reachable, type `Unknown`.
    pub fn unknown() -> Self {
        Self {
            network_type: NetworkType::Unknown,
            ..Self::disconnected()
        }
    }

    pub fn is_connected(&self) -> bool {
        self.is_connected
    }

    pub fn is_internet_reachable(&self) -> bool {
        self.is_internet_reachable
    }

    pub fn network_type(&self) -> NetworkType {
        self.network_type
    }

    pub fn is_expensive(&self) -> bool {
        self.is_expensive
    }

    pub fn is_metered(&self) -> bool {
        self.is_metered
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    pub fn details(&self) -> &LinkDetails {
        &self.details
    }

    /// Whether the given transport is present in this snapshot.
    pub fn has_transport(&self, ty: NetworkType) -> bool {
        self.capabilities.has_transport(ty)
    }

    /// Whether the state could not be determined.
    pub fn is_unknown(&self) -> bool {
        self.network_type == NetworkType::Unknown
    }

    /// Serialize into the bridge mapping.
    ///
    /// Keys: `isConnected`, `isInternetReachable`, `type`, `isExpensive`,
    /// `isMetered`, `capabilities` (8 booleans) and `details` (`strength`,
    /// `frequency`, `linkSpeed`). These names are a stable contract.
    pub fn to_dictionary(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("isConnected".into(), Value::Bool(self.is_connected));
        map.insert("isInternetReachable".into(), Value::Bool(self.is_internet_reachable));
        map.insert("type".into(), Value::String(self.network_type.as_str().to_string()));
        map.insert("isExpensive".into(), Value::Bool(self.is_expensive));
        map.insert("isMetered".into(), Value::Bool(self.is_metered));
        map.insert("capabilities".into(), Value::Object(self.capabilities.to_dictionary()));
        map.insert("details".into(), Value::Object(self.details.to_dictionary()));
        map
    }
}

impl Default for NetworkSnapshot {
    fn default() -> Self {
        Self::disconnected()
    }
}
