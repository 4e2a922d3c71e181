use crate::raw::{InterfaceKind, PathDescription, PathStatus};
use crate::state::{CapabilitySet, LinkCost, NetworkSnapshot, NetworkType};

/// Translate a path description.
///
/// - `Invalid` status yields the unknown snapshot.
/// - Internet requires a satisfied path with IPv4 or IPv6; validation
///   additionally requires DNS.
/// - A path waiting on a connection is flagged as a captive portal.
/// - A satisfied path over unrecognized interfaces only has type `Unknown`.
pub fn translate_path(path: &PathDescription) -> NetworkSnapshot {
    if path.status == PathStatus::Invalid {
        return NetworkSnapshot::unknown();
    }

    let mut capabilities = CapabilitySet::default();
    let mut unrecognized = false;
    for kind in &path.interfaces {
        match transport_of(*kind) {
            Some(ty) => capabilities = capabilities.with_transport(ty),
            None => unrecognized |= *kind == InterfaceKind::Other,
        }
    }

    let satisfied = path.status == PathStatus::Satisfied;
    let internet = satisfied && (path.supports_ipv4 || path.supports_ipv6);
    capabilities.has_capability_internet = internet;
    capabilities.has_capability_validated = internet && path.supports_dns;
    capabilities.has_capability_captive_portal = path.status == PathStatus::RequiresConnection;

    let cellular = capabilities.dominant_transport() == NetworkType::Cellular;
    let cost = LinkCost {
        expensive: path.is_expensive || cellular,
        metered: path.is_constrained || path.is_expensive || cellular,
    };

    if unrecognized && satisfied {
        NetworkSnapshot::from_unrecognized_link(capabilities, path.link, cost)
    } else {
        NetworkSnapshot::from_capabilities(capabilities, path.link, cost)
    }
}

fn transport_of(kind: InterfaceKind) -> Option<NetworkType> {
    match kind {
        InterfaceKind::WiredEthernet => Some(NetworkType::Ethernet),
        InterfaceKind::Wifi => Some(NetworkType::Wifi),
        InterfaceKind::Cellular => Some(NetworkType::Cellular),
        InterfaceKind::Bluetooth => Some(NetworkType::Bluetooth),
        InterfaceKind::Vpn => Some(NetworkType::Vpn),
        InterfaceKind::Loopback | InterfaceKind::Other => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::LinkDetails;

    #[test]
    fn test_satisfied_wifi() {
        let snapshot = translate_path(&PathDescription::satisfied([InterfaceKind::Wifi]));
        assert!(snapshot.is_connected());
        assert!(snapshot.is_internet_reachable());
        assert!(snapshot.capabilities().has_capability_validated);
        assert_eq!(snapshot.network_type(), NetworkType::Wifi);
        assert!(!snapshot.is_expensive());
    }

    #[test]
    fn test_invalid_is_unknown() {
        let path = PathDescription {
            status: PathStatus::Invalid,
            ..PathDescription::satisfied([InterfaceKind::Wifi])
        };
        assert_eq!(translate_path(&path), NetworkSnapshot::unknown());
    }

    #[test]
    fn test_unsatisfied_keeps_transport_without_internet() {
        let path = PathDescription {
            status: PathStatus::Unsatisfied,
            ..PathDescription::satisfied([InterfaceKind::Wifi])
        };
        let snapshot = translate_path(&path);
        assert!(snapshot.is_connected());
        assert!(!snapshot.is_internet_reachable());
        assert!(!snapshot.capabilities().has_capability_validated);
    }

    #[test]
    fn test_requires_connection_is_captive() {
        let path = PathDescription {
            status: PathStatus::RequiresConnection,
            ..PathDescription::satisfied([InterfaceKind::Wifi])
        };
        let caps = *translate_path(&path).capabilities();
        assert!(caps.has_capability_captive_portal);
        assert!(!caps.has_capability_internet);
    }

    #[test]
    fn test_requires_connection_without_interface_is_not_captive() {
        let path = PathDescription {
            status: PathStatus::RequiresConnection,
            ..Default::default()
        };
        let snapshot = translate_path(&path);
        assert!(!snapshot.capabilities().has_capability_captive_portal);
        assert_eq!(snapshot.network_type(), NetworkType::None);
    }

    #[test]
    fn test_ethernet_outranks_wifi_and_vpn() {
        let path = PathDescription::satisfied([
            InterfaceKind::Vpn,
            InterfaceKind::Wifi,
            InterfaceKind::WiredEthernet,
        ]);
        let snapshot = translate_path(&path);
        assert_eq!(snapshot.network_type(), NetworkType::Ethernet);
        assert!(snapshot.has_transport(NetworkType::Vpn));
        assert!(snapshot.has_transport(NetworkType::Wifi));
    }

    #[test]
    fn test_dns_required_for_validation() {
        let path = PathDescription {
            supports_dns: false,
            ..PathDescription::satisfied([InterfaceKind::WiredEthernet])
        };
        let snapshot = translate_path(&path);
        assert!(snapshot.is_internet_reachable());
        assert!(!snapshot.capabilities().has_capability_validated);
    }

    #[test]
    fn test_cost_flags() {
        let cellular = translate_path(&PathDescription::satisfied([InterfaceKind::Cellular]));
        assert!(cellular.is_expensive());
        assert!(cellular.is_metered());

        let hotspot = translate_path(&PathDescription::satisfied([InterfaceKind::Wifi]).with_expensive(true));
        assert!(hotspot.is_expensive());
        assert!(hotspot.is_metered());

        let constrained =
            translate_path(&PathDescription::satisfied([InterfaceKind::Wifi]).with_constrained(true));
        assert!(!constrained.is_expensive());
        assert!(constrained.is_metered());
    }

    #[test]
    fn test_other_interface_is_unknown_type() {
        let snapshot = translate_path(&PathDescription::satisfied([InterfaceKind::Other]));
        assert_eq!(snapshot.network_type(), NetworkType::Unknown);
        assert!(!snapshot.is_connected());
        assert!(!snapshot.is_internet_reachable());
    }

    #[test]
    fn test_loopback_only_is_none() {
        let snapshot = translate_path(&PathDescription::satisfied([InterfaceKind::Loopback]));
        assert_eq!(snapshot.network_type(), NetworkType::None);
        assert!(!snapshot.is_connected());
    }

    #[test]
    fn test_link_details_carried_through() {
        let link = LinkDetails {
            strength: -48,
            frequency: 2412,
            link_speed: 144,
        };
        let snapshot = translate_path(&PathDescription::satisfied([InterfaceKind::Wifi]).with_link(link));
        assert_eq!(*snapshot.details(), link);
    }
}
