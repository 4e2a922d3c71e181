//! Translation of raw platform signals into network snapshots.
//!
//! [`translate`] is a pure function: it performs no I/O, touches no shared
//! state and returns the same snapshot for the same signal. It never fails;
//! signals it cannot interpret produce [`NetworkSnapshot::unknown`].

mod path;
mod reachability;

use crate::raw::{CapabilityReport, RawSignal};
use crate::state::{LinkCost, NetworkSnapshot, NetworkType};

pub use path::translate_path;
pub use reachability::translate_reachability;

/// Map a raw platform signal to a network snapshot.
pub fn translate(signal: &RawSignal) -> NetworkSnapshot {
    match signal {
        RawSignal::Path(path) => translate_path(path),
        RawSignal::Reachability(flags) => translate_reachability(*flags),
        RawSignal::Capabilities(report) => translate_report(report),
        RawSignal::Malformed { .. } => NetworkSnapshot::unknown(),
    }
}

/// Translate a capability report. The flags are taken as reported and only
/// normalized; cellular links are treated as expensive and metered.
pub fn translate_report(report: &CapabilityReport) -> NetworkSnapshot {
    let cellular = report.capabilities.dominant_transport() == NetworkType::Cellular;
    let cost = LinkCost {
        expensive: cellular,
        metered: report.metered || cellular,
    };
    NetworkSnapshot::from_capabilities(report.capabilities, report.link, cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CapabilitySet, LinkDetails};

    #[test]
    fn test_malformed_maps_to_unknown() {
        let snapshot = translate(&RawSignal::malformed("garbage"));
        assert_eq!(snapshot, NetworkSnapshot::unknown());
    }

    #[test]
    fn test_report_wifi_validated() {
        let report = CapabilityReport::new(CapabilitySet {
            has_transport_wifi: true,
            has_capability_internet: true,
            has_capability_validated: true,
            ..Default::default()
        });
        let snapshot = translate(&report.into());
        assert!(snapshot.is_connected());
        assert!(snapshot.is_internet_reachable());
        assert_eq!(snapshot.network_type(), NetworkType::Wifi);
        assert!(!snapshot.is_expensive());
        assert!(!snapshot.is_metered());
    }

    #[test]
    fn test_report_validated_without_internet_is_normalized() {
        let report = CapabilityReport::new(CapabilitySet {
            has_transport_ethernet: true,
            has_capability_validated: true,
            ..Default::default()
        });
        let snapshot = translate_report(&report);
        assert!(!snapshot.capabilities().has_capability_validated);
        assert!(!snapshot.is_internet_reachable());
    }

    #[test]
    fn test_report_cellular_cost() {
        let report = CapabilityReport::new(CapabilitySet::default().with_transport(NetworkType::Cellular))
            .with_link(LinkDetails {
                strength: -90,
                ..LinkDetails::unknown()
            });
        let snapshot = translate_report(&report);
        assert!(snapshot.is_expensive());
        assert!(snapshot.is_metered());
        assert_eq!(snapshot.details().strength(), Some(-90));
    }

    #[test]
    fn test_report_metered_flag() {
        let report =
            CapabilityReport::new(CapabilitySet::default().with_transport(NetworkType::Wifi)).with_metered(true);
        let snapshot = translate_report(&report);
        assert!(!snapshot.is_expensive());
        assert!(snapshot.is_metered());
    }
}
