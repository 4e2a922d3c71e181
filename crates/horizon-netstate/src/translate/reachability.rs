use crate::raw::ReachabilityFlags;
use crate::state::{CapabilitySet, LinkCost, LinkDetails, NetworkSnapshot, NetworkType};

/// Translate a reachability bitmask.
///
/// A reachable target is classified as cellular when `IS_WWAN` is set and as
/// Wi-Fi otherwise. Link metrics are never available from this shape. Bits
/// outside the known set make the whole mask untrustworthy, so they yield
/// the unknown snapshot.
pub fn translate_reachability(flags: ReachabilityFlags) -> NetworkSnapshot {
    if flags.unknown_bits() != 0 {
        return NetworkSnapshot::unknown();
    }
    if !flags.contains(ReachabilityFlags::REACHABLE) {
        return NetworkSnapshot::disconnected();
    }

    let transport = if flags.contains(ReachabilityFlags::IS_WWAN) {
        NetworkType::Cellular
    } else {
        NetworkType::Wifi
    };

    let required = flags.contains(ReachabilityFlags::CONNECTION_REQUIRED);
    let automatic = flags.contains(ReachabilityFlags::CONNECTION_ON_DEMAND)
        || flags.contains(ReachabilityFlags::CONNECTION_ON_TRAFFIC);
    let intervention = flags.contains(ReachabilityFlags::INTERVENTION_REQUIRED);
    let direct = flags.contains(ReachabilityFlags::IS_DIRECT);

    let internet = !direct && (!required || (automatic && !intervention));
    let capabilities = CapabilitySet {
        has_capability_internet: internet,
        has_capability_validated: internet && !required,
        has_capability_captive_portal: required && !internet,
        ..CapabilitySet::default().with_transport(transport)
    };

    let cellular = transport == NetworkType::Cellular;
    let cost = LinkCost {
        expensive: cellular,
        metered: cellular,
    };
    NetworkSnapshot::from_capabilities(capabilities, LinkDetails::unknown(), cost)
}
