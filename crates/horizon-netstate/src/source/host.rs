//! Desktop signal source built on the host's interface table.

use std::net::Ipv6Addr;

use super::{SignalSink, SignalSource, Subscription};
use crate::error::SourceError;
use crate::logging::targets;
use crate::raw::{InterfaceKind, PathDescription, PathStatus, RawSignal};

/// Watches the host's network interfaces and describes the current path.
///
/// Change notifications come from `netwatcher`; each notification triggers a
/// fresh `netdev` enumeration that is turned into a [`PathDescription`].
/// Desktop APIs expose no radio metrics, so link details are always unknown,
/// and interface kinds are inferred from interface names.
#[derive(Debug, Clone)]
pub struct HostInterfaceSource {
    name: String,
}

impl HostInterfaceSource {
    pub fn new() -> Self {
        Self {
            name: "host-interfaces".to_string(),
        }
    }

    /// Describe the current path from the host's interface table.
    ///
    /// The path is satisfied when a default interface and a default gateway
    /// exist. Name resolution is assumed to work whenever there is a default
    /// route.
    pub fn describe_host() -> PathDescription {
        let interfaces = netdev::get_interfaces();
        let default_index = netdev::get_default_interface().ok().map(|iface| iface.index);
        let has_gateway = netdev::get_default_gateway().is_ok();

        let mut active: Vec<&netdev::Interface> = interfaces
            .iter()
            .filter(|iface| {
                iface.is_up() && !iface.is_loopback() && (!iface.ipv4.is_empty() || !iface.ipv6.is_empty())
            })
            .collect();
        // The default interface carries the path; list it first.
        active.sort_by_key(|iface| Some(iface.index) != default_index);

        let mut kinds = Vec::new();
        for iface in &active {
            let wireless = iface.if_type == netdev::interface::InterfaceType::Wireless80211;
            let kind = interface_kind(&iface.name, iface.is_tun(), wireless);
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }

        let routed = has_gateway && active.iter().any(|iface| Some(iface.index) == default_index);
        let supports_ipv4 = active.iter().any(|iface| !iface.ipv4.is_empty());
        let supports_ipv6 = active
            .iter()
            .any(|iface| iface.ipv6.iter().any(|net| is_routable_v6(&net.addr())));

        PathDescription {
            status: if routed {
                PathStatus::Satisfied
            } else {
                PathStatus::Unsatisfied
            },
            is_expensive: kinds.contains(&InterfaceKind::Cellular),
            interfaces: kinds,
            supports_ipv4,
            supports_ipv6,
            supports_dns: routed,
            ..Default::default()
        }
    }
}

impl Default for HostInterfaceSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalSource for HostInterfaceSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn subscribe(&self, sink: SignalSink) -> Result<Subscription, SourceError> {
        let handle = netwatcher::watch_interfaces(move |_update| {
            // The update diff is only a trigger; the path is rebuilt from
            // scratch so it also reflects gateway changes.
            let path = Self::describe_host();
            tracing::trace!(target: targets::SOURCE, status = ?path.status, interfaces = ?path.interfaces, "interface change");
            sink.deliver(RawSignal::Path(path));
        })
        .map_err(|e| SourceError::Unavailable(e.to_string()))?;

        tracing::debug!(target: targets::SOURCE, source = %self.name, "interface watcher started");
        Ok(Subscription::holding(handle))
    }

    fn query(&self) -> Result<RawSignal, SourceError> {
        Ok(RawSignal::Path(Self::describe_host()))
    }
}

/// Kind of an active interface. Tunnel and wireless types reported by the
/// OS win over the name.
fn interface_kind(name: &str, is_tun: bool, wireless: bool) -> InterfaceKind {
    if is_tun {
        InterfaceKind::Vpn
    } else if wireless {
        InterfaceKind::Wifi
    } else {
        classify_interface_name(name)
    }
}

/// Infer the interface kind from conventional interface names on Linux,
/// macOS, Android and Windows.
pub(crate) fn classify_interface_name(name: &str) -> InterfaceKind {
    const PREFIXES: &[(&str, InterfaceKind)] = &[
        ("wlan", InterfaceKind::Wifi),
        ("wlp", InterfaceKind::Wifi),
        ("wlx", InterfaceKind::Wifi),
        ("wifi", InterfaceKind::Wifi),
        ("wi-fi", InterfaceKind::Wifi),
        ("wireless", InterfaceKind::Wifi),
        ("ath", InterfaceKind::Wifi),
        ("wwan", InterfaceKind::Cellular),
        ("wwp", InterfaceKind::Cellular),
        ("rmnet", InterfaceKind::Cellular),
        ("pdp_ip", InterfaceKind::Cellular),
        ("ccmni", InterfaceKind::Cellular),
        ("cellular", InterfaceKind::Cellular),
        ("bnep", InterfaceKind::Bluetooth),
        ("bt-pan", InterfaceKind::Bluetooth),
        ("bluetooth", InterfaceKind::Bluetooth),
        ("tun", InterfaceKind::Vpn),
        ("tap", InterfaceKind::Vpn),
        ("utun", InterfaceKind::Vpn),
        ("wg", InterfaceKind::Vpn),
        ("ppp", InterfaceKind::Vpn),
        ("ipsec", InterfaceKind::Vpn),
        ("eth", InterfaceKind::WiredEthernet),
        // Also macOS `en0`, which is usually Wi-Fi. Callers check the
        // reported interface type before falling back to names.
        ("en", InterfaceKind::WiredEthernet),
        ("em", InterfaceKind::WiredEthernet),
        ("local area connection", InterfaceKind::WiredEthernet),
        ("lo", InterfaceKind::Loopback),
    ];

    let lower = name.to_ascii_lowercase();
    PREFIXES
        .iter()
        .find(|(prefix, _)| lower.starts_with(prefix))
        .map(|(_, kind)| *kind)
        .unwrap_or(InterfaceKind::Other)
}

fn is_routable_v6(addr: &Ipv6Addr) -> bool {
    let link_local = addr.segments()[0] & 0xffc0 == 0xfe80;
    !addr.is_loopback() && !addr.is_unspecified() && !link_local
}
