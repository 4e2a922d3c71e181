//! Reachability flag bitmask.

use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

/// A reachability flags bitmask, bit-compatible with the classic
/// reachability API.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReachabilityFlags(u32);

impl ReachabilityFlags {
    /// The connection is transient (e.g. PPP).
    pub const TRANSIENT_CONNECTION: Self = Self(1 << 0);
    /// The target is reachable with the current configuration.
    pub const REACHABLE: Self = Self(1 << 1);
    /// A connection must be established before the target is reachable.
    pub const CONNECTION_REQUIRED: Self = Self(1 << 2);
    /// The connection is established automatically on traffic.
    pub const CONNECTION_ON_TRAFFIC: Self = Self(1 << 3);
    /// User intervention (such as a password) is required.
    pub const INTERVENTION_REQUIRED: Self = Self(1 << 4);
    /// The connection is established automatically on demand.
    pub const CONNECTION_ON_DEMAND: Self = Self(1 << 5);
    /// The target is a local address.
    pub const IS_LOCAL_ADDRESS: Self = Self(1 << 16);
    /// Traffic goes directly to the target, without a gateway.
    pub const IS_DIRECT: Self = Self(1 << 17);
    /// The target is reached over a cellular (WWAN) interface.
    pub const IS_WWAN: Self = Self(1 << 18);

    const KNOWN_BITS: u32 = Self::TRANSIENT_CONNECTION.0
        | Self::REACHABLE.0
        | Self::CONNECTION_REQUIRED.0
        | Self::CONNECTION_ON_TRAFFIC.0
        | Self::INTERVENTION_REQUIRED.0
        | Self::CONNECTION_ON_DEMAND.0
        | Self::IS_LOCAL_ADDRESS.0
        | Self::IS_DIRECT.0
        | Self::IS_WWAN.0;

    /// No flags set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Wrap a raw platform bitmask, keeping unknown bits.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Whether every bit of `other` is set.
    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Bits outside the set this crate understands.
    pub const fn unknown_bits(&self) -> u32 {
        self.0 & !Self::KNOWN_BITS
    }
}

impl BitOr for ReachabilityFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for ReachabilityFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(ReachabilityFlags, &str); 9] = [
            (ReachabilityFlags::TRANSIENT_CONNECTION, "TRANSIENT_CONNECTION"),
            (ReachabilityFlags::REACHABLE, "REACHABLE"),
            (ReachabilityFlags::CONNECTION_REQUIRED, "CONNECTION_REQUIRED"),
            (ReachabilityFlags::CONNECTION_ON_TRAFFIC, "CONNECTION_ON_TRAFFIC"),
            (ReachabilityFlags::INTERVENTION_REQUIRED, "INTERVENTION_REQUIRED"),
            (ReachabilityFlags::CONNECTION_ON_DEMAND, "CONNECTION_ON_DEMAND"),
            (ReachabilityFlags::IS_LOCAL_ADDRESS, "IS_LOCAL_ADDRESS"),
            (ReachabilityFlags::IS_DIRECT, "IS_DIRECT"),
            (ReachabilityFlags::IS_WWAN, "IS_WWAN"),
        ];

        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "ReachabilityFlags({})", names.join(" | "))?;
        if self.unknown_bits() != 0 {
            write!(f, " + {:#x}", self.unknown_bits())?;
        }
        Ok(())
    }
}
