//! Raw platform connectivity signals.
//!
//! Platforms describe connectivity in one of a few shapes. They are unified
//! here as the [`RawSignal`] tagged variant so the monitor and translator
//! never need to know which platform produced a signal.

mod path;
mod reachability;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::{CapabilitySet, LinkDetails};

pub use path::{InterfaceKind, PathDescription, PathStatus};
pub use reachability::ReachabilityFlags;

/// A capability report in the style of a connectivity manager callback:
/// transport and capability flags already split out by the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CapabilityReport {
    /// Transport and capability flags as reported.
    pub capabilities: CapabilitySet,
    /// The platform flagged the network as metered.
    pub metered: bool,
    /// Link metrics for the active network.
    pub link: LinkDetails,
}

impl CapabilityReport {
    pub fn new(capabilities: CapabilitySet) -> Self {
        Self {
            capabilities,
            ..Default::default()
        }
    }

    pub fn with_metered(mut self, metered: bool) -> Self {
        self.metered = metered;
        self
    }

    pub fn with_link(mut self, link: LinkDetails) -> Self {
        self.link = link;
        self
    }
}

/// A platform-delivered connectivity event.
///
/// The JSON form is adjacently tagged:
///
/// ```json
/// { "kind": "reachability", "signal": 262146 }
/// { "kind": "path", "signal": { "status": "satisfied", "interfaces": ["wifi"] } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "signal", rename_all = "camelCase")]
pub enum RawSignal {
    /// A structured path description.
    Path(PathDescription),
    /// A reachability flags bitmask.
    Reachability(ReachabilityFlags),
    /// A capability report.
    Capabilities(CapabilityReport),
    /// A payload that did not match any known shape.
    Malformed {
        /// Why the payload was rejected.
        reason: String,
    },
}

impl RawSignal {
    /// Interpret an untrusted JSON payload.
    ///
    /// Never fails: payloads that do not match a known shape become
    /// [`RawSignal::Malformed`].
    pub fn from_json(value: &Value) -> Self {
        Self::deserialize(value).unwrap_or_else(|e| Self::malformed(e.to_string()))
    }

    /// Interpret an untrusted JSON string. See [`RawSignal::from_json`].
    pub fn from_json_str(text: &str) -> Self {
        serde_json::from_str(text).unwrap_or_else(|e| Self::malformed(e.to_string()))
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }

    /// Short name of the signal shape, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Path(_) => "path",
            Self::Reachability(_) => "reachability",
            Self::Capabilities(_) => "capabilities",
            Self::Malformed { .. } => "malformed",
        }
    }
}

impl From<PathDescription> for RawSignal {
    fn from(path: PathDescription) -> Self {
        Self::Path(path)
    }
}

impl From<ReachabilityFlags> for RawSignal {
    fn from(flags: ReachabilityFlags) -> Self {
        Self::Reachability(flags)
    }
}

impl From<CapabilityReport> for RawSignal {
    fn from(report: CapabilityReport) -> Self {
        Self::Capabilities(report)
    }
}
