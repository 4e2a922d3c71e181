//! Network state model.
//!
//! - [`CapabilitySet`] - boolean transport and capability flags
//! - [`LinkDetails`] - quantitative link metrics with an unknown sentinel
//! - [`NetworkSnapshot`] - the immutable aggregate published by the monitor
//! - [`NetworkType`] - dominant transport classification

mod capabilities;
mod details;
mod network_type;
mod snapshot;

pub use capabilities::CapabilitySet;
pub use details::LinkDetails;
pub use network_type::{NetworkType, ParseNetworkTypeError};
pub use snapshot::{LinkCost, NetworkSnapshot};
