// ── Interface-level types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Kind of interface a façade object controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum IfaceType {
    /// Client (non-access-point) mode.
    Sta,
    P2p,
}

/// Link state of a station interface as reported by the engine.
///
/// Ordered the way the engine walks through them while connecting.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    Disconnected,
    /// Administratively disabled; connection control is rejected.
    InterfaceDisabled,
    Inactive,
    Scanning,
    Authenticating,
    Associating,
    Associated,
    FourwayHandshake,
    GroupHandshake,
    Completed,
}

impl LinkState {
    pub fn is_connected(self) -> bool {
        self >= Self::Associated
    }
}

/// Engine-side view of a live interface, resolved on every dispatch.
///
/// A copy, never a reference into engine memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfaceStatus {
    pub name: String,
    pub link_state: LinkState,
    /// Set after an explicit disconnect until the next reconnect/reassociate.
    pub disconnected: bool,
    pub power_save: bool,
}

impl IfaceStatus {
    pub fn is_disabled(&self) -> bool {
        self.link_state == LinkState::InterfaceDisabled
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn connected_states() {
        assert!(!LinkState::Scanning.is_connected());
        assert!(LinkState::Associated.is_connected());
        assert!(LinkState::Completed.is_connected());
    }

    #[test]
    fn link_state_round_trips_through_strum() {
        assert_eq!(LinkState::FourwayHandshake.to_string(), "fourway_handshake");
        let parsed: LinkState = "interface_disabled".parse().unwrap();
        assert_eq!(parsed, LinkState::InterfaceDisabled);
        assert_eq!(IfaceType::Sta.to_string(), "sta");
    }
}
