// ── Station events ──
//
// Everything the engine reports asynchronously, plus the network
// add/remove notifications the façade emits itself. Delivered to every
// subscriber of the owning interface.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::anqp::AnqpElement;
use super::identity::{MacAddress, NetworkId};
use super::iface::LinkState;

/// Peer-link operation a TDLS request or status refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TdlsOperation {
    Discover,
    Setup,
    Teardown,
}

/// Outcome of an asynchronous trigger, carried by its completion event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case", tag = "result", content = "code")]
pub enum ResultCode {
    Success,
    /// Engine or peer reported a failure; the code is engine-defined.
    Failure(u16),
    Timeout,
}

impl ResultCode {
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

/// An event delivered to the subscribers of one station interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StaIfaceEvent {
    StateChanged {
        state: LinkState,
        bssid: Option<MacAddress>,
        network_id: Option<NetworkId>,
        ssid: Vec<u8>,
    },
    NetworkAdded {
        id: NetworkId,
    },
    NetworkRemoved {
        id: NetworkId,
    },
    Disconnected {
        bssid: MacAddress,
        locally_generated: bool,
        reason_code: u16,
    },
    AssociationRejected {
        bssid: MacAddress,
        status_code: u16,
        timed_out: bool,
    },
    TdlsStatus {
        peer: MacAddress,
        operation: TdlsOperation,
        result: ResultCode,
    },
    AnqpQueryDone {
        bssid: MacAddress,
        result: ResultCode,
        elements: Vec<AnqpElement>,
    },
    Hs20IconQueryDone {
        bssid: MacAddress,
        file_name: String,
        result: ResultCode,
        data: Vec<u8>,
    },
}

impl StaIfaceEvent {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StateChanged { .. } => "state_changed",
            Self::NetworkAdded { .. } => "network_added",
            Self::NetworkRemoved { .. } => "network_removed",
            Self::Disconnected { .. } => "disconnected",
            Self::AssociationRejected { .. } => "association_rejected",
            Self::TdlsStatus { .. } => "tdls_status",
            Self::AnqpQueryDone { .. } => "anqp_query_done",
            Self::Hs20IconQueryDone { .. } => "hs20_icon_query_done",
        }
    }
}
