// ── Command API ──
//
// The RPC-facing surface of a station interface. Every call arrives as a
// `Command`, is routed to the matching `StaIface` method, and leaves as a
// `Reply`: a status plus a payload. Errors never cross this boundary in
// any other form.

mod reply;

use std::sync::Arc;

use crate::callback::Subscriber;
use crate::model::{AnqpInfoId, Hs20AnqpSubtype, MacAddress, NetworkId};
use crate::sta_iface::StaIface;

pub use reply::{Payload, Reply};

/// A command envelope sent through the command channel.
/// Carries the target handle and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub iface: Arc<StaIface>,
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Reply>,
}

/// Every call a client can make on a station interface.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Identity ─────────────────────────────────────────────────────
    GetName,
    GetType,

    // ── Network lifecycle ────────────────────────────────────────────
    AddNetwork,
    RemoveNetwork {
        id: NetworkId,
    },
    GetNetwork {
        id: NetworkId,
    },
    ListNetworks,

    // ── Subscription ─────────────────────────────────────────────────
    RegisterCallback(Subscriber),

    // ── Connection control ───────────────────────────────────────────
    Reassociate,
    Reconnect,
    Disconnect,
    SetPowerSave {
        enable: bool,
    },

    // ── Peer link (TDLS) ─────────────────────────────────────────────
    InitiateTdlsDiscover {
        peer: MacAddress,
    },
    InitiateTdlsSetup {
        peer: MacAddress,
    },
    InitiateTdlsTeardown {
        peer: MacAddress,
    },

    // ── Discovery queries ────────────────────────────────────────────
    InitiateAnqpQuery {
        peer: MacAddress,
        info_ids: Vec<AnqpInfoId>,
        subtypes: Vec<Hs20AnqpSubtype>,
    },
    InitiateHs20IconQuery {
        peer: MacAddress,
        file_name: String,
    },
}

impl Command {
    /// Operation name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetName => "get_name",
            Self::GetType => "get_type",
            Self::AddNetwork => "add_network",
            Self::RemoveNetwork { .. } => "remove_network",
            Self::GetNetwork { .. } => "get_network",
            Self::ListNetworks => "list_networks",
            Self::RegisterCallback(_) => "register_callback",
            Self::Reassociate => "reassociate",
            Self::Reconnect => "reconnect",
            Self::Disconnect => "disconnect",
            Self::SetPowerSave { .. } => "set_power_save",
            Self::InitiateTdlsDiscover { .. } => "initiate_tdls_discover",
            Self::InitiateTdlsSetup { .. } => "initiate_tdls_setup",
            Self::InitiateTdlsTeardown { .. } => "initiate_tdls_teardown",
            Self::InitiateAnqpQuery { .. } => "initiate_anqp_query",
            Self::InitiateHs20IconQuery { .. } => "initiate_hs20_icon_query",
        }
    }
}
