// ── Engine boundary ──
//
// The narrow set of calls the façade makes into the supplicant control
// engine. Everything the engine owns (interface state, network tables,
// the authentication state machine, driver I/O) stays on the far side;
// only copies and ids cross this boundary.

mod simulated;

pub use simulated::{EngineCall, SimulatedEngine};

use thiserror::Error;
use tokio::sync::mpsc;

use crate::model::{AnqpInfoId, Hs20AnqpSubtype, IfaceStatus, MacAddress, NetworkId, StaIfaceEvent, TdlsOperation};

/// Failures reported by the engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("no such interface: {0}")]
    NoSuchInterface(String),

    #[error("no network {id} on {iface}")]
    NoSuchNetwork { iface: String, id: NetworkId },

    #[error("out of resources: {0}")]
    OutOfResources(String),

    #[error("driver rejected request: {0}")]
    Driver(String),
}

/// Event pushed by the engine toward the façade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A station event for one interface.
    Station { ifname: String, event: StaIfaceEvent },
    /// The interface was torn down on the engine side.
    InterfaceRemoved { ifname: String },
}

/// Channel the engine pushes events into. Never blocks the engine.
pub type EventSink = mpsc::UnboundedSender<EngineEvent>;

/// Kind of connection attempt requested from the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectRequest {
    /// Re-run the connection attempt for the current network.
    Reassociate,
    /// Wake from the disconnected state and attempt a connection.
    Reconnect,
}

/// The supplicant control engine, as seen by the façade.
///
/// Implementations must not block on radio activity: requests whose outcome
/// depends on the air are queued and their completion pushed later through
/// the [`EventSink`] handed to [`subscribe_events`](Self::subscribe_events).
pub trait Engine: Send + Sync {
    /// Resolve a live interface by name.
    fn resolve_iface(&self, ifname: &str) -> Result<IfaceStatus, EngineError>;

    /// Allocate a new network entry, returning its id.
    fn add_network(&self, ifname: &str) -> Result<NetworkId, EngineError>;

    fn remove_network(&self, ifname: &str, id: NetworkId) -> Result<(), EngineError>;

    /// Live network ids in creation order.
    fn network_ids(&self, ifname: &str) -> Result<Vec<NetworkId>, EngineError>;

    fn network_ssid(&self, ifname: &str, id: NetworkId) -> Result<Vec<u8>, EngineError>;

    fn set_network_ssid(&self, ifname: &str, id: NetworkId, ssid: &[u8]) -> Result<(), EngineError>;

    fn set_network_enabled(&self, ifname: &str, id: NetworkId, enabled: bool) -> Result<(), EngineError>;

    fn select_network(&self, ifname: &str, id: NetworkId) -> Result<(), EngineError>;

    fn request_connection(&self, ifname: &str, request: ConnectRequest) -> Result<(), EngineError>;

    fn request_disconnection(&self, ifname: &str) -> Result<(), EngineError>;

    fn set_power_save(&self, ifname: &str, enable: bool) -> Result<(), EngineError>;

    fn trigger_tdls(&self, ifname: &str, operation: TdlsOperation, peer: MacAddress) -> Result<(), EngineError>;

    fn trigger_anqp_query(
        &self,
        ifname: &str,
        peer: MacAddress,
        info_ids: &[AnqpInfoId],
        subtypes: &[Hs20AnqpSubtype],
    ) -> Result<(), EngineError>;

    fn trigger_hs20_icon_query(&self, ifname: &str, peer: MacAddress, file_name: &str) -> Result<(), EngineError>;

    /// Install the sink the engine pushes events into. Replaces any previous sink.
    fn subscribe_events(&self, sink: EventSink);
}
