//! Control façade for station-mode wireless interfaces.
//!
//! Sits between remote clients and a supplicant control engine that owns
//! all real interface and network state. Clients hold handles; the engine
//! may tear the underlying objects down at any time, and a stale handle
//! fails cleanly instead of touching freed state.
//!
//! - **[`Supplicant`]**: supervisor owning the [`Engine`] and the table of
//!   attached interfaces. [`start()`](Supplicant::start) spawns the serial
//!   command processor and the engine event bridge.
//!
//! - **[`StaIface`]**: per-interface control object. Every call checks the
//!   interface's [`ValidityFlag`], resolves the interface in the engine, and
//!   converts failures into a [`StatusCode`].
//!
//! - **[`StaNetwork`]**: handle to one engine-owned network entry, valid only
//!   while both the entry and its interface are.
//!
//! - **[`Command`] / [`Reply`]**: the RPC-shaped surface. A command in, a
//!   status plus payload out; errors never escape in any other form.
//!
//! - **[`StaIfaceCallback`]**: subscriber interface for asynchronous station
//!   events, deduplicated by identity and pruned when dead.

pub mod callback;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
mod network;
pub mod sta_iface;
pub mod sta_network;
mod store;
pub mod supplicant;
pub mod validity;

// ── Primary re-exports ──────────────────────────────────────────────
pub use callback::{ChannelCallback, StaIfaceCallback, Subscriber};
pub use command::{Command, Payload, Reply};
pub use config::{DEFAULT_MAX_ANQP_ELEMENTS, SupplicantConfig};
pub use engine::{ConnectRequest, Engine, EngineError, EngineEvent, EventSink, SimulatedEngine};
pub use error::{CoreError, StatusCode, SupplicantStatus};
pub use sta_iface::StaIface;
pub use sta_network::{MAX_SSID_LEN, StaNetwork};
pub use supplicant::{IfaceSnapshot, Supplicant, SupplicantState};
pub use validity::ValidityFlag;

pub use model::{
    AnqpElement, AnqpInfoId, Hs20AnqpSubtype, IfaceStatus, IfaceType, LinkState, MacAddress,
    NetworkId, ResultCode, StaIfaceEvent, TdlsOperation,
};
