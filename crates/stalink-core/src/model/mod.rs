// ── Domain model ──
//
// Plain data shared by the façade, the engine boundary, and subscribers.

pub mod anqp;
pub mod event;
pub mod identity;
pub mod iface;

pub use anqp::{AnqpElement, AnqpInfoId, Hs20AnqpSubtype};
pub use event::{ResultCode, StaIfaceEvent, TdlsOperation};
pub use identity::{MacAddress, NetworkId};
pub use iface::{IfaceStatus, IfaceType, LinkState};
