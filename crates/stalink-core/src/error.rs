// ── Core error and status types ──
//
// `CoreError` is what the façade's typed API returns. At the dispatcher
// boundary every error collapses into a `SupplicantStatus`, the value an
// RPC client actually receives. Engine failures arrive as `EngineError`
// and are classified by the caller, which knows whether a missing object
// means "stale handle" or "unknown id".

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use crate::engine::EngineError;
use crate::model::NetworkId;

// ── Status taxonomy ─────────────────────────────────────────────────

/// Status kind returned with every reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCode {
    Success,
    FailureUnknown,
    FailureArgsInvalid,
    FailureIfaceInvalid,
    FailureIfaceUnknown,
    FailureIfaceExists,
    FailureIfaceDisabled,
    FailureIfaceNotDisconnected,
    FailureNetworkInvalid,
    FailureNetworkUnknown,
}

/// Status half of a reply: a code plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplicantStatus {
    pub code: StatusCode,
    pub debug_message: String,
}

impl SupplicantStatus {
    pub fn success() -> Self {
        Self {
            code: StatusCode::Success,
            debug_message: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == StatusCode::Success
    }
}

impl From<&CoreError> for SupplicantStatus {
    fn from(err: &CoreError) -> Self {
        Self {
            code: err.status_code(),
            debug_message: err.to_string(),
        }
    }
}

// ── CoreError ───────────────────────────────────────────────────────

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    // ── Interface errors ─────────────────────────────────────────────
    #[error("Interface {name} is no longer valid")]
    IfaceInvalid { name: String },

    #[error("Interface not found: {name}")]
    IfaceUnknown { name: String },

    #[error("Interface already exists: {name}")]
    IfaceExists { name: String },

    #[error("Interface {name} is disabled")]
    IfaceDisabled { name: String },

    #[error("Interface {name} is not disconnected")]
    IfaceNotDisconnected { name: String },

    // ── Network errors ───────────────────────────────────────────────
    #[error("Network {id} on {iface} is no longer valid")]
    NetworkInvalid { iface: String, id: NetworkId },

    #[error("Network not found: {id} on {iface}")]
    NetworkUnknown { iface: String, id: NetworkId },

    // ── Request errors ───────────────────────────────────────────────
    #[error("Invalid arguments: {message}")]
    InvalidArgs { message: String },

    // ── Engine / runtime errors ──────────────────────────────────────
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Command processor is not running")]
    ProcessorStopped,
}

impl CoreError {
    /// Status code this error is reported as across the RPC boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::IfaceInvalid { .. } => StatusCode::FailureIfaceInvalid,
            Self::IfaceUnknown { .. } => StatusCode::FailureIfaceUnknown,
            Self::IfaceExists { .. } => StatusCode::FailureIfaceExists,
            Self::IfaceDisabled { .. } => StatusCode::FailureIfaceDisabled,
            Self::IfaceNotDisconnected { .. } => StatusCode::FailureIfaceNotDisconnected,
            Self::NetworkInvalid { .. } => StatusCode::FailureNetworkInvalid,
            Self::NetworkUnknown { .. } => StatusCode::FailureNetworkUnknown,
            Self::InvalidArgs { .. } => StatusCode::FailureArgsInvalid,
            Self::Engine(_) | Self::ProcessorStopped => StatusCode::FailureUnknown,
        }
    }
}
