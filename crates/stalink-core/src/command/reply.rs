// ── Replies ──

use crate::error::{CoreError, StatusCode, SupplicantStatus};
use crate::model::{IfaceType, NetworkId};
use crate::sta_network::StaNetwork;

/// Payload half of a reply.
#[derive(Debug, Clone, Default)]
pub enum Payload {
    /// Pure commands, and every failure.
    #[default]
    None,
    Name(String),
    Type(IfaceType),
    Network(StaNetwork),
    NetworkIds(Vec<NetworkId>),
}

/// What a client receives for every command.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: SupplicantStatus,
    pub payload: Payload,
}

impl Reply {
    pub fn ok(payload: Payload) -> Self {
        Self {
            status: SupplicantStatus::success(),
            payload,
        }
    }

    pub fn failure(err: &CoreError) -> Self {
        Self {
            status: SupplicantStatus::from(err),
            payload: Payload::None,
        }
    }

    pub fn from_result(result: Result<Payload, CoreError>) -> Self {
        match result {
            Ok(payload) => Self::ok(payload),
            Err(err) => Self::failure(&err),
        }
    }

    pub fn code(&self) -> StatusCode {
        self.status.code
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn into_network(self) -> Option<StaNetwork> {
        match self.payload {
            Payload::Network(net) => Some(net),
            _ => None,
        }
    }

    pub fn into_network_ids(self) -> Option<Vec<NetworkId>> {
        match self.payload {
            Payload::NetworkIds(ids) => Some(ids),
            _ => None,
        }
    }
}
