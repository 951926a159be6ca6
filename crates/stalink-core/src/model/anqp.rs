// ── Access-network query identifiers ──
//
// Numeric values follow the element ids carried on the air, so they can
// be handed to the engine unchanged.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// ANQP information element requested from an access point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[repr(u16)]
pub enum AnqpInfoId {
    VenueName = 258,
    RoamingConsortium = 261,
    IpAddrTypeAvailability = 262,
    NaiRealm = 263,
    #[strum(serialize = "3gpp_cellular_network")]
    #[serde(rename = "3gpp_cellular_network")]
    Anqp3gppCellularNetwork = 264,
    DomainName = 268,
}

impl AnqpInfoId {
    pub const fn code(self) -> u16 {
        self as u16
    }
}

/// Hotspot 2.0 vendor-specific ANQP subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Hs20AnqpSubtype {
    OperatorFriendlyName = 3,
    WanMetrics = 4,
    ConnectionCapability = 5,
    OsuProvidersList = 8,
}

impl Hs20AnqpSubtype {
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// One element of a completed ANQP response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnqpElement {
    Info { id: AnqpInfoId, payload: Vec<u8> },
    Hs20 { subtype: Hs20AnqpSubtype, payload: Vec<u8> },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_element_ids() {
        assert_eq!(AnqpInfoId::VenueName.code(), 258);
        assert_eq!(AnqpInfoId::DomainName.code(), 268);
        assert_eq!(Hs20AnqpSubtype::OsuProvidersList.code(), 8);
    }

    #[test]
    fn cellular_network_uses_wire_name() {
        assert_eq!(
            AnqpInfoId::Anqp3gppCellularNetwork.to_string(),
            "3gpp_cellular_network"
        );
        let parsed: AnqpInfoId = "nai_realm".parse().unwrap();
        assert_eq!(parsed, AnqpInfoId::NaiRealm);
    }
}
