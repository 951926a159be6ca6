// ── Core identity types ──
//
// NetworkId and MacAddress address every object the façade hands out.
// Network ids are engine-assigned and never reused within an interface;
// peers are always fixed 6-byte hardware addresses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

// ── NetworkId ───────────────────────────────────────────────────────

/// Identifier of a network entry, unique within one interface.
///
/// Assigned by the engine in increasing order, so sorting by id is the
/// same as sorting by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(u32);

impl NetworkId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    /// The id that follows this one, or `None` once the id space is
    /// exhausted. Ids never wrap, so they are never reused.
    pub const fn checked_next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NetworkId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

// ── MacAddress ──────────────────────────────────────────────────────

/// 48-bit hardware address of a peer station or access point.
///
/// Displayed as lowercase colon-separated hex (aa:bb:cc:dd:ee:ff).
/// Parsing accepts colon- or dash-separated octets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    pub const LEN: usize = 6;

    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub const fn octets(self) -> [u8; 6] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == [0; 6]
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for MacAddress {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidArgs {
            message: format!("malformed hardware address '{s}'"),
        };

        let mut octets = [0u8; 6];
        let mut parts = s.split([':', '-']);
        for slot in &mut octets {
            let part = parts.next().ok_or_else(invalid)?;
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            *slot = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self(octets))
    }
}

impl TryFrom<&[u8]> for MacAddress {
    type Error = CoreError;

    fn try_from(raw: &[u8]) -> Result<Self, Self::Error> {
        <[u8; 6]>::try_from(raw)
            .map(Self)
            .map_err(|_| CoreError::InvalidArgs {
                message: format!(
                    "hardware address must be {} bytes, got {}",
                    Self::LEN,
                    raw.len()
                ),
            })
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(octets: [u8; 6]) -> Self {
        Self(octets)
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.to_string()
    }
}

impl TryFrom<String> for MacAddress {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn network_id_orders_by_value() {
        let a = NetworkId::new(3);
        let b = a.checked_next().unwrap();
        assert!(a < b);
        assert_eq!(b.get(), 4);
    }

    #[test]
    fn network_id_space_does_not_wrap() {
        assert_eq!(NetworkId::new(u32::MAX).checked_next(), None);
    }

    #[test]
    fn mac_address_display_is_lowercase_colon() {
        let mac = MacAddress::new([0xAA, 0xBB, 0x0C, 0xDD, 0xEE, 0x01]);
        assert_eq!(mac.to_string(), "aa:bb:0c:dd:ee:01");
    }

    #[test]
    fn mac_address_parses_dashes_and_case() {
        let mac: MacAddress = "AA-BB-CC-DD-EE-FF".parse().unwrap();
        assert_eq!(mac.octets(), [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
    }

    #[test]
    fn mac_address_rejects_short_and_long_input() {
        assert!("aa:bb:cc:dd:ee".parse::<MacAddress>().is_err());
        assert!("aa:bb:cc:dd:ee:ff:00".parse::<MacAddress>().is_err());
        assert!("aa:bb:cc:dd:ee:fg".parse::<MacAddress>().is_err());
        assert!("aaa:b:cc:dd:ee:ff".parse::<MacAddress>().is_err());
        assert!("+a:bb:cc:dd:ee:ff".parse::<MacAddress>().is_err());
        assert!("aa:bb:cc:dd:ee:-f".parse::<MacAddress>().is_err());
    }

    #[test]
    fn mac_address_from_slice_checks_length() {
        let ok = MacAddress::try_from(&[1u8, 2, 3, 4, 5, 6][..]).unwrap();
        assert_eq!(ok.as_bytes(), &[1, 2, 3, 4, 5, 6]);

        let err = MacAddress::try_from(&[1u8, 2, 3][..]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgs { .. }));
    }

    #[test]
    fn mac_address_serializes_as_string() {
        let mac = MacAddress::new([0, 0x11, 0x22, 0x33, 0x44, 0x55]);
        let json = serde_json::to_string(&mac).unwrap();
        assert_eq!(json, "\"00:11:22:33:44:55\"");
        let back: MacAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mac);
    }
}
