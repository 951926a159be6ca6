// ── Network handle ──
//
// A client-held reference to one engine-owned network entry. Holds the
// id, the owning interface's name, and two validity flags: its own (shared
// by every handle for this id) and the interface's. Either one going false
// makes every operation fail with `NetworkInvalid`.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::engine::{Engine, EngineError};
use crate::error::CoreError;
use crate::model::{IfaceType, NetworkId};
use crate::validity::ValidityFlag;

/// Longest SSID the air interface can carry.
pub const MAX_SSID_LEN: usize = 32;

/// Handle to a network entry on one station interface.
#[derive(Clone)]
pub struct StaNetwork {
    id: NetworkId,
    ifname: String,
    iface_valid: ValidityFlag,
    valid: ValidityFlag,
    engine: Arc<dyn Engine>,
}

impl StaNetwork {
    pub(crate) fn new(
        id: NetworkId,
        ifname: &str,
        iface_valid: ValidityFlag,
        valid: ValidityFlag,
        engine: Arc<dyn Engine>,
    ) -> Self {
        Self {
            id,
            ifname: ifname.to_owned(),
            iface_valid,
            valid,
            engine,
        }
    }

    /// Id this handle was issued for, without a validity check.
    pub fn id(&self) -> NetworkId {
        self.id
    }

    pub fn is_valid(&self) -> bool {
        self.iface_valid.is_valid() && self.valid.is_valid()
    }

    // ── Identity ─────────────────────────────────────────────────────

    pub fn get_id(&self) -> Result<NetworkId, CoreError> {
        self.resolve()?;
        Ok(self.id)
    }

    pub fn get_interface_name(&self) -> Result<String, CoreError> {
        self.resolve()?;
        Ok(self.ifname.clone())
    }

    pub fn get_type(&self) -> Result<IfaceType, CoreError> {
        self.resolve()?;
        Ok(IfaceType::Sta)
    }

    // ── Parameters ───────────────────────────────────────────────────

    pub fn set_ssid(&self, ssid: &[u8]) -> Result<(), CoreError> {
        self.ensure_valid()?;
        if ssid.is_empty() || ssid.len() > MAX_SSID_LEN {
            return Err(CoreError::InvalidArgs {
                message: format!("SSID must be 1..={MAX_SSID_LEN} bytes, got {}", ssid.len()),
            });
        }
        self.engine
            .set_network_ssid(&self.ifname, self.id, ssid)
            .map_err(|e| self.engine_error(e))
    }

    pub fn get_ssid(&self) -> Result<Vec<u8>, CoreError> {
        self.ensure_valid()?;
        self.engine
            .network_ssid(&self.ifname, self.id)
            .map_err(|e| self.engine_error(e))
    }

    // ── Selection ────────────────────────────────────────────────────

    pub fn enable(&self) -> Result<(), CoreError> {
        self.set_enabled(true)
    }

    pub fn disable(&self) -> Result<(), CoreError> {
        self.set_enabled(false)
    }

    /// Make this the network the interface connects to. Completion is
    /// reported through `StateChanged` events.
    pub fn select(&self) -> Result<(), CoreError> {
        self.ensure_valid()?;
        debug!(iface = %self.ifname, network_id = %self.id, "selecting network");
        self.engine
            .select_network(&self.ifname, self.id)
            .map_err(|e| self.engine_error(e))
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn set_enabled(&self, enabled: bool) -> Result<(), CoreError> {
        self.ensure_valid()?;
        self.engine
            .set_network_enabled(&self.ifname, self.id, enabled)
            .map_err(|e| self.engine_error(e))
    }

    fn ensure_valid(&self) -> Result<(), CoreError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(self.invalid())
        }
    }

    /// Confirm the engine still holds this network.
    fn resolve(&self) -> Result<(), CoreError> {
        self.ensure_valid()?;
        let ids = self
            .engine
            .network_ids(&self.ifname)
            .map_err(|e| self.engine_error(e))?;
        if ids.contains(&self.id) {
            Ok(())
        } else {
            self.valid.invalidate();
            Err(self.invalid())
        }
    }

    fn invalid(&self) -> CoreError {
        CoreError::NetworkInvalid {
            iface: self.ifname.clone(),
            id: self.id,
        }
    }

    /// A vanished network or interface means this handle lost a race with
    /// removal; anything else is an engine failure.
    fn engine_error(&self, err: EngineError) -> CoreError {
        match err {
            EngineError::NoSuchNetwork { .. } => {
                self.valid.invalidate();
                self.invalid()
            }
            EngineError::NoSuchInterface(_) => {
                self.iface_valid.invalidate();
                self.invalid()
            }
            other => CoreError::Engine(other),
        }
    }
}

impl fmt::Debug for StaNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaNetwork")
            .field("id", &self.id)
            .field("ifname", &self.ifname)
            .field("valid", &self.is_valid())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::engine::SimulatedEngine;

    fn handle() -> (Arc<SimulatedEngine>, StaNetwork, ValidityFlag) {
        let engine = SimulatedEngine::new().with_interface("wlan0").into_shared();
        let id = engine.add_network("wlan0").unwrap();
        let iface_valid = ValidityFlag::new();
        let net = StaNetwork::new(
            id,
            "wlan0",
            iface_valid.clone(),
            ValidityFlag::new(),
            Arc::clone(&engine) as Arc<dyn Engine>,
        );
        (engine, net, iface_valid)
    }

    #[test]
    fn ssid_round_trips_through_engine() {
        let (_engine, net, _) = handle();
        net.set_ssid(b"home").unwrap();
        assert_eq!(net.get_ssid().unwrap(), b"home".to_vec());
    }

    #[test]
    fn ssid_length_is_checked() {
        let (_engine, net, _) = handle();
        assert!(matches!(net.set_ssid(b""), Err(CoreError::InvalidArgs { .. })));
        assert!(matches!(net.set_ssid(&[b'x'; 33]), Err(CoreError::InvalidArgs { .. })));
    }

    #[test]
    fn interface_invalidation_reaches_network_handle() {
        let (_engine, net, iface_valid) = handle();
        iface_valid.invalidate();
        assert!(!net.is_valid());
        assert!(matches!(net.get_id(), Err(CoreError::NetworkInvalid { .. })));
    }

    #[test]
    fn vanished_network_invalidates_handle() {
        let (engine, net, _) = handle();
        engine.remove_network("wlan0", net.id()).unwrap();

        assert!(matches!(net.enable(), Err(CoreError::NetworkInvalid { .. })));
        assert!(!net.is_valid());
    }

    #[test]
    fn identity_reads_notice_vanished_network() {
        let (engine, net, iface_valid) = handle();
        assert_eq!(net.get_interface_name().unwrap(), "wlan0");

        engine.remove_network("wlan0", net.id()).unwrap();
        assert!(matches!(net.get_id(), Err(CoreError::NetworkInvalid { .. })));
        assert!(!net.is_valid());
        assert!(iface_valid.is_valid());
    }

    #[test]
    fn vanished_interface_flips_interface_flag() {
        let (engine, net, iface_valid) = handle();
        engine.remove_interface("wlan0");

        assert!(matches!(net.get_type(), Err(CoreError::NetworkInvalid { .. })));
        assert!(!iface_valid.is_valid());
    }

    #[test]
    fn enable_and_disable_reach_engine() {
        let (engine, net, _) = handle();
        net.enable().unwrap();
        assert_eq!(engine.network_enabled("wlan0", net.id()), Some(true));
        net.disable().unwrap();
        assert_eq!(engine.network_enabled("wlan0", net.id()), Some(false));
    }
}
