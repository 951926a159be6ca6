// ── Station interface façade ──
//
// One `StaIface` per live interface. Clients hold it through an `Arc` for
// as long as they like; the supervisor invalidates it when the engine's
// interface goes away, after which every call fails with `IfaceInvalid`
// and leaves engine state untouched.
//
// Each call follows the same dispatch shape: check the validity flag,
// resolve the interface in the engine, run the operation, and classify
// any engine failure.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::callback::{CallbackRegistry, Subscriber};
use crate::command::{Command, Payload, Reply};
use crate::engine::{ConnectRequest, Engine, EngineError};
use crate::error::CoreError;
use crate::model::{
    AnqpInfoId, Hs20AnqpSubtype, IfaceStatus, IfaceType, MacAddress, NetworkId, StaIfaceEvent,
    TdlsOperation,
};
use crate::network::NetworkRegistry;
use crate::sta_network::StaNetwork;
use crate::validity::ValidityFlag;

/// Control handle for one station interface.
pub struct StaIface {
    name: String,
    valid: ValidityFlag,
    engine: Arc<dyn Engine>,
    networks: NetworkRegistry,
    callbacks: CallbackRegistry,
    max_anqp_elements: usize,
}

impl StaIface {
    pub(crate) fn new(name: &str, engine: Arc<dyn Engine>, max_anqp_elements: usize) -> Self {
        Self {
            name: name.to_owned(),
            valid: ValidityFlag::new(),
            engine,
            networks: NetworkRegistry::new(name),
            callbacks: CallbackRegistry::new(name),
            max_anqp_elements,
        }
    }

    /// Interface name, readable even after invalidation.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_valid(&self) -> bool {
        self.valid.is_valid()
    }

    /// Tear down the façade side: invalidate this handle, every network
    /// handle issued from it, and drop all subscribers.
    ///
    /// Idempotent; returns `true` only for the call that flipped the flag.
    /// A network handle may flip the shared flag first, so cleanup runs on
    /// every call.
    pub(crate) fn invalidate(&self) -> bool {
        let flipped = self.valid.invalidate();
        let networks = self.networks.invalidate_all();
        self.callbacks.clear();
        if flipped {
            info!(iface = %self.name, networks, "interface invalidated");
        }
        flipped
    }

    // ── Identity ─────────────────────────────────────────────────────

    pub fn get_name(&self) -> Result<String, CoreError> {
        self.dispatch("get_name", |status| Ok(status.name.clone()))
    }

    pub fn get_type(&self) -> Result<IfaceType, CoreError> {
        self.dispatch("get_type", |_| Ok(IfaceType::Sta))
    }

    // ── Network lifecycle ────────────────────────────────────────────

    pub fn add_network(&self) -> Result<StaNetwork, CoreError> {
        self.dispatch("add_network", |_| {
            let id = self
                .engine
                .add_network(&self.name)
                .map_err(|e| self.engine_error(e))?;
            let network = self.network_handle(id);
            self.callbacks.notify(&StaIfaceEvent::NetworkAdded { id });
            Ok(network)
        })
    }

    pub fn remove_network(&self, id: NetworkId) -> Result<(), CoreError> {
        self.dispatch("remove_network", |_| {
            self.engine
                .remove_network(&self.name, id)
                .map_err(|e| self.engine_error(e))?;
            self.networks.invalidate(id);
            self.callbacks.notify(&StaIfaceEvent::NetworkRemoved { id });
            Ok(())
        })
    }

    pub fn get_network(&self, id: NetworkId) -> Result<StaNetwork, CoreError> {
        self.dispatch("get_network", |_| {
            let ids = self
                .engine
                .network_ids(&self.name)
                .map_err(|e| self.engine_error(e))?;
            if !ids.contains(&id) {
                return Err(CoreError::NetworkUnknown {
                    iface: self.name.clone(),
                    id,
                });
            }
            Ok(self.network_handle(id))
        })
    }

    /// Live network ids in creation order. The returned list is a copy.
    pub fn list_networks(&self) -> Result<Vec<NetworkId>, CoreError> {
        self.dispatch("list_networks", |_| {
            self.engine
                .network_ids(&self.name)
                .map_err(|e| self.engine_error(e))
        })
    }

    // ── Subscription ─────────────────────────────────────────────────

    /// Subscribe to station events. Registering the same subscriber again
    /// is a successful no-op.
    pub fn register_callback(&self, subscriber: impl Into<Subscriber>) -> Result<(), CoreError> {
        self.dispatch("register_callback", |_| {
            if self.callbacks.register(subscriber.into()) {
                debug!(iface = %self.name, subscribers = self.callbacks.len(), "callback registered");
            }
            Ok(())
        })
    }

    // ── Connection control ───────────────────────────────────────────

    pub fn reassociate(&self) -> Result<(), CoreError> {
        self.dispatch("reassociate", |status| {
            self.ensure_enabled(status)?;
            self.engine
                .request_connection(&self.name, ConnectRequest::Reassociate)
                .map_err(|e| self.engine_error(e))
        })
    }

    pub fn reconnect(&self) -> Result<(), CoreError> {
        self.dispatch("reconnect", |status| {
            self.ensure_enabled(status)?;
            if !status.disconnected {
                return Err(CoreError::IfaceNotDisconnected {
                    name: self.name.clone(),
                });
            }
            self.engine
                .request_connection(&self.name, ConnectRequest::Reconnect)
                .map_err(|e| self.engine_error(e))
        })
    }

    pub fn disconnect(&self) -> Result<(), CoreError> {
        self.dispatch("disconnect", |status| {
            self.ensure_enabled(status)?;
            self.engine
                .request_disconnection(&self.name)
                .map_err(|e| self.engine_error(e))
        })
    }

    pub fn set_power_save(&self, enable: bool) -> Result<(), CoreError> {
        self.dispatch("set_power_save", |status| {
            if status.power_save == enable {
                debug!(iface = %self.name, enable, "power save already in requested mode");
                return Ok(());
            }
            self.engine
                .set_power_save(&self.name, enable)
                .map_err(|e| self.engine_error(e))
        })
    }

    // ── Peer link (TDLS) ─────────────────────────────────────────────

    pub fn initiate_tdls_discover(&self, peer: MacAddress) -> Result<(), CoreError> {
        self.tdls("initiate_tdls_discover", TdlsOperation::Discover, peer)
    }

    pub fn initiate_tdls_setup(&self, peer: MacAddress) -> Result<(), CoreError> {
        self.tdls("initiate_tdls_setup", TdlsOperation::Setup, peer)
    }

    pub fn initiate_tdls_teardown(&self, peer: MacAddress) -> Result<(), CoreError> {
        self.tdls("initiate_tdls_teardown", TdlsOperation::Teardown, peer)
    }

    // ── Discovery queries ────────────────────────────────────────────

    /// Queue an ANQP query to `peer`. At least one info id or subtype is
    /// required; the result arrives as `AnqpQueryDone`.
    pub fn initiate_anqp_query(
        &self,
        peer: MacAddress,
        info_ids: &[AnqpInfoId],
        subtypes: &[Hs20AnqpSubtype],
    ) -> Result<(), CoreError> {
        self.ensure_valid()?;
        if info_ids.is_empty() && subtypes.is_empty() {
            return Err(CoreError::InvalidArgs {
                message: "ANQP query needs at least one info id or subtype".into(),
            });
        }
        let requested = info_ids.len() + subtypes.len();
        if requested > self.max_anqp_elements {
            return Err(CoreError::InvalidArgs {
                message: format!(
                    "ANQP query asks for {requested} elements, limit is {}",
                    self.max_anqp_elements
                ),
            });
        }
        self.dispatch("initiate_anqp_query", |_| {
            self.engine
                .trigger_anqp_query(&self.name, peer, info_ids, subtypes)
                .map_err(|e| self.engine_error(e))
        })
    }

    /// Queue a Hotspot 2.0 icon request; the result arrives as `Hs20IconQueryDone`.
    pub fn initiate_hs20_icon_query(&self, peer: MacAddress, file_name: &str) -> Result<(), CoreError> {
        self.ensure_valid()?;
        if file_name.is_empty() {
            return Err(CoreError::InvalidArgs {
                message: "icon file name is empty".into(),
            });
        }
        self.dispatch("initiate_hs20_icon_query", |_| {
            self.engine
                .trigger_hs20_icon_query(&self.name, peer, file_name)
                .map_err(|e| self.engine_error(e))
        })
    }

    // ── RPC entry point ──────────────────────────────────────────────

    /// Run one command and fold the outcome into a status + payload reply.
    pub fn execute(&self, command: Command) -> Reply {
        let op = command.name();
        let reply = Reply::from_result(self.route(command));
        if !reply.is_success() {
            debug!(
                iface = %self.name,
                op,
                status = %reply.status.code,
                message = %reply.status.debug_message,
                "command failed"
            );
        }
        reply
    }

    fn route(&self, command: Command) -> Result<Payload, CoreError> {
        match command {
            Command::GetName => self.get_name().map(Payload::Name),
            Command::GetType => self.get_type().map(Payload::Type),
            Command::AddNetwork => self.add_network().map(Payload::Network),
            Command::RemoveNetwork { id } => self.remove_network(id).map(|()| Payload::None),
            Command::GetNetwork { id } => self.get_network(id).map(Payload::Network),
            Command::ListNetworks => self.list_networks().map(Payload::NetworkIds),
            Command::RegisterCallback(subscriber) => {
                self.register_callback(subscriber).map(|()| Payload::None)
            }
            Command::Reassociate => self.reassociate().map(|()| Payload::None),
            Command::Reconnect => self.reconnect().map(|()| Payload::None),
            Command::Disconnect => self.disconnect().map(|()| Payload::None),
            Command::SetPowerSave { enable } => self.set_power_save(enable).map(|()| Payload::None),
            Command::InitiateTdlsDiscover { peer } => {
                self.initiate_tdls_discover(peer).map(|()| Payload::None)
            }
            Command::InitiateTdlsSetup { peer } => self.initiate_tdls_setup(peer).map(|()| Payload::None),
            Command::InitiateTdlsTeardown { peer } => {
                self.initiate_tdls_teardown(peer).map(|()| Payload::None)
            }
            Command::InitiateAnqpQuery {
                peer,
                info_ids,
                subtypes,
            } => self
                .initiate_anqp_query(peer, &info_ids, &subtypes)
                .map(|()| Payload::None),
            Command::InitiateHs20IconQuery { peer, file_name } => self
                .initiate_hs20_icon_query(peer, &file_name)
                .map(|()| Payload::None),
        }
    }

    // ── Engine events ────────────────────────────────────────────────

    /// Apply an engine-originated event and fan it out to subscribers.
    pub(crate) fn handle_engine_event(&self, event: &StaIfaceEvent) -> usize {
        if !self.is_valid() {
            return 0;
        }
        if let StaIfaceEvent::NetworkRemoved { id } = event {
            self.networks.invalidate(*id);
        }
        self.callbacks.notify(event)
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn tdls(&self, op: &'static str, operation: TdlsOperation, peer: MacAddress) -> Result<(), CoreError> {
        self.dispatch(op, |_| {
            self.engine
                .trigger_tdls(&self.name, operation, peer)
                .map_err(|e| self.engine_error(e))
        })
    }

    fn network_handle(&self, id: NetworkId) -> StaNetwork {
        StaNetwork::new(
            id,
            &self.name,
            self.valid.clone(),
            self.networks.flag_for(id),
            Arc::clone(&self.engine),
        )
    }

    /// The flag may have been flipped through a network handle, in which
    /// case the façade-side cleanup still has to happen here.
    fn ensure_valid(&self) -> Result<(), CoreError> {
        if self.is_valid() {
            return Ok(());
        }
        self.invalidate();
        Err(CoreError::IfaceInvalid {
            name: self.name.clone(),
        })
    }

    fn ensure_enabled(&self, status: &IfaceStatus) -> Result<(), CoreError> {
        if status.is_disabled() {
            return Err(CoreError::IfaceDisabled {
                name: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Resolve the live engine interface. Failing to find it means the
    /// interface was torn down under us: invalidate and report as such.
    fn retrieve_iface(&self) -> Result<IfaceStatus, CoreError> {
        self.engine
            .resolve_iface(&self.name)
            .map_err(|e| self.engine_error(e))
    }

    fn dispatch<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&IfaceStatus) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        self.ensure_valid()?;
        let status = self.retrieve_iface()?;
        debug!(iface = %self.name, op, state = %status.link_state, "dispatching command");
        f(&status)
    }

    fn engine_error(&self, err: EngineError) -> CoreError {
        match err {
            EngineError::NoSuchInterface(_) => {
                if self.invalidate() {
                    warn!(iface = %self.name, "interface vanished from engine");
                }
                CoreError::IfaceInvalid {
                    name: self.name.clone(),
                }
            }
            EngineError::NoSuchNetwork { id, .. } => CoreError::NetworkUnknown {
                iface: self.name.clone(),
                id,
            },
            other => {
                warn!(iface = %self.name, error = %other, "engine rejected request");
                CoreError::Engine(other)
            }
        }
    }
}

impl std::fmt::Debug for StaIface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaIface")
            .field("name", &self.name)
            .field("valid", &self.is_valid())
            .field("networks", &self.networks.issued())
            .field("subscribers", &self.callbacks.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::callback::ChannelCallback;
    use crate::config::DEFAULT_MAX_ANQP_ELEMENTS;
    use crate::engine::{EngineCall, SimulatedEngine};
    use crate::error::StatusCode;
    use crate::model::LinkState;

    const PEER: MacAddress = MacAddress::new([0x02, 0x11, 0x22, 0x33, 0x44, 0x55]);

    fn iface() -> (Arc<SimulatedEngine>, StaIface) {
        let engine = SimulatedEngine::new().with_interface("wlan0").into_shared();
        let sta = StaIface::new(
            "wlan0",
            Arc::clone(&engine) as Arc<dyn Engine>,
            DEFAULT_MAX_ANQP_ELEMENTS,
        );
        (engine, sta)
    }

    #[test]
    fn identity_reads() {
        let (_engine, sta) = iface();
        assert_eq!(sta.get_name().unwrap(), "wlan0");
        assert_eq!(sta.get_type().unwrap(), IfaceType::Sta);
    }

    #[test]
    fn invalidated_iface_rejects_everything_without_engine_calls() {
        let (engine, sta) = iface();
        assert!(sta.invalidate());
        assert!(!sta.invalidate());

        let replies = [
            sta.execute(Command::GetName),
            sta.execute(Command::AddNetwork),
            sta.execute(Command::ListNetworks),
            sta.execute(Command::SetPowerSave { enable: true }),
            sta.execute(Command::Disconnect),
            sta.execute(Command::InitiateTdlsSetup { peer: PEER }),
            sta.execute(Command::InitiateAnqpQuery {
                peer: PEER,
                info_ids: vec![],
                subtypes: vec![],
            }),
        ];
        for reply in replies {
            assert_eq!(reply.code(), StatusCode::FailureIfaceInvalid);
        }
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn removing_unknown_network_is_reported() {
        let (_engine, sta) = iface();
        let err = sta.remove_network(NetworkId::new(42)).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FailureNetworkUnknown);
    }

    #[test]
    fn power_save_is_idempotent() {
        let (engine, sta) = iface();
        sta.set_power_save(true).unwrap();
        sta.set_power_save(true).unwrap();

        assert_eq!(engine.power_save("wlan0"), Some(true));
        let toggles = engine
            .calls()
            .into_iter()
            .filter(|c| matches!(c, EngineCall::SetPowerSave { .. }))
            .count();
        assert_eq!(toggles, 1);
    }

    #[test]
    fn reconnect_requires_disconnected_state() {
        let (_engine, sta) = iface();
        assert_eq!(
            sta.reconnect().unwrap_err().status_code(),
            StatusCode::FailureIfaceNotDisconnected
        );
        sta.disconnect().unwrap();
        sta.reconnect().unwrap();
    }

    #[test]
    fn disabled_interface_rejects_connection_control() {
        let (engine, sta) = iface();
        engine.set_link_state("wlan0", LinkState::InterfaceDisabled);
        for result in [sta.reassociate(), sta.reconnect(), sta.disconnect()] {
            assert_eq!(result.unwrap_err().status_code(), StatusCode::FailureIfaceDisabled);
        }
    }

    #[test]
    fn anqp_query_validates_before_engine() {
        let (engine, sta) = iface();
        let err = sta.initiate_anqp_query(PEER, &[], &[]).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FailureArgsInvalid);
        assert!(engine.calls().is_empty());

        sta.initiate_anqp_query(PEER, &[], &[Hs20AnqpSubtype::WanMetrics])
            .unwrap();
        assert_eq!(engine.calls().len(), 1);
    }

    #[test]
    fn anqp_query_respects_element_limit() {
        let engine = SimulatedEngine::new().with_interface("wlan0").into_shared();
        let sta = StaIface::new("wlan0", Arc::clone(&engine) as Arc<dyn Engine>, 2);
        let err = sta
            .initiate_anqp_query(
                PEER,
                &[AnqpInfoId::VenueName, AnqpInfoId::NaiRealm],
                &[Hs20AnqpSubtype::WanMetrics],
            )
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FailureArgsInvalid);
    }

    #[test]
    fn icon_query_needs_file_name() {
        let (_engine, sta) = iface();
        assert_eq!(
            sta.initiate_hs20_icon_query(PEER, "").unwrap_err().status_code(),
            StatusCode::FailureArgsInvalid
        );
        sta.initiate_hs20_icon_query(PEER, "logo.png").unwrap();
    }

    #[test]
    fn driver_failure_is_unknown_error() {
        let (engine, sta) = iface();
        engine.set_driver_failure(true);
        assert_eq!(
            sta.initiate_tdls_discover(PEER).unwrap_err().status_code(),
            StatusCode::FailureUnknown
        );
    }

    #[test]
    fn vanished_interface_invalidates_handle() {
        let (engine, sta) = iface();
        engine.remove_interface("wlan0");

        assert_eq!(
            sta.list_networks().unwrap_err().status_code(),
            StatusCode::FailureIfaceInvalid
        );
        assert!(!sta.is_valid());
    }

    #[test]
    fn identity_reads_notice_vanished_interface() {
        let (engine, sta) = iface();
        let net = sta.add_network().unwrap();
        engine.remove_interface("wlan0");

        assert_eq!(
            sta.get_name().unwrap_err().status_code(),
            StatusCode::FailureIfaceInvalid
        );
        assert!(!sta.is_valid());
        assert!(matches!(net.get_id(), Err(CoreError::NetworkInvalid { .. })));

        let (cb, _rx) = ChannelCallback::new();
        assert_eq!(
            sta.register_callback(cb).unwrap_err().status_code(),
            StatusCode::FailureIfaceInvalid
        );
        assert_eq!(sta.callbacks.len(), 0);
    }

    #[test]
    fn network_handle_flipping_iface_flag_still_cleans_up() {
        let (engine, sta) = iface();
        let (cb, _rx) = ChannelCallback::new();
        sta.register_callback(cb).unwrap();
        let net = sta.add_network().unwrap();
        engine.remove_interface("wlan0");

        assert!(matches!(net.get_ssid(), Err(CoreError::NetworkInvalid { .. })));
        assert!(!sta.is_valid());

        assert_eq!(
            sta.get_type().unwrap_err().status_code(),
            StatusCode::FailureIfaceInvalid
        );
        assert_eq!(sta.callbacks.len(), 0);
        assert!(sta.networks.issued().is_empty());
    }

    #[test]
    fn execute_wraps_payloads() {
        let (_engine, sta) = iface();
        let added = sta.execute(Command::AddNetwork).into_network().unwrap();
        let listed = sta.execute(Command::ListNetworks).into_network_ids().unwrap();
        assert_eq!(listed, vec![added.id()]);

        let reply = sta.execute(Command::GetType);
        assert!(matches!(reply.payload, Payload::Type(IfaceType::Sta)));
    }
}
