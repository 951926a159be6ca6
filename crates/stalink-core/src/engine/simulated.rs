// ── In-process simulated engine ──
//
// Deterministic stand-in for the real control engine. Keeps per-interface
// network tables and link state, records every mutating call, and answers
// asynchronous triggers by pushing a completion event into the sink right
// after the triggering call returns. Used by the test suite and the demo
// daemon.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwapOption;
use dashmap::DashMap;
use tracing::trace;

use super::{ConnectRequest, Engine, EngineError, EngineEvent, EventSink};
use crate::model::{
    AnqpElement, AnqpInfoId, Hs20AnqpSubtype, IfaceStatus, LinkState, MacAddress, NetworkId,
    ResultCode, StaIfaceEvent, TdlsOperation,
};

/// A mutating call received by the simulated engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    AddNetwork { ifname: String },
    RemoveNetwork { ifname: String, id: NetworkId },
    SetNetworkSsid { ifname: String, id: NetworkId },
    SetNetworkEnabled { ifname: String, id: NetworkId, enabled: bool },
    SelectNetwork { ifname: String, id: NetworkId },
    RequestConnection { ifname: String, request: ConnectRequest },
    RequestDisconnection { ifname: String },
    SetPowerSave { ifname: String, enable: bool },
    Tdls { ifname: String, operation: TdlsOperation, peer: MacAddress },
    AnqpQuery { ifname: String, peer: MacAddress, elements: usize },
    Hs20IconQuery { ifname: String, peer: MacAddress, file_name: String },
}

#[derive(Debug, Clone)]
struct SimNetwork {
    ssid: Vec<u8>,
    enabled: bool,
}

#[derive(Debug)]
struct SimIface {
    /// `None` once every id has been handed out.
    next_id: Option<NetworkId>,
    networks: BTreeMap<NetworkId, SimNetwork>,
    link_state: LinkState,
    disconnected: bool,
    power_save: bool,
    current: Option<NetworkId>,
}

impl SimIface {
    fn new() -> Self {
        Self {
            next_id: Some(NetworkId::new(0)),
            networks: BTreeMap::new(),
            link_state: LinkState::Disconnected,
            disconnected: false,
            power_save: false,
            current: None,
        }
    }
}

/// Simulated control engine.
#[derive(Default)]
pub struct SimulatedEngine {
    ifaces: DashMap<String, SimIface>,
    sink: ArcSwapOption<EventSink>,
    calls: Mutex<Vec<EngineCall>>,
    network_limit: Option<usize>,
    driver_failure: AtomicBool,
}

impl SimulatedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an interface already present.
    pub fn with_interface(self, ifname: &str) -> Self {
        self.add_interface(ifname);
        self
    }

    /// Cap the number of networks per interface; further adds fail.
    pub fn with_network_limit(mut self, limit: usize) -> Self {
        self.network_limit = Some(limit);
        self
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    // ── Administrative actions ───────────────────────────────────────

    /// Bring up an interface on the engine side. No-op if present.
    pub fn add_interface(&self, ifname: &str) {
        self.ifaces.entry(ifname.to_owned()).or_insert_with(SimIface::new);
    }

    /// Tear down an interface and tell the façade.
    pub fn remove_interface(&self, ifname: &str) -> bool {
        let removed = self.ifaces.remove(ifname).is_some();
        if removed {
            self.emit(EngineEvent::InterfaceRemoved {
                ifname: ifname.to_owned(),
            });
        }
        removed
    }

    /// Delete a network behind the façade's back (e.g. a config reload).
    pub fn drop_network(&self, ifname: &str, id: NetworkId) -> bool {
        let removed = self
            .ifaces
            .get_mut(ifname)
            .is_some_and(|mut iface| iface.networks.remove(&id).is_some());
        if removed {
            self.emit_station(ifname, StaIfaceEvent::NetworkRemoved { id });
        }
        removed
    }

    /// Force a link state, reporting it like the real state machine would.
    pub fn set_link_state(&self, ifname: &str, state: LinkState) {
        let current = {
            let Some(mut iface) = self.ifaces.get_mut(ifname) else {
                return;
            };
            iface.link_state = state;
            iface.current
        };
        self.emit_station(
            ifname,
            StaIfaceEvent::StateChanged {
                state,
                bssid: None,
                network_id: current,
                ssid: Vec::new(),
            },
        );
    }

    /// Make every subsequent trigger fail as if the driver refused it.
    pub fn set_driver_failure(&self, fail: bool) {
        self.driver_failure.store(fail, Ordering::Release);
    }

    /// Push an arbitrary station event.
    pub fn emit_station(&self, ifname: &str, event: StaIfaceEvent) {
        self.emit(EngineEvent::Station {
            ifname: ifname.to_owned(),
            event,
        });
    }

    // ── Inspection ───────────────────────────────────────────────────

    /// Every mutating call received so far, oldest first.
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn power_save(&self, ifname: &str) -> Option<bool> {
        self.ifaces.get(ifname).map(|iface| iface.power_save)
    }

    pub fn network_enabled(&self, ifname: &str, id: NetworkId) -> Option<bool> {
        self.ifaces
            .get(ifname)
            .and_then(|iface| iface.networks.get(&id).map(|n| n.enabled))
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn record(&self, call: EngineCall) {
        trace!(?call, "simulated engine call");
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    fn emit(&self, event: EngineEvent) {
        if let Some(sink) = self.sink.load_full() {
            // A closed sink means the façade went away; nothing to report to.
            let _ = sink.send(event);
        }
    }

    fn with_iface<T>(
        &self,
        ifname: &str,
        f: impl FnOnce(&mut SimIface) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let mut iface = self
            .ifaces
            .get_mut(ifname)
            .ok_or_else(|| EngineError::NoSuchInterface(ifname.to_owned()))?;
        f(&mut iface)
    }

    fn with_network<T>(
        &self,
        ifname: &str,
        id: NetworkId,
        f: impl FnOnce(&mut SimNetwork) -> T,
    ) -> Result<T, EngineError> {
        self.with_iface(ifname, |iface| {
            iface
                .networks
                .get_mut(&id)
                .map(f)
                .ok_or_else(|| EngineError::NoSuchNetwork {
                    iface: ifname.to_owned(),
                    id,
                })
        })
    }

    fn check_driver(&self) -> Result<(), EngineError> {
        if self.driver_failure.load(Ordering::Acquire) {
            return Err(EngineError::Driver("simulated driver failure".into()));
        }
        Ok(())
    }

    fn ensure_iface(&self, ifname: &str) -> Result<(), EngineError> {
        if self.ifaces.contains_key(ifname) {
            Ok(())
        } else {
            Err(EngineError::NoSuchInterface(ifname.to_owned()))
        }
    }
}

impl Engine for SimulatedEngine {
    fn resolve_iface(&self, ifname: &str) -> Result<IfaceStatus, EngineError> {
        self.with_iface(ifname, |iface| {
            Ok(IfaceStatus {
                name: ifname.to_owned(),
                link_state: iface.link_state,
                disconnected: iface.disconnected,
                power_save: iface.power_save,
            })
        })
    }

    fn add_network(&self, ifname: &str) -> Result<NetworkId, EngineError> {
        let limit = self.network_limit;
        let id = self.with_iface(ifname, |iface| {
            if limit.is_some_and(|max| iface.networks.len() >= max) {
                return Err(EngineError::OutOfResources(format!(
                    "network table on {ifname} is full"
                )));
            }
            let id = iface.next_id.ok_or_else(|| {
                EngineError::OutOfResources(format!("network ids on {ifname} exhausted"))
            })?;
            iface.next_id = id.checked_next();
            iface.networks.insert(
                id,
                SimNetwork {
                    ssid: Vec::new(),
                    enabled: false,
                },
            );
            Ok(id)
        })?;
        self.record(EngineCall::AddNetwork {
            ifname: ifname.to_owned(),
        });
        Ok(id)
    }

    fn remove_network(&self, ifname: &str, id: NetworkId) -> Result<(), EngineError> {
        self.with_iface(ifname, |iface| {
            iface
                .networks
                .remove(&id)
                .ok_or_else(|| EngineError::NoSuchNetwork {
                    iface: ifname.to_owned(),
                    id,
                })?;
            if iface.current == Some(id) {
                iface.current = None;
                iface.link_state = LinkState::Disconnected;
            }
            Ok(())
        })?;
        self.record(EngineCall::RemoveNetwork {
            ifname: ifname.to_owned(),
            id,
        });
        Ok(())
    }

    fn network_ids(&self, ifname: &str) -> Result<Vec<NetworkId>, EngineError> {
        self.with_iface(ifname, |iface| Ok(iface.networks.keys().copied().collect()))
    }

    fn network_ssid(&self, ifname: &str, id: NetworkId) -> Result<Vec<u8>, EngineError> {
        self.with_network(ifname, id, |net| net.ssid.clone())
    }

    fn set_network_ssid(&self, ifname: &str, id: NetworkId, ssid: &[u8]) -> Result<(), EngineError> {
        self.with_network(ifname, id, |net| net.ssid = ssid.to_vec())?;
        self.record(EngineCall::SetNetworkSsid {
            ifname: ifname.to_owned(),
            id,
        });
        Ok(())
    }

    fn set_network_enabled(&self, ifname: &str, id: NetworkId, enabled: bool) -> Result<(), EngineError> {
        self.with_network(ifname, id, |net| net.enabled = enabled)?;
        self.record(EngineCall::SetNetworkEnabled {
            ifname: ifname.to_owned(),
            id,
            enabled,
        });
        Ok(())
    }

    fn select_network(&self, ifname: &str, id: NetworkId) -> Result<(), EngineError> {
        self.with_iface(ifname, |iface| {
            let net = iface
                .networks
                .get_mut(&id)
                .ok_or_else(|| EngineError::NoSuchNetwork {
                    iface: ifname.to_owned(),
                    id,
                })?;
            net.enabled = true;
            iface.current = Some(id);
            iface.disconnected = false;
            Ok(())
        })?;
        self.record(EngineCall::SelectNetwork {
            ifname: ifname.to_owned(),
            id,
        });
        self.set_link_state(ifname, LinkState::Scanning);
        Ok(())
    }

    fn request_connection(&self, ifname: &str, request: ConnectRequest) -> Result<(), EngineError> {
        self.with_iface(ifname, |iface| {
            iface.disconnected = false;
            Ok(())
        })?;
        self.record(EngineCall::RequestConnection {
            ifname: ifname.to_owned(),
            request,
        });
        self.set_link_state(ifname, LinkState::Scanning);
        Ok(())
    }

    fn request_disconnection(&self, ifname: &str) -> Result<(), EngineError> {
        self.with_iface(ifname, |iface| {
            iface.disconnected = true;
            Ok(())
        })?;
        self.record(EngineCall::RequestDisconnection {
            ifname: ifname.to_owned(),
        });
        self.set_link_state(ifname, LinkState::Disconnected);
        Ok(())
    }

    fn set_power_save(&self, ifname: &str, enable: bool) -> Result<(), EngineError> {
        self.check_driver()?;
        self.with_iface(ifname, |iface| {
            iface.power_save = enable;
            Ok(())
        })?;
        self.record(EngineCall::SetPowerSave {
            ifname: ifname.to_owned(),
            enable,
        });
        Ok(())
    }

    fn trigger_tdls(&self, ifname: &str, operation: TdlsOperation, peer: MacAddress) -> Result<(), EngineError> {
        self.ensure_iface(ifname)?;
        self.check_driver()?;
        self.record(EngineCall::Tdls {
            ifname: ifname.to_owned(),
            operation,
            peer,
        });
        self.emit_station(
            ifname,
            StaIfaceEvent::TdlsStatus {
                peer,
                operation,
                result: ResultCode::Success,
            },
        );
        Ok(())
    }

    fn trigger_anqp_query(
        &self,
        ifname: &str,
        peer: MacAddress,
        info_ids: &[AnqpInfoId],
        subtypes: &[Hs20AnqpSubtype],
    ) -> Result<(), EngineError> {
        self.ensure_iface(ifname)?;
        self.check_driver()?;
        self.record(EngineCall::AnqpQuery {
            ifname: ifname.to_owned(),
            peer,
            elements: info_ids.len() + subtypes.len(),
        });
        let elements = info_ids
            .iter()
            .map(|&id| AnqpElement::Info {
                id,
                payload: Vec::new(),
            })
            .chain(subtypes.iter().map(|&subtype| AnqpElement::Hs20 {
                subtype,
                payload: Vec::new(),
            }))
            .collect();
        self.emit_station(
            ifname,
            StaIfaceEvent::AnqpQueryDone {
                bssid: peer,
                result: ResultCode::Success,
                elements,
            },
        );
        Ok(())
    }

    fn trigger_hs20_icon_query(&self, ifname: &str, peer: MacAddress, file_name: &str) -> Result<(), EngineError> {
        self.ensure_iface(ifname)?;
        self.check_driver()?;
        self.record(EngineCall::Hs20IconQuery {
            ifname: ifname.to_owned(),
            peer,
            file_name: file_name.to_owned(),
        });
        self.emit_station(
            ifname,
            StaIfaceEvent::Hs20IconQueryDone {
                bssid: peer,
                file_name: file_name.to_owned(),
                result: ResultCode::Success,
                data: Vec::new(),
            },
        );
        Ok(())
    }

    fn subscribe_events(&self, sink: EventSink) {
        self.sink.store(Some(Arc::new(sink)));
    }
}
