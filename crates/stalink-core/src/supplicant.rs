// ── Supervisor ──
//
// Owns the engine handle and the table of live station interfaces.
// Background tasks: a serial command processor that executes one command
// at a time, and an event bridge that carries engine events to the owning
// interface's subscribers and applies engine-side removals.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::command::{Command, CommandEnvelope, Reply};
use crate::config::SupplicantConfig;
use crate::engine::{Engine, EngineError, EngineEvent};
use crate::error::CoreError;
use crate::sta_iface::StaIface;
use crate::store::HandleCollection;

/// Ordered snapshot of attached interfaces, keyed by name.
pub type IfaceSnapshot = Arc<Vec<(String, Arc<StaIface>)>>;

// ── SupplicantState ──────────────────────────────────────────────

/// Lifecycle of the background tasks, observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupplicantState {
    /// Created, `start()` not yet called.
    Idle,
    Running,
    /// `shutdown()` ran. Terminal.
    Stopped,
}

// ── Supplicant ───────────────────────────────────────────────────

/// Entry point for consumers.
///
/// Cheaply cloneable via `Arc<SupplicantInner>`. Direct calls on a
/// [`StaIface`] work without `start()`; [`execute`](Self::execute) needs
/// the command processor running.
#[derive(Clone)]
pub struct Supplicant {
    inner: Arc<SupplicantInner>,
}

struct SupplicantInner {
    config: SupplicantConfig,
    engine: Arc<dyn Engine>,
    ifaces: HandleCollection<String, StaIface>,
    state: watch::Sender<SupplicantState>,
    command_tx: mpsc::Sender<CommandEnvelope>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Supplicant {
    /// Create a supervisor over `engine`. Does not spawn anything or
    /// subscribe to engine events; [`start()`](Self::start) does both.
    pub fn new(config: SupplicantConfig, engine: Arc<dyn Engine>) -> Self {
        let (command_tx, command_rx) = mpsc::channel(config.command_channel_size.max(1));
        let (state, _) = watch::channel(SupplicantState::Idle);

        Self {
            inner: Arc::new(SupplicantInner {
                config,
                engine,
                ifaces: HandleCollection::new(),
                state,
                command_tx,
                command_rx: Mutex::new(Some(command_rx)),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &SupplicantConfig {
        &self.inner.config
    }

    // ── Interface table ──────────────────────────────────────────

    /// Attach a station interface the engine already knows about.
    pub fn add_interface(&self, name: &str) -> Result<Arc<StaIface>, CoreError> {
        self.inner.engine.resolve_iface(name).map_err(|e| match e {
            EngineError::NoSuchInterface(_) => CoreError::IfaceUnknown { name: name.to_owned() },
            other => CoreError::Engine(other),
        })?;

        let iface = StaIface::new(name, Arc::clone(&self.inner.engine), self.inner.config.max_anqp_elements);
        let iface = self
            .inner
            .ifaces
            .try_insert(name.to_owned(), iface)
            .map_err(|_| CoreError::IfaceExists { name: name.to_owned() })?;
        info!(iface = name, "interface attached");
        Ok(iface)
    }

    /// Attach every interface listed in the configuration, stopping at
    /// the first failure.
    pub fn add_configured_interfaces(&self) -> Result<Vec<Arc<StaIface>>, CoreError> {
        self.inner
            .config
            .interfaces
            .iter()
            .map(|name| self.add_interface(name))
            .collect()
    }

    /// Detach an interface. The handle, every network handle issued from
    /// it, and its subscriptions become invalid. Engine state is untouched.
    pub fn remove_interface(&self, name: &str) -> Result<(), CoreError> {
        let iface = self
            .inner
            .ifaces
            .remove(&name.to_owned())
            .ok_or_else(|| CoreError::IfaceUnknown { name: name.to_owned() })?;
        iface.invalidate();
        info!(iface = name, "interface detached");
        Ok(())
    }

    pub fn get_interface(&self, name: &str) -> Result<Arc<StaIface>, CoreError> {
        self.inner
            .ifaces
            .get(&name.to_owned())
            .ok_or_else(|| CoreError::IfaceUnknown { name: name.to_owned() })
    }

    /// Attached interface names, sorted.
    pub fn list_interfaces(&self) -> Vec<String> {
        self.inner
            .ifaces
            .snapshot()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Subscribe to interface table changes.
    pub fn interfaces(&self) -> watch::Receiver<IfaceSnapshot> {
        self.inner.ifaces.subscribe()
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Subscribe to lifecycle changes.
    pub fn state(&self) -> watch::Receiver<SupplicantState> {
        self.inner.state.subscribe()
    }

    /// Install the engine event sink, then spawn the event bridge and the
    /// command processor. Calling it again while running, or after
    /// shutdown, does nothing.
    ///
    /// Engine events raised before `start()` have no sink and are dropped.
    pub async fn start(&self) {
        let mut handles = self.inner.task_handles.lock().await;
        if *self.inner.state.borrow() != SupplicantState::Idle {
            return;
        }

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        self.inner.engine.subscribe_events(event_tx);
        let sup = self.clone();
        let cancel = self.inner.cancel.clone();
        handles.push(tokio::spawn(event_bridge_task(sup, event_rx, cancel)));

        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let cancel = self.inner.cancel.clone();
            handles.push(tokio::spawn(command_processor_task(rx, cancel)));
        }

        // `send_replace` updates even with zero receivers.
        self.inner.state.send_replace(SupplicantState::Running);
        info!(tasks = handles.len(), "supplicant started");
    }

    /// Cancel background tasks and invalidate every attached interface.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        let ifaces = self.inner.ifaces.drain();
        for iface in &ifaces {
            iface.invalidate();
        }

        self.inner.state.send_replace(SupplicantState::Stopped);
        debug!(interfaces = ifaces.len(), "supplicant shut down");
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a command against the named interface through the command
    /// processor.
    pub async fn execute(&self, name: &str, command: Command) -> Reply {
        match self.get_interface(name) {
            Ok(iface) => self.execute_on(&iface, command).await,
            Err(e) => Reply::failure(&e),
        }
    }

    /// Execute a command against a handle the caller already holds. The
    /// handle may be stale; the reply then says so.
    pub async fn execute_on(&self, iface: &Arc<StaIface>, command: Command) -> Reply {
        if *self.inner.state.borrow() != SupplicantState::Running {
            return Reply::failure(&CoreError::ProcessorStopped);
        }

        let (tx, rx) = oneshot::channel();
        let envelope = CommandEnvelope {
            iface: Arc::clone(iface),
            command,
            response_tx: tx,
        };

        if self.inner.command_tx.send(envelope).await.is_err() {
            return Reply::failure(&CoreError::ProcessorStopped);
        }
        rx.await
            .unwrap_or_else(|_| Reply::failure(&CoreError::ProcessorStopped))
    }

    // ── Engine events ────────────────────────────────────────────

    fn apply_engine_event(&self, event: EngineEvent) {
        match event {
            EngineEvent::Station { ifname, event } => {
                let Some(iface) = self.inner.ifaces.get(&ifname) else {
                    debug!(iface = %ifname, kind = event.kind(), "event for detached interface dropped");
                    return;
                };
                let delivered = iface.handle_engine_event(&event);
                trace!(iface = %ifname, kind = event.kind(), delivered, "event delivered");
            }
            EngineEvent::InterfaceRemoved { ifname } => {
                if let Some(iface) = self.inner.ifaces.remove(&ifname) {
                    iface.invalidate();
                    warn!(iface = %ifname, "interface removed by engine");
                }
            }
        }
    }
}

impl std::fmt::Debug for Supplicant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supplicant")
            .field("state", &*self.inner.state.borrow())
            .field("interfaces", &self.inner.ifaces.len())
            .finish_non_exhaustive()
    }
}

// ── Background tasks ─────────────────────────────────────────────

async fn command_processor_task(mut rx: mpsc::Receiver<CommandEnvelope>, cancel: CancellationToken) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let reply = envelope.iface.execute(envelope.command);
                let _ = envelope.response_tx.send(reply);
            }
        }
    }
}

async fn event_bridge_task(
    supplicant: Supplicant,
    mut rx: mpsc::UnboundedReceiver<EngineEvent>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            event = rx.recv() => {
                let Some(event) = event else { break };
                supplicant.apply_engine_event(event);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::callback::ChannelCallback;
    use crate::command::Payload;
    use crate::engine::SimulatedEngine;
    use crate::error::StatusCode;
    use crate::model::{MacAddress, StaIfaceEvent, TdlsOperation};

    const PEER: MacAddress = MacAddress::new([0x02, 0x11, 0x22, 0x33, 0x44, 0x55]);

    fn supplicant(ifaces: &[&str]) -> (Arc<SimulatedEngine>, Supplicant) {
        let engine = ifaces
            .iter()
            .fold(SimulatedEngine::new(), |e, name| e.with_interface(name))
            .into_shared();
        let sup = Supplicant::new(SupplicantConfig::default(), Arc::clone(&engine) as Arc<dyn Engine>);
        (engine, sup)
    }

    #[test]
    fn add_interface_checks_engine_and_duplicates() {
        let (_engine, sup) = supplicant(&["wlan0"]);

        assert_eq!(
            sup.add_interface("wlan9").unwrap_err().status_code(),
            StatusCode::FailureIfaceUnknown
        );
        sup.add_interface("wlan0").unwrap();
        assert_eq!(
            sup.add_interface("wlan0").unwrap_err().status_code(),
            StatusCode::FailureIfaceExists
        );
        assert_eq!(sup.list_interfaces(), vec!["wlan0".to_owned()]);
    }

    #[test]
    fn remove_interface_invalidates_handle() {
        let (_engine, sup) = supplicant(&["wlan0"]);
        let iface = sup.add_interface("wlan0").unwrap();

        sup.remove_interface("wlan0").unwrap();
        assert!(!iface.is_valid());
        assert!(sup.get_interface("wlan0").is_err());
        assert_eq!(
            sup.remove_interface("wlan0").unwrap_err().status_code(),
            StatusCode::FailureIfaceUnknown
        );
    }

    #[test]
    fn configured_interfaces_are_attached() {
        let engine = SimulatedEngine::new()
            .with_interface("wlan0")
            .with_interface("wlan1")
            .into_shared();
        let config = SupplicantConfig {
            interfaces: vec!["wlan1".into(), "wlan0".into()],
            ..SupplicantConfig::default()
        };
        let sup = Supplicant::new(config, engine);
        sup.add_configured_interfaces().unwrap();
        assert_eq!(sup.list_interfaces(), vec!["wlan0".to_owned(), "wlan1".to_owned()]);
    }

    #[tokio::test]
    async fn execute_before_start_reports_stopped_processor() {
        let (_engine, sup) = supplicant(&["wlan0"]);
        sup.add_interface("wlan0").unwrap();
        let reply = sup.execute("wlan0", Command::GetName).await;
        assert_eq!(reply.code(), StatusCode::FailureUnknown);
    }

    #[tokio::test]
    async fn execute_unknown_interface() {
        let (_engine, sup) = supplicant(&[]);
        sup.start().await;
        let reply = sup.execute("wlan0", Command::GetName).await;
        assert_eq!(reply.code(), StatusCode::FailureIfaceUnknown);
        sup.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_invalidates_everything() {
        let (_engine, sup) = supplicant(&["wlan0"]);
        let iface = sup.add_interface("wlan0").unwrap();
        sup.start().await;
        assert_eq!(*sup.state().borrow(), SupplicantState::Running);

        sup.shutdown().await;
        assert_eq!(*sup.state().borrow(), SupplicantState::Stopped);
        assert!(!iface.is_valid());
        assert!(sup.list_interfaces().is_empty());

        let reply = sup.execute_on(&iface, Command::GetName).await;
        assert_eq!(reply.code(), StatusCode::FailureUnknown);
    }

    #[tokio::test]
    async fn start_enables_execute_without_state_subscribers() {
        let (_engine, sup) = supplicant(&["wlan0"]);
        sup.add_interface("wlan0").unwrap();
        sup.start().await;

        let reply = sup.execute("wlan0", Command::GetName).await;
        assert_eq!(reply.code(), StatusCode::Success);
        assert!(matches!(reply.payload, Payload::Name(ref name) if name == "wlan0"));

        sup.shutdown().await;
        let reply = sup.execute("wlan0", Command::GetName).await;
        assert_eq!(reply.code(), StatusCode::FailureIfaceUnknown);
    }

    #[tokio::test]
    async fn events_raised_before_start_are_not_replayed() {
        let (_engine, sup) = supplicant(&["wlan0"]);
        let iface = sup.add_interface("wlan0").unwrap();
        let (cb, mut rx) = ChannelCallback::new();
        iface.register_callback(cb).unwrap();

        iface.initiate_tdls_discover(PEER).unwrap();
        sup.start().await;
        iface.initiate_tdls_setup(PEER).unwrap();

        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(
            event,
            StaIfaceEvent::TdlsStatus { operation: TdlsOperation::Setup, .. }
        ));
        sup.shutdown().await;
    }
}
