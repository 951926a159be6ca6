//! Subscriber registry for station events.
//!
//! Subscribers are compared by identity: registering the same subscriber
//! twice keeps one entry, so it is notified once per event. There is no
//! unregister; dead subscribers are pruned during delivery and the whole
//! registry is cleared when the owning interface is invalidated.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::model::StaIfaceEvent;

/// Receiver of asynchronous station events.
pub trait StaIfaceCallback: Send + Sync {
    fn on_event(&self, event: &StaIfaceEvent);

    /// `false` once the remote end is gone; the registry then drops it.
    fn is_alive(&self) -> bool {
        true
    }
}

/// Shared reference to a subscriber, identified by pointer.
#[derive(Clone)]
pub struct Subscriber(Arc<dyn StaIfaceCallback>);

impl Subscriber {
    pub fn new(callback: Arc<dyn StaIfaceCallback>) -> Self {
        Self(callback)
    }

    fn identity(&self) -> usize {
        Arc::as_ptr(&self.0).cast::<()>().addr()
    }
}

impl<C: StaIfaceCallback + 'static> From<Arc<C>> for Subscriber {
    fn from(callback: Arc<C>) -> Self {
        Self(callback)
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Subscriber({:#x})", self.identity())
    }
}

/// Subscriber that forwards events into a channel.
///
/// Counts as dead once the receiving half is dropped.
pub struct ChannelCallback {
    tx: mpsc::UnboundedSender<StaIfaceEvent>,
}

impl ChannelCallback {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<StaIfaceEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

impl StaIfaceCallback for ChannelCallback {
    fn on_event(&self, event: &StaIfaceEvent) {
        let _ = self.tx.send(event.clone());
    }

    fn is_alive(&self) -> bool {
        !self.tx.is_closed()
    }
}

pub(crate) struct CallbackRegistry {
    ifname: String,
    subscribers: DashMap<usize, Subscriber>,
}

impl CallbackRegistry {
    pub(crate) fn new(ifname: impl Into<String>) -> Self {
        Self {
            ifname: ifname.into(),
            subscribers: DashMap::new(),
        }
    }

    /// Add a subscriber. Returns `false` if it was already registered.
    pub(crate) fn register(&self, subscriber: Subscriber) -> bool {
        match self.subscribers.entry(subscriber.identity()) {
            Entry::Occupied(_) => {
                debug!(iface = %self.ifname, ?subscriber, "callback already registered");
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(subscriber);
                true
            }
        }
    }

    /// Deliver `event` to every live subscriber. Returns how many got it.
    pub(crate) fn notify(&self, event: &StaIfaceEvent) -> usize {
        // Clone out first so no shard lock is held while user code runs.
        let targets: Vec<(usize, Subscriber)> = self
            .subscribers
            .iter()
            .map(|r| (*r.key(), r.value().clone()))
            .collect();

        let mut delivered = 0;
        for (key, subscriber) in targets {
            if !subscriber.0.is_alive() {
                warn!(iface = %self.ifname, ?subscriber, "dropping dead callback");
                self.subscribers.remove(&key);
                continue;
            }
            subscriber.0.on_event(event);
            delivered += 1;
        }
        delivered
    }

    pub(crate) fn clear(&self) {
        self.subscribers.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.subscribers.len()
    }
}
