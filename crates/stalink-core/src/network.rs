//! Per-interface network handle registry.
//!
//! The engine owns the network entries; this registry only remembers which
//! ids have had handles issued and the validity flag those handles share.
//! Removing an id (through the façade or behind its back) flips that flag,
//! so every outstanding handle for the id turns invalid at once.

use tracing::debug;

use crate::model::NetworkId;
use crate::store::HandleCollection;
use crate::validity::ValidityFlag;

struct NetworkSlot {
    valid: ValidityFlag,
}

pub(crate) struct NetworkRegistry {
    ifname: String,
    slots: HandleCollection<NetworkId, NetworkSlot>,
}

impl NetworkRegistry {
    pub(crate) fn new(ifname: impl Into<String>) -> Self {
        Self {
            ifname: ifname.into(),
            slots: HandleCollection::new(),
        }
    }

    /// Flag shared by every handle issued for `id`, created on first use.
    pub(crate) fn flag_for(&self, id: NetworkId) -> ValidityFlag {
        self.slots
            .get_or_insert_with(id, || NetworkSlot {
                valid: ValidityFlag::new(),
            })
            .valid
            .clone()
    }

    /// Invalidate all handles for `id`. Returns whether any were issued.
    pub(crate) fn invalidate(&self, id: NetworkId) -> bool {
        let Some(slot) = self.slots.remove(&id) else {
            return false;
        };
        slot.valid.invalidate();
        debug!(iface = %self.ifname, network_id = %id, "network handles invalidated");
        true
    }

    /// Invalidate every issued handle; used when the interface goes away.
    pub(crate) fn invalidate_all(&self) -> usize {
        let drained = self.slots.drain();
        for slot in &drained {
            slot.valid.invalidate();
        }
        drained.len()
    }

    /// Ids with live handles, in creation order.
    pub(crate) fn issued(&self) -> Vec<NetworkId> {
        self.slots.snapshot().iter().map(|(id, _)| *id).collect()
    }
}
