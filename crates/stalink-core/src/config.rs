// ── Runtime façade configuration ──
//
// Describes which interfaces to bring up and how the façade is tuned.
// Never touches disk: the config crate builds a `SupplicantConfig` and
// hands it in.

/// Default bound on info ids plus subtypes in one ANQP query.
pub const DEFAULT_MAX_ANQP_ELEMENTS: usize = 100;

/// Configuration for a single [`Supplicant`](crate::Supplicant).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplicantConfig {
    /// Interfaces to attach when [`add_configured_interfaces`](crate::Supplicant::add_configured_interfaces) runs.
    pub interfaces: Vec<String>,
    /// Depth of the command channel feeding the serial processor.
    pub command_channel_size: usize,
    /// Upper bound on elements requested by one ANQP query.
    pub max_anqp_elements: usize,
}

impl Default for SupplicantConfig {
    fn default() -> Self {
        Self {
            interfaces: Vec::new(),
            command_channel_size: 64,
            max_anqp_elements: DEFAULT_MAX_ANQP_ELEMENTS,
        }
    }
}
