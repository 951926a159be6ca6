//! Daemon error types with miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;

use stalink_config::ConfigError;
use stalink_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(stalink::config),
        help("Check the config file passed with --config, or STALINK_* environment variables.")
    )]
    Config(#[from] ConfigError),

    #[error("Interface '{name}' is not known to the engine")]
    #[diagnostic(
        code(stalink::iface_unknown),
        help("Every entry in `interfaces` must name an interface the engine has brought up.")
    )]
    IfaceUnknown { name: String },

    #[error("Interface '{name}' is listed twice")]
    #[diagnostic(code(stalink::iface_exists))]
    IfaceExists { name: String },

    #[error(transparent)]
    #[diagnostic(code(stalink::core))]
    Core(CoreError),

    #[error("IO error: {0}")]
    #[diagnostic(code(stalink::io))]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::IfaceExists { .. } => exit_code::USAGE,
            Self::IfaceUnknown { .. } => exit_code::NOT_FOUND,
            Self::Core(_) | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::IfaceUnknown { name } => Self::IfaceUnknown { name },
            CoreError::IfaceExists { name } => Self::IfaceExists { name },
            other => Self::Core(other),
        }
    }
}
