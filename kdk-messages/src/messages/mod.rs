//! Central registry for all user-facing message templates.
//!
//! Organized by domain:
//! - `env` - environment lifecycle (up, destroy, restart, snapshot, prune, pull, ssh)
//! - `config` - init, keypair and mount questions
//! - `update` - release checks and self-update
//! - `common` - shared/reusable messages
//!
//! Templates use `{variable}` syntax for runtime values, which are
//! substituted by the `MessageBuilder`:
//!
//! ```rust
//! use kdk_messages::{msg, MESSAGES};
//!
//! let text = msg!(MESSAGES.env.up_already_running, name = "kdk");
//! assert!(text.contains("kdk"));
//! ```

mod common;
mod config;
mod env;
mod update;

pub use common::{CommonMessages, COMMON_MESSAGES};
pub use config::{ConfigMessages, CONFIG_MESSAGES};
pub use env::{EnvMessages, ENV_MESSAGES};
pub use update::{UpdateMessages, UPDATE_MESSAGES};

/// Unified messages struct containing all domain-specific message modules
pub struct Messages {
    pub env: EnvMessages,
    pub config: ConfigMessages,
    pub update: UpdateMessages,
    pub common: CommonMessages,
}

/// Global messages constant - main entry point for all message templates
pub const MESSAGES: Messages = Messages {
    env: ENV_MESSAGES,
    config: CONFIG_MESSAGES,
    update: UPDATE_MESSAGES,
    common: COMMON_MESSAGES,
};
