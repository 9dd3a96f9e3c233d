//! kdk-messages
//!
//! Centralized messaging for the kdk CLI.
//! Provides the user-facing templates and the `msg!` builder that fills them.

pub mod builder;
pub mod macros;
pub mod messages;

pub use messages::MESSAGES;
