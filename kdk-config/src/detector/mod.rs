//! Host detection used while building a configuration.

pub mod keybase;

pub use keybase::{detect_keybase, KEYBASE_ROOTS, KEYBASE_TARGET};
