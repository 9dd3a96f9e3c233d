//! KDK environment configuration.
//!
//! One YAML file per named environment is the durable source of truth for
//! how its container is created. This crate owns the data model, its
//! persistence, and the interactive mount discovery that feeds `init`.

pub mod config;
pub mod detector;
pub mod mounts;
pub mod store;

pub use config::{
    AppConfig, ContainerSpec, Empty, EnvironmentConfig, HostSpec, MountSpec, MountType,
    PortBinding,
};
pub use mounts::MountResolver;
pub use store::{ConfigStore, OverwritePolicy, SaveOutcome};
