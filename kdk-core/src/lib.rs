pub mod command_stream;
pub mod error;
pub mod output_macros;
pub mod platform;
pub mod prompt;
pub mod user_paths;

/// Version of the tool; stamped on every image and container it creates as the `kdk` label.
pub const KDK_VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));

/// Label key marking images and containers as owned by the tool.
pub const KDK_LABEL: &str = "kdk";
