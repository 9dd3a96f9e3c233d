//! Release checks and self-update.

pub mod binary;
pub mod reconciler;
pub mod release;

pub use binary::ReleaseInstaller;
pub use reconciler::{needs_binary_update, needs_config_update, UpdateReconciler};
pub use release::fetch_latest_version;

use tracing::debug;

use kdk_config::EnvironmentConfig;
use kdk_core::{kdk_println, KDK_VERSION};
use kdk_messages::{msg, MESSAGES};

/// Disables the advisory check that runs before most commands.
pub const SKIP_UPDATE_CHECK_ENV: &str = "KDK_SKIP_UPDATE_CHECK";

/// Warn when the binary or the environment's image lag behind the latest
/// release. Never fails; an unknown latest version prints nothing.
pub fn warn_if_update_available(cfg: Option<&EnvironmentConfig>) {
    if std::env::var_os(SKIP_UPDATE_CHECK_ENV).is_some() {
        debug!("Update check skipped ({} set)", SKIP_UPDATE_CHECK_ENV);
        return;
    }
    let Some(latest) = fetch_latest_version() else {
        return;
    };
    for warning in advisories(KDK_VERSION, cfg, &latest) {
        kdk_println!("{}", warning);
    }
}

fn advisories(installed: &str, cfg: Option<&EnvironmentConfig>, latest: &str) -> Vec<String> {
    let mut warnings = Vec::new();
    if needs_binary_update(installed, Some(latest)) {
        warnings.push(msg!(
            MESSAGES.update.binary_outdated,
            installed = installed,
            latest = latest
        ));
    }
    if let Some(cfg) = cfg.filter(|c| needs_config_update(c, Some(latest))) {
        warnings.push(msg!(
            MESSAGES.update.config_outdated,
            name = cfg.name(),
            current = &cfg.app_config.image_tag,
            latest = latest
        ));
    }
    warnings
}
