use tracing::{info, warn};

use super::{connect_runtime, KdkContext};
use crate::error::{CliError, CliResult};
use crate::update::{fetch_latest_version, ReleaseInstaller, UpdateReconciler};
use kdk_core::prompt::Prompter;
use kdk_core::{kdk_println, KDK_VERSION};
use kdk_messages::MESSAGES;
use kdk_provider::ContainerRuntime;

/// Handles the `kdk update` command.
pub fn handle_update(ctx: &KdkContext, prompter: &dyn Prompter) -> CliResult<()> {
    let Some(latest) = fetch_latest_version() else {
        kdk_println!("{}", MESSAGES.update.latest_unknown);
        return Ok(());
    };

    // Missing pieces only fail the stages that need them.
    let mut cfg = ctx
        .require_config()
        .map_err(|e| warn!("Configuration unavailable for update: {}", e))
        .ok();
    let runtime = connect_runtime()
        .map_err(|e| warn!("Docker unavailable for update: {}", e))
        .ok();
    let installer = ReleaseInstaller::new(ctx.platform);
    let reconciler = UpdateReconciler::new(
        runtime.as_ref().map(|r| r as &dyn ContainerRuntime),
        prompter,
        &ctx.store,
        &installer,
        KDK_VERSION,
    );

    let report = reconciler.apply(cfg.as_mut(), &latest);
    info!("update to {} finished: {:?}", latest, report);
    match report.failed() {
        0 => Ok(()),
        failed => Err(CliError::Update { failed }),
    }
}
