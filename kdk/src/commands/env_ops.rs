//! Handlers for the container lifecycle commands.

use tracing::{debug, info};

use super::{connect_runtime, KdkContext};
use crate::error::{CliResult, OperationContext};
use kdk_core::prompt::Prompter;
use kdk_provider::{KeybaseMirror, PruneOutcome};

pub fn handle_up(ctx: &KdkContext, prompter: &dyn Prompter) -> CliResult<()> {
    let cfg = ctx.load_or_init(prompter)?;
    let runtime = connect_runtime()?;
    let mirror = KeybaseMirror::new(ctx.paths.clone());
    let controller = ctx.controller(&runtime, prompter, &mirror);

    controller.pull(&cfg, false).for_env(&ctx.name, "pull")?;
    let outcome = controller.up(&cfg).for_env(&ctx.name, "up")?;
    debug!("up finished with {:?}", outcome);
    if outcome.started() {
        controller.provision(&cfg).for_env(&ctx.name, "provision")?;
    }
    Ok(())
}

pub fn handle_destroy(ctx: &KdkContext, prompter: &dyn Prompter, yes: bool) -> CliResult<()> {
    let cfg = ctx.require_config()?;
    let runtime = connect_runtime()?;
    let mirror = KeybaseMirror::new(ctx.paths.clone());
    let outcome = ctx
        .controller(&runtime, prompter, &mirror)
        .destroy(&cfg, yes)
        .for_env(&ctx.name, "destroy")?;
    info!("destroy finished with {:?}", outcome);
    Ok(())
}

pub fn handle_restart(ctx: &KdkContext, prompter: &dyn Prompter) -> CliResult<()> {
    let mut cfg = ctx.require_config()?;
    let runtime = connect_runtime()?;
    let mirror = KeybaseMirror::new(ctx.paths.clone());
    let running = ctx
        .controller(&runtime, prompter, &mirror)
        .restart(&mut cfg, &ctx.username)
        .for_env(&ctx.name, "restart")?;
    info!("restart finished, running={}", running);
    Ok(())
}

pub fn handle_snapshot(ctx: &KdkContext, prompter: &dyn Prompter) -> CliResult<()> {
    let cfg = ctx.require_config()?;
    let runtime = connect_runtime()?;
    let mirror = KeybaseMirror::new(ctx.paths.clone());
    ctx.controller(&runtime, prompter, &mirror)
        .snapshot(&cfg, &ctx.username)
        .for_env(&ctx.name, "snapshot")?;
    Ok(())
}

/// Prune works across environments and needs no configuration.
pub fn handle_prune(ctx: &KdkContext, prompter: &dyn Prompter) -> CliResult<()> {
    let runtime = connect_runtime()?;
    let mirror = KeybaseMirror::new(ctx.paths.clone());
    let outcome = ctx
        .controller(&runtime, prompter, &mirror)
        .prune()
        .for_env(&ctx.name, "prune")?;
    if let PruneOutcome::Cancelled { removed } = outcome {
        debug!("prune stopped by the user after {} removal(s)", removed);
    }
    Ok(())
}

pub fn handle_pull(ctx: &KdkContext, prompter: &dyn Prompter, force: bool) -> CliResult<()> {
    let cfg = ctx.require_config()?;
    let runtime = connect_runtime()?;
    let mirror = KeybaseMirror::new(ctx.paths.clone());
    ctx.controller(&runtime, prompter, &mirror)
        .pull(&cfg, force)
        .for_env(&ctx.name, "pull")?;
    Ok(())
}
