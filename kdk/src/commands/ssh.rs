//! `kdk ssh` and `kdk kubesync`.

use std::path::Path;

use tracing::{info, warn};

use super::{connect_runtime, KdkContext};
use crate::error::{CliError, CliResult, OperationContext};
use crate::ssh::SshSession;
use kdk_core::error::KdkError;
use kdk_core::kdk_println;
use kdk_core::prompt::Prompter;
use kdk_core::user_paths::home_dir;
use kdk_messages::{msg, MESSAGES};
use kdk_provider::KeybaseMirror;

/// Kube config destination, relative to the user's home inside the KDK.
pub const KUBE_CONFIG_TARGET: &str = ".kube/docker-for-desktop.example.org";

/// Rewrites the copied config so it reaches the host's cluster from inside the container.
const KUBE_CONFIG_REWRITE: &str = "sed -i -e 's@localhost@host.docker.internal@g' \
     -e 's@docker-for-desktop.*@docker-for-desktop.example.org@g'";

/// Connect over SSH, bringing the environment up first if needed.
pub fn handle_ssh(ctx: &KdkContext, prompter: &dyn Prompter) -> CliResult<()> {
    let cfg = ctx.load_or_init(prompter)?;
    let runtime = connect_runtime()?;
    let mirror = KeybaseMirror::new(ctx.paths.clone());
    let controller = ctx.controller(&runtime, prompter, &mirror);

    if !controller.ensure_running(&cfg).for_env(&ctx.name, "ssh")? {
        kdk_println!("{}", msg!(MESSAGES.env.ssh_not_ready, name = &ctx.name));
        return Ok(());
    }

    kdk_println!(
        "{}",
        msg!(MESSAGES.env.ssh_connecting, name = &ctx.name, port = cfg.port())
    );
    SshSession::new(&cfg, &ctx.paths, &ctx.username)
        .connect()
        .for_env(&ctx.name, "ssh")
}

/// Copy the host's kube config into a running KDK.
pub fn handle_kubesync(ctx: &KdkContext, prompter: &dyn Prompter) -> CliResult<()> {
    let cfg = ctx.require_config()?;
    let runtime = connect_runtime()?;
    let mirror = KeybaseMirror::new(ctx.paths.clone());
    let controller = ctx.controller(&runtime, prompter, &mirror);

    if !controller.is_running(&cfg).for_env(&ctx.name, "kubesync")? {
        kdk_println!("{}", msg!(MESSAGES.env.not_running, name = &ctx.name));
        return Err(CliError::operation(
            KdkError::Provider(format!("KDK '{}' is not running", ctx.name)),
            Some(&ctx.name),
            "kubesync",
        ));
    }

    let kube_config = home_dir()?.join(".kube").join("config");
    if !kube_config.is_file() {
        warn!("No kube config at {}", kube_config.display());
        return Err(CliError::filesystem(
            KdkError::Filesystem("kube config not found".to_string()),
            kube_config.display().to_string(),
            "kubesync",
        ));
    }

    kdk_println!("{}", msg!(MESSAGES.env.kubesync_progress, name = &ctx.name));
    let session = SshSession::new(&cfg, &ctx.paths, &ctx.username);
    sync_kube_config(&session, &kube_config).for_env(&ctx.name, "kubesync")?;
    info!("Synced {} into '{}'", kube_config.display(), ctx.name);
    kdk_println!("{}", MESSAGES.env.kubesync_success);
    Ok(())
}

fn sync_kube_config(session: &SshSession, kube_config: &Path) -> kdk_core::error::Result<()> {
    session.exec("mkdir -p ~/.kube")?;
    session.scp_to(&kube_config.to_string_lossy(), KUBE_CONFIG_TARGET)?;
    session.exec(&rewrite_command())
}

fn rewrite_command() -> String {
    format!("{} {}", KUBE_CONFIG_REWRITE, KUBE_CONFIG_TARGET)
}
