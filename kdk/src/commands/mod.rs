// Command handlers for KDK operations

use tracing::debug;

use crate::cli::{Args, Command};
use crate::error::{CliError, CliResult};
use kdk_config::{ConfigStore, EnvironmentConfig};
use kdk_core::error::KdkError;
use kdk_core::kdk_println;
use kdk_core::platform::{current_username, get_platform_info, Platform};
use kdk_core::prompt::{Prompter, TerminalPrompter};
use kdk_core::user_paths::KdkPaths;
use kdk_messages::{msg, MESSAGES};
use kdk_provider::docker::{validate_docker_environment, DockerRuntime};
use kdk_provider::{ContainerRuntime, LifecycleController, MirrorBridge};

pub mod env_ops;
pub mod init;
pub mod ssh;
pub mod update;

/// Everything resolved once per invocation and shared by the handlers.
pub struct KdkContext {
    pub name: String,
    pub paths: KdkPaths,
    pub store: ConfigStore,
    pub username: String,
    pub platform: Platform,
    pub debug: bool,
    pub verbose: bool,
}

impl KdkContext {
    pub fn from_args(args: &Args) -> CliResult<Self> {
        let paths = KdkPaths::from_env()?;
        let store = ConfigStore::new(paths.clone(), args.config.clone());
        Ok(Self {
            name: args.name.clone(),
            paths,
            store,
            username: current_username(),
            platform: get_platform_info(),
            debug: args.debug,
            verbose: args.verbose,
        })
    }

    /// Load the environment's configuration, failing when `kdk init` never ran.
    pub fn require_config(&self) -> CliResult<EnvironmentConfig> {
        match self.store.load(&self.name)? {
            Some(cfg) => Ok(cfg),
            None => {
                let path = self.store.config_path(&self.name);
                Err(CliError::Config {
                    source: Box::new(KdkError::Config(format!(
                        "{} does not exist",
                        path.display()
                    ))),
                    context: format!(
                        "No configuration for KDK '{}'\n{}",
                        self.name, MESSAGES.common.error_rebuild_hint
                    ),
                })
            }
        }
    }

    /// Load the configuration, running `init` first when there is none.
    pub fn load_or_init(&self, prompter: &dyn Prompter) -> CliResult<EnvironmentConfig> {
        if !self.store.exists(&self.name) {
            kdk_println!("{}", msg!(MESSAGES.config.init_missing, name = &self.name));
            init::handle_init(self, prompter, &Default::default())?;
        }
        self.require_config()
    }

    /// Lifecycle controller; the Keybase mirror is only attached on Windows.
    pub fn controller<'a>(
        &'a self,
        runtime: &'a dyn ContainerRuntime,
        prompter: &'a dyn Prompter,
        mirror: &'a dyn MirrorBridge,
    ) -> LifecycleController<'a> {
        let controller = LifecycleController::new(runtime, prompter, &self.store);
        if self.platform.is_windows() {
            controller.with_mirror(mirror)
        } else {
            controller
        }
    }
}

/// Check that Docker is usable before handing out a runtime.
pub fn connect_runtime() -> CliResult<DockerRuntime> {
    validate_docker_environment()?;
    Ok(DockerRuntime::new())
}

/// Main command dispatcher
#[must_use = "command execution results should be handled"]
pub fn execute_command(args: Args) -> CliResult<()> {
    let ctx = KdkContext::from_args(&args)?;
    let prompter = TerminalPrompter;
    debug!(
        "Resolved environment '{}' (config root {}, debug={}, verbose={})",
        ctx.name,
        ctx.paths.root().display(),
        ctx.debug,
        ctx.verbose
    );

    if checks_for_updates(&args.command) {
        // Advisory only; an unreadable config is reported by the command itself.
        let cfg = ctx.store.load(&ctx.name).ok().flatten();
        crate::update::warn_if_update_available(cfg.as_ref());
    }

    match &args.command {
        Command::Init(init_args) => init::handle_init(&ctx, &prompter, init_args),
        Command::Up => env_ops::handle_up(&ctx, &prompter),
        Command::Ssh => ssh::handle_ssh(&ctx, &prompter),
        Command::Destroy { yes } => env_ops::handle_destroy(&ctx, &prompter, *yes),
        Command::Restart => env_ops::handle_restart(&ctx, &prompter),
        Command::Snapshot => env_ops::handle_snapshot(&ctx, &prompter),
        Command::Prune => env_ops::handle_prune(&ctx, &prompter),
        Command::Pull { force } => env_ops::handle_pull(&ctx, &prompter, *force),
        Command::Update => update::handle_update(&ctx, &prompter),
        Command::Kubesync => ssh::handle_kubesync(&ctx, &prompter),
    }
}

/// `init` has nothing to compare yet and `update` does its own check.
fn checks_for_updates(command: &Command) -> bool {
    !matches!(command, Command::Init(_) | Command::Update)
}
