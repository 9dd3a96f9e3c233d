// Standard library imports
use std::net::TcpListener;

// External crate imports
use tracing::{debug, info};

// Internal imports
use super::KdkContext;
use crate::cli::InitArgs;
use crate::error::CliResult;
use crate::keypair;
use kdk_config::config::{
    DEFAULT_DOTFILES_REPO, DEFAULT_IMAGE_REPOSITORY, DEFAULT_SHELL, DEFAULT_SOCKS_PORT,
};
use kdk_config::{AppConfig, EnvironmentConfig, MountResolver, OverwritePolicy, SaveOutcome};
use kdk_core::prompt::{any_answer, confirm, port_or_empty, Confirmation, Prompt, Prompter, Validator};
use kdk_core::{kdk_println, KDK_VERSION};
use kdk_messages::{msg, MESSAGES};

const QUESTION_ATTEMPTS: u32 = 3;

/// Handles the `kdk init` command.
///
/// Values given as flags are not asked for. The keypair is created first so
/// the public key mount points at an existing file.
pub fn handle_init(ctx: &KdkContext, prompter: &dyn Prompter, args: &InitArgs) -> CliResult<()> {
    kdk_println!("{}", msg!(MESSAGES.config.init_header, name = &ctx.name));
    keypair::ensure(&ctx.paths)?;

    let app = ask_app_config(&ctx.name, prompter, args)?;
    let mounts = MountResolver::new(&ctx.paths, prompter)
        .windows(ctx.platform.is_windows())
        .resolve()?;
    let cfg = EnvironmentConfig::build(app, &ctx.username, mounts);

    let path = ctx.store.config_path(&ctx.name);
    match ctx.store.save(&cfg, OverwritePolicy::Prompt, prompter)? {
        SaveOutcome::Written => {
            info!("Initialized '{}' with image {}", ctx.name, cfg.image_coordinates());
            kdk_println!("{}", msg!(MESSAGES.config.init_success, path = path.display()));
        }
        SaveOutcome::NotOverwritten => {
            kdk_println!("{}", msg!(MESSAGES.config.init_not_overwritten, path = path.display()));
        }
    }
    Ok(())
}

fn ask_app_config(name: &str, prompter: &dyn Prompter, args: &InitArgs) -> CliResult<AppConfig> {
    let port = match args.port {
        Some(port) => port.to_string(),
        None => ask(prompter, MESSAGES.config.ask_port, &free_port()?, port_or_empty)?,
    };
    let image_repository = given_or_ask(
        prompter,
        &args.image_repository,
        MESSAGES.config.ask_image_repository,
        DEFAULT_IMAGE_REPOSITORY,
    )?;
    let image_tag = given_or_ask(prompter, &args.image_tag, MESSAGES.config.ask_image_tag, KDK_VERSION)?;
    let dotfiles_repo = given_or_ask(
        prompter,
        &args.dotfiles_repo,
        MESSAGES.config.ask_dotfiles_repo,
        DEFAULT_DOTFILES_REPO,
    )?;
    let shell = given_or_ask(prompter, &args.shell, MESSAGES.config.ask_shell, DEFAULT_SHELL)?;

    let socks_port = match args.socks_port {
        Some(port) => Some(port.to_string()),
        None => ask_socks_port(prompter)?,
    };

    Ok(AppConfig {
        name: name.to_string(),
        port,
        image_repository,
        image_tag,
        dotfiles_repo,
        shell,
        socks_port,
    })
}

fn ask_socks_port(prompter: &dyn Prompter) -> CliResult<Option<String>> {
    if confirm(prompter, MESSAGES.config.ask_socks_enable)? == Confirmation::Declined {
        return Ok(None);
    }
    let port = ask(prompter, MESSAGES.config.ask_socks_port, DEFAULT_SOCKS_PORT, port_or_empty)?;
    Ok(Some(port))
}

fn given_or_ask(
    prompter: &dyn Prompter,
    given: &Option<String>,
    text: &str,
    default: &str,
) -> CliResult<String> {
    match given {
        Some(value) => Ok(value.clone()),
        None => ask(prompter, text, default, any_answer),
    }
}

/// Ask with a default; closed input or exhausted attempts take the default.
fn ask(prompter: &dyn Prompter, text: &str, default: &str, validator: Validator) -> CliResult<String> {
    let answer = Prompt::new(text)
        .attempts(QUESTION_ATTEMPTS)
        .validator(validator)
        .default(default)
        .run(prompter)?;
    Ok(answer.unwrap_or_else(|| default.to_string()))
}

/// Suggest a localhost port nothing is listening on right now.
fn free_port() -> CliResult<String> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    debug!("Suggesting free port {}", port);
    Ok(port.to_string())
}
