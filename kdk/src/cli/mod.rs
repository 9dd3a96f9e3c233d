// CLI argument parsing and definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use kdk_config::config::DEFAULT_NAME;

#[derive(Debug, Clone, Parser)]
#[command(name = "kdk")]
#[command(about = "Kubernetes Development Kit: one long-lived dev container per environment")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Name of the KDK environment (container and config directory)
    #[arg(short, long, global = true, default_value = DEFAULT_NAME)]
    pub name: String,

    /// Path to a KDK configuration file, overriding <configRoot>/<name>/config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Print more detail about what is happening
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct InitArgs {
    /// SSH port on localhost (asked interactively when omitted)
    #[arg(long)]
    pub port: Option<u16>,

    #[arg(long)]
    pub image_repository: Option<String>,

    #[arg(long)]
    pub image_tag: Option<String>,

    /// Git repository of dotfiles installed for the user
    #[arg(long)]
    pub dotfiles_repo: Option<String>,

    /// Login shell inside the container
    #[arg(long)]
    pub shell: Option<String>,

    /// Local SOCKS proxy port forwarded over SSH
    #[arg(long)]
    pub socks_port: Option<u16>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create the SSH keypair and the environment configuration
    Init(InitArgs),

    /// Start the KDK container, creating it if needed
    Up,

    /// Connect to the KDK over SSH, starting it first if needed
    Ssh,

    /// Remove the KDK container
    Destroy {
        /// Skip confirmation prompts
        #[arg(short, long)]
        yes: bool,
    },

    /// Snapshot the container and recreate it from the snapshot
    Restart,

    /// Commit the container to a timestamped image tag
    Snapshot,

    /// Remove KDK images that no running container uses
    Prune,

    /// Pull the configured image
    Pull {
        /// Pull even when the image is already present
        #[arg(short, long)]
        force: bool,
    },

    /// Update configuration, image and binary to the latest release
    Update,

    /// Copy the host kube config into the KDK
    Kubesync,
}

impl Command {
    /// Short name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Init(_) => "init",
            Command::Up => "up",
            Command::Ssh => "ssh",
            Command::Destroy { .. } => "destroy",
            Command::Restart => "restart",
            Command::Snapshot => "snapshot",
            Command::Prune => "prune",
            Command::Pull { .. } => "pull",
            Command::Update => "update",
            Command::Kubesync => "kubesync",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::parse_from(["kdk", "destroy", "--yes", "--name", "work", "-d"]);
        assert_eq!(args.name, "work");
        assert!(args.debug);
        assert!(matches!(args.command, Command::Destroy { yes: true }));
    }

    #[test]
    fn test_default_name() {
        let args = Args::parse_from(["kdk", "up"]);
        assert_eq!(args.name, "kdk");
        assert!(args.config.is_none());
    }

    #[test]
    fn test_init_flags() {
        let args = Args::parse_from([
            "kdk",
            "init",
            "--port",
            "2222",
            "--image-tag",
            "debian-latest",
            "--socks-port",
            "8000",
        ]);
        let Command::Init(init) = args.command else {
            panic!("expected init");
        };
        assert_eq!(init.port, Some(2222));
        assert_eq!(init.image_tag.as_deref(), Some("debian-latest"));
        assert_eq!(init.socks_port, Some(8000));
        assert!(init.shell.is_none());
    }
}
