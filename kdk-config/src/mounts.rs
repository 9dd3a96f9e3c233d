//! Interactive mount discovery for `init`.
//!
//! Mounts are always returned in a fixed order: the SSH public key, then the
//! detected shared filesystem (if accepted), then user mounts in the order
//! they were entered.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::{MountSpec, PUBLIC_KEY_TARGET};
use crate::detector::{detect_keybase, KEYBASE_ROOTS, KEYBASE_TARGET};
use kdk_core::error::Result;
use kdk_core::prompt::{confirm, dir_exists, Confirmation, Prompt, Prompter};
use kdk_core::user_paths::{ensure_dir, KdkPaths};
use kdk_core::kdk_println;
use kdk_messages::{msg, MESSAGES};

const PATH_ATTEMPTS: u32 = 3;

pub struct MountResolver<'a> {
    paths: &'a KdkPaths,
    prompter: &'a dyn Prompter,
    windows: bool,
    shared_fs_roots: Vec<PathBuf>,
}

impl<'a> MountResolver<'a> {
    pub fn new(paths: &'a KdkPaths, prompter: &'a dyn Prompter) -> Self {
        Self {
            paths,
            prompter,
            windows: cfg!(windows),
            shared_fs_roots: KEYBASE_ROOTS.iter().map(PathBuf::from).collect(),
        }
    }

    /// Replace the probed shared-filesystem roots.
    pub fn with_shared_fs_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.shared_fs_roots = roots;
        self
    }

    /// Use the Windows mirror layout for the shared filesystem.
    pub fn windows(mut self, windows: bool) -> Self {
        self.windows = windows;
        self
    }

    pub fn resolve(&self) -> Result<Vec<MountSpec>> {
        let mut mounts = vec![MountSpec::bind(
            self.paths.public_key().to_string_lossy(),
            PUBLIC_KEY_TARGET,
            true,
        )];

        match self.shared_fs_mount() {
            Ok(Some(mount)) => mounts.push(mount),
            Ok(None) => {}
            Err(e) => warn!("Failed to add keybase mount: {}", e),
        }

        mounts.extend(self.user_mounts()?);
        Ok(mounts)
    }

    fn shared_fs_mount(&self) -> Result<Option<MountSpec>> {
        let Some(detected) = detect_keybase(&self.shared_fs_roots) else {
            return Ok(None);
        };

        let question = msg!(
            MESSAGES.config.mount_shared_fs,
            source = detected.display(),
            target = KEYBASE_TARGET
        );
        if confirm(self.prompter, &question)? == Confirmation::Declined {
            return Ok(None);
        }

        let source = if self.windows {
            // The mirror bridge populates this directory once started.
            let mirror_dir = self.paths.keybase_dir();
            ensure_dir(&mirror_dir, Some(0o700))?;
            mirror_dir
        } else {
            detected
        };

        info!("Adding {} mount from {}", KEYBASE_TARGET, source.display());
        Ok(Some(MountSpec::bind(
            source.to_string_lossy(),
            KEYBASE_TARGET,
            false,
        )))
    }

    fn user_mounts(&self) -> Result<Vec<MountSpec>> {
        let mut mounts = Vec::new();

        while confirm(self.prompter, MESSAGES.config.mount_more)? == Confirmation::Confirmed {
            let host = Prompt::new(MESSAGES.config.mount_host_path)
                .attempts(PATH_ATTEMPTS)
                .validator(dir_exists)
                .run(self.prompter)?;
            let Some(host) = host else {
                kdk_println!("{}", MESSAGES.config.mount_skipped);
                continue;
            };

            let target = Prompt::new(MESSAGES.config.mount_container_path)
                .attempts(PATH_ATTEMPTS)
                .validator(|answer| !answer.is_empty())
                .run(self.prompter)?;
            let Some(target) = target else {
                kdk_println!("{}", MESSAGES.config.mount_skipped);
                continue;
            };

            let source = absolute(Path::new(&host));
            kdk_println!(
                "{}",
                msg!(
                    MESSAGES.config.mount_added,
                    source = source.display(),
                    target = &target
                )
            );
            mounts.push(MountSpec::bind(source.to_string_lossy(), target, false));
        }

        Ok(mounts)
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
