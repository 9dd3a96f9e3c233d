//! Loading and saving environment configuration files.

// Standard library
use std::fs;
use std::path::{Path, PathBuf};

// External crates
use tracing::{debug, info, warn};

// Internal imports
use crate::config::EnvironmentConfig;
use kdk_core::error::{KdkError, Result};
use kdk_core::prompt::{confirm, Confirmation, Prompter};
use kdk_core::user_paths::{ensure_dir, restrict_file, KdkPaths};
use kdk_messages::{msg, MESSAGES};

/// What `save` does when the file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwritePolicy {
    Always,
    Prompt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Written,
    NotOverwritten,
}

/// Reads and writes `<root>/<name>/config.yaml`, or a single overriding file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    paths: KdkPaths,
    config_override: Option<PathBuf>,
}

impl ConfigStore {
    pub fn new(paths: KdkPaths, config_override: Option<PathBuf>) -> Self {
        Self {
            paths,
            config_override,
        }
    }

    pub fn paths(&self) -> &KdkPaths {
        &self.paths
    }

    pub fn config_path(&self, name: &str) -> PathBuf {
        match &self.config_override {
            Some(path) => path.clone(),
            None => self.paths.config_file(name),
        }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.config_path(name).is_file()
    }

    /// Load the named environment. `Ok(None)` means it was never initialized.
    pub fn load(&self, name: &str) -> Result<Option<EnvironmentConfig>> {
        let path = self.config_path(name);
        if !path.exists() {
            debug!("No configuration at {}", path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            KdkError::Filesystem(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let cfg: EnvironmentConfig = serde_yaml_ng::from_str(&content)
            .map_err(|e| KdkError::corrupt_config(&path, e))?;
        validate(&cfg).map_err(|cause| KdkError::corrupt_config(&path, cause))?;

        debug!("Loaded configuration for '{}' from {}", cfg.name(), path.display());
        Ok(Some(cfg))
    }

    /// Persist `cfg`. Existing files are only replaced per `policy`.
    pub fn save(
        &self,
        cfg: &EnvironmentConfig,
        policy: OverwritePolicy,
        prompter: &dyn Prompter,
    ) -> Result<SaveOutcome> {
        let path = self.config_path(cfg.name());

        if path.exists() && policy == OverwritePolicy::Prompt {
            warn!("Configuration already exists at {}", path.display());
            let question = msg!(
                MESSAGES.config.init_overwrite_prompt,
                path = path.display()
            );
            if confirm(prompter, &question)? == Confirmation::Declined {
                info!("Existing configuration not overwritten");
                return Ok(SaveOutcome::NotOverwritten);
            }
        }

        self.prepare_dirs(&path)?;
        let yaml = serde_yaml_ng::to_string(cfg)?;
        write_private(&path, &yaml)?;
        info!("Wrote configuration for '{}' to {}", cfg.name(), path.display());
        Ok(SaveOutcome::Written)
    }

    /// Only the default layout is tool-owned; an override's parent is
    /// created if missing but otherwise left untouched.
    fn prepare_dirs(&self, path: &Path) -> Result<()> {
        if self.config_override.is_none() {
            ensure_dir(self.paths.root(), Some(0o700))?;
        }
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                let mode = self.config_override.is_none().then_some(0o700);
                ensure_dir(parent, mode)
            }
            _ => Ok(()),
        }
    }
}

fn validate(cfg: &EnvironmentConfig) -> std::result::Result<(), String> {
    if cfg.app_config.name.trim().is_empty() {
        return Err("AppConfig.Name is empty".to_string());
    }
    match cfg.app_config.port.parse::<u16>() {
        Ok(p) if p > 0 => {}
        _ => {
            return Err(format!(
                "AppConfig.Port '{}' is not a valid TCP port",
                cfg.app_config.port
            ))
        }
    }
    if cfg.app_config.image_repository.is_empty() || cfg.app_config.image_tag.is_empty() {
        return Err("AppConfig image repository and tag must be set".to_string());
    }
    Ok(())
}

fn write_private(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| {
        KdkError::Filesystem(format!("Failed to write {}: {}", path.display(), e))
    })?;
    restrict_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, EnvironmentConfig};
    use kdk_core::prompt::ScriptedPrompter;
    use tempfile::TempDir;

    fn sample(name: &str) -> EnvironmentConfig {
        EnvironmentConfig::build(
            AppConfig {
                name: name.into(),
                port: "2022".into(),
                image_repository: "ciscosso/kdk".into(),
                image_tag: "debian-latest".into(),
                dotfiles_repo: "https://example.org/dotfiles.git".into(),
                shell: "/bin/zsh".into(),
                socks_port: Some("8000".into()),
            },
            "dev",
            Vec::new(),
        )
    }

    #[test]
    fn test_validate_rejects_bad_port() {
        let mut cfg = sample("kdk");
        cfg.app_config.port = "99999".into();
        assert!(validate(&cfg).is_err());
        cfg.app_config.port = "0".into();
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn test_override_path_wins() {
        let temp = TempDir::new().unwrap();
        let custom = temp.path().join("elsewhere.yaml");
        let store = ConfigStore::new(KdkPaths::at(temp.path()), Some(custom.clone()));
        assert_eq!(store.config_path("kdk"), custom);

        let prompter = ScriptedPrompter::default();
        store
            .save(&sample("kdk"), OverwritePolicy::Always, &prompter)
            .unwrap();
        assert!(custom.is_file());
    }
}
