//! Bringing configuration, image and binary up to the latest release.

use anyhow::anyhow;
use tracing::{info, warn};

use kdk_config::{ConfigStore, EnvironmentConfig, OverwritePolicy};
use kdk_core::prompt::{confirm, Confirmation, Prompter};
use kdk_core::kdk_println;
use kdk_messages::{msg, MESSAGES};
use kdk_provider::{ContainerRuntime, ImageInfo};

/// `None` (latest unknown) never asks for an update.
pub fn needs_binary_update(installed: &str, latest: Option<&str>) -> bool {
    latest.is_some_and(|latest| latest != installed)
}

/// True unless a KDK image already carries the `latest` tag.
pub fn needs_image_update(images: &[ImageInfo], latest: Option<&str>) -> bool {
    let Some(latest) = latest else {
        return false;
    };
    !images
        .iter()
        .filter(|i| i.is_kdk_owned())
        .any(|i| i.tags().any(|t| t == latest))
}

pub fn needs_config_update(cfg: &EnvironmentConfig, latest: Option<&str>) -> bool {
    let Some(latest) = latest else {
        return false;
    };
    cfg.app_config.image_tag != latest
        || cfg.container_config.image != cfg.image_coordinates()
        || cfg.version_label() != Some(latest)
}

/// Installs a released `kdk` build over the running executable.
pub trait BinaryInstaller {
    fn install(&self, version: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Config,
    Image,
    Binary,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Config => "configuration",
            Stage::Image => "image",
            Stage::Binary => "binary",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    UpToDate,
    Applied,
    Declined,
    Failed,
}

/// What happened to each stage, in the order they ran.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    pub stages: Vec<(Stage, StageOutcome)>,
}

impl UpdateReport {
    pub fn failed(&self) -> usize {
        self.stages
            .iter()
            .filter(|(_, o)| *o == StageOutcome::Failed)
            .count()
    }

    pub fn outcome(&self, stage: Stage) -> Option<StageOutcome> {
        self.stages
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, o)| *o)
    }

    fn is_up_to_date(&self) -> bool {
        self.stages.iter().all(|(_, o)| *o == StageOutcome::UpToDate)
    }
}

/// Runs the update stages. The runtime is optional: without Docker only the
/// image stage fails.
pub struct UpdateReconciler<'a> {
    runtime: Option<&'a dyn ContainerRuntime>,
    prompter: &'a dyn Prompter,
    store: &'a ConfigStore,
    installer: &'a dyn BinaryInstaller,
    installed: String,
}

impl<'a> UpdateReconciler<'a> {
    pub fn new(
        runtime: Option<&'a dyn ContainerRuntime>,
        prompter: &'a dyn Prompter,
        store: &'a ConfigStore,
        installer: &'a dyn BinaryInstaller,
        installed: impl Into<String>,
    ) -> Self {
        Self {
            runtime,
            prompter,
            store,
            installer,
            installed: installed.into(),
        }
    }

    /// Run the config, image and binary stages against `latest`.
    ///
    /// Each stage is confirmed on its own. A failed stage is reported and the
    /// remaining stages still run. Without a configuration the config and
    /// image stages fail; the binary stage needs neither.
    pub fn apply(&self, mut cfg: Option<&mut EnvironmentConfig>, latest: &str) -> UpdateReport {
        kdk_println!(
            "{}",
            msg!(MESSAGES.update.header, installed = &self.installed, latest = latest)
        );

        let mut report = UpdateReport::default();
        let config = self.run_stage(Stage::Config, || match cfg.as_deref_mut() {
            Some(cfg) => self.update_config(cfg, latest),
            None => Err(no_config()),
        });
        report.stages.push((Stage::Config, config));
        let image = self.run_stage(Stage::Image, || match cfg.as_deref() {
            Some(cfg) => self.update_image(cfg, latest),
            None => Err(no_config()),
        });
        report.stages.push((Stage::Image, image));
        let binary = self.run_stage(Stage::Binary, || self.update_binary(latest));
        report.stages.push((Stage::Binary, binary));

        if report.is_up_to_date() {
            kdk_println!("{}", msg!(MESSAGES.update.up_to_date, latest = latest));
        }
        report
    }

    fn run_stage<F>(&self, stage: Stage, run: F) -> StageOutcome
    where
        F: FnOnce() -> anyhow::Result<StageOutcome>,
    {
        match run() {
            Ok(StageOutcome::Declined) => {
                kdk_println!("{}", msg!(MESSAGES.update.stage_declined, stage = stage.label()));
                StageOutcome::Declined
            }
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("{} update failed: {:#}", stage.label(), e);
                kdk_println!(
                    "{}",
                    msg!(
                        MESSAGES.update.stage_failed,
                        stage = stage.label(),
                        error = format!("{:#}", e)
                    )
                );
                StageOutcome::Failed
            }
        }
    }

    fn update_config(&self, cfg: &mut EnvironmentConfig, latest: &str) -> anyhow::Result<StageOutcome> {
        if !needs_config_update(cfg, Some(latest)) {
            return Ok(StageOutcome::UpToDate);
        }
        let question = msg!(
            MESSAGES.update.config_prompt,
            name = cfg.name(),
            current = &cfg.app_config.image_tag,
            latest = latest
        );
        if confirm(self.prompter, &question)? == Confirmation::Declined {
            return Ok(StageOutcome::Declined);
        }

        let mut updated = cfg.clone();
        updated.retag(latest);
        updated.set_version_label(latest);
        // Already confirmed above; asking again to overwrite would be noise.
        self.store.save(&updated, OverwritePolicy::Always, self.prompter)?;
        *cfg = updated;

        info!("Configuration for '{}' now targets {}", cfg.name(), latest);
        kdk_println!(
            "{}",
            msg!(MESSAGES.update.config_success, image = cfg.image_coordinates())
        );
        Ok(StageOutcome::Applied)
    }

    fn update_image(&self, cfg: &EnvironmentConfig, latest: &str) -> anyhow::Result<StageOutcome> {
        let runtime = self
            .runtime
            .ok_or_else(|| anyhow!("Docker is not available; start it and run `kdk update` again"))?;
        let images = runtime.list_images()?;
        if !needs_image_update(&images, Some(latest)) {
            return Ok(StageOutcome::UpToDate);
        }
        let reference = format!("{}:{}", cfg.app_config.image_repository, latest);
        let question = msg!(MESSAGES.update.image_prompt, image = &reference);
        if confirm(self.prompter, &question)? == Confirmation::Declined {
            return Ok(StageOutcome::Declined);
        }

        kdk_println!("{}", msg!(MESSAGES.env.pull_progress, image = &reference));
        runtime.pull_image(&reference)?;
        kdk_println!("{}", msg!(MESSAGES.env.pull_success, image = &reference));
        Ok(StageOutcome::Applied)
    }

    fn update_binary(&self, latest: &str) -> anyhow::Result<StageOutcome> {
        if !needs_binary_update(&self.installed, Some(latest)) {
            return Ok(StageOutcome::UpToDate);
        }
        let question = msg!(
            MESSAGES.update.binary_prompt,
            installed = &self.installed,
            latest = latest
        );
        if confirm(self.prompter, &question)? == Confirmation::Declined {
            return Ok(StageOutcome::Declined);
        }

        self.installer.install(latest)?;
        kdk_println!("{}", msg!(MESSAGES.update.binary_success, latest = latest));
        Ok(StageOutcome::Applied)
    }
}

fn no_config() -> anyhow::Error {
    anyhow!("no usable configuration; run `kdk init` first")
}
