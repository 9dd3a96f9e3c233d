//! Keybase mirror bridge for Windows hosts.
//!
//! Docker on Windows cannot bind-mount the Keybase drive directly, so a
//! Dokan mirror copies `K:\` into `<configRoot>/keybase`, which is what the
//! container actually mounts.

use std::fs;
use std::path::PathBuf;

use duct::cmd;
use tracing::{debug, info};

use kdk_core::error::{KdkError, Result};
use kdk_core::kdk_println;
use kdk_core::user_paths::KdkPaths;
use kdk_messages::MESSAGES;

const MIRROR_SCRIPT: &str = r#"
@echo off

if "%1"=="" (
  echo "You must pass either start or stop"
  break
)

if "%1"=="start" (
  echo "Starting"
  start "KDK Keybase Mirror" /B "C:\Program Files\Dokan\Dokan Library-1.1.0\sample\mirror\mirror.exe" /r K:\ /l C:\Users\%USERNAME%\.kdk\keybase
  break
)

if "%1"=="stop" (
  echo "stopping"
  tskill.exe mirror
  break
) else (
  echo "Unrecognized parameter %1.  You must pass either start or stop"
)
"#;

/// A host-side process that must be running before the container starts.
pub trait MirrorBridge {
    fn ensure_started(&self) -> Result<()>;
}

pub struct KeybaseMirror {
    paths: KdkPaths,
}

impl KeybaseMirror {
    pub fn new(paths: KdkPaths) -> Self {
        Self { paths }
    }

    pub fn is_running(&self) -> bool {
        self.paths.keybase_sentinel().exists()
    }

    /// Write the launcher script unless it already exists.
    pub fn write_script(&self) -> Result<PathBuf> {
        let script = self.paths.mirror_script();
        if !script.exists() {
            debug!("Writing keybase mirror script to {}", script.display());
            fs::write(&script, MIRROR_SCRIPT).map_err(|e| {
                KdkError::Filesystem(format!("Failed to write {}: {}", script.display(), e))
            })?;
        }
        Ok(script)
    }

    /// Stopping is left to the user (`keybase-mirror.cmd stop`).
    fn launch(&self) -> Result<()> {
        let script = self.write_script()?;
        info!("Running keybase mirror: powershell {} start", script.display());
        cmd!("powershell", &script, "start")
            .run()
            .map_err(|e| KdkError::Command(format!("keybase mirror start failed: {}", e)))?;
        Ok(())
    }
}

impl MirrorBridge for KeybaseMirror {
    fn ensure_started(&self) -> Result<()> {
        if self.is_running() {
            info!("Keybase mirror already started");
            kdk_println!("{}", MESSAGES.env.mirror_running);
            return Ok(());
        }
        kdk_println!("{}", MESSAGES.env.mirror_starting);
        self.launch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_running_when_sentinel_exists() {
        let temp = TempDir::new().unwrap();
        let paths = KdkPaths::at(temp.path());
        fs::create_dir_all(paths.keybase_sentinel()).unwrap();

        let mirror = KeybaseMirror::new(paths.clone());
        assert!(mirror.is_running());
        // Nothing is launched, so no script is needed.
        mirror.ensure_started().unwrap();
        assert!(!paths.mirror_script().exists());
    }

    #[test]
    fn test_script_written_once() {
        let temp = TempDir::new().unwrap();
        let paths = KdkPaths::at(temp.path());
        let mirror = KeybaseMirror::new(paths.clone());

        let script = mirror.write_script().unwrap();
        fs::write(&script, "custom").unwrap();
        mirror.write_script().unwrap();
        assert_eq!(fs::read_to_string(&script).unwrap(), "custom");
    }

    #[test]
    fn test_script_keeps_manual_stop() {
        let temp = TempDir::new().unwrap();
        let mirror = KeybaseMirror::new(KdkPaths::at(temp.path()));

        let script = fs::read_to_string(mirror.write_script().unwrap()).unwrap();
        assert!(script.contains(r#"if "%1"=="start""#));
        assert!(script.contains(r#"if "%1"=="stop""#));
    }
}
