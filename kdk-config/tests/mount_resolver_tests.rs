use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use kdk_config::config::PUBLIC_KEY_TARGET;
use kdk_config::detector::KEYBASE_TARGET;
use kdk_config::MountResolver;
use kdk_core::prompt::ScriptedPrompter;
use kdk_core::user_paths::KdkPaths;

struct MountFixture {
    _temp_dir: TempDir,
    paths: KdkPaths,
    keybase_root: PathBuf,
    projects: PathBuf,
}

impl MountFixture {
    fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let paths = KdkPaths::at(temp_dir.path().join(".kdk"));
        let keybase_root = temp_dir.path().join("keybase");
        let projects = temp_dir.path().join("Projects");
        fs::create_dir_all(&projects)?;
        Ok(Self {
            _temp_dir: temp_dir,
            paths,
            keybase_root,
            projects,
        })
    }

    fn with_keybase(self) -> Result<Self> {
        fs::create_dir_all(self.keybase_root.join("private"))?;
        Ok(self)
    }
}

#[test]
fn test_public_key_mount_always_first() -> Result<()> {
    let fixture = MountFixture::new()?;
    let prompter = ScriptedPrompter::new(["n"]);

    let mounts = MountResolver::new(&fixture.paths, &prompter)
        .with_shared_fs_roots(vec![fixture.keybase_root.clone()])
        .resolve()?;

    assert_eq!(mounts.len(), 1);
    assert_eq!(mounts[0].target, PUBLIC_KEY_TARGET);
    assert!(mounts[0].read_only);
    assert_eq!(
        PathBuf::from(&mounts[0].source),
        fixture.paths.public_key()
    );
    Ok(())
}

#[test]
fn test_accepted_keybase_then_user_mounts_in_order() -> Result<()> {
    let fixture = MountFixture::new()?.with_keybase()?;
    let projects = fixture.projects.to_string_lossy().to_string();
    let prompter = ScriptedPrompter::new([
        "y",                      // mount keybase
        "y",                      // more mounts?
        projects.as_str(),        // host path
        "/home/dev/Projects",     // container path
        "n",                      // more mounts?
    ]);

    let mounts = MountResolver::new(&fixture.paths, &prompter)
        .with_shared_fs_roots(vec![fixture.keybase_root.clone()])
        .windows(false)
        .resolve()?;

    let targets: Vec<&str> = mounts.iter().map(|m| m.target.as_str()).collect();
    assert_eq!(
        targets,
        vec![PUBLIC_KEY_TARGET, KEYBASE_TARGET, "/home/dev/Projects"]
    );
    assert_eq!(
        PathBuf::from(&mounts[1].source),
        fixture.keybase_root.canonicalize()?
    );
    assert!(!mounts[2].read_only);
    assert_eq!(prompter.remaining(), 0);
    Ok(())
}

#[test]
fn test_windows_keybase_uses_mirror_dir() -> Result<()> {
    let fixture = MountFixture::new()?.with_keybase()?;
    let prompter = ScriptedPrompter::new(["yes", "no"]);

    let mounts = MountResolver::new(&fixture.paths, &prompter)
        .with_shared_fs_roots(vec![fixture.keybase_root.clone()])
        .windows(true)
        .resolve()?;

    assert_eq!(mounts.len(), 2);
    assert_eq!(PathBuf::from(&mounts[1].source), fixture.paths.keybase_dir());
    assert!(fixture.paths.keybase_dir().is_dir());
    Ok(())
}

#[test]
fn test_invalid_host_path_is_reasked_then_skipped() -> Result<()> {
    let fixture = MountFixture::new()?;
    let missing = fixture.projects.join("missing");
    let missing = missing.to_string_lossy().to_string();
    let prompter = ScriptedPrompter::new([
        "y",
        missing.as_str(),
        missing.as_str(),
        missing.as_str(),
        "n",
    ]);

    let mounts = MountResolver::new(&fixture.paths, &prompter)
        .with_shared_fs_roots(Vec::new())
        .resolve()?;

    assert_eq!(mounts.len(), 1);
    assert_eq!(prompter.remaining(), 0);
    Ok(())
}
