// CLI integration tests against the built `kdk` binary.

mod common;

use std::fs;

use predicates::prelude::*;
use serial_test::serial;

use common::KdkFixture;

#[test]
fn test_help_lists_commands() {
    let fixture = KdkFixture::new();
    fixture
        .kdk()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("init")
                .and(predicate::str::contains("destroy"))
                .and(predicate::str::contains("snapshot"))
                .and(predicate::str::contains("kubesync")),
        );
}

#[test]
#[serial]
fn test_init_writes_config() {
    let fixture = KdkFixture::new();
    fixture
        .init("work")
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration written to"));

    let yaml = fs::read_to_string(fixture.config_path("work")).unwrap();
    assert!(yaml.contains("Name: work"));
    assert!(yaml.contains("ImageTag: debian-latest"));
    assert!(yaml.contains("ciscosso/kdk:debian-latest"));
    assert!(yaml.contains("SocksPort:"));
    assert!(yaml.contains("/tmp/id_rsa.pub"));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(fixture.config_path("work"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

#[test]
#[serial]
fn test_init_declined_overwrite_keeps_file() {
    let fixture = KdkFixture::new();
    fixture.init("kdk").write_stdin("n\n").assert().success();
    let before = fs::read_to_string(fixture.config_path("kdk")).unwrap();

    let mut cmd = fixture.kdk();
    cmd.args(["init", "--port", "3333"])
        .args(["--image-repository", "other/kdk", "--image-tag", "v9.9.9"])
        .args(["--dotfiles-repo", "https://example.org/x.git", "--shell", "/bin/sh"])
        .args(["--socks-port", "9000"])
        // no additional mounts, then keep the existing file
        .write_stdin("n\nn\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Kept existing configuration"));

    assert_eq!(fs::read_to_string(fixture.config_path("kdk")).unwrap(), before);
}

#[test]
#[serial]
fn test_missing_config_suggests_init() {
    let fixture = KdkFixture::new();
    fixture
        .kdk()
        .args(["destroy", "--name", "nope"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("No configuration for KDK 'nope'")
                .and(predicate::str::contains("kdk init")),
        );
}

#[test]
#[serial]
fn test_corrupt_config_suggests_init() {
    let fixture = KdkFixture::new();
    let path = fixture.config_path("kdk");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "AppConfig: [this is not a config").unwrap();

    fixture
        .kdk()
        .arg("pull")
        .assert()
        .failure()
        .stderr(predicate::str::contains("kdk init"));
}

#[test]
#[serial]
fn test_config_flag_overrides_location() {
    let fixture = KdkFixture::new();
    let custom = fixture.root().join("elsewhere.yaml");

    fixture
        .init("kdk")
        .arg("--config")
        .arg(&custom)
        .write_stdin("n\n")
        .assert()
        .success();

    assert!(custom.is_file());
    assert!(!fixture.config_path("kdk").exists());
}
