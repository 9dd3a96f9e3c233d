// External crate imports
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// Internal imports
use kdk_core::{KDK_LABEL, KDK_VERSION};

/// Port sshd listens on inside the container.
pub const SSH_CONTAINER_PORT: &str = "2022/tcp";
/// Where the public key is mounted for the provisioning script to pick up.
pub const PUBLIC_KEY_TARGET: &str = "/tmp/id_rsa.pub";

pub const DEFAULT_NAME: &str = "kdk";
pub const DEFAULT_IMAGE_REPOSITORY: &str = "ciscosso/kdk";
pub const DEFAULT_DOTFILES_REPO: &str = "https://github.com/cisco-sso/yadm-dotfiles.git";
pub const DEFAULT_SHELL: &str = "/bin/bash";
pub const DEFAULT_SOCKS_PORT: &str = "8000";

/// Placeholder value for set-like maps (`ExposedPorts`, `Volumes`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

/// User-facing settings chosen at `init`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AppConfig {
    pub name: String,
    pub port: String,
    pub image_repository: String,
    pub image_tag: String,
    pub dotfiles_repo: String,
    pub shell: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socks_port: Option<String>,
}

impl AppConfig {
    /// SOCKS port, ignoring the empty string older files may carry.
    pub fn socks_port(&self) -> Option<&str> {
        self.socks_port.as_deref().filter(|p| !p.is_empty())
    }
}

/// Container creation parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerSpec {
    pub hostname: String,
    pub image: String,
    #[serde(default)]
    pub tty: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub exposed_ports: IndexMap<String, Empty>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub volumes: IndexMap<String, Empty>,
    #[serde(default)]
    pub labels: IndexMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PortBinding {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub host_ip: String,
    pub host_port: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MountType {
    #[default]
    Bind,
    Volume,
}

impl MountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MountType::Bind => "bind",
            MountType::Volume => "volume",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MountSpec {
    #[serde(rename = "Type", default)]
    pub kind: MountType,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub read_only: bool,
}

impl MountSpec {
    pub fn bind(source: impl Into<String>, target: impl Into<String>, read_only: bool) -> Self {
        Self {
            kind: MountType::Bind,
            source: source.into(),
            target: target.into(),
            read_only,
        }
    }
}

/// Host-side creation parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostSpec {
    #[serde(default)]
    pub privileged: bool,
    #[serde(default)]
    pub port_bindings: IndexMap<String, Vec<PortBinding>>,
    #[serde(default)]
    pub mounts: Vec<MountSpec>,
}

/// Everything persisted for one named environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EnvironmentConfig {
    pub app_config: AppConfig,
    pub container_config: ContainerSpec,
    pub host_config: HostSpec,
}

impl EnvironmentConfig {
    /// Build the full container definition from the user's answers.
    ///
    /// `mounts` must already be in their final order (public key first).
    pub fn build(app: AppConfig, username: &str, mounts: Vec<MountSpec>) -> Self {
        let mut volumes = IndexMap::new();
        for mount in &mounts {
            volumes.insert(mount.target.clone(), Empty {});
        }

        let mut exposed_ports = IndexMap::new();
        exposed_ports.insert(SSH_CONTAINER_PORT.to_string(), Empty {});

        let mut labels = IndexMap::new();
        labels.insert(KDK_LABEL.to_string(), KDK_VERSION.to_string());

        let mut port_bindings = IndexMap::new();
        port_bindings.insert(
            SSH_CONTAINER_PORT.to_string(),
            vec![PortBinding {
                host_ip: String::new(),
                host_port: app.port.clone(),
            }],
        );

        let container_config = ContainerSpec {
            hostname: app.name.clone(),
            image: format!("{}:{}", app.image_repository, app.image_tag),
            tty: true,
            env: vec![
                format!("KDK_USERNAME={}", username),
                format!("KDK_SHELL={}", app.shell),
                format!("KDK_DOTFILES_REPO={}", app.dotfiles_repo),
            ],
            exposed_ports,
            volumes,
            labels,
        };

        let host_config = HostSpec {
            privileged: true,
            port_bindings,
            mounts,
        };

        Self {
            app_config: app,
            container_config,
            host_config,
        }
    }

    pub fn name(&self) -> &str {
        &self.app_config.name
    }

    pub fn port(&self) -> &str {
        &self.app_config.port
    }

    /// `imageRepository:imageTag`, e.g. `ciscosso/kdk:debian-latest`.
    pub fn image_coordinates(&self) -> String {
        format!(
            "{}:{}",
            self.app_config.image_repository, self.app_config.image_tag
        )
    }

    /// Point the environment at a new tag of its image repository.
    pub fn retag(&mut self, tag: &str) {
        self.app_config.image_tag = tag.to_string();
        self.container_config.image = self.image_coordinates();
    }

    pub fn version_label(&self) -> Option<&str> {
        self.container_config
            .labels
            .get(KDK_LABEL)
            .map(String::as_str)
    }

    pub fn set_version_label(&mut self, version: &str) {
        self.container_config
            .labels
            .insert(KDK_LABEL.to_string(), version.to_string());
    }

    /// Host side of the SSH port binding.
    pub fn host_port(&self) -> Option<&str> {
        self.host_config
            .port_bindings
            .get(SSH_CONTAINER_PORT)
            .and_then(|b| b.first())
            .map(|b| b.host_port.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> AppConfig {
        AppConfig {
            name: "kdk".into(),
            port: "2022".into(),
            image_repository: "ciscosso/kdk".into(),
            image_tag: "debian-latest".into(),
            dotfiles_repo: DEFAULT_DOTFILES_REPO.into(),
            shell: DEFAULT_SHELL.into(),
            socks_port: None,
        }
    }

    #[test]
    fn test_build_fills_container_definition() {
        let mounts = vec![MountSpec::bind("/home/dev/.kdk/ssh/id_rsa.pub", PUBLIC_KEY_TARGET, true)];
        let cfg = EnvironmentConfig::build(app(), "dev", mounts);

        assert_eq!(cfg.container_config.image, "ciscosso/kdk:debian-latest");
        assert_eq!(cfg.container_config.hostname, "kdk");
        assert!(cfg.container_config.tty);
        assert!(cfg.host_config.privileged);
        assert_eq!(cfg.container_config.env[0], "KDK_USERNAME=dev");
        assert_eq!(cfg.version_label(), Some(KDK_VERSION));
        assert_eq!(cfg.host_port(), Some("2022"));
        assert!(cfg.container_config.volumes.contains_key(PUBLIC_KEY_TARGET));
        assert!(cfg.container_config.exposed_ports.contains_key(SSH_CONTAINER_PORT));
    }

    #[test]
    fn test_retag_keeps_image_in_sync() {
        let mut cfg = EnvironmentConfig::build(app(), "dev", Vec::new());
        cfg.retag("dev-kdk-20240101000000000000000");
        assert_eq!(
            cfg.container_config.image,
            "ciscosso/kdk:dev-kdk-20240101000000000000000"
        );
        assert_eq!(cfg.image_coordinates(), cfg.container_config.image);
    }

    #[test]
    fn test_empty_socks_port_is_none() {
        let mut a = app();
        a.socks_port = Some(String::new());
        assert_eq!(a.socks_port(), None);
        a.socks_port = Some("8000".into());
        assert_eq!(a.socks_port(), Some("8000"));
    }

    #[test]
    fn test_yaml_keys_are_pascal_case() {
        let cfg = EnvironmentConfig::build(app(), "dev", Vec::new());
        let yaml = serde_yaml_ng::to_string(&cfg).unwrap();
        assert!(yaml.contains("AppConfig:"));
        assert!(yaml.contains("ImageRepository: ciscosso/kdk"));
        assert!(yaml.contains("PortBindings:"));
        assert!(yaml.contains("HostPort:"));
    }
}
