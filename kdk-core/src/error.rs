use std::fmt::{self, Display, Formatter};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KdkError {
    Config(String),
    Provider(String),
    Io(#[from] std::io::Error),
    Command(String),
    Dependency(String),
    Internal(String),
    Filesystem(String),
    Serialization(String),
    DockerNotRunning,
    DockerPermission,
}

impl Display for KdkError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            KdkError::Config(s) => write!(f, "Configuration error: {}", s),
            KdkError::Provider(s) => write!(f, "Container runtime error: {}", s),
            KdkError::Io(e) => write!(f, "I/O error: {}", e),
            KdkError::Command(s) => write!(f, "Command failed: {}", s),
            KdkError::Dependency(s) => write!(f, "Dependency not found: {}", s),
            KdkError::Internal(s) => write!(f, "Internal error: {}", s),
            KdkError::Filesystem(s) => write!(f, "Filesystem error: {}", s),
            KdkError::Serialization(s) => write!(f, "Serialization error: {}", s),
            KdkError::DockerNotRunning => {
                write!(f, "Docker daemon is not running\n\n")?;
                write!(f, "Fix:\n")?;
                write!(f, "  • Start Docker Desktop, or\n")?;
                write!(f, "  • Run: sudo systemctl start docker\n")?;
                write!(f, "  • Verify: docker ps")
            }
            KdkError::DockerPermission => {
                write!(f, "Permission denied accessing Docker\n\n")?;
                write!(f, "Fix:\n")?;
                write!(f, "  • Add user to docker group: sudo usermod -aG docker $USER\n")?;
                write!(f, "  • Log out and back in")
            }
        }
    }
}

impl KdkError {
    /// Configuration that exists but cannot be used as-is.
    pub fn corrupt_config(path: &std::path::Path, cause: impl Display) -> Self {
        KdkError::Config(format!(
            "Corrupted or deprecated config file {}: {}\nPlease rebuild the config file with `kdk init`",
            path.display(),
            cause
        ))
    }
}

impl From<serde_yaml_ng::Error> for KdkError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        KdkError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for KdkError {
    fn from(err: serde_json::Error) -> Self {
        KdkError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, KdkError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_corrupt_config_points_at_init() {
        let err = KdkError::corrupt_config(Path::new("/tmp/kdk/config.yaml"), "bad indent");
        let msg = err.to_string();
        assert!(msg.starts_with("Configuration error"));
        assert!(msg.contains("/tmp/kdk/config.yaml"));
        assert!(msg.contains("kdk init"));
    }

    #[test]
    fn test_io_error_converts() {
        let err: KdkError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, KdkError::Io(_)));
    }
}
