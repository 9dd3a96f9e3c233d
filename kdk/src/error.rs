//! Error types for the KDK CLI application.
//!
//! Library crates report [`kdk_core::error::KdkError`]; the binary folds those
//! into [`CliError`] so the top level can print one categorized message.

use std::error::Error;
use std::fmt;

use kdk_core::error::KdkError;

type BoxedSource = Box<dyn Error + Send + Sync>;

/// Primary error type for the KDK CLI application.
#[derive(Debug)]
pub enum CliError {
    /// Missing, unreadable or invalid configuration
    Config { source: BoxedSource, context: String },

    /// A lifecycle operation against the container runtime failed
    Operation {
        source: BoxedSource,
        env_name: Option<String>,
        operation: String,
    },

    FileSystem {
        source: BoxedSource,
        path: String,
        operation: String,
    },

    /// One or more `update` stages failed
    Update { failed: usize },

    General { source: BoxedSource, context: String },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config { context, .. } => write!(f, "Configuration error: {context}"),
            CliError::Operation {
                env_name,
                operation,
                source,
            } => match env_name {
                Some(name) => write!(f, "KDK operation '{operation}' failed for '{name}': {source}"),
                None => write!(f, "KDK operation '{operation}' failed: {source}"),
            },
            CliError::FileSystem {
                path,
                operation,
                source,
            } => write!(f, "Filesystem error during '{operation}' on '{path}': {source}"),
            CliError::Update { failed } => {
                write!(f, "{}", kdk_messages::msg!(kdk_messages::MESSAGES.update.stages_failed, count = failed))
            }
            CliError::General { context, .. } => write!(f, "{context}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CliError::Config { source, .. }
            | CliError::Operation { source, .. }
            | CliError::FileSystem { source, .. }
            | CliError::General { source, .. } => Some(source.as_ref()),
            CliError::Update { .. } => None,
        }
    }
}

impl CliError {
    pub fn operation<E: Error + Send + Sync + 'static>(
        source: E,
        env_name: Option<impl Into<String>>,
        operation: impl Into<String>,
    ) -> Self {
        Self::Operation {
            source: Box::new(source),
            env_name: env_name.map(Into::into),
            operation: operation.into(),
        }
    }

    pub fn filesystem<E: Error + Send + Sync + 'static>(
        source: E,
        path: impl Into<String>,
        operation: impl Into<String>,
    ) -> Self {
        Self::FileSystem {
            source: Box::new(source),
            path: path.into(),
            operation: operation.into(),
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;

/// Scope a library error to the environment and operation it came from.
pub trait OperationContext<T> {
    fn for_env(self, env_name: &str, operation: &str) -> CliResult<T>;
}

impl<T> OperationContext<T> for kdk_core::error::Result<T> {
    fn for_env(self, env_name: &str, operation: &str) -> CliResult<T> {
        self.map_err(|e| match e {
            KdkError::Provider(_) | KdkError::Command(_) => {
                CliError::operation(e, Some(env_name), operation)
            }
            other => CliError::from(other),
        })
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        let context = format!("{:#}", err);
        CliError::General {
            source: err.into(),
            context,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::General {
            context: format!("I/O error: {err}"),
            source: Box::new(err),
        }
    }
}

impl From<KdkError> for CliError {
    fn from(err: KdkError) -> Self {
        let context = err.to_string();
        match err {
            KdkError::Config(msg) => CliError::Config {
                source: Box::new(KdkError::Config(msg.clone())),
                context: msg,
            },
            KdkError::Provider(_) | KdkError::Command(_) => CliError::Operation {
                source: Box::new(err),
                env_name: None,
                operation: "runtime".to_string(),
            },
            KdkError::Filesystem(_) => CliError::FileSystem {
                source: Box::new(err),
                path: "unknown".to_string(),
                operation: "filesystem operation".to_string(),
            },
            other => CliError::General {
                source: Box::new(other),
                context,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_config_error_keeps_init_hint() {
        let err: CliError =
            KdkError::corrupt_config(std::path::Path::new("/tmp/kdk/config.yaml"), "bad").into();
        assert!(matches!(err, CliError::Config { .. }));
        assert!(err.to_string().contains("kdk init"));
    }

    #[test]
    fn test_operation_error_names_environment() {
        let result: kdk_core::error::Result<()> =
            Err(KdkError::Provider("No such container: kdk".into()));
        let err = result.for_env("kdk", "destroy").unwrap_err();
        assert_eq!(
            err.to_string(),
            "KDK operation 'destroy' failed for 'kdk': Container runtime error: No such container: kdk"
        );
    }

    #[test]
    fn test_docker_not_running_passes_through() {
        let err = CliError::from(KdkError::DockerNotRunning);
        assert!(err.to_string().contains("Docker daemon is not running"));
    }

    #[test]
    fn test_error_source_chain() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = CliError::filesystem(io_err, "/usr/local/bin/kdk", "install");
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("file not found"));
    }

    #[test]
    fn test_release_download_failure_keeps_context() {
        let err = CliError::from(
            anyhow::anyhow!("connection refused").context("Failed to download kdk v1.3.0"),
        );
        assert!(matches!(err, CliError::General { .. }));
        assert_eq!(
            err.to_string(),
            "Failed to download kdk v1.3.0: connection refused"
        );
    }

    #[test]
    fn test_update_failures_count() {
        assert_eq!(
            CliError::Update { failed: 2 }.to_string(),
            "2 update stage(s) failed"
        );
    }
}
