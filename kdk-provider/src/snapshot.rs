//! Snapshot image naming.

use chrono::{DateTime, Utc};
use std::fmt;

use kdk_core::platform::strip_domain;

/// Reference a container is committed to:
/// `<repository>:<user>-<environment>-<YYYYMMDDHHMMSS><nanoseconds>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotName {
    pub repository: String,
    pub tag: String,
}

impl SnapshotName {
    pub fn new(repository: &str, username: &str, environment: &str, at: DateTime<Utc>) -> Self {
        let tag = format!(
            "{}-{}-{}",
            strip_domain(username),
            environment,
            at.format("%Y%m%d%H%M%S%9f")
        );
        Self {
            repository: repository.to_string(),
            tag,
        }
    }

    pub fn now(repository: &str, username: &str, environment: &str) -> Self {
        Self::new(repository, username, environment, Utc::now())
    }

    pub fn reference(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SnapshotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}
