//! Published release lookup and artifact download.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use kdk_core::platform::Platform;

pub const LATEST_RELEASE_URL: &str = "https://api.github.com/repos/cisco-sso/kdk/releases/latest";
pub const DOWNLOAD_BASE_URL: &str = "https://github.com/cisco-sso/kdk/releases/download";

const CHECK_TIMEOUT: Duration = Duration::from_secs(2);
const USER_AGENT: &str = concat!("kdk/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct GitHubRelease {
    tag_name: String,
}

/// Tag of the latest published release, or `None` when it cannot be determined.
pub fn fetch_latest_version() -> Option<String> {
    match request_latest_version() {
        Ok(tag) => {
            debug!("Latest published release is {}", tag);
            Some(tag)
        }
        Err(e) => {
            debug!("Failed to check latest release version: {:#}", e);
            None
        }
    }
}

fn request_latest_version() -> Result<String> {
    let client = Client::builder()
        .timeout(CHECK_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")?;
    let response = client
        .get(LATEST_RELEASE_URL)
        .header("Accept", "application/vnd.github+json")
        .send()
        .context("Release check request failed")?;
    if !response.status().is_success() {
        anyhow::bail!("Release check returned HTTP {}", response.status());
    }
    let release: GitHubRelease = response.json().context("Unexpected release payload")?;
    parse_tag(&release.tag_name)
}

fn parse_tag(raw: &str) -> Result<String> {
    let tag = raw.trim().trim_matches('"');
    if tag.is_empty() {
        anyhow::bail!("Release has an empty tag name");
    }
    Ok(tag.to_string())
}

/// `kdk-<version>-<os>-<arch>.tar.gz`
pub fn archive_name(version: &str, platform: &Platform) -> String {
    format!("kdk-{}-{}.tar.gz", version, platform)
}

pub fn archive_url(version: &str, platform: &Platform) -> String {
    format!(
        "{}/{}/{}",
        DOWNLOAD_BASE_URL,
        version,
        archive_name(version, platform)
    )
}

/// Download `url` into `dest`. No timeout; archives can be large.
pub fn download(url: &str, dest: &Path) -> Result<()> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(None)
        .build()
        .context("Failed to build HTTP client")?;
    let response = client
        .get(url)
        .send()
        .with_context(|| format!("Failed to download {}", url))?;
    if !response.status().is_success() {
        anyhow::bail!("Download of {} failed: HTTP {}", url, response.status());
    }
    let bytes = response
        .bytes()
        .with_context(|| format!("Failed to read {}", url))?;
    fs::write(dest, &bytes).with_context(|| format!("Failed to write {}", dest.display()))?;
    debug!("Downloaded {} bytes to {}", bytes.len(), dest.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kdk_core::platform::{Arch, Os};

    #[test]
    fn test_archive_url_layout() {
        let platform = Platform {
            os: Os::MacOS,
            arch: Arch::Amd64,
        };
        assert_eq!(
            archive_url("v1.3.0", &platform),
            "https://github.com/cisco-sso/kdk/releases/download/v1.3.0/kdk-v1.3.0-darwin-amd64.tar.gz"
        );
    }

    #[test]
    fn test_release_payload() {
        let release: GitHubRelease =
            serde_json::from_str(r#"{"tag_name": "v1.3.0", "name": "KDK v1.3.0", "draft": false}"#)
                .unwrap();
        assert_eq!(parse_tag(&release.tag_name).unwrap(), "v1.3.0");
        assert!(parse_tag("  ").is_err());
    }
}
