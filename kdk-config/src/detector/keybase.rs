//! Keybase filesystem detection.
//!
//! Keybase exposes a FUSE filesystem with a `private` directory at its root:
//! - Linux/macOS mount it at `/keybase`
//! - Windows maps it to `k:` (seen as `/k` from some shells)

use std::path::{Path, PathBuf};
use tracing::debug;

/// Candidate mount roots, probed in order.
pub const KEYBASE_ROOTS: &[&str] = &["/keybase", "k:", "/k"];
/// Where the filesystem appears inside the container.
pub const KEYBASE_TARGET: &str = "/keybase";

const PROBE_SUBDIR: &str = "private";

/// Returns the resolved root of the first candidate with a `private` subdirectory.
pub fn detect_keybase<P: AsRef<Path>>(roots: &[P]) -> Option<PathBuf> {
    for root in roots {
        let probe = root.as_ref().join(PROBE_SUBDIR);
        match probe.canonicalize() {
            Ok(resolved) => {
                if let Some(source) = resolved.parent() {
                    debug!("Detected keybase filesystem at {}", source.display());
                    return Some(source.to_path_buf());
                }
            }
            Err(e) => debug!("No keybase at {}: {}", probe.display(), e),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_detects_first_root_with_private_dir() {
        let temp = TempDir::new().unwrap();
        let empty = temp.path().join("empty");
        let keybase = temp.path().join("kb");
        std::fs::create_dir_all(&empty).unwrap();
        std::fs::create_dir_all(keybase.join("private")).unwrap();

        let found = detect_keybase(&[empty, keybase.clone()]).unwrap();
        assert_eq!(found, keybase.canonicalize().unwrap());
    }

    #[test]
    fn test_nothing_detected() {
        let temp = TempDir::new().unwrap();
        assert_eq!(detect_keybase(&[temp.path().join("nope")]), None);
    }
}
