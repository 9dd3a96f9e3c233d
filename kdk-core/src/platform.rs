// Standard library
use std::env;

/// Supported operating systems for platform detection.
///
/// Maps `std::env::consts::OS` onto the names used in release artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Linux,
    MacOS,
    Windows,
    Unsupported,
}

/// Supported CPU architectures for platform detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    Amd64,
    Arm64,
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

impl Platform {
    pub fn is_windows(&self) -> bool {
        self.os == Os::Windows
    }

    pub fn os_name(&self) -> &'static str {
        match self.os {
            Os::Linux => "linux",
            Os::MacOS => "darwin",
            Os::Windows => "windows",
            Os::Unsupported => "unsupported_os",
        }
    }

    pub fn arch_name(&self) -> &'static str {
        match self.arch {
            Arch::Amd64 => "amd64",
            Arch::Arm64 => "arm64",
            Arch::Unsupported => "unsupported_arch",
        }
    }
}

pub fn get_platform_info() -> Platform {
    let os = match env::consts::OS {
        "linux" => Os::Linux,
        "macos" => Os::MacOS,
        "windows" => Os::Windows,
        _ => Os::Unsupported,
    };

    let arch = match env::consts::ARCH {
        "x86_64" => Arch::Amd64,
        "aarch64" => Arch::Arm64,
        _ => Arch::Unsupported,
    };

    Platform { os, arch }
}

/// Renders as the `<os>-<arch>` suffix used by release archives.
impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.os_name(), self.arch_name())
    }
}

/// Strips a Windows `DOMAIN\user` prefix, leaving just the account name.
pub fn strip_domain(username: &str) -> &str {
    match username.rsplit_once('\\') {
        Some((_, user)) => user,
        None => username,
    }
}

/// Name of the invoking user, as used inside the container and in snapshot tags.
pub fn current_username() -> String {
    let raw = env::var("USER")
        .or_else(|_| env::var("USERNAME"))
        .unwrap_or_else(|_| "kdk".to_string());
    strip_domain(&raw).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_domain() {
        assert_eq!(strip_domain("CORP\\alice"), "alice");
        assert_eq!(strip_domain("alice"), "alice");
        assert_eq!(strip_domain("A\\B\\carol"), "carol");
    }

    #[test]
    fn test_display_uses_dash() {
        let p = Platform {
            os: Os::Linux,
            arch: Arch::Amd64,
        };
        assert_eq!(p.to_string(), "linux-amd64");
        assert!(!p.is_windows());
    }
}
