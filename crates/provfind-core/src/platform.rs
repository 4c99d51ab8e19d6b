use std::{fmt, str::FromStr, sync::LazyLock};

use miette::Diagnostic;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// The platform this process is running on.
pub static CURRENT_PLATFORM: LazyLock<Platform> = LazyLock::new(|| {
    Platform {
        os: provfind_utils::system::os().to_string(),
        arch: provfind_utils::system::arch().to_string(),
    }
});

#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
#[error("Invalid platform `{0}`")]
#[diagnostic(
    code(provfind_core::invalid_platform),
    help("Platforms are written as `os_arch`, e.g. `linux_amd64` or `darwin_arm64`")
)]
pub struct PlatformParseError(pub String);

/// An operating system and CPU architecture pair, e.g. `linux_amd64`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// The platform this process is running on.
    pub fn current() -> Self {
        CURRENT_PLATFORM.clone()
    }
}

impl FromStr for Platform {
    type Err = PlatformParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PlatformParseError(s.to_string());

        let (os, arch) = s.split_once('_').ok_or_else(invalid)?;
        let valid = |part: &str| {
            !part.is_empty() && part.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        };
        if !valid(os) || !valid(arch) {
            return Err(invalid());
        }

        Ok(Self::new(os, arch))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.os, self.arch)
    }
}

impl Serialize for Platform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
