//! Parsed provider versions and ordered version lists.

use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Serialize, Serializer};
use thiserror::Error;

/// A semantic version as published by a provider registry.
///
/// Equality is exact, build metadata included. Ordering goes through
/// [`Version::cmp_precedence`], which ignores build metadata as SemVer
/// requires, so `Version` deliberately has no `Ord` impl.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version(semver::Version);

impl Version {
    pub fn parse(input: &str) -> Result<Self, semver::Error> {
        semver::Version::parse(input).map(Self)
    }

    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(semver::Version::new(major, minor, patch))
    }

    /// Compares by SemVer precedence.
    pub fn cmp_precedence(&self, other: &Self) -> Ordering {
        self.0.cmp_precedence(&other.0)
    }

    pub fn is_prerelease(&self) -> bool {
        !self.0.pre.is_empty()
    }
}

impl FromStr for Version {
    type Err = semver::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A version string from a registry response that is not valid SemVer.
#[derive(Error, Debug)]
#[error("registry response includes invalid version string {version:?}: {source}")]
pub struct InvalidVersion {
    pub version: String,
    #[source]
    pub source: semver::Error,
}

/// Versions ordered from lowest to highest precedence.
///
/// Entries of equal precedence, including exact duplicates, keep the order
/// in which they were given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VersionList(Vec<Version>);

impl VersionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorts `versions` by precedence with a stable sort.
    pub fn from_unsorted(mut versions: Vec<Version>) -> Self {
        versions.sort_by(Version::cmp_precedence);
        Self(versions)
    }

    /// The highest-precedence version, if any.
    pub fn newest(&self) -> Option<&Version> {
        self.0.last()
    }

    /// The highest-precedence version that is not a pre-release.
    pub fn newest_release(&self) -> Option<&Version> {
        self.0.iter().rev().find(|v| !v.is_prerelease())
    }

    /// The listed version with the same precedence as `version`, preferring
    /// an exact match. `1.0.0` finds a listed `1.0.0+abc`.
    pub fn find(&self, version: &Version) -> Option<&Version> {
        self.0.iter().find(|v| *v == version).or_else(|| {
            self.0
                .iter()
                .find(|v| v.cmp_precedence(version) == Ordering::Equal)
        })
    }

    /// Whether a version of the same precedence as `version` is listed.
    pub fn contains(&self, version: &Version) -> bool {
        self.find(version).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Version> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for VersionList {
    type Item = Version;
    type IntoIter = std::vec::IntoIter<Version>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a VersionList {
    type Item = &'a Version;
    type IntoIter = std::slice::Iter<'a, Version>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
