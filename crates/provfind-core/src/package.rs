use serde::Serialize;
use url::Url;

use crate::{platform::Platform, provider::Provider, version::Version};

/// Where and how to download one provider package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageMeta {
    pub provider: Provider,
    pub version: Version,
    pub target_platform: Platform,

    /// Plugin protocol versions the package implements, e.g. `["5.0"]`.
    pub protocol_versions: Vec<String>,

    pub filename: String,
    pub location: Url,

    /// Lowercase hex SHA-256 of the package archive.
    pub sha256_sum: Option<String>,

    pub shasums_url: Option<Url>,
    pub shasums_signature_url: Option<Url>,
    pub signing_keys: Vec<SigningKey>,
}

/// A public key the registry vouches for when signing a package's
/// checksums file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SigningKey {
    pub key_id: String,
    pub ascii_armor: String,
}
