//! Capabilities a [`Source`](crate::Source) is built from.
//!
//! Each external collaborator (service discovery, credential storage, the
//! registry wire protocol) is reached only through these traits.

use std::fmt;

use thiserror::Error;
use url::Url;

use crate::{
    error::{BoxError, Result},
    package::PackageMeta,
    platform::Platform,
    provider::{Hostname, Provider},
    version::Version,
};

/// A logical service name and its major protocol version, e.g. `providers.v1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceId {
    pub name: &'static str,
    pub version: u32,
}

/// The provider registry protocol this crate speaks.
pub const PROVIDERS_V1: ServiceId = ServiceId::new("providers", 1);

impl ServiceId {
    pub const fn new(name: &'static str, version: u32) -> Self {
        Self {
            name,
            version,
        }
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.v{}", self.name, self.version)
    }
}

/// Why a discovered host could not give a URL for a service.
#[derive(Error, Debug)]
pub enum ServiceUrlError {
    #[error("Host {hostname} does not provide a {service} service")]
    NotProvided {
        hostname: Hostname,
        service: ServiceId,
    },

    /// The host offers the service, but only at other protocol versions.
    #[error("Host {hostname} does not support {service}")]
    VersionNotSupported {
        hostname: Hostname,
        service: ServiceId,
    },

    #[error("{0}")]
    Other(#[source] BoxError),
}

/// Authentication material for one host.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Value for an `Authorization` request header.
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Resolves a hostname to its record of offered services.
pub trait Discovery: Send + Sync {
    fn discover(&self, hostname: &Hostname) -> std::result::Result<Box<dyn ServiceHost>, BoxError>;
}

/// A discovered host.
pub trait ServiceHost: Send + Sync {
    fn hostname(&self) -> &Hostname;

    fn service_url(&self, service: ServiceId) -> std::result::Result<Url, ServiceUrlError>;
}

/// Looks up stored credentials. `Ok(None)` means anonymous access.
pub trait CredentialsSource: Send + Sync {
    fn credentials_for_host(
        &self,
        hostname: &Hostname,
    ) -> std::result::Result<Option<Credentials>, BoxError>;
}

/// A client for one registry endpoint.
///
/// Implementations report failures already classified as
/// [`FindError`](crate::FindError) kinds.
pub trait RegistryClient {
    /// Raw version strings as published, in no particular order and
    /// possibly with duplicates.
    fn provider_versions(&self, provider: &Provider) -> Result<Vec<String>>;

    fn package_meta(
        &self,
        provider: &Provider,
        version: &Version,
        platform: &Platform,
    ) -> Result<PackageMeta>;
}

/// Builds registry clients for a resolved service URL.
pub trait ClientFactory: Send + Sync {
    fn client(&self, service_url: Url, credentials: Option<Credentials>)
        -> Box<dyn RegistryClient>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_id_display() {
        assert_eq!(PROVIDERS_V1.to_string(), "providers.v1");
        assert_eq!(ServiceId::new("modules", 2).to_string(), "modules.v2");
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let creds = Credentials::token("s3cr3t");
        assert!(!format!("{creds:?}").contains("s3cr3t"));
        assert_eq!(creds.authorization_header(), "Bearer s3cr3t");
    }
}
