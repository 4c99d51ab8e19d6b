//! Error types for provider lookups.
//!
//! Every failure of [`Source`](crate::Source) and of a
//! [`RegistryClient`](crate::RegistryClient) is a [`FindError`]. The enum is
//! `#[non_exhaustive]`: new kinds may be added, so callers matching on it
//! must keep a fallback arm.

use miette::Diagnostic;
use thiserror::Error;

use crate::{
    platform::Platform, provider::Hostname, provider::Provider, traits::ServiceUrlError,
    version::Version,
};

/// Boxed cause reported by an external collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while looking up providers.
#[derive(Error, Diagnostic, Debug)]
#[non_exhaustive]
pub enum FindError {
    /// Service discovery for the host failed, or the host record could not
    /// be interpreted.
    #[error("Could not connect to {hostname}: {source}")]
    #[diagnostic(
        code(provfind_core::host_unreachable),
        help("Check the hostname and your network connection")
    )]
    HostUnreachable {
        hostname: Hostname,
        source: BoxError,
    },

    /// The host was reachable but does not offer a usable provider registry.
    /// `has_other_version` is set when it offers one at an unsupported
    /// protocol version.
    #[error("{}", no_providers_message(.hostname, .has_other_version))]
    #[diagnostic(code(provfind_core::host_no_providers))]
    HostNoProviders {
        hostname: Hostname,
        has_other_version: bool,
    },

    #[error("Unauthorized for {hostname}")]
    #[diagnostic(
        code(provfind_core::unauthenticated),
        help("Configure credentials for this host or check that the existing ones are still valid")
    )]
    Unauthenticated { hostname: Hostname },

    #[error("Provider {provider} is not known to its registry")]
    #[diagnostic(
        code(provfind_core::provider_not_known),
        help("Check the provider namespace and type for typos")
    )]
    ProviderNotKnown { provider: Provider },

    /// No package exists for the platform. Also reported when the version
    /// itself does not exist, since the registry does not tell the two apart.
    #[error("Provider {provider} v{version} is not available for {platform}")]
    #[diagnostic(
        code(provfind_core::platform_not_supported),
        help("Confirm the version is listed by `available_versions` before resolving a package")
    )]
    PlatformNotSupported {
        provider: Provider,
        version: Version,
        platform: Platform,
    },

    #[error("Could not query provider registry for {provider}: {source}")]
    #[diagnostic(code(provfind_core::query_failed))]
    QueryFailed {
        provider: Provider,
        source: BoxError,
    },

    /// Unclassified failure carrying only a message, e.g. from a credentials
    /// store.
    #[error("{0}")]
    #[diagnostic(code(provfind_core::other))]
    Other(String),
}

fn no_providers_message(hostname: &Hostname, has_other_version: &bool) -> String {
    if *has_other_version {
        format!(
            "Host {hostname} offers a provider registry protocol version that is not supported"
        )
    } else {
        format!("Host {hostname} does not offer a provider registry")
    }
}

impl FindError {
    /// Wraps `cause` as a [`FindError::QueryFailed`] for `provider`.
    pub fn query_failed<E>(provider: &Provider, cause: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::QueryFailed {
            provider: provider.clone(),
            source: cause.into(),
        }
    }

    /// Classifies why `hostname` could not give a provider registry URL.
    pub fn from_service_url(hostname: &Hostname, err: ServiceUrlError) -> Self {
        match err {
            ServiceUrlError::NotProvided { .. } => {
                Self::HostNoProviders {
                    hostname: hostname.clone(),
                    has_other_version: false,
                }
            }
            ServiceUrlError::VersionNotSupported { .. } => {
                Self::HostNoProviders {
                    hostname: hostname.clone(),
                    has_other_version: true,
                }
            }
            ServiceUrlError::Other(source) => {
                Self::HostUnreachable {
                    hostname: hostname.clone(),
                    source,
                }
            }
        }
    }
}

/// A specialized Result type for provider lookups.
pub type Result<T> = std::result::Result<T, FindError>;

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    fn provider() -> Provider {
        "example.com/acme/widget".parse().unwrap()
    }

    #[test]
    fn test_host_unreachable_display() {
        let err = FindError::HostUnreachable {
            hostname: Hostname::parse("example.com").unwrap(),
            source: "connection refused".into(),
        };
        assert_eq!(
            err.to_string(),
            "Could not connect to example.com: connection refused"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_host_no_providers_display() {
        let hostname = Hostname::parse("example.com").unwrap();

        let err = FindError::HostNoProviders {
            hostname: hostname.clone(),
            has_other_version: false,
        };
        assert_eq!(
            err.to_string(),
            "Host example.com does not offer a provider registry"
        );

        let err = FindError::HostNoProviders {
            hostname,
            has_other_version: true,
        };
        assert!(err.to_string().contains("not supported"));
    }

    #[test]
    fn test_platform_not_supported_display() {
        let err = FindError::PlatformNotSupported {
            provider: provider(),
            version: Version::parse("1.2.0").unwrap(),
            platform: "plan9_mips".parse().unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Provider example.com/acme/widget v1.2.0 is not available for plan9_mips"
        );
    }

    #[test]
    fn test_query_failed_helper() {
        let err = FindError::query_failed(&provider(), "bad json");
        match &err {
            FindError::QueryFailed { provider: p, source } => {
                assert_eq!(p, &provider());
                assert_eq!(source.to_string(), "bad json");
            }
            other => panic!("expected QueryFailed, got {other:?}"),
        }
        assert!(err.to_string().contains("example.com/acme/widget"));
    }

    #[test]
    fn test_from_service_url() {
        let hostname = Hostname::parse("example.com").unwrap();
        let service = crate::traits::PROVIDERS_V1;

        let err = FindError::from_service_url(
            &hostname,
            ServiceUrlError::NotProvided {
                hostname: hostname.clone(),
                service,
            },
        );
        assert!(matches!(
            err,
            FindError::HostNoProviders {
                has_other_version: false,
                ..
            }
        ));

        let err = FindError::from_service_url(
            &hostname,
            ServiceUrlError::VersionNotSupported {
                hostname: hostname.clone(),
                service,
            },
        );
        assert!(matches!(
            err,
            FindError::HostNoProviders {
                has_other_version: true,
                ..
            }
        ));

        let err = FindError::from_service_url(&hostname, ServiceUrlError::Other("bad url".into()));
        match err {
            FindError::HostUnreachable { hostname: h, source } => {
                assert_eq!(h, hostname);
                assert_eq!(source.to_string(), "bad url");
            }
            other => panic!("expected HostUnreachable, got {other:?}"),
        }
    }

    #[test]
    fn test_other_passthrough() {
        let err = FindError::Other("helper exploded".into());
        assert_eq!(err.to_string(), "helper exploded");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_diagnostic_codes() {
        let err = FindError::Unauthenticated {
            hostname: Hostname::parse("example.com").unwrap(),
        };
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("provfind_core::unauthenticated"));
        assert!(err.help().is_some());
    }
}
