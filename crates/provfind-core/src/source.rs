use tracing::{debug, trace};

use crate::{
    error::{FindError, Result},
    package::PackageMeta,
    platform::Platform,
    provider::{Hostname, Provider},
    traits::{ClientFactory, CredentialsSource, Discovery, RegistryClient, PROVIDERS_V1},
    version::{InvalidVersion, Version, VersionList},
};

/// Finds providers and their packages in provider registries.
///
/// Nothing is cached: every call discovers the host, looks up credentials
/// and builds a fresh client, so changes to either take effect on the next
/// call.
pub struct Source {
    services: Box<dyn Discovery>,
    credentials: Box<dyn CredentialsSource>,
    clients: Box<dyn ClientFactory>,
}

impl Source {
    pub fn new<D, C, F>(services: D, credentials: C, clients: F) -> Self
    where
        D: Discovery + 'static,
        C: CredentialsSource + 'static,
        F: ClientFactory + 'static,
    {
        Self {
            services: Box::new(services),
            credentials: Box::new(credentials),
            clients: Box::new(clients),
        }
    }

    /// Returns all versions available for `provider`, lowest precedence
    /// first.
    ///
    /// A provider with no published versions yields an empty list. Versions
    /// of equal precedence, duplicates included, keep the registry's order.
    ///
    /// # Errors
    ///
    /// [`FindError::HostUnreachable`], [`FindError::HostNoProviders`],
    /// [`FindError::Unauthenticated`], [`FindError::ProviderNotKnown`] or
    /// [`FindError::QueryFailed`]; the latter also when the registry returns
    /// a string that is not a valid version, in which case its source is an
    /// [`InvalidVersion`]. A failing credentials store is reported as
    /// [`FindError::Other`].
    pub fn available_versions(&self, provider: &Provider) -> Result<VersionList> {
        let client = self.registry_client(&provider.hostname)?;

        let raw = client.provider_versions(provider)?;
        if raw.is_empty() {
            debug!("No versions published for {}", provider);
            return Ok(VersionList::new());
        }
        trace!("Registry returned versions {:?} for {}", raw, provider);

        let versions = raw
            .into_iter()
            .map(|version| {
                match Version::parse(&version) {
                    Ok(parsed) => Ok(parsed),
                    Err(source) => {
                        Err(FindError::query_failed(
                            provider,
                            InvalidVersion {
                                version,
                                source,
                            },
                        ))
                    }
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(VersionList::from_unsorted(versions))
    }

    /// Returns the package metadata for `provider` at `version` built for
    /// `target`. Pass [`Platform::current()`] to target the running
    /// platform.
    ///
    /// `version` should come from [`Source::available_versions`]. The
    /// registry answers a missing version and a missing platform build the
    /// same way, and both surface as [`FindError::PlatformNotSupported`].
    ///
    /// # Errors
    ///
    /// [`FindError::HostUnreachable`], [`FindError::HostNoProviders`],
    /// [`FindError::Unauthenticated`], [`FindError::PlatformNotSupported`] or
    /// [`FindError::QueryFailed`], passed through from the registry client
    /// unchanged. A failing credentials store is reported as
    /// [`FindError::Other`].
    pub fn download_location(
        &self,
        provider: &Provider,
        version: &Version,
        target: &Platform,
    ) -> Result<PackageMeta> {
        let client = self.registry_client(&provider.hostname)?;
        client.package_meta(provider, version, target)
    }

    fn registry_client(&self, hostname: &Hostname) -> Result<Box<dyn RegistryClient>> {
        debug!("Discovering services for {}", hostname);

        let host = self.services.discover(hostname).map_err(|source| {
            FindError::HostUnreachable {
                hostname: hostname.clone(),
                source,
            }
        })?;

        let url = host
            .service_url(PROVIDERS_V1)
            .map_err(|err| FindError::from_service_url(hostname, err))?;
        debug!("Using {} at {}", PROVIDERS_V1, url);

        // A failing credentials helper leaves nothing better than its own
        // message to report.
        let credentials = self
            .credentials
            .credentials_for_host(hostname)
            .map_err(|err| {
                FindError::Other(format!(
                    "failed to retrieve credentials for {hostname}: {err}"
                ))
            })?;

        Ok(self.clients.client(url, credentials))
    }
}
