use provfind_core::{
    ClientFactory, Credentials, FindError, PackageMeta, Platform, Provider, RegistryClient,
    Result, SigningKey, Version,
};
use provfind_disco::http_client::SHARED_AGENT;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use ureq::http::{
    header::{ACCEPT, AUTHORIZATION},
    StatusCode,
};
use url::Url;

use crate::{
    error::RegistryError,
    response::{DownloadResponse, VersionsResponse},
};

/// Builds [`HttpRegistryClient`]s that share the process-wide HTTP agent.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpClientFactory;

impl ClientFactory for HttpClientFactory {
    fn client(
        &self,
        service_url: Url,
        credentials: Option<Credentials>,
    ) -> Box<dyn RegistryClient> {
        Box::new(HttpRegistryClient::new(service_url, credentials))
    }
}

/// Client for one `providers.v1` endpoint.
#[derive(Debug, Clone)]
pub struct HttpRegistryClient {
    base_url: Url,
    credentials: Option<Credentials>,
}

/// Outcome of a request that reached the registry.
enum Fetched<T> {
    Ok(T),
    Unauthorized,
    NotFound,
}

impl HttpRegistryClient {
    /// `base_url` is the resolved service URL and must end in `/`.
    pub fn new(base_url: Url, credentials: Option<Credentials>) -> Self {
        Self {
            base_url,
            credentials,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, provider: &Provider, path: &str) -> Result<Url> {
        self.base_url
            .join(&format!(
                "{}/{}/{}",
                provider.namespace, provider.type_name, path
            ))
            .map_err(|err| FindError::query_failed(provider, err))
    }

    fn fetch<T>(&self, provider: &Provider, url: &Url) -> Result<Fetched<T>>
    where
        T: DeserializeOwned,
    {
        debug!("Fetching {}", url);

        let mut req = SHARED_AGENT
            .get(url.as_str())
            .header(ACCEPT, "application/json");
        if let Some(credentials) = &self.credentials {
            req = req.header(AUTHORIZATION, &credentials.authorization_header());
        }

        let mut resp = req
            .call()
            .map_err(|err| FindError::query_failed(provider, err))?;

        match resp.status() {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Ok(Fetched::Unauthorized),
            StatusCode::NOT_FOUND => return Ok(Fetched::NotFound),
            status => {
                return Err(FindError::query_failed(
                    provider,
                    RegistryError::HttpStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    },
                ));
            }
        }

        let body = resp
            .body_mut()
            .read_to_string()
            .map_err(|err| FindError::query_failed(provider, err))?;
        trace!("Response from {}: {}", url, body);

        let parsed = serde_json::from_str(&body).map_err(|source| {
            FindError::query_failed(
                provider,
                RegistryError::InvalidResponse {
                    url: url.to_string(),
                    source,
                },
            )
        })?;

        Ok(Fetched::Ok(parsed))
    }
}

impl RegistryClient for HttpRegistryClient {
    fn provider_versions(&self, provider: &Provider) -> Result<Vec<String>> {
        let url = self.endpoint(provider, "versions")?;

        match self.fetch::<VersionsResponse>(provider, &url)? {
            Fetched::Ok(resp) => {
                debug!("{} lists {} versions", provider, resp.versions.len());
                Ok(resp.versions.into_iter().map(|v| v.version).collect())
            }
            Fetched::Unauthorized => {
                Err(FindError::Unauthenticated {
                    hostname: provider.hostname.clone(),
                })
            }
            Fetched::NotFound => {
                Err(FindError::ProviderNotKnown {
                    provider: provider.clone(),
                })
            }
        }
    }

    fn package_meta(
        &self,
        provider: &Provider,
        version: &Version,
        platform: &Platform,
    ) -> Result<PackageMeta> {
        let url = self.endpoint(
            provider,
            &format!("{}/download/{}/{}", version, platform.os, platform.arch),
        )?;

        let resp = match self.fetch::<DownloadResponse>(provider, &url)? {
            Fetched::Ok(resp) => resp,
            Fetched::Unauthorized => {
                return Err(FindError::Unauthenticated {
                    hostname: provider.hostname.clone(),
                });
            }
            Fetched::NotFound => {
                return Err(FindError::PlatformNotSupported {
                    provider: provider.clone(),
                    version: version.clone(),
                    platform: platform.clone(),
                });
            }
        };

        package_meta_from(&url, provider, version, platform, resp)
            .map_err(|err| FindError::query_failed(provider, err))
    }
}

fn package_meta_from(
    request_url: &Url,
    provider: &Provider,
    version: &Version,
    platform: &Platform,
    resp: DownloadResponse,
) -> std::result::Result<PackageMeta, RegistryError> {
    if resp.os != platform.os || resp.arch != platform.arch {
        return Err(RegistryError::PlatformMismatch {
            requested: platform.to_string(),
            answered: format!("{}_{}", resp.os, resp.arch),
        });
    }
    if resp.filename.trim().is_empty() {
        return Err(RegistryError::MissingField("filename"));
    }
    if resp.download_url.trim().is_empty() {
        return Err(RegistryError::MissingField("download_url"));
    }

    let resolve = |field: &'static str, value: &str| {
        request_url.join(value).map_err(|source| {
            RegistryError::InvalidUrl {
                field,
                value: value.to_string(),
                source,
            }
        })
    };

    let location = resolve("download_url", &resp.download_url)?;
    let shasums_url = resp
        .shasums_url
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| resolve("shasums_url", s))
        .transpose()?;
    let shasums_signature_url = resp
        .shasums_signature_url
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| resolve("shasums_signature_url", s))
        .transpose()?;

    let sha256_sum = match resp.shasum.filter(|s| !s.is_empty()) {
        Some(sum) if sum.len() == 64 && sum.chars().all(|c| c.is_ascii_hexdigit()) => {
            Some(sum.to_ascii_lowercase())
        }
        Some(sum) => return Err(RegistryError::InvalidChecksum(sum)),
        None => None,
    };

    Ok(PackageMeta {
        provider: provider.clone(),
        version: version.clone(),
        target_platform: platform.clone(),
        protocol_versions: resp.protocols,
        filename: resp.filename,
        location,
        sha256_sum,
        shasums_url,
        shasums_signature_url,
        signing_keys: resp
            .signing_keys
            .gpg_public_keys
            .into_iter()
            .map(|key| {
                SigningKey {
                    key_id: key.key_id,
                    ascii_armor: key.ascii_armor,
                }
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use provfind_core::{Hostname, Source};
    use provfind_disco::{Disco, StaticCredentials};

    use super::*;

    const SHASUM: &str = "5f9c7aa76b7c34d722fc9123208e26b22d60440cb47150dd04733b9b94f4541a";

    fn provider() -> Provider {
        "registry.example.com/acme/widget".parse().unwrap()
    }

    fn client_for(server: &mockito::Server, credentials: Option<Credentials>) -> HttpRegistryClient {
        let base = Url::parse(&format!("{}/v1/providers/", server.url())).unwrap();
        HttpRegistryClient::new(base, credentials)
    }

    fn linux() -> Platform {
        Platform::new("linux", "amd64")
    }

    fn version(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_provider_versions() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/v1/providers/acme/widget/versions")
            .match_header("accept", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"versions":[{"version":"1.1.0"},{"version":"1.0.0","protocols":["5.0"]},{"version":"1.1.0"}]}"#,
            )
            .create();

        let versions = client_for(&server, None)
            .provider_versions(&provider())
            .unwrap();

        assert_eq!(versions, ["1.1.0", "1.0.0", "1.1.0"]);
        mock.assert();
    }

    #[test]
    fn test_sends_bearer_token() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/v1/providers/acme/widget/versions")
            .match_header("authorization", "Bearer s3cret")
            .with_status(200)
            .with_body(r#"{"versions":[]}"#)
            .create();

        let versions = client_for(&server, Some(Credentials::token("s3cret")))
            .provider_versions(&provider())
            .unwrap();

        assert!(versions.is_empty());
        mock.assert();
    }

    #[test]
    fn test_versions_unauthorized() {
        for status in [401, 403] {
            let mut server = mockito::Server::new();
            let _mock = server
                .mock("GET", "/v1/providers/acme/widget/versions")
                .with_status(status)
                .create();

            let err = client_for(&server, None)
                .provider_versions(&provider())
                .unwrap_err();
            assert!(
                matches!(err, FindError::Unauthenticated { ref hostname } if hostname.as_str() == "registry.example.com"),
                "status {status}: {err:?}"
            );
        }
    }

    #[test]
    fn test_versions_not_found() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/v1/providers/acme/widget/versions")
            .with_status(404)
            .create();

        let err = client_for(&server, None)
            .provider_versions(&provider())
            .unwrap_err();
        assert!(matches!(err, FindError::ProviderNotKnown { .. }));
    }

    #[test]
    fn test_versions_server_error() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/v1/providers/acme/widget/versions")
            .with_status(503)
            .create();

        let err = client_for(&server, None)
            .provider_versions(&provider())
            .unwrap_err();
        let FindError::QueryFailed { source, .. } = &err else {
            panic!("expected QueryFailed, got {err:?}");
        };
        assert!(source.to_string().contains("HTTP 503"));
    }

    #[test]
    fn test_versions_malformed_json() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/v1/providers/acme/widget/versions")
            .with_status(200)
            .with_body(r#"{"versions": "nope"}"#)
            .create();

        let err = client_for(&server, None)
            .provider_versions(&provider())
            .unwrap_err();
        assert!(matches!(err, FindError::QueryFailed { .. }));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_package_meta() {
        let mut server = mockito::Server::new();
        let body = serde_json::json!({
            "protocols": ["5.0"],
            "os": "linux",
            "arch": "amd64",
            "filename": "terraform-provider-widget_1.0.0_linux_amd64.zip",
            "download_url": "/files/terraform-provider-widget_1.0.0_linux_amd64.zip",
            "shasums_url": "https://releases.example.com/widget/1.0.0/SHA256SUMS",
            "shasums_signature_url": "SHA256SUMS.sig",
            "shasum": SHASUM.to_uppercase(),
            "signing_keys": {
                "gpg_public_keys": [
                    {"key_id": "51852D87348FFC4C", "ascii_armor": "-----BEGIN PGP PUBLIC KEY BLOCK-----"}
                ]
            }
        });
        let mock = server
            .mock("GET", "/v1/providers/acme/widget/1.0.0/download/linux/amd64")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create();

        let meta = client_for(&server, None)
            .package_meta(&provider(), &version("1.0.0"), &linux())
            .unwrap();

        assert_eq!(meta.provider, provider());
        assert_eq!(meta.version, version("1.0.0"));
        assert_eq!(meta.target_platform, linux());
        assert_eq!(meta.protocol_versions, ["5.0"]);
        assert_eq!(
            meta.location.as_str(),
            format!(
                "{}/files/terraform-provider-widget_1.0.0_linux_amd64.zip",
                server.url()
            )
        );
        assert_eq!(meta.sha256_sum.as_deref(), Some(SHASUM));
        assert_eq!(
            meta.shasums_url.unwrap().as_str(),
            "https://releases.example.com/widget/1.0.0/SHA256SUMS"
        );
        assert_eq!(
            meta.shasums_signature_url.unwrap().as_str(),
            format!(
                "{}/v1/providers/acme/widget/1.0.0/download/linux/SHA256SUMS.sig",
                server.url()
            )
        );
        assert_eq!(meta.signing_keys.len(), 1);
        assert_eq!(meta.signing_keys[0].key_id, "51852D87348FFC4C");
        mock.assert();
    }

    #[test]
    fn test_package_meta_platform_not_supported() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/v1/providers/acme/widget/1.0.0/download/plan9/mips")
            .with_status(404)
            .create();

        let platform = Platform::new("plan9", "mips");
        let err = client_for(&server, None)
            .package_meta(&provider(), &version("1.0.0"), &platform)
            .unwrap_err();

        match err {
            FindError::PlatformNotSupported {
                version: v,
                platform: p,
                ..
            } => {
                assert_eq!(v, version("1.0.0"));
                assert_eq!(p, platform);
            }
            other => panic!("expected PlatformNotSupported, got {other:?}"),
        }
    }

    #[test]
    fn test_package_meta_invalid_checksum() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/v1/providers/acme/widget/1.0.0/download/linux/amd64")
            .with_status(200)
            .with_body(
                r#"{"os":"linux","arch":"amd64","filename":"p.zip","download_url":"p.zip","shasum":"not-a-sum"}"#,
            )
            .create();

        let err = client_for(&server, None)
            .package_meta(&provider(), &version("1.0.0"), &linux())
            .unwrap_err();
        let FindError::QueryFailed { source, .. } = &err else {
            panic!("expected QueryFailed, got {err:?}");
        };
        assert!(source.to_string().contains("not-a-sum"));
    }

    #[test]
    fn test_package_meta_platform_mismatch() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/v1/providers/acme/widget/1.0.0/download/linux/amd64")
            .with_status(200)
            .with_body(
                r#"{"os":"windows","arch":"386","filename":"p_windows_386.zip","download_url":"p_windows_386.zip"}"#,
            )
            .create();

        let err = client_for(&server, None)
            .package_meta(&provider(), &version("1.0.0"), &linux())
            .unwrap_err();
        let FindError::QueryFailed { source, .. } = &err else {
            panic!("expected QueryFailed, got {err:?}");
        };
        let cause = source.downcast_ref::<RegistryError>();
        assert!(
            matches!(
                cause,
                Some(RegistryError::PlatformMismatch { requested, answered })
                    if requested == "linux_amd64" && answered == "windows_386"
            ),
            "unexpected cause {source}"
        );
    }

    #[test]
    fn test_package_meta_forbidden() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/v1/providers/acme/widget/1.0.0/download/linux/amd64")
            .with_status(403)
            .create();

        let err = client_for(&server, None)
            .package_meta(&provider(), &version("1.0.0"), &linux())
            .unwrap_err();
        assert!(matches!(err, FindError::Unauthenticated { .. }));
    }

    #[test]
    fn test_factory_builds_client_for_service_url() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/mirror/acme/widget/versions")
            .match_header("authorization", "Bearer abc")
            .with_status(200)
            .with_body(r#"{"versions":[{"version":"0.1.0"}]}"#)
            .create();

        let url = Url::parse(&format!("{}/mirror/", server.url())).unwrap();
        let client = HttpClientFactory.client(url, Some(Credentials::token("abc")));

        assert_eq!(client.provider_versions(&provider()).unwrap(), ["0.1.0"]);
        mock.assert();
    }

    #[test]
    fn test_source_end_to_end() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/v1/providers/acme/widget/versions")
            .match_header("authorization", "Bearer tok")
            .with_status(200)
            .with_body(r#"{"versions":[{"version":"2.0.0"},{"version":"1.0.0"},{"version":"2.0.0-beta.1"}]}"#)
            .create();

        let hostname = Hostname::parse("registry.example.com").unwrap();
        let source = Source::new(
            Disco::new().with_override(
                hostname.clone(),
                "providers.v1",
                &format!("{}/v1/providers", server.url()),
            ),
            StaticCredentials::new().with_token(hostname, "tok"),
            HttpClientFactory,
        );

        let versions = source.available_versions(&provider()).unwrap();
        let strings: Vec<String> = versions.iter().map(ToString::to_string).collect();
        assert_eq!(strings, ["1.0.0", "2.0.0-beta.1", "2.0.0"]);
    }
}
