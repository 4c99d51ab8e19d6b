use std::collections::HashMap;

use provfind_config::config::Config;
use provfind_core::{BoxError, Discovery, Hostname, ServiceHost, ServiceId, ServiceUrlError};
use serde_json::{Map, Value};
use tracing::{debug, trace, warn};
use ureq::http::{
    header::{ACCEPT, CONTENT_TYPE},
    StatusCode,
};
use url::Url;

use crate::{error::DiscoError, http_client::SHARED_AGENT};

/// Path of the service discovery document on every host.
pub const WELL_KNOWN_PATH: &str = "/.well-known/terraform.json";

/// Discovers the services a host offers.
///
/// Hosts with configured service overrides are answered from the
/// configuration without any network traffic.
#[derive(Debug, Clone, Default)]
pub struct Disco {
    overrides: HashMap<Hostname, Map<String, Value>>,
    scheme: Scheme,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Scheme {
    #[default]
    Https,
    #[cfg(test)]
    Http,
}

impl Scheme {
    fn as_str(self) -> &'static str {
        match self {
            Scheme::Https => "https",
            #[cfg(test)]
            Scheme::Http => "http",
        }
    }
}

impl Disco {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a `Disco` that uses the service overrides from `config`.
    pub fn from_config(config: &Config) -> Self {
        let mut disco = Self::new();
        for (hostname, host) in &config.hosts {
            let hostname = match Hostname::parse(hostname) {
                Ok(hostname) => hostname,
                Err(err) => {
                    warn!("Ignoring service overrides: {}", err);
                    continue;
                }
            };
            for (service, url) in &host.services {
                disco = disco.with_override(hostname.clone(), service, url);
            }
        }
        disco
    }

    /// Answers discovery for `hostname` with `url` for `service` instead of
    /// fetching its discovery document.
    pub fn with_override(mut self, hostname: Hostname, service: &str, url: &str) -> Self {
        self.overrides
            .entry(hostname)
            .or_default()
            .insert(service.to_string(), Value::String(url.to_string()));
        self
    }

    /// Fetches and parses the discovery document of `hostname`.
    ///
    /// A host that answers `404` offers no services at all.
    pub fn discover_host(&self, hostname: &Hostname) -> Result<Host, DiscoError> {
        let discovery_url = self.discovery_url(hostname)?;

        if let Some(services) = self.overrides.get(hostname) {
            debug!("Using configured services for {}", hostname);
            return Ok(Host {
                hostname: hostname.clone(),
                discovery_url,
                services: services.clone(),
            });
        }

        debug!("Fetching {}", discovery_url);

        let mut resp = SHARED_AGENT
            .get(discovery_url.as_str())
            .header(ACCEPT, "application/json")
            .call()
            .map_err(|err| {
                DiscoError::Network {
                    url: discovery_url.to_string(),
                    source: Box::new(err),
                }
            })?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            debug!("{} does not support service discovery", hostname);
            return Ok(Host {
                hostname: hostname.clone(),
                discovery_url,
                services: Map::new(),
            });
        }
        if status != StatusCode::OK {
            return Err(DiscoError::HttpStatus {
                status: status.as_u16(),
                url: discovery_url.to_string(),
            });
        }

        let invalid = |reason: String| {
            DiscoError::InvalidDocument {
                url: discovery_url.to_string(),
                reason,
            }
        };

        if let Some(content_type) = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
        {
            let mime = content_type.split(';').next().unwrap_or_default().trim();
            if !mime.eq_ignore_ascii_case("application/json") {
                return Err(invalid(format!("unexpected content type {mime:?}")));
            }
        }

        let body = resp.body_mut().read_to_string().map_err(|err| {
            DiscoError::Network {
                url: discovery_url.to_string(),
                source: Box::new(err),
            }
        })?;
        trace!("Discovery document for {}: {}", hostname, body);

        let services = match serde_json::from_str::<Value>(&body) {
            Ok(Value::Object(services)) => services,
            Ok(_) => return Err(invalid("document is not a JSON object".into())),
            Err(err) => return Err(invalid(err.to_string())),
        };

        Ok(Host {
            hostname: hostname.clone(),
            discovery_url,
            services,
        })
    }

    fn discovery_url(&self, hostname: &Hostname) -> Result<Url, DiscoError> {
        Url::parse(&format!(
            "{}://{}{}",
            self.scheme.as_str(),
            hostname,
            WELL_KNOWN_PATH
        ))
        .map_err(|source| {
            DiscoError::InvalidUrl {
                hostname: hostname.to_string(),
                source,
            }
        })
    }
}

impl Discovery for Disco {
    fn discover(&self, hostname: &Hostname) -> Result<Box<dyn ServiceHost>, BoxError> {
        Ok(Box::new(self.discover_host(hostname)?))
    }
}

/// The services one host offers, as listed in its discovery document.
#[derive(Debug, Clone)]
pub struct Host {
    hostname: Hostname,
    discovery_url: Url,
    services: Map<String, Value>,
}

impl Host {
    pub fn discovery_url(&self) -> &Url {
        &self.discovery_url
    }

    /// Names of all services the host lists, e.g. `providers.v1`.
    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    fn invalid_service_url(&self, service: ServiceId, value: &str, reason: String) -> ServiceUrlError {
        ServiceUrlError::Other(Box::new(DiscoError::InvalidServiceUrl {
            hostname: self.hostname.to_string(),
            service: service.to_string(),
            value: value.to_string(),
            reason,
        }))
    }
}

impl ServiceHost for Host {
    fn hostname(&self) -> &Hostname {
        &self.hostname
    }

    /// Resolves the URL of `service`. Relative URLs are resolved against the
    /// discovery document's URL, and the result always ends in `/`.
    fn service_url(&self, service: ServiceId) -> Result<Url, ServiceUrlError> {
        let Some(value) = self.services.get(&service.to_string()) else {
            let other_version = self.services.keys().any(|key| {
                key.rsplit_once(".v")
                    .is_some_and(|(name, version)| name == service.name && version.parse::<u32>().is_ok())
            });

            return Err(if other_version {
                ServiceUrlError::VersionNotSupported {
                    hostname: self.hostname.clone(),
                    service,
                }
            } else {
                ServiceUrlError::NotProvided {
                    hostname: self.hostname.clone(),
                    service,
                }
            });
        };

        let Value::String(raw) = value else {
            return Err(self.invalid_service_url(
                service,
                &value.to_string(),
                "expected a string".into(),
            ));
        };

        let mut url = self
            .discovery_url
            .join(raw)
            .map_err(|err| self.invalid_service_url(service, raw, err.to_string()))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(self.invalid_service_url(
                service,
                raw,
                format!("unsupported scheme {:?}", url.scheme()),
            ));
        }

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(url)
    }
}
