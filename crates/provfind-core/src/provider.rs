//! Provider addresses and registry hostnames.

use std::{fmt, str::FromStr};

use miette::Diagnostic;
use serde::{Serialize, Serializer};
use thiserror::Error;
use url::Url;

/// Hostname used for provider addresses written as `namespace/type`.
pub const DEFAULT_REGISTRY_HOST: &str = "registry.terraform.io";

#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid hostname `{input}`: {reason}")]
    #[diagnostic(code(provfind_core::invalid_hostname))]
    InvalidHostname { input: String, reason: String },

    #[error("Invalid provider address `{input}`: {reason}")]
    #[diagnostic(
        code(provfind_core::invalid_provider),
        help("Provider addresses look like `namespace/type` or `hostname/namespace/type`")
    )]
    InvalidProvider { input: String, reason: String },
}

/// A normalized registry hostname, optionally with a non-default port.
///
/// Domains are lowercased and IDNA-encoded; the `https` default port is
/// dropped, so `Example.COM:443` and `example.com` are the same hostname.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hostname(String);

impl Hostname {
    pub fn parse(input: &str) -> Result<Self, AddressError> {
        let invalid = |reason: &str| {
            AddressError::InvalidHostname {
                input: input.to_string(),
                reason: reason.to_string(),
            }
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(invalid("hostname is empty"));
        }
        if trimmed.contains(['/', '@', '?', '#']) || trimmed.contains(char::is_whitespace) {
            return Err(invalid("hostname must not contain a scheme, path or credentials"));
        }

        let url = Url::parse(&format!("https://{trimmed}/")).map_err(|e| invalid(&e.to_string()))?;
        let host = url.host_str().ok_or_else(|| invalid("missing host"))?;

        let normalized = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Hostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Hostname {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Hostname {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Identity of a provider: the registry host plus namespace and type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Provider {
    pub hostname: Hostname,
    pub namespace: String,
    pub type_name: String,
}

impl Provider {
    pub fn new(
        hostname: Hostname,
        namespace: &str,
        type_name: &str,
    ) -> Result<Self, AddressError> {
        let display = format!("{hostname}/{namespace}/{type_name}");
        Ok(Self {
            namespace: validate_part(namespace, "namespace", &display)?,
            type_name: validate_part(type_name, "type", &display)?,
            hostname,
        })
    }
}

fn validate_part(part: &str, what: &str, input: &str) -> Result<String, AddressError> {
    let invalid = |reason: String| {
        AddressError::InvalidProvider {
            input: input.to_string(),
            reason,
        }
    };

    if part.is_empty() {
        return Err(invalid(format!("{what} is empty")));
    }
    if let Some(c) = part
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(invalid(format!("{what} contains invalid character `{c}`")));
    }

    Ok(part.to_ascii_lowercase())
}

impl Provider {
    /// Parses `namespace/type` or `hostname/namespace/type`, using
    /// `default_host` for the short form.
    pub fn parse_with_default_host(
        input: &str,
        default_host: &Hostname,
    ) -> Result<Self, AddressError> {
        let parts: Vec<&str> = input.trim().split('/').collect();
        match parts.as_slice() {
            [namespace, type_name] => Self::new(default_host.clone(), namespace, type_name),
            [hostname, namespace, type_name] => {
                let hostname = Hostname::parse(hostname).map_err(|e| {
                    AddressError::InvalidProvider {
                        input: input.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                Self::new(hostname, namespace, type_name)
            }
            _ => {
                Err(AddressError::InvalidProvider {
                    input: input.to_string(),
                    reason: "expected 2 or 3 slash-separated parts".to_string(),
                })
            }
        }
    }
}

impl FromStr for Provider {
    type Err = AddressError;

    /// Parses `namespace/type` or `hostname/namespace/type`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_default_host(s, &Hostname::parse(DEFAULT_REGISTRY_HOST)?)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.hostname, self.namespace, self.type_name)
    }
}

impl Serialize for Provider {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
