use std::path::PathBuf;

use miette::Diagnostic;
use provfind_core::provider::AddressError;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(provfind_config::toml_deserialize),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Failed to read {}: {source}", .path.display())]
    #[diagnostic(code(provfind_config::io))]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    InvalidHostname(#[from] AddressError),

    #[error("Invalid timeout: {0}")]
    #[diagnostic(
        code(provfind_config::invalid_timeout),
        help("Use a duration such as `30s` or `1m30s`")
    )]
    InvalidTimeout(String),

    #[error("Invalid URL `{url}` for service {service} on {hostname}")]
    #[diagnostic(
        code(provfind_config::invalid_service_url),
        help("Service overrides must be absolute http(s) URLs")
    )]
    InvalidServiceUrl {
        hostname: String,
        service: String,
        url: String,
    },

    #[error("Invalid service name `{service}` for {hostname}")]
    #[diagnostic(
        code(provfind_config::invalid_service_name),
        help("Service names look like `providers.v1`")
    )]
    InvalidServiceName { hostname: String, service: String },

    #[error("Host {0} is configured more than once")]
    #[diagnostic(
        code(provfind_config::duplicate_host),
        help("Hostnames are compared case-insensitively and without the default port")
    )]
    DuplicateHost(String),

    #[error("Empty token for {0}")]
    #[diagnostic(
        code(provfind_config::empty_token),
        help("Remove the credentials block or set a token")
    )]
    EmptyToken(String),

    #[error(transparent)]
    #[diagnostic(code(provfind_config::path))]
    Path(#[from] provfind_utils::error::PathError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
