use miette::Diagnostic;
use provfind_config::error::ConfigError;
use provfind_core::{platform::PlatformParseError, AddressError, FindError, Provider, Version};
use provfind_disco::DiscoError;
use provfind_utils::error::PathError;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Find(#[from] FindError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Platform(#[from] PlatformParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Disco(#[from] DiscoError),

    #[error(transparent)]
    #[diagnostic(code(provfind_cli::path))]
    Path(#[from] PathError),

    #[error("Invalid version `{input}`: {source}")]
    #[diagnostic(
        code(provfind_cli::invalid_version),
        help("Versions are exact semantic versions such as `1.2.3` or `2.0.0-beta.1`")
    )]
    InvalidVersion {
        input: String,
        source: semver::Error,
    },

    #[error("{provider} has no version {version}")]
    #[diagnostic(
        code(provfind_cli::unknown_version),
        help("Run `provfind versions` to list the published versions")
    )]
    UnknownVersion { provider: Provider, version: Version },

    #[error("Invalid proxy `{value}`: {source}")]
    #[diagnostic(
        code(provfind_cli::invalid_proxy),
        help("Proxies look like `http://host:port` or `socks5://host:port`")
    )]
    InvalidProxy {
        value: String,
        source: Box<ureq::Error>,
    },

    #[error("Failed to serialize output: {0}")]
    #[diagnostic(code(provfind_cli::json))]
    Json(#[from] serde_json::Error),
}

pub type CliResult<T> = std::result::Result<T, CliError>;
