//! Causes wrapped in [`FindError::QueryFailed`](provfind_core::FindError).

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum RegistryError {
    #[error("Registry responded with HTTP {status} for {url}")]
    #[diagnostic(code(provfind_registry::http_status))]
    HttpStatus { status: u16, url: String },

    #[error("Invalid registry response from {url}: {source}")]
    #[diagnostic(
        code(provfind_registry::json),
        help("The registry may not implement the providers.v1 protocol")
    )]
    InvalidResponse {
        url: String,
        source: serde_json::Error,
    },

    #[error("Invalid {field} `{value}` in registry response: {source}")]
    #[diagnostic(code(provfind_registry::invalid_url))]
    InvalidUrl {
        field: &'static str,
        value: String,
        source: url::ParseError,
    },

    #[error("Invalid SHA-256 checksum `{0}` in registry response")]
    #[diagnostic(code(provfind_registry::invalid_checksum))]
    InvalidChecksum(String),

    #[error("Registry answered with a package for {answered} when {requested} was requested")]
    #[diagnostic(code(provfind_registry::platform_mismatch))]
    PlatformMismatch { requested: String, answered: String },

    #[error("Registry response has an empty {0}")]
    #[diagnostic(code(provfind_registry::missing_field))]
    MissingField(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RegistryError::HttpStatus {
            status: 502,
            url: "https://registry.example.com/v1/providers/acme/widget/versions".into(),
        };
        assert_eq!(
            err.to_string(),
            "Registry responded with HTTP 502 for https://registry.example.com/v1/providers/acme/widget/versions"
        );

        let err = RegistryError::InvalidChecksum("abc".into());
        assert_eq!(
            err.to_string(),
            "Invalid SHA-256 checksum `abc` in registry response"
        );

        let err = RegistryError::PlatformMismatch {
            requested: "linux_amd64".into(),
            answered: "windows_386".into(),
        };
        assert_eq!(
            err.to_string(),
            "Registry answered with a package for windows_386 when linux_amd64 was requested"
        );

        let err = RegistryError::MissingField("filename");
        assert_eq!(err.to_string(), "Registry response has an empty filename");
    }
}
