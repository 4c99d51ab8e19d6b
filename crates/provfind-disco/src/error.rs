use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum DiscoError {
    #[error("Service discovery request to {url} failed: {source}")]
    #[diagnostic(
        code(provfind_disco::network),
        help("Check your internet connection or try again later")
    )]
    Network {
        url: String,
        source: Box<ureq::Error>,
    },

    #[error("Service discovery at {url} returned HTTP {status}")]
    #[diagnostic(code(provfind_disco::http_status))]
    HttpStatus { status: u16, url: String },

    #[error("Invalid service discovery document at {url}: {reason}")]
    #[diagnostic(code(provfind_disco::invalid_document))]
    InvalidDocument { url: String, reason: String },

    #[error("Invalid discovery URL for {hostname}: {source}")]
    #[diagnostic(code(provfind_disco::invalid_url))]
    InvalidUrl {
        hostname: String,
        source: url::ParseError,
    },

    #[error("Invalid {service} URL `{value}` for {hostname}: {reason}")]
    #[diagnostic(code(provfind_disco::invalid_service_url))]
    InvalidServiceUrl {
        hostname: String,
        service: String,
        value: String,
        reason: String,
    },
}
