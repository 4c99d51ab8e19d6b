//! Service discovery and credential lookup for provider registries.
//!
//! [`Disco`] implements [`Discovery`](provfind_core::Discovery) by fetching
//! a host's `/.well-known/terraform.json` document, unless the host has
//! service overrides in the configuration. The [`credentials`] module
//! provides [`CredentialsSource`](provfind_core::CredentialsSource)
//! implementations backed by the configuration file and the environment.
//!
//! All HTTP traffic, including the registry client's, goes through the
//! shared agent in [`http_client`].

pub mod credentials;
pub mod disco;
pub mod error;
pub mod http_client;

pub use credentials::{CredentialsChain, EnvCredentials, StaticCredentials};
pub use disco::{Disco, Host, WELL_KNOWN_PATH};
pub use error::DiscoError;
