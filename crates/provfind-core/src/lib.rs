//! Provider version listing and download location resolution.
//!
//! The entry point is [`Source`], which for every call discovers the
//! provider registry service of a hostname, looks up credentials for it,
//! builds a [`RegistryClient`] and then either lists the provider's
//! versions or resolves the package for one version and platform.
//!
//! Discovery, credential storage and the registry wire protocol are
//! capability traits (see [`traits`]) so they can be swapped for fakes.
//!
//! # Example
//!
//! ```no_run
//! use provfind_core::{Platform, Provider, Source};
//!
//! fn newest(source: &Source) -> provfind_core::Result<()> {
//!     let provider: Provider = "hashicorp/aws".parse().unwrap();
//!     let versions = source.available_versions(&provider)?;
//!     if let Some(version) = versions.newest() {
//!         let meta = source.download_location(&provider, version, &Platform::current())?;
//!         println!("{}", meta.location);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod package;
pub mod platform;
pub mod provider;
pub mod source;
pub mod traits;
pub mod version;

pub use error::{BoxError, FindError, Result};
pub use package::{PackageMeta, SigningKey};
pub use platform::{Platform, CURRENT_PLATFORM};
pub use provider::{AddressError, Hostname, Provider, DEFAULT_REGISTRY_HOST};
pub use source::Source;
pub use traits::{
    ClientFactory, Credentials, CredentialsSource, Discovery, RegistryClient, ServiceHost,
    ServiceId, ServiceUrlError, PROVIDERS_V1,
};
pub use version::{InvalidVersion, Version, VersionList};
