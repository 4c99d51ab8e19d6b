//! Client for the provider registry protocol (`providers.v1`).
//!
//! [`HttpRegistryClient`] talks to one registry endpoint as found by service
//! discovery:
//!
//! - `GET {base}{namespace}/{type}/versions` lists published versions
//! - `GET {base}{namespace}/{type}/{version}/download/{os}/{arch}` describes
//!   one package
//!
//! Responses are classified into [`FindError`](provfind_core::FindError)
//! kinds so a [`Source`](provfind_core::Source) can pass them through
//! unchanged.
//!
//! # Example
//!
//! ```no_run
//! use provfind_core::Source;
//! use provfind_disco::{CredentialsChain, Disco};
//! use provfind_registry::HttpClientFactory;
//!
//! let source = Source::new(Disco::new(), CredentialsChain::new(), HttpClientFactory);
//! let provider = "hashicorp/random".parse().unwrap();
//! for version in &source.available_versions(&provider).unwrap() {
//!     println!("{version}");
//! }
//! ```

pub mod client;
pub mod error;
pub mod response;

pub use client::{HttpClientFactory, HttpRegistryClient};
pub use error::RegistryError;
