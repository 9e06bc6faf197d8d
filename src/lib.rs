//! bowerhub - Bower package resolution against GitHub
//!
//! Resolves a repository reference plus a version constraint to a tagged
//! release, and fetches that release's `bower.json` and archive.
//!
//! ## Architecture
//!
//! ```text
//! registry::Resolver → registry::GithubHost → transport::HttpTransport (reqwest)
//! ```

pub mod config;
pub mod error;
pub mod manifest;
pub mod registry;
pub mod transport;
pub mod utils;

pub use config::ResolverConfig;
pub use error::{FetchFailure, ResolveError, TransportError};
pub use manifest::Manifest;
pub use registry::{
    GithubHost, ManifestRequest, RepositoryHost, RepositoryReference, Resolution, Resolver, Tag,
};
pub use transport::{HttpTransport, Transport, TransportResponse};
