//! Repository resolution
//!
//! This module provides:
//! - Canonical repository references over the historical GitHub URL shapes
//! - Constraint-to-glob normalization and tag matching
//! - Manifest and release archive retrieval through a [`RepositoryHost`]
//!
//! # Overview
//!
//! ```text
//! Resolver ──► RepositoryHost (GithubHost) ──► Transport (HttpTransport)
//!    │
//!    └─ Constraint, RepositoryReference
//! ```
//!
//! A caller points a [`Resolver`] at a repository, asks it for the tag
//! matching a constraint, then fetches that tag's manifest or archive.

mod constraint;
mod github;
mod host;
mod reference;
mod resolver;
mod tag;

pub use constraint::{normalize_constraint, Constraint, ANY_VERSION};
pub use github::GithubHost;
pub use host::{FetchedManifest, RepositoryHost};
pub use reference::{normalize, strip_host_prefixes, RepositoryReference};
pub use resolver::{ManifestRequest, Resolution, Resolver, DEFAULT_ARCHIVE_TYPE};
pub use tag::Tag;
