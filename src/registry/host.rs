//! Repository hosting provider capability

use std::io::Read;

use super::reference::RepositoryReference;
use super::tag::Tag;
use crate::error::ResolveError;

/// A manifest body together with where it was actually served from
#[derive(Debug, Clone)]
pub struct FetchedManifest {
    /// Raw manifest text
    pub body: String,
    /// URL that was requested
    pub url: String,
    /// Repository the body came from once redirects are followed
    pub reference: RepositoryReference,
}

/// Operations the resolver needs from a hosting provider
///
/// Matching and normalization never depend on the provider, so adding a
/// host only means implementing this trait.
pub trait RepositoryHost {
    /// Every tag of the repository, in the order the provider lists them
    fn list_tags(&self, reference: &RepositoryReference) -> Result<Vec<Tag>, ResolveError>;

    /// The manifest of `reference` at `git_ref`
    fn fetch_manifest_at(
        &self,
        reference: &RepositoryReference,
        git_ref: &str,
    ) -> Result<FetchedManifest, ResolveError>;

    /// Stream the `archive_type` archive of `tag`
    fn fetch_archive(
        &self,
        tag: &Tag,
        archive_type: &str,
    ) -> Result<Box<dyn Read + Send>, ResolveError>;

    /// Ref used for manifest fetches when no tag is selected
    fn default_ref(&self) -> &str;
}
