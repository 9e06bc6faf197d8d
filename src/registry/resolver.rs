//! Repository resolution session
//!
//! A [`Resolver`] tracks one package resolution: the repository currently
//! being looked at and the tag most recently matched. Use one resolver per
//! in-flight package; it is not meant to be shared between threads.
//!
//! ```no_run
//! use bowerhub::config::ResolverConfig;
//! use bowerhub::registry::{GithubHost, ManifestRequest, RepositoryReference, Resolver};
//!
//! # fn main() -> anyhow::Result<()> {
//! let host = GithubHost::from_config(ResolverConfig::load()?)?;
//! let mut resolver = Resolver::new(host, RepositoryReference::parse("jquery/jquery")?);
//!
//! let resolution = resolver.find_package("2.1")?;
//! let manifest = resolver.fetch_manifest(resolution.manifest_request().with_homepage())?;
//! let archive = resolver.fetch_release("zip")?;
//! # Ok(())
//! # }
//! ```

use std::io::Read;

use super::constraint::Constraint;
use super::host::RepositoryHost;
use super::reference::RepositoryReference;
use super::tag::Tag;
use crate::error::ResolveError;
use crate::manifest::Manifest;

/// Default archive type for [`Resolver::fetch_release`]
pub const DEFAULT_ARCHIVE_TYPE: &str = "zip";

/// Outcome of a successful [`Resolver::find_package`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Repository the tag was found in
    pub reference: RepositoryReference,
    /// The matched tag
    pub tag: Tag,
}

impl Resolution {
    /// Name of the matched tag
    pub fn version(&self) -> &str {
        &self.tag.name
    }

    /// Manifest request pinned to the matched tag
    pub fn manifest_request(&self) -> ManifestRequest {
        ManifestRequest::new().git_ref(self.tag.name.clone())
    }
}

/// Options for [`Resolver::fetch_manifest`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestRequest {
    /// Ref to read the manifest at; defaults to the selected tag, then the
    /// host's default branch
    pub git_ref: Option<String>,
    /// Rewrite the manifest with a `homepage` field
    pub include_homepage: bool,
    /// Fetch from this repository instead of the current one
    pub override_url: Option<String>,
}

impl ManifestRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn git_ref(mut self, git_ref: impl Into<String>) -> Self {
        self.git_ref = Some(git_ref.into());
        self
    }

    pub fn with_homepage(mut self) -> Self {
        self.include_homepage = true;
        self
    }

    pub fn override_url(mut self, url: impl Into<String>) -> Self {
        self.override_url = Some(url.into());
        self
    }
}

/// Resolves version constraints against the tags of one repository
#[derive(Debug)]
pub struct Resolver<H> {
    host: H,
    reference: RepositoryReference,
    selected: Option<Tag>,
}

impl<H: RepositoryHost> Resolver<H> {
    pub fn new(host: H, reference: RepositoryReference) -> Self {
        Self {
            host,
            reference,
            selected: None,
        }
    }

    /// Resolver for a URL in any accepted shape
    pub fn for_url(host: H, url: &str) -> Result<Self, ResolveError> {
        Ok(Self::new(host, RepositoryReference::parse(url)?))
    }

    /// Point the resolver at another repository; performs no I/O
    ///
    /// The selected tag is kept until the next [`find_package`](Self::find_package).
    pub fn set_reference(&mut self, url: &str, raw_form: bool) -> Result<&mut Self, ResolveError> {
        self.reference = RepositoryReference::from_url(url, raw_form)?;
        Ok(self)
    }

    /// The repository subsequent calls operate on
    pub fn reference(&self) -> &RepositoryReference {
        &self.reference
    }

    /// Tag matched by the last successful [`find_package`](Self::find_package)
    pub fn selected_tag(&self) -> Option<&Tag> {
        self.selected.as_ref()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Fetch the manifest, optionally with an injected `homepage`
    ///
    /// The current reference always moves to the repository the manifest
    /// was actually served from, so a renamed repository is followed by
    /// later calls. With an override URL the homepage still names the
    /// reference the resolver had before the call.
    pub fn fetch_manifest(&mut self, request: ManifestRequest) -> Result<String, ResolveError> {
        let git_ref = request
            .git_ref
            .or_else(|| self.selected.as_ref().map(|tag| tag.name.clone()))
            .unwrap_or_else(|| self.host.default_ref().to_string());

        let original = self.reference.clone();
        let override_url = request.override_url.filter(|url| !url.trim().is_empty());
        let target = match &override_url {
            Some(url) => RepositoryReference::from_url(url, true)?,
            None => original.clone(),
        };

        let fetched = self.host.fetch_manifest_at(&target, &git_ref)?;
        if fetched.reference != target {
            tracing::info!(from = %target, to = %fetched.reference, "repository moved");
        }
        self.reference = fetched.reference;

        if !request.include_homepage {
            return Ok(fetched.body);
        }

        let mut manifest = Manifest::parse(&fetched.body)
            .map_err(|e| ResolveError::unreachable(&fetched.url, e))?;
        let homepage = if override_url.is_some() {
            original
        } else {
            self.reference.clone()
        };
        manifest.set_homepage(homepage.web_url());

        manifest
            .to_pretty_string()
            .map_err(|e| ResolveError::unreachable(&fetched.url, e))
    }

    /// Find the first tag, in provider order, matching `constraint`
    ///
    /// Order is the provider's, not numeric: with tags `2.0.0, 1.5.0, 1.2.0`
    /// the constraint `1` picks `1.5.0` because it is listed first.
    pub fn find_package(&mut self, constraint: &str) -> Result<Resolution, ResolveError> {
        let constraint = Constraint::parse(constraint)?;
        let tags = self.host.list_tags(&self.reference)?;

        let tag = tags
            .into_iter()
            .find(|tag| constraint.matches(&tag.name))
            .ok_or_else(|| ResolveError::VersionNotFound {
                constraint: constraint.raw().to_string(),
                pattern: constraint.pattern().to_string(),
            })?;

        tracing::info!(
            repo = %self.reference.path(),
            constraint = constraint.raw(),
            tag = %tag.name,
            "matched tag"
        );
        self.selected = Some(tag.clone());

        Ok(Resolution {
            reference: self.reference.clone(),
            tag,
        })
    }

    /// All tag names, in provider order
    pub fn tags(&self) -> Result<Vec<String>, ResolveError> {
        let tags = self.host.list_tags(&self.reference)?;
        Ok(tags.into_iter().map(|tag| tag.name).collect())
    }

    /// Stream the release archive of the selected tag
    pub fn fetch_release(&self, archive_type: &str) -> Result<Box<dyn Read + Send>, ResolveError> {
        let tag = self.selected.as_ref().ok_or(ResolveError::NoTagSelected)?;
        self.host.fetch_archive(tag, archive_type)
    }

    /// Stream the release archive of an explicit resolution
    pub fn fetch_release_for(
        &self,
        resolution: &Resolution,
        archive_type: &str,
    ) -> Result<Box<dyn Read + Send>, ResolveError> {
        self.host.fetch_archive(&resolution.tag, archive_type)
    }
}
