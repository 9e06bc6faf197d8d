//! GitHub repository host
//!
//! - tags: `<api>/repos/<owner>/<repo>/tags?per_page=N&page=K`
//! - manifests: `https://raw.github.com/<owner>/<repo>/<ref>/bower.json`
//! - archives: the `zipball_url` / `tarball_url` of each tag

use std::io::Read;

use anyhow::Result;

use super::host::{FetchedManifest, RepositoryHost};
use super::reference::RepositoryReference;
use super::tag::Tag;
use crate::config::ResolverConfig;
use crate::error::ResolveError;
use crate::transport::{HttpTransport, Transport};

/// [`RepositoryHost`] for github.com (or GitHub Enterprise via `api_base_url`)
#[derive(Debug, Clone)]
pub struct GithubHost<T> {
    transport: T,
    config: ResolverConfig,
}

impl GithubHost<HttpTransport> {
    /// Host backed by a real HTTP client built from `config`
    pub fn from_config(config: ResolverConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::new(transport, config))
    }
}

impl<T: Transport> GithubHost<T> {
    pub fn new(transport: T, config: ResolverConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// URL of one page of the tag listing
    pub fn tags_url(&self, reference: &RepositoryReference, page: u32) -> String {
        format!(
            "{}/repos/{}/{}/tags?per_page={}&page={}",
            self.config.api_base(),
            reference.owner(),
            reference.repo(),
            self.config.page_size(),
            page
        )
    }

    /// URL of the manifest at `git_ref`
    pub fn manifest_url(&self, reference: &RepositoryReference, git_ref: &str) -> String {
        format!(
            "{}/{}/{}",
            reference.raw_url(),
            git_ref,
            self.config.manifest_file
        )
    }

    fn fetch_tag_page(&self, url: &str) -> Result<Vec<Tag>, ResolveError> {
        let body = self
            .transport
            .get(url)
            .and_then(|response| response.text())
            .map_err(|e| ResolveError::unreachable(url, e))?;

        serde_json::from_str(&body).map_err(|e| ResolveError::unreachable(url, e))
    }
}

impl<T: Transport> RepositoryHost for GithubHost<T> {
    /// Pages are fetched until one comes back short, so first-match always
    /// sees the full listing.
    fn list_tags(&self, reference: &RepositoryReference) -> Result<Vec<Tag>, ResolveError> {
        let per_page = self.config.page_size() as usize;
        let mut tags = Vec::new();
        let mut page = 1;

        loop {
            let url = self.tags_url(reference, page);
            let batch = self.fetch_tag_page(&url)?;
            let count = batch.len();
            tracing::debug!(repo = %reference.path(), page, count, "fetched tag page");

            tags.extend(batch);
            if count < per_page {
                break;
            }
            page += 1;
        }

        if tags.is_empty() {
            tracing::warn!(repo = %reference.path(), "repository has no tags");
        }
        Ok(tags)
    }

    fn fetch_manifest_at(
        &self,
        reference: &RepositoryReference,
        git_ref: &str,
    ) -> Result<FetchedManifest, ResolveError> {
        let url = self.manifest_url(reference, git_ref);
        let response = self
            .transport
            .get(&url)
            .map_err(|e| ResolveError::unreachable(&url, e))?;

        let effective_url = response.effective_url.clone();
        let body = response
            .text()
            .map_err(|e| ResolveError::unreachable(&url, e))?;

        let served_from = match RepositoryReference::from_effective_manifest_url(
            &effective_url,
            git_ref,
            &self.config.manifest_file,
        ) {
            Ok(served_from) => served_from,
            Err(_) => {
                tracing::warn!(
                    url = %effective_url,
                    "redirect target is not a GitHub repository, keeping {}",
                    reference
                );
                reference.clone()
            }
        };

        Ok(FetchedManifest {
            body,
            url,
            reference: served_from,
        })
    }

    fn fetch_archive(
        &self,
        tag: &Tag,
        archive_type: &str,
    ) -> Result<Box<dyn Read + Send>, ResolveError> {
        let url = tag
            .archive_url(archive_type)
            .ok_or_else(|| ResolveError::ArchiveUnavailable {
                tag: tag.name.clone(),
                archive_type: archive_type.to_string(),
            })?;

        let response = self
            .transport
            .get(url)
            .map_err(|e| ResolveError::unreachable(url, e))?;
        Ok(response.body)
    }

    fn default_ref(&self) -> &str {
        &self.config.default_ref
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchFailure, TransportError};
    use crate::transport::mock::MockTransport;

    fn config(per_page: u32) -> ResolverConfig {
        ResolverConfig {
            tags_per_page: per_page,
            ..ResolverConfig::default()
        }
    }

    fn reference() -> RepositoryReference {
        RepositoryReference::parse("jquery/jquery").unwrap()
    }

    #[test]
    fn test_urls() {
        let host = GithubHost::new(MockTransport::new(), config(100));
        assert_eq!(
            host.tags_url(&reference(), 1),
            "https://api.github.com/repos/jquery/jquery/tags?per_page=100&page=1"
        );
        assert_eq!(
            host.manifest_url(&reference(), "2.1.0"),
            "https://raw.github.com/jquery/jquery/2.1.0/bower.json"
        );
    }

    #[test]
    fn test_list_tags_aggregates_pages() {
        let transport = MockTransport::new()
            .with(
                "https://api.github.com/repos/jquery/jquery/tags?per_page=2&page=1",
                r#"[{"name":"3.0.0"},{"name":"2.2.0"}]"#,
            )
            .with(
                "https://api.github.com/repos/jquery/jquery/tags?per_page=2&page=2",
                r#"[{"name":"2.1.0"}]"#,
            );
        let host = GithubHost::new(transport, config(2));

        let tags = host.list_tags(&reference()).unwrap();
        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["3.0.0", "2.2.0", "2.1.0"]);
        assert_eq!(host.transport().requests().len(), 2);
    }

    #[test]
    fn test_list_tags_oversized_page_setting_reads_every_page() {
        let full_page: Vec<String> = (0..100)
            .map(|i| format!(r#"{{"name":"2.{}.0"}}"#, i))
            .collect();
        let transport = MockTransport::new()
            .with(
                "https://api.github.com/repos/jquery/jquery/tags?per_page=100&page=1",
                &format!("[{}]", full_page.join(",")),
            )
            .with(
                "https://api.github.com/repos/jquery/jquery/tags?per_page=100&page=2",
                r#"[{"name":"1.0.0"}]"#,
            );
        let host = GithubHost::new(transport, config(200));

        let tags = host.list_tags(&reference()).unwrap();
        assert_eq!(tags.len(), 101);
        assert_eq!(tags.last().unwrap().name, "1.0.0");
        assert_eq!(host.transport().requests().len(), 2);
    }

    #[test]
    fn test_list_tags_stops_on_empty_page() {
        let transport = MockTransport::new()
            .with(
                "https://api.github.com/repos/jquery/jquery/tags?per_page=1&page=1",
                r#"[{"name":"1.0.0"}]"#,
            )
            .with(
                "https://api.github.com/repos/jquery/jquery/tags?per_page=1&page=2",
                "[]",
            );
        let host = GithubHost::new(transport, config(1));
        assert_eq!(host.list_tags(&reference()).unwrap().len(), 1);
    }

    #[test]
    fn test_list_tags_non_json_is_unreachable() {
        let transport = MockTransport::new().with(
            "https://api.github.com/repos/jquery/jquery/tags?per_page=100&page=1",
            "<html>rate limited</html>",
        );
        let host = GithubHost::new(transport, config(100));
        let err = host.list_tags(&reference()).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::RepositoryUnreachable {
                cause: FetchFailure::Decode(_),
                ..
            }
        ));
    }

    #[test]
    fn test_fetch_manifest_follows_redirect() {
        let transport = MockTransport::new().with_redirect(
            "https://raw.github.com/less/less/master/bower.json",
            "https://raw.githubusercontent.com/less/less.js/master/bower.json",
            r#"{"name":"less"}"#,
        );
        let host = GithubHost::new(transport, config(100));
        let less = RepositoryReference::parse("less/less").unwrap();

        let fetched = host.fetch_manifest_at(&less, "master").unwrap();
        assert_eq!(fetched.body, r#"{"name":"less"}"#);
        assert_eq!(fetched.url, "https://raw.github.com/less/less/master/bower.json");
        assert_eq!(fetched.reference.path(), "less/less.js");
    }

    #[test]
    fn test_fetch_manifest_redirect_to_unknown_host_keeps_reference() {
        let transport = MockTransport::new().with_redirect(
            "https://raw.github.com/less/less/master/bower.json",
            "https://cdn.example.com/bower.json",
            "{}",
        );
        let host = GithubHost::new(transport, config(100));
        let less = RepositoryReference::parse("less/less").unwrap();

        let fetched = host.fetch_manifest_at(&less, "master").unwrap();
        assert_eq!(fetched.reference, less);
    }

    #[test]
    fn test_fetch_archive() {
        let transport = MockTransport::new().with(
            "https://api.github.com/repos/jquery/jquery/zipball/2.1.0",
            "PK\u{3}\u{4}",
        );
        let host = GithubHost::new(transport, config(100));
        let tag = Tag::new("2.1.0")
            .with_archive("zip", "https://api.github.com/repos/jquery/jquery/zipball/2.1.0");

        let mut body = Vec::new();
        host.fetch_archive(&tag, "zip")
            .unwrap()
            .read_to_end(&mut body)
            .unwrap();
        assert_eq!(body, b"PK\x03\x04");

        let err = host.fetch_archive(&tag, "tar").err().unwrap();
        assert!(matches!(err, ResolveError::ArchiveUnavailable { .. }));
    }

    #[test]
    fn test_fetch_archive_transport_failure() {
        let transport = MockTransport::new().with_status(
            "https://api.github.com/repos/jquery/jquery/zipball/2.1.0",
            502,
        );
        let host = GithubHost::new(transport, config(100));
        let tag = Tag::new("2.1.0")
            .with_archive("zip", "https://api.github.com/repos/jquery/jquery/zipball/2.1.0");

        match host.fetch_archive(&tag, "zip") {
            Err(ResolveError::RepositoryUnreachable { url, cause }) => {
                assert_eq!(url, "https://api.github.com/repos/jquery/jquery/zipball/2.1.0");
                assert!(matches!(
                    cause,
                    FetchFailure::Transport(TransportError::Status { status: 502, .. })
                ));
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }
}
