//! Repository references and URL normalization
//!
//! Bower packages point at GitHub repositories through several historical
//! URL shapes:
//! - `git://github.com/user/repo.git`
//! - `https://github.com/user/repo` (with or without `.git`)
//! - `https://raw.github.com/user/repo` (raw-content host)
//! - `github:user/repo`, `gh:user/repo`, or bare `user/repo`
//!
//! All of them canonicalize to a [`RepositoryReference`], which renders the
//! web form (`https://github.com/user/repo`) for homepages and the
//! raw-content form (`https://raw.github.com/user/repo`) for manifests.

use std::fmt;

use crate::error::ResolveError;

const GIT_SCHEME: &str = "git://";
const HTTPS_SCHEME: &str = "https://";
const HTTP_SCHEME: &str = "http://";
const RAW_PREFIX: &str = "raw.";
const WEB_HOST: &str = "github.com";

/// Host prefixes recognized by [`strip_host_prefixes`], in priority order
const GITHUB_HOST_PREFIXES: &[&str] = &[
    "github.com/",
    "raw.github.com/",
    "raw.githubusercontent.com/",
    "www.github.com/",
];

/// Canonicalize a repository URL
///
/// Strips a trailing `.git`, rewrites `git://` to `https://` and, when
/// `raw_content` is set, moves the URL onto the `raw.` subdomain. Applying
/// it twice with the same flag gives the same result.
///
/// ```
/// use bowerhub::registry::normalize;
///
/// assert_eq!(
///     normalize("git://github.com/jquery/jquery.git", true),
///     "https://raw.github.com/jquery/jquery"
/// );
/// assert_eq!(
///     normalize("git://github.com/jquery/jquery.git", false),
///     "https://github.com/jquery/jquery"
/// );
/// ```
pub fn normalize(url: &str, raw_content: bool) -> String {
    let url = url.trim().trim_end_matches(".git");

    let rest = match url.strip_prefix(GIT_SCHEME) {
        Some(rest) => rest,
        None => match url.strip_prefix(HTTPS_SCHEME) {
            Some(rest) => rest,
            // Unknown scheme: only the suffix rule applies
            None => return url.to_string(),
        },
    };

    if raw_content && !rest.starts_with(RAW_PREFIX) {
        format!("{}{}{}", HTTPS_SCHEME, RAW_PREFIX, rest)
    } else {
        format!("{}{}", HTTPS_SCHEME, rest)
    }
}

/// Reduce any accepted URL shape to its `owner/repo` path
///
/// ```
/// use bowerhub::registry::strip_host_prefixes;
///
/// assert_eq!(strip_host_prefixes("git://github.com/a/b.git").unwrap(), "a/b");
/// assert_eq!(strip_host_prefixes("https://raw.github.com/a/b.git").unwrap(), "a/b");
/// assert!(strip_host_prefixes("https://gitlab.com/a/b").is_err());
/// ```
pub fn strip_host_prefixes(url: &str) -> Result<String, ResolveError> {
    let trimmed = url.trim();
    let mut rest = trimmed;
    for scheme in [GIT_SCHEME, HTTPS_SCHEME, HTTP_SCHEME] {
        if let Some(stripped) = rest.strip_prefix(scheme) {
            rest = stripped;
            break;
        }
    }

    let path = GITHUB_HOST_PREFIXES
        .iter()
        .find_map(|prefix| rest.strip_prefix(prefix))
        .ok_or_else(|| ResolveError::malformed(trimmed))?;

    split_owner_repo(path).ok_or_else(|| ResolveError::malformed(trimmed))
}

/// `owner/repo[/...][.git]` -> `owner/repo`
fn split_owner_repo(path: &str) -> Option<String> {
    let mut segments = path.split('/');
    let owner = segments.next()?;
    let repo = segments.next()?;
    let repo = repo.trim_end_matches(".git");

    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    Some(format!("{}/{}", owner, repo))
}

/// Canonical identity of a GitHub-hosted repository
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryReference {
    owner: String,
    repo: String,
}

impl RepositoryReference {
    /// Parse a URL or shorthand into a reference
    ///
    /// ```
    /// use bowerhub::registry::RepositoryReference;
    ///
    /// let reference = RepositoryReference::parse("gh:twbs/bootstrap").unwrap();
    /// assert_eq!(reference.web_url(), "https://github.com/twbs/bootstrap");
    /// assert_eq!(reference.raw_url(), "https://raw.github.com/twbs/bootstrap");
    /// ```
    pub fn parse(input: &str) -> Result<Self, ResolveError> {
        let input = input.trim();

        if let Some((prefix, rest)) = input.split_once(':') {
            if matches!(prefix.to_lowercase().as_str(), "github" | "gh") {
                return Self::from_path(rest).ok_or_else(|| ResolveError::malformed(input));
            }
        }

        // Bare owner/repo assumes GitHub
        if !input.contains(':') && input.matches('/').count() == 1 {
            return Self::from_path(input).ok_or_else(|| ResolveError::malformed(input));
        }

        let path = strip_host_prefixes(input)?;
        Self::from_path(&path).ok_or_else(|| ResolveError::malformed(input))
    }

    /// Parse a URL after normalizing it
    ///
    /// The flag selects which form the input is normalized to, which does
    /// not change the parsed identity: the raw-content and web host both
    /// map to the same repository.
    pub fn from_url(url: &str, raw_content: bool) -> Result<Self, ResolveError> {
        Self::parse(&normalize(url, raw_content))
    }

    /// Recover the repository from the post-redirect manifest URL
    ///
    /// `https://raw.github.com/less/less.js/master/bower.json` with ref
    /// `master` and file `bower.json` becomes `less/less.js`. A URL that
    /// does not end in `/<ref>/<file>` is parsed as a repository URL.
    pub fn from_effective_manifest_url(
        url: &str,
        git_ref: &str,
        manifest_file: &str,
    ) -> Result<Self, ResolveError> {
        let suffix = format!("/{}/{}", git_ref, manifest_file);
        let base = url.strip_suffix(suffix.as_str()).unwrap_or(url);
        Self::parse(base)
    }

    fn from_path(path: &str) -> Option<Self> {
        let owner_repo = split_owner_repo(path.trim())?;
        let (owner, repo) = owner_repo.split_once('/')?;
        Some(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// `owner/repo`
    pub fn path(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// `https://github.com/owner/repo`
    pub fn web_url(&self) -> String {
        format!("{}{}/{}", HTTPS_SCHEME, WEB_HOST, self.path())
    }

    /// `https://raw.github.com/owner/repo`
    pub fn raw_url(&self) -> String {
        normalize(&self.web_url(), true)
    }

    /// Web or raw-content form
    pub fn url(&self, raw_content: bool) -> String {
        if raw_content {
            self.raw_url()
        } else {
            self.web_url()
        }
    }
}

impl fmt::Display for RepositoryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.web_url())
    }
}

impl std::str::FromStr for RepositoryReference {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
