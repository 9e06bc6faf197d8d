//! Error types and helpers for user-friendly error messages
//!
//! Every failure the resolver can report is a [`ResolveError`]. Transport
//! failures keep the attempted URL and the underlying cause so callers can
//! decide on their own retry policy.

use thiserror::Error;

/// Failure reported by a [`Transport`](crate::transport::Transport)
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request could not be sent or the response could not be read
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Reading the response body failed
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// A text body was requested but the bytes are not UTF-8
    #[error("response body is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Why a repository endpoint could not be used
#[derive(Error, Debug)]
pub enum FetchFailure {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The body was expected to be JSON but was not
    #[error("invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors produced while resolving a repository reference
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The manifest, tag listing or archive endpoint could not be reached
    #[error("Cannot open {url} ({cause})")]
    RepositoryUnreachable {
        url: String,
        #[source]
        cause: FetchFailure,
    },

    /// The tag listing succeeded but no tag matched the constraint
    #[error("Version {constraint} not found (no tag matches '{pattern}')")]
    VersionNotFound { constraint: String, pattern: String },

    /// The reference does not name a supported host
    #[error("Malformed repository reference: '{reference}'")]
    MalformedReference { reference: String },

    /// A constraint could not be turned into a glob pattern
    #[error("Invalid version constraint '{constraint}'")]
    InvalidConstraint {
        constraint: String,
        #[source]
        source: glob::PatternError,
    },

    /// A release was requested before any tag was matched
    #[error("No tag selected: call find_package before fetching a release")]
    NoTagSelected,

    /// The selected tag has no archive of the requested type
    #[error("Tag {tag} has no {archive_type} archive")]
    ArchiveUnavailable { tag: String, archive_type: String },
}

impl ResolveError {
    pub(crate) fn unreachable(url: impl Into<String>, cause: impl Into<FetchFailure>) -> Self {
        Self::RepositoryUnreachable {
            url: url.into(),
            cause: cause.into(),
        }
    }

    pub(crate) fn malformed(reference: impl Into<String>) -> Self {
        Self::MalformedReference {
            reference: reference.into(),
        }
    }

    /// True for the stable "no tag matched" error kind
    pub fn is_version_not_found(&self) -> bool {
        matches!(self, Self::VersionNotFound { .. })
    }

    /// True when the failure came from the network or a bad response body
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::RepositoryUnreachable { .. })
    }

    /// Actionable hint for this error, if one applies
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::RepositoryUnreachable { cause, .. } => match cause {
                FetchFailure::Transport(TransportError::Status { status: 403, .. }) => {
                    Some(hints::rate_limited())
                }
                FetchFailure::Transport(TransportError::Status { status: 404, .. }) => {
                    Some(hints::not_found())
                }
                FetchFailure::Transport(TransportError::Utf8(_)) => None,
                FetchFailure::Transport(_) => Some(hints::network()),
                FetchFailure::Decode(_) => None,
            },
            Self::VersionNotFound { .. } => Some(hints::version_not_found()),
            Self::MalformedReference { .. } => Some(hints::reference_format()),
            Self::InvalidConstraint { .. } => Some(hints::constraint_format()),
            Self::NoTagSelected => None,
            Self::ArchiveUnavailable { .. } => Some(hints::archive_types()),
        }
    }

    /// Display error with formatting and hints
    pub fn display_with_hints(&self) {
        use console::style;

        eprintln!("\n{} {}", style("ERROR:").red().bold(), self);

        if let Self::RepositoryUnreachable { cause, .. } = self {
            eprintln!("\n{} {}", style("CAUSE:").cyan().bold(), cause);
        }

        if let Some(hint) = self.hint() {
            eprintln!("\n{} {}", style("HINT:").yellow().bold(), hint);
        }

        eprintln!();
    }
}

/// Common error hints
pub mod hints {
    /// Get hint for network failures
    pub fn network() -> &'static str {
        "Check your network connection, or raise timeout_secs in config.toml."
    }

    /// Get hint for a refused API request
    pub fn rate_limited() -> &'static str {
        "The GitHub API refused the request, most likely because of rate limiting.\n\
         Set BOWERHUB_TOKEN (or GITHUB_TOKEN) to a personal access token."
    }

    /// Get hint for a missing repository or ref
    pub fn not_found() -> &'static str {
        "The repository or ref does not exist. Check the owner/repo spelling,\n\
         and whether the repository has a bower.json at that ref."
    }

    /// Get hint for an unmatched version constraint
    pub fn version_not_found() -> &'static str {
        "No tag matches this constraint. List the available versions with\n\
         Resolver::tags() and pick one of them."
    }

    /// Get hint for repository reference formats
    pub fn reference_format() -> &'static str {
        "Supported references:\n\
         • owner/repo\n\
         • github:owner/repo\n\
         • git://github.com/owner/repo.git\n\
         • https://github.com/owner/repo"
    }

    /// Get hint for version constraint formats
    pub fn constraint_format() -> &'static str {
        "Use 1, 1.2, 1.2.3, >=1.2 or * as the version constraint."
    }

    /// Get hint for archive types
    pub fn archive_types() -> &'static str {
        "GitHub tags provide zip and tar archives."
    }
}
