//! Resolver configuration
//!
//! Settings are read from `config.toml` in the bowerhub home directory
//! (`$BOWERHUB_HOME`, else `~/.bowerhub`) and then overridden by the
//! environment.
//!
//! ```toml
//! api_base_url = "https://github.example.com/api/v3"
//! manifest_file = "bower.json"
//! default_ref = "master"
//! tags_per_page = 100
//! timeout_secs = 30
//! connect_timeout_secs = 10
//! token = "ghp_..."
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Default GitHub REST API endpoint
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
/// Manifest file fetched from the raw-content host
pub const DEFAULT_MANIFEST_FILE: &str = "bower.json";
/// Ref used when no tag has been selected
pub const DEFAULT_REF: &str = "master";

/// Largest page the GitHub API serves; bigger requests are truncated to it
pub const MAX_TAGS_PER_PAGE: u32 = 100;

const ENV_HOME: &str = "BOWERHUB_HOME";
const ENV_API_URL: &str = "BOWERHUB_API_URL";
const ENV_TOKEN: &str = "BOWERHUB_TOKEN";
const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";

/// Configuration for the GitHub host and its HTTP transport
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ResolverConfig {
    /// Base URL of the GitHub REST API
    pub api_base_url: String,

    /// Name of the package manifest inside the repository
    pub manifest_file: String,

    /// Ref used for manifest fetches before a tag is matched
    pub default_ref: String,

    /// Page size requested from the tag listing endpoint (1 to 100)
    pub tags_per_page: u32,

    /// User-Agent header (GitHub rejects requests without one)
    pub user_agent: String,

    /// Whole-request timeout
    pub timeout_secs: u64,

    /// Connection timeout
    pub connect_timeout_secs: u64,

    /// Personal access token sent to the API host
    pub token: Option<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            manifest_file: DEFAULT_MANIFEST_FILE.to_string(),
            default_ref: DEFAULT_REF.to_string(),
            tags_per_page: 100,
            user_agent: format!("bowerhub/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            token: None,
        }
    }
}

impl ResolverConfig {
    /// Load from the home directory config file (if any) and the environment
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        let config = if path.exists() {
            Self::load_from_path(&path)?
        } else {
            Self::default()
        };
        config.with_env_overrides()
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse config.toml")?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `BOWERHUB_API_URL` and `BOWERHUB_TOKEN` / `GITHUB_TOKEN`
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Some(url) = non_empty_env(ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(token) = non_empty_env(ENV_TOKEN).or_else(|| non_empty_env(ENV_GITHUB_TOKEN)) {
            self.token = Some(token);
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject values the resolver cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.tags_per_page == 0 || self.tags_per_page > MAX_TAGS_PER_PAGE {
            bail!(
                "tags_per_page must be between 1 and {}, got {}",
                MAX_TAGS_PER_PAGE,
                self.tags_per_page
            );
        }
        if self.manifest_file.trim().is_empty() {
            bail!("manifest_file cannot be empty");
        }
        if self.default_ref.trim().is_empty() {
            bail!("default_ref cannot be empty");
        }
        if !self.api_base_url.starts_with("https://") && !self.api_base_url.starts_with("http://") {
            bail!(
                "api_base_url must be an http(s) URL, got '{}'",
                self.api_base_url
            );
        }
        Ok(())
    }

    /// API base URL without a trailing slash
    pub fn api_base(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    /// Page size actually requested, kept within what the API serves
    pub fn page_size(&self) -> u32 {
        self.tags_per_page.clamp(1, MAX_TAGS_PER_PAGE)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Path of `config.toml` in the bowerhub home directory
    pub fn config_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    fn home_dir() -> PathBuf {
        if let Some(home) = non_empty_env(ENV_HOME) {
            PathBuf::from(home)
        } else if let Some(dirs) = directories::BaseDirs::new() {
            dirs.home_dir().join(".bowerhub")
        } else {
            PathBuf::from(".bowerhub")
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn clear_env() {
        for key in [ENV_HOME, ENV_API_URL, ENV_TOKEN, ENV_GITHUB_TOKEN] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.api_base(), "https://api.github.com");
        assert_eq!(config.manifest_file, "bower.json");
        assert_eq!(config.default_ref, "master");
        assert_eq!(config.tags_per_page, 100);
        assert!(config.user_agent.starts_with("bowerhub/"));
        assert!(config.token.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_file_keeps_defaults() {
        let config = ResolverConfig::parse(
            r#"
api_base_url = "https://github.example.com/api/v3/"
tags_per_page = 30
"#,
        )
        .unwrap();
        assert_eq!(config.api_base(), "https://github.example.com/api/v3");
        assert_eq!(config.tags_per_page, 30);
        assert_eq!(config.manifest_file, "bower.json");
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_parse_rejects_zero_page_size() {
        let err = ResolverConfig::parse("tags_per_page = 0").unwrap_err();
        assert!(err.to_string().contains("tags_per_page"));
    }

    #[test]
    fn test_parse_rejects_page_size_above_api_limit() {
        let err = ResolverConfig::parse("tags_per_page = 200").unwrap_err();
        assert!(format!("{:#}", err).contains("between 1 and 100"));
        assert_eq!(ResolverConfig::parse("tags_per_page = 100").unwrap().tags_per_page, 100);
    }

    #[test]
    fn test_page_size_is_clamped() {
        let config = ResolverConfig {
            tags_per_page: 500,
            ..ResolverConfig::default()
        };
        assert_eq!(config.page_size(), MAX_TAGS_PER_PAGE);
        let config = ResolverConfig {
            tags_per_page: 0,
            ..ResolverConfig::default()
        };
        assert_eq!(config.page_size(), 1);
    }

    #[test]
    fn test_parse_rejects_empty_manifest_file() {
        assert!(ResolverConfig::parse("manifest_file = \"  \"").is_err());
    }

    #[test]
    fn test_parse_rejects_non_http_api_url() {
        assert!(ResolverConfig::parse("api_base_url = \"ftp://example.com\"").is_err());
    }

    #[test]
    fn test_load_from_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "manifest_file = \"component.json\"\n").unwrap();

        let config = ResolverConfig::load_from_path(&path).unwrap();
        assert_eq!(config.manifest_file, "component.json");
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let temp = TempDir::new().unwrap();
        let err = ResolverConfig::load_from_path(temp.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read configuration"));
    }

    #[test]
    #[serial]
    fn test_load_uses_home_and_env_overrides() {
        clear_env();
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("config.toml"),
            "api_base_url = \"https://file.example.com\"\ntoken = \"from-file\"\n",
        )
        .unwrap();
        std::env::set_var(ENV_HOME, temp.path());

        let config = ResolverConfig::load().unwrap();
        assert_eq!(config.api_base_url, "https://file.example.com");
        assert_eq!(config.token.as_deref(), Some("from-file"));

        std::env::set_var(ENV_API_URL, "https://env.example.com");
        std::env::set_var(ENV_GITHUB_TOKEN, "from-github-env");
        let config = ResolverConfig::load().unwrap();
        assert_eq!(config.api_base_url, "https://env.example.com");
        assert_eq!(config.token.as_deref(), Some("from-github-env"));

        std::env::set_var(ENV_TOKEN, "from-bowerhub-env");
        let config = ResolverConfig::load().unwrap();
        assert_eq!(config.token.as_deref(), Some("from-bowerhub-env"));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_without_file_uses_defaults() {
        clear_env();
        let temp = TempDir::new().unwrap();
        std::env::set_var(ENV_HOME, temp.path());

        let config = ResolverConfig::load().unwrap();
        assert_eq!(config, ResolverConfig::default());

        clear_env();
    }
}
