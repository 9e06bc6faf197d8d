//! Tags returned by the hosting provider

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

const BALL_URL_SUFFIX: &str = "ball_url";

/// A named release point and its downloadable archives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Tag name (e.g. "1.2.3", "v1.2.3")
    pub name: String,
    /// Archive type ("zip", "tar") to download URL
    pub archive_urls: BTreeMap<String, String>,
    /// Commit the tag points to
    pub commit: Option<String>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            archive_urls: BTreeMap::new(),
            commit: None,
        }
    }

    pub fn with_archive(mut self, archive_type: impl Into<String>, url: impl Into<String>) -> Self {
        self.archive_urls.insert(archive_type.into(), url.into());
        self
    }

    /// Download URL for `archive_type`, if the provider offers one
    pub fn archive_url(&self, archive_type: &str) -> Option<&str> {
        self.archive_urls.get(archive_type).map(String::as_str)
    }
}

/// Wire shape of a GitHub tag record:
/// `{"name": "...", "zipball_url": "...", "tarball_url": "...", "commit": {"sha": "..."}}`
#[derive(Deserialize)]
struct TagRecord {
    name: String,
    #[serde(default)]
    commit: Option<CommitRecord>,
    #[serde(flatten)]
    fields: BTreeMap<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct CommitRecord {
    sha: String,
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = TagRecord::deserialize(deserializer)?;

        let archive_urls = record
            .fields
            .into_iter()
            .filter_map(|(key, value)| {
                let archive_type = key.strip_suffix(BALL_URL_SUFFIX)?;
                match value {
                    serde_json::Value::String(url) if !archive_type.is_empty() => {
                        Some((archive_type.to_string(), url))
                    }
                    _ => None,
                }
            })
            .collect();

        Ok(Tag {
            name: record.name,
            archive_urls,
            commit: record.commit.map(|c| c.sha),
        })
    }
}
