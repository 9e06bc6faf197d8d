//! `bower.json` manifests
//!
//! The manifest is kept as an ordered JSON object so that a rewritten
//! document lists its fields in the same order as the source.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

const INDENT: &[u8] = b"    ";

/// Package manifest
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    fields: Map<String, Value>,
}

impl Manifest {
    /// Parse a manifest body; anything but a JSON object is rejected
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        let fields: Map<String, Value> = serde_json::from_str(body)?;
        Ok(Self { fields })
    }

    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    pub fn version(&self) -> Option<&str> {
        self.str_field("version")
    }

    pub fn homepage(&self) -> Option<&str> {
        self.str_field("homepage")
    }

    /// `(name, constraint)` pairs of the `dependencies` object, in source order
    pub fn dependencies(&self) -> Vec<(&str, &str)> {
        self.fields
            .get("dependencies")
            .and_then(Value::as_object)
            .map(|deps| {
                deps.iter()
                    .filter_map(|(name, constraint)| Some((name.as_str(), constraint.as_str()?)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Set or overwrite `homepage`, keeping its position if already present
    pub fn set_homepage(&mut self, homepage: impl Into<String>) {
        self.fields
            .insert("homepage".to_string(), Value::String(homepage.into()));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Pretty-print with four-space indentation
    pub fn to_pretty_string(&self) -> Result<String, serde_json::Error> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(INDENT);
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.fields.serialize(&mut serializer)?;
        // serde_json only ever writes valid UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}
