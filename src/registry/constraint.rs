//! Version constraint normalization
//!
//! Bower constraints are matched against tag names as shell globs:
//!
//! | constraint | pattern  |
//! |------------|----------|
//! | `1`        | `1.*.*`  |
//! | `1.2`      | `1.2.*`  |
//! | `1.2.3`    | `1.2.3`  |
//! | `>=1.2`    | `1.2.*`  |
//! | `>=1.2.3`  | `1.2.*`  |
//! | `*`        | `*.*.*`  |
//!
//! `>=` is approximate: it keeps the major.minor prefix and accepts any
//! patch, so `>=1.2.3` also matches `1.2.0`. It is never a numeric bound.

use glob::{MatchOptions, Pattern};

use crate::error::ResolveError;

const MIN_PREFIX: &str = ">=";

/// Constraint used when the caller does not give one
pub const ANY_VERSION: &str = "*";

/// A constraint together with its glob pattern
#[derive(Debug, Clone)]
pub struct Constraint {
    raw: String,
    pattern: Pattern,
}

impl Constraint {
    /// Normalize and compile `raw`
    pub fn parse(raw: &str) -> Result<Self, ResolveError> {
        let normalized = normalize_constraint(raw);
        let pattern = Pattern::new(&normalized).map_err(|source| {
            ResolveError::InvalidConstraint {
                constraint: raw.to_string(),
                source,
            }
        })?;

        Ok(Self {
            raw: raw.to_string(),
            pattern,
        })
    }

    /// The constraint as supplied by the caller
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The glob pattern tag names are matched against
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Shell-style match: `*` spans any characters, dots included
    pub fn matches(&self, tag_name: &str) -> bool {
        self.pattern.matches_with(tag_name, Self::match_options())
    }

    fn match_options() -> MatchOptions {
        MatchOptions {
            case_sensitive: true,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        }
    }
}

/// Turn a constraint string into a glob pattern
///
/// The component count is taken from the untrimmed input, with any `>=`
/// prefix still attached; whitespace is trimmed from the final pattern.
pub fn normalize_constraint(constraint: &str) -> String {
    let bits: Vec<&str> = constraint.split('.').collect();

    let pattern = if let Some(rest) = constraint.strip_prefix(MIN_PREFIX) {
        if bits.len() == 3 {
            let major_minor = rest.rsplit_once('.').map_or(rest, |(head, _)| head);
            format!("{}.*", major_minor)
        } else {
            format!("{}.*", rest)
        }
    } else {
        match bits.len() {
            1 => format!("{}.*.*", constraint),
            2 => format!("{}.*", constraint),
            _ => constraint.to_string(),
        }
    };

    pattern.trim().to_string()
}
