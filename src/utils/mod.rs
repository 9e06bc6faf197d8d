//! Terminal helpers

pub mod prompt;
