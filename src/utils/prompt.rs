//! Console prompt text

use console::style;

/// Default separator between a question and the user's answer
pub const DEFAULT_SEPARATOR: &str = ":";

/// Build the text for asking a question, e.g. `Do you want to continue [yes]: `
///
/// The question is styled as info (green) and the default as a comment
/// (yellow); styling is dropped when the terminal has no color support.
pub fn question(question: &str, default: Option<&str>, separator: &str) -> String {
    match default {
        Some(default) => format!(
            "{} [{}]{} ",
            style(question).green(),
            style(default).yellow(),
            separator
        ),
        None => format!("{}{} ", style(question).green(), separator),
    }
}
