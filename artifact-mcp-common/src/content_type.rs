//! Content types for files served or stored by the tools.

use std::path::Path;

use mime_guess::mime;

/// Fallback for unknown or missing extensions.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Guess the content type from the file extension (case-insensitive).
///
/// Text types are labelled UTF-8 so browsers do not guess the charset.
pub fn from_path(path: impl AsRef<Path>) -> String {
    let guessed = mime_guess::from_path(path).first_or_octet_stream();
    if guessed.type_() == mime::TEXT && guessed.get_param(mime::CHARSET).is_none() {
        format!("{}; charset=utf-8", guessed.essence_str())
    } else {
        guessed.to_string()
    }
}
