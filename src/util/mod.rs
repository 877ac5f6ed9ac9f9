//! Small shared helpers: terminal-safe text handling, URL checks and atomic
//! file writes.

mod fs;
mod text;
mod url_validator;

pub use fs::atomic_write;
pub use text::{display_width, strip_control_chars, truncate_to_width, wrap_to_width};
pub use url_validator::{validate_http_url, UrlValidationError};
