use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    #[error("URL has no host")]
    MissingHost,
}

/// Parse `url_str` and require an `http`/`https` URL with a host.
///
/// Used for configured feed and proxy URLs, and before handing a post link
/// to the system browser so a feed cannot make us launch `file://` or
/// custom-scheme handlers.
///
/// # Examples
///
/// ```
/// use quotewall::util::validate_http_url;
///
/// assert!(validate_http_url("https://example.com/feed.xml").is_ok());
/// assert!(validate_http_url("file:///etc/passwd").is_err());
/// assert!(validate_http_url("not a url").is_err());
/// ```
pub fn validate_http_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(url)
}
