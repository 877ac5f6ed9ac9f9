//! One-shot download of the raw feed document to disk.
//!
//! Used by scheduled jobs that publish a static copy of the feed. A failed
//! download never destroys the previous snapshot.

use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::util::atomic_write;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Request timed out")]
    Timeout,
    #[error("Failed to write snapshot: {0}")]
    Io(#[from] std::io::Error),
}

/// What happened to the file on disk when a download failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFallback {
    /// An earlier snapshot exists and was left untouched.
    KeptPrevious,
    /// No earlier snapshot existed; an empty file was written in its place.
    WroteEmpty,
}

/// Download `url` and store the body at `path`.
///
/// On failure the previous snapshot is kept, or an empty file is created when
/// there is none, so consumers always find a file. The original error is
/// still returned together with the fallback that was applied.
pub async fn save_snapshot(
    client: &reqwest::Client,
    url: &str,
    path: &Path,
    timeout: Duration,
) -> Result<usize, (SnapshotError, SnapshotFallback)> {
    match download(client, url, path, timeout).await {
        Ok(len) => {
            tracing::info!(path = %path.display(), bytes = len, "Feed snapshot saved");
            Ok(len)
        }
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Feed snapshot failed");
            let fallback = if path.exists() {
                SnapshotFallback::KeptPrevious
            } else {
                if let Err(write_err) = write_empty(path) {
                    tracing::warn!(
                        path = %path.display(),
                        error = %write_err,
                        "Failed to write empty placeholder snapshot"
                    );
                }
                SnapshotFallback::WroteEmpty
            };
            Err((e, fallback))
        }
    }
}

async fn download(
    client: &reqwest::Client,
    url: &str,
    path: &Path,
    timeout: Duration,
) -> Result<usize, SnapshotError> {
    let response = tokio::time::timeout(timeout, client.get(url).send())
        .await
        .map_err(|_| SnapshotError::Timeout)??;
    if !response.status().is_success() {
        return Err(SnapshotError::HttpStatus(response.status().as_u16()));
    }
    let body = tokio::time::timeout(timeout, response.bytes())
        .await
        .map_err(|_| SnapshotError::Timeout)??;

    ensure_parent(path)?;
    atomic_write(path, &body)?;
    Ok(body.len())
}

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

fn write_empty(path: &Path) -> std::io::Result<()> {
    ensure_parent(path)?;
    std::fs::write(path, "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn temp_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("quotewall_snapshot_{name}"));
        std::fs::remove_dir_all(&dir).ok();
        dir
    }

    #[tokio::test]
    async fn writes_body_and_creates_directories() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<rss/>"))
            .mount(&server)
            .await;

        let dir = temp_dir("ok");
        let path = dir.join("data").join("feed.xml");
        let len = save_snapshot(
            &reqwest::Client::new(),
            &server.uri(),
            &path,
            Duration::from_secs(2),
        )
        .await
        .unwrap();

        assert_eq!(len, 6);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<rss/>");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn failure_keeps_previous_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let dir = temp_dir("keep");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("feed.xml");
        std::fs::write(&path, "previous").unwrap();

        let (err, fallback) = save_snapshot(
            &reqwest::Client::new(),
            &server.uri(),
            &path,
            Duration::from_secs(2),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, SnapshotError::HttpStatus(502)));
        assert_eq!(fallback, SnapshotFallback::KeptPrevious);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn failure_without_previous_writes_empty_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = temp_dir("empty");
        let path = dir.join("feed.xml");

        let (_, fallback) = save_snapshot(
            &reqwest::Client::new(),
            &server.uri(),
            &path,
            Duration::from_secs(2),
        )
        .await
        .unwrap_err();

        assert_eq!(fallback, SnapshotFallback::WroteEmpty);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
        std::fs::remove_dir_all(&dir).ok();
    }
}
