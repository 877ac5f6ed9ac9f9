use async_trait::async_trait;
use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;

use super::parser::{parse_feed, ParseError};
use super::post::Post;

/// Default deadline for a single attempt (direct or proxied).
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(15);
const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Placeholder replaced by the percent-encoded source URL in proxy templates.
pub const URL_PLACEHOLDER: &str = "{url}";

/// Proxy endpoints tried, in order, after the direct request fails.
pub const DEFAULT_PROXIES: &[&str] = &[
    "https://corsproxy.io/?{url}",
    "https://api.allorigins.win/raw?url={url}",
    "https://api.codetabs.com/v1/proxy?quest={url}",
];

/// Why a single attempt in the fallback chain failed.
#[derive(Debug, Error)]
pub enum AttemptError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP status {0}")]
    HttpStatus(u16),
    /// The attempt exceeded its deadline
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    /// Response body exceeded the 10MB size limit
    #[error("response too large")]
    ResponseTooLarge,
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The document parsed but contained no entries
    #[error("feed contained no posts")]
    Empty,
}

/// One failed attempt, tagged with the endpoint that produced it.
#[derive(Debug)]
pub struct AttemptFailure {
    pub endpoint: String,
    pub error: AttemptError,
}

/// Errors returned by [`FeedFetcher::fetch_feed`].
#[derive(Debug, Error)]
pub enum FetchError {
    /// Every endpoint in the chain failed; failures are listed in attempt order.
    #[error("all {} feed attempts failed: {}", .attempts.len(), join_failures(.attempts))]
    AllAttemptsExhausted { attempts: Vec<AttemptFailure> },
}

fn join_failures(attempts: &[AttemptFailure]) -> String {
    attempts
        .iter()
        .map(|a| format!("{}: {}", a.endpoint, a.error))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Anything that can produce the current list of posts.
///
/// The refresh controller only depends on this seam so tests can drive it
/// with scripted results instead of a live network.
#[async_trait]
pub trait FeedSource: Send + Sync + 'static {
    async fn fetch(&self) -> Result<Vec<Post>, FetchError>;
}

/// A concrete URL to try, with a short label used in logs and error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub label: String,
    pub url: String,
}

/// Wrap `source` in a proxy template.
///
/// Templates containing `{url}` get the encoded source substituted; any other
/// template is treated as a prefix and the encoded source is appended.
pub fn proxied_url(template: &str, source: &str) -> String {
    // byte_serialize writes spaces as `+`; proxies expect `%20` in a component
    let encoded = url::form_urlencoded::byte_serialize(source.as_bytes())
        .collect::<String>()
        .replace('+', "%20");
    if template.contains(URL_PLACEHOLDER) {
        template.replace(URL_PLACEHOLDER, &encoded)
    } else {
        format!("{template}{encoded}")
    }
}

/// Fetches the feed directly, then through each proxy in order.
///
/// Attempts never overlap: a slow direct request runs to its full deadline
/// before the first proxy is contacted.
pub struct FeedFetcher {
    client: reqwest::Client,
    source_url: String,
    proxies: Vec<String>,
    attempt_timeout: Duration,
}

impl FeedFetcher {
    pub fn new(
        client: reqwest::Client,
        source_url: impl Into<String>,
        proxies: Vec<String>,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            client,
            source_url: source_url.into(),
            proxies,
            attempt_timeout,
        }
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// The direct endpoint followed by every proxy-wrapped variant, in order.
    pub fn endpoints(&self) -> Vec<Endpoint> {
        let mut endpoints = Vec::with_capacity(self.proxies.len() + 1);
        endpoints.push(Endpoint {
            label: "direct".to_string(),
            url: self.source_url.clone(),
        });
        for (i, template) in self.proxies.iter().enumerate() {
            endpoints.push(Endpoint {
                label: format!("proxy #{} ({})", i + 1, proxy_host(template)),
                url: proxied_url(template, &self.source_url),
            });
        }
        endpoints
    }

    /// Walk the fallback chain until one endpoint yields at least one post.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::AllAttemptsExhausted`] with every attempt's
    /// failure when no endpoint produced posts.
    pub async fn fetch_feed(&self) -> Result<Vec<Post>, FetchError> {
        let mut attempts = Vec::new();

        for endpoint in self.endpoints() {
            match self.attempt(&endpoint.url).await {
                Ok(posts) => {
                    if !attempts.is_empty() {
                        tracing::info!(
                            endpoint = %endpoint.label,
                            failed_before = attempts.len(),
                            "Feed fetched through fallback endpoint"
                        );
                    }
                    tracing::debug!(
                        endpoint = %endpoint.label,
                        posts = posts.len(),
                        "Feed fetched"
                    );
                    return Ok(posts);
                }
                Err(error) => {
                    tracing::warn!(
                        endpoint = %endpoint.label,
                        error = %error,
                        "Feed attempt failed"
                    );
                    attempts.push(AttemptFailure {
                        endpoint: endpoint.label,
                        error,
                    });
                }
            }
        }

        Err(FetchError::AllAttemptsExhausted { attempts })
    }

    async fn attempt(&self, url: &str) -> Result<Vec<Post>, AttemptError> {
        let bytes = tokio::time::timeout(self.attempt_timeout, self.download(url))
            .await
            .map_err(|_| AttemptError::Timeout(self.attempt_timeout))??;

        let posts = parse_feed(&bytes)?;
        if posts.is_empty() {
            return Err(AttemptError::Empty);
        }
        Ok(posts)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, AttemptError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(AttemptError::HttpStatus(response.status().as_u16()));
        }
        read_limited_bytes(response, MAX_FEED_SIZE).await
    }
}

#[async_trait]
impl FeedSource for FeedFetcher {
    async fn fetch(&self) -> Result<Vec<Post>, FetchError> {
        self.fetch_feed().await
    }
}

fn proxy_host(template: &str) -> String {
    url::Url::parse(&template.replace(URL_PLACEHOLDER, ""))
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| template.to_string())
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, AttemptError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(AttemptError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(AttemptError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::client::build_http_client;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{header_regex, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VALID_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <item><guid>1</guid><title>First</title><description>one</description></item>
    <item><guid>2</guid><title>Second</title><description>two</description></item>
</channel></rss>"#;

    const EMPTY_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel></channel></rss>"#;

    fn fetcher(server: &MockServer, proxies: &[&str]) -> FeedFetcher {
        FeedFetcher::new(
            reqwest::Client::new(),
            format!("{}/feed", server.uri()),
            proxies
                .iter()
                .map(|p| format!("{}{}", server.uri(), p))
                .collect(),
            Duration::from_secs(2),
        )
    }

    #[test]
    fn proxied_url_substitutes_placeholder() {
        assert_eq!(
            proxied_url("https://p.example/raw?url={url}", "https://rsshub.app/a b"),
            "https://p.example/raw?url=https%3A%2F%2Frsshub.app%2Fa%20b"
        );
    }

    #[test]
    fn proxied_url_keeps_literal_plus_distinct_from_space() {
        assert_eq!(
            proxied_url("https://p.example/?u={url}", "https://x.example/?q=a+b c"),
            "https://p.example/?u=https%3A%2F%2Fx.example%2F%3Fq%3Da%2Bb%20c"
        );
    }

    #[test]
    fn proxied_url_appends_to_prefix() {
        assert_eq!(
            proxied_url("https://corsproxy.io/?", "https://rsshub.app/x"),
            "https://corsproxy.io/?https%3A%2F%2Frsshub.app%2Fx"
        );
    }

    #[test]
    fn endpoints_list_direct_first() {
        let f = FeedFetcher::new(
            reqwest::Client::new(),
            "https://rsshub.app/jike/user/1",
            DEFAULT_PROXIES.iter().map(|s| s.to_string()).collect(),
            DEFAULT_ATTEMPT_TIMEOUT,
        );
        let endpoints = f.endpoints();

        assert_eq!(endpoints.len(), 4);
        assert_eq!(endpoints[0].label, "direct");
        assert_eq!(endpoints[0].url, "https://rsshub.app/jike/user/1");
        assert_eq!(endpoints[1].label, "proxy #1 (corsproxy.io)");
        assert!(endpoints[2].url.starts_with("https://api.allorigins.win/raw?url=https%3A"));
    }

    #[tokio::test]
    async fn direct_success_skips_proxies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RSS))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/proxy"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RSS))
            .expect(0)
            .mount(&server)
            .await;

        let posts = fetcher(&server, &["/proxy?u={url}"])
            .fetch_feed()
            .await
            .unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].title, "First");
    }

    #[tokio::test]
    async fn shared_client_sends_browser_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .and(header_regex("user-agent", "Chrome/120"))
            .and(header_regex("accept", "application/rss\\+xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RSS))
            .expect(1)
            .mount(&server)
            .await;

        let client = build_http_client(Duration::from_secs(2)).unwrap();
        let f = FeedFetcher::new(
            client,
            format!("{}/feed", server.uri()),
            Vec::new(),
            Duration::from_secs(2),
        );
        assert_eq!(f.fetch_feed().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn falls_back_to_second_proxy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/p1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<not valid xml"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/p2"))
            .and(query_param("url", format!("{}/feed", server.uri())))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RSS))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/p3"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RSS))
            .expect(0)
            .mount(&server)
            .await;

        let posts = fetcher(&server, &["/p1?url={url}", "/p2?url={url}", "/p3?url={url}"])
            .fetch_feed()
            .await
            .unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[1].title, "Second");
    }

    #[tokio::test]
    async fn empty_feed_counts_as_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_RSS))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/p1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RSS))
            .mount(&server)
            .await;

        let posts = fetcher(&server, &["/p1?url={url}"])
            .fetch_feed()
            .await
            .unwrap();
        assert_eq!(posts.len(), 2);
    }

    #[tokio::test]
    async fn all_failures_are_aggregated_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/p1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_RSS))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/p2"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<not valid xml"))
            .mount(&server)
            .await;

        let err = fetcher(&server, &["/p1?url={url}", "/p2?url={url}"])
            .fetch_feed()
            .await
            .unwrap_err();

        let FetchError::AllAttemptsExhausted { attempts } = &err;
        assert_eq!(attempts.len(), 3);
        assert_eq!(attempts[0].endpoint, "direct");
        assert!(matches!(attempts[0].error, AttemptError::HttpStatus(404)));
        assert!(matches!(attempts[1].error, AttemptError::Empty));
        assert!(matches!(attempts[2].error, AttemptError::Parse(_)));

        let msg = err.to_string();
        assert!(msg.starts_with("all 3 feed attempts failed: direct: HTTP status 404"));
    }

    #[tokio::test]
    async fn slow_attempt_times_out_before_next() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_RSS)
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/p1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RSS))
            .expect(1)
            .mount(&server)
            .await;

        let f = FeedFetcher::new(
            reqwest::Client::new(),
            format!("{}/feed", server.uri()),
            vec![format!("{}/p1?url={{url}}", server.uri())],
            Duration::from_millis(200),
        );
        let posts = f.fetch_feed().await.unwrap();
        assert_eq!(posts.len(), 2);
    }
}
