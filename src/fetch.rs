//! HTTP fetching of feed and page URLs into byte streams.
//!
//! The fetcher is a collaborator of the converters: it turns URLs into
//! [`ByteStream`]s carrying `url` and `content_type` metadata. Retry and
//! backoff policy is deliberately out of scope; a URL either fetches within
//! its timeout and size budget or is skipped with a warning.

use crate::document::{Meta, MetaValue};
use crate::source::ByteStream;
use futures::stream::{self, StreamExt};
use std::time::Duration;
use thiserror::Error;
use url::Url;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024; // 10MB
const MAX_CONCURRENT_FETCHES: usize = 10;

/// Errors that can occur while fetching one URL.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL could not be parsed or uses a non-HTTP(S) scheme
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the 30-second timeout
    #[error("Request timed out")]
    Timeout,
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
}

/// Fetches URL content as byte streams for the converters.
#[derive(Clone, Default)]
pub struct LinkFetcher {
    client: reqwest::Client,
}

impl LinkFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Fetch one URL into a [`ByteStream`].
    ///
    /// The stream's metadata records the requested `url` and, when the
    /// server supplies one, the response `content_type`.
    ///
    /// # Errors
    ///
    /// - [`FetchError::InvalidUrl`] - unparseable or non-HTTP(S) URL
    /// - [`FetchError::Timeout`] - request exceeded 30 seconds
    /// - [`FetchError::HttpStatus`] - non-2xx response
    /// - [`FetchError::ResponseTooLarge`] - body exceeded 10MB
    /// - [`FetchError::IncompleteResponse`] - body shorter than Content-Length
    pub async fn fetch_one(&self, url: &str) -> Result<ByteStream, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl(format!(
                "unsupported scheme {}",
                parsed.scheme()
            )));
        }

        let response = tokio::time::timeout(FETCH_TIMEOUT, self.client.get(parsed).send())
            .await
            .map_err(|_| FetchError::Timeout)?
            .map_err(FetchError::Network)?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let data = read_limited_bytes(response, MAX_RESPONSE_SIZE).await?;

        let mut meta = Meta::new();
        meta.insert("url".to_string(), MetaValue::Str(url.to_string()));
        if let Some(content_type) = content_type {
            meta.insert("content_type".to_string(), MetaValue::Str(content_type));
        }

        Ok(ByteStream::with_meta(data, meta))
    }

    /// Fetch a batch of URLs, skipping failures.
    ///
    /// Up to ten URLs are fetched concurrently, but the returned streams
    /// preserve the input order of the URLs that succeeded; a failed URL
    /// emits one warning and leaves a gap, matching the converters' own
    /// partial-failure discipline.
    pub async fn fetch_all(&self, urls: &[String]) -> Vec<ByteStream> {
        let results: Vec<(String, Result<ByteStream, FetchError>)> = stream::iter(urls.iter())
            .map(|url| async move { (url.clone(), self.fetch_one(url).await) })
            .buffered(MAX_CONCURRENT_FETCHES)
            .collect()
            .await;

        results
            .into_iter()
            .filter_map(|(url, result)| match result {
                Ok(stream) => Some(stream),
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Could not fetch URL, skipping");
                    None
                }
            })
            .collect()
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    // Fast path: trust the Content-Length header when present
    if let Some(len) = expected_length {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut body = response.bytes_stream();

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    // A body shorter than Content-Length means the transfer was cut off
    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_one_records_url_and_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<rss/>", "application/xml"))
            .mount(&server)
            .await;

        let fetcher = LinkFetcher::default();
        let url = format!("{}/feed", server.uri());
        let stream = fetcher.fetch_one(&url).await.unwrap();

        assert_eq!(stream.data, b"<rss/>");
        assert_eq!(stream.meta.get("url"), Some(&MetaValue::Str(url)));
        assert_eq!(
            stream.meta.get("content_type"),
            Some(&MetaValue::Str("application/xml".to_string()))
        );
    }

    #[tokio::test]
    async fn test_fetch_one_non_2xx_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = LinkFetcher::default();
        let result = fetcher.fetch_one(&format!("{}/feed", server.uri())).await;
        assert!(matches!(result, Err(FetchError::HttpStatus(404))));
    }

    #[tokio::test]
    async fn test_fetch_one_rejects_non_http_scheme() {
        let fetcher = LinkFetcher::default();
        let result = fetcher.fetch_one("file:///etc/passwd").await;
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_fetch_all_skips_failures_and_preserves_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(ResponseTemplate::new(200).set_body_string("first"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/b"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/c"))
            .respond_with(ResponseTemplate::new(200).set_body_string("third"))
            .mount(&server)
            .await;

        let fetcher = LinkFetcher::default();
        let urls = vec![
            format!("{}/a", server.uri()),
            format!("{}/b", server.uri()),
            format!("{}/c", server.uri()),
        ];
        let streams = fetcher.fetch_all(&urls).await;

        assert_eq!(streams.len(), 2);
        assert_eq!(streams[0].data, b"first");
        assert_eq!(streams[1].data, b"third");
    }
}
