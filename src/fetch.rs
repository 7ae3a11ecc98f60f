//! HTTP fetching.
//!
//! [`Fetch`] is the seam between the crawler and the network: production code
//! uses [`HttpFetcher`], tests substitute an in-memory implementation.
//! Every request is attempted exactly once; a transport error or a
//! non-success status becomes [`ScrapeError::Fetch`].

use reqwest::Client;
use tracing::{debug, instrument};

use crate::config::ScraperConfig;
use crate::error::{Result, ScrapeError};

/// Single-attempt page and file retrieval.
pub trait Fetch {
    /// GET a page and return its body as text.
    async fn get_text(&self, url: &str) -> Result<String>;

    /// GET a resource and return its raw bytes.
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// [`Fetch`] over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout())
            .build()
            .map_err(|e| ScrapeError::config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScrapeError::fetch(url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::fetch(url, format!("HTTP {status}")));
        }
        Ok(response)
    }
}

impl Fetch for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn get_text(&self, url: &str) -> Result<String> {
        let body = self
            .send(url)
            .await?
            .text()
            .await
            .map_err(|e| ScrapeError::fetch(url, e))?;
        debug!(bytes = body.len(), "Fetched page");
        Ok(body)
    }

    #[instrument(level = "debug", skip(self))]
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let bytes = self
            .send(url)
            .await?
            .bytes()
            .await
            .map_err(|e| ScrapeError::fetch(url, e))?;
        debug!(bytes = bytes.len(), "Fetched file");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&ScraperConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_get_text_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/papers"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let body = fetcher()
            .get_text(&format!("{}/papers", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_non_success_status_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/papers/w404"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let err = fetcher()
            .get_text(&format!("{}/papers/w404", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Fetch { .. }));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_get_bytes_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/w1.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4".to_vec()))
            .mount(&server)
            .await;

        let bytes = fetcher()
            .get_bytes(&format!("{}/w1.pdf", server.uri()))
            .await
            .unwrap();
        assert_eq!(bytes, b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_fetch_error() {
        let err = fetcher()
            .get_text("http://127.0.0.1:9/papers")
            .await
            .unwrap_err();
        assert!(err.is_skippable());
    }
}
