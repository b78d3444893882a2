use crate::error::FetchError;
use async_trait::async_trait;
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use reqwest::Client as ReqwestClient;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const USER_AGENT: &str = concat!("docmunch/", env!("CARGO_PKG_VERSION"));

/// Source of page markup for the crawl engine.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the static HTML of a page.
    async fn fetch_page(&self, url: &Url) -> Result<String, FetchError>;

    /// Renders the page in a browser and returns the resulting DOM.
    ///
    /// Implementations without a renderer return
    /// [`FetchError::BrowserUnavailable`].
    async fn fetch_with_browser(&self, url: &Url) -> Result<String, FetchError>;
}

/// Options for the headless browser fallback.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Browser executable. Auto-detected when `None`.
    pub chrome_path: Option<PathBuf>,
    /// Extra wait after navigation so client-side rendering can finish.
    pub settle: Duration,
    pub request_timeout: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            chrome_path: None,
            settle: Duration::from_millis(1000),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    browser: BrowserOptions,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = ReqwestClient::builder()
            .user_agent(USER_AGENT)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            browser: BrowserOptions {
                request_timeout: timeout,
                ..BrowserOptions::default()
            },
        })
    }

    pub fn with_browser_options(mut self, browser: BrowserOptions) -> Self {
        self.browser = browser;
        self
    }

    pub fn browser_options(&self) -> &BrowserOptions {
        &self.browser
    }

    async fn render(&self, url: &Url) -> Result<String, FetchError> {
        let mut builder = BrowserConfig::builder().request_timeout(self.browser.request_timeout);
        if let Some(path) = &self.browser.chrome_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .build()
            .map_err(|reason| FetchError::BrowserUnavailable { reason })?;

        let (mut browser, mut handler) =
            Browser::launch(config)
                .await
                .map_err(|e| FetchError::BrowserUnavailable {
                    reason: e.to_string(),
                })?;
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let rendered = self.render_page(&browser, url).await;

        if let Err(e) = browser.close().await {
            tracing::debug!("Failed to close browser cleanly: {}", e);
        }
        if let Err(e) = browser.wait().await {
            tracing::debug!("Failed to wait for browser exit: {}", e);
        }
        if let Err(e) = handler_task.await {
            tracing::debug!("Browser handler task ended abnormally: {}", e);
        }

        rendered
    }

    async fn render_page(&self, browser: &Browser, url: &Url) -> Result<String, FetchError> {
        let browser_error = |e: CdpError| FetchError::Browser {
            url: url.clone(),
            message: e.to_string(),
        };

        let page = browser.new_page(url.as_str()).await.map_err(browser_error)?;
        page.wait_for_navigation().await.map_err(browser_error)?;
        if !self.browser.settle.is_zero() {
            tokio::time::sleep(self.browser.settle).await;
        }
        page.content().await.map_err(browser_error)
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch_page(&self, url: &Url) -> Result<String, FetchError> {
        let response =
            self.client
                .get(url.clone())
                .send()
                .await
                .map_err(|source| FetchError::Request {
                    url: url.clone(),
                    source,
                })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.clone(),
                status: response.status(),
            });
        }

        response.text().await.map_err(|source| FetchError::Request {
            url: url.clone(),
            source,
        })
    }

    async fn fetch_with_browser(&self, url: &Url) -> Result<String, FetchError> {
        tracing::info!("Rendering {} in a headless browser", url);
        self.render(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};
    use std::sync::Once;

    static INIT: Once = Once::new();
    fn init_tracing() {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt::try_init();
        });
    }

    fn client() -> HttpClient {
        HttpClient::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_page_successful() {
        init_tracing();
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/docs/intro")
                    .header("user-agent", USER_AGENT);
                then.status(200).body("<html><body>Intro</body></html>");
            })
            .await;

        let url = Url::parse(&server.url("/docs/intro")).unwrap();
        let html = client().fetch_page(&url).await.unwrap();

        assert_eq!(html, "<html><body>Intro</body></html>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_page_non_success_status() {
        init_tracing();
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing");
                then.status(404);
            })
            .await;

        let url = Url::parse(&server.url("/missing")).unwrap();
        let err = client().fetch_page(&url).await.unwrap_err();

        match err {
            FetchError::Status { status, .. } => assert_eq!(status.as_u16(), 404),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_page_connection_refused() {
        init_tracing();
        let url = Url::parse("http://127.0.0.1:1/unreachable").unwrap();
        let err = client().fetch_page(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Request { .. }));
        assert!(!err.is_browser_unavailable());
    }

    #[tokio::test]
    async fn test_missing_browser_is_unavailable() {
        init_tracing();
        let http = client().with_browser_options(BrowserOptions {
            chrome_path: Some(PathBuf::from("/nonexistent/docmunch-test-chrome")),
            settle: Duration::ZERO,
            request_timeout: Duration::from_secs(1),
        });
        let url = Url::parse("https://example.com/").unwrap();
        let err = http.fetch_with_browser(&url).await.unwrap_err();
        assert!(err.is_browser_unavailable(), "{:?}", err);
    }

    #[test]
    fn test_new_client_uses_timeout_for_browser() {
        let http = HttpClient::new(Duration::from_secs(7)).unwrap();
        assert_eq!(http.browser_options().request_timeout, Duration::from_secs(7));
    }
}
