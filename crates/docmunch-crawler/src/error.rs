use miette::Diagnostic;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error, Diagnostic)]
pub enum UrlError {
    #[error("Invalid URL '{input}': {source}")]
    #[diagnostic(code(docmunch::url::invalid))]
    Invalid {
        input: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Debug, Error, Diagnostic)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    #[diagnostic(code(docmunch::fetch::client))]
    Client(#[source] reqwest::Error),

    #[error("Failed to fetch URL {url}: {source}")]
    #[diagnostic(code(docmunch::fetch::request))]
    Request {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} failed with status: {status}")]
    #[diagnostic(code(docmunch::fetch::status))]
    Status {
        url: Url,
        status: reqwest::StatusCode,
    },

    #[error("Browser rendering is not available: {reason}")]
    #[diagnostic(
        code(docmunch::browser::unavailable),
        help(
            "This page may require a browser to render. Install Chrome or Chromium, \
             or point DOCMUNCH_CHROME at a browser executable."
        )
    )]
    BrowserUnavailable { reason: String },

    #[error("Browser failed to render {url}: {message}")]
    #[diagnostic(code(docmunch::browser::render))]
    Browser { url: Url, message: String },
}

impl FetchError {
    /// True when the optional rendering capability is missing, as opposed to
    /// a render that was attempted and failed.
    pub fn is_browser_unavailable(&self) -> bool {
        matches!(self, FetchError::BrowserUnavailable { .. })
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum CrawlError {
    #[error("Cannot crawl {url}: URL has no origin to scope the crawl to")]
    #[diagnostic(
        code(docmunch::crawl::unsupported_scheme),
        help("Use an http:// or https:// documentation URL.")
    )]
    UnsupportedScheme { url: Url },
}
