//! Boundary-aware crawler for documentation sites.
//!
//! This crate discovers the pages that belong to a documentation site and
//! fetches them in breadth-first order. The crawl stays inside an origin and
//! a path prefix. The prefix is widened once from the first page's
//! navigation, then frozen.
//!
//! # Features
//!
//! - Platform detection for Mintlify, Docusaurus, ReadMe, GitBook and generic sites
//! - Navigation-scoped link discovery, including script-embedded navigation data
//! - Headless browser fallback for client-rendered pages
//! - Cooperative interruption with an injectable "keep partial results?" prompt
//! - Politeness delay between sequential requests
//!
//! # Usage
//!
//! ```rust,ignore
//! use docmunch_crawler::crawler::{CrawlOptions, Crawler};
//! use docmunch_crawler::http_client::HttpClient;
//! use std::time::Duration;
//! use url::Url;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpClient::new(Duration::from_secs(30))?;
//!     let crawler = Crawler::new(client, CrawlOptions::default());
//!     let start = Url::parse("https://docs.example.com/guide/intro")?;
//!     if let Some(result) = crawler.crawl(&start).await?.into_result() {
//!         println!("Crawled {} pages under {}", result.pages.len(), result.effective_prefix);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Crawling Behavior
//!
//! The crawler:
//! - Scopes the crawl to the start URL's origin and parent directory
//! - Widens that prefix from the first page's navigation links
//! - Follows in-bounds links breadth-first up to the maximum depth
//! - Skips pages that fail to fetch
//! - Re-renders the first page in a browser when it exposes no links
//!
pub mod boundary;
pub mod crawler;
pub mod discover;
pub mod error;
pub mod http_client;
pub mod normalize;
pub mod platform;

pub use crawler::{
    AutoAnswer, CrawlOptions, CrawlOutcome, CrawlResult, CrawledPage, Crawler, DiscardReason,
    Interrupt, SavePrompt, StopReason,
};
pub use error::{CrawlError, FetchError, UrlError};
pub use http_client::{BrowserOptions, HttpClient, PageFetcher};
pub use platform::PlatformId;
