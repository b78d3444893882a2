use crate::boundary::{Boundary, CrawlScope, widen};
use crate::discover::{LinkSource, discover_links, discover_same_origin};
use crate::error::CrawlError;
use crate::http_client::PageFetcher;
use crate::normalize::normalize;
use crate::platform::{self, PlatformId};
use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Progress callback: `(url, pages_completed, estimated_total)`. The total is
/// `completed + frontier` and grows as links are discovered.
pub type ProgressFn = Box<dyn Fn(&Url, usize, usize) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub max_depth: usize,
    /// Link source to use. When `None` the platform is detected from the
    /// first page and its strategy decides.
    pub link_source: Option<LinkSource>,
    /// Politeness delay between sequential fetches.
    pub delay: Duration,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_depth: 2,
            link_source: None,
            delay: Duration::from_millis(200),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawledPage {
    pub url: Url,
    pub html: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The frontier ran out.
    Exhausted,
    /// An interrupt stopped the crawl and the partial result was kept.
    Interrupted,
}

#[derive(Debug, Clone)]
pub struct CrawlResult {
    /// Fetched pages in BFS fetch order.
    pub pages: Vec<CrawledPage>,
    /// Final, possibly widened, path prefix. Always ends in `/`.
    pub effective_prefix: String,
    pub platform: PlatformId,
    pub stop: StopReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// The operator chose not to keep partial results.
    Declined,
    /// A second interrupt arrived while the save prompt was open.
    ForceQuit,
    /// Interrupted before any page was captured.
    NothingCaptured,
}

#[derive(Debug, Clone)]
pub enum CrawlOutcome {
    Finished(CrawlResult),
    Discarded(DiscardReason),
}

impl CrawlOutcome {
    pub fn into_result(self) -> Option<CrawlResult> {
        match self {
            CrawlOutcome::Finished(result) => Some(result),
            CrawlOutcome::Discarded(_) => None,
        }
    }
}

/// Cooperative, edge-triggered cancellation for a crawl.
///
/// The first [`Interrupt::signal`] stops dequeuing; the second forces the
/// partial results to be discarded.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    stop: CancellationToken,
    force: CancellationToken,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signal(&self) {
        if self.stop.is_cancelled() {
            self.force.cancel();
        } else {
            self.stop.cancel();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_cancelled()
    }

    pub fn is_forced(&self) -> bool {
        self.force.is_cancelled()
    }

    pub async fn stopped(&self) {
        self.stop.cancelled().await
    }

    pub async fn forced(&self) {
        self.force.cancelled().await
    }
}

/// Asks whether partial results of an interrupted crawl should be kept.
#[async_trait]
pub trait SavePrompt: Send + Sync {
    async fn confirm_save(&self, captured: usize) -> bool;
}

/// Non-interactive prompt with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct AutoAnswer(pub bool);

impl Default for AutoAnswer {
    fn default() -> Self {
        Self(true)
    }
}

#[async_trait]
impl SavePrompt for AutoAnswer {
    async fn confirm_save(&self, _captured: usize) -> bool {
        self.0
    }
}

pub struct Crawler<F> {
    fetcher: F,
    options: CrawlOptions,
    on_page_fetched: Option<ProgressFn>,
    interrupt: Interrupt,
    prompt: Box<dyn SavePrompt>,
}

/// Link discovery state for the first page, before the boundary is frozen.
struct FirstPage {
    boundary: Boundary,
    source: LinkSource,
    platform: PlatformId,
    links: Vec<Url>,
}

impl<F: PageFetcher> Crawler<F> {
    pub fn new(fetcher: F, options: CrawlOptions) -> Self {
        Self {
            fetcher,
            options,
            on_page_fetched: None,
            interrupt: Interrupt::new(),
            prompt: Box::new(AutoAnswer::default()),
        }
    }

    pub fn on_page_fetched(
        mut self,
        callback: impl Fn(&Url, usize, usize) + Send + Sync + 'static,
    ) -> Self {
        self.on_page_fetched = Some(Box::new(callback));
        self
    }

    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn with_prompt(mut self, prompt: impl SavePrompt + 'static) -> Self {
        self.prompt = Box::new(prompt);
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Breadth-first crawl from `start`.
    ///
    /// Fetch failures are logged and skipped. Errors are returned only when
    /// `start` cannot define a crawl scope.
    pub async fn crawl(&self, start: &Url) -> Result<CrawlOutcome, CrawlError> {
        let mut boundary = Boundary::provisional(CrawlScope::from_url(start)?);
        let mut source = self.options.link_source.clone();
        let mut platform = PlatformId::default();

        let mut frontier = VecDeque::from([(start.clone(), 0usize)]);
        let mut visited = HashSet::from([normalize(start)]);
        let mut pages: Vec<CrawledPage> = Vec::new();

        tracing::info!(
            "Crawling {} (max depth {}, prefix {})",
            start,
            self.options.max_depth,
            boundary.scope().path_prefix()
        );

        loop {
            if self.interrupt.is_stopped() {
                break;
            }
            let Some((url, depth)) = frontier.pop_front() else {
                break;
            };

            tracing::debug!("Fetching {} at depth {}", url, depth);
            match self.fetcher.fetch_page(&url).await {
                Ok(html) => {
                    pages.push(CrawledPage {
                        url: url.clone(),
                        html,
                    });
                    self.report(&url, pages.len(), pages.len() + frontier.len());

                    if depth < self.options.max_depth {
                        let links = if boundary.is_final() {
                            let source = source.get_or_insert_with(|| {
                                platform::strategy(platform).link_source()
                            });
                            let html = pages.last().map(|p| p.html.as_str()).unwrap_or("");
                            discover_links(source, html, &url, boundary.scope())
                        } else {
                            let first = self.first_page(boundary, source.clone(), &mut pages).await;
                            boundary = first.boundary;
                            source = Some(first.source);
                            platform = first.platform;
                            first.links
                        };

                        tracing::debug!("Discovered {} in-bounds links on {}", links.len(), url);
                        for mut link in links {
                            link.set_fragment(None);
                            if visited.insert(normalize(&link)) {
                                frontier.push_back((link, depth + 1));
                            }
                        }
                    } else if !boundary.is_final() {
                        boundary = boundary.finalize(None);
                        platform = pages
                            .last()
                            .map(|page| platform::resolve_html(&page.url, &page.html))
                            .unwrap_or_default();
                    }
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", url, e);
                    self.report(&url, pages.len(), pages.len() + frontier.len());
                }
            }

            if !frontier.is_empty() && !self.interrupt.is_stopped() {
                self.pause().await;
            }
        }

        let effective_prefix = boundary.into_scope().path_prefix().to_string();
        let interrupted = self.interrupt.is_stopped() && !frontier.is_empty();
        if !interrupted {
            tracing::info!("Crawl finished with {} pages", pages.len());
            return Ok(CrawlOutcome::Finished(CrawlResult {
                pages,
                effective_prefix,
                platform,
                stop: StopReason::Exhausted,
            }));
        }

        tracing::info!(
            "Crawl interrupted with {} pages captured and {} pending",
            pages.len(),
            frontier.len()
        );
        match self.confirm_partial(pages.len()).await {
            Ok(()) => Ok(CrawlOutcome::Finished(CrawlResult {
                pages,
                effective_prefix,
                platform,
                stop: StopReason::Interrupted,
            })),
            Err(reason) => Ok(CrawlOutcome::Discarded(reason)),
        }
    }

    /// Resolves the link source, widens the boundary from the page's
    /// navigation and discovers its links. When static markup yields no
    /// in-bounds links the page is re-rendered in a browser and the whole
    /// step is repeated on the rendered DOM.
    async fn first_page(
        &self,
        boundary: Boundary,
        source: Option<LinkSource>,
        pages: &mut [CrawledPage],
    ) -> FirstPage {
        let Some(page) = pages.last_mut() else {
            let source = source.unwrap_or(LinkSource::AllAnchors);
            return FirstPage {
                boundary: boundary.finalize(None),
                source,
                platform: PlatformId::default(),
                links: Vec::new(),
            };
        };

        let first = settle_first_page(&boundary, source.clone(), &page.url, &page.html);
        if !first.links.is_empty() {
            return first;
        }

        tracing::info!(
            "No in-bounds links on {}, retrying with browser rendering",
            page.url
        );
        match self.fetcher.fetch_with_browser(&page.url).await {
            Ok(rendered) => {
                let retried = settle_first_page(&boundary, source, &page.url, &rendered);
                page.html = rendered;
                retried
            }
            Err(e) => {
                if e.is_browser_unavailable() {
                    tracing::warn!("{}", e);
                } else {
                    tracing::warn!("Browser fallback failed for {}: {}", page.url, e);
                }
                first
            }
        }
    }

    async fn confirm_partial(&self, captured: usize) -> Result<(), DiscardReason> {
        if captured == 0 {
            return Err(DiscardReason::NothingCaptured);
        }
        if self.interrupt.is_forced() {
            return Err(DiscardReason::ForceQuit);
        }

        tokio::select! {
            keep = self.prompt.confirm_save(captured) => {
                if keep { Ok(()) } else { Err(DiscardReason::Declined) }
            }
            _ = self.interrupt.forced() => Err(DiscardReason::ForceQuit),
        }
    }

    async fn pause(&self) {
        if self.options.delay.is_zero() {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(self.options.delay) => {}
            _ = self.interrupt.stopped() => {}
        }
    }

    fn report(&self, url: &Url, current: usize, total: usize) {
        if let Some(callback) = &self.on_page_fetched {
            callback(url, current, total);
        }
    }
}

fn settle_first_page(
    boundary: &Boundary,
    source: Option<LinkSource>,
    url: &Url,
    html: &str,
) -> FirstPage {
    let platform = platform::resolve_html(url, html);
    let source = source.unwrap_or_else(|| platform::strategy(platform).link_source());

    let widened = if source.is_nav_scoped() {
        let sample = discover_same_origin(&source, html, url, boundary.scope());
        (!sample.is_empty()).then(|| widen(url, &sample))
    } else {
        None
    };
    if let Some(prefix) = &widened
        && prefix != boundary.scope().path_prefix()
    {
        tracing::info!(
            "Widened crawl prefix from {} to {}",
            boundary.scope().path_prefix(),
            prefix
        );
    }

    let boundary = boundary.clone().finalize(widened);
    let links = discover_links(&source, html, url, boundary.scope());
    FirstPage {
        boundary,
        source,
        platform,
        links,
    }
}
