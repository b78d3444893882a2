use crate::cli::FetchArgs;
use crate::interrupt::{ActiveCrawl, StdinPrompt, exit_discarded, watch_ctrl_c};
use docmunch_crawler::normalize::{normalize_url, slug_from_url};
use docmunch_crawler::{
    CrawlOptions, CrawlOutcome, CrawlResult, CrawledPage, Crawler, HttpClient, PageFetcher,
    PlatformId, StopReason,
};
use docmunch_pipeline::config::LoadedConfig;
use docmunch_pipeline::{
    CONFIG_FILENAME, Config, CrawlSettings, Frontmatter, PipelineError, RenderedPage,
    RootManifestEntry, SourceConfig, SourceManifest, extract_site_meta, load_config, place_pages, render_page,
    render_pages, stitch, update_root_manifest, write_document,
};
use miette::{IntoDiagnostic, miette};
use std::env;
use std::path::Path;
use tokio::task::JoinHandle;
use url::Url;

/// Single pages with less Markdown than this are retried in a browser.
const THIN_CONTENT_CHARS: usize = 200;

/// Markdown produced from one page or one crawl.
struct Document {
    source: Url,
    title: String,
    platform: PlatformId,
    markdown: String,
}

impl Document {
    fn frontmatter(&self) -> Frontmatter {
        Frontmatter::new(self.source.as_str(), &self.title, self.platform.to_string())
    }
}

pub(crate) struct App {
    settings: CrawlSettings,
    active: ActiveCrawl,
}

impl App {
    pub fn new(settings: CrawlSettings) -> Self {
        Self {
            settings,
            active: ActiveCrawl::default(),
        }
    }

    /// Installs the Ctrl-C handler. Must be called inside the runtime that
    /// runs the command.
    pub fn watch_ctrl_c(&self) -> JoinHandle<()> {
        watch_ctrl_c(self.active.clone())
    }

    pub async fn fetch(&self, args: &FetchArgs) -> miette::Result<()> {
        let url = args
            .url
            .as_deref()
            .ok_or_else(|| miette!("No URL given. Run `docmunch --help` for usage."))?;
        let url = parse_url(url)?;

        let document = self.fetch_document(&url, args.crawl, args.max_depth).await?;
        write_document(
            &document.markdown,
            args.output.as_deref(),
            &document.frontmatter(),
            true,
        )?;
        Ok(())
    }

    pub fn add(
        &self,
        url: &str,
        name: Option<&str>,
        crawl: bool,
        max_depth: u32,
        output: Option<&str>,
    ) -> miette::Result<()> {
        normalize_url(url)?;
        let cwd = env::current_dir().into_diagnostic()?;
        let mut loaded = load_config(&cwd)?.unwrap_or_else(|| LoadedConfig {
            config: Config::default(),
            path: cwd.join(CONFIG_FILENAME),
        });

        let name = name.map(str::to_string).unwrap_or_else(|| slug_from_url(url));
        let output = output
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}.md", name));
        loaded.config.add_source(SourceConfig {
            name: name.clone(),
            url: url.to_string(),
            crawl,
            max_depth,
            output: output.clone(),
        });
        loaded.save()?;

        println!("Added \"{}\" -> {}", name, output);
        Ok(())
    }

    pub async fn update(&self, name: Option<&str>, force: bool) -> miette::Result<()> {
        let cwd = env::current_dir().into_diagnostic()?;
        let loaded = load_config(&cwd)?.ok_or(PipelineError::ConfigNotFound)?;
        let root = loaded.output_root();
        let sources = loaded.config.select(name)?;

        let mut failed = Vec::new();
        for source in &sources {
            tracing::info!("Updating \"{}\" from {}", source.name, source.url);
            if let Err(e) = self.update_source(source, &root, force).await {
                eprintln!("{:?}", e.wrap_err(format!("Failed to update \"{}\"", source.name)));
                failed.push(source.name.as_str());
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(miette!(
                "{} of {} source(s) failed: {}",
                failed.len(),
                sources.len(),
                failed.join(", ")
            ))
        }
    }

    pub fn list(&self) -> miette::Result<()> {
        let cwd = env::current_dir().into_diagnostic()?;
        let loaded = load_config(&cwd)?.ok_or(PipelineError::ConfigNotFound)?;

        if loaded.config.sources.is_empty() {
            println!("No sources configured.");
            return Ok(());
        }
        for source in &loaded.config.sources {
            let mode = if source.crawl {
                format!("crawl (depth {})", source.max_depth)
            } else {
                "page".to_string()
            };
            println!("{}\t{}\t{}\t{}", source.name, source.url, mode, source.output);
        }
        Ok(())
    }

    async fn update_source(
        &self,
        source: &SourceConfig,
        root: &Path,
        force: bool,
    ) -> miette::Result<()> {
        let url = parse_url(&source.url)?;

        if source.crawl && source.is_directory_output() {
            return self.update_directory(source, &url, root, force).await;
        }

        let document = self
            .fetch_document(&url, source.crawl, source.max_depth as usize)
            .await?;
        let target = root.join(&source.output);
        if write_document(&document.markdown, Some(&target), &document.frontmatter(), force)? {
            println!("{}: wrote {}", source.name, target.display());
        } else {
            println!("{}: unchanged", source.name);
        }
        Ok(())
    }

    /// One file per page under `root/output`, plus the source and root
    /// manifests. Manifests are left alone when no page changed.
    async fn update_directory(
        &self,
        source: &SourceConfig,
        url: &Url,
        root: &Path,
        force: bool,
    ) -> miette::Result<()> {
        let result = self.crawl(url, source.max_depth as usize).await?;
        let Some(first) = result.pages.first() else {
            return Err(miette!("No pages could be fetched from {}", url));
        };

        let rendered = render_pages(&result.pages);
        let source_dir = root.join(&source.output);
        let placement = place_pages(&rendered, &source_dir, &result.effective_prefix, force)?;

        if placement.written == 0 && !force {
            println!("{}: unchanged ({} pages)", source.name, placement.entries.len());
            return Ok(());
        }

        let meta = extract_site_meta(&first.html, &first.url);
        let manifest = SourceManifest::new(
            &source.name,
            &source.url,
            result.platform,
            placement.entries,
            &meta,
        );
        manifest.write(&source_dir)?;
        update_root_manifest(
            root,
            RootManifestEntry::for_source(&manifest, source.output.trim_end_matches('/')),
        )?;

        println!(
            "{}: wrote {} of {} pages to {}",
            source.name,
            placement.written,
            manifest.pages.len(),
            source_dir.display()
        );
        Ok(())
    }

    async fn fetch_document(
        &self,
        url: &Url,
        crawl: bool,
        max_depth: usize,
    ) -> miette::Result<Document> {
        if !crawl {
            return self.fetch_single(url).await;
        }

        let result = self.crawl(url, max_depth).await?;
        let rendered = render_pages(&result.pages);
        let Some(first) = rendered.first() else {
            return Err(miette!("No pages could be fetched from {}", url));
        };

        Ok(Document {
            source: url.clone(),
            title: first.title.clone(),
            platform: result.platform,
            markdown: stitch(&rendered),
        })
    }

    /// Fetches one page. Pages that come back nearly empty are probably
    /// client-rendered and get a second attempt through the browser.
    async fn fetch_single(&self, url: &Url) -> miette::Result<Document> {
        let client = self.client()?;
        let html = client.fetch_page(url).await?;
        let mut page = render_page(&CrawledPage {
            url: url.clone(),
            html,
        });

        if page.markdown.trim().chars().count() < THIN_CONTENT_CHARS {
            tracing::info!("Thin content on {}, retrying with a browser", url);
            match client.fetch_with_browser(url).await {
                Ok(html) => {
                    let rendered = render_page(&CrawledPage {
                        url: url.clone(),
                        html,
                    });
                    page = prefer_rendered(page, rendered);
                }
                Err(e) if e.is_browser_unavailable() => {
                    eprintln!("{:?}", miette::Report::new(e).wrap_err("Keeping static content"));
                }
                Err(e) => tracing::warn!("Browser rendering failed, keeping static content: {}", e),
            }
        }

        Ok(Document {
            source: url.clone(),
            title: page.title,
            platform: page.platform,
            markdown: page.markdown,
        })
    }

    /// Crawls from `start` with Ctrl-C routed to the crawl's interrupt. A
    /// discarded crawl ends the process.
    async fn crawl(&self, start: &Url, max_depth: usize) -> miette::Result<CrawlResult> {
        let guard = self.active.begin();
        let crawler = Crawler::new(
            self.client()?,
            CrawlOptions {
                max_depth,
                link_source: None,
                delay: self.settings.delay,
            },
        )
        .on_page_fetched(|url, completed, total| {
            tracing::info!("[{}/{}] {}", completed, total, url);
        })
        .with_interrupt(guard.interrupt())
        .with_prompt(StdinPrompt);

        let outcome = crawler.crawl(start).await;
        drop(guard);

        match outcome? {
            CrawlOutcome::Finished(result) => {
                if result.stop == StopReason::Interrupted {
                    eprintln!("Keeping {} pages from the interrupted crawl.", result.pages.len());
                }
                tracing::info!(
                    "Crawled {} pages under {} ({})",
                    result.pages.len(),
                    result.effective_prefix,
                    result.platform
                );
                Ok(result)
            }
            CrawlOutcome::Discarded(reason) => exit_discarded(reason),
        }
    }

    fn client(&self) -> miette::Result<HttpClient> {
        Ok(HttpClient::new(self.settings.timeout)?
            .with_browser_options(self.settings.browser_options()))
    }
}

/// The rendered page wins, except for a title the browser DOM lost.
fn prefer_rendered(static_page: RenderedPage, rendered: RenderedPage) -> RenderedPage {
    if rendered.title.trim().is_empty() {
        RenderedPage {
            title: static_page.title,
            ..rendered
        }
    } else {
        rendered
    }
}

fn parse_url(input: &str) -> miette::Result<Url> {
    normalize_url(input)?;
    Url::parse(input.trim()).into_diagnostic()
}
