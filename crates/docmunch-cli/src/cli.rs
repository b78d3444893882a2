use crate::commands::App;
use clap::{ArgAction, Parser, Subcommand};
use docmunch_pipeline::CrawlSettings;
use miette::{IntoDiagnostic, miette};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "docmunch")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(args_conflicts_with_subcommands = true)]
#[command(after_help = "# Examples:\n\n\
    ## To convert a single page to Markdown:\n\
    docmunch https://docs.example.com/guide/intro\n\n\
    ## To crawl a documentation site into one file:\n\
    docmunch https://docs.example.com/guide/intro --crawl -o guide.md\n\n\
    ## To track a site and refresh it later:\n\
    docmunch add https://docs.example.com/ --crawl -o example\n\
    docmunch update")]
#[command(
    about = "docmunch turns documentation sites into clean Markdown for local reading and AI context.",
    long_about = None
)]
pub struct Cli {
    #[clap(flatten)]
    fetch: FetchArgs,

    #[clap(flatten)]
    global: GlobalArgs,

    #[clap(subcommand)]
    commands: Option<Commands>,
}

#[derive(Clone, Debug, clap::Args)]
pub(crate) struct FetchArgs {
    /// Documentation page to fetch
    #[arg(value_name = "URL")]
    pub url: Option<String>,

    /// Write the Markdown to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Crawl the documentation site and stitch all pages into one document
    #[arg(long, default_value_t = false)]
    pub crawl: bool,

    /// Maximum link depth from the start page
    #[arg(long, default_value_t = 2)]
    pub max_depth: usize,
}

#[derive(Clone, Debug, clap::Args)]
struct GlobalArgs {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Politeness delay between requests in milliseconds
    #[arg(long, global = true)]
    delay_ms: Option<u64>,

    /// HTTP request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch a page (or crawl a site) and print or write Markdown
    Fetch(FetchArgs),
    /// Add a documentation source to .docmunch.yaml
    Add {
        /// Documentation URL
        url: String,
        /// Source name (defaults to a slug of the host)
        #[arg(long)]
        name: Option<String>,
        /// Crawl the whole site instead of a single page
        #[arg(long, default_value_t = false)]
        crawl: bool,
        /// Maximum link depth when crawling
        #[arg(long, default_value_t = 2)]
        max_depth: u32,
        /// Output path relative to the output directory. Crawled sources
        /// without a `.md` suffix are written one file per page.
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Re-fetch configured sources, rewriting only changed files
    Update {
        /// Only update the source with this name
        #[arg(long)]
        name: Option<String>,
        /// Rewrite files even when their content is unchanged
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// List configured sources
    List,
}

impl Cli {
    pub fn run(&self) -> miette::Result<()> {
        init_tracing(self.global.verbose);
        let app = App::new(self.settings());

        match &self.commands {
            Some(Commands::Fetch(args)) => block_on(&app, app.fetch(args)),
            None if self.fetch.url.is_some() => block_on(&app, app.fetch(&self.fetch)),
            None => Err(miette!(
                "No URL given. Run `docmunch --help` for usage."
            )),
            Some(Commands::Add {
                url,
                name,
                crawl,
                max_depth,
                output,
            }) => app.add(url, name.as_deref(), *crawl, *max_depth, output.as_deref()),
            Some(Commands::Update { name, force }) => block_on(&app, app.update(name.as_deref(), *force)),
            Some(Commands::List) => app.list(),
        }
    }

    fn settings(&self) -> CrawlSettings {
        let mut settings = CrawlSettings::from_env();
        if let Some(ms) = self.global.delay_ms {
            settings.delay = Duration::from_millis(ms);
        }
        if let Some(secs) = self.global.timeout_secs {
            settings.timeout = Duration::from_secs(secs);
        }
        settings
    }
}

/// Runs an async command with Ctrl-C handling installed for its whole run.
fn block_on<F: Future<Output = miette::Result<()>>>(app: &App, future: F) -> miette::Result<()> {
    tokio::runtime::Runtime::new().into_diagnostic()?.block_on(async {
        let ctrl_c = app.watch_ctrl_c();
        let result = future.await;
        ctrl_c.abort();
        result
    })
}

/// Logs go to stderr so Markdown on stdout stays clean. `RUST_LOG` overrides
/// the verbosity flag.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,docmunch_crawler={level},docmunch_pipeline={level},docmunch_cli={level}"
        ))
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
