use docmunch_crawler::BrowserOptions;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Runtime crawl settings. Defaults are overridden by `DOCMUNCH_*`
/// environment variables, then by command line flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSettings {
    pub delay: Duration,
    pub timeout: Duration,
    pub chrome_path: Option<PathBuf>,
    pub render_settle: Duration,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(200),
            timeout: Duration::from_secs(30),
            chrome_path: None,
            render_settle: Duration::from_millis(1000),
        }
    }
}

impl CrawlSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(ms) = parse_var::<u64>(&lookup, "DOCMUNCH_DELAY_MS", settings.delay.as_millis()) {
            settings.delay = Duration::from_millis(ms);
        }
        if let Some(secs) =
            parse_var::<u64>(&lookup, "DOCMUNCH_TIMEOUT_SECS", settings.timeout.as_secs().into())
        {
            settings.timeout = Duration::from_secs(secs);
        }
        if let Some(path) = lookup("DOCMUNCH_CHROME").filter(|p| !p.trim().is_empty()) {
            settings.chrome_path = Some(PathBuf::from(path));
        }
        if let Some(ms) = parse_var::<u64>(
            &lookup,
            "DOCMUNCH_RENDER_SETTLE_MS",
            settings.render_settle.as_millis(),
        ) {
            settings.render_settle = Duration::from_millis(ms);
        }

        settings
    }

    pub fn browser_options(&self) -> BrowserOptions {
        BrowserOptions {
            chrome_path: self.chrome_path.clone(),
            settle: self.render_settle,
            request_timeout: self.timeout,
        }
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u128,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Invalid {} value '{}', using default {}", key, raw, default);
            None
        }
    }
}
