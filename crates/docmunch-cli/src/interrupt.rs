use async_trait::async_trait;
use docmunch_crawler::{DiscardReason, Interrupt, SavePrompt};
use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;

/// Exit status for a Ctrl-C outside a crawl (128 + SIGINT).
pub(crate) const INTERRUPTED_EXIT_CODE: i32 = 130;

/// The interrupt of the crawl currently running, if any.
#[derive(Debug, Clone, Default)]
pub(crate) struct ActiveCrawl {
    current: Arc<Mutex<Option<Interrupt>>>,
}

/// Keeps a crawl registered with [`ActiveCrawl`] until dropped.
pub(crate) struct CrawlGuard {
    active: ActiveCrawl,
    interrupt: Interrupt,
}

impl ActiveCrawl {
    pub fn begin(&self) -> CrawlGuard {
        let interrupt = Interrupt::new();
        *self.lock() = Some(interrupt.clone());
        CrawlGuard {
            active: self.clone(),
            interrupt,
        }
    }

    /// Routes one Ctrl-C to the running crawl. Returns `false` when no crawl
    /// is running.
    pub fn forward(&self) -> bool {
        let Some(interrupt) = self.lock().clone() else {
            return false;
        };
        if interrupt.is_stopped() {
            eprintln!();
        } else {
            eprintln!("\nInterrupted. Finishing the current page (Ctrl-C again to quit)...");
        }
        interrupt.signal();
        true
    }

    fn lock(&self) -> MutexGuard<'_, Option<Interrupt>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CrawlGuard {
    pub fn interrupt(&self) -> Interrupt {
        self.interrupt.clone()
    }
}

impl Drop for CrawlGuard {
    fn drop(&mut self) {
        *self.active.lock() = None;
    }
}

/// Handles every Ctrl-C for the lifetime of the runtime: a running crawl is
/// interrupted, anything else ends the process.
pub(crate) fn watch_ctrl_c(active: ActiveCrawl) -> JoinHandle<()> {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if !active.forward() {
                eprintln!();
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
        }
    })
}

/// Asks on stderr whether to keep the pages of an interrupted crawl.
pub(crate) struct StdinPrompt;

#[async_trait]
impl SavePrompt for StdinPrompt {
    async fn confirm_save(&self, captured: usize) -> bool {
        eprint!("Save {} captured page(s)? [y/N] ", captured);
        let _ = io::stderr().flush();

        let answer = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line).map(|_| line)
        })
        .await;

        match answer {
            Ok(Ok(line)) => is_yes(&line),
            _ => false,
        }
    }
}

fn is_yes(answer: &str) -> bool {
    answer.trim_start().to_ascii_lowercase().starts_with('y')
}

pub(crate) fn exit_code(reason: DiscardReason) -> i32 {
    match reason {
        DiscardReason::Declined | DiscardReason::NothingCaptured => 0,
        DiscardReason::ForceQuit => 1,
    }
}

/// Terminates the process after a crawl whose results were discarded.
pub(crate) fn exit_discarded(reason: DiscardReason) -> ! {
    match reason {
        DiscardReason::Declined => eprintln!("Partial results discarded."),
        DiscardReason::NothingCaptured => eprintln!("Interrupted before any page was captured."),
        DiscardReason::ForceQuit => eprintln!("Aborted."),
    }
    std::process::exit(exit_code(reason))
}
